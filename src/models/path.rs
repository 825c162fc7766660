/// One step into a metainfo value: a mapping key or a sequence index
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    Name(String),
    Index(usize),
}

impl From<&str> for Key {
    fn from(name: &str) -> Self {
        Key::Name(name.to_string())
    }
}

impl From<String> for Key {
    fn from(name: String) -> Self {
        Key::Name(name)
    }
}

impl From<usize> for Key {
    fn from(index: usize) -> Self {
        Key::Index(index)
    }
}

/// Location of a value inside a metainfo document.
///
/// Paths are immutable while walking a document: [`KeyPath::key`] and
/// [`KeyPath::index`] return extended copies, so every recursive step owns
/// the path it reports errors at.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct KeyPath(Vec<Key>);

impl KeyPath {
    /// The path of the top-level mapping
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn key(&self, name: &str) -> Self {
        self.child(Key::Name(name.to_string()))
    }

    pub fn index(&self, index: usize) -> Self {
        self.child(Key::Index(index))
    }

    pub fn child(&self, key: Key) -> Self {
        let mut keys = Vec::with_capacity(self.0.len() + 1);
        keys.extend_from_slice(&self.0);
        keys.push(key);
        Self(keys)
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> &[Key] {
        &self.0
    }

    /// Splits the path into its parent and final key
    pub fn split_last(&self) -> Option<(KeyPath, &Key)> {
        let (last, parent) = self.0.split_last()?;
        Some((KeyPath(parent.to_vec()), last))
    }
}

impl From<Vec<Key>> for KeyPath {
    fn from(keys: Vec<Key>) -> Self {
        Self(keys)
    }
}

impl FromIterator<Key> for KeyPath {
    fn from_iter<I: IntoIterator<Item = Key>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Builds a [`KeyPath`] from mapping keys and sequence indices.
///
/// ```
/// use torforge::key_path;
///
/// let path = key_path!["info", "files", 1usize, "length"];
/// assert_eq!(path.to_string(), "['info']['files'][1]['length']");
/// ```
#[macro_export]
macro_rules! key_path {
    ($($key:expr),* $(,)?) => {
        $crate::models::KeyPath::from(vec![$($crate::models::Key::from($key)),*])
    };
}
