use std::fmt;

use thiserror::Error;

use super::path::{Key, KeyPath};

/// The kinds a metainfo value can take
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Dict,
    List,
    Str,
    Bytes,
    Int,
    Float,
    Bool,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Kind::Dict => "dict",
            Kind::List => "list",
            Kind::Str => "str",
            Kind::Bytes => "bytes",
            Kind::Int => "int",
            Kind::Float => "float",
            Kind::Bool => "bool",
        };
        f.write_str(name)
    }
}

/// A node of a metainfo document tree.
///
/// Bencode only knows integers, byte strings, lists and dictionaries. The
/// document model is wider so that a loaded or hand-edited document can hold
/// values of the wrong kind and still be reported precisely by validation.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Dict(Dict),
    List(Vec<Value>),
    Str(String),
    Bytes(Vec<u8>),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl Value {
    pub fn kind(&self) -> Kind {
        match self {
            Value::Dict(_) => Kind::Dict,
            Value::List(_) => Kind::List,
            Value::Str(_) => Kind::Str,
            Value::Bytes(_) => Kind::Bytes,
            Value::Int(_) => Kind::Int,
            Value::Float(_) => Kind::Float,
            Value::Bool(_) => Kind::Bool,
        }
    }

    pub fn as_dict(&self) -> Option<&Dict> {
        match self {
            Value::Dict(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_dict_mut(&mut self) -> Option<&mut Dict> {
        match self {
            Value::Dict(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_list_mut(&mut self) -> Option<&mut Vec<Value>> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Whether the value counts as "set" for flags such as `private`
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::Bytes(b) => !b.is_empty(),
            Value::List(l) => !l.is_empty(),
            Value::Dict(d) => !d.is_empty(),
        }
    }

    /// Follows a single key: mapping keys into dicts, indices into lists
    pub fn get(&self, key: &Key) -> Option<&Value> {
        match (self, key) {
            (Value::Dict(d), Key::Name(name)) => d.get(name),
            (Value::List(l), Key::Index(i)) => l.get(*i),
            _ => None,
        }
    }

    pub fn get_mut(&mut self, key: &Key) -> Option<&mut Value> {
        match (self, key) {
            (Value::Dict(d), Key::Name(name)) => d.get_mut(name),
            (Value::List(l), Key::Index(i)) => l.get_mut(*i),
            _ => None,
        }
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Value::Int(i64::try_from(n).unwrap_or(i64::MAX))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Value::Bytes(b)
    }
}

impl From<Vec<Value>> for Value {
    fn from(l: Vec<Value>) -> Self {
        Value::List(l)
    }
}

impl From<Dict> for Value {
    fn from(d: Dict) -> Self {
        Value::Dict(d)
    }
}

/// A string-keyed mapping that remembers insertion order.
///
/// Order only matters for rendering; equality ignores it, and the encoder
/// sorts keys anyway.
#[derive(Debug, Clone, Default)]
pub struct Dict {
    entries: Vec<(String, Value)>,
}

impl Dict {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.entries
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Inserts or replaces a value. A replaced key keeps its position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        let key = key.into();
        let value = value.into();
        match self.get_mut(&key) {
            Some(slot) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let pos = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(pos).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }
}

impl PartialEq for Dict {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Dict {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        let mut dict = Dict::new();
        for (k, v) in iter {
            dict.insert(k, v);
        }
        dict
    }
}

/// Returned when a path does not lead to an existing value
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no value at {path}")]
pub struct NotFound {
    pub path: KeyPath,
}

/// A metainfo document: a top-level mapping with path-addressable access.
///
/// The document holds no validation logic; see [`crate::validate`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    root: Dict,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_dict(root: Dict) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Dict {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut Dict {
        &mut self.root
    }

    pub fn into_dict(self) -> Dict {
        self.root
    }

    /// The `info` mapping, if present and a mapping
    pub fn info(&self) -> Option<&Dict> {
        self.root.get("info").and_then(Value::as_dict)
    }

    pub fn info_mut(&mut self) -> Option<&mut Dict> {
        self.root.get_mut("info").and_then(Value::as_dict_mut)
    }

    /// Looks up the value at `path`. The root mapping itself is reached
    /// through [`Document::root`], so an empty path is never found.
    pub fn get(&self, path: &KeyPath) -> Result<&Value, NotFound> {
        let not_found = || NotFound { path: path.clone() };
        let (first, rest) = path.keys().split_first().ok_or_else(not_found)?;
        let Key::Name(name) = first else {
            return Err(not_found());
        };
        let mut value = self.root.get(name).ok_or_else(not_found)?;
        for key in rest {
            value = value.get(key).ok_or_else(not_found)?;
        }
        Ok(value)
    }

    pub fn get_mut(&mut self, path: &KeyPath) -> Result<&mut Value, NotFound> {
        let not_found = || NotFound { path: path.clone() };
        let (first, rest) = path.keys().split_first().ok_or_else(not_found)?;
        let Key::Name(name) = first else {
            return Err(not_found());
        };
        let mut value = self.root.get_mut(name).ok_or_else(not_found)?;
        for key in rest {
            value = value.get_mut(key).ok_or_else(not_found)?;
        }
        Ok(value)
    }

    /// Stores `value` at `path`, returning the value it replaced.
    ///
    /// The parent must already exist. A mapping parent gains the key if
    /// needed; a sequence parent only accepts an existing index or the index
    /// one past its end, which appends.
    pub fn set(
        &mut self,
        path: &KeyPath,
        value: impl Into<Value>,
    ) -> Result<Option<Value>, NotFound> {
        let value = value.into();
        let not_found = || NotFound { path: path.clone() };
        let (parent, last) = path.split_last().ok_or_else(not_found)?;

        if parent.is_root() {
            return match last {
                Key::Name(name) => Ok(self.root.insert(name.clone(), value)),
                Key::Index(_) => Err(not_found()),
            };
        }

        match (self.get_mut(&parent).map_err(|_| not_found())?, last) {
            (Value::Dict(d), Key::Name(name)) => Ok(d.insert(name.clone(), value)),
            (Value::List(l), Key::Index(i)) if *i < l.len() => {
                Ok(Some(std::mem::replace(&mut l[*i], value)))
            }
            (Value::List(l), Key::Index(i)) if *i == l.len() => {
                l.push(value);
                Ok(None)
            }
            _ => Err(not_found()),
        }
    }

    /// Removes and returns the value at `path`
    pub fn remove(&mut self, path: &KeyPath) -> Result<Value, NotFound> {
        let not_found = || NotFound { path: path.clone() };
        let (parent, last) = path.split_last().ok_or_else(not_found)?;

        if parent.is_root() {
            return match last {
                Key::Name(name) => self.root.remove(name).ok_or_else(not_found),
                Key::Index(_) => Err(not_found()),
            };
        }

        match (self.get_mut(&parent).map_err(|_| not_found())?, last) {
            (Value::Dict(d), Key::Name(name)) => d.remove(name).ok_or_else(not_found),
            (Value::List(l), Key::Index(i)) if *i < l.len() => Ok(l.remove(*i)),
            _ => Err(not_found()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key_path;

    fn sample() -> Document {
        let mut info = Dict::new();
        info.insert("name", "sample");
        info.insert(
            "files",
            vec![Value::Dict(Dict::from_iter([
                ("length", Value::Int(3)),
                ("path", Value::List(vec!["a".into()])),
            ]))],
        );
        let mut root = Dict::new();
        root.insert("info", info);
        Document::from_dict(root)
    }

    #[test]
    fn test_get_follows_keys_and_indices() {
        let doc = sample();
        let length = doc.get(&key_path!["info", "files", 0usize, "length"]).unwrap();
        assert_eq!(length, &Value::Int(3));

        let err = doc.get(&key_path!["info", "files", 1usize]).unwrap_err();
        assert_eq!(err.path, key_path!["info", "files", 1usize]);
        assert!(doc.get(&key_path!["info", "name", "x"]).is_err());
        assert!(doc.get(&KeyPath::root()).is_err());
    }

    #[test]
    fn test_set_replaces_in_place() {
        let mut doc = sample();
        let old = doc.set(&key_path!["info", "name"], 123i64).unwrap();
        assert_eq!(old, Some(Value::Str("sample".into())));
        assert_eq!(doc.info().unwrap().keys().next(), Some("name"));

        let path = key_path!["info", "files", 0usize, "path", 1usize];
        assert_eq!(doc.set(&path, "b").unwrap(), None);
        assert_eq!(doc.get(&path).unwrap().as_str(), Some("b"));

        assert!(doc.set(&key_path!["info", "missing", "x"], 1i64).is_err());
    }

    #[test]
    fn test_remove() {
        let mut doc = sample();
        let removed = doc.remove(&key_path!["info", "files", 0usize, "length"]).unwrap();
        assert_eq!(removed, Value::Int(3));
        assert!(doc.remove(&key_path!["info", "files", 0usize, "length"]).is_err());
        assert!(doc.remove(&key_path!["info"]).is_ok());
        assert!(doc.info().is_none());
    }

    #[test]
    fn test_dict_equality_ignores_order() {
        let a = Dict::from_iter([("x", Value::Int(1)), ("y", Value::Int(2))]);
        let b = Dict::from_iter([("y", Value::Int(2)), ("x", Value::Int(1))]);
        assert_eq!(a, b);
        assert_ne!(a, Dict::from_iter([("x", Value::Int(1))]));
    }

    #[test]
    fn test_truthiness() {
        assert!(Value::Bool(true).is_truthy());
        assert!(!Value::Int(0).is_truthy());
        assert!(Value::Int(1).is_truthy());
        assert!(!Value::Str(String::new()).is_truthy());
    }
}
