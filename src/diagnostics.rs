//! Rendering of paths, values and validation messages.
//!
//! Every message body is produced by a pure function of a [`KeyPath`] and a
//! [`Violation`], so the text never depends on how a document was walked.

use std::fmt::{self, Write};
use std::path::PathBuf;

use crate::models::{Key, KeyPath, Kind, Value};

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for key in self.keys() {
            match key {
                Key::Name(name) => write!(f, "['{}']", name)?,
                Key::Index(i) => write!(f, "[{}]", i)?,
            }
        }
        Ok(())
    }
}

/// What went wrong at a path
#[derive(Debug, Clone, PartialEq)]
pub enum Violation {
    /// The value is of a kind outside `expected`
    WrongType {
        expected: &'static [Kind],
        actual: Value,
    },
    Empty,
    /// The byte length of the value is not a multiple of `divisor`
    NotDivisible { divisor: usize },
    /// The mapping holds two keys that exclude each other
    BothPresent {
        first: &'static str,
        second: &'static str,
    },
    /// The value has the right kind but an unacceptable content
    Invalid { value: Value },
    /// A private flag is set while no tracker is declared
    NoAnnounceUrls { value: Value },
    /// A required key is absent; the path is the containing mapping
    Missing { key: String },
    /// Neither of two alternative keys exists; the path is the containing mapping
    MissingEither {
        first: &'static str,
        second: &'static str,
    },
    SizeMismatch {
        recorded: Value,
        actual: u64,
        local: PathBuf,
    },
    PieceCountMismatch {
        recorded: usize,
        actual: usize,
        local: PathBuf,
    },
    CorruptPiece { index: usize, local: PathBuf },
}

/// Renders the message body for a violation at `path`
pub fn render(path: &KeyPath, violation: &Violation) -> String {
    match violation {
        Violation::WrongType { expected, actual } => format!(
            "{} must be {}, not {}: {}",
            path,
            join_kinds(expected),
            actual.kind(),
            repr(actual)
        ),
        Violation::Empty => format!("{} is empty", path),
        Violation::NotDivisible { divisor } => {
            format!("length of {} is not divisible by {}", path, divisor)
        }
        Violation::BothPresent { first, second } => {
            format!("{} includes both '{}' and '{}'", path, first, second)
        }
        Violation::Invalid { value } => format!("{} is invalid: {}", path, repr(value)),
        Violation::NoAnnounceUrls { value } => format!(
            "{} is {} but no announce URLs are specified",
            path,
            repr(value)
        ),
        Violation::Missing { key } => format!("Missing '{}' in {}", key, container(path)),
        Violation::MissingEither { first, second } => format!(
            "Missing '{}' or '{}' in {}",
            first,
            second,
            container(path)
        ),
        Violation::SizeMismatch {
            recorded,
            actual,
            local,
        } => format!(
            "Mismatching file sizes in metainfo ({}) and local file system ({}): '{}'",
            size(recorded),
            actual,
            local.display()
        ),
        Violation::PieceCountMismatch {
            recorded,
            actual,
            local,
        } => format!(
            "Mismatching piece counts in metainfo ({}) and local file system ({}): '{}'",
            recorded,
            actual,
            local.display()
        ),
        Violation::CorruptPiece { index, local } => format!(
            "Piece {} of {} does not match local file system: '{}'",
            index,
            path,
            local.display()
        ),
    }
}

fn join_kinds(kinds: &[Kind]) -> String {
    kinds
        .iter()
        .map(Kind::to_string)
        .collect::<Vec<_>>()
        .join(" or ")
}

fn container(path: &KeyPath) -> String {
    if path.is_root() {
        "metainfo".to_string()
    } else {
        path.to_string()
    }
}

fn size(recorded: &Value) -> String {
    match recorded {
        Value::Int(n) => n.to_string(),
        Value::Float(f) if f.is_finite() && f.fract() == 0.0 => format!("{:.0}", f),
        other => repr(other),
    }
}

/// Renders a value unambiguously for messages: strings are quoted, byte
/// strings carry a `b` prefix, containers render their items.
pub fn repr(value: &Value) -> String {
    let mut out = String::new();
    write_repr(&mut out, value);
    out
}

fn write_repr(out: &mut String, value: &Value) {
    match value {
        Value::Str(s) => write_quoted(out, s.chars()),
        Value::Bytes(b) => {
            out.push('b');
            write_quoted_bytes(out, b);
        }
        Value::Int(i) => {
            let _ = write!(out, "{}", i);
        }
        Value::Float(f) => {
            let _ = write!(out, "{:?}", f);
        }
        Value::Bool(b) => {
            let _ = write!(out, "{}", b);
        }
        Value::List(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_repr(out, item);
            }
            out.push(']');
        }
        Value::Dict(dict) => {
            out.push('{');
            for (i, (key, item)) in dict.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_quoted(out, key.chars());
                out.push_str(": ");
                write_repr(out, item);
            }
            out.push('}');
        }
    }
}

fn write_quoted(out: &mut String, chars: impl Iterator<Item = char>) {
    out.push('\'');
    for c in chars {
        match c {
            '\'' => out.push_str("\\'"),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                let _ = write!(out, "\\x{:02x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('\'');
}

fn write_quoted_bytes(out: &mut String, bytes: &[u8]) {
    out.push('\'');
    for &b in bytes {
        match b {
            b'\'' => out.push_str("\\'"),
            b'\\' => out.push_str("\\\\"),
            b'\n' => out.push_str("\\n"),
            b'\r' => out.push_str("\\r"),
            b'\t' => out.push_str("\\t"),
            0x20..=0x7e => out.push(b as char),
            _ => {
                let _ = write!(out, "\\x{:02x}", b);
            }
        }
    }
    out.push('\'');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key_path;
    use crate::models::Dict;

    #[test]
    fn test_path_rendering() {
        assert_eq!(KeyPath::root().to_string(), "");
        assert_eq!(
            key_path!["info", "files", 1usize, "length"].to_string(),
            "['info']['files'][1]['length']"
        );
        assert_eq!(
            key_path!["announce-list", 0usize, 2usize].to_string(),
            "['announce-list'][0][2]"
        );
    }

    #[test]
    fn test_repr() {
        assert_eq!(repr(&Value::Str("many".into())), "'many'");
        assert_eq!(repr(&Value::Str("it's".into())), "'it\\'s'");
        assert_eq!(repr(&Value::Bytes(vec![b'a', 0, 0xff])), "b'a\\x00\\xff'");
        assert_eq!(repr(&Value::Bytes(Vec::new())), "b''");
        assert_eq!(repr(&Value::Int(-7)), "-7");
        assert_eq!(repr(&Value::Float(2.0)), "2.0");
        assert_eq!(repr(&Value::Bool(true)), "true");
        assert_eq!(
            repr(&Value::List(vec!["this".into(), "is".into(), Value::Int(1)])),
            "['this', 'is', 1]"
        );
        assert_eq!(
            repr(&Value::Dict(Dict::from_iter([("a", Value::List(Vec::new()))]))),
            "{'a': []}"
        );
    }

    #[test]
    fn test_render_type_mismatch_joins_alternatives() {
        let body = render(
            &key_path!["info", "length"],
            &Violation::WrongType {
                expected: &[Kind::Int, Kind::Float],
                actual: Value::Str("foo".into()),
            },
        );
        assert_eq!(body, "['info']['length'] must be int or float, not str: 'foo'");
    }

    #[test]
    fn test_render_missing_names_container() {
        let missing = Violation::Missing { key: "name".into() };
        assert_eq!(render(&key_path!["info"], &missing), "Missing 'name' in ['info']");

        let missing = Violation::Missing { key: "info".into() };
        assert_eq!(render(&KeyPath::root(), &missing), "Missing 'info' in metainfo");
    }

    #[test]
    fn test_render_size_mismatch() {
        let body = render(
            &key_path!["info", "length"],
            &Violation::SizeMismatch {
                recorded: Value::Float(12345.0),
                actual: 45,
                local: PathBuf::from("/tmp/content.bin"),
            },
        );
        assert_eq!(
            body,
            "Mismatching file sizes in metainfo (12345) and local file system (45): '/tmp/content.bin'"
        );
    }
}
