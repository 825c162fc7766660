//! Schema walk over a metainfo document.
//!
//! The walk visits fields in a fixed order and stops at the first violation:
//!
//! 1. `info`: `name`, `piece length`, `pieces`, `length`/`files` exclusion,
//!    then either the single-file `length`/`md5sum` or every file entry
//! 2. `announce`
//! 3. `announce-list`, tier by tier, URL by URL
//! 4. `private` against the declared announce URLs
//! 5. auxiliary fields: `source`, `comment`, `created by`, `creation date`, `url-list`
//!
//! Every field goes through presence, then kind, then value checks.

mod checksum;
mod url;

pub use checksum::is_valid_md5;
pub use url::is_valid_url;

use crate::config::DIGEST_LEN;
use crate::diagnostics::Violation;
use crate::error::MetainfoError;
use crate::models::{Dict, Document, KeyPath, Kind, Value};

type Check<T = ()> = Result<T, MetainfoError>;

const STR: &[Kind] = &[Kind::Str];
const INT: &[Kind] = &[Kind::Int];
const BYTES: &[Kind] = &[Kind::Bytes];
const LIST: &[Kind] = &[Kind::List];
const DICT: &[Kind] = &[Kind::Dict];
const SIZE: &[Kind] = &[Kind::Int, Kind::Float];
const FLAG: &[Kind] = &[Kind::Bool, Kind::Int];
const STR_OR_LIST: &[Kind] = &[Kind::Str, Kind::List];

/// How much of the document must be present
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Absent fields pass; only what exists is checked
    Structure,
    /// Fields `generate` reads must exist; fields it writes are skipped
    Content,
    /// Every required field must exist, as for serialization
    Complete,
}

/// Whether a field is read from the caller or produced by hashing local content
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Input,
    Output,
}

enum Presence {
    Optional,
    Required,
    Skipped,
}

impl Stage {
    fn presence(self, role: Role) -> Presence {
        match (self, role) {
            (Stage::Structure, _) => Presence::Optional,
            (Stage::Content, Role::Input) => Presence::Required,
            (Stage::Content, Role::Output) => Presence::Skipped,
            (Stage::Complete, _) => Presence::Required,
        }
    }
}

/// Checks the structure of a document without requiring completeness.
///
/// Absent optional and not-yet-generated fields pass; anything present must
/// have the right kind and value.
pub fn validate(doc: &Document) -> Check {
    check(doc, Stage::Structure)
}

/// Walks the whole document at the given stage and reports the first violation
pub fn check(doc: &Document, stage: Stage) -> Check {
    let root = KeyPath::root();
    let info_path = root.key("info");
    let info = match doc.root().get("info") {
        Some(value) => expect_dict(value, &info_path)?,
        None => return Err(missing(&root, "info")),
    };

    check_info(info, &info_path, stage)?;
    check_announce(doc.root(), &root)?;
    check_announce_list(doc.root(), &root)?;
    check_private(info, &info_path, doc.root())?;
    check_auxiliary(doc.root(), info, &root, &info_path)
}

fn check_info(info: &Dict, path: &KeyPath, stage: Stage) -> Check {
    if let Some(name) = field(info, path, "name", stage.presence(Role::Input))? {
        expect(name, &path.key("name"), STR)?;
    }

    if let Some(piece_length) = field(info, path, "piece length", stage.presence(Role::Input))? {
        let piece_length_path = path.key("piece length");
        expect(piece_length, &piece_length_path, INT)?;
        if piece_length.as_int().is_some_and(|n| n <= 0) {
            return Err(invalid(&piece_length_path, piece_length));
        }
    }

    if let Some(pieces) = field(info, path, "pieces", stage.presence(Role::Output))? {
        check_pieces(pieces, &path.key("pieces"))?;
    }

    if info.contains_key("length") && info.contains_key("files") {
        return Err(MetainfoError::new(
            path.clone(),
            Violation::BothPresent {
                first: "length",
                second: "files",
            },
        ));
    }

    match info.get("files") {
        Some(files) => check_files(files, &path.key("files"), stage),
        None => check_single_file(info, path, stage),
    }
}

fn check_pieces(pieces: &Value, path: &KeyPath) -> Check {
    expect(pieces, path, BYTES)?;
    let len = pieces.as_bytes().map_or(0, <[u8]>::len);
    if len == 0 {
        return Err(MetainfoError::new(path.clone(), Violation::Empty));
    }
    if len % DIGEST_LEN != 0 {
        return Err(MetainfoError::new(
            path.clone(),
            Violation::NotDivisible {
                divisor: DIGEST_LEN,
            },
        ));
    }
    Ok(())
}

fn check_single_file(info: &Dict, path: &KeyPath, stage: Stage) -> Check {
    match (info.get("length"), stage.presence(Role::Output)) {
        (_, Presence::Skipped) => {}
        (Some(length), _) => check_size(length, &path.key("length"))?,
        (None, Presence::Required) => {
            return Err(MetainfoError::new(
                path.clone(),
                Violation::MissingEither {
                    first: "length",
                    second: "files",
                },
            ));
        }
        (None, Presence::Optional) => {}
    }
    check_md5sum(info, path)
}

fn check_files(files: &Value, path: &KeyPath, stage: Stage) -> Check {
    let entries = expect_list(files, path)?;
    if entries.is_empty() {
        return Err(MetainfoError::new(path.clone(), Violation::Empty));
    }
    for (index, entry) in entries.iter().enumerate() {
        check_file_entry(entry, &path.index(index), stage)?;
    }
    Ok(())
}

fn check_file_entry(entry: &Value, path: &KeyPath, stage: Stage) -> Check {
    let entry = expect_dict(entry, path)?;

    if let Some(segments) = field(entry, path, "path", stage.presence(Role::Input))? {
        let segments_path = path.key("path");
        let segments = expect_list(segments, &segments_path)?;
        if segments.is_empty() {
            return Err(MetainfoError::new(segments_path, Violation::Empty));
        }
        for (index, segment) in segments.iter().enumerate() {
            let segment_path = segments_path.index(index);
            expect(segment, &segment_path, STR)?;
            if !segment.as_str().is_some_and(is_valid_segment) {
                return Err(invalid(&segment_path, segment));
            }
        }
    }

    if let Some(length) = field(entry, path, "length", stage.presence(Role::Output))? {
        check_size(length, &path.key("length"))?;
    }

    check_md5sum(entry, path)
}

/// A path segment names exactly one directory entry below the content root
fn is_valid_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment != "."
        && segment != ".."
        && !segment.contains(['/', '\\'])
}

fn check_size(length: &Value, path: &KeyPath) -> Check {
    expect(length, path, SIZE)?;
    let out_of_range = match length {
        Value::Int(n) => *n < 0,
        Value::Float(f) => !f.is_finite() || *f < 0.0,
        _ => false,
    };
    if out_of_range {
        return Err(invalid(path, length));
    }
    Ok(())
}

fn check_md5sum(parent: &Dict, path: &KeyPath) -> Check {
    let Some(md5sum) = parent.get("md5sum") else {
        return Ok(());
    };
    let md5_path = path.key("md5sum");
    expect(md5sum, &md5_path, STR)?;
    if !md5sum.as_str().is_some_and(is_valid_md5) {
        return Err(invalid(&md5_path, md5sum));
    }
    Ok(())
}

fn check_announce(root: &Dict, path: &KeyPath) -> Check {
    if let Some(announce) = root.get("announce") {
        check_url(announce, &path.key("announce"))?;
    }
    Ok(())
}

fn check_announce_list(root: &Dict, path: &KeyPath) -> Check {
    let Some(announce_list) = root.get("announce-list") else {
        return Ok(());
    };
    let list_path = path.key("announce-list");
    let tiers = expect_list(announce_list, &list_path)?;
    for (tier_index, tier) in tiers.iter().enumerate() {
        let tier_path = list_path.index(tier_index);
        let urls = expect_list(tier, &tier_path)?;
        for (url_index, url) in urls.iter().enumerate() {
            check_url(url, &tier_path.index(url_index))?;
        }
    }
    Ok(())
}

fn check_url(url: &Value, path: &KeyPath) -> Check {
    expect(url, path, STR)?;
    if !url.as_str().is_some_and(is_valid_url) {
        return Err(invalid(path, url));
    }
    Ok(())
}

fn check_private(info: &Dict, path: &KeyPath, root: &Dict) -> Check {
    let Some(private) = info.get("private") else {
        return Ok(());
    };
    let private_path = path.key("private");
    expect(private, &private_path, FLAG)?;
    if private.is_truthy() && !has_announce_url(root) {
        return Err(MetainfoError::new(
            private_path,
            Violation::NoAnnounceUrls {
                value: private.clone(),
            },
        ));
    }
    Ok(())
}

/// Whether any non-empty tracker URL is declared. Runs after the URLs
/// themselves were validated.
fn has_announce_url(root: &Dict) -> bool {
    let announce = root
        .get("announce")
        .and_then(Value::as_str)
        .is_some_and(|url| !url.is_empty());
    let listed = root
        .get("announce-list")
        .and_then(Value::as_list)
        .is_some_and(|tiers| {
            tiers
                .iter()
                .filter_map(Value::as_list)
                .flatten()
                .filter_map(Value::as_str)
                .any(|url| !url.is_empty())
        });
    announce || listed
}

fn check_auxiliary(root: &Dict, info: &Dict, path: &KeyPath, info_path: &KeyPath) -> Check {
    if let Some(source) = info.get("source") {
        expect(source, &info_path.key("source"), STR)?;
    }
    if let Some(comment) = root.get("comment") {
        expect(comment, &path.key("comment"), STR)?;
    }
    if let Some(created_by) = root.get("created by") {
        expect(created_by, &path.key("created by"), STR)?;
    }
    if let Some(date) = root.get("creation date") {
        let date_path = path.key("creation date");
        expect(date, &date_path, INT)?;
        if date.as_int().is_some_and(|d| d < 0) {
            return Err(invalid(&date_path, date));
        }
    }
    if let Some(web_seeds) = root.get("url-list") {
        let seeds_path = path.key("url-list");
        expect(web_seeds, &seeds_path, STR_OR_LIST)?;
        match web_seeds {
            Value::List(urls) => {
                for (index, url) in urls.iter().enumerate() {
                    check_url(url, &seeds_path.index(index))?;
                }
            }
            single => check_url(single, &seeds_path)?,
        }
    }
    Ok(())
}

/// Looks up `key` in `parent`, turning absence into an error when required
fn field<'a>(
    parent: &'a Dict,
    path: &KeyPath,
    key: &str,
    presence: Presence,
) -> Check<Option<&'a Value>> {
    match presence {
        Presence::Skipped => Ok(None),
        Presence::Optional => Ok(parent.get(key)),
        Presence::Required => parent.get(key).map(Some).ok_or_else(|| missing(path, key)),
    }
}

fn expect(value: &Value, path: &KeyPath, expected: &'static [Kind]) -> Check {
    if expected.contains(&value.kind()) {
        Ok(())
    } else {
        Err(wrong_type(value, path, expected))
    }
}

fn expect_dict<'a>(value: &'a Value, path: &KeyPath) -> Check<&'a Dict> {
    match value {
        Value::Dict(dict) => Ok(dict),
        other => Err(wrong_type(other, path, DICT)),
    }
}

fn expect_list<'a>(value: &'a Value, path: &KeyPath) -> Check<&'a [Value]> {
    match value {
        Value::List(items) => Ok(items),
        other => Err(wrong_type(other, path, LIST)),
    }
}

fn wrong_type(value: &Value, path: &KeyPath, expected: &'static [Kind]) -> MetainfoError {
    MetainfoError::new(
        path.clone(),
        Violation::WrongType {
            expected,
            actual: value.clone(),
        },
    )
}

fn missing(parent: &KeyPath, key: &str) -> MetainfoError {
    MetainfoError::new(
        parent.clone(),
        Violation::Missing {
            key: key.to_string(),
        },
    )
}

fn invalid(path: &KeyPath, value: &Value) -> MetainfoError {
    MetainfoError::new(
        path.clone(),
        Violation::Invalid {
            value: value.clone(),
        },
    )
}
