use glob::Pattern;
use jwalk::WalkDir;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::models::{Dict, FileInfo, KeyPath, Value, assign_offsets};

/// Scans the source path and collects file information, sorted by path
pub fn scan_files(
    source: &Path,
    output_file: Option<&Path>,
    exclude_patterns: &[String],
) -> Result<(Vec<FileInfo>, u64)> {
    let source = source.canonicalize().map_err(|e| Error::io(source, e))?;
    let output_canonical = output_file.and_then(|p| p.canonicalize().ok());

    let mut patterns = Vec::new();
    for pattern_str in exclude_patterns {
        match Pattern::new(pattern_str) {
            Ok(p) => patterns.push(p),
            Err(e) => tracing::warn!("Ignoring invalid glob pattern '{}': {}", pattern_str, e),
        }
    }

    let mut files = Vec::new();

    if source.is_file() {
        let metadata = source.metadata().map_err(|e| Error::io(&source, e))?;
        let name = source
            .file_name()
            .ok_or_else(|| Error::NotAFile(source.clone()))?;
        tracing::debug!("Single file: {} ({} bytes)", source.display(), metadata.len());

        files.push(FileInfo {
            path: name.into(),
            full_path: source.clone(),
            len: metadata.len(),
            start_offset: 0,
        });
    } else {
        for entry in WalkDir::new(&source) {
            let entry = entry.map_err(|e| Error::io(&source, io::Error::other(e.to_string())))?;
            if entry.file_type().is_dir() {
                continue;
            }
            let entry_path = entry.path();

            if output_canonical.as_deref() == Some(entry_path.as_path()) {
                tracing::debug!("Skipping output file: {}", entry_path.display());
                continue;
            }

            // source was canonicalized, so jwalk yields absolute paths below it
            let relative_path = entry_path
                .strip_prefix(&source)
                .map_err(|_| Error::NotAFile(entry_path.clone()))?;

            let file_name = entry.file_name().to_string_lossy();
            let relative_str = relative_path.to_string_lossy();
            if patterns
                .iter()
                .any(|p| p.matches(&file_name) || p.matches(&relative_str))
            {
                tracing::debug!("Excluding: {}", entry_path.display());
                continue;
            }

            let metadata = entry.metadata().map_err(|e| {
                Error::io(&entry_path, io::Error::other(e.to_string()))
            })?;
            tracing::debug!("  {} ({} bytes)", relative_path.display(), metadata.len());

            files.push(FileInfo {
                path: relative_path.to_path_buf(),
                full_path: entry_path.clone(),
                len: metadata.len(),
                start_offset: 0,
            });
        }
    }

    // Sorted paths keep the info hash reproducible across platforms
    files.sort_by(|a, b| a.path.cmp(&b.path));
    let total_size = assign_offsets(&mut files);
    tracing::debug!("Found {} files, total size: {} bytes", files.len(), total_size);

    Ok((files, total_size))
}

/// One file as declared by a metainfo document
#[derive(Debug, Clone)]
pub struct DeclaredFile {
    /// Where the recorded size lives in the document
    pub length_path: KeyPath,
    /// The recorded size, if any
    pub recorded: Option<Value>,
    pub file: FileInfo,
}

/// Lay out the files an `info` mapping declares below `content`, in declared
/// order, with sizes measured from the filesystem.
///
/// Single-file torrents treat `content` as the file itself; multi-file
/// torrents join each `path` list onto `content`. The `info` mapping must
/// already have passed validation at [`crate::validate::Stage::Content`].
pub fn declared_files(info: &Dict, content: &Path) -> Result<Vec<DeclaredFile>> {
    declared_files_with(info, content, |_| Ok(()))
}

/// Like [`declared_files`], but hands each file to `inspect` right after it
/// is measured. An error from `inspect` stops the walk before later files
/// are touched.
pub fn declared_files_with<F>(
    info: &Dict,
    content: &Path,
    mut inspect: F,
) -> Result<Vec<DeclaredFile>>
where
    F: FnMut(&DeclaredFile) -> Result<()>,
{
    let info_path = KeyPath::root().key("info");
    let mut declared = Vec::new();

    match info.get("files").and_then(Value::as_list) {
        Some(entries) => {
            let files_path = info_path.key("files");
            for (index, entry) in entries.iter().enumerate() {
                let Some(entry) = entry.as_dict() else {
                    continue;
                };
                let segments: Vec<&str> = entry
                    .get("path")
                    .and_then(Value::as_list)
                    .unwrap_or_default()
                    .iter()
                    .filter_map(Value::as_str)
                    .collect();
                let relative: PathBuf = segments.iter().collect();
                let full_path = content.join(&relative);
                let file = DeclaredFile {
                    length_path: files_path.index(index).key("length"),
                    recorded: entry.get("length").cloned(),
                    file: measure(relative, full_path)?,
                };
                inspect(&file)?;
                declared.push(file);
            }
        }
        None => {
            let name = info.get("name").and_then(Value::as_str).unwrap_or_default();
            let file = DeclaredFile {
                length_path: info_path.key("length"),
                recorded: info.get("length").cloned(),
                file: measure(PathBuf::from(name), content.to_path_buf())?,
            };
            inspect(&file)?;
            declared.push(file);
        }
    }

    assign_offsets(declared.iter_mut().map(|d| &mut d.file));
    Ok(declared)
}

fn measure(path: PathBuf, full_path: PathBuf) -> Result<FileInfo> {
    let metadata = fs::metadata(&full_path).map_err(|e| Error::io(&full_path, e))?;
    if !metadata.is_file() {
        return Err(Error::NotAFile(full_path));
    }
    Ok(FileInfo {
        path,
        full_path,
        len: metadata.len(),
        start_offset: 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_directory_sorted_with_offsets() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("content");
        fs::create_dir_all(root.join("sub")).unwrap();
        fs::write(root.join("b.txt"), b"bbbb").unwrap();
        fs::write(root.join("sub").join("a.txt"), b"aa").unwrap();
        fs::write(root.join("a.txt"), b"a").unwrap();
        fs::write(root.join("skip.tmp"), b"tmp").unwrap();

        let (files, total) = scan_files(&root, None, &["*.tmp".to_string()]).unwrap();
        let paths: Vec<_> = files.iter().map(|f| f.path.clone()).collect();
        assert_eq!(
            paths,
            vec![
                PathBuf::from("a.txt"),
                PathBuf::from("b.txt"),
                PathBuf::from("sub").join("a.txt")
            ]
        );
        assert_eq!(total, 7);
        assert_eq!(files[2].start_offset, 5);
    }

    #[test]
    fn test_scan_skips_output_file() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("content");
        fs::create_dir(&root).unwrap();
        fs::write(root.join("data.bin"), b"data").unwrap();
        fs::write(root.join("out.torrent"), b"").unwrap();

        let output = root.join("out.torrent");
        let (files, _) = scan_files(&root, Some(output.as_path()), &[]).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, PathBuf::from("data.bin"));
    }

    #[test]
    fn test_declared_files_follow_document_order() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir_all(tmp.path().join("d")).unwrap();
        fs::write(tmp.path().join("z.bin"), b"zz").unwrap();
        fs::write(tmp.path().join("d").join("a.bin"), b"aaa").unwrap();

        let entry = |segments: &[&str], length: i64| {
            Value::Dict(Dict::from_iter([
                ("length", Value::Int(length)),
                (
                    "path",
                    Value::List(segments.iter().map(|s| Value::from(*s)).collect()),
                ),
            ]))
        };
        let info = Dict::from_iter([(
            "files",
            Value::List(vec![entry(&["z.bin"], 2), entry(&["d", "a.bin"], 9)]),
        )]);

        let declared = declared_files(&info, tmp.path()).unwrap();
        assert_eq!(declared.len(), 2);
        assert_eq!(declared[0].file.path, PathBuf::from("z.bin"));
        assert_eq!(declared[1].file.full_path, tmp.path().join("d").join("a.bin"));
        assert_eq!(declared[1].file.start_offset, 2);
        assert_eq!(declared[1].file.len, 3);
        assert_eq!(declared[1].recorded, Some(Value::Int(9)));
        assert_eq!(declared[1].length_path.to_string(), "['info']['files'][1]['length']");
    }

    #[test]
    fn test_inspect_stops_before_later_files() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("a.bin"), b"a").unwrap();

        let entry = |name: &str| {
            Value::Dict(Dict::from_iter([(
                "path",
                Value::List(vec![Value::from(name)]),
            )]))
        };
        let info = Dict::from_iter([(
            "files",
            Value::List(vec![entry("a.bin"), entry("missing.bin")]),
        )]);

        let mut seen = Vec::new();
        let err = declared_files_with(&info, tmp.path(), |declared| {
            seen.push(declared.file.path.clone());
            Err(Error::NoContent)
        })
        .unwrap_err();
        assert!(matches!(err, Error::NoContent));
        assert_eq!(seen, vec![PathBuf::from("a.bin")]);
    }

    #[test]
    fn test_declared_missing_file_is_io_error() {
        let tmp = tempfile::tempdir().unwrap();
        let info = Dict::from_iter([("name", Value::from("gone.bin"))]);
        let err = declared_files(&info, &tmp.path().join("gone.bin")).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }
}
