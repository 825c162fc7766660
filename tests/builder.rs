use std::fs;

use torforge::config::CREATED_BY;
use torforge::{Error, Torrent, TorrentBuilder, TorrentOptions, Value, key_path};

#[test]
fn test_build_single_file_torrent() {
    let tmp = tempfile::tempdir().unwrap();
    let file_path = tmp.path().join("test_file.txt");
    fs::write(&file_path, b"Hello World! This is a test file for torforge.").unwrap();

    let options = TorrentOptions {
        piece_length: Some(15),
        ..Default::default()
    };
    let torrent = TorrentBuilder::new(file_path.clone(), options).build().unwrap();

    assert_eq!(torrent.name(), Some("test_file.txt"));
    assert_eq!(torrent.files(), vec![(vec!["test_file.txt".to_string()], 46)]);
    assert!(torrent.info().unwrap().get("files").is_none());
    assert_eq!(torrent.piece_length(), Some(1 << 15));
    assert_eq!(torrent.piece_count(), 1);
    assert_eq!(torrent.content.as_deref(), Some(file_path.as_path()));
    assert!(torrent.validate().is_ok());
}

#[test]
fn test_build_multi_file_torrent() {
    let tmp = tempfile::tempdir().unwrap();
    let content_dir = tmp.path().join("content");
    fs::create_dir_all(content_dir.join("nested")).unwrap();
    fs::write(content_dir.join("file2.txt"), b"File 2 content").unwrap();
    fs::write(content_dir.join("file1.txt"), b"File 1 content").unwrap();
    fs::write(content_dir.join("nested").join("deep.txt"), b"deep").unwrap();

    let options = TorrentOptions {
        piece_length: Some(15),
        ..Default::default()
    };
    let torrent = TorrentBuilder::new(content_dir, options).build().unwrap();

    assert_eq!(torrent.name(), Some("content"));
    assert!(torrent.info().unwrap().get("length").is_none());
    assert_eq!(
        torrent.files(),
        vec![
            (vec!["file1.txt".to_string()], 14),
            (vec!["file2.txt".to_string()], 14),
            (vec!["nested".to_string(), "deep.txt".to_string()], 4),
        ]
    );
    assert_eq!(torrent.total_size(), 32);
}

#[test]
fn test_torrent_metadata_options() {
    let tmp = tempfile::tempdir().unwrap();
    let file_path = tmp.path().join("metadata.txt");
    fs::write(&file_path, b"Metadata").unwrap();

    let options = TorrentOptions {
        announce: vec!["http://tracker1.com".into(), "http://tracker2.com".into()],
        web_seed: vec!["http://webseed.com".into()],
        comment: Some("Test Comment".into()),
        private: true,
        source_string: Some("SOURCE".into()),
        name: Some("custom_name".into()),
        creation_date: Some(1234567890),
        ..Default::default()
    };
    let torrent = TorrentBuilder::new(file_path, options).build().unwrap();
    let doc = &torrent.metainfo;

    assert_eq!(doc.get(&key_path!["announce"]).unwrap(), &Value::from("http://tracker1.com"));
    assert_eq!(
        torrent.trackers(),
        vec![
            vec!["http://tracker1.com".to_string()],
            vec!["http://tracker2.com".to_string()],
        ]
    );
    assert_eq!(
        doc.get(&key_path!["url-list", 0usize]).unwrap(),
        &Value::from("http://webseed.com")
    );
    assert_eq!(doc.get(&key_path!["comment"]).unwrap(), &Value::from("Test Comment"));
    assert_eq!(doc.get(&key_path!["created by"]).unwrap(), &Value::from(CREATED_BY));
    assert_eq!(doc.get(&key_path!["creation date"]).unwrap(), &Value::Int(1234567890));
    assert_eq!(doc.get(&key_path!["info", "source"]).unwrap(), &Value::from("SOURCE"));
    assert!(torrent.is_private());
    assert_eq!(torrent.name(), Some("custom_name"));
}

#[test]
fn test_comma_separated_tier() {
    let tmp = tempfile::tempdir().unwrap();
    let file_path = tmp.path().join("tiers.txt");
    fs::write(&file_path, b"tiers").unwrap();

    let options = TorrentOptions {
        announce: vec!["http://a.example,http://b.example".into()],
        no_date: true,
        ..Default::default()
    };
    let torrent = TorrentBuilder::new(file_path, options).build().unwrap();

    assert_eq!(
        torrent.trackers(),
        vec![vec!["http://a.example".to_string(), "http://b.example".to_string()]]
    );
    assert!(torrent.metainfo.root().get("creation date").is_none());
}

#[test]
fn test_exclude_patterns() {
    let tmp = tempfile::tempdir().unwrap();
    let content_dir = tmp.path().join("exclude_content");
    fs::create_dir(&content_dir).unwrap();
    fs::write(content_dir.join("keep.txt"), b"keep").unwrap();
    fs::write(content_dir.join("ignore.tmp"), b"ignore").unwrap();
    fs::write(content_dir.join("nested_ignore.tmp"), b"ignore").unwrap();

    let options = TorrentOptions {
        exclude: vec!["*.tmp".into()],
        ..Default::default()
    };
    let torrent = TorrentBuilder::new(content_dir, options).build().unwrap();

    assert_eq!(torrent.files(), vec![(vec!["keep.txt".to_string()], 4)]);
}

#[test]
fn test_piece_length_customization() {
    let tmp = tempfile::tempdir().unwrap();
    let file_path = tmp.path().join("data.bin");
    fs::write(&file_path, vec![0u8; 1024 * 1024]).unwrap();

    let options = TorrentOptions {
        piece_length: Some(18),
        ..Default::default()
    };
    let torrent = TorrentBuilder::new(file_path, options).build().unwrap();

    assert_eq!(torrent.piece_length(), Some(262144));
    // 1MB / 256KB = 4 pieces
    assert_eq!(torrent.piece_count(), 4);
}

#[test]
fn test_private_without_trackers_is_rejected() {
    let tmp = tempfile::tempdir().unwrap();
    let file_path = tmp.path().join("private.txt");
    fs::write(&file_path, b"private").unwrap();

    let options = TorrentOptions {
        private: true,
        ..Default::default()
    };
    let err = TorrentBuilder::new(file_path, options).build().unwrap_err();
    assert_eq!(
        err.to_string(),
        "Invalid metainfo: ['info']['private'] is true but no announce URLs are specified"
    );
}

#[test]
fn test_empty_content_is_rejected() {
    let tmp = tempfile::tempdir().unwrap();
    let content_dir = tmp.path().join("empty");
    fs::create_dir(&content_dir).unwrap();

    let err = TorrentBuilder::new(content_dir.clone(), TorrentOptions::default())
        .build()
        .unwrap_err();
    assert!(matches!(err, Error::EmptyContent(path) if path == content_dir));
}

#[test]
fn test_written_torrent_reads_back() {
    let tmp = tempfile::tempdir().unwrap();
    let file_path = tmp.path().join("roundtrip.txt");
    fs::write(&file_path, b"round trip data").unwrap();
    let output = tmp.path().join("roundtrip.torrent");

    let options = TorrentOptions {
        announce: vec!["udp://tracker.example:6969".into()],
        ..Default::default()
    };
    let torrent = TorrentBuilder::new(file_path, options).build().unwrap();
    torrent.write(&output, false).unwrap();

    let read = Torrent::read(&output).unwrap();
    assert_eq!(read.metainfo, torrent.metainfo);
    assert_eq!(read.info_hash().unwrap(), torrent.info_hash().unwrap());

    // refuses to clobber without overwrite
    assert!(matches!(torrent.write(&output, false), Err(Error::Io { .. })));
    torrent.write(&output, true).unwrap();
}
