//! # torforge
//!
//! A library for creating, validating and verifying BitTorrent v1 metainfo
//! files.
//!
//! Metainfo is held as a loosely typed [`Document`] so that untrusted input
//! can be inspected before it is trusted. [`validate`] walks a document and
//! reports the first violation with its exact location, [`generate`] hashes
//! local content into it, and [`reconcile`] checks it against local content.
//!
//! ## Example
//!
//! ```no_run
//! use torforge::{TorrentBuilder, TorrentOptions};
//! use std::path::PathBuf;
//!
//! let options = TorrentOptions::default();
//! let builder = TorrentBuilder::new(PathBuf::from("my_file.txt"), options);
//! let torrent = builder.build().unwrap();
//! let bytes = torrent.dump().unwrap();
//! ```

pub mod builder;
pub mod cli;
pub mod codec;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod generate;
pub mod hashing;
pub mod models;
pub mod piece;
pub mod reconcile;
pub mod scanner;
pub mod validate;

// Re-export main types for convenience
pub use builder::TorrentBuilder;
pub use codec::{decode, dump, encode};
pub use error::{CodecError, Error, MetainfoError, Result};
pub use generate::generate;
pub use hashing::{CancelToken, HashOptions};
pub use models::{Dict, Document, Key, KeyPath, Kind, Torrent, TorrentOptions, Value};
pub use reconcile::{Depth, reconcile};
pub use validate::{Stage, check, validate};
