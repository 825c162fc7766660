use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::models::TorrentOptions;

#[derive(Parser, Debug)]
#[command(
    name = "torforge",
    version,
    about = "Create, validate and verify BitTorrent metainfo files",
    author = "torforge contributors"
)]
pub struct Cli {
    /// Verbose output (sets the log level to debug unless RUST_LOG is set)
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a torrent from a file or directory
    Create(CreateArgs),
    /// Validate the structure of a torrent, optionally against local content sizes
    Check(CheckArgs),
    /// Verify local content against a torrent
    Verify(VerifyArgs),
    /// Show the contents of a torrent
    Inspect(InspectArgs),
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// The file or directory to create a torrent from
    #[arg(value_name = "TARGET")]
    pub source: PathBuf,

    /// Announce URL(s) - can be specified multiple times for backup trackers
    #[arg(short = 'a', long = "announce", value_name = "URL")]
    pub announce: Vec<String>,

    /// Add a comment to the metainfo
    #[arg(short = 'c', long = "comment", value_name = "COMMENT")]
    pub comment: Option<String>,

    /// Don't write the creation date
    #[arg(short = 'd', long = "no-date", conflicts_with = "date")]
    pub no_date: bool,

    /// Write this creation date (unix timestamp) instead of the current time
    #[arg(long = "date", value_name = "TIMESTAMP")]
    pub date: Option<i64>,

    /// Exclude files matching pattern (glob) - can be comma-separated
    #[arg(short = 'e', long = "exclude", value_name = "PATTERN", value_delimiter = ',')]
    pub exclude: Vec<String>,

    /// Overwrite output file if it exists
    #[arg(short = 'f', long = "force")]
    pub force: bool,

    /// Set the piece length to 2^N bytes (e.g., 18 for 256KB)
    #[arg(short = 'l', long = "piece-length", value_name = "N")]
    pub piece_length: Option<u32>,

    /// Set the name of the torrent (defaults to basename of target)
    #[arg(short = 'n', long = "name", value_name = "NAME")]
    pub name: Option<String>,

    /// Set the output file path (defaults to <name>.torrent)
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Set the private flag
    #[arg(short = 'p', long = "private")]
    pub private: bool,

    /// Add source string embedded in infohash
    #[arg(short = 's', long = "source", value_name = "SOURCE")]
    pub source_string: Option<String>,

    /// Number of threads for hashing (defaults to number of CPU cores)
    #[arg(short = 't', long = "threads", value_name = "N")]
    pub threads: Option<usize>,

    /// Web seed URL(s) - can be specified multiple times
    #[arg(short = 'w', long = "web-seed", value_name = "URL", value_delimiter = ',')]
    pub web_seed: Vec<String>,

    /// Show a progress bar while hashing
    #[arg(long = "progress")]
    pub progress: bool,

    /// Scan files and report the piece layout without hashing or writing
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

impl CreateArgs {
    /// Output path: `--output`, or `<name>.torrent` in the working directory
    pub fn output_path(&self) -> PathBuf {
        self.output.clone().unwrap_or_else(|| {
            let name = self.name.clone().unwrap_or_else(|| {
                self.source
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or("output")
                    .to_string()
            });
            PathBuf::from(format!("{}.torrent", name))
        })
    }

    /// Convert CLI arguments to TorrentOptions
    pub fn to_options(&self) -> TorrentOptions {
        TorrentOptions {
            piece_length: self.piece_length,
            private: self.private,
            comment: self.comment.clone(),
            announce: self.announce.clone(),
            web_seed: self.web_seed.clone(),
            source_string: self.source_string.clone(),
            no_date: self.no_date,
            creation_date: self.date,
            name: self.name.clone(),
            exclude: self.exclude.clone(),
        }
    }
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Path to the .torrent file
    #[arg(value_name = "TORRENT")]
    pub torrent: PathBuf,

    /// Also require a complete torrent and compare recorded sizes with this content
    #[arg(long = "content", value_name = "PATH")]
    pub content: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Path to the .torrent file
    #[arg(value_name = "TORRENT")]
    pub torrent: PathBuf,

    /// Content file or directory (defaults to the torrent name in the current directory)
    #[arg(value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// Rehash the content and compare every piece, not just file sizes
    #[arg(long = "deep")]
    pub deep: bool,

    /// Number of threads for hashing (defaults to number of CPU cores)
    #[arg(short = 't', long = "threads", value_name = "N")]
    pub threads: Option<usize>,
}

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Path to the .torrent file
    #[arg(value_name = "TORRENT")]
    pub torrent: PathBuf,

    /// Print a JSON summary instead of the human-readable view
    #[arg(long = "json")]
    pub json: bool,
}
