use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::path::PathBuf;

use crate::config::CREATED_BY;
use crate::error::{Error, Result};
use crate::hashing::{CancelToken, HashOptions};
use crate::models::{Dict, Document, FileInfo, Torrent, TorrentOptions, Value};
use crate::piece::{calculate_num_pieces, calculate_piece_length, clamp_piece_exp};
use crate::scanner::scan_files;

/// What a build would produce, without hashing anything
#[derive(Debug, Clone)]
pub struct BuildPlan {
    pub files: Vec<FileInfo>,
    pub total_size: u64,
    pub piece_length: u64,
    /// `piece_length` as a power of two
    pub piece_exp: u32,
    pub num_pieces: u64,
}

/// Builder for creating torrent files
pub struct TorrentBuilder {
    source: PathBuf,
    output_file: Option<PathBuf>,
    options: TorrentOptions,
    show_progress: bool,
    hash_options: HashOptions,
}

impl TorrentBuilder {
    /// Create a new TorrentBuilder
    pub fn new(source: PathBuf, options: TorrentOptions) -> Self {
        Self {
            source,
            output_file: None,
            options,
            show_progress: false,
            hash_options: HashOptions::default(),
        }
    }

    /// Set the output file path for exclusion from scanning
    pub fn with_output_file(mut self, output: PathBuf) -> Self {
        self.output_file = Some(output);
        self
    }

    /// Enable progress bar
    pub fn with_progress(mut self, progress: bool) -> Self {
        self.show_progress = progress;
        self
    }

    /// Set the number of threads for hashing
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.hash_options = self.hash_options.with_threads(threads);
        self
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.hash_options = self.hash_options.with_cancel(cancel);
        self
    }

    /// Scan files and choose a piece length without hashing
    pub fn dry_run(&self) -> Result<BuildPlan> {
        tracing::debug!(
            source = %self.source.display(),
            name = ?self.options.name,
            announce = ?self.options.announce,
            private = self.options.private,
            "scanning content"
        );

        let (files, total_size) = scan_files(
            &self.source,
            self.output_file.as_deref(),
            &self.options.exclude,
        )?;

        if files.is_empty() || total_size == 0 {
            return Err(Error::EmptyContent(self.source.clone()));
        }

        let piece_exp = match self.options.piece_length {
            Some(requested) => {
                let power = clamp_piece_exp(requested);
                if power != requested {
                    tracing::warn!(
                        "Requested piece length 2^{} is out of range, using 2^{}",
                        requested,
                        power
                    );
                }
                power
            }
            None => calculate_piece_length(total_size),
        };
        let piece_length = 1u64 << piece_exp;
        let num_pieces = calculate_num_pieces(total_size, piece_length);

        tracing::debug!(
            "Using piece length: {} bytes (2^{}), {} pieces over {} bytes",
            piece_length,
            piece_exp,
            num_pieces,
            total_size
        );

        Ok(BuildPlan {
            files,
            total_size,
            piece_length,
            piece_exp,
            num_pieces,
        })
    }

    /// Build the torrent: scan, assemble the metainfo, then hash the content
    pub fn build(self) -> Result<Torrent> {
        let plan = self.dry_run()?;
        let metainfo = self.assemble(&plan);

        let mut hash_options = self.hash_options.clone();
        let progress = self.show_progress.then(|| progress_bar(plan.total_size));
        if let Some(pb) = &progress {
            hash_options = hash_options.with_progress(pb.clone());
        }

        let mut torrent = Torrent::new(metainfo).with_content(self.source);
        let result = torrent.generate(&hash_options);
        if let Some(pb) = progress {
            pb.finish_and_clear();
        }
        result?;

        tracing::info!("Built torrent with {} pieces", torrent.piece_count());
        Ok(torrent)
    }

    fn assemble(&self, plan: &BuildPlan) -> Document {
        let name = self.options.name.clone().unwrap_or_else(|| {
            self.source
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("output")
                .to_string()
        });

        let mut info = Dict::new();
        info.insert("name", name);
        info.insert("piece length", plan.piece_length);
        if self.source.is_dir() {
            let entries: Vec<Value> = plan
                .files
                .iter()
                .map(|f| {
                    let segments: Vec<Value> = f
                        .path
                        .components()
                        .map(|c| Value::from(c.as_os_str().to_string_lossy().into_owned()))
                        .collect();
                    Value::Dict(Dict::from_iter([("path", Value::List(segments))]))
                })
                .collect();
            info.insert("files", entries);
        }
        if self.options.private {
            info.insert("private", true);
        }
        if let Some(source) = &self.options.source_string {
            info.insert("source", source.as_str());
        }

        let mut root = Dict::new();
        let tiers = announce_tiers(&self.options.announce);
        if let Some(first) = tiers.first().and_then(|tier| tier.first()) {
            root.insert("announce", first.as_str());
            // A single tracker needs no announce-list
            if tiers.len() > 1 || tiers[0].len() > 1 {
                let list: Vec<Value> = tiers
                    .iter()
                    .map(|tier| {
                        Value::List(tier.iter().map(|url| Value::from(url.as_str())).collect())
                    })
                    .collect();
                root.insert("announce-list", list);
            }
        }
        if let Some(comment) = &self.options.comment {
            root.insert("comment", comment.as_str());
        }
        root.insert("created by", CREATED_BY);
        if !self.options.no_date {
            let date = self
                .options
                .creation_date
                .unwrap_or_else(|| chrono::Utc::now().timestamp());
            root.insert("creation date", date);
        }
        if !self.options.web_seed.is_empty() {
            let seeds: Vec<Value> = self
                .options
                .web_seed
                .iter()
                .map(|s| Value::from(s.as_str()))
                .collect();
            root.insert("url-list", seeds);
        }
        root.insert("info", info);

        Document::from_dict(root)
    }
}

/// Split `-a` arguments into tiers; URLs within one argument are comma-separated
fn announce_tiers(announce: &[String]) -> Vec<Vec<String>> {
    announce
        .iter()
        .map(|tier| {
            tier.split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
        })
        .filter(|tier| !tier.is_empty())
        .collect()
}

fn progress_bar(total_size: u64) -> ProgressBar {
    let pb = ProgressBar::new(total_size);
    pb.set_draw_target(ProgressDrawTarget::stderr_with_hz(10));
    if let Ok(style) = ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] {bar:40.202/94} {bytes}/{total_bytes} ({eta}) {msg}",
    ) {
        pb.set_style(style.progress_chars("█▓▒░"));
    }
    pb.set_message("Hashing...");
    pb
}
