use anyhow::{Context, Result};
use console::{Emoji, style};
use indicatif::HumanBytes;
use serde::Serialize;

use torforge::Torrent;
use torforge::Value;
use torforge::cli::InspectArgs;

static INFO: Emoji<'_, '_> = Emoji("ℹ️ ", "i ");
static FILES: Emoji<'_, '_> = Emoji("📁 ", "f ");
static TRACKERS: Emoji<'_, '_> = Emoji("📡 ", "t ");

/// Machine-readable view printed by `inspect --json`
#[derive(Debug, Serialize)]
struct Summary {
    name: Option<String>,
    info_hash: String,
    total_size: u64,
    piece_length: Option<u64>,
    piece_count: usize,
    private: bool,
    comment: Option<String>,
    created_by: Option<String>,
    creation_date: Option<i64>,
    trackers: Vec<Vec<String>>,
    web_seeds: Vec<String>,
    files: Vec<FileSummary>,
}

#[derive(Debug, Serialize)]
struct FileSummary {
    path: String,
    length: u64,
}

pub fn inspect_torrent(args: InspectArgs) -> Result<()> {
    let path = args.torrent;
    let torrent = Torrent::read(&path)
        .with_context(|| format!("Failed to read torrent file: {}", path.display()))?;
    let summary = summarize(&torrent)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("{} {}", INFO, style("Torrent Metadata:").bold());
    if let Some(name) = &summary.name {
        println!("{:<15} {}", style("Name:").bold(), style(name).cyan());
    }
    if let Some(comment) = &summary.comment {
        println!("{:<15} {}", style("Comment:").bold(), comment);
    }
    if let Some(created_by) = &summary.created_by {
        println!("{:<15} {}", style("Created By:").bold(), created_by);
    }
    if let Some(date) = summary.creation_date {
        let datetime = chrono::DateTime::from_timestamp(date, 0)
            .map(|dt| dt.to_string())
            .unwrap_or_else(|| date.to_string());
        println!("{:<15} {}", style("Date:").bold(), datetime);
    }

    println!(
        "{:<15} {}",
        style("Total Size:").bold(),
        style(HumanBytes(summary.total_size)).green()
    );
    if let Some(piece_length) = summary.piece_length {
        println!(
            "{:<15} {}",
            style("Piece Size:").bold(),
            style(HumanBytes(piece_length)).yellow()
        );
    }
    println!("{:<15} {}", style("Piece Count:").bold(), summary.piece_count);
    println!(
        "{:<15} {}",
        style("Private:").bold(),
        if summary.private {
            style("yes").red()
        } else {
            style("no").dim()
        }
    );
    println!("{:<15} {}", style("Info Hash:").bold(), summary.info_hash);

    println!("\n{} {}", TRACKERS, style("Trackers:").bold());
    for (i, tier) in summary.trackers.iter().enumerate() {
        for tracker in tier {
            println!("  {} {}", style(i + 1).dim(), style(tracker).underlined());
        }
    }

    if !summary.web_seeds.is_empty() {
        println!("\n{}", style("Web Seeds:").bold());
        for url in &summary.web_seeds {
            println!("  - {}", style(url).underlined());
        }
    }

    println!("\n{} {}", FILES, style("Files:").bold());
    for (i, file) in summary.files.iter().enumerate() {
        if i >= 20 {
            println!("  ... and {} more files", style(summary.files.len() - 20).dim());
            break;
        }
        println!("  - {:<40} {}", file.path, style(HumanBytes(file.length)).dim());
    }

    Ok(())
}

fn summarize(torrent: &Torrent) -> Result<Summary> {
    let root = torrent.metainfo.root();
    let text = |key: &str| root.get(key).and_then(Value::as_str).map(str::to_string);

    let web_seeds = match root.get("url-list") {
        Some(Value::Str(url)) => vec![url.clone()],
        Some(Value::List(urls)) => urls
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    };

    Ok(Summary {
        name: torrent.name().map(str::to_string),
        info_hash: hex::encode(torrent.info_hash()?),
        total_size: torrent.total_size(),
        piece_length: torrent.piece_length(),
        piece_count: torrent.piece_count(),
        private: torrent.is_private(),
        comment: text("comment"),
        created_by: text("created by"),
        creation_date: root.get("creation date").and_then(Value::as_int),
        trackers: torrent.trackers(),
        web_seeds,
        files: torrent
            .files()
            .into_iter()
            .map(|(path, length)| FileSummary {
                path: path.join("/"),
                length,
            })
            .collect(),
    })
}
