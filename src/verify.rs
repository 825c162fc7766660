use anyhow::{Context, Result};
use console::{Emoji, style};
use indicatif::{ProgressBar, ProgressStyle};

use torforge::cli::VerifyArgs;
use torforge::{Depth, HashOptions, Torrent};

static SUCCESS: Emoji<'_, '_> = Emoji("✅ ", "OK ");
static ERROR: Emoji<'_, '_> = Emoji("❌ ", "ERR ");

pub fn verify_torrent(args: VerifyArgs) -> Result<()> {
    let torrent = Torrent::read(&args.torrent)
        .with_context(|| format!("Failed to read torrent file: {}", args.torrent.display()))?;

    // Without an explicit path the content is expected next to the caller
    let content_root = match args.path {
        Some(path) => path,
        None => std::env::current_dir()?.join(torrent.name().unwrap_or_default()),
    };

    println!(
        "Verifying torrent: {}",
        style(torrent.name().unwrap_or_default()).bold()
    );
    println!("Content path: {}", style(content_root.display()).cyan());

    let depth = if args.deep { Depth::Pieces } else { Depth::Sizes };
    let mut options = HashOptions::default();
    if let Some(threads) = args.threads {
        options = options.with_threads(threads);
    }
    let progress = args.deep.then(|| {
        let pb = ProgressBar::new(torrent.total_size());
        if let Ok(style) = ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {bytes}/{total_bytes} Verifying",
        ) {
            pb.set_style(style.progress_chars("#>- "));
        }
        pb
    });
    if let Some(pb) = &progress {
        options = options.with_progress(pb.clone());
    }

    let torrent = torrent.with_content(&content_root);
    let result = torrent.verify(depth, &options);
    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    match result {
        Ok(()) => {
            let what = match depth {
                Depth::Sizes => "All file sizes match",
                Depth::Pieces => "All pieces match",
            };
            println!("\n{} {}", SUCCESS, style(what).green().bold());
            Ok(())
        }
        Err(e) => {
            println!("\n{} {}", ERROR, style("Verification Failed!").red().bold());
            Err(e.into())
        }
    }
}
