use anyhow::{Context, Result};
use clap::Parser;
use console::{Emoji, style};
use indicatif::HumanBytes;
use tracing_subscriber::EnvFilter;

use torforge::cli::{CheckArgs, Cli, Command, CreateArgs};
use torforge::{Depth, HashOptions, Torrent, TorrentBuilder};

mod inspect;
mod verify;

static DRY_RUN: Emoji<'_, '_> = Emoji("🏃 ", "DRY-RUN ");
static CHECK: Emoji<'_, '_> = Emoji("✅ ", "OK ");

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Create(args) => create_torrent(args),
        Command::Check(args) => check_torrent(args),
        Command::Verify(args) => verify::verify_torrent(args),
        Command::Inspect(args) => inspect::inspect_torrent(args),
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn create_torrent(args: CreateArgs) -> Result<()> {
    let output_path = args.output_path();
    let options = args.to_options();

    let mut builder = TorrentBuilder::new(args.source.clone(), options)
        .with_output_file(output_path.clone())
        .with_progress(args.progress);

    if let Some(t) = args.threads {
        builder = builder.with_threads(t);
    }

    if args.dry_run {
        eprintln!("{} {}", DRY_RUN, style("Dry run: scanning files...").bold());
        let plan = builder.dry_run()?;
        println!("{} {}", CHECK, style("Dry Run Results:").bold().underlined());
        println!(
            "{:<15} {}",
            style("Total Size:").bold(),
            style(HumanBytes(plan.total_size)).green()
        );
        println!("{:<15} {}", style("File Count:").bold(), plan.files.len());
        println!(
            "{:<15} {} (2^{})",
            style("Piece Length:").bold(),
            style(HumanBytes(plan.piece_length)).yellow(),
            plan.piece_exp
        );
        println!("{:<15} {}", style("Piece Count:").bold(), plan.num_pieces);
        return Ok(());
    }

    let torrent = builder.build()?;

    tracing::debug!("Writing to: {}", output_path.display());
    torrent.write(&output_path, args.force).with_context(|| {
        format!(
            "Failed to write torrent file (use -f to overwrite): {}",
            output_path.display()
        )
    })?;

    println!("Created: {}", output_path.display());
    Ok(())
}

fn check_torrent(args: CheckArgs) -> Result<()> {
    let torrent = Torrent::read(&args.torrent)
        .with_context(|| format!("Failed to load torrent: {}", args.torrent.display()))?;

    if let Some(content) = args.content {
        torrent
            .with_content(content)
            .verify(Depth::Sizes, &HashOptions::default())?;
    }

    println!("{} {}", CHECK, style("Metainfo is valid").green().bold());
    Ok(())
}
