use std::{fs::File, path::PathBuf, time::Instant};

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Parse a PGN game collection and report how many games it contains.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// The pgn file to parse.
    file: PathBuf,
    /// Parse sequentially instead of splitting the file into concurrent
    /// chunks.
    #[arg(long)]
    sync: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let start = Instant::now();

    let count = if args.sync {
        let file = File::open(&args.file)
            .with_context(|| format!("open {}", args.file.display()))?;
        let (games, errors) = pgn::parse(file);
        if let Some(errors) = errors {
            eprintln!("{errors}");
        }
        games.len()
    } else {
        pgn::parse_concurrent(&args.file)
            .with_context(|| format!("parse {}", args.file.display()))?
            .len()
    };

    println!("{:?}", start.elapsed());
    println!("{count} games");

    Ok(())
}
