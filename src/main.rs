use anyhow::{Context, Result};
use clap::Parser;
use rusty_numpy::generator::{self, Revision};
use rusty_numpy::ArrayFileWriter;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Write the sample arrays as .npy files
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Directory the files are written to; created if missing
    #[arg(short, long, default_value = "data")]
    output_dir: PathBuf,

    /// Which set of arrays to write (3, 5 or 6)
    #[arg(short, long, default_value_t = Revision::default())]
    revision: Revision,

    /// fsync every file before moving it into place
    #[arg(long)]
    sync: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("rusty_numpy={0},generate_arrays={0}", log_level))
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let writer = ArrayFileWriter::new().sync(args.sync);
    let paths = generator::run(&args.output_dir, args.revision, &writer)
        .with_context(|| format!("failed to save arrays in {}", args.output_dir.display()))?;
    debug!(count = paths.len(), "all arrays written");

    println!("Arrays saved in the {} folder", args.output_dir.display());
    Ok(())
}
