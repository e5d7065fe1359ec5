use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use onebrc::generate::{self, DEFAULT_SEED};
use onebrc::logging;

/// Writes a synthetic `<city>;<value>` file
#[derive(Parser)]
#[command(name = "create_measurements", version)]
struct Cli {
    /// Number of lines to write
    lines: u64,

    /// Output path (truncated if it exists)
    output: PathBuf,

    /// Random seed
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,

    /// Increase log verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let started = Instant::now();
    let file = File::create(&cli.output)
        .with_context(|| format!("cannot create {}", cli.output.display()))?;
    generate::write_measurements(BufWriter::new(file), cli.lines, cli.seed)
        .with_context(|| format!("cannot write {}", cli.output.display()))?;

    info!(
        lines = cli.lines,
        path = %cli.output.display(),
        elapsed = ?started.elapsed(),
        "generated measurements"
    );
    Ok(())
}
