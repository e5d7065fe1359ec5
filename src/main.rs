use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;

use onebrc::config::{self, DEFAULT_BATCH_LINES, DEFAULT_QUEUE_CAPACITY};
use onebrc::{logging, ByteSource, EngineConfig, ReadMode, Report, Strategy};

#[derive(Parser, Debug)]
#[command(
    name = "onebrc",
    version,
    about = "Per-key min/mean/max over a `<key>;<value>` file"
)]
struct Cli {
    /// Input file of `<key>;<value>` lines
    file: PathBuf,

    /// Worker threads (defaults to the number of CPUs)
    #[arg(short, long)]
    threads: Option<usize>,

    /// How the input is divided between workers
    #[arg(long, value_enum, default_value_t = Strategy::Lines)]
    strategy: Strategy,

    /// How the input file is loaded
    #[arg(long = "read", value_enum, default_value_t = ReadMode::Mmap)]
    read_mode: ReadMode,

    /// Fail if the input has more than this many distinct keys
    #[arg(long)]
    max_keys: Option<usize>,

    /// Batches buffered by the queue strategy
    #[arg(long, default_value_t = DEFAULT_QUEUE_CAPACITY)]
    queue_capacity: usize,

    /// Lines per batch for the queue strategy
    #[arg(long, default_value_t = DEFAULT_BATCH_LINES)]
    batch_lines: usize,

    /// Print elapsed wall-clock time after the report
    #[arg(long)]
    time: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn engine_config(&self) -> EngineConfig {
        EngineConfig::default()
            .with_threads(self.threads.unwrap_or_else(config::default_threads))
            .with_strategy(self.strategy)
            .with_max_keys(self.max_keys)
            .with_queue_capacity(self.queue_capacity)
            .with_batch_lines(self.batch_lines)
    }
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return if err.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    logging::init(cli.verbose);
    debug!(?cli, "parsed arguments");

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("onebrc: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let started = Instant::now();
    let config = cli.engine_config();

    let source = ByteSource::open(&cli.file, cli.read_mode)?;
    let table = onebrc::aggregate(&source, &config)
        .with_context(|| format!("failed to aggregate {}", cli.file.display()))?;
    let report = Report::from_table(table);

    let mut out = BufWriter::new(io::stdout().lock());
    report
        .write_to(&mut out)
        .context("failed to write report")?;
    if cli.time {
        writeln!(out, "Time: {:.6} seconds", started.elapsed().as_secs_f64())?;
        out.flush()?;
    }
    Ok(())
}
