//! `fftbench2d`: two-dimensional FFT throughput benchmark.
//!
//! Settings come from the built-in defaults, then `fftbench.toml` (or the
//! file given with `--config`), then the command line. The results table
//! goes to stdout; progress and diagnostics go to stderr.

mod args;

use std::io;
use std::process::ExitCode;

use clap::Parser;
use thiserror::Error;
use tracing::info;

use fftbench_benchmark::{
    clock_for, pause_for, CsvExporter, Harness, MarkdownReport, SweepResult, WisdomStore,
};
use fftbench_config::{BenchFileConfig, ConfigError, DEFAULT_CONFIG_FILE};
use fftbench_core::{BenchError, Precision, Scalar, TestConfiguration};
use fftbench_engine::RustFftEngine;

use args::{Args, OutputPaths};

#[derive(Debug, Error)]
enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Bench(#[from] BenchError),

    #[error("cannot write report: {0}")]
    Report(#[from] io::Error),
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("***{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), CliError> {
    let file = match &args.config {
        Some(path) => BenchFileConfig::load(path)?,
        None => BenchFileConfig::load_or_default(DEFAULT_CONFIG_FILE)?,
    };
    let config = args.apply_to(file.apply_to(TestConfiguration::default())?);
    config.validate()?;
    fftbench_console::init(config.verbose());

    let paths = OutputPaths::resolve(args, &file);
    let result = match config.precision() {
        Precision::Single => sweep::<f32>(config, &paths)?,
        Precision::Double => sweep::<f64>(config, &paths)?,
    };

    if let Some(path) = &paths.csv {
        CsvExporter::to_file(&result, path)?;
        info!(event = "report_written", path = %path.display());
    }
    if let Some(path) = &paths.markdown {
        MarkdownReport::to_file(&result, path)?;
        info!(event = "report_written", path = %path.display());
    }
    Ok(())
}

fn sweep<T: Scalar>(
    config: TestConfiguration,
    paths: &OutputPaths,
) -> Result<SweepResult, BenchError> {
    let engine = RustFftEngine::<T>::new()?;
    let clock = clock_for(config.timing());
    let pause = pause_for(config.pause());
    let store = match &paths.wisdom_dir {
        Some(dir) => WisdomStore::new(dir),
        None => WisdomStore::default_location(),
    };

    let mut harness = Harness::<T, _, _, _, _>::new(config, engine, clock, pause, io::stdout())
        .with_wisdom_store(Some(store));
    harness.run()
}
