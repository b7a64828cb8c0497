use std::path::PathBuf;

use clap::Parser;

use fftbench_config::BenchFileConfig;
use fftbench_core::{
    parse_size_spec, Direction, Placement, PlanEffort, Precision, ReportMode, SignalDomain,
    TestConfiguration, ThreadCount, TimingMode,
};

/// Two-dimensional FFT throughput benchmark
#[derive(Parser, Debug)]
#[command(name = "fftbench2d", version, about)]
pub struct Args {
    /// Complex signals (default: real)
    #[arg(short = 'c')]
    pub complex: bool,

    /// Minimum width and height, e.g. 32 or 1k
    #[arg(short = 's', value_name = "MIN", value_parser = parse_size)]
    pub min_size: Option<usize>,

    /// Maximum width and height, e.g. 4k
    #[arg(short = 'S', value_name = "MAX", value_parser = parse_size)]
    pub max_size: Option<usize>,

    /// Out-of-place transforms (default: in-place)
    #[arg(short = 'o')]
    pub out_of_place: bool,

    /// Time forward transforms only
    #[arg(short = 'f')]
    pub forward_only: bool,

    /// Measure user CPU time (default: wall time)
    #[arg(short = 'u')]
    pub user_time: bool,

    /// Transform loops per timed repetition
    #[arg(short = 'l', value_name = "LOOPS")]
    pub loops: Option<u32>,

    /// Worker threads, 0 = one per core
    #[arg(short = 'T', value_name = "THREADS")]
    pub threads: Option<usize>,

    /// Single precision
    #[arg(short = 'p', conflicts_with = "double")]
    pub single: bool,

    /// Double precision
    #[arg(short = 'P')]
    pub double: bool,

    /// Plan with ESTIMATE (default: MEASURE)
    #[arg(short = 'e')]
    pub estimate: bool,

    /// Pause for CR after every repetition
    #[arg(short = 'z')]
    pub pause: bool,

    /// Report every repetition instead of the best one
    #[arg(short = 'a')]
    pub show_all: bool,

    /// Log buffer and plan setup
    #[arg(short = 'v')]
    pub verbose: bool,

    /// Real signals, overriding the configuration file
    #[arg(long, conflicts_with = "complex")]
    pub real: bool,

    /// In-place transforms, overriding the configuration file
    #[arg(long, conflicts_with = "out_of_place")]
    pub in_place: bool,

    /// Time forward and inverse transforms, overriding the configuration file
    #[arg(long, conflicts_with = "forward_only")]
    pub round_trip: bool,

    /// Measure wall time, overriding the configuration file
    #[arg(long, conflicts_with = "user_time")]
    pub wall_time: bool,

    /// Plan with MEASURE, overriding the configuration file
    #[arg(long, conflicts_with = "estimate")]
    pub measure: bool,

    /// Do not pause between repetitions, overriding the configuration file
    #[arg(long, conflicts_with = "pause")]
    pub no_pause: bool,

    /// Report only the best repetition, overriding the configuration file
    #[arg(long, conflicts_with = "show_all")]
    pub best_only: bool,

    /// Configuration file (default: fftbench.toml if present). Flags win over
    /// its values; the long counterparts such as --real and --in-place switch
    /// file settings back off.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Seed for the random input signal
    #[arg(long)]
    pub seed: Option<u64>,

    /// Directory for persisted engine wisdom
    #[arg(long, value_name = "DIR")]
    pub wisdom_dir: Option<PathBuf>,

    /// Also write the results as CSV
    #[arg(long, value_name = "PATH")]
    pub csv: Option<PathBuf>,

    /// Also write the results as Markdown
    #[arg(long, value_name = "PATH")]
    pub markdown: Option<PathBuf>,
}

fn parse_size(s: &str) -> Result<usize, String> {
    parse_size_spec(s).map_err(|e| e.to_string())
}

impl Args {
    /// Overrides the settings of `config` that were given on the command
    /// line. The short flags switch a setting on and their long counterparts
    /// switch it back; an absent flag keeps the value from the file or the
    /// defaults.
    pub fn apply_to(&self, mut config: TestConfiguration) -> TestConfiguration {
        if self.complex {
            config = config.with_domain(SignalDomain::Complex);
        }
        if self.real {
            config = config.with_domain(SignalDomain::Real);
        }
        if let Some(min) = self.min_size {
            config = config.with_min_size(min);
        }
        if let Some(max) = self.max_size {
            config = config.with_max_size(max);
        }
        if self.out_of_place {
            config = config.with_placement(Placement::OutOfPlace);
        }
        if self.in_place {
            config = config.with_placement(Placement::InPlace);
        }
        if self.forward_only {
            config = config.with_direction(Direction::ForwardOnly);
        }
        if self.round_trip {
            config = config.with_direction(Direction::RoundTrip);
        }
        if self.user_time {
            config = config.with_timing(TimingMode::User);
        }
        if self.wall_time {
            config = config.with_timing(TimingMode::Wall);
        }
        if let Some(loops) = self.loops {
            config = config.with_loops(loops);
        }
        if let Some(threads) = self.threads {
            config = config.with_threads(ThreadCount::from_cli(threads));
        }
        if self.single {
            config = config.with_precision(Precision::Single);
        }
        if self.double {
            config = config.with_precision(Precision::Double);
        }
        if self.estimate {
            config = config.with_effort(PlanEffort::Estimate);
        }
        if self.measure {
            config = config.with_effort(PlanEffort::Measure);
        }
        if self.pause {
            config = config.with_pause(true);
        }
        if self.no_pause {
            config = config.with_pause(false);
        }
        if self.show_all {
            config = config.with_report_mode(ReportMode::ShowAll);
        }
        if self.best_only {
            config = config.with_report_mode(ReportMode::BestOnly);
        }
        if self.verbose {
            config = config.with_verbose(true);
        }
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        config
    }
}

/// Where wisdom and the optional reports go.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputPaths {
    pub wisdom_dir: Option<PathBuf>,
    pub csv: Option<PathBuf>,
    pub markdown: Option<PathBuf>,
}

impl OutputPaths {
    /// Flags win over the file.
    pub fn resolve(args: &Args, file: &BenchFileConfig) -> Self {
        Self {
            wisdom_dir: args.wisdom_dir.clone().or_else(|| file.wisdom_dir.clone()),
            csv: args.csv.clone().or_else(|| file.csv_output.clone()),
            markdown: args.markdown.clone().or_else(|| file.markdown_output.clone()),
        }
    }
}
