//! Configuration files for fftbench.
//!
//! Every setting of a sweep can be given a default in a TOML or YAML file.
//! File values are applied on top of the built-in defaults, and CLI flags
//! are applied on top of the file.
//!
//! # Examples
//!
//! ```
//! use fftbench_config::BenchFileConfig;
//! use fftbench_core::{SignalDomain, TestConfiguration};
//!
//! let file = BenchFileConfig::from_toml_str(r#"
//!     domain = "complex"
//!     loops = 4
//!     min_size = 64
//!     max_size = "1k"
//! "#).unwrap();
//!
//! let config = file.apply_to(TestConfiguration::default()).unwrap();
//! assert_eq!(config.domain(), SignalDomain::Complex);
//! assert_eq!(config.loops(), 4);
//! assert_eq!(config.max_size(), 1024);
//! ```
//!
//! Use defaults when the file is missing:
//!
//! ```
//! use fftbench_config::BenchFileConfig;
//!
//! let file = BenchFileConfig::load("fftbench.toml").unwrap_or_default();
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use fftbench_core::{
    parse_size_spec, Direction, Placement, PlanEffort, Precision, ReportMode, SignalDomain,
    TestConfiguration, ThreadCount, TimingMode,
};

/// File looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "fftbench.toml";

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// A size bound written either as a number or as a size expression.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum SizeSetting {
    Count(usize),
    Expr(String),
}

impl SizeSetting {
    /// Resolves to a number of points.
    pub fn resolve(&self) -> Result<usize, ConfigError> {
        match self {
            SizeSetting::Count(n) => Ok(*n),
            SizeSetting::Expr(s) => {
                parse_size_spec(s).map_err(|e| ConfigError::Invalid(e.to_string()))
            }
        }
    }
}

impl fmt::Display for SizeSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SizeSetting::Count(n) => write!(f, "{}", n),
            SizeSetting::Expr(s) => f.write_str(s),
        }
    }
}

/// Contents of a configuration file. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct BenchFileConfig {
    pub domain: Option<SignalDomain>,
    pub precision: Option<Precision>,
    pub placement: Option<Placement>,
    pub direction: Option<Direction>,
    pub timing: Option<TimingMode>,
    pub effort: Option<PlanEffort>,
    pub report: Option<ReportMode>,
    pub loops: Option<u32>,
    /// Worker threads; `0` means one per core.
    pub threads: Option<usize>,
    pub min_size: Option<SizeSetting>,
    pub max_size: Option<SizeSetting>,
    pub pause: Option<bool>,
    pub verbose: Option<bool>,
    pub seed: Option<u64>,
    pub wisdom_dir: Option<PathBuf>,
    pub csv_output: Option<PathBuf>,
    pub markdown_output: Option<PathBuf>,
}

impl BenchFileConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a configuration file. `.yaml` and `.yml` files are parsed as
    /// YAML, anything else as TOML.
    ///
    /// # Errors
    ///
    /// Returns error if the file doesn't exist or fails to parse.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml_file(path),
            _ => Self::from_toml_file(path),
        }
    }

    /// Like [`load`](Self::load), but a missing file yields the defaults.
    /// A file that exists and is malformed is still an error.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        match Self::load(path) {
            Err(ConfigError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// Loads configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Loads configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Parses configuration from a YAML string.
    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(s)?)
    }

    /// Sets the sweep bounds.
    pub fn with_size_bounds(mut self, min: SizeSetting, max: SizeSetting) -> Self {
        self.min_size = Some(min);
        self.max_size = Some(max);
        self
    }

    /// Sets the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Overrides the fields of `config` that this file sets.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for an unparsable size expression.
    /// Range checks are left to [`TestConfiguration::validate`].
    pub fn apply_to(&self, mut config: TestConfiguration) -> Result<TestConfiguration, ConfigError> {
        if let Some(domain) = self.domain {
            config = config.with_domain(domain);
        }
        if let Some(precision) = self.precision {
            config = config.with_precision(precision);
        }
        if let Some(placement) = self.placement {
            config = config.with_placement(placement);
        }
        if let Some(direction) = self.direction {
            config = config.with_direction(direction);
        }
        if let Some(timing) = self.timing {
            config = config.with_timing(timing);
        }
        if let Some(effort) = self.effort {
            config = config.with_effort(effort);
        }
        if let Some(report) = self.report {
            config = config.with_report_mode(report);
        }
        if let Some(loops) = self.loops {
            config = config.with_loops(loops);
        }
        if let Some(threads) = self.threads {
            config = config.with_threads(ThreadCount::from_cli(threads));
        }
        if let Some(min) = &self.min_size {
            config = config.with_min_size(min.resolve()?);
        }
        if let Some(max) = &self.max_size {
            config = config.with_max_size(max.resolve()?);
        }
        if let Some(pause) = self.pause {
            config = config.with_pause(pause);
        }
        if let Some(verbose) = self.verbose {
            config = config.with_verbose(verbose);
        }
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests;
