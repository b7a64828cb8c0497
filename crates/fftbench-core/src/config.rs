//! Test configuration.
//!
//! A [`TestConfiguration`] is built once from defaults, an optional config
//! file and CLI flags, validated, and then only read for the rest of the run.

use std::fmt;

use crate::error::{BenchError, Result};
use crate::size::{log2_exact, Shape, MIN_DIMENSION};

/// Default number of transform loops per timed repetition.
pub const LOOPS_DEFAULT: u32 = 10;
/// Default lower bound of the size sweep.
pub const MIN_SIZE_DEFAULT: usize = 32;
/// Default upper bound of the size sweep.
pub const MAX_SIZE_DEFAULT: usize = 4 * 1024;

/// Real or complex input signal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SignalDomain {
    #[default]
    Real,
    Complex,
}

impl SignalDomain {
    /// Whether this is the real-signal domain.
    pub fn is_real(self) -> bool {
        matches!(self, SignalDomain::Real)
    }

    /// Human-readable transform description used in the banner.
    pub fn description(self) -> &'static str {
        match self {
            SignalDomain::Real => "Two-dimension real",
            SignalDomain::Complex => "Two-dimension complex",
        }
    }
}

impl fmt::Display for SignalDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalDomain::Real => write!(f, "real"),
            SignalDomain::Complex => write!(f, "complex"),
        }
    }
}

/// Floating-point precision of the samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Precision {
    Single,
    Double,
}

impl Precision {
    /// Size in bytes of one real scalar.
    pub fn real_size(self) -> usize {
        match self {
            Precision::Single => std::mem::size_of::<f32>(),
            Precision::Double => std::mem::size_of::<f64>(),
        }
    }

    /// Size in bytes of one interleaved complex element.
    pub fn complex_size(self) -> usize {
        self.real_size() * 2
    }
}

impl Default for Precision {
    fn default() -> Self {
        if cfg!(feature = "single-precision") {
            Precision::Single
        } else {
            Precision::Double
        }
    }
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Precision::Single => write!(f, "single"),
            Precision::Double => write!(f, "double"),
        }
    }
}

/// Whether the forward output overwrites the input allocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Placement {
    #[default]
    InPlace,
    OutOfPlace,
}

impl Placement {
    pub fn is_in_place(self) -> bool {
        matches!(self, Placement::InPlace)
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Placement::InPlace => write!(f, "In-place"),
            Placement::OutOfPlace => write!(f, "Out-of-place"),
        }
    }
}

/// Which transforms run inside the timed window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Direction {
    /// Forward, inverse and normalisation.
    #[default]
    RoundTrip,
    /// Forward transform only.
    ForwardOnly,
}

impl Direction {
    pub fn is_forward_only(self) -> bool {
        matches!(self, Direction::ForwardOnly)
    }
}

/// Clock used for the timed window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum TimingMode {
    #[default]
    Wall,
    User,
}

impl fmt::Display for TimingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimingMode::Wall => write!(f, "Wall"),
            TimingMode::User => write!(f, "User"),
        }
    }
}

/// How much work the engine may spend building a plan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PlanEffort {
    /// Pick a strategy heuristically; never consults wisdom.
    Estimate,
    /// Time candidate strategies (or reuse wisdom).
    #[default]
    Measure,
}

impl PlanEffort {
    /// Whether persisted wisdom is useful for this effort level.
    pub fn uses_wisdom(self) -> bool {
        !matches!(self, PlanEffort::Estimate)
    }
}

impl fmt::Display for PlanEffort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanEffort::Estimate => write!(f, "ESTIMATE"),
            PlanEffort::Measure => write!(f, "MEASURE"),
        }
    }
}

/// Which repetitions produce a report line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ReportMode {
    /// One line per size carrying the fastest repetition.
    #[default]
    BestOnly,
    /// One line per repetition with its raw elapsed time.
    ShowAll,
}

/// Worker thread count handed to the transform engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ThreadCount {
    /// One thread per detected core.
    #[default]
    Auto,
    /// A specific number of threads.
    Count(usize),
}

impl ThreadCount {
    /// Maps the CLI convention (`0` = auto) onto a thread count.
    pub fn from_cli(threads: usize) -> Self {
        if threads == 0 {
            ThreadCount::Auto
        } else {
            ThreadCount::Count(threads)
        }
    }

    /// Resolves to an actual number of threads, never less than one.
    pub fn resolve(&self) -> usize {
        match self {
            ThreadCount::Auto => std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(1),
            ThreadCount::Count(n) => (*n).max(1),
        }
    }
}

/// Configuration for one benchmark sweep.
///
/// # Example
///
/// ```
/// use fftbench_core::{Placement, SignalDomain, TestConfiguration};
///
/// let config = TestConfiguration::new()
///     .with_domain(SignalDomain::Complex)
///     .with_placement(Placement::OutOfPlace)
///     .with_size_bounds(64, 1024)
///     .with_loops(4);
///
/// assert!(config.validate().is_ok());
/// assert_eq!(config.min_size(), 64);
/// assert_eq!(config.loops(), 4);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct TestConfiguration {
    domain: SignalDomain,
    precision: Precision,
    placement: Placement,
    direction: Direction,
    timing: TimingMode,
    effort: PlanEffort,
    report_mode: ReportMode,
    threads: ThreadCount,
    loops: u32,
    min_size: usize,
    max_size: usize,
    pause: bool,
    verbose: bool,
    seed: Option<u64>,
}

impl TestConfiguration {
    /// Creates a configuration with the built-in defaults.
    ///
    /// Defaults: real, in-place, round trip, wall time, `MEASURE`, best
    /// only, 10 loops, sizes 32 through 4096.
    pub fn new() -> Self {
        Self {
            domain: SignalDomain::default(),
            precision: Precision::default(),
            placement: Placement::default(),
            direction: Direction::default(),
            timing: TimingMode::default(),
            effort: PlanEffort::default(),
            report_mode: ReportMode::default(),
            threads: ThreadCount::default(),
            loops: LOOPS_DEFAULT,
            min_size: MIN_SIZE_DEFAULT,
            max_size: MAX_SIZE_DEFAULT,
            pause: false,
            verbose: false,
            seed: None,
        }
    }

    pub fn with_domain(mut self, domain: SignalDomain) -> Self {
        self.domain = domain;
        self
    }

    pub fn with_precision(mut self, precision: Precision) -> Self {
        self.precision = precision;
        self
    }

    pub fn with_placement(mut self, placement: Placement) -> Self {
        self.placement = placement;
        self
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_timing(mut self, timing: TimingMode) -> Self {
        self.timing = timing;
        self
    }

    pub fn with_effort(mut self, effort: PlanEffort) -> Self {
        self.effort = effort;
        self
    }

    pub fn with_report_mode(mut self, mode: ReportMode) -> Self {
        self.report_mode = mode;
        self
    }

    pub fn with_threads(mut self, threads: ThreadCount) -> Self {
        self.threads = threads;
        self
    }

    /// Sets the number of transform loops inside each timed window.
    pub fn with_loops(mut self, loops: u32) -> Self {
        self.loops = loops;
        self
    }

    /// Sets the inclusive sweep bounds.
    pub fn with_size_bounds(mut self, min: usize, max: usize) -> Self {
        self.min_size = min;
        self.max_size = max;
        self
    }

    pub fn with_min_size(mut self, min: usize) -> Self {
        self.min_size = min;
        self
    }

    pub fn with_max_size(mut self, max: usize) -> Self {
        self.max_size = max;
        self
    }

    /// Pause for operator input after every repetition.
    pub fn with_pause(mut self, pause: bool) -> Self {
        self.pause = pause;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Seeds the random signal generator for reproducible inputs.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn domain(&self) -> SignalDomain {
        self.domain
    }

    pub fn precision(&self) -> Precision {
        self.precision
    }

    pub fn placement(&self) -> Placement {
        self.placement
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn timing(&self) -> TimingMode {
        self.timing
    }

    pub fn effort(&self) -> PlanEffort {
        self.effort
    }

    pub fn report_mode(&self) -> ReportMode {
        self.report_mode
    }

    pub fn threads(&self) -> ThreadCount {
        self.threads
    }

    pub fn loops(&self) -> u32 {
        self.loops
    }

    pub fn min_size(&self) -> usize {
        self.min_size
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn pause(&self) -> bool {
        self.pause
    }

    pub fn verbose(&self) -> bool {
        self.verbose
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Checks bounds and loop count.
    ///
    /// # Errors
    ///
    /// Returns [`BenchError::Configuration`] when either bound is not a power
    /// of two of at least 2, when `min > max`, when `loops` is zero, or when
    /// a `max x max` sample count would overflow `usize`.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [("minimum", self.min_size), ("maximum", self.max_size)] {
            if value < MIN_DIMENSION || log2_exact(value).is_none() {
                return Err(BenchError::config(format!(
                    "{} size {} is not a power of two >= {}; this test only operates on powers of 2",
                    name, value, MIN_DIMENSION
                )));
            }
        }
        if self.min_size > self.max_size {
            return Err(BenchError::config(format!(
                "maximum size {} must be greater than or equal to minimum size {}",
                self.max_size, self.min_size
            )));
        }
        if self.loops == 0 {
            return Err(BenchError::config("loop count must be at least 1"));
        }
        // The largest square must have an addressable sample count.
        Shape::square(self.max_size)?;
        Ok(())
    }

    /// Options summary for the banner, e.g. `Forward only; Plan=MEASURE; In-place`.
    pub fn options_summary(&self) -> String {
        let mut parts = Vec::new();
        if self.direction.is_forward_only() {
            parts.push("Forward only".to_string());
        }
        parts.push(format!("Plan={}", self.effort));
        parts.push(self.placement.to_string());
        parts.join("; ")
    }
}

impl Default for TestConfiguration {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TestConfiguration::default();
        assert_eq!(config.domain(), SignalDomain::Real);
        assert_eq!(config.placement(), Placement::InPlace);
        assert_eq!(config.direction(), Direction::RoundTrip);
        assert_eq!(config.effort(), PlanEffort::Measure);
        assert_eq!(config.loops(), 10);
        assert_eq!(config.min_size(), 32);
        assert_eq!(config.max_size(), 4096);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_non_power_of_two() {
        let config = TestConfiguration::new().with_size_bounds(100, 128);
        assert!(matches!(
            config.validate(),
            Err(BenchError::Configuration(_))
        ));

        let config = TestConfiguration::new().with_size_bounds(64, 1000);
        assert!(matches!(
            config.validate(),
            Err(BenchError::Configuration(_))
        ));
    }

    #[test]
    fn test_validate_rejects_inverted_bounds() {
        let config = TestConfiguration::new().with_size_bounds(256, 128);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("greater than or equal"));
    }

    #[test]
    fn test_validate_rejects_tiny_and_zero_loops() {
        assert!(TestConfiguration::new()
            .with_size_bounds(1, 8)
            .validate()
            .is_err());
        assert!(TestConfiguration::new().with_loops(0).validate().is_err());
    }

    #[test]
    fn test_validate_rejects_unaddressable_max() {
        let half = 1usize << (usize::BITS / 2);
        let config = TestConfiguration::new().with_size_bounds(32, half);
        let err = config.validate().unwrap_err();
        assert!(matches!(err, BenchError::Configuration(_)));
        assert!(TestConfiguration::new()
            .with_size_bounds(32, half >> 1)
            .validate()
            .is_ok());
    }

    #[test]
    fn test_thread_count_resolve() {
        assert_eq!(ThreadCount::from_cli(0), ThreadCount::Auto);
        assert_eq!(ThreadCount::from_cli(3).resolve(), 3);
        assert!(ThreadCount::Auto.resolve() >= 1);
        assert_eq!(ThreadCount::Count(0).resolve(), 1);
    }

    #[test]
    fn test_options_summary() {
        let config = TestConfiguration::new()
            .with_direction(Direction::ForwardOnly)
            .with_effort(PlanEffort::Estimate)
            .with_placement(Placement::OutOfPlace);
        assert_eq!(
            config.options_summary(),
            "Forward only; Plan=ESTIMATE; Out-of-place"
        );
        assert_eq!(
            TestConfiguration::new().options_summary(),
            "Plan=MEASURE; In-place"
        );
    }

    #[test]
    fn test_precision_sizes() {
        assert_eq!(Precision::Single.real_size(), 4);
        assert_eq!(Precision::Single.complex_size(), 8);
        assert_eq!(Precision::Double.complex_size(), 16);
    }
}
