//! Repetition policy and best-time accumulation.

use crate::config::{ReportMode, SignalDomain};

/// `(upper bound on complex elements, repetitions)`, ascending.
const REPETITION_TABLE: &[(usize, u32)] = &[
    (1 << 10, 20),
    (1 << 14, 10),
    (1 << 18, 5),
    (1 << 22, 3),
];

/// Repetitions for problems larger than every table entry.
const MIN_REPETITIONS: u32 = 2;

/// Converts a sample count to the complex-equivalent count the repetition
/// table is keyed on. A real signal of `n` samples costs about as much as a
/// complex one of `n / 2`.
pub fn complex_equivalent(domain: SignalDomain, elements: usize) -> usize {
    match domain {
        SignalDomain::Complex => elements,
        SignalDomain::Real => (elements >> 1).max(1),
    }
}

/// Number of timed repetitions for a problem of `complex_elements`.
///
/// Never increases with size: small problems repeat often to smooth out
/// timer granularity, large ones a bounded few times.
///
/// # Example
///
/// ```
/// use fftbench_core::repetitions_for;
///
/// assert_eq!(repetitions_for(32 * 32), 20);
/// assert_eq!(repetitions_for(4096 * 4096), 2);
/// ```
pub fn repetitions_for(complex_elements: usize) -> u32 {
    REPETITION_TABLE
        .iter()
        .find(|(limit, _)| complex_elements <= *limit)
        .map(|(_, reps)| *reps)
        .unwrap_or(MIN_REPETITIONS)
}

/// Per-size timing state.
///
/// In [`ReportMode::BestOnly`] the fastest elapsed time is kept and handed
/// back once, on the final repetition. In [`ReportMode::ShowAll`] every
/// elapsed time is handed back unchanged.
///
/// # Example
///
/// ```
/// use fftbench_core::{ReportMode, TimingAccumulator};
///
/// let mut acc = TimingAccumulator::new(3, ReportMode::BestOnly);
/// assert_eq!(acc.record(5.0), None);
/// assert_eq!(acc.record(3.0), None);
/// assert_eq!(acc.record(4.0), Some(3.0));
/// assert!(acc.is_complete());
/// ```
#[derive(Debug, Clone)]
pub struct TimingAccumulator {
    best_time: Option<f64>,
    repetition: u32,
    total: u32,
    mode: ReportMode,
}

impl TimingAccumulator {
    /// Starts accumulation for a size with `total` repetitions.
    pub fn new(total: u32, mode: ReportMode) -> Self {
        Self {
            best_time: None,
            repetition: 0,
            total: total.max(1),
            mode,
        }
    }

    /// Records one repetition's elapsed seconds and returns the figure to
    /// report, if any.
    pub fn record(&mut self, elapsed: f64) -> Option<f64> {
        self.repetition += 1;
        match self.mode {
            ReportMode::ShowAll => Some(elapsed),
            ReportMode::BestOnly => {
                let best = match self.best_time {
                    Some(best) if best <= elapsed => best,
                    _ => elapsed,
                };
                self.best_time = Some(best);
                self.is_last().then_some(best)
            }
        }
    }

    /// Fastest elapsed time seen so far (best-only mode).
    pub fn best_time(&self) -> Option<f64> {
        self.best_time
    }

    /// Repetitions recorded so far.
    pub fn repetition(&self) -> u32 {
        self.repetition
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    /// Whether the most recent repetition was the last one.
    pub fn is_last(&self) -> bool {
        self.repetition == self.total
    }

    pub fn is_complete(&self) -> bool {
        self.repetition >= self.total
    }
}
