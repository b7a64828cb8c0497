//! Sweep result types.

use fftbench_core::{Precision, Shape, TestConfiguration, TimingMode};

/// One reported figure: a row of the results table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimingLine {
    pub shape: Shape,
    /// 1-based repetition that produced the line. In best-only mode this is
    /// the final repetition of the size.
    pub repetition: u32,
    /// Seconds for all loops of the repetition (the best of all
    /// repetitions in best-only mode).
    pub elapsed: f64,
    /// Throughput in CTGs.
    pub rate: f64,
}

impl TimingLine {
    pub fn log2_total(&self) -> u32 {
        self.shape.log2_total()
    }
}

/// Everything a sweep reported.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepResult {
    pub engine: String,
    pub description: String,
    pub precision: Precision,
    pub timing: TimingMode,
    pub options: String,
    pub loops: u32,
    pub threads: usize,
    /// Sizes fully benchmarked.
    pub sizes: usize,
    pub lines: Vec<TimingLine>,
}

impl SweepResult {
    /// Empty result for a sweep of `config` on `engine` with `threads` workers.
    pub fn new(config: &TestConfiguration, engine: &str, threads: usize) -> Self {
        Self {
            engine: engine.to_string(),
            description: config.domain().description().to_string(),
            precision: config.precision(),
            timing: config.timing(),
            options: config.options_summary(),
            loops: config.loops(),
            threads,
            sizes: 0,
            lines: Vec::new(),
        }
    }

    pub fn add_line(&mut self, line: TimingLine) {
        self.lines.push(line);
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Line with the highest throughput.
    pub fn best_rate(&self) -> Option<&TimingLine> {
        self.lines
            .iter()
            .max_by(|a, b| a.rate.total_cmp(&b.rate))
    }

    /// Lines reported for `shape`, in order.
    pub fn lines_for(&self, shape: Shape) -> impl Iterator<Item = &TimingLine> {
        self.lines.iter().filter(move |line| line.shape == shape)
    }
}
