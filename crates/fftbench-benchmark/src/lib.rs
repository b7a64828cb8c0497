//! fftbench Benchmark - sweep driver and reporting
//!
//! This crate turns a [`TestConfiguration`](fftbench_core::TestConfiguration)
//! and a [`TransformEngine`](fftbench_engine::TransformEngine) into timed
//! results:
//! - [`Harness`] walks the size sweep and writes the results table
//! - [`RunExecutor`] times one repetition of one size
//! - [`WallClock`] / [`UserClock`] and the pause hooks
//! - [`WisdomStore`] persists engine wisdom between runs
//! - [`report`] renders the table, CSV and Markdown

pub mod clock;
pub mod driver;
pub mod executor;
pub mod pause;
pub mod report;
pub mod result;
pub mod wisdom;

pub use clock::{clock_for, UserClock, WallClock};
pub use driver::Harness;
pub use executor::RunExecutor;
pub use pause::{pause_for, NoPause, StdinPause, PAUSE_PROMPT};
pub use report::{CsvExporter, MarkdownReport};
pub use result::{SweepResult, TimingLine};
pub use wisdom::WisdomStore;
