//! fftbench Core - types and sizing policy for the 2-D FFT throughput harness
//!
//! This crate holds everything that does not touch a transform engine:
//! - [`TestConfiguration`] and its enums
//! - [`Shape`] and size expressions
//! - [`BufferLayout`] planning and [`TransformBuffers`]
//! - the [`SizeSweep`], repetition policy and [`TimingAccumulator`]
//! - the [`ThroughputModel`]
//! - the [`Clock`] and [`Pause`] hooks used around timed repetitions

pub mod buffers;
pub mod config;
pub mod error;
pub mod layout;
pub mod repetition;
pub mod scalar;
pub mod size;
pub mod sweep;
pub mod throughput;
pub mod timing;

pub use buffers::{as_complex, as_complex_mut, as_scalars_mut, BufferViews, TransformBuffers};
pub use config::{
    Direction, Placement, PlanEffort, Precision, ReportMode, SignalDomain, TestConfiguration,
    ThreadCount, TimingMode, LOOPS_DEFAULT, MAX_SIZE_DEFAULT, MIN_SIZE_DEFAULT,
};
pub use error::{BenchError, Result};
pub use layout::BufferLayout;
pub use repetition::{complex_equivalent, repetitions_for, TimingAccumulator};
pub use scalar::Scalar;
pub use size::{log2_exact, parse_size_spec, Shape, MIN_DIMENSION};
pub use sweep::{next_size, SizeSweep};
pub use throughput::{ThroughputModel, COMPLEX_DOMAIN_FACTOR, REAL_DOMAIN_FACTOR};
pub use timing::{Clock, Pause};
