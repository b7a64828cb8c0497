//! fftbench Engine - the transform engine capability and its RustFFT backend
//!
//! The harness talks to engines only through [`TransformEngine`]. Plans are
//! held in [`PlanGuard`]s so they are released on every exit path.
//!
//! [`RustFftEngine`] computes 2-D transforms as a row pass followed by a
//! column pass, spread over a private rayon pool.

pub mod backend;
pub mod engine;
pub mod passes;
pub mod strategy;
pub mod transpose;

pub use backend::{RustFftEngine, RustFftPlan};
pub use engine::{PlanGuard, PlanRequest, TransformEngine};
pub use strategy::{ColumnStrategy, StrategyWisdom};
