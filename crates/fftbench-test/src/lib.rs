//! Shared test fixtures for fftbench crates.
//!
//! - [`engine`] - a recording [`MockEngine`] that never transforms anything
//! - [`clock`] - a [`ScriptedClock`] replaying fixed elapsed times, and a
//!   [`CountingPause`]
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! fftbench-test = { workspace = true }
//! ```

pub mod clock;
pub mod engine;

pub use clock::{CountingPause, ScriptedClock};
pub use engine::{MockEngine, MockPlan};
