//! Throughput model.
//!
//! The operation count is the analytical `n log2 n` estimate used by older
//! benchmark tables, not a measured flop count. Keep the formula as is so
//! rates stay comparable.

use crate::config::{Direction, SignalDomain};
use crate::size::Shape;

/// Operation factor for complex transforms.
pub const COMPLEX_DOMAIN_FACTOR: f64 = 5.0;
/// Operation factor for real transforms (packed, about half the work).
pub const REAL_DOMAIN_FACTOR: f64 = 2.5;

/// Converts sizes and timings into the CTGs rate.
pub struct ThroughputModel;

impl ThroughputModel {
    /// Fixed per-domain factor.
    pub fn domain_factor(domain: SignalDomain) -> f64 {
        match domain {
            SignalDomain::Real => REAL_DOMAIN_FACTOR,
            SignalDomain::Complex => COMPLEX_DOMAIN_FACTOR,
        }
    }

    /// `loops` for forward-only runs, `2 * loops` for round trips.
    pub fn direction_factor(direction: Direction, loops: u32) -> f64 {
        match direction {
            Direction::ForwardOnly => loops as f64,
            Direction::RoundTrip => 2.0 * loops as f64,
        }
    }

    /// Estimated operations for one timed window.
    ///
    /// # Example
    ///
    /// ```
    /// use fftbench_core::{Direction, Shape, SignalDomain, ThroughputModel};
    ///
    /// let shape = Shape::square(32).unwrap();
    /// let ops = ThroughputModel::estimated_ops(shape, SignalDomain::Complex, 1, Direction::RoundTrip);
    /// assert_eq!(ops, 102_400.0);
    /// ```
    pub fn estimated_ops(
        shape: Shape,
        domain: SignalDomain,
        loops: u32,
        direction: Direction,
    ) -> f64 {
        shape.total_elements() as f64
            * shape.log2_total() as f64
            * Self::direction_factor(direction, loops)
            * Self::domain_factor(domain)
    }

    /// Billions of estimated operations per second.
    pub fn rate(ops: f64, elapsed_secs: f64) -> f64 {
        if elapsed_secs > 0.0 {
            ops / elapsed_secs / 1.0e9
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complex_round_trip_ops() {
        let shape = Shape::new(32, 32).unwrap();
        let ops =
            ThroughputModel::estimated_ops(shape, SignalDomain::Complex, 1, Direction::RoundTrip);
        assert_eq!(ops, 1024.0 * 10.0 * 2.0 * 5.0);
        let rate = ThroughputModel::rate(ops, 0.001);
        assert!((rate - 102_400.0 / 0.001 / 1e9).abs() < 1e-12);
    }

    #[test]
    fn test_real_forward_only_ops() {
        let shape = Shape::new(64, 128).unwrap();
        let ops =
            ThroughputModel::estimated_ops(shape, SignalDomain::Real, 10, Direction::ForwardOnly);
        assert_eq!(ops, 8192.0 * 13.0 * 10.0 * 2.5);
    }

    #[test]
    fn test_real_is_half_of_complex() {
        let shape = Shape::square(256).unwrap();
        let real = ThroughputModel::estimated_ops(shape, SignalDomain::Real, 3, Direction::RoundTrip);
        let complex =
            ThroughputModel::estimated_ops(shape, SignalDomain::Complex, 3, Direction::RoundTrip);
        assert_eq!(real * 2.0, complex);
    }

    #[test]
    fn test_rate_with_zero_elapsed() {
        assert_eq!(ThroughputModel::rate(1.0e9, 0.0), 0.0);
        assert_eq!(ThroughputModel::rate(2.0e9, 1.0), 2.0);
    }
}
