//! Size sweep.
//!
//! Sizes start square at `min x min` and grow one dimension at a time:
//! square -> one side doubled -> square at twice the size -> ...
//!
//! From a square size the real sweep doubles `cols` and the complex sweep
//! doubles `rows`. Result tables from older runs depend on this order, so
//! the two domains must stay asymmetric.

use crate::config::{SignalDomain, TestConfiguration};
use crate::error::{BenchError, Result};
use crate::size::Shape;

/// Returns the size that follows `current`, or `None` once the dimension
/// just doubled would exceed `max`.
///
/// # Example
///
/// ```
/// use fftbench_core::{next_size, Shape, SignalDomain};
///
/// let square = Shape::square(32).unwrap();
/// let next = next_size(square, SignalDomain::Real, 128).unwrap();
/// assert_eq!((next.rows(), next.cols()), (32, 64));
///
/// let next = next_size(square, SignalDomain::Complex, 128).unwrap();
/// assert_eq!((next.rows(), next.cols()), (64, 32));
/// ```
pub fn next_size(current: Shape, domain: SignalDomain, max: usize) -> Option<Shape> {
    let double_cols = match domain {
        SignalDomain::Real => current.is_square(),
        SignalDomain::Complex => !current.is_square(),
    };
    if double_cols {
        current.doubled_cols().filter(|next| next.cols() <= max)
    } else {
        current.doubled_rows().filter(|next| next.rows() <= max)
    }
}

/// Iterator over the sizes of one sweep.
///
/// Each sweep owns its own state, so independent sweeps never interfere.
///
/// # Example
///
/// ```
/// use fftbench_core::{SignalDomain, SizeSweep};
///
/// let sizes: Vec<_> = SizeSweep::new(SignalDomain::Complex, 64, 64)
///     .unwrap()
///     .map(|s| (s.rows(), s.cols()))
///     .collect();
/// assert_eq!(sizes, vec![(64, 64)]);
/// ```
#[derive(Debug, Clone)]
pub struct SizeSweep {
    domain: SignalDomain,
    min: usize,
    max: usize,
    next: Option<Shape>,
}

impl SizeSweep {
    /// Creates a sweep from `min x min` up to `max`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `min` is not a valid dimension or
    /// `min > max`.
    pub fn new(domain: SignalDomain, min: usize, max: usize) -> Result<Self> {
        let first = Shape::square(min)?;
        Shape::square(max)?;
        if min > max {
            return Err(BenchError::config(format!(
                "maximum size {} must be greater than or equal to minimum size {}",
                max, min
            )));
        }
        Ok(Self {
            domain,
            min,
            max,
            next: Some(first),
        })
    }

    /// Sweep described by a configuration's domain and bounds.
    pub fn for_config(config: &TestConfiguration) -> Result<Self> {
        Self::new(config.domain(), config.min_size(), config.max_size())
    }

    pub fn domain(&self) -> SignalDomain {
        self.domain
    }
}

impl Iterator for SizeSweep {
    type Item = Shape;

    fn next(&mut self) -> Option<Shape> {
        let current = self.next.take()?;
        // min == max means the caller wants exactly this one size.
        if self.min != self.max {
            self.next = next_size(current, self.domain, self.max);
        }
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sizes(domain: SignalDomain, min: usize, max: usize) -> Vec<(usize, usize)> {
        SizeSweep::new(domain, min, max)
            .unwrap()
            .map(|s| (s.rows(), s.cols()))
            .collect()
    }

    #[test]
    fn test_single_size_when_bounds_equal() {
        assert_eq!(sizes(SignalDomain::Complex, 64, 64), vec![(64, 64)]);
        assert_eq!(sizes(SignalDomain::Real, 64, 64), vec![(64, 64)]);
    }

    #[test]
    fn test_real_sweep_widens_first() {
        assert_eq!(
            sizes(SignalDomain::Real, 32, 128),
            vec![(32, 32), (32, 64), (64, 64), (64, 128), (128, 128)]
        );
    }

    #[test]
    fn test_complex_sweep_adds_rows_first() {
        assert_eq!(
            sizes(SignalDomain::Complex, 32, 128),
            vec![(32, 32), (64, 32), (64, 64), (128, 64), (128, 128)]
        );
    }

    #[test]
    fn test_dimensions_differ_by_at_most_one_doubling() {
        for domain in [SignalDomain::Real, SignalDomain::Complex] {
            for shape in SizeSweep::new(domain, 2, 1 << 12).unwrap() {
                let diff = shape.log2_rows().abs_diff(shape.log2_cols());
                assert!(diff <= 1, "{} has diverging dimensions", shape);
                assert!(shape.rows() <= 1 << 12 && shape.cols() <= 1 << 12);
            }
        }
    }

    #[test]
    fn test_next_size_stops_past_max() {
        let shape = Shape::square(128).unwrap();
        assert!(next_size(shape, SignalDomain::Real, 128).is_none());
        assert!(next_size(shape, SignalDomain::Complex, 128).is_none());
        let wide = Shape::new(64, 128).unwrap();
        assert!(next_size(wide, SignalDomain::Real, 64).is_none());
    }

    #[test]
    fn test_rejects_invalid_bounds() {
        assert!(SizeSweep::new(SignalDomain::Real, 100, 128).is_err());
        assert!(SizeSweep::new(SignalDomain::Real, 64, 96).is_err());
        assert!(SizeSweep::new(SignalDomain::Real, 256, 64).is_err());
    }

    #[test]
    fn test_independent_sweeps() {
        let mut a = SizeSweep::new(SignalDomain::Real, 2, 8).unwrap();
        let mut b = SizeSweep::new(SignalDomain::Real, 2, 8).unwrap();
        a.next();
        a.next();
        assert_eq!(b.next().map(|s| s.cols()), Some(2));
        assert_eq!(a.next().map(|s| (s.rows(), s.cols())), Some((4, 4)));
    }
}
