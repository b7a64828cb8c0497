//! Problem shapes and size expressions.

use std::fmt;

use crate::error::{BenchError, Result};

/// Smallest dimension the harness accepts.
pub const MIN_DIMENSION: usize = 2;

/// Returns `log2(n)` when `n` is a power of two.
///
/// # Example
///
/// ```
/// use fftbench_core::log2_exact;
///
/// assert_eq!(log2_exact(4096), Some(12));
/// assert_eq!(log2_exact(100), None);
/// assert_eq!(log2_exact(0), None);
/// ```
pub fn log2_exact(n: usize) -> Option<u32> {
    if n.is_power_of_two() {
        Some(n.trailing_zeros())
    } else {
        None
    }
}

/// Parses a size expression such as `"512"`, `"4k"` or `"1M"`.
///
/// Suffixes are binary: `k` = 1024, `m` = 1024², `g` = 1024³ (either case).
/// Underscores are ignored.
///
/// # Example
///
/// ```
/// use fftbench_core::parse_size_spec;
///
/// assert_eq!(parse_size_spec("4k").unwrap(), 4096);
/// assert_eq!(parse_size_spec("1M").unwrap(), 1 << 20);
/// assert_eq!(parse_size_spec("1_024").unwrap(), 1024);
/// assert!(parse_size_spec("lots").is_err());
/// ```
pub fn parse_size_spec(spec: &str) -> Result<usize> {
    let s = spec.trim().replace('_', "");
    let (digits, multiplier) = match s.chars().last() {
        Some('k' | 'K') => (&s[..s.len() - 1], 1usize << 10),
        Some('m' | 'M') => (&s[..s.len() - 1], 1usize << 20),
        Some('g' | 'G') => (&s[..s.len() - 1], 1usize << 30),
        _ => (s.as_str(), 1usize),
    };
    let value: usize = digits
        .parse()
        .map_err(|e| BenchError::config(format!("invalid size '{}': {}", spec, e)))?;
    value
        .checked_mul(multiplier)
        .ok_or_else(|| BenchError::config(format!("size '{}' is too large", spec)))
}

/// A 2-D problem size, both dimensions powers of two.
///
/// `cols` is the contiguous dimension: one row holds `cols` samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Shape {
    rows: usize,
    cols: usize,
    log2_rows: u32,
    log2_cols: u32,
}

impl Shape {
    /// Creates a shape, rejecting dimensions that are not powers of two or
    /// smaller than [`MIN_DIMENSION`], and shapes whose sample count does
    /// not fit in `usize`.
    pub fn new(rows: usize, cols: usize) -> Result<Self> {
        let log2_rows = Self::check_dimension("rows", rows)?;
        let log2_cols = Self::check_dimension("cols", cols)?;
        if rows.checked_mul(cols).is_none() {
            return Err(BenchError::config(format!(
                "{} x {} samples exceed the address space",
                rows, cols
            )));
        }
        Ok(Self {
            rows,
            cols,
            log2_rows,
            log2_cols,
        })
    }

    /// Square shape `n x n`.
    pub fn square(n: usize) -> Result<Self> {
        Self::new(n, n)
    }

    fn check_dimension(name: &str, value: usize) -> Result<u32> {
        match log2_exact(value) {
            Some(log2) if value >= MIN_DIMENSION => Ok(log2),
            _ => Err(BenchError::config(format!(
                "{} = {} is not a power of two >= {}; this test only operates on powers of 2",
                name, value, MIN_DIMENSION
            ))),
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn log2_rows(&self) -> u32 {
        self.log2_rows
    }

    pub fn log2_cols(&self) -> u32 {
        self.log2_cols
    }

    /// Total sample count, `rows * cols`. Never overflows; [`Shape::new`]
    /// rejects shapes where it would.
    pub fn total_elements(&self) -> usize {
        self.rows * self.cols
    }

    /// `log2(rows * cols)`.
    pub fn log2_total(&self) -> u32 {
        self.log2_rows + self.log2_cols
    }

    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    /// Same shape with twice the rows, `None` on overflow.
    pub fn doubled_rows(&self) -> Option<Self> {
        let rows = self.rows.checked_mul(2)?;
        rows.checked_mul(self.cols)?;
        Some(Self {
            rows,
            log2_rows: self.log2_rows + 1,
            ..*self
        })
    }

    /// Same shape with twice the columns, `None` on overflow.
    pub fn doubled_cols(&self) -> Option<Self> {
        let cols = self.cols.checked_mul(2)?;
        cols.checked_mul(self.rows)?;
        Some(Self {
            cols,
            log2_cols: self.log2_cols + 1,
            ..*self
        })
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.rows, self.cols)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_logs() {
        let shape = Shape::new(32, 64).unwrap();
        assert_eq!(shape.log2_rows(), 5);
        assert_eq!(shape.log2_cols(), 6);
        assert_eq!(shape.log2_total(), 11);
        assert_eq!(shape.total_elements(), 2048);
        assert!(!shape.is_square());
    }

    #[test]
    fn test_shape_rejects_bad_dimensions() {
        assert!(Shape::new(100, 64).is_err());
        assert!(Shape::new(64, 0).is_err());
        assert!(Shape::new(1, 64).is_err());
        let err = Shape::square(48).unwrap_err();
        assert!(err.to_string().contains("powers of 2"));
    }

    #[test]
    fn test_doubling() {
        let shape = Shape::square(16).unwrap();
        let wide = shape.doubled_cols().unwrap();
        assert_eq!((wide.rows(), wide.cols()), (16, 32));
        assert_eq!(wide.log2_cols(), 5);
        let tall = shape.doubled_rows().unwrap();
        assert_eq!((tall.rows(), tall.cols()), (32, 16));
        assert_eq!(tall.log2_rows(), 5);
    }

    #[test]
    fn test_doubling_overflow() {
        let huge = Shape::new(1 << (usize::BITS - 2), 2).unwrap();
        assert!(huge.doubled_rows().is_none());
    }

    #[test]
    fn test_shape_rejects_overflowing_sample_count() {
        let half = 1usize << (usize::BITS / 2);
        let err = Shape::square(half).unwrap_err();
        assert!(matches!(err, BenchError::Configuration(_)));
        assert!(err.to_string().contains("address space"));

        let largest = Shape::new(half >> 1, half).unwrap();
        assert_eq!(largest.total_elements(), usize::MAX / 2 + 1);
    }

    #[test]
    fn test_parse_size_spec() {
        assert_eq!(parse_size_spec("32").unwrap(), 32);
        assert_eq!(parse_size_spec(" 4k ").unwrap(), 4096);
        assert_eq!(parse_size_spec("2K").unwrap(), 2048);
        assert_eq!(parse_size_spec("1g").unwrap(), 1 << 30);
        assert!(parse_size_spec("").is_err());
        assert!(parse_size_spec("k").is_err());
        assert!(parse_size_spec("-4").is_err());
        assert!(parse_size_spec("99999999999999999999999g").is_err());
    }
}
