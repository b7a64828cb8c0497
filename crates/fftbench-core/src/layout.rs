//! Buffer layout planning.
//!
//! Real transforms keep only the non-redundant half of the spectrum, so a
//! frequency-domain row holds `cols/2 + 1` complex bins. That row is wider
//! than the `cols` real samples it came from, which is why an in-place real
//! buffer has to be sized for the frequency domain and why its time-domain
//! rows carry padding.

use crate::config::{Placement, Precision, SignalDomain};
use crate::error::{BenchError, Result};
use crate::size::Shape;

/// Byte sizes, aliasing and element counts for one transform configuration.
///
/// # Example
///
/// ```
/// use fftbench_core::{BufferLayout, Placement, Precision, Shape, SignalDomain};
///
/// let shape = Shape::square(64).unwrap();
/// let in_place = BufferLayout::plan(
///     SignalDomain::Real, Placement::InPlace, Precision::Double, shape,
/// ).unwrap();
/// let out_of_place = BufferLayout::plan(
///     SignalDomain::Real, Placement::OutOfPlace, Precision::Double, shape,
/// ).unwrap();
///
/// assert!(in_place.output_aliases_input());
/// assert_eq!(in_place.input_bytes(), out_of_place.output_bytes());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferLayout {
    domain: SignalDomain,
    placement: Placement,
    precision: Precision,
    shape: Shape,
    input_bytes: usize,
    output_bytes: usize,
    output_aliases_input: bool,
    signal_len: usize,
    freq_row_len: usize,
    time_row_stride: usize,
}

impl BufferLayout {
    /// Computes the layout for `shape`.
    ///
    /// # Errors
    ///
    /// Returns [`BenchError::Allocation`] when a byte size does not fit in
    /// `usize`.
    pub fn plan(
        domain: SignalDomain,
        placement: Placement,
        precision: Precision,
        shape: Shape,
    ) -> Result<Self> {
        let rows = shape.rows();
        let cols = shape.cols();
        let total = checked(rows, cols)?;
        let in_place = placement.is_in_place();

        let layout = match domain {
            SignalDomain::Complex => {
                let bytes = checked(total, precision.complex_size())?;
                Self {
                    domain,
                    placement,
                    precision,
                    shape,
                    input_bytes: bytes,
                    output_bytes: bytes,
                    output_aliases_input: in_place,
                    signal_len: checked(total, 2)?,
                    freq_row_len: cols,
                    time_row_stride: checked(cols, 2)?,
                }
            }
            SignalDomain::Real => {
                // One spare complex element per row on top of the cols/2 + 1 bins.
                let out_row = (cols >> 1) + 2;
                let output_bytes = checked(checked(out_row, rows)?, precision.complex_size())?;
                let padded_stride = 2 * ((cols >> 1) + 1);
                let (input_bytes, signal_len, time_row_stride) = if in_place {
                    (output_bytes, checked(rows, padded_stride)?, padded_stride)
                } else {
                    (checked(total, precision.real_size())?, total, cols)
                };
                Self {
                    domain,
                    placement,
                    precision,
                    shape,
                    input_bytes,
                    output_bytes,
                    output_aliases_input: in_place,
                    signal_len,
                    freq_row_len: (cols >> 1) + 1,
                    time_row_stride,
                }
            }
        };
        Ok(layout)
    }

    pub fn domain(&self) -> SignalDomain {
        self.domain
    }

    pub fn placement(&self) -> Placement {
        self.placement
    }

    pub fn precision(&self) -> Precision {
        self.precision
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// Bytes of the input (time-domain) allocation.
    pub fn input_bytes(&self) -> usize {
        self.input_bytes
    }

    /// Bytes of the output (frequency-domain) region. For in-place layouts
    /// this is the same allocation as the input.
    pub fn output_bytes(&self) -> usize {
        self.output_bytes
    }

    /// Whether input and output are one allocation.
    pub fn output_aliases_input(&self) -> bool {
        self.output_aliases_input
    }

    /// Real scalars in the input allocation.
    pub fn input_scalars(&self) -> usize {
        self.input_bytes / self.precision.real_size()
    }

    /// Real scalars in the output allocation.
    pub fn output_scalars(&self) -> usize {
        self.output_bytes / self.precision.real_size()
    }

    /// Leading time-domain scalars filled with the random signal.
    ///
    /// For real in-place layouts this spans the padded rows, so the padding
    /// that plan construction may have scribbled on is overwritten too.
    pub fn signal_len(&self) -> usize {
        self.signal_len
    }

    /// Leading time-domain scalars rescaled after every inverse transform.
    pub fn scale_len(&self) -> usize {
        self.signal_len
    }

    /// Complex elements per frequency-domain row.
    pub fn freq_row_len(&self) -> usize {
        self.freq_row_len
    }

    /// Scalars between the starts of consecutive time-domain rows.
    pub fn time_row_stride(&self) -> usize {
        self.time_row_stride
    }

    /// Complex elements of the frequency-domain matrix actually used by a
    /// transform (`rows * freq_row_len`).
    pub fn freq_elements(&self) -> usize {
        self.shape.rows() * self.freq_row_len
    }

    /// Total bytes this layout allocates.
    pub fn allocated_bytes(&self) -> usize {
        if self.output_aliases_input {
            self.input_bytes
        } else {
            self.input_bytes.saturating_add(self.output_bytes)
        }
    }
}

fn checked(a: usize, b: usize) -> Result<usize> {
    a.checked_mul(b).ok_or_else(|| BenchError::Allocation {
        bytes: usize::MAX,
        reason: format!("{} x {} overflows the address space", a, b),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(
        domain: SignalDomain,
        placement: Placement,
        precision: Precision,
        rows: usize,
        cols: usize,
    ) -> BufferLayout {
        BufferLayout::plan(domain, placement, precision, Shape::new(rows, cols).unwrap()).unwrap()
    }

    #[test]
    fn test_complex_out_of_place() {
        let l = layout(SignalDomain::Complex, Placement::OutOfPlace, Precision::Double, 8, 16);
        assert_eq!(l.input_bytes(), 8 * 16 * 16);
        assert_eq!(l.output_bytes(), 8 * 16 * 16);
        assert!(!l.output_aliases_input());
        assert_eq!(l.signal_len(), 2 * 8 * 16);
        assert_eq!(l.freq_row_len(), 16);
        assert_eq!(l.allocated_bytes(), 2 * 8 * 16 * 16);
    }

    #[test]
    fn test_complex_in_place_aliases() {
        let l = layout(SignalDomain::Complex, Placement::InPlace, Precision::Single, 4, 4);
        assert!(l.output_aliases_input());
        assert_eq!(l.input_bytes(), 4 * 4 * 8);
        assert_eq!(l.allocated_bytes(), l.input_bytes());
    }

    #[test]
    fn test_real_out_of_place() {
        let l = layout(SignalDomain::Real, Placement::OutOfPlace, Precision::Single, 32, 64);
        assert_eq!(l.input_bytes(), 32 * 64 * 4);
        assert_eq!(l.output_bytes(), ((64 >> 1) + 2) * 32 * 8);
        assert!(!l.output_aliases_input());
        assert_eq!(l.signal_len(), 32 * 64);
        assert_eq!(l.time_row_stride(), 64);
        assert_eq!(l.freq_row_len(), 33);
    }

    #[test]
    fn test_real_in_place_sized_for_frequency_domain() {
        for &(rows, cols) in &[(2, 2), (4, 8), (32, 32), (64, 128), (256, 64)] {
            for &precision in &[Precision::Single, Precision::Double] {
                let in_place = layout(SignalDomain::Real, Placement::InPlace, precision, rows, cols);
                let out_of_place =
                    layout(SignalDomain::Real, Placement::OutOfPlace, precision, rows, cols);
                assert_eq!(in_place.input_bytes(), out_of_place.output_bytes());
                assert!(in_place.input_bytes() > out_of_place.input_bytes());
            }
        }
    }

    #[test]
    fn test_real_in_place_signal_covers_padding() {
        let l = layout(SignalDomain::Real, Placement::InPlace, Precision::Double, 16, 32);
        assert_eq!(l.time_row_stride(), 34);
        assert_eq!(l.signal_len(), 16 * 34);
        assert_ne!(l.signal_len(), 16 * 32);
        assert!(l.signal_len() <= l.input_scalars());
        assert_eq!(l.scale_len(), l.signal_len());
    }

    #[test]
    fn test_aliasing_rules() {
        for domain in [SignalDomain::Real, SignalDomain::Complex] {
            let in_place = layout(domain, Placement::InPlace, Precision::Double, 8, 8);
            let out_of_place = layout(domain, Placement::OutOfPlace, Precision::Double, 8, 8);
            assert!(in_place.output_aliases_input());
            assert!(!out_of_place.output_aliases_input());
        }
    }

    #[test]
    fn test_frequency_matrix_fits_output() {
        let l = layout(SignalDomain::Real, Placement::OutOfPlace, Precision::Double, 8, 16);
        assert!(l.freq_elements() * 2 <= l.output_scalars());
    }

    #[test]
    fn test_overflow_is_allocation_error() {
        let half = 1usize << (usize::BITS / 2);
        let shape = Shape::new(half, half).unwrap();
        let result = BufferLayout::plan(
            SignalDomain::Complex,
            Placement::InPlace,
            Precision::Double,
            shape,
        );
        assert!(matches!(result, Err(BenchError::Allocation { .. })));
    }
}
