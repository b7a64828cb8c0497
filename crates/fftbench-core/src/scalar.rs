//! Floating-point sample types the harness can benchmark.

use std::fmt::{Debug, Display};

use bytemuck::Pod;
use num_traits::{Float, FromPrimitive, Signed};

use crate::config::Precision;

/// A real sample type (`f32` or `f64`).
///
/// The bounds are exactly what the transform engines need: `Signed +
/// FromPrimitive + Send + Sync + Debug + 'static` makes every `Scalar` an
/// `FftNum`, and `Pod` lets a buffer be viewed as either real scalars or
/// interleaved complex values.
pub trait Scalar:
    Float + Signed + FromPrimitive + Pod + Default + Debug + Display + Send + Sync + 'static
{
    /// Precision tag of this type.
    const PRECISION: Precision;

    /// Converts from `f64`, saturating to zero for unrepresentable values.
    fn from_f64_lossy(value: f64) -> Self {
        <Self as FromPrimitive>::from_f64(value).unwrap_or_else(Self::zero)
    }
}

impl Scalar for f32 {
    const PRECISION: Precision = Precision::Single;
}

impl Scalar for f64 {
    const PRECISION: Precision = Precision::Double;
}
