//! Transform buffers.
//!
//! Storage is always real scalars; complex data is viewed through
//! `bytemuck` casts of the same memory. An in-place layout owns exactly one
//! allocation and hands out a single aliased view, so there is never a
//! second owner of the same memory.

use num_complex::Complex;

use crate::error::{BenchError, Result};
use crate::layout::BufferLayout;
use crate::scalar::Scalar;

/// Mutable views over a [`TransformBuffers`] allocation.
pub enum BufferViews<'a, T> {
    /// In-place: time and frequency domain share this slice.
    Aliased(&'a mut [T]),
    /// Out-of-place: independent input and output allocations.
    Separate { input: &'a mut [T], output: &'a mut [T] },
}

/// Input/output buffers for one repetition, sized by a [`BufferLayout`].
///
/// Dropping the value releases every allocation it owns.
#[derive(Debug)]
pub struct TransformBuffers<T> {
    layout: BufferLayout,
    input: Vec<T>,
    output: Option<Vec<T>>,
}

impl<T: Scalar> TransformBuffers<T> {
    /// Reserves and zero-fills the buffers described by `layout`.
    ///
    /// # Errors
    ///
    /// Returns [`BenchError::Allocation`] if a reservation fails, or
    /// [`BenchError::Configuration`] if `T` does not match the layout's
    /// precision. Nothing stays allocated on error.
    pub fn allocate(layout: &BufferLayout) -> Result<Self> {
        if layout.precision() != T::PRECISION {
            return Err(BenchError::config(format!(
                "buffer element type is {} precision but layout is {}",
                T::PRECISION,
                layout.precision()
            )));
        }
        let input = reserve::<T>(layout.input_scalars(), layout.input_bytes())?;
        let output = if layout.output_aliases_input() {
            None
        } else {
            Some(reserve::<T>(layout.output_scalars(), layout.output_bytes())?)
        };
        Ok(Self {
            layout: *layout,
            input,
            output,
        })
    }

    pub fn layout(&self) -> &BufferLayout {
        &self.layout
    }

    /// Whether the output is the input allocation.
    pub fn is_aliased(&self) -> bool {
        self.output.is_none()
    }

    /// Returns the views appropriate for the placement.
    pub fn views_mut(&mut self) -> BufferViews<'_, T> {
        match self.output.as_mut() {
            None => BufferViews::Aliased(&mut self.input),
            Some(output) => BufferViews::Separate {
                input: &mut self.input,
                output,
            },
        }
    }

    /// Scalars holding the time-domain signal (the input allocation).
    pub fn time_domain_mut(&mut self) -> &mut [T] {
        &mut self.input
    }

    /// Read-only time-domain scalars.
    pub fn time_domain(&self) -> &[T] {
        &self.input
    }

    /// The frequency-domain allocation viewed as complex elements.
    pub fn frequency_mut(&mut self) -> &mut [Complex<T>] {
        let scalars = match self.output.as_mut() {
            Some(output) => output.as_mut_slice(),
            None => self.input.as_mut_slice(),
        };
        as_complex_mut(scalars)
    }

    /// Read-only frequency-domain view.
    pub fn frequency(&self) -> &[Complex<T>] {
        let scalars = self.output.as_deref().unwrap_or(&self.input);
        as_complex(scalars)
    }
}

/// Reinterprets interleaved scalars as complex elements. A trailing odd
/// scalar is not part of the view.
pub fn as_complex_mut<T: Scalar>(scalars: &mut [T]) -> &mut [Complex<T>] {
    let even = scalars.len() & !1;
    bytemuck::cast_slice_mut(&mut scalars[..even])
}

/// Read-only counterpart of [`as_complex_mut`].
pub fn as_complex<T: Scalar>(scalars: &[T]) -> &[Complex<T>] {
    let even = scalars.len() & !1;
    bytemuck::cast_slice(&scalars[..even])
}

/// Reinterprets complex elements as interleaved scalars.
pub fn as_scalars_mut<T: Scalar>(values: &mut [Complex<T>]) -> &mut [T] {
    bytemuck::cast_slice_mut(values)
}

fn reserve<T: Scalar>(len: usize, bytes: usize) -> Result<Vec<T>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|e| BenchError::Allocation {
            bytes,
            reason: e.to_string(),
        })?;
    buf.resize(len, T::zero());
    Ok(buf)
}
