//! Row and column passes of a 2-D transform.
//!
//! A 2-D DFT is a 1-D DFT over every row followed by a 1-D DFT over every
//! column. The 1-D transforms themselves come from rustfft (complex) and
//! realfft (real rows); these helpers only arrange the data and spread the
//! batches over the current rayon pool.

use std::sync::Arc;

use num_complex::Complex;
use rayon::prelude::*;
use realfft::{ComplexToReal, FftError, RealToComplex};
use rustfft::Fft;

use fftbench_core::{as_complex, as_complex_mut, BenchError, Result, Scalar};

use crate::strategy::ColumnStrategy;
use crate::transpose::transpose;

/// Columns gathered per tile by [`ColumnStrategy::Tiled`].
pub const TILE_WIDTH: usize = 16;

const TASKS_PER_THREAD: usize = 4;
const MIN_ROWS_PER_TASK: usize = 4;

fn zero<T: Scalar>() -> Complex<T> {
    Complex::new(T::zero(), T::zero())
}

fn fft_error(e: FftError) -> BenchError {
    BenchError::Engine(format!("realfft: {}", e))
}

/// Slice length handed to one rayon task when `count` transforms of `len`
/// points are spread over `threads` workers.
fn batch_len(count: usize, len: usize, threads: usize) -> usize {
    let tasks = threads.max(1) * TASKS_PER_THREAD;
    count.div_ceil(tasks).max(1) * len
}

/// Scratch elements a column pass needs.
pub fn column_scratch_len(strategy: ColumnStrategy, rows: usize, width: usize) -> usize {
    match strategy {
        ColumnStrategy::Transposed => rows * width,
        ColumnStrategy::Tiled => rows * width.min(TILE_WIDTH),
    }
}

/// In-place complex FFTs over every contiguous `len`-point run of `data`.
pub fn complex_rows<T: Scalar>(
    fft: &Arc<dyn Fft<T>>,
    data: &mut [Complex<T>],
    len: usize,
    threads: usize,
) {
    if data.is_empty() {
        return;
    }
    let chunk = batch_len(data.len() / len, len, threads);
    let scratch_len = fft.get_inplace_scratch_len();
    data.par_chunks_mut(chunk).for_each_init(
        || vec![zero::<T>(); scratch_len],
        |scratch, rows| fft.process_with_scratch(rows, scratch),
    );
}

/// Complex FFTs of every `len`-point row of `src` into the matching row of
/// `dst`. Each row is staged once in a per-task line buffer, so `src` is
/// left intact.
pub fn complex_rows_separate<T: Scalar>(
    fft: &Arc<dyn Fft<T>>,
    src: &[Complex<T>],
    dst: &mut [Complex<T>],
    len: usize,
) {
    debug_assert_eq!(src.len(), dst.len());
    let scratch_len = fft.get_outofplace_scratch_len();
    src.par_chunks(len)
        .zip(dst.par_chunks_mut(len))
        .with_min_len(MIN_ROWS_PER_TASK)
        .for_each_init(
            || (vec![zero::<T>(); len], vec![zero::<T>(); scratch_len]),
            |(line, scratch), (from, to)| {
                line.copy_from_slice(from);
                fft.process_outofplace_with_scratch(line, to, scratch);
            },
        );
}

/// Column FFTs over a row-major `rows x width` matrix.
pub fn columns<T: Scalar>(
    fft: &Arc<dyn Fft<T>>,
    matrix: &mut [Complex<T>],
    rows: usize,
    width: usize,
    strategy: ColumnStrategy,
    scratch: &mut [Complex<T>],
    threads: usize,
) {
    debug_assert_eq!(matrix.len(), rows * width);
    match strategy {
        ColumnStrategy::Transposed => {
            let transposed = &mut scratch[..rows * width];
            transpose(matrix, transposed, width, rows);
            complex_rows(fft, transposed, rows, threads);
            transpose(transposed, matrix, rows, width);
        }
        ColumnStrategy::Tiled => {
            for col_start in (0..width).step_by(TILE_WIDTH) {
                let tile_cols = TILE_WIDTH.min(width - col_start);
                let tile = &mut scratch[..tile_cols * rows];
                for r in 0..rows {
                    let src = &matrix[r * width + col_start..r * width + col_start + tile_cols];
                    for (c, value) in src.iter().enumerate() {
                        tile[c * rows + r] = *value;
                    }
                }
                complex_rows(fft, tile, rows, threads);
                for r in 0..rows {
                    let dst = &mut matrix[r * width + col_start..r * width + col_start + tile_cols];
                    for (c, value) in dst.iter_mut().enumerate() {
                        *value = tile[c * rows + r];
                    }
                }
            }
        }
    }
}

/// Real-to-complex row transforms over a padded in-place buffer.
///
/// Row `r` holds `cols` real samples at scalar offset `r * 2 * freq_row`
/// and receives its `freq_row` bins at the same offset.
pub fn real_forward_in_place<T: Scalar>(
    r2c: &Arc<dyn RealToComplex<T>>,
    data: &mut [T],
    rows: usize,
    cols: usize,
    freq_row: usize,
) -> Result<()> {
    let stride = 2 * freq_row;
    let scratch_len = r2c.get_scratch_len();
    data[..rows * stride]
        .par_chunks_mut(stride)
        .with_min_len(MIN_ROWS_PER_TASK)
        .try_for_each_init(
            || (vec![T::zero(); cols], vec![zero::<T>(); scratch_len]),
            |(line, scratch), row| {
                line.copy_from_slice(&row[..cols]);
                r2c.process_with_scratch(line, as_complex_mut(row), scratch)
            },
        )
        .map_err(fft_error)
}

/// Real-to-complex row transforms from `input` rows into `output` rows.
/// The input is left intact.
pub fn real_forward_separate<T: Scalar>(
    r2c: &Arc<dyn RealToComplex<T>>,
    input: &[T],
    output: &mut [Complex<T>],
    rows: usize,
    cols: usize,
    freq_row: usize,
) -> Result<()> {
    let scratch_len = r2c.get_scratch_len();
    input[..rows * cols]
        .par_chunks(cols)
        .zip(output[..rows * freq_row].par_chunks_mut(freq_row))
        .with_min_len(MIN_ROWS_PER_TASK)
        .try_for_each_init(
            || (vec![T::zero(); cols], vec![zero::<T>(); scratch_len]),
            |(line, scratch), (src, dst)| {
                line.copy_from_slice(src);
                r2c.process_with_scratch(line, dst, scratch)
            },
        )
        .map_err(fft_error)
}

/// Complex-to-real row transforms over a padded in-place buffer.
pub fn real_inverse_in_place<T: Scalar>(
    c2r: &Arc<dyn ComplexToReal<T>>,
    data: &mut [T],
    rows: usize,
    cols: usize,
    freq_row: usize,
) -> Result<()> {
    let stride = 2 * freq_row;
    let scratch_len = c2r.get_scratch_len();
    data[..rows * stride]
        .par_chunks_mut(stride)
        .with_min_len(MIN_ROWS_PER_TASK)
        .try_for_each_init(
            || (vec![zero::<T>(); freq_row], vec![zero::<T>(); scratch_len]),
            |(line, scratch), row| {
                line.copy_from_slice(as_complex(row));
                clear_edge_imaginary(line);
                c2r.process_with_scratch(line, &mut row[..cols], scratch)
            },
        )
        .map_err(fft_error)
}

/// Complex-to-real row transforms from spectrum rows into `output` rows.
pub fn real_inverse_separate<T: Scalar>(
    c2r: &Arc<dyn ComplexToReal<T>>,
    spectrum: &[Complex<T>],
    output: &mut [T],
    rows: usize,
    cols: usize,
    freq_row: usize,
) -> Result<()> {
    let scratch_len = c2r.get_scratch_len();
    spectrum[..rows * freq_row]
        .par_chunks(freq_row)
        .zip(output[..rows * cols].par_chunks_mut(cols))
        .with_min_len(MIN_ROWS_PER_TASK)
        .try_for_each_init(
            || (vec![zero::<T>(); freq_row], vec![zero::<T>(); scratch_len]),
            |(line, scratch), (src, dst)| {
                line.copy_from_slice(src);
                clear_edge_imaginary(line);
                c2r.process_with_scratch(line, dst, scratch)
            },
        )
        .map_err(fft_error)
}

// The DC and Nyquist bins of a real signal's spectrum are real. After the
// column pass they carry rounding noise that realfft would reject.
fn clear_edge_imaginary<T: Scalar>(line: &mut [Complex<T>]) {
    if let Some(first) = line.first_mut() {
        first.im = T::zero();
    }
    if let Some(last) = line.last_mut() {
        last.im = T::zero();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustfft::{FftDirection, FftPlanner};

    #[test]
    fn test_batch_len() {
        assert_eq!(batch_len(64, 32, 1), 16 * 32);
        assert_eq!(batch_len(3, 8, 4), 8);
        assert_eq!(batch_len(0, 8, 4), 8);
    }

    #[test]
    fn test_column_strategies_agree() {
        let rows = 8;
        let width = 37;
        let mut planner = FftPlanner::<f64>::new();
        let fft = planner.plan_fft(rows, FftDirection::Forward);
        let input: Vec<Complex<f64>> = (0..rows * width)
            .map(|i| Complex::new((i % 7) as f64, (i % 3) as f64 - 1.0))
            .collect();

        let mut transposed = input.clone();
        let mut scratch = vec![Complex::new(0.0, 0.0); column_scratch_len(ColumnStrategy::Transposed, rows, width)];
        columns(&fft, &mut transposed, rows, width, ColumnStrategy::Transposed, &mut scratch, 2);

        let mut tiled = input.clone();
        let mut scratch = vec![Complex::new(0.0, 0.0); column_scratch_len(ColumnStrategy::Tiled, rows, width)];
        columns(&fft, &mut tiled, rows, width, ColumnStrategy::Tiled, &mut scratch, 2);

        for (a, b) in transposed.iter().zip(&tiled) {
            assert!((a - b).norm() < 1e-9);
        }
        assert_ne!(transposed, input);
    }

    #[test]
    fn test_separate_rows_match_in_place_rows() {
        let len = 16;
        let mut planner = FftPlanner::<f64>::new();
        let fft = planner.plan_fft(len, FftDirection::Forward);
        let src: Vec<Complex<f64>> = (0..len * 8)
            .map(|i| Complex::new((i % 5) as f64, (i % 4) as f64 - 2.0))
            .collect();

        let mut in_place = src.clone();
        complex_rows(&fft, &mut in_place, len, 2);
        let mut dst = vec![Complex::new(0.0, 0.0); src.len()];
        complex_rows_separate(&fft, &src, &mut dst, len);

        for (a, b) in in_place.iter().zip(&dst) {
            assert!((a - b).norm() < 1e-12);
        }
        assert_eq!(src[3], Complex::new(3.0, 1.0));
    }

    #[test]
    fn test_column_pass_of_constant_columns() {
        let rows = 4;
        let width = 3;
        let mut planner = FftPlanner::<f64>::new();
        let fft = planner.plan_fft(rows, FftDirection::Forward);
        let mut matrix = vec![Complex::new(1.0, 0.0); rows * width];
        let mut scratch = vec![Complex::new(0.0, 0.0); rows * width];
        columns(&fft, &mut matrix, rows, width, ColumnStrategy::Transposed, &mut scratch, 1);
        for c in 0..width {
            assert!((matrix[c] - Complex::new(4.0, 0.0)).norm() < 1e-12);
            for r in 1..rows {
                assert!(matrix[r * width + c].norm() < 1e-12);
            }
        }
    }
}
