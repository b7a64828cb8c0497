//! Blocked out-of-place matrix transpose.

use rayon::prelude::*;

const BLOCK_SIZE: usize = 16;

/// Transposes `input` (`height` rows of `width`) into `output` (`width` rows
/// of `height`).
///
/// Output rows are produced in parallel bands of [`BLOCK_SIZE`]; within a
/// band the input is walked in `BLOCK_SIZE x BLOCK_SIZE` tiles so both sides
/// stay cache-resident.
pub fn transpose<T: Copy + Send + Sync>(input: &[T], output: &mut [T], width: usize, height: usize) {
    assert_eq!(width.checked_mul(height), Some(input.len()));
    assert_eq!(input.len(), output.len());
    if input.is_empty() {
        return;
    }

    output
        .par_chunks_mut(BLOCK_SIZE * height)
        .enumerate()
        .for_each(|(band, out_band)| {
            let col_start = band * BLOCK_SIZE;
            let band_cols = out_band.len() / height;
            for row_start in (0..height).step_by(BLOCK_SIZE) {
                let row_end = (row_start + BLOCK_SIZE).min(height);
                for c in 0..band_cols {
                    let out_row = &mut out_band[c * height..(c + 1) * height];
                    for r in row_start..row_end {
                        out_row[r] = input[r * width + col_start + c];
                    }
                }
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transpose_rectangular() {
        let width = 37;
        let height = 21;
        let input: Vec<usize> = (0..width * height).collect();
        let mut output = vec![0; width * height];
        transpose(&input, &mut output, width, height);
        for r in 0..height {
            for c in 0..width {
                assert_eq!(output[c * height + r], input[r * width + c]);
            }
        }
    }

    #[test]
    fn test_transpose_twice_is_identity() {
        let width = 64;
        let height = 8;
        let input: Vec<u32> = (0..(width * height) as u32).collect();
        let mut once = vec![0; input.len()];
        let mut twice = vec![0; input.len()];
        transpose(&input, &mut once, width, height);
        transpose(&once, &mut twice, height, width);
        assert_eq!(input, twice);
    }
}
