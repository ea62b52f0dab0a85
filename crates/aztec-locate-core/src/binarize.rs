//! Grayscale adapters and binarization.
//!
//! The detector itself only ever sees a [`BitMatrix`]; these helpers sit on
//! either side of it. [`luminance_from_bits`] renders a bit matrix back into
//! an 8-bit grayscale buffer (black = 0, white = 255), which downstream
//! symbol decoders use to re-binarize a magnified rectified matrix, and
//! [`binarize_hybrid`] turns a grayscale buffer into a bit matrix with a
//! block-adaptive threshold, falling back to a global Otsu threshold for
//! small images.

use crate::BitMatrix;

const BLOCK_SIZE: usize = 8;
const MIN_ADAPTIVE_DIM: usize = 40;
const MIN_DYNAMIC_RANGE: u32 = 24;

/// Owned row-major 8-bit grayscale buffer.
#[derive(Clone, Debug)]
pub struct LuminanceGrid {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

impl LuminanceGrid {
    #[inline]
    fn get(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.width + x]
    }
}

/// Render a bit matrix as grayscale: set bits become 0 (black), clear bits
/// 255.
pub fn luminance_from_bits(matrix: &BitMatrix) -> LuminanceGrid {
    let width = matrix.width();
    let height = matrix.height();
    let mut data = Vec::with_capacity(width * height);
    for y in 0..height {
        for bit in matrix.row(y) {
            data.push(if bit { 0 } else { 0xFF });
        }
    }
    LuminanceGrid {
        width,
        height,
        data,
    }
}

/// Binarize with a single global Otsu threshold.
pub fn binarize_global(grid: &LuminanceGrid) -> BitMatrix {
    let threshold = otsu_threshold(&grid.data);
    let mut matrix = BitMatrix::new(grid.width, grid.height);
    for y in 0..grid.height {
        for x in 0..grid.width {
            if grid.get(x, y) < threshold {
                matrix.set(x, y);
            }
        }
    }
    matrix
}

/// Binarize with per-block adaptive thresholds computed over 8x8 blocks and
/// smoothed across a 5x5 block neighborhood. Images too small for the block
/// grid go through [`binarize_global`].
pub fn binarize_hybrid(grid: &LuminanceGrid) -> BitMatrix {
    if grid.width < MIN_ADAPTIVE_DIM || grid.height < MIN_ADAPTIVE_DIM {
        return binarize_global(grid);
    }

    let sub_width = grid.width.div_ceil(BLOCK_SIZE);
    let sub_height = grid.height.div_ceil(BLOCK_SIZE);
    let black_points = calculate_black_points(grid, sub_width, sub_height);

    let mut matrix = BitMatrix::new(grid.width, grid.height);
    for by in 0..sub_height {
        let y0 = (by * BLOCK_SIZE).min(grid.height - BLOCK_SIZE);
        let top = by.clamp(2, sub_height - 3);
        for bx in 0..sub_width {
            let x0 = (bx * BLOCK_SIZE).min(grid.width - BLOCK_SIZE);
            let left = bx.clamp(2, sub_width - 3);

            // Average the black points of the surrounding 5x5 block grid.
            let mut sum = 0u32;
            for dy in -2i32..=2 {
                let row = &black_points[(top as i32 + dy) as usize];
                for dx in -2i32..=2 {
                    sum += row[(left as i32 + dx) as usize];
                }
            }
            let average = sum / 25;

            for yy in 0..BLOCK_SIZE {
                for xx in 0..BLOCK_SIZE {
                    if u32::from(grid.get(x0 + xx, y0 + yy)) <= average {
                        matrix.set(x0 + xx, y0 + yy);
                    }
                }
            }
        }
    }
    matrix
}

/// Per-block black-point estimate: the block average, pulled towards the
/// neighborhood for low-contrast blocks so featureless regions inherit a
/// plausible threshold.
fn calculate_black_points(
    grid: &LuminanceGrid,
    sub_width: usize,
    sub_height: usize,
) -> Vec<Vec<u32>> {
    let mut black_points = vec![vec![0u32; sub_width]; sub_height];
    for by in 0..sub_height {
        let y0 = (by * BLOCK_SIZE).min(grid.height - BLOCK_SIZE);
        for bx in 0..sub_width {
            let x0 = (bx * BLOCK_SIZE).min(grid.width - BLOCK_SIZE);

            let mut sum = 0u32;
            let mut min = u8::MAX;
            let mut max = u8::MIN;
            for yy in 0..BLOCK_SIZE {
                for xx in 0..BLOCK_SIZE {
                    let v = grid.get(x0 + xx, y0 + yy);
                    sum += u32::from(v);
                    min = min.min(v);
                    max = max.max(v);
                }
            }

            let mut average = sum >> 6;
            if u32::from(max) - u32::from(min) <= MIN_DYNAMIC_RANGE {
                // Low contrast: assume background, bias the threshold below
                // the darkest pixel seen.
                average = u32::from(min) / 2;
                if by > 0 && bx > 0 {
                    let neighbor = (black_points[by - 1][bx]
                        + 2 * black_points[by][bx - 1]
                        + black_points[by - 1][bx - 1])
                        / 4;
                    if u32::from(min) < neighbor {
                        average = neighbor;
                    }
                }
            }
            black_points[by][bx] = average;
        }
    }
    black_points
}

/// Otsu threshold over a full sample set. Degenerate histograms (one or two
/// populated bins) resolve to the midpoint so pure black/white input splits
/// cleanly.
fn otsu_threshold(samples: &[u8]) -> u8 {
    if samples.is_empty() {
        return 127;
    }

    let mut min_v = u8::MAX;
    let mut max_v = u8::MIN;
    let mut hist = [0u32; 256];
    for &v in samples {
        min_v = min_v.min(v);
        max_v = max_v.max(v);
        hist[v as usize] += 1;
    }
    if min_v == max_v {
        // Uniform image: everything below mid-gray counts as black.
        return if min_v < 128 { u8::MAX } else { 0 };
    }
    if hist.iter().filter(|&&h| h > 0).count() <= 2 {
        return ((u16::from(min_v) + u16::from(max_v)) / 2) as u8;
    }

    let total = samples.len() as f64;
    let sum_total: f64 = hist
        .iter()
        .enumerate()
        .map(|(i, &h)| (i as f64) * f64::from(h))
        .sum();

    let mut sum_b = 0f64;
    let mut w_b = 0f64;
    let mut best_var = -1f64;
    let mut best_t = 127u8;

    for (t, &h) in hist.iter().enumerate() {
        w_b += f64::from(h);
        if w_b < 1.0 {
            continue;
        }
        let w_f = total - w_b;
        if w_f < 1.0 {
            break;
        }

        sum_b += (t as f64) * f64::from(h);
        let m_b = sum_b / w_b;
        let m_f = (sum_total - sum_b) / w_f;

        let var_between = w_b * w_f * (m_b - m_f) * (m_b - m_f);
        if var_between > best_var {
            best_var = var_between;
            best_t = t as u8;
        }
    }

    best_t.saturating_add(1)
}
