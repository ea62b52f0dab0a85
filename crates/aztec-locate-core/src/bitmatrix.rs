//! Packed one-bit-per-pixel matrix.
//!
//! The detector consumes an already binarized image as a [`BitMatrix`]: a
//! row-major grid where a set bit means a black pixel. Bits are packed into
//! `u32` words per row, so a cloned matrix is cheap enough to hand to callers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Row-major black/white pixel grid. A set bit is black.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BitMatrix {
    width: usize,
    height: usize,
    /// Words per row.
    row_stride: usize,
    bits: Vec<u32>,
}

impl BitMatrix {
    /// Create an all-white matrix of the given dimensions.
    pub fn new(width: usize, height: usize) -> Self {
        let row_stride = width.div_ceil(32);
        Self {
            width,
            height,
            row_stride,
            bits: vec![0; row_stride * height],
        }
    }

    /// Create an all-white square matrix.
    pub fn square(dim: usize) -> Self {
        Self::new(dim, dim)
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Read one pixel. `(x, y)` must be inside the matrix.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> bool {
        let word = self.bits[y * self.row_stride + x / 32];
        (word >> (x % 32)) & 1 != 0
    }

    /// Read one pixel from possibly signed, possibly out-of-range
    /// coordinates. Sampling code transforms and rounds points that may land
    /// anywhere, so the miss case is `None` rather than a panic.
    #[inline]
    pub fn get_checked(&self, x: i32, y: i32) -> Option<bool> {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return None;
        }
        Some(self.get(x as usize, y as usize))
    }

    /// Set one pixel to black.
    #[inline]
    pub fn set(&mut self, x: usize, y: usize) {
        self.bits[y * self.row_stride + x / 32] |= 1 << (x % 32);
    }

    /// Invert one pixel.
    #[inline]
    pub fn flip(&mut self, x: usize, y: usize) {
        self.bits[y * self.row_stride + x / 32] ^= 1 << (x % 32);
    }

    /// Iterate over the pixels of row `y`, left to right.
    pub fn row(&self, y: usize) -> impl Iterator<Item = bool> + '_ {
        (0..self.width).map(move |x| self.get(x, y))
    }

    /// Count of black pixels in the whole matrix.
    pub fn count_black(&self) -> usize {
        self.bits.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Parse the text fixture format: a `width height` header line followed
    /// by `height` rows in which `'X'` marks a black pixel.
    pub fn parse_text(src: &str) -> Result<Self, ParseBitMatrixError> {
        let mut lines = src.lines();
        let header = lines.next().ok_or(ParseBitMatrixError::MissingHeader)?;
        let mut parts = header.split_whitespace();
        let width: usize = parts
            .next()
            .and_then(|p| p.parse().ok())
            .ok_or(ParseBitMatrixError::MissingHeader)?;
        let height: usize = parts
            .next()
            .and_then(|p| p.parse().ok())
            .ok_or(ParseBitMatrixError::MissingHeader)?;

        let mut matrix = Self::new(width, height);
        for y in 0..height {
            let line = lines.next().ok_or(ParseBitMatrixError::ShortInput {
                expected: height,
                got: y,
            })?;
            for (x, c) in line.chars().take(width).enumerate() {
                if c == 'X' {
                    matrix.set(x, y);
                }
            }
        }
        Ok(matrix)
    }
}

/// Errors from [`BitMatrix::parse_text`].
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ParseBitMatrixError {
    #[error("missing or malformed `width height` header line")]
    MissingHeader,
    #[error("input ended after {got} of {expected} rows")]
    ShortInput { expected: usize, got: usize },
}

impl fmt::Debug for BitMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "BitMatrix {}x{}", self.width, self.height)?;
        for y in 0..self.height {
            for x in 0..self.width {
                f.write_str(if self.get(x, y) { "X" } else { "." })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
