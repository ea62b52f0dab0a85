//! Canonical resampling of the detected code.

use aztec_locate_core::BitMatrix;
use nalgebra::Point2;

use super::pipeline::{round_pixel, AztecDetector, MODULE};
use super::DetectError;

impl AztecDetector<'_> {
    /// Resample the code into an upright square matrix in which every
    /// module is `cell_width` pixels wide, surrounded by a white border of
    /// `border_width` pixels.
    ///
    /// Each module center is mapped through the inverse transform and the
    /// bit under it copied; pixels projecting outside the image stay white.
    pub fn normalize_matrix(
        &self,
        cell_width: usize,
        border_width: usize,
    ) -> Result<BitMatrix, DetectError> {
        let transform = self.transform()?;
        let size = self.matrix_size as usize * cell_width + 2 * border_width;
        let mut normalized = BitMatrix::square(size);

        let m = self.matrix_size / 2;
        let mut y = border_width;
        for j in -m..=m {
            let mut x = border_width;
            for i in -m..=m {
                let p = transform.transform(Point2::new((MODULE * i) as f32, (MODULE * j) as f32));
                let tx = round_pixel(p.x);
                let ty = round_pixel(p.y);
                if self.matrix.get_checked(tx, ty) == Some(true) {
                    for dx in 0..cell_width {
                        for dy in 0..cell_width {
                            normalized.set(x + dx, y + dy);
                        }
                    }
                }
                x += cell_width;
            }
            y += cell_width;
        }
        Ok(normalized)
    }
}
