//! Transform refinement against the reference grid.
//!
//! Projection error grows with the distance from the bull's-eye. Full codes
//! carry alternating reference grid lines at multiples of 16 modules from
//! the center; locating the actual grid module at distance `d` in each
//! cardinal direction and mapping it back to its ideal position replaces the
//! inverse transform with a better one, working outwards one reference
//! distance at a time.

use nalgebra::Point2;

use aztec_locate_core::PerspectiveTransform;

use super::pipeline::{round_pixel, AztecDetector, MODULE, ROT};
use super::DetectError;

impl AztecDetector<'_> {
    /// Rebuild the inverse transform from the measured reference modules at
    /// `distance` modules from the center.
    ///
    /// The first call folds the mode-message orientation into the transform
    /// and resets it, so later distances refine an already upright map.
    pub fn optimize_transform(&mut self, distance: i32) -> Result<(), DetectError> {
        let north = self.find_reference_point(0.0, -1.0, distance)?;
        let east = self.find_reference_point(1.0, 0.0, distance)?;
        let south = self.find_reference_point(0.0, 1.0, distance)?;
        let west = self.find_reference_point(-1.0, 0.0, distance)?;

        // Reference points N, E, S, W in image pixels.
        let transform = self.transform()?;
        let news = [north, east, south, west].map(|p| transform.transform(p));
        log::debug!("reference points (N E S W): {news:?}");

        let q = (distance * MODULE) as f32;
        let src = [
            Point2::new(0.0, -q),
            Point2::new(q, 0.0),
            Point2::new(-q, 0.0),
            Point2::new(0.0, q),
        ];
        let rot = ROT[self.top_line_index];
        let dst = [news[rot[0]], news[rot[1]], news[rot[2]], news[rot[3]]];

        self.inverse_transform =
            Some(PerspectiveTransform::quadrilateral_to_quadrilateral(&src, &dst)
                .ok_or(DetectError::NotFound)?);
        // Orientation is baked in now; further refinements must not rotate
        // again.
        self.top_line_index = 0;
        Ok(())
    }

    /// Locate the center of the reference grid module at `distance` modules
    /// along direction `v = (dx, dy)`, in canonical coordinates.
    fn find_reference_point(
        &self,
        dx: f32,
        dy: f32,
        distance: i32,
    ) -> Result<Point2<f32>, DetectError> {
        let changes = self.sample_changes(dx, dy);
        log::debug!("{} color changes along ({dx}, {dy})", changes.len());
        if changes.len() < distance as usize + 1 {
            return Err(DetectError::NotFound);
        }

        // The two changes bracket the module at `distance`; their midpoint
        // approximates its center along v.
        let t1 = changes[distance as usize - 1];
        let t2 = changes[distance as usize];
        let t = (t1 + t2) as f32 / 2.0;
        let x0 = t * dx;
        let y0 = t * dy;

        // Walk perpendicular to v in both senses until the pixel under the
        // transform turns white; the midpoint of the two exits centers the
        // module across v.
        let dx1 = -dy;
        let dy1 = dx;
        let u1 = self.perpendicular_exit(x0, y0, dx1, dy1, 1)?;
        let u2 = self.perpendicular_exit(x0, y0, dx1, dy1, -1)?;
        let u = (u1 + u2) as f32 / 2.0;

        Ok(Point2::new(x0 + u * dx1, y0 + u * dy1))
    }

    /// Step along `(dx1, dy1)` from `(x0, y0)` with the given sign until the
    /// sampled image pixel is white, returning the step count. Walking out
    /// of the image fails the detection.
    fn perpendicular_exit(
        &self,
        x0: f32,
        y0: f32,
        dx1: f32,
        dy1: f32,
        sign: i32,
    ) -> Result<i32, DetectError> {
        let transform = self.transform()?;
        let mut s = sign;
        loop {
            let p = transform.transform(Point2::new(x0 + s as f32 * dx1, y0 + s as f32 * dy1));
            let bit = self
                .matrix
                .get_checked(round_pixel(p.x), round_pixel(p.y))
                .ok_or(DetectError::NotFound)?;
            if !bit {
                return Ok(s);
            }
            s += sign;
        }
    }

    /// Sample the canonical ray `t * (dx, dy)` one unit at a time and
    /// record every `t` at which the image color changes. Samples falling
    /// outside the image are skipped.
    fn sample_changes(&self, dx: f32, dy: f32) -> Vec<i32> {
        let mut changes = Vec::with_capacity(64);
        let transform = match self.transform() {
            Ok(t) => t,
            Err(_) => return changes,
        };

        // The center module is black.
        let mut current = true;
        for t in 0..self.matrix_size * (MODULE / 2 + 1) {
            let p = transform.transform(Point2::new(t as f32 * dx, t as f32 * dy));
            let tx = round_pixel(p.x);
            let ty = round_pixel(p.y);
            if let Some(bit) = self.matrix.get_checked(tx, ty) {
                if bit != current {
                    current = bit;
                    changes.push(t);
                }
            }
        }
        changes
    }
}
