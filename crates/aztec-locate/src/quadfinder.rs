//! Corner location for ring-shaped components.
//!
//! Given the label of a roughly square ring, the finder sweeps diagonals
//! across the component's envelope and returns the first pixel of the
//! component each sweep hits. For the outer boundary of a square ring these
//! are the four extreme corners in image coordinates.

use aztec_locate_core::{Envelope, Quadrilateral};
use nalgebra::Point2;

use crate::components::ConnectedComponentFinder;

pub struct QuadrilateralFinder<'a> {
    finder: &'a ConnectedComponentFinder<'a>,
}

impl<'a> QuadrilateralFinder<'a> {
    pub fn new(finder: &'a ConnectedComponentFinder<'a>) -> Self {
        Self { finder }
    }

    /// Locate the four extreme corners of the component with `label`.
    ///
    /// `None` only if the label has no component record or a sweep exhausts
    /// the envelope without hitting the component, which cannot happen for
    /// the ring components the detector feeds in.
    pub fn find_quadrilateral(&self, label: u32) -> Option<Quadrilateral> {
        let component = self.finder.components().get(&label)?;
        let env = component.envelope;
        let dim = env.width().max(env.height());

        let nw = self.sweep(label, &env, dim, false, false)?;
        let ne = self.sweep(label, &env, dim, false, true)?;
        let sw = self.sweep(label, &env, dim, true, false)?;
        let se = self.sweep(label, &env, dim, true, true)?;
        log::debug!(
            "quadrilateral for label {label}: nw={nw:?} ne={ne:?} sw={sw:?} se={se:?}"
        );
        Some(Quadrilateral { nw, ne, sw, se })
    }

    /// Walk anti-diagonals (top corners) or diagonals (bottom corners)
    /// across the envelope, outermost first, and return the first pixel
    /// carrying `label`.
    fn sweep(
        &self,
        label: u32,
        env: &Envelope,
        dim: i32,
        from_bottom: bool,
        from_right: bool,
    ) -> Option<Point2<i32>> {
        let dx = if from_right { -1 } else { 1 };
        let dy = if from_bottom { 1 } else { -1 };
        let start_x = if from_right { env.min_x + dim } else { env.min_x };

        let rows: Vec<i32> = if from_bottom {
            (env.min_y..=env.min_y + dim).rev().collect()
        } else {
            (env.min_y..=env.min_y + dim).collect()
        };

        for j in rows {
            let mut x = start_x;
            let mut y = j;
            while (env.min_x..=env.min_x + dim).contains(&x)
                && (env.min_y..=env.min_y + dim).contains(&y)
            {
                if env.contains(x, y) && self.finder.label(x, y) == label {
                    return Some(Point2::new(x, y));
                }
                x += dx;
                y += dy;
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aztec_locate_core::BitMatrix;

    #[test]
    fn finds_corners_of_square_ring() {
        // 7x7 black ring of width 1 inside a white border.
        let mut matrix = BitMatrix::new(11, 11);
        for k in 2..9 {
            matrix.set(k, 2);
            matrix.set(k, 8);
            matrix.set(2, k);
            matrix.set(8, k);
        }
        let finder = ConnectedComponentFinder::new(&matrix);
        let label = finder.label(2, 2);

        let q = QuadrilateralFinder::new(&finder)
            .find_quadrilateral(label)
            .expect("ring corners");
        assert_eq!(q.nw, Point2::new(2, 2));
        assert_eq!(q.ne, Point2::new(8, 2));
        assert_eq!(q.sw, Point2::new(2, 8));
        assert_eq!(q.se, Point2::new(8, 8));
    }

    #[test]
    fn diamond_extremes_land_on_its_vertices() {
        // Filled diamond (a square rotated 45 degrees): the diagonal sweeps
        // hit the left vertex for both west corners and the right vertex for
        // both east corners.
        let mut matrix = BitMatrix::new(13, 13);
        for y in 0..13i32 {
            for x in 0..13i32 {
                if (x - 6).abs() + (y - 6).abs() <= 4 {
                    matrix.set(x as usize, y as usize);
                }
            }
        }
        let finder = ConnectedComponentFinder::new(&matrix);
        let label = finder.label(2, 6);

        let q = QuadrilateralFinder::new(&finder)
            .find_quadrilateral(label)
            .expect("diamond corners");
        assert_eq!(q.nw, Point2::new(2, 6));
        assert_eq!(q.sw, Point2::new(2, 6));
        assert_eq!(q.ne, Point2::new(10, 6));
        assert_eq!(q.se, Point2::new(10, 6));
    }

    #[test]
    fn unknown_label_yields_none() {
        let matrix = BitMatrix::new(4, 4);
        let finder = ConnectedComponentFinder::new(&matrix);
        assert!(QuadrilateralFinder::new(&finder)
            .find_quadrilateral(999)
            .is_none());
    }
}
