//! Projective transforms from four point correspondences.
//!
//! The detector works with the *inverse* transform: it maps canonical
//! (rectified, module-aligned) coordinates back into image pixels, so that
//! sampling a module means transforming its canonical center and reading the
//! source bit there.

use nalgebra::{Matrix3, Point2, SMatrix, SVector, Vector3};

/// 3x3 projective map between two planes.
///
/// Public coordinates are `f32`; the solve and the evaluation run in `f64`
/// to keep the conditioning of skewed quadrilaterals under control.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PerspectiveTransform {
    h: Matrix3<f64>,
}

impl PerspectiveTransform {
    /// Build the transform mapping the four `src` corners onto the four
    /// `dst` corners. Corner order must be consistent between the two
    /// quadrilaterals (the detector uses NW, NE, SW, SE throughout).
    ///
    /// Returns `None` for degenerate input (collinear or coincident
    /// corners).
    pub fn quadrilateral_to_quadrilateral(
        src: &[Point2<f32>; 4],
        dst: &[Point2<f32>; 4],
    ) -> Option<Self> {
        // Unknowns: [h11 h12 h13 h21 h22 h23 h31 h32], with h33 = 1.
        // For each correspondence (x,y)->(u,v):
        // h11 x + h12 y + h13 - u h31 x - u h32 y = u
        // h21 x + h22 y + h23 - v h31 x - v h32 y = v
        let (src_n, t_src) = normalize_points(src);
        let (dst_n, t_dst) = normalize_points(dst);

        let mut a = SMatrix::<f64, 8, 8>::zeros();
        let mut b = SVector::<f64, 8>::zeros();

        for k in 0..4 {
            let x = src_n[k].x;
            let y = src_n[k].y;
            let u = dst_n[k].x;
            let v = dst_n[k].y;

            let r0 = 2 * k;
            a[(r0, 0)] = x;
            a[(r0, 1)] = y;
            a[(r0, 2)] = 1.0;
            a[(r0, 6)] = -u * x;
            a[(r0, 7)] = -u * y;
            b[r0] = u;

            let r1 = 2 * k + 1;
            a[(r1, 3)] = x;
            a[(r1, 4)] = y;
            a[(r1, 5)] = 1.0;
            a[(r1, 6)] = -v * x;
            a[(r1, 7)] = -v * y;
            b[r1] = v;
        }

        let x = a.lu().solve(&b)?;

        let hn = Matrix3::<f64>::new(
            x[0], x[1], x[2], //
            x[3], x[4], x[5], //
            x[6], x[7], 1.0,
        );

        let t_dst_inv = t_dst.try_inverse()?;
        let h = t_dst_inv * hn * t_src;
        let s = h[(2, 2)];
        if s.abs() < 1e-12 {
            return None;
        }

        let transform = Self { h: h / s };

        // A near-singular system can slip through the LU solve with a
        // nonsense solution; accept only a map that reproduces the
        // correspondences.
        for (p, q) in src.iter().zip(dst.iter()) {
            let mapped = transform.transform(*p);
            let tol = 1e-2 * (1.0 + q.coords.norm());
            if (mapped - q).norm() > tol {
                return None;
            }
        }
        Some(transform)
    }

    /// Transform a single point.
    #[inline]
    pub fn transform(&self, p: Point2<f32>) -> Point2<f32> {
        let v = self.h * Vector3::new(p.x as f64, p.y as f64, 1.0);
        let w = v[2];
        Point2::new((v[0] / w) as f32, (v[1] / w) as f32)
    }

    /// Transform interleaved `x0, y0, x1, y1, ...` coordinates in place.
    pub fn transform_points(&self, points: &mut [f32]) {
        debug_assert!(points.len() % 2 == 0);
        for pair in points.chunks_exact_mut(2) {
            let q = self.transform(Point2::new(pair[0], pair[1]));
            pair[0] = q.x;
            pair[1] = q.y;
        }
    }
}

/// Hartley normalization: translate to the centroid, scale so the mean
/// distance from it is sqrt(2).
fn normalize_points(pts: &[Point2<f32>; 4]) -> ([Point2<f64>; 4], Matrix3<f64>) {
    let n = 4.0_f64;
    let mut cx = 0.0_f64;
    let mut cy = 0.0_f64;
    for p in pts {
        cx += p.x as f64;
        cy += p.y as f64;
    }
    cx /= n;
    cy /= n;

    let mut mean_dist = 0.0_f64;
    for p in pts {
        let dx = p.x as f64 - cx;
        let dy = p.y as f64 - cy;
        mean_dist += (dx * dx + dy * dy).sqrt();
    }
    mean_dist /= n;

    let s = if mean_dist > 1e-12 {
        (2.0_f64).sqrt() / mean_dist
    } else {
        1.0
    };
    let t = Matrix3::<f64>::new(s, 0.0, -s * cx, 0.0, s, -s * cy, 0.0, 0.0, 1.0);

    let mut out = [Point2::new(0.0_f64, 0.0_f64); 4];
    for (i, p) in pts.iter().enumerate() {
        let v = t * Vector3::new(p.x as f64, p.y as f64, 1.0);
        out[i] = Point2::new(v[0], v[1]);
    }
    (out, t)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: Point2<f32>, b: Point2<f32>, tol: f32) {
        let dx = (a.x - b.x).abs();
        let dy = (a.y - b.y).abs();
        assert!(
            dx < tol && dy < tol,
            "expected ({:.4},{:.4}) ~ ({:.4},{:.4}) within {}",
            a.x,
            a.y,
            b.x,
            b.y,
            tol
        );
    }

    #[test]
    fn maps_corners_onto_corners() {
        // Skewed scan of a 44px square, the shape real barcode corners take.
        let dst = [
            Point2::new(155.0_f32, 137.0),
            Point2::new(258.0, 139.0),
            Point2::new(136.0, 228.0),
            Point2::new(247.0, 231.0),
        ];
        let src = [
            Point2::new(158.0_f32, 158.0),
            Point2::new(202.0, 158.0),
            Point2::new(158.0, 202.0),
            Point2::new(202.0, 202.0),
        ];
        let t = PerspectiveTransform::quadrilateral_to_quadrilateral(&src, &dst).expect("solve");
        for (s, d) in src.iter().zip(dst.iter()) {
            assert_close(t.transform(*s), *d, 1e-2);
        }
    }

    #[test]
    fn identity_on_matching_quadrilaterals() {
        let q = [
            Point2::new(-21.0_f32, -21.0),
            Point2::new(21.0, -21.0),
            Point2::new(-21.0, 21.0),
            Point2::new(21.0, 21.0),
        ];
        let t = PerspectiveTransform::quadrilateral_to_quadrilateral(&q, &q).expect("solve");
        for p in [
            Point2::new(0.0_f32, 0.0),
            Point2::new(10.5, -3.0),
            Point2::new(-17.0, 20.0),
        ] {
            assert_close(t.transform(p), p, 1e-3);
        }
    }

    #[test]
    fn transforms_interleaved_buffer_in_place() {
        let src = [
            Point2::new(0.0_f32, 0.0),
            Point2::new(10.0, 0.0),
            Point2::new(0.0, 10.0),
            Point2::new(10.0, 10.0),
        ];
        // Pure translation by (5, -2).
        let dst = src.map(|p| Point2::new(p.x + 5.0, p.y - 2.0));
        let t = PerspectiveTransform::quadrilateral_to_quadrilateral(&src, &dst).expect("solve");

        let mut buf = [1.0_f32, 2.0, 3.0, 4.0];
        t.transform_points(&mut buf);
        assert!((buf[0] - 6.0).abs() < 1e-3);
        assert!((buf[1] - 0.0).abs() < 1e-3);
        assert!((buf[2] - 8.0).abs() < 1e-3);
        assert!((buf[3] - 2.0).abs() < 1e-3);
    }

    #[test]
    fn degenerate_corners_fail() {
        let src = [
            Point2::new(0.0_f32, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(2.0, 2.0),
            Point2::new(3.0, 3.0),
        ];
        let dst = [
            Point2::new(0.0_f32, 0.0),
            Point2::new(10.0, 0.0),
            Point2::new(0.0, 10.0),
            Point2::new(10.0, 10.0),
        ];
        assert!(PerspectiveTransform::quadrilateral_to_quadrilateral(&src, &dst).is_none());
    }
}
