//! Detector state and stage orchestration.

use aztec_locate_core::{BitMatrix, Envelope, PerspectiveTransform, Quadrilateral};
use nalgebra::Point2;

use super::{AztecDetection, DetectError};
use crate::components::{ConnectedComponent, ConnectedComponentFinder};
use crate::quadfinder::QuadrilateralFinder;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Module size in the resampled canonical space, in transform units.
pub(super) const MODULE: i32 = 6;

/// Permutation of the N/E/S/W reference-point indices under each of the
/// four mode-message orientations.
pub(super) const ROT: [[usize; 4]; 4] = [
    [0, 1, 3, 2],
    [1, 2, 0, 3],
    [2, 3, 1, 0],
    [3, 0, 2, 1],
];

/// Detects one Aztec code in a labeled bit matrix.
///
/// A detector is one-shot: it borrows the component finder (and through it
/// the bit matrix) and carries the pipeline state from bull's-eye search to
/// the rectified output. Fresh image, fresh detector.
pub struct AztecDetector<'a> {
    pub(super) finder: &'a ConnectedComponentFinder<'a>,
    pub(super) matrix: &'a BitMatrix,
    /// Envelope of the whole image, for ray and sample clipping.
    pub(super) image_env: Envelope,
    /// Outermost white finder square, once the bull's-eye is found.
    pub(super) white_square: Option<ConnectedComponent>,
    pub(super) compact: bool,
    pub(super) num_layers: u32,
    pub(super) num_data_words: u32,
    /// Module count per side, including reference grid lines.
    pub(super) matrix_size: i32,
    /// Additional reference grid lines per quadrant beyond the central ones.
    pub(super) num_reference_lines: u32,
    /// Which mode-message line is the top one; folded into the transform by
    /// the first refinement.
    pub(super) top_line_index: usize,
    /// Maps canonical (rectified) coordinates to image pixels.
    pub(super) inverse_transform: Option<PerspectiveTransform>,
    /// Corners of the outer white finder square in image pixels.
    pub(super) quad: Option<Quadrilateral>,
    /// Image-space outer corners of the code, NW/NE/SE/SW.
    pub(super) outer_corners: [Point2<f32>; 4],
}

impl<'a> AztecDetector<'a> {
    pub fn new(finder: &'a ConnectedComponentFinder<'a>) -> Self {
        let matrix = finder.bit_matrix();
        Self {
            finder,
            matrix,
            image_env: Envelope::of_matrix(matrix),
            white_square: None,
            compact: false,
            num_layers: 0,
            num_data_words: 0,
            matrix_size: 0,
            num_reference_lines: 0,
            top_line_index: 0,
            inverse_transform: None,
            quad: None,
            outer_corners: [Point2::new(0.0, 0.0); 4],
        }
    }

    /// Run the whole pipeline: bull's-eye, corners, transforms, mode
    /// message, refinement.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip(self),
            fields(w = self.matrix.width(), h = self.matrix.height()))
    )]
    pub fn detect(&mut self) -> Result<(), DetectError> {
        if !self.find_bulls_eye() {
            return Err(DetectError::NotFound);
        }
        self.compute_transform()
    }

    /// Build and refine the inverse transform after a successful bull's-eye
    /// search, and derive the outer corners.
    pub fn compute_transform(&mut self) -> Result<(), DetectError> {
        self.find_corners()?;
        self.compute_initial_transform()?;
        self.decode_mode_message()?;
        for i in 1..=self.num_reference_lines {
            self.optimize_transform(16 * i as i32)?;
        }

        let q = 0.5 * (MODULE * self.matrix_size) as f32;
        let corners = {
            let transform = self.transform()?;
            [
                transform.transform(Point2::new(-q, -q)),
                transform.transform(Point2::new(q, -q)),
                transform.transform(Point2::new(q, q)),
                transform.transform(Point2::new(-q, q)),
            ]
        };
        self.outer_corners = corners;
        Ok(())
    }

    /// Locate the corners of the outermost white finder square.
    pub fn find_corners(&mut self) -> Result<(), DetectError> {
        let label = self
            .white_square
            .as_ref()
            .ok_or(DetectError::NotFound)?
            .label;
        let finder = QuadrilateralFinder::new(self.finder);
        self.quad = Some(
            finder
                .find_quadrilateral(label)
                .ok_or(DetectError::NotFound)?,
        );
        Ok(())
    }

    /// Initial inverse transform: the ideal corners of the outer white
    /// square map onto its measured pixel corners.
    pub fn compute_initial_transform(&mut self) -> Result<(), DetectError> {
        let q = self.quad.ok_or(DetectError::NotFound)?;
        let s = if self.compact {
            (7 * MODULE / 2) as f32
        } else {
            (11 * MODULE / 2) as f32
        };

        let src = [
            Point2::new(-s, -s),
            Point2::new(s, -s),
            Point2::new(-s, s),
            Point2::new(s, s),
        ];
        let dst = [
            pixel_point(q.nw),
            pixel_point(q.ne),
            pixel_point(q.sw),
            pixel_point(q.se),
        ];
        self.inverse_transform =
            Some(PerspectiveTransform::quadrilateral_to_quadrilateral(&src, &dst)
                .ok_or(DetectError::NotFound)?);
        Ok(())
    }

    /// Assemble the detection result with a one-bit-per-module matrix.
    pub fn detection(&self) -> Result<AztecDetection, DetectError> {
        let bits = self.normalize_matrix(1, 0)?;
        let [nw, ne, se, sw] = self.outer_corners;
        Ok(AztecDetection {
            bits,
            nw,
            ne,
            sw,
            se,
            compact: self.compact,
            num_layers: self.num_layers,
            num_data_words: self.num_data_words,
        })
    }

    /// True for the compact variant, valid after the bull's-eye search.
    #[inline]
    pub fn is_compact(&self) -> bool {
        self.compact
    }

    /// Layer count, valid after the mode message is decoded.
    #[inline]
    pub fn num_layers(&self) -> u32 {
        self.num_layers
    }

    /// Data word count, valid after the mode message is decoded.
    #[inline]
    pub fn num_data_words(&self) -> u32 {
        self.num_data_words
    }

    /// Module count per side, valid after the mode message is decoded.
    #[inline]
    pub fn matrix_size(&self) -> i32 {
        self.matrix_size
    }

    /// The current canonical-to-image transform.
    pub(super) fn transform(&self) -> Result<&PerspectiveTransform, DetectError> {
        self.inverse_transform.as_ref().ok_or(DetectError::NotFound)
    }
}

/// Round a transformed coordinate to its pixel, ties to even.
#[inline]
pub(super) fn round_pixel(v: f32) -> i32 {
    v.round_ties_even() as i32
}

#[inline]
fn pixel_point(p: Point2<i32>) -> Point2<f32> {
    Point2::new(p.x as f32, p.y as f32)
}
