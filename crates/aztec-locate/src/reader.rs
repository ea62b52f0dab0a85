//! End-to-end decoding entry points.

use aztec_locate_core::binarize::{binarize_hybrid, luminance_from_bits};
use aztec_locate_core::BitMatrix;

use crate::components::ConnectedComponentFinder;
use crate::detector::{AztecDetection, AztecDetector, DetectError};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Detect and rectify the Aztec code in an already binarized matrix.
///
/// Labels the connected components, runs the detector pipeline, and returns
/// the one-bit-per-module rectified matrix with the code geometry. This is
/// the whole detection API; symbol decoding of the rectified matrix is a
/// separate concern.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip(matrix),
        fields(w = matrix.width(), h = matrix.height()))
)]
pub fn decode_bit_matrix(matrix: &BitMatrix) -> Result<AztecDetection, DetectError> {
    let finder = ConnectedComponentFinder::new(matrix);
    let mut detector = AztecDetector::new(&finder);
    detector.detect()?;
    detector.detection()
}

/// Rectify with magnified cells and re-binarize, the way a downstream
/// symbol decoder wants its input: each module two pixels wide with a white
/// border, rendered to grayscale and put through the hybrid binarizer.
pub fn renormalize_for_decoding(detector: &AztecDetector<'_>) -> Result<BitMatrix, DetectError> {
    let magnified = detector.normalize_matrix(2, 4)?;
    Ok(binarize_hybrid(&luminance_from_bits(&magnified)))
}

/// Binarize a grayscale image and run detection on it.
#[cfg(feature = "image")]
pub fn decode_gray_image(img: &image::GrayImage) -> Result<AztecDetection, DetectError> {
    let grid = aztec_locate_core::binarize::LuminanceGrid {
        width: img.width() as usize,
        height: img.height() as usize,
        data: img.as_raw().clone(),
    };
    decode_bit_matrix(&binarize_hybrid(&grid))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_matrix_is_not_found() {
        let matrix = BitMatrix::new(64, 64);
        assert!(matches!(
            decode_bit_matrix(&matrix),
            Err(DetectError::NotFound)
        ));
    }
}
