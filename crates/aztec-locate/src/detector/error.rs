use aztec_locate_core::ReedSolomonError;

/// Errors returned by the Aztec detector.
///
/// Every internal failure (no candidate passing the topology checks, a
/// sample landing outside the bit matrix, a missing orientation marker, too
/// few color changes along a reference line, an uncorrectable mode message)
/// collapses into the one outcome a caller can act on: there is no barcode
/// in this image.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectError {
    #[error("no Aztec code found in image")]
    NotFound,
}

impl From<ReedSolomonError> for DetectError {
    fn from(_: ReedSolomonError) -> Self {
        DetectError::NotFound
    }
}
