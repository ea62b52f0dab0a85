use aztec_locate_core::BitMatrix;
use nalgebra::Point2;
use serde::Serialize;

/// Output of a successful detection run.
#[derive(Clone, Debug, Serialize)]
pub struct AztecDetection {
    /// Rectified matrix, one bit per module unless the caller asked the
    /// detector for magnified cells.
    pub bits: BitMatrix,
    /// Image-space position of the code's north-west outer corner.
    pub nw: Point2<f32>,
    /// North-east outer corner.
    pub ne: Point2<f32>,
    /// South-west outer corner.
    pub sw: Point2<f32>,
    /// South-east outer corner.
    pub se: Point2<f32>,
    /// True for the compact Aztec variant (no reference grid).
    pub compact: bool,
    /// Number of data layers, 1..=32.
    pub num_layers: u32,
    /// Number of data codewords announced by the mode message.
    pub num_data_words: u32,
}
