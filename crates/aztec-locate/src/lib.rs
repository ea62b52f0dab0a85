//! aztec-locate locates and geometrically normalizes Aztec 2D barcodes.
//!
//! Given a binarized bit matrix, the pipeline stages are:
//!
//! 1. **Components** – 4-connected union-find labeling of black/white
//!    regions.
//! 2. **Bull's-eye** – topological search for the concentric finder rings.
//! 3. **Corners** – diagonal sweeps locate the outer white finder square.
//! 4. **Transform** – an inverse perspective map from canonical module
//!    space into image pixels, refined against the reference grid lines of
//!    full codes.
//! 5. **Mode message** – orientation marks and Reed-Solomon-corrected
//!    layer/data-word parameters.
//! 6. **Normalize** – resampling into an upright one-bit-per-module matrix.
//!
//! [`decode_bit_matrix`] runs the whole pipeline; the stage types are
//! public for callers that need intermediate access.

pub mod components;
pub mod detector;
pub mod quadfinder;
pub mod reader;

#[doc(hidden)]
pub mod test_utils;

pub use components::{ConnectedComponent, ConnectedComponentFinder};
pub use detector::{AztecDetection, AztecDetector, DetectError};
pub use quadfinder::QuadrilateralFinder;
pub use reader::{decode_bit_matrix, renormalize_for_decoding};

#[cfg(feature = "image")]
pub use reader::decode_gray_image;
