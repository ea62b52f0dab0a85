//! Aztec detection pipeline.
//!
//! The detector consumes labeled connected components and walks a fixed
//! sequence of stages: bull's-eye search, corner finding, initial
//! perspective transform, mode-message decoding, reference-line refinement,
//! canonical resampling. Any stage may fail; every failure is the single
//! not-found outcome and nothing partial escapes.

mod bullseye;
mod error;
mod mode_message;
mod normalize;
mod pipeline;
mod refine;
mod result;

pub use error::DetectError;
pub use pipeline::AztecDetector;
pub use result::AztecDetection;
