//! Core primitives for Aztec barcode detection.
//!
//! This crate is intentionally small and carries no detection logic. It
//! provides the pieces the `aztec-locate` pipeline composes:
//! - [`BitMatrix`] – packed black/white pixel grid,
//! - [`Envelope`] / [`Quadrilateral`] – integer pixel geometry,
//! - [`PerspectiveTransform`] – 3x3 projective maps from four
//!   correspondences,
//! - [`GaloisField`] / [`ReedSolomonDecoder`] – GF(16) mode-message
//!   correction,
//! - grayscale adapters and binarizers in [`binarize`].

mod bitmatrix;
mod galois;
mod geometry;
mod perspective;
mod reedsolomon;

pub mod binarize;
pub mod logger;

pub use bitmatrix::{BitMatrix, ParseBitMatrixError};
pub use galois::GaloisField;
pub use geometry::{Envelope, Quadrilateral};
pub use perspective::PerspectiveTransform;
pub use reedsolomon::{ReedSolomonDecoder, ReedSolomonEncoder, ReedSolomonError};
