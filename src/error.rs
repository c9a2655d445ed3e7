//! Error types for thin-film stack calculations.
//!
//! Every failure is a caller contract violation detected before any
//! arithmetic is performed. Evanescent (complex) ray angles beyond the
//! critical angle are physical and are never reported here.

use thiserror::Error;

/// Result type for stack calculations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while describing or evaluating a film stack
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Film refractive index and thickness lists disagree in length
    #[error("shape mismatch: {indices} film refractive indices but {thicknesses} film thicknesses")]
    ShapeMismatch { indices: usize, thicknesses: usize },

    /// A tabulated refractive index does not line up with the wavelength samples
    #[error("layer {layer} has {actual} tabulated refractive indices, expected {expected} (one per wavelength)")]
    DispersionMismatch {
        layer: usize,
        expected: usize,
        actual: usize,
    },

    /// Free-space wavelength must be finite and positive
    #[error("invalid free-space wavelength: {0}")]
    InvalidWavelength(f64),

    /// Film thickness must be finite and non-negative
    #[error("film {film} has invalid thickness {thickness}")]
    NegativeThickness { film: usize, thickness: f64 },
}
