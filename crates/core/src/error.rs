//! Error types for the flow-field core.

use thiserror::Error;

/// Errors produced while configuring or building a flow simulation.
///
/// Nothing in the per-frame advection loop returns an error; every variant
/// here is raised at construction time or by an explicit `try_` accessor.
#[derive(Debug, Error)]
pub enum FlowError {
    /// Width or height was zero, or `width * height` overflowed.
    #[error("invalid dimensions: width and height must be non-zero")]
    InvalidDimensions,

    /// A configuration value was outside its valid range.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A parameter existed but had the wrong JSON type.
    #[error("parameter type mismatch for '{name}': expected {expected}, got {got}")]
    ParamTypeMismatch {
        name: String,
        expected: String,
        got: String,
    },

    /// A grid lookup was requested outside `[0, width) x [0, height)`.
    #[error("index ({x}, {y}) out of bounds for field of size ({width}, {height})")]
    OutOfBounds {
        x: isize,
        y: isize,
        width: usize,
        height: usize,
    },

    /// Writing an output artifact failed.
    #[error("i/o error: {0}")]
    Io(String),
}
