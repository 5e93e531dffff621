//! Error types for LWPR operations.
//!
//! ## Purpose
//!
//! This module defines the single error type returned by every fallible
//! LWPR operation. Each variant corresponds to one failure kind a caller can
//! react to: dimension mismatches, invalid initial distance metrics, unknown
//! kernel names, I/O failures, bad indices, and allocation failure.
//!
//! ## Design notes
//!
//! * **Checked at the boundary**: Errors are raised before any model state is
//!   touched, so a failed call never leaves a partially updated model.
//! * **Descriptive**: Dimension errors carry the expected and received sizes.
//! * **no_std friendly**: Only `core::fmt` is required; `std::error::Error` is
//!   implemented when the `std` feature is enabled.
//!
//! ## Non-goals
//!
//! * This module does not perform any validation itself (see `engine::validator`).
//! * This module does not attempt recovery.

// Feature-gated imports
#[cfg(not(feature = "std"))]
use alloc::string::String;
#[cfg(feature = "std")]
use std::string::String;

use core::fmt;

// ============================================================================
// Error Type
// ============================================================================

/// Errors reported by LWPR models.
#[derive(Debug, Clone, PartialEq)]
pub enum LwprError {
    /// Storage for the model or a new receptive field could not be allocated.
    OutOfMemory,

    /// An argument did not match the model's input dimensionality.
    BadInputDim {
        /// Required length
        expected: usize,
        /// Length that was passed
        got: usize,
    },

    /// An argument did not match the model's output dimensionality.
    BadOutputDim {
        /// Required length
        expected: usize,
        /// Length that was passed
        got: usize,
    },

    /// The requested initial distance metric is not positive definite.
    BadInitD(String),

    /// A kernel name was not recognised.
    UnknownKernel(String),

    /// Reading or writing a serialized model failed.
    IoError(String),

    /// An index was outside the valid range.
    OutOfRange {
        /// What was being indexed
        what: &'static str,
        /// Index that was passed
        index: usize,
        /// Number of valid entries
        len: usize,
    },

    /// Any other failure. Should not happen.
    Unspecified(String),
}

impl fmt::Display for LwprError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfMemory => write!(f, "Insufficient memory to allocate storage"),
            Self::BadInputDim { expected, got } => write!(
                f,
                "Input dimensionality does not match: expected {}, got {}",
                expected, got
            ),
            Self::BadOutputDim { expected, got } => write!(
                f,
                "Output dimensionality does not match: expected {}, got {}",
                expected, got
            ),
            Self::BadInitD(reason) => write!(
                f,
                "Invalid initial distance metric (not positive definite): {}",
                reason
            ),
            Self::UnknownKernel(name) => write!(
                f,
                "Unknown kernel '{}' (expected \"Gaussian\" or \"BiSquare\")",
                name
            ),
            Self::IoError(msg) => write!(f, "I/O error: {}", msg),
            Self::OutOfRange { what, index, len } => write!(
                f,
                "Index out of range: {} {} (valid range is 0..{})",
                what, index, len
            ),
            Self::Unspecified(msg) => write!(f, "Unspecified error: {}", msg),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for LwprError {}
