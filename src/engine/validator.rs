//! Input validation for LWPR models.
//!
//! ## Purpose
//!
//! This module checks every argument that crosses the public boundary before
//! any state is touched: vector lengths against the model's dimensions,
//! finiteness of training data, positive definiteness of requested initial
//! distance metrics, and indices into the receptive-field population.
//!
//! ## Design notes
//!
//! * **Fail-Fast**: Validation stops at the first error encountered.
//! * **Before mutation**: Callers validate everything first and only then
//!   mutate, so a failed call leaves the model exactly as it was.
//! * **Factor on success**: Initial-metric checks return the Cholesky factor
//!   they computed, so the caller never factors twice.
//!
//! ## Invariants
//!
//! * Validation is deterministic and side-effect free.
//!
//! ## Non-goals
//!
//! * This module does not correct or clamp invalid inputs.

// Feature-gated imports
#[cfg(not(feature = "std"))]
use alloc::{format, string::ToString, vec::Vec};
#[cfg(feature = "std")]
use std::vec::Vec;

// Internal dependencies
use crate::math::linalg::{is_symmetric, FloatLinalg};
use crate::primitives::errors::LwprError;
use crate::primitives::triangular::LowerTriangular;

// ============================================================================
// Validator
// ============================================================================

/// Validation utility for LWPR arguments.
///
/// Provides static methods that return `Result<_, LwprError>` and fail fast
/// upon identifying the first violation.
pub struct Validator;

impl Validator {
    // ========================================================================
    // Dimensions
    // ========================================================================

    /// Validate the dimensions of a new model.
    pub fn validate_dims(n_in: usize, n_out: usize) -> Result<(), LwprError> {
        if n_in == 0 {
            return Err(LwprError::BadInputDim {
                expected: 1,
                got: 0,
            });
        }
        if n_out == 0 {
            return Err(LwprError::BadOutputDim {
                expected: 1,
                got: 0,
            });
        }
        Ok(())
    }

    /// Validate an input vector.
    pub fn validate_input<T: FloatLinalg>(x: &[T], n_in: usize) -> Result<(), LwprError> {
        if x.len() != n_in {
            return Err(LwprError::BadInputDim {
                expected: n_in,
                got: x.len(),
            });
        }
        Self::validate_finite(x, "input")
    }

    /// Validate an output vector.
    pub fn validate_output<T: FloatLinalg>(y: &[T], n_out: usize) -> Result<(), LwprError> {
        if y.len() != n_out {
            return Err(LwprError::BadOutputDim {
                expected: n_out,
                got: y.len(),
            });
        }
        Self::validate_finite(y, "output")
    }

    /// Validate that all values are finite.
    pub fn validate_finite<T: FloatLinalg>(values: &[T], name: &str) -> Result<(), LwprError> {
        if let Some(i) = values.iter().position(|v| !v.is_finite()) {
            return Err(LwprError::Unspecified(format!(
                "{} contains a non-finite value at index {}",
                name, i
            )));
        }
        Ok(())
    }

    /// Validate a normalization vector: right length, strictly positive.
    pub fn validate_norm<T: FloatLinalg>(
        values: &[T],
        len: usize,
        is_input: bool,
    ) -> Result<(), LwprError> {
        if values.len() != len {
            return Err(if is_input {
                LwprError::BadInputDim {
                    expected: len,
                    got: values.len(),
                }
            } else {
                LwprError::BadOutputDim {
                    expected: len,
                    got: values.len(),
                }
            });
        }
        if values.iter().any(|&v| !(v.is_finite() && v > T::zero())) {
            return Err(LwprError::Unspecified(
                "normalization factors must be positive and finite".to_string(),
            ));
        }
        Ok(())
    }

    // ========================================================================
    // Initial distance metric
    // ========================================================================

    /// Validate `delta * I` and return its factor.
    pub fn validate_init_d_spherical<T: FloatLinalg>(
        delta: T,
        n_in: usize,
    ) -> Result<LowerTriangular<T>, LwprError> {
        if !(delta.is_finite() && delta > T::zero()) {
            return Err(LwprError::BadInitD(format!(
                "spherical scale must be positive, got {:?}",
                delta
            )));
        }
        Ok(LowerTriangular::scaled_identity(n_in, delta.sqrt()))
    }

    /// Validate `diag(values)` and return its factor.
    pub fn validate_init_d_diagonal<T: FloatLinalg>(
        diag: &[T],
        n_in: usize,
    ) -> Result<LowerTriangular<T>, LwprError> {
        if diag.len() != n_in {
            return Err(LwprError::BadInputDim {
                expected: n_in,
                got: diag.len(),
            });
        }
        if let Some(i) = diag.iter().position(|&v| !(v.is_finite() && v > T::zero())) {
            return Err(LwprError::BadInitD(format!(
                "diagonal entry {} must be positive, got {:?}",
                i, diag[i]
            )));
        }
        let sqrt: Vec<T> = diag.iter().map(|v| v.sqrt()).collect();
        Ok(LowerTriangular::from_diagonal(&sqrt))
    }

    /// Validate a full row-major `n_in x n_in` metric and return its factor.
    pub fn validate_init_d_full<T: FloatLinalg>(
        d: &[T],
        n_in: usize,
    ) -> Result<LowerTriangular<T>, LwprError> {
        if d.len() != n_in * n_in {
            return Err(LwprError::BadInputDim {
                expected: n_in * n_in,
                got: d.len(),
            });
        }
        if d.iter().any(|v| !v.is_finite()) {
            return Err(LwprError::BadInitD("matrix has non-finite entries".to_string()));
        }
        if !is_symmetric(d, n_in) {
            return Err(LwprError::BadInitD("matrix is not symmetric".to_string()));
        }
        let l = T::cholesky_lower(d, n_in)
            .ok_or_else(|| LwprError::BadInitD("Cholesky factorisation failed".to_string()))?;
        Ok(LowerTriangular::from_dense(&l, n_in))
    }

    // ========================================================================
    // Indices and builder state
    // ========================================================================

    /// Validate an index into a collection of `len` entries.
    pub fn validate_index(what: &'static str, index: usize, len: usize) -> Result<(), LwprError> {
        if index >= len {
            return Err(LwprError::OutOfRange { what, index, len });
        }
        Ok(())
    }

    /// Validate a hyperparameter that must be a finite number.
    pub fn validate_scalar<T: FloatLinalg>(val: T, name: &str) -> Result<(), LwprError> {
        if !val.is_finite() {
            return Err(LwprError::Unspecified(format!(
                "parameter '{}' must be finite, got {:?}",
                name, val
            )));
        }
        Ok(())
    }

    /// Validate a forgetting factor, which must lie in `(0, 1]`.
    pub fn validate_lambda<T: FloatLinalg>(val: T, name: &str) -> Result<(), LwprError> {
        if !(val > T::zero() && val <= T::one()) {
            return Err(LwprError::Unspecified(format!(
                "parameter '{}' must be in (0, 1], got {:?}",
                name, val
            )));
        }
        Ok(())
    }

    /// Validate that no builder parameter was set twice.
    pub fn validate_no_duplicates(duplicate_param: Option<&'static str>) -> Result<(), LwprError> {
        if let Some(param) = duplicate_param {
            return Err(LwprError::Unspecified(format!(
                "parameter '{}' was set multiple times",
                param
            )));
        }
        Ok(())
    }
}

