//! Kernel functions mapping metric distance to activation.
//!
//! ## Purpose
//!
//! A receptive field's activation for an input `x` is a kernel applied to
//! the squared Mahalanobis distance `d = (x - c)ᵀ D (x - c)`. This module
//! provides the two kernels LWPR supports, along with their first and second
//! derivatives with respect to `d`, which the distance-metric gradient and the
//! Jacobian both need.
//!
//! ## Design notes
//!
//! * **Closed set**: `Kernel` is an enum matched exhaustively everywhere.
//! * **Names at the edge**: Human-facing names (`"Gaussian"`, `"BiSquare"`)
//!   are only handled by `FromStr`/`Display`, which report `UnknownKernel`.
//! * **Derivatives from the weight**: Both kernels express their derivatives
//!   as functions of the weight itself, so no distance needs to be kept.
//!
//! ## Key concepts
//!
//! * **Gaussian**: `w = exp(-d / 2)`, infinite support.
//! * **BiSquare**: `w = (1 - d / 4)²` for `d < 4`, zero beyond (compact support).
//!
//! ## Invariants
//!
//! * Weights lie in `[0, 1]` for every `d >= 0`, and equal 1 at `d = 0`.
//!
//! ## Non-goals
//!
//! * This module does not compute distances.

// Feature-gated imports
#[cfg(not(feature = "std"))]
use alloc::string::ToString;

// External dependencies
use core::fmt;
use core::str::FromStr;
use num_traits::Float;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// Internal dependencies
use crate::primitives::errors::LwprError;

// ============================================================================
// Kernel
// ============================================================================

/// Activation kernel of the receptive fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Kernel {
    /// `exp(-d / 2)` (default).
    #[default]
    Gaussian,

    /// `(1 - d / 4)²`, clamped to zero for `d >= 4`.
    BiSquare,
}

impl Kernel {
    /// Activation for squared metric distance `d`.
    #[inline]
    pub fn weight<T: Float>(&self, d: T) -> T {
        match self {
            Self::Gaussian => (-d * T::from(0.5).unwrap()).exp(),
            Self::BiSquare => {
                let base = T::one() - d * T::from(0.25).unwrap();
                if base <= T::zero() {
                    T::zero()
                } else {
                    base * base
                }
            }
        }
    }

    /// First and second derivative of the weight w.r.t. `d`, given the weight.
    ///
    /// Returns `(dw/dd, d²w/dd²)`. For the BiSquare kernel outside its support
    /// (`w == 0`) both are zero.
    #[inline]
    pub fn derivatives<T: Float>(&self, w: T) -> (T, T) {
        match self {
            Self::Gaussian => (-T::from(0.5).unwrap() * w, T::from(0.25).unwrap() * w),
            Self::BiSquare => {
                if w <= T::zero() {
                    (T::zero(), T::zero())
                } else {
                    (-T::from(0.5).unwrap() * w.sqrt(), T::from(0.125).unwrap())
                }
            }
        }
    }

    /// Canonical configuration name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Gaussian => "Gaussian",
            Self::BiSquare => "BiSquare",
        }
    }
}

impl fmt::Display for Kernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Kernel {
    type Err = LwprError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Gaussian" => Ok(Self::Gaussian),
            "BiSquare" => Ok(Self::BiSquare),
            other => Err(LwprError::UnknownKernel(other.to_string())),
        }
    }
}
