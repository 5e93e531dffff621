//! Blended prediction and Jacobian over a receptive-field population.
//!
//! ## Purpose
//!
//! This module turns the local models of one sub-model into a single output:
//! the activation-weighted average of the local predictions, an optional
//! confidence bound, and the derivative of the blend w.r.t. the input.
//!
//! ## Design notes
//!
//! * **Shared inclusion set**: Prediction and Jacobian include exactly the
//!   fields with activation `>= cutoff`, so the Jacobian differentiates the
//!   function `predict` computes.
//! * **Normalized space**: Everything here works on normalized inputs and
//!   outputs; the model applies the scaling.
//! * **Empty blend**: No contributing field predicts 0 with infinite
//!   confidence and a zero Jacobian.
//!
//! ## Key concepts
//!
//! * **Blend**: `ŷ = Σ wₖ ŷₖ / Σ wₖ`.
//! * **Confidence**: Standard deviation of the weighted mixture of local
//!   predictive distributions, each with variance `σ²ₖ (1 + wₖ Σ zᵢ²/SSs2ᵢ)`.
//! * **Jacobian**: `Σ [wₖ slopeₖ + (ŷₖ - ŷ) ∂wₖ/∂x] / Σ wₖ`.
//!
//! ## Invariants
//!
//! * Raising the cutoff never adds a field to the inclusion set.

// Feature-gated imports
#[cfg(not(feature = "std"))]
use alloc::{vec, vec::Vec};
#[cfg(feature = "std")]
use std::vec::Vec;

// External dependencies
use num_traits::Float;

// Internal dependencies
use crate::algorithms::receptive_field::ReceptiveField;
use crate::math::kernel::Kernel;

// ============================================================================
// Output types
// ============================================================================

/// Blended prediction of one output dimension.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction<T> {
    /// Predicted value.
    pub value: T,

    /// One standard deviation of the prediction; infinite without support.
    pub confidence: T,

    /// Largest activation over all fields, regardless of the cutoff.
    pub max_activation: T,
}

// ============================================================================
// PredictionEngine
// ============================================================================

/// Activation-weighted blending of local predictions.
pub struct PredictionEngine;

impl PredictionEngine {
    /// Prediction, confidence and maximum activation for `x`.
    pub fn predict<T: Float>(
        fields: &[ReceptiveField<T>],
        x: &[T],
        kernel: Kernel,
        cutoff: T,
    ) -> Prediction<T> {
        let mut sum_w = T::zero();
        let mut sum_wy = T::zero();
        let mut sum_wvar = T::zero();
        let mut max_activation = T::zero();

        for rf in fields {
            let (w, _) = rf.activation(x, kernel);
            max_activation = max_activation.max(w);
            if w < cutoff || w <= T::zero() {
                continue;
            }
            let (y, s) = rf.predict_local(x);
            let variance = rf.local_variance() * (T::one() + w * rf.leverage(&s));
            sum_w = sum_w + w;
            sum_wy = sum_wy + w * y;
            sum_wvar = sum_wvar + w * (variance + y * y);
        }

        if sum_w <= T::zero() {
            return Prediction {
                value: T::zero(),
                confidence: T::infinity(),
                max_activation,
            };
        }

        let value = sum_wy / sum_w;
        let spread = (sum_wvar / sum_w - value * value).max(T::zero());
        Prediction {
            value,
            confidence: spread.sqrt(),
            max_activation,
        }
    }

    /// Prediction only.
    pub fn predict_value<T: Float>(
        fields: &[ReceptiveField<T>],
        x: &[T],
        kernel: Kernel,
        cutoff: T,
    ) -> T {
        let (sum_w, sum_wy) = fields.iter().fold((T::zero(), T::zero()), |(sw, swy), rf| {
            let (w, _) = rf.activation(x, kernel);
            if w < cutoff || w <= T::zero() {
                (sw, swy)
            } else {
                (sw + w, swy + w * rf.predict_local(x).0)
            }
        });
        if sum_w > T::zero() {
            sum_wy / sum_w
        } else {
            T::zero()
        }
    }
}

// ============================================================================
// JacobianEngine
// ============================================================================

/// Derivative of the blended prediction w.r.t. the input.
pub struct JacobianEngine;

impl JacobianEngine {
    /// Blended prediction and its gradient at `x`.
    pub fn gradient<T: Float>(
        fields: &[ReceptiveField<T>],
        x: &[T],
        kernel: Kernel,
        cutoff: T,
    ) -> (T, Vec<T>) {
        let n = x.len();
        let mut included = Vec::new();
        let mut sum_w = T::zero();
        let mut sum_wy = T::zero();

        for rf in fields {
            let (w, _) = rf.activation(x, kernel);
            if w < cutoff || w <= T::zero() {
                continue;
            }
            let (y, _) = rf.predict_local(x);
            sum_w = sum_w + w;
            sum_wy = sum_wy + w * y;
            included.push((rf, w, y));
        }

        let mut grad = vec![T::zero(); n];
        if sum_w <= T::zero() {
            return (T::zero(), grad);
        }
        let value = sum_wy / sum_w;

        for (rf, w, y) in included {
            let slope = rf.slope();
            let dw = rf.activation_gradient(x, w, kernel);
            let diff = y - value;
            for i in 0..n {
                grad[i] = grad[i] + w * slope[i] + diff * dw[i];
            }
        }
        for g in &mut grad {
            *g = *g / sum_w;
        }
        (value, grad)
    }
}
