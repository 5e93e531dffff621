//! Hyperparameters of an LWPR model.
//!
//! ## Purpose
//!
//! This module holds [`LwprConfig`], the single record of every global
//! hyperparameter a model carries, with the defaults of the reference LWPR
//! library. Receptive fields never see the config directly; the sub-models
//! hand them the derived [`FieldParams`] instead.
//!
//! ## Design notes
//!
//! * **Plain data**: Setting a field is pure state mutation. Range checks live
//!   in the validator and run only where the public API asks for them.
//! * **Initial metric as a factor**: The initial distance metric is stored as
//!   its Cholesky factor, which is what new fields are seeded with.
//!
//! ## Key concepts
//!
//! * **Time constant**: `tau_lambda` is the number of samples over which the
//!   forgetting factor moves `1 - 1/e` of the way to `final_lambda`.

// Feature-gated imports
#[cfg(not(feature = "std"))]
use alloc::{vec, vec::Vec};
#[cfg(feature = "std")]
use std::vec::Vec;

// External dependencies
use num_traits::Float;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// Internal dependencies
use crate::algorithms::metric::MetricParams;
use crate::algorithms::receptive_field::FieldParams;
use crate::math::kernel::Kernel;
use crate::primitives::triangular::LowerTriangular;

// ============================================================================
// Defaults
// ============================================================================

/// Default activation threshold below which a new field is created.
pub const DEFAULT_W_GEN: f64 = 0.1;

/// Default activation above which overlapping fields are pruned.
pub const DEFAULT_W_PRUNE: f64 = 1.0;

/// Default smoothness penalty.
pub const DEFAULT_PENALTY: f64 = 1e-6;

/// Default initial forgetting factor.
pub const DEFAULT_INIT_LAMBDA: f64 = 0.999;

/// Default final forgetting factor.
pub const DEFAULT_FINAL_LAMBDA: f64 = 0.99999;

/// Default annealing time constant, in samples.
pub const DEFAULT_TAU_LAMBDA: f64 = 1e4;

/// Default initial projection variance.
pub const DEFAULT_INIT_S2: f64 = 1e-10;

/// Default meta learning rate.
pub const DEFAULT_META_RATE: f64 = 250.0;

/// Default initial metric learning rate.
pub const DEFAULT_INIT_ALPHA: f64 = 50.0;

/// Default ratio for adding PLS directions.
pub const DEFAULT_ADD_THRESHOLD: f64 = 0.5;

/// Default diagonal of the initial distance metric.
pub const DEFAULT_INIT_D: f64 = 25.0;

/// Activation below which a field is not trained on a sample.
pub const TRAINING_FLOOR: f64 = 0.001;

// ============================================================================
// LwprConfig
// ============================================================================

/// Global hyperparameters of an LWPR model.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LwprConfig<T> {
    /// Create a new field when no activation reaches this value.
    pub w_gen: T,

    /// Prune when two or more activations exceed this value.
    pub w_prune: T,

    /// Smoothness penalty on the distance metric.
    pub penalty: T,

    /// Forgetting factor of fresh statistics.
    pub init_lambda: T,

    /// Annealing time constant of the forgetting factor.
    pub tau_lambda: T,

    /// Asymptotic forgetting factor.
    pub final_lambda: T,

    /// Initial projection variance of new PLS directions.
    pub init_s2: T,

    /// Initial per-element learning rate of the metric factor.
    pub init_alpha: T,

    /// MSE ratio below which another PLS direction is added.
    pub add_threshold: T,

    /// Accumulated weight after which a field is trustworthy.
    pub trust_threshold: T,

    /// Adapt distance metrics.
    pub update_d: bool,

    /// Adapt only the diagonal of the metric factor.
    pub diag_only: bool,

    /// Enable meta learning of the metric learning rates.
    pub use_meta: bool,

    /// Meta learning rate.
    pub meta_rate: T,

    /// Activation kernel.
    pub kernel: Kernel,

    /// Cholesky factor of the initial distance metric.
    pub init_factor: LowerTriangular<T>,
}

impl<T: Float> LwprConfig<T> {
    /// Defaults for an `n_in`-dimensional input space.
    pub fn new(n_in: usize) -> Self {
        let c = |v: f64| T::from(v).unwrap();
        Self {
            w_gen: c(DEFAULT_W_GEN),
            w_prune: c(DEFAULT_W_PRUNE),
            penalty: c(DEFAULT_PENALTY),
            init_lambda: c(DEFAULT_INIT_LAMBDA),
            tau_lambda: c(DEFAULT_TAU_LAMBDA),
            final_lambda: c(DEFAULT_FINAL_LAMBDA),
            init_s2: c(DEFAULT_INIT_S2),
            init_alpha: c(DEFAULT_INIT_ALPHA),
            add_threshold: c(DEFAULT_ADD_THRESHOLD),
            trust_threshold: c(2.0 * n_in as f64),
            update_d: true,
            diag_only: true,
            use_meta: false,
            meta_rate: c(DEFAULT_META_RATE),
            kernel: Kernel::Gaussian,
            init_factor: LowerTriangular::scaled_identity(n_in, c(DEFAULT_INIT_D).sqrt()),
        }
    }

    /// Input dimensionality the config was made for.
    #[inline]
    pub fn n_in(&self) -> usize {
        self.init_factor.dim()
    }

    /// Per-sample annealing decay `exp(-1 / tau_lambda)`.
    ///
    /// A non-positive time constant jumps straight to `final_lambda`.
    pub fn lambda_decay(&self) -> T {
        if self.tau_lambda > T::zero() {
            (-T::one() / self.tau_lambda).exp()
        } else {
            T::zero()
        }
    }

    /// Parameters handed to receptive fields.
    pub fn field_params(&self) -> FieldParams<T> {
        FieldParams {
            kernel: self.kernel,
            init_lambda: self.init_lambda,
            final_lambda: self.final_lambda,
            lambda_decay: self.lambda_decay(),
            init_s2: self.init_s2,
            add_threshold: self.add_threshold,
            trust_threshold: self.trust_threshold,
            update_d: self.update_d,
            metric: MetricParams {
                penalty: self.penalty,
                diag_only: self.diag_only,
                use_meta: self.use_meta,
                meta_rate: self.meta_rate,
            },
        }
    }

    /// Dense initial distance metric, row-major.
    pub fn init_metric(&self) -> Vec<T> {
        let n = self.n_in();
        let mut out = vec![T::zero(); n * n];
        self.init_factor.gram_into(&mut out);
        out
    }
}
