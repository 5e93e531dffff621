//! High-level API for LWPR.
//!
//! ## Purpose
//!
//! This module provides the primary user-facing entry point: a fluent
//! builder that configures every hyperparameter of an LWPR model and
//! validates the whole configuration once, when `.build()` is called.
//!
//! ## Design notes
//!
//! * **Ergonomic**: Fluent builder with sensible defaults for all parameters.
//! * **Deferred errors**: Setters never fail; problems (including unknown
//!   kernel names) are reported by `.build()`.
//! * **Duplicate detection**: Setting the same parameter twice is an error.
//! * **Type-Safe**: Generic over `Float` types for flexible precision.
//!
//! ### Configuration Flow
//!
//! 1. Create a [`LwprBuilder`] via `Lwpr::new(n_in, n_out)`.
//! 2. Chain configuration methods (`.w_gen()`, `.init_d_spherical()`, etc.).
//! 3. Call `.build()` to get an [`LwprModel`].

// Feature-gated imports
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;
#[cfg(feature = "std")]
use std::vec::Vec;

// Internal dependencies
use crate::engine::validator::Validator;
use crate::math::linalg::FloatLinalg;

// Publicly re-exported types
pub use crate::adapters::online::{LwprModel, LwprPrediction};
pub use crate::engine::config::LwprConfig;
pub use crate::evaluation::inspect::ReceptiveFieldView;
pub use crate::math::kernel::Kernel;
pub use crate::primitives::errors::LwprError;

// ============================================================================
// Initial metric
// ============================================================================

/// Initial distance metric of new receptive fields.
#[derive(Debug, Clone, PartialEq)]
pub enum InitD<T> {
    /// `delta * I`.
    Spherical(T),

    /// Diagonal matrix with the given diagonal.
    Diagonal(Vec<T>),

    /// Full symmetric positive definite matrix, row-major.
    Full(Vec<T>),
}

// ============================================================================
// Builder
// ============================================================================

/// Fluent builder for LWPR models.
#[derive(Debug, Clone)]
pub struct LwprBuilder<T: FloatLinalg> {
    /// Input dimensionality.
    pub n_in: usize,

    /// Output dimensionality.
    pub n_out: usize,

    /// Activation threshold for creating fields.
    pub w_gen: Option<T>,

    /// Activation threshold for pruning fields.
    pub w_prune: Option<T>,

    /// Smoothness penalty.
    pub penalty: Option<T>,

    /// Initial forgetting factor.
    pub init_lambda: Option<T>,

    /// Annealing time constant.
    pub tau_lambda: Option<T>,

    /// Final forgetting factor.
    pub final_lambda: Option<T>,

    /// Initial projection variance.
    pub init_s2: Option<T>,

    /// Initial metric learning rate.
    pub init_alpha: Option<T>,

    /// Ratio for adding PLS directions.
    pub add_threshold: Option<T>,

    /// Accumulated weight after which fields are trustworthy.
    pub trust_threshold: Option<T>,

    /// Adapt distance metrics.
    pub update_d: Option<bool>,

    /// Adapt only the metric diagonal.
    pub diag_only: Option<bool>,

    /// Enable meta learning.
    pub use_meta: Option<bool>,

    /// Meta learning rate.
    pub meta_rate: Option<T>,

    /// Activation kernel.
    pub kernel: Option<Kernel>,

    /// Initial distance metric.
    pub init_d: Option<InitD<T>>,

    /// Input normalization.
    pub norm_in: Option<Vec<T>>,

    /// Output normalization.
    pub norm_out: Option<Vec<T>>,

    /// Train sub-models concurrently (with the `parallel` feature).
    pub parallel: Option<bool>,

    /// Error raised by a setter, reported at build time.
    #[doc(hidden)]
    pub deferred_error: Option<LwprError>,

    /// Tracks if any parameter was set multiple times (for validation).
    #[doc(hidden)]
    pub duplicate_param: Option<&'static str>,
}

macro_rules! setter {
    ($(#[$doc:meta])* $name:ident: $ty:ty) => {
        $(#[$doc])*
        pub fn $name(mut self, value: $ty) -> Self {
            if self.$name.is_some() {
                self.duplicate_param = Some(stringify!($name));
            }
            self.$name = Some(value);
            self
        }
    };
}

impl<T: FloatLinalg> LwprBuilder<T> {
    /// Create a builder for an `n_in`-input, `n_out`-output model.
    pub fn new(n_in: usize, n_out: usize) -> Self {
        Self {
            n_in,
            n_out,
            w_gen: None,
            w_prune: None,
            penalty: None,
            init_lambda: None,
            tau_lambda: None,
            final_lambda: None,
            init_s2: None,
            init_alpha: None,
            add_threshold: None,
            trust_threshold: None,
            update_d: None,
            diag_only: None,
            use_meta: None,
            meta_rate: None,
            kernel: None,
            init_d: None,
            norm_in: None,
            norm_out: None,
            parallel: None,
            deferred_error: None,
            duplicate_param: None,
        }
    }

    setter!(
        /// Set the activation threshold below which a new field is created.
        w_gen: T
    );
    setter!(
        /// Set the activation above which overlapping fields are pruned.
        w_prune: T
    );
    setter!(
        /// Set the smoothness penalty on the distance metric.
        penalty: T
    );
    setter!(
        /// Set the initial forgetting factor.
        init_lambda: T
    );
    setter!(
        /// Set the annealing time constant of the forgetting factor, in samples.
        tau_lambda: T
    );
    setter!(
        /// Set the final forgetting factor.
        final_lambda: T
    );
    setter!(
        /// Set the initial projection variance of new PLS directions.
        init_s2: T
    );
    setter!(
        /// Set the initial per-element metric learning rate.
        init_alpha: T
    );
    setter!(
        /// Set the MSE ratio below which another PLS direction is added.
        add_threshold: T
    );
    setter!(
        /// Set the accumulated weight after which a field is trustworthy.
        trust_threshold: T
    );
    setter!(
        /// Enable or disable distance-metric adaptation.
        update_d: bool
    );
    setter!(
        /// Restrict metric adaptation to the diagonal.
        diag_only: bool
    );
    setter!(
        /// Enable or disable meta learning of the metric learning rates.
        use_meta: bool
    );
    setter!(
        /// Set the meta learning rate.
        meta_rate: T
    );
    setter!(
        /// Set the activation kernel.
        kernel: Kernel
    );
    setter!(
        /// Set the per-input normalization.
        norm_in: Vec<T>
    );
    setter!(
        /// Set the per-output normalization.
        norm_out: Vec<T>
    );
    setter!(
        /// Train sub-models concurrently (needs the `parallel` feature).
        parallel: bool
    );

    /// Set the activation kernel by name (`"Gaussian"` or `"BiSquare"`).
    pub fn kernel_name(self, name: &str) -> Self {
        match name.parse() {
            Ok(kernel) => self.kernel(kernel),
            Err(err) => {
                let mut builder = self;
                builder.deferred_error.get_or_insert(err);
                builder
            }
        }
    }

    /// Set the initial metric to `delta * I`.
    pub fn init_d_spherical(self, delta: T) -> Self {
        self.init_d(InitD::Spherical(delta))
    }

    /// Set the initial metric to a diagonal matrix.
    pub fn init_d_diagonal(self, diag: Vec<T>) -> Self {
        self.init_d(InitD::Diagonal(diag))
    }

    /// Set the initial metric to a full row-major matrix.
    pub fn init_d_full(self, d: Vec<T>) -> Self {
        self.init_d(InitD::Full(d))
    }

    setter!(
        /// Set the initial distance metric of new fields.
        init_d: InitD<T>
    );

    // ========================================================================
    // Build Method
    // ========================================================================

    /// Validate the configuration and build the model.
    pub fn build(self) -> Result<LwprModel<T>, LwprError> {
        if let Some(err) = self.deferred_error {
            return Err(err);
        }

        // Check for duplicate parameter configuration
        Validator::validate_no_duplicates(self.duplicate_param)?;

        // Validate dimensions
        Validator::validate_dims(self.n_in, self.n_out)?;

        let mut config = LwprConfig::new(self.n_in);
        let scalars = [
            (&mut config.w_gen, self.w_gen, "w_gen"),
            (&mut config.w_prune, self.w_prune, "w_prune"),
            (&mut config.penalty, self.penalty, "penalty"),
            (&mut config.tau_lambda, self.tau_lambda, "tau_lambda"),
            (&mut config.init_s2, self.init_s2, "init_s2"),
            (&mut config.init_alpha, self.init_alpha, "init_alpha"),
            (&mut config.add_threshold, self.add_threshold, "add_threshold"),
            (&mut config.trust_threshold, self.trust_threshold, "trust_threshold"),
            (&mut config.meta_rate, self.meta_rate, "meta_rate"),
        ];
        for (slot, value, name) in scalars {
            if let Some(v) = value {
                Validator::validate_scalar(v, name)?;
                *slot = v;
            }
        }

        // Validate forgetting factors
        if let Some(v) = self.init_lambda {
            Validator::validate_lambda(v, "init_lambda")?;
            config.init_lambda = v;
        }
        if let Some(v) = self.final_lambda {
            Validator::validate_lambda(v, "final_lambda")?;
            config.final_lambda = v;
        }

        if let Some(v) = self.update_d {
            config.update_d = v;
        }
        if let Some(v) = self.diag_only {
            config.diag_only = v;
        }
        if let Some(v) = self.use_meta {
            config.use_meta = v;
        }
        if let Some(k) = self.kernel {
            config.kernel = k;
        }

        // Validate initial distance metric
        if let Some(init_d) = &self.init_d {
            config.init_factor = match init_d {
                InitD::Spherical(delta) => Validator::validate_init_d_spherical(*delta, self.n_in)?,
                InitD::Diagonal(diag) => Validator::validate_init_d_diagonal(diag, self.n_in)?,
                InitD::Full(d) => Validator::validate_init_d_full(d, self.n_in)?,
            };
        }

        // Validate normalization
        let norm_in = match self.norm_in {
            Some(v) => {
                Validator::validate_norm(&v, self.n_in, true)?;
                v
            }
            None => vec![T::one(); self.n_in],
        };
        let norm_out = match self.norm_out {
            Some(v) => {
                Validator::validate_norm(&v, self.n_out, false)?;
                v
            }
            None => vec![T::one(); self.n_out],
        };

        LwprModel::with_config(
            self.n_out,
            config,
            norm_in,
            norm_out,
            self.parallel.unwrap_or(cfg!(feature = "parallel")),
        )
    }
}
