//! # LWPR — Locally Weighted Projection Regression for Rust
//!
//! An incremental, online, non-linear regression library. Samples arrive one
//! at a time; the model refines itself after each one and can predict (with
//! a confidence estimate and a Jacobian) at any moment, without retraining.
//!
//! ## What is LWPR?
//!
//! LWPR covers the input space with overlapping *receptive fields*. Each
//! field is a local linear model, valid inside a soft ellipsoidal region
//! given by a Gaussian (or BiSquare) kernel over a Mahalanobis distance. A
//! prediction is the activation-weighted average of the local predictions.
//!
//! **Key properties:**
//! - Learns online in constant time per sample (given a fixed field count)
//! - Adds receptive fields where coverage is missing and prunes redundant ones
//! - Fits each local model with incremental partial least squares, so it
//!   copes with high-dimensional, redundant inputs
//! - Shapes each field's region by gradient descent on a leave-one-out cost
//!
//! **How a training step works:**
//!
//! 1. Compute every field's activation for the input
//! 2. Update the local regression (and distance metric) of each active field
//! 3. Create a new field if no field is active enough (`w_gen`)
//! 4. Prune fields that overlap too strongly (`w_prune`)
//!
//! ## Quick Start
//!
//! ```rust
//! use lwpr_rs::prelude::*;
//!
//! // One input, one output
//! let mut model = Lwpr::new(1, 1)
//!     .init_d_spherical(50.0)
//!     .w_gen(0.2)
//!     .build()?;
//!
//! // Learn y = 2x online
//! for i in 0..500 {
//!     let x = (i % 50) as f64 / 50.0;
//!     model.update(&[x], &[2.0 * x])?;
//! }
//!
//! let y = model.predict(&[0.5], 0.0)?;
//! assert!((y[0] - 1.0).abs() < 0.15);
//! # Result::<(), LwprError>::Ok(())
//! ```
//!
//! ### Confidence and Jacobian
//!
//! ```rust
//! use lwpr_rs::prelude::*;
//!
//! let mut model = Lwpr::new(2, 1).build()?;
//! for i in 0..200 {
//!     let t = i as f64 / 200.0;
//!     model.update(&[t, 1.0 - t], &[t])?;
//! }
//!
//! let p = model.predict_with_confidence(&[0.5, 0.5], 0.001)?;
//! println!("y = {} ± {}", p.y[0], p.confidence[0]);
//!
//! // Rows are outputs, columns are inputs
//! let jac = model.predict_jacobian(&[0.5, 0.5], 0.001)?;
//! assert_eq!(jac.len(), 1);
//! assert_eq!(jac[0].len(), 2);
//! # Result::<(), LwprError>::Ok(())
//! ```
//!
//! ### Result and Error Handling
//!
//! Every fallible operation returns `Result<_, LwprError>`. Arguments are
//! validated before any state changes, so an error leaves the model exactly
//! as it was:
//!
//! ```rust
//! use lwpr_rs::prelude::*;
//!
//! let mut model = LwprModel::<f64>::new(2, 1)?;
//! match model.update(&[1.0], &[0.0]) {
//!     Err(LwprError::BadInputDim { expected, got }) => {
//!         assert_eq!((expected, got), (2, 1));
//!     }
//!     other => panic!("unexpected: {:?}", other),
//! }
//! assert_eq!(model.n_data(), 0);
//! # Result::<(), LwprError>::Ok(())
//! ```
//!
//! ## Minimal Usage (no_std)
//!
//! The crate supports `no_std` environments with `alloc`. Disable default
//! features to remove the standard library dependency:
//!
//! ```toml
//! [dependencies]
//! lwpr-rs = { version = "0.1", default-features = false }
//! ```
//!
//! ## Parameters
//!
//! | Parameter           | Default     | Description                                           |
//! |---------------------|-------------|-------------------------------------------------------|
//! | **w_gen**           | 0.1         | Create a field when no activation reaches this value  |
//! | **w_prune**         | 1.0         | Prune when several activations exceed this value      |
//! | **init_d**          | `25 · I`    | Initial distance metric of new fields                 |
//! | **penalty**         | 1e-6        | Smoothness penalty on the distance metric             |
//! | **init_alpha**      | 50          | Initial metric learning rate                          |
//! | **update_d**        | true        | Adapt distance metrics                                |
//! | **diag_only**       | true        | Adapt only the metric diagonal                        |
//! | **use_meta**        | false       | Meta-learn the metric learning rates                  |
//! | **meta_rate**       | 250         | Meta learning rate                                    |
//! | **init_lambda**     | 0.999       | Initial forgetting factor                             |
//! | **final_lambda**    | 0.99999     | Final forgetting factor                               |
//! | **tau_lambda**      | 1e4         | Annealing time constant, in samples                   |
//! | **init_s2**         | 1e-10       | Initial projection variance of PLS directions         |
//! | **add_threshold**   | 0.5         | MSE ratio below which a PLS direction is added        |
//! | **trust_threshold** | `2 · n_in`  | Accumulated weight before a field is trustworthy      |
//! | **kernel**          | `Gaussian`  | `Gaussian` or `BiSquare`                              |
//! | **norm_in**         | 1           | Per-input normalization                               |
//! | **norm_out**        | 1           | Per-output normalization                              |
//!
//! ## Features
//!
//! - `std` (default): standard library support.
//! - `serde`: JSON persistence (`to_json`, `from_json`, `save_json`, `load_json`).
//! - `parallel`: train the per-output sub-models on the rayon pool.
//! - `dev`: exposes `internals` for testing.
//!
//! ## Logging
//!
//! The crate emits [`tracing`](https://docs.rs/tracing) events: `debug` when
//! receptive fields or PLS directions are added and when fields are pruned,
//! `trace` for every sample and for metric learning-rate reductions. No
//! subscriber is installed by the library.
//!
//! ## References
//!
//! - Vijayakumar, S., D'Souza, A. & Schaal, S. (2005). "Incremental Online Learning in High Dimensions"
//! - Klanke, S., Vijayakumar, S. & Schaal, S. (2008). "A Library for Locally Weighted Projection Regression"

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(missing_docs)]

#[cfg(not(feature = "std"))]
#[macro_use]
extern crate alloc;

// ============================================================================
// Internal Modules
// ============================================================================

// Layer 1: Primitives - data structures and basic utilities.
//
// Contains the error type and packed lower-triangular matrices.
mod primitives;

// Layer 2: Math - pure mathematical functions.
//
// Contains the activation kernels and the linear algebra helpers
// (including the nalgebra Cholesky bridge).
mod math;

// Layer 3: Algorithms - core LWPR algorithms.
//
// Contains incremental PLS, receptive fields, and distance-metric adaptation.
mod algorithms;

// Layer 4: Evaluation - read-only views.
//
// Contains receptive-field inspection.
mod evaluation;

// Layer 5: Engine - orchestration.
//
// Contains hyperparameters, validation, the per-output field populations,
// and the prediction and Jacobian engines.
mod engine;

// Layer 6: Adapters - the model.
//
// Contains the online LWPR model and its JSON persistence.
mod adapters;

// High-level fluent API for LWPR.
//
// Provides the `Lwpr` builder for configuring models.
mod api;

// ============================================================================
// Prelude
// ============================================================================

/// Standard LWPR prelude.
///
/// This module is intended to be wildcard-imported for convenient access
/// to the most commonly used types:
///
/// ```
/// use lwpr_rs::prelude::*;
/// ```
pub mod prelude {
    pub use crate::api::{
        InitD,
        Kernel::{self, BiSquare, Gaussian},
        LwprBuilder as Lwpr, LwprConfig, LwprError, LwprModel, LwprPrediction, ReceptiveFieldView,
    };
}

// ============================================================================
// Testing re-exports
// ============================================================================

/// Internal modules for development and testing.
///
/// This module re-exports internal modules for development and testing purposes.
/// It is only available with the `dev` feature enabled.
///
/// **Warning**: These are internal implementation details and may change without notice.
/// Do not use in production code.
#[cfg(feature = "dev")]
pub mod internals {
    /// Internal primitive types and utilities.
    pub mod primitives {
        pub use crate::primitives::*;
    }
    /// Internal math functions.
    pub mod math {
        pub use crate::math::*;
    }
    /// Internal core algorithms.
    pub mod algorithms {
        pub use crate::algorithms::*;
    }
    /// Internal evaluation views.
    pub mod evaluation {
        pub use crate::evaluation::*;
    }
    /// Internal execution engine.
    pub mod engine {
        pub use crate::engine::*;
    }
    /// Internal adapters.
    pub mod adapters {
        pub use crate::adapters::*;
    }
    /// Internal API.
    pub mod api {
        pub use crate::api::*;
    }
}
