//! Layer 3: Algorithms
//!
//! # Purpose
//!
//! This layer holds the learning rules of a single receptive field:
//! - Incremental PLS regression along a growing stack of latent directions
//! - The receptive field itself, with its local statistics and training step
//! - Gradient adaptation of the field's distance metric
//!
//! # Architecture
//!
//! ```text
//! Layer 7: API
//!   ↓
//! Layer 6: Adapters
//!   ↓
//! Layer 5: Engine
//!   ↓
//! Layer 4: Evaluation
//!   ↓
//! Layer 3: Algorithms ← You are here
//!   ↓
//! Layer 2: Math
//!   ↓
//! Layer 1: Primitives
//! ```

/// Incremental partial least squares.
pub mod pls;

/// Receptive fields (local models).
pub mod receptive_field;

/// Distance-metric adaptation.
pub mod metric;
