//! Layer 5: Engine
//!
//! # Purpose
//!
//! This layer orchestrates receptive fields into working models:
//! - Hyperparameters and their defaults
//! - Validation of everything that crosses the public boundary
//! - The per-output population of fields and its add/prune lifecycle
//! - Blended prediction, confidence and Jacobian
//!
//! # Architecture
//!
//! ```text
//! Layer 7: API
//!   ↓
//! Layer 6: Adapters
//!   ↓
//! Layer 5: Engine ← You are here
//!   ↓
//! Layer 4: Evaluation
//!   ↓
//! Layer 3: Algorithms
//!   ↓
//! Layer 2: Math
//!   ↓
//! Layer 1: Primitives
//! ```

/// Hyperparameters.
pub mod config;

/// Input validation.
pub mod validator;

/// Receptive-field populations.
pub mod sub_model;

/// Prediction and Jacobian engines.
pub mod prediction;
