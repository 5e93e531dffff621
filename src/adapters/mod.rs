//! Layer 6: Adapters
//!
//! # Purpose
//!
//! This layer provides the model collaborators work with:
//! - The online LWPR model (training, prediction, Jacobian, inspection)
//! - JSON persistence of its full state (feature `serde`)
//!
//! # Architecture
//!
//! ```text
//! Layer 7: API
//!   ↓
//! Layer 6: Adapters ← You are here
//!   ↓
//! Layer 5: Engine
//!   ↓
//! Layer 4: Evaluation
//!   ↓
//! Layer 3: Algorithms
//!   ↓
//! Layer 2: Math
//!   ↓
//! Layer 1: Primitives
//! ```

/// Online LWPR model.
pub mod online;

/// JSON persistence.
#[cfg(feature = "serde")]
pub mod persistence;
