//! Layer 1: Primitives
//!
//! # Purpose
//!
//! Basic building blocks shared by every other layer:
//! - The `LwprError` type
//! - Packed lower-triangular storage for distance-metric factors
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
//! Layer 3: Algorithms
//!   ↓
//! Layer 2: Math
//!   ↓
//! Layer 1: Primitives ← You are here
//! ```

/// Error type for all fallible operations.
pub mod errors;

/// Packed lower-triangular matrices.
pub mod triangular;
