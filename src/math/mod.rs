//! Layer 2: Math
//!
//! # Purpose
//!
//! This layer provides pure mathematical functions used throughout LWPR:
//! - Kernel functions mapping metric distance to activation
//! - Vector kernels and the nalgebra bridge for Cholesky factorisation
//!
//! These are reusable mathematical building blocks with no algorithm-specific logic.
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
//! Layer 2: Math ← You are here
//!   ↓
//! Layer 1: Primitives
//! ```

/// Kernel (activation) functions.
pub mod kernel;

/// Linear algebra helpers.
pub mod linalg;
