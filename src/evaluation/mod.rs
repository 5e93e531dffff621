//! Layer 4: Evaluation
//!
//! # Purpose
//!
//! This layer provides read-only views over trained state:
//! - Inspection of a single receptive field and its derived quantities
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
//! Layer 4: Evaluation ← You are here
//!   ↓
//! Layer 3: Algorithms
//!   ↓
//! Layer 2: Math
//!   ↓
//! Layer 1: Primitives
//! ```

/// Receptive-field inspection.
pub mod inspect;
