//! Read-only inspection of receptive fields.
//!
//! ## Purpose
//!
//! This module exposes one receptive field to callers without handing out the
//! field itself. The view borrows the model, so the borrow checker ends it
//! before the next training call can prune or reorder fields.
//!
//! ## Design notes
//!
//! * **Borrowed**: Accessors return slices into the field where the storage
//!   already has the requested shape, and owned vectors where it does not.
//! * **Derived quantities**: The slope and the variable importance are
//!   computed on demand from the PLS state.
//!
//! ## Key concepts
//!
//! * **VIP** (variable importance in projection): per-input share of the
//!   output variance the PLS directions explain, scaled so that the squares
//!   average to one.

// Feature-gated imports
#[cfg(not(feature = "std"))]
use alloc::{vec, vec::Vec};
#[cfg(feature = "std")]
use std::vec::Vec;

// External dependencies
use num_traits::Float;

// Internal dependencies
use crate::algorithms::receptive_field::ReceptiveField;

// ============================================================================
// ReceptiveFieldView
// ============================================================================

/// Read-only view of one receptive field.
#[derive(Debug, Clone, Copy)]
pub struct ReceptiveFieldView<'a, T> {
    rf: &'a ReceptiveField<T>,
}

impl<'a, T: Float> ReceptiveFieldView<'a, T> {
    /// View of `rf`.
    pub fn new(rf: &'a ReceptiveField<T>) -> Self {
        Self { rf }
    }

    /// Input dimensionality.
    pub fn n_in(&self) -> usize {
        self.rf.n_in()
    }

    /// Number of PLS directions.
    pub fn n_reg(&self) -> usize {
        self.rf.n_reg()
    }

    /// Centre (normalized input space).
    pub fn center(&self) -> &'a [T] {
        &self.rf.center
    }

    /// Distance metric `D`, dense row-major.
    pub fn d(&self) -> &'a [T] {
        &self.rf.metric
    }

    /// Upper-triangular factor `M` with `D = Mᵀ M`, dense row-major.
    pub fn m(&self) -> Vec<T> {
        let n = self.n_in();
        let mut out = vec![T::zero(); n * n];
        for i in 0..n {
            for j in 0..=i {
                out[j * n + i] = self.rf.factor.get(i, j);
            }
        }
        out
    }

    /// Per-element learning rates of the metric factor, dense row-major
    /// in the same layout as [`m`](Self::m).
    pub fn alpha(&self) -> Vec<T> {
        let n = self.n_in();
        let mut out = vec![T::zero(); n * n];
        for i in 0..n {
            for j in 0..=i {
                out[j * n + i] = self.rf.alpha.get(i, j);
            }
        }
        out
    }

    /// Projection directions `U`, one slice per direction.
    pub fn u(&self) -> Vec<&'a [T]> {
        self.rf.directions.iter().map(|d| d.u.as_slice()).collect()
    }

    /// Deflation directions `P`, one slice per direction.
    pub fn p(&self) -> Vec<&'a [T]> {
        self.rf.directions.iter().map(|d| d.p.as_slice()).collect()
    }

    /// Regression coefficients.
    pub fn beta(&self) -> Vec<T> {
        self.rf.directions.iter().map(|d| d.beta).collect()
    }

    /// Intercept.
    pub fn beta0(&self) -> T {
        self.rf.beta0
    }

    /// Forgetting-weighted sample count per direction.
    pub fn n_data(&self) -> Vec<T> {
        self.rf.directions.iter().map(|d| d.n_data).collect()
    }

    /// Accumulated projection variance per direction.
    pub fn ss_s2(&self) -> Vec<T> {
        self.rf.directions.iter().map(|d| d.ss_s2).collect()
    }

    /// Forgetting factor per direction.
    pub fn lambda(&self) -> Vec<T> {
        self.rf.directions.iter().map(|d| d.lambda).collect()
    }

    /// Weighted mean of the inputs the field was trained on.
    pub fn mean_x(&self) -> &'a [T] {
        &self.rf.mean_x
    }

    /// Weighted variance of the inputs the field was trained on.
    pub fn var_x(&self) -> &'a [T] {
        &self.rf.var_x
    }

    /// Accumulated kernel weight.
    pub fn sum_w(&self) -> T {
        self.rf.sum_w
    }

    /// Whether the field has seen enough data.
    pub fn trustworthy(&self) -> bool {
        self.rf.trustworthy
    }

    /// Slope of the local linear model (normalized space).
    pub fn slope(&self) -> Vec<T> {
        self.rf.slope()
    }

    /// Variable importance in projection, one entry per input.
    ///
    /// All zeros until some direction explains variance.
    pub fn vip(&self) -> Vec<T> {
        let n = self.n_in();
        let explained: Vec<T> = self
            .rf
            .directions
            .iter()
            .map(|d| d.beta * d.beta * d.ss_s2)
            .collect();
        let total = explained.iter().fold(T::zero(), |acc, &v| acc + v);
        if !(total > T::zero()) {
            return vec![T::zero(); n];
        }
        let scale = T::from(n).unwrap() / total;
        (0..n)
            .map(|j| {
                let acc = self
                    .rf
                    .directions
                    .iter()
                    .zip(&explained)
                    .fold(T::zero(), |acc, (d, &ss)| acc + ss * d.u[j] * d.u[j]);
                (scale * acc).sqrt()
            })
            .collect()
    }
}
