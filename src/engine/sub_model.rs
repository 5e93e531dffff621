//! Receptive-field population of one output dimension.
//!
//! ## Purpose
//!
//! A sub-model owns every receptive field that predicts one output dimension
//! and runs their lifecycle: it trains the fields a sample activates, creates
//! a new field where coverage is missing, and prunes fields that cover the
//! same region.
//!
//! ## Design notes
//!
//! * **Arena**: Fields live in a `Vec` in insertion order. Pruning uses
//!   `swap_remove`, so indices are only stable between mutating calls.
//! * **Reserve first**: Space for a potential new field is reserved before any
//!   field is touched; an allocation failure leaves the sub-model unchanged.
//! * **Decide, then prune**: Creation and pruning both use the activations
//!   computed before training, and a field created by a sample is never a
//!   pruning candidate for that same sample.
//!
//! ## Key concepts
//!
//! * **Gating** (`w_gen`): no field responds strongly enough, so one is added.
//! * **Pruning** (`w_prune`): several fields respond very strongly, so all but
//!   the strongest are removed.
//!
//! ## Invariants
//!
//! * Every field has the input dimensionality of the owning model.

// Feature-gated imports
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;
#[cfg(feature = "std")]
use std::vec::Vec;

// External dependencies
use core::cmp::Ordering;
use num_traits::Float;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// Internal dependencies
use crate::algorithms::receptive_field::{FieldParams, ReceptiveField};
use crate::engine::config::{LwprConfig, TRAINING_FLOOR};
use crate::primitives::errors::LwprError;

// ============================================================================
// SubModel
// ============================================================================

/// Receptive fields predicting one output dimension.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SubModel<T> {
    /// Fields in insertion order (modulo swap-removals).
    fields: Vec<ReceptiveField<T>>,

    /// Number of fields created over the sub-model's lifetime.
    n_added: usize,

    /// Number of fields pruned over the sub-model's lifetime.
    n_pruned: usize,
}

impl<T> Default for SubModel<T> {
    fn default() -> Self {
        Self {
            fields: Vec::new(),
            n_added: 0,
            n_pruned: 0,
        }
    }
}

impl<T: Float> SubModel<T> {
    /// Empty sub-model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of receptive fields.
    #[inline]
    pub fn num_rfs(&self) -> usize {
        self.fields.len()
    }

    /// All receptive fields.
    #[inline]
    pub fn fields(&self) -> &[ReceptiveField<T>] {
        &self.fields
    }

    /// One receptive field.
    #[inline]
    pub fn field(&self, index: usize) -> Option<&ReceptiveField<T>> {
        self.fields.get(index)
    }

    /// Fields created so far.
    #[inline]
    pub fn n_added(&self) -> usize {
        self.n_added
    }

    /// Fields pruned so far.
    #[inline]
    pub fn n_pruned(&self) -> usize {
        self.n_pruned
    }

    // ========================================================================
    // Training
    // ========================================================================

    /// Reserve room for one more field.
    pub fn reserve(&mut self) -> Result<(), LwprError> {
        self.fields.try_reserve(1).map_err(|_| LwprError::OutOfMemory)
    }

    /// Train on one normalized sample and return the blended pre-update
    /// prediction of the fields that were trained.
    pub fn update(
        &mut self,
        x: &[T],
        y: T,
        config: &LwprConfig<T>,
        params: &FieldParams<T>,
    ) -> Result<T, LwprError> {
        self.reserve()?;
        let mut activations = Vec::new();
        activations
            .try_reserve_exact(self.fields.len())
            .map_err(|_| LwprError::OutOfMemory)?;
        activations.extend(self.fields.iter().map(|rf| rf.activation(x, params.kernel).0));

        let floor = T::from(TRAINING_FLOOR).unwrap();
        let mut sum_w = T::zero();
        let mut sum_wy = T::zero();
        let mut max_w = T::zero();
        for (rf, &w) in self.fields.iter_mut().zip(&activations) {
            max_w = max_w.max(w);
            if w > floor {
                let local = rf.train(x, y, w, params);
                sum_w = sum_w + w;
                sum_wy = sum_wy + w * local.prediction;
            }
        }

        if self.fields.is_empty() || max_w < config.w_gen {
            self.add_field(x, y, config, params);
        }

        self.prune(&activations, config.w_prune);

        Ok(if sum_w > T::zero() {
            sum_wy / sum_w
        } else {
            T::zero()
        })
    }

    /// Create a field at `x` and let it absorb the sample.
    fn add_field(&mut self, x: &[T], y: T, config: &LwprConfig<T>, params: &FieldParams<T>) {
        let mut rf = ReceptiveField::new(x, &config.init_factor, config.init_alpha, config.init_lambda);
        rf.train(x, y, T::one(), params);
        self.fields.push(rf);
        self.n_added += 1;
        tracing::debug!(num_rfs = self.fields.len(), "created receptive field");
    }

    /// Remove all but the strongest of the fields activated above `w_prune`.
    ///
    /// `activations` covers the fields that existed before this sample.
    fn prune(&mut self, activations: &[T], w_prune: T) {
        let candidates: Vec<usize> = activations
            .iter()
            .enumerate()
            .filter(|&(_, &w)| w > w_prune)
            .map(|(i, _)| i)
            .collect();
        if candidates.len() < 2 {
            return;
        }

        let keep = candidates
            .iter()
            .copied()
            .max_by(|&a, &b| self.compare_strength(a, b))
            .unwrap_or(candidates[0]);

        for &i in candidates.iter().rev() {
            if i != keep {
                self.fields.swap_remove(i);
                self.n_pruned += 1;
            }
        }
        tracing::debug!(
            removed = candidates.len() - 1,
            num_rfs = self.fields.len(),
            "pruned overlapping receptive fields"
        );
    }

    /// Order fields by how much they deserve to survive a prune.
    fn compare_strength(&self, a: usize, b: usize) -> Ordering {
        let (ra, rb) = (&self.fields[a], &self.fields[b]);
        ra.trustworthy
            .cmp(&rb.trustworthy)
            .then_with(|| ra.sum_w.partial_cmp(&rb.sum_w).unwrap_or(Ordering::Equal))
            .then_with(|| {
                rb.metric_trace()
                    .partial_cmp(&ra.metric_trace())
                    .unwrap_or(Ordering::Equal)
            })
            .then_with(|| b.cmp(&a))
    }
}
