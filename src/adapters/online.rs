//! Online adapter: the LWPR model.
//!
//! ## Purpose
//!
//! This module provides [`LwprModel`], the incremental learner collaborators
//! talk to. It owns one sub-model per output dimension, normalizes inputs and
//! outputs on the way in and out, and exposes training, prediction, Jacobian,
//! hyperparameter access and receptive-field inspection.
//!
//! ## Design notes
//!
//! * **Validate, then mutate**: Every fallible call validates all of its
//!   arguments and reserves any storage it may need before touching state.
//! * **Independent outputs**: Sub-models never interact. With the `parallel`
//!   feature they are trained on the rayon pool.
//! * **Ownership**: `update` takes `&mut self`, queries take `&self`; a
//!   [`ReceptiveFieldView`] borrows the model and cannot outlive the next
//!   update.
//! * **Duplicate**: `Clone` is a deep copy; clones share nothing.
//!
//! ## Key concepts
//!
//! * **Normalization**: Fields live in the space `x / norm_in`,
//!   `y / norm_out`. Predictions and Jacobians are mapped back.
//!
//! ## Invariants
//!
//! * `n_in >= 1`, `n_out >= 1`, exactly `n_out` sub-models.
//! * `norm_in.len() == n_in`, `norm_out.len() == n_out`.
//!
//! ## Non-goals
//!
//! * Batch fitting; samples are seen once, in order.

// Feature-gated imports
#[cfg(not(feature = "std"))]
use alloc::{vec, vec::Vec};
#[cfg(feature = "std")]
use std::vec::Vec;

// External dependencies
#[cfg(feature = "parallel")]
use rayon::prelude::*;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// Internal dependencies
use crate::algorithms::receptive_field::FieldParams;
use crate::engine::config::LwprConfig;
use crate::engine::prediction::{JacobianEngine, PredictionEngine};
use crate::engine::sub_model::SubModel;
use crate::engine::validator::Validator;
use crate::evaluation::inspect::ReceptiveFieldView;
use crate::math::kernel::Kernel;
use crate::math::linalg::FloatLinalg;
use crate::primitives::errors::LwprError;

// ============================================================================
// Prediction output
// ============================================================================

/// Prediction with per-output confidence and support.
#[derive(Debug, Clone, PartialEq)]
pub struct LwprPrediction<T> {
    /// Predicted output (nOut).
    pub y: Vec<T>,

    /// One standard deviation per output; infinite where no field contributes.
    pub confidence: Vec<T>,

    /// Largest receptive-field activation per output.
    pub max_activation: Vec<T>,
}

// ============================================================================
// LwprModel
// ============================================================================

/// Incremental locally weighted projection regression model.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LwprModel<T> {
    /// Input dimensionality.
    pub(crate) n_in: usize,

    /// Output dimensionality.
    pub(crate) n_out: usize,

    /// Hyperparameters.
    pub(crate) config: LwprConfig<T>,

    /// Per-input normalization.
    pub(crate) norm_in: Vec<T>,

    /// Per-output normalization.
    pub(crate) norm_out: Vec<T>,

    /// Running mean of the normalized inputs.
    pub(crate) mean_x: Vec<T>,

    /// Running variance of the normalized inputs.
    pub(crate) var_x: Vec<T>,

    /// Number of training samples.
    pub(crate) n_data: usize,

    /// One sub-model per output.
    pub(crate) sub_models: Vec<SubModel<T>>,

    /// Train sub-models concurrently (effective with the `parallel` feature).
    #[cfg_attr(feature = "serde", serde(default))]
    pub(crate) parallel: bool,
}

impl<T: FloatLinalg> LwprModel<T> {
    /// Model with default hyperparameters.
    pub fn new(n_in: usize, n_out: usize) -> Result<Self, LwprError> {
        Validator::validate_dims(n_in, n_out)?;

        let mut sub_models = Vec::new();
        sub_models
            .try_reserve_exact(n_out)
            .map_err(|_| LwprError::OutOfMemory)?;
        sub_models.extend((0..n_out).map(|_| SubModel::new()));

        tracing::debug!(n_in, n_out, "created LWPR model");
        Ok(Self {
            n_in,
            n_out,
            config: LwprConfig::new(n_in),
            norm_in: vec![T::one(); n_in],
            norm_out: vec![T::one(); n_out],
            mean_x: vec![T::zero(); n_in],
            var_x: vec![T::zero(); n_in],
            n_data: 0,
            sub_models,
            parallel: cfg!(feature = "parallel"),
        })
    }

    /// Model with the given hyperparameters.
    pub(crate) fn with_config(
        n_out: usize,
        config: LwprConfig<T>,
        norm_in: Vec<T>,
        norm_out: Vec<T>,
        parallel: bool,
    ) -> Result<Self, LwprError> {
        let mut model = Self::new(config.n_in(), n_out)?;
        model.config = config;
        model.norm_in = norm_in;
        model.norm_out = norm_out;
        model.parallel = parallel;
        Ok(model)
    }

    // ========================================================================
    // Training
    // ========================================================================

    /// Train on one sample and return the model's prediction for `x` made
    /// before the sample was incorporated.
    pub fn update(&mut self, x: &[T], y: &[T]) -> Result<Vec<T>, LwprError> {
        Validator::validate_input(x, self.n_in)?;
        Validator::validate_output(y, self.n_out)?;

        let xn = self.normalize_input(x);
        let yn: Vec<T> = y.iter().zip(&self.norm_out).map(|(&v, &s)| v / s).collect();
        let params = self.config.field_params();

        for sm in &mut self.sub_models {
            sm.reserve()?;
        }
        let predictions = self.update_sub_models(&xn, &yn, &params)?;
        self.track_input(&xn);

        tracing::trace!(n_data = self.n_data, "processed training sample");
        Ok(predictions
            .iter()
            .zip(&self.norm_out)
            .map(|(&p, &s)| p * s)
            .collect())
    }

    fn update_sub_models(
        &mut self,
        xn: &[T],
        yn: &[T],
        params: &FieldParams<T>,
    ) -> Result<Vec<T>, LwprError> {
        let config = &self.config;

        #[cfg(feature = "parallel")]
        if self.parallel && self.n_out > 1 {
            return self
                .sub_models
                .par_iter_mut()
                .zip(yn.par_iter())
                .map(|(sm, &y)| sm.update(xn, y, config, params))
                .collect();
        }

        self.sub_models
            .iter_mut()
            .zip(yn)
            .map(|(sm, &y)| sm.update(xn, y, config, params))
            .collect()
    }

    /// Update the running input statistics (Welford).
    fn track_input(&mut self, xn: &[T]) {
        self.n_data += 1;
        let n = T::from(self.n_data).unwrap();
        for ((mean, var), &v) in self.mean_x.iter_mut().zip(&mut self.var_x).zip(xn) {
            let delta = v - *mean;
            *mean = *mean + delta / n;
            *var = *var + (delta * (v - *mean) - *var) / n;
        }
    }

    #[inline]
    fn normalize_input(&self, x: &[T]) -> Vec<T> {
        x.iter().zip(&self.norm_in).map(|(&v, &s)| v / s).collect()
    }

    // ========================================================================
    // Prediction
    // ========================================================================

    /// Prediction from the fields with activation `>= cutoff`.
    pub fn predict(&self, x: &[T], cutoff: T) -> Result<Vec<T>, LwprError> {
        Validator::validate_input(x, self.n_in)?;
        let xn = self.normalize_input(x);
        Ok(self
            .sub_models
            .iter()
            .zip(&self.norm_out)
            .map(|(sm, &s)| PredictionEngine::predict_value(sm.fields(), &xn, self.config.kernel, cutoff) * s)
            .collect())
    }

    /// Prediction with confidence and maximum activation per output.
    pub fn predict_with_confidence(&self, x: &[T], cutoff: T) -> Result<LwprPrediction<T>, LwprError> {
        Validator::validate_input(x, self.n_in)?;
        let xn = self.normalize_input(x);

        let mut out = LwprPrediction {
            y: Vec::with_capacity(self.n_out),
            confidence: Vec::with_capacity(self.n_out),
            max_activation: Vec::with_capacity(self.n_out),
        };
        for (sm, &s) in self.sub_models.iter().zip(&self.norm_out) {
            let p = PredictionEngine::predict(sm.fields(), &xn, self.config.kernel, cutoff);
            out.y.push(p.value * s);
            out.confidence.push(p.confidence * s);
            out.max_activation.push(p.max_activation);
        }
        Ok(out)
    }

    /// Jacobian `∂y/∂x`: `n_out` rows of `n_in` entries.
    pub fn predict_jacobian(&self, x: &[T], cutoff: T) -> Result<Vec<Vec<T>>, LwprError> {
        Validator::validate_input(x, self.n_in)?;
        let xn = self.normalize_input(x);
        Ok(self
            .sub_models
            .iter()
            .zip(&self.norm_out)
            .map(|(sm, &so)| {
                let (_, grad) = JacobianEngine::gradient(sm.fields(), &xn, self.config.kernel, cutoff);
                grad.iter()
                    .zip(&self.norm_in)
                    .map(|(&g, &si)| g * so / si)
                    .collect()
            })
            .collect())
    }

    // ========================================================================
    // Initial distance metric
    // ========================================================================

    /// Initial metric `delta * I` for new fields.
    pub fn set_init_d_spherical(&mut self, delta: T) -> Result<(), LwprError> {
        self.config.init_factor = Validator::validate_init_d_spherical(delta, self.n_in)?;
        Ok(())
    }

    /// Initial metric `diag(diag)` for new fields.
    pub fn set_init_d_diagonal(&mut self, diag: &[T]) -> Result<(), LwprError> {
        self.config.init_factor = Validator::validate_init_d_diagonal(diag, self.n_in)?;
        Ok(())
    }

    /// Full initial metric (row-major, `n_in x n_in`) for new fields.
    pub fn set_init_d(&mut self, d: &[T]) -> Result<(), LwprError> {
        self.config.init_factor = Validator::validate_init_d_full(d, self.n_in)?;
        Ok(())
    }

    /// Initial metric, dense row-major.
    pub fn init_d(&self) -> Vec<T> {
        self.config.init_metric()
    }

    // ========================================================================
    // Hyperparameters
    // ========================================================================

    /// All hyperparameters.
    pub fn config(&self) -> &LwprConfig<T> {
        &self.config
    }

    /// Activation threshold for creating fields.
    pub fn w_gen(&self) -> T {
        self.config.w_gen
    }

    /// Set the activation threshold for creating fields.
    pub fn set_w_gen(&mut self, value: T) {
        self.config.w_gen = value;
    }

    /// Activation threshold for pruning fields.
    pub fn w_prune(&self) -> T {
        self.config.w_prune
    }

    /// Set the activation threshold for pruning fields.
    pub fn set_w_prune(&mut self, value: T) {
        self.config.w_prune = value;
    }

    /// Smoothness penalty.
    pub fn penalty(&self) -> T {
        self.config.penalty
    }

    /// Set the smoothness penalty.
    pub fn set_penalty(&mut self, value: T) {
        self.config.penalty = value;
    }

    /// Initial forgetting factor.
    pub fn init_lambda(&self) -> T {
        self.config.init_lambda
    }

    /// Set the initial forgetting factor.
    pub fn set_init_lambda(&mut self, value: T) {
        self.config.init_lambda = value;
    }

    /// Annealing time constant.
    pub fn tau_lambda(&self) -> T {
        self.config.tau_lambda
    }

    /// Set the annealing time constant.
    pub fn set_tau_lambda(&mut self, value: T) {
        self.config.tau_lambda = value;
    }

    /// Final forgetting factor.
    pub fn final_lambda(&self) -> T {
        self.config.final_lambda
    }

    /// Set the final forgetting factor.
    pub fn set_final_lambda(&mut self, value: T) {
        self.config.final_lambda = value;
    }

    /// Initial projection variance.
    pub fn init_s2(&self) -> T {
        self.config.init_s2
    }

    /// Set the initial projection variance.
    pub fn set_init_s2(&mut self, value: T) {
        self.config.init_s2 = value;
    }

    /// Initial metric learning rate.
    pub fn init_alpha(&self) -> T {
        self.config.init_alpha
    }

    /// Set the initial metric learning rate.
    pub fn set_init_alpha(&mut self, value: T) {
        self.config.init_alpha = value;
    }

    /// Ratio for adding PLS directions.
    pub fn add_threshold(&self) -> T {
        self.config.add_threshold
    }

    /// Set the ratio for adding PLS directions.
    pub fn set_add_threshold(&mut self, value: T) {
        self.config.add_threshold = value;
    }

    /// Accumulated weight after which fields are trustworthy.
    pub fn trust_threshold(&self) -> T {
        self.config.trust_threshold
    }

    /// Set the accumulated weight after which fields are trustworthy.
    pub fn set_trust_threshold(&mut self, value: T) {
        self.config.trust_threshold = value;
    }

    /// Whether distance metrics adapt.
    pub fn update_d(&self) -> bool {
        self.config.update_d
    }

    /// Enable or disable distance-metric adaptation.
    pub fn set_update_d(&mut self, value: bool) {
        self.config.update_d = value;
    }

    /// Whether only the metric diagonal adapts.
    pub fn diag_only(&self) -> bool {
        self.config.diag_only
    }

    /// Restrict metric adaptation to the diagonal.
    pub fn set_diag_only(&mut self, value: bool) {
        self.config.diag_only = value;
    }

    /// Whether meta learning is enabled.
    pub fn use_meta(&self) -> bool {
        self.config.use_meta
    }

    /// Enable or disable meta learning.
    pub fn set_use_meta(&mut self, value: bool) {
        self.config.use_meta = value;
    }

    /// Meta learning rate.
    pub fn meta_rate(&self) -> T {
        self.config.meta_rate
    }

    /// Set the meta learning rate.
    pub fn set_meta_rate(&mut self, value: T) {
        self.config.meta_rate = value;
    }

    /// Activation kernel.
    pub fn kernel(&self) -> Kernel {
        self.config.kernel
    }

    /// Set the activation kernel.
    pub fn set_kernel(&mut self, kernel: Kernel) {
        self.config.kernel = kernel;
    }

    /// Set the activation kernel by name (`"Gaussian"` or `"BiSquare"`).
    pub fn set_kernel_name(&mut self, name: &str) -> Result<(), LwprError> {
        self.config.kernel = name.parse()?;
        Ok(())
    }

    /// Input normalization.
    pub fn norm_in(&self) -> &[T] {
        &self.norm_in
    }

    /// Set the input normalization.
    pub fn set_norm_in(&mut self, norm: &[T]) -> Result<(), LwprError> {
        Validator::validate_norm(norm, self.n_in, true)?;
        self.norm_in.copy_from_slice(norm);
        Ok(())
    }

    /// Set the same normalization for every input.
    pub fn set_norm_in_scalar(&mut self, norm: T) -> Result<(), LwprError> {
        Validator::validate_norm(&[norm], 1, true)?;
        self.norm_in.iter_mut().for_each(|v| *v = norm);
        Ok(())
    }

    /// Output normalization.
    pub fn norm_out(&self) -> &[T] {
        &self.norm_out
    }

    /// Set the output normalization.
    pub fn set_norm_out(&mut self, norm: &[T]) -> Result<(), LwprError> {
        Validator::validate_norm(norm, self.n_out, false)?;
        self.norm_out.copy_from_slice(norm);
        Ok(())
    }

    /// Whether sub-models are trained concurrently.
    pub fn parallel(&self) -> bool {
        self.parallel
    }

    /// Train sub-models concurrently when the `parallel` feature is enabled.
    pub fn set_parallel(&mut self, parallel: bool) {
        self.parallel = parallel;
    }

    // ========================================================================
    // Read-only state
    // ========================================================================

    /// Input dimensionality.
    pub fn n_in(&self) -> usize {
        self.n_in
    }

    /// Output dimensionality.
    pub fn n_out(&self) -> usize {
        self.n_out
    }

    /// Number of training samples seen.
    pub fn n_data(&self) -> usize {
        self.n_data
    }

    /// Mean of the normalized training inputs.
    pub fn mean_x(&self) -> &[T] {
        &self.mean_x
    }

    /// Variance of the normalized training inputs.
    pub fn var_x(&self) -> &[T] {
        &self.var_x
    }

    /// Sub-model of one output dimension.
    pub fn sub_model(&self, out: usize) -> Result<&SubModel<T>, LwprError> {
        Validator::validate_index("output", out, self.n_out)?;
        Ok(&self.sub_models[out])
    }

    /// Number of receptive fields of one output dimension.
    pub fn num_rfs(&self, out: usize) -> Result<usize, LwprError> {
        Ok(self.sub_model(out)?.num_rfs())
    }

    /// Read-only view of one receptive field.
    pub fn receptive_field(&self, out: usize, index: usize) -> Result<ReceptiveFieldView<'_, T>, LwprError> {
        let sm = self.sub_model(out)?;
        Validator::validate_index("receptive field", index, sm.num_rfs())?;
        Ok(ReceptiveFieldView::new(&sm.fields()[index]))
    }
}
