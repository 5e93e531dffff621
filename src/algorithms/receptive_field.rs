//! Receptive fields: the local models of LWPR.
//!
//! ## Purpose
//!
//! A receptive field is one local linear model valid in a soft region of
//! input space. It owns a centre, a distance metric that shapes its region,
//! an incremental PLS regression, and the running statistics both of those
//! are trained from.
//!
//! ## Design notes
//!
//! * **No back-references**: A field knows nothing about its owner; the
//!   owning sub-model passes the kernel and hyperparameters in on each call.
//! * **Metric stored twice**: The dense metric `D` is kept alongside its
//!   packed factor so activations cost one quadratic form. `D` is rebuilt from
//!   the factor after every metric step and never edited directly.
//! * **Growing PLS**: A field starts with no latent directions and appends
//!   them (up to `nIn`) as the leave-one-out error justifies it.
//!
//! ## Key concepts
//!
//! * **Activation**: `w = K((x - c)ᵀ D (x - c))`.
//! * **Forgetting**: Statistics decay with a per-field (intercept) and
//!   per-direction factor `λ`, annealed from `init_lambda` to `final_lambda`.
//! * **Trustworthy**: Set once the accumulated kernel weight exceeds the
//!   configured threshold; never cleared.
//!
//! ## Invariants
//!
//! * `D == L * Lᵀ` for the stored factor `L`, so `D` is symmetric PSD.
//! * `directions.len() <= nIn`.
//!
//! ## Non-goals
//!
//! * Gating and pruning decisions (see `engine::sub_model`).

// Feature-gated imports
#[cfg(not(feature = "std"))]
use alloc::{vec, vec::Vec};
#[cfg(feature = "std")]
use std::vec::Vec;

// External dependencies
use num_traits::Float;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// Internal dependencies
use crate::algorithms::metric::{DistanceMetricAdapter, MetricParams};
use crate::algorithms::pls::{self, Direction};
use crate::math::kernel::Kernel;
use crate::math::linalg::quadratic_form;
use crate::primitives::triangular::LowerTriangular;

/// Predictive variance, in normalized output units, of a field whose
/// statistics cannot be trusted yet.
pub const PRIOR_VARIANCE: f64 = 1.0;

// ============================================================================
// Parameters
// ============================================================================

/// Hyperparameters a receptive field needs for one training step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldParams<T> {
    /// Activation kernel.
    pub kernel: Kernel,

    /// Forgetting factor of new statistics.
    pub init_lambda: T,

    /// Asymptotic forgetting factor.
    pub final_lambda: T,

    /// Per-sample annealing decay, `exp(-1 / tau_lambda)`.
    pub lambda_decay: T,

    /// Initial value of the projection variance `SSs2`.
    pub init_s2: T,

    /// MSE ratio below which another PLS direction is added.
    pub add_threshold: T,

    /// Accumulated weight after which the field becomes trustworthy.
    pub trust_threshold: T,

    /// Whether the distance metric is adapted.
    pub update_d: bool,

    /// Distance-metric adaptation settings.
    pub metric: MetricParams<T>,
}

// ============================================================================
// Local update result
// ============================================================================

/// What a local regression step reports back.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalUpdate<T> {
    /// Local prediction before the sample was incorporated.
    pub prediction: T,

    /// Leave-one-out error of the full PLS stack (or of the intercept when
    /// there are no directions yet).
    pub e_cv: T,

    /// Error of the updated model on the same sample.
    pub e: T,

    /// Projections of the sample onto the directions, before the update.
    pub projections: Vec<T>,
}

// ============================================================================
// ReceptiveField
// ============================================================================

/// One local linear model.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ReceptiveField<T> {
    /// Centre `c` (nIn).
    pub center: Vec<T>,

    /// Distance metric `D`, dense row-major (nIn x nIn).
    pub metric: Vec<T>,

    /// Packed lower-triangular factor `L` with `D = L * Lᵀ`.
    pub factor: LowerTriangular<T>,

    /// Per-element learning rates of the factor.
    pub alpha: LowerTriangular<T>,

    /// Logarithm of the learning rates (meta learning state).
    pub meta_b: LowerTriangular<T>,

    /// Meta learning memory trace.
    pub meta_h: LowerTriangular<T>,

    /// PLS latent directions (`nReg` of them).
    pub directions: Vec<Direction<T>>,

    /// Intercept: weighted mean of the outputs.
    pub beta0: T,

    /// Weighted mean of the inputs (nIn).
    pub mean_x: Vec<T>,

    /// Weighted variance of the inputs (nIn).
    pub var_x: Vec<T>,

    /// Forgetting-weighted sum of kernel weights.
    pub sum_w: T,

    /// Forgetting-weighted number of samples.
    pub n_data: T,

    /// Forgetting factor of the intercept statistics.
    pub lambda: T,

    /// Weighted sum of squared leave-one-out errors of the whole local model.
    pub sum_e_cv2: T,

    /// Weighted sum of squared errors after each update.
    pub sum_e2: T,

    /// Weighted sum of squared leave-one-out errors of the intercept alone.
    pub sum_e_cv2_base: T,

    /// Whether enough data has been seen for the statistics to be reliable.
    pub trustworthy: bool,
}

impl<T: Float> ReceptiveField<T> {
    /// New field centred at `center` with the given metric factor.
    pub fn new(center: &[T], factor: &LowerTriangular<T>, init_alpha: T, init_lambda: T) -> Self {
        let n = center.len();
        debug_assert_eq!(factor.dim(), n);
        let mut metric = vec![T::zero(); n * n];
        factor.gram_into(&mut metric);

        Self {
            center: center.to_vec(),
            metric,
            factor: factor.clone(),
            alpha: LowerTriangular::filled(n, init_alpha),
            meta_b: LowerTriangular::filled(n, init_alpha.ln()),
            meta_h: LowerTriangular::zeros(n),
            directions: Vec::new(),
            beta0: T::zero(),
            mean_x: vec![T::zero(); n],
            var_x: vec![T::zero(); n],
            sum_w: T::zero(),
            n_data: T::zero(),
            lambda: init_lambda,
            sum_e_cv2: T::zero(),
            sum_e2: T::zero(),
            sum_e_cv2_base: T::zero(),
            trustworthy: false,
        }
    }

    /// Input dimensionality.
    #[inline]
    pub fn n_in(&self) -> usize {
        self.center.len()
    }

    /// Number of PLS directions.
    #[inline]
    pub fn n_reg(&self) -> usize {
        self.directions.len()
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Squared metric distance `(x - c)ᵀ D (x - c)`.
    pub fn distance(&self, x: &[T]) -> T {
        let dx: Vec<T> = x.iter().zip(&self.center).map(|(&a, &c)| a - c).collect();
        quadratic_form(&self.metric, &dx)
    }

    /// Activation and squared metric distance for input `x`.
    #[inline]
    pub fn activation(&self, x: &[T], kernel: Kernel) -> (T, T) {
        let q = self.distance(x);
        (kernel.weight(q), q)
    }

    /// Gradient of the activation w.r.t. the input: `2 (dw/dq) D (x - c)`.
    pub fn activation_gradient(&self, x: &[T], w: T, kernel: Kernel) -> Vec<T> {
        let n = self.n_in();
        let (dwdq, _) = kernel.derivatives(w);
        let scale = T::from(2.0).unwrap() * dwdq;
        (0..n)
            .map(|i| {
                let row = &self.metric[i * n..(i + 1) * n];
                let acc = (0..n).fold(T::zero(), |acc, j| acc + row[j] * (x[j] - self.center[j]));
                scale * acc
            })
            .collect()
    }

    /// Input centred on the field's running mean.
    #[inline]
    fn centered(&self, x: &[T]) -> Vec<T> {
        x.iter().zip(&self.mean_x).map(|(&a, &m)| a - m).collect()
    }

    /// Local prediction and the projections it used.
    pub fn predict_local(&self, x: &[T]) -> (T, Vec<T>) {
        let s = pls::project(&self.directions, &self.centered(x));
        (pls::combine(&self.directions, self.beta0, &s), s)
    }

    /// Slope of the local linear model.
    pub fn slope(&self) -> Vec<T> {
        pls::slope(&self.directions, self.n_in())
    }

    /// Sum over directions of `zₖ² / SSs2ₖ` (the local leverage of `z`).
    pub fn leverage(&self, projections: &[T]) -> T {
        self.directions
            .iter()
            .zip(projections)
            .fold(T::zero(), |acc, (dir, &z)| {
                if dir.ss_s2 > T::zero() {
                    acc + z * z / dir.ss_s2
                } else {
                    acc
                }
            })
    }

    /// Weighted leave-one-out mean squared error of the local model.
    ///
    /// The accumulated weight is reduced by the number of fitted parameters
    /// (intercept plus one per direction). Untrustworthy fields, and fields
    /// with no weight left after that correction, report [`PRIOR_VARIANCE`].
    pub fn local_variance(&self) -> T {
        let prior = T::from(PRIOR_VARIANCE).unwrap();
        if !self.trustworthy {
            return prior;
        }
        let dof = self.sum_w - T::from(self.n_reg() + 1).unwrap();
        if dof > T::zero() {
            self.sum_e_cv2 / dof
        } else {
            prior
        }
    }

    /// Trace of the distance metric; larger means a narrower field.
    #[inline]
    pub fn metric_trace(&self) -> T {
        self.factor.gram_trace()
    }

    // ========================================================================
    // Training
    // ========================================================================

    /// Full training step for one sample with kernel weight `w`.
    ///
    /// Runs the local regression update, the metric update (if enabled),
    /// the direction-growth check, and advances the forgetting factors.
    pub fn train(&mut self, x: &[T], y: T, w: T, params: &FieldParams<T>) -> LocalUpdate<T> {
        let local = self.update_local(x, y, w, params);
        if params.update_d {
            self.update_metric(x, w, &local, params);
        }
        self.check_add_direction(params);
        self.anneal(params);
        local
    }

    /// Recursive update of the intercept, input statistics and PLS directions.
    pub fn update_local(&mut self, x: &[T], y: T, w: T, params: &FieldParams<T>) -> LocalUpdate<T> {
        let (prediction, _) = self.predict_local(x);

        let lambda = self.lambda;
        let decayed = lambda * self.sum_w;
        let total = decayed + w;
        if total <= T::zero() {
            return LocalUpdate {
                prediction,
                e_cv: y - prediction,
                e: y - prediction,
                projections: Vec::new(),
            };
        }

        for i in 0..self.n_in() {
            let mean = (decayed * self.mean_x[i] + w * x[i]) / total;
            let diff = x[i] - mean;
            self.mean_x[i] = mean;
            self.var_x[i] = (decayed * self.var_x[i] + w * diff * diff) / total;
        }
        self.beta0 = (decayed * self.beta0 + w * y) / total;
        self.sum_w = total;
        self.n_data = lambda * self.n_data + T::one();

        let xmz = self.centered(x);
        let n_in = self.n_in();
        let mut s = Vec::with_capacity(self.n_reg());
        let mut xres = Vec::with_capacity(self.n_reg() * n_in);
        pls::project_into(&self.directions, &xmz, &mut s, &mut xres);

        let e_cv_base = y - self.beta0;
        self.sum_e_cv2_base = lambda * self.sum_e_cv2_base + w * e_cv_base * e_cv_base;

        let mut yres = e_cv_base;
        for (k, dir) in self.directions.iter_mut().enumerate() {
            yres = dir.update(&xres[k * n_in..(k + 1) * n_in], yres, w);
        }
        let e_cv = yres;

        let (after, _) = self.predict_local(x);
        let e = y - after;
        self.sum_e_cv2 = lambda * self.sum_e_cv2 + w * e_cv * e_cv;
        self.sum_e2 = lambda * self.sum_e2 + w * e * e;

        if !self.trustworthy && self.sum_w > params.trust_threshold {
            self.trustworthy = true;
        }

        LocalUpdate {
            prediction,
            e_cv,
            e,
            projections: s,
        }
    }

    /// One distance-metric step; no-op unless `update_d` is set.
    pub fn update_metric(&mut self, x: &[T], w: T, local: &LocalUpdate<T>, params: &FieldParams<T>) {
        if !params.update_d {
            return;
        }
        DistanceMetricAdapter::step(self, x, w, local, params.kernel, &params.metric);
    }

    /// Append a PLS direction if the statistics justify it.
    ///
    /// Returns whether a direction was added.
    pub fn check_add_direction(&mut self, params: &FieldParams<T>) -> bool {
        let n_reg = self.n_reg();
        if n_reg >= self.n_in() {
            return false;
        }

        let grow = if n_reg == 0 {
            let spread = self.var_x.iter().fold(T::zero(), |acc, &v| acc + v);
            spread > T::from(1e-10).unwrap()
        } else {
            let last = &self.directions[n_reg - 1];
            let mse_last = last.mse() + T::from(1e-10).unwrap();
            let mse_prev = if n_reg == 1 {
                self.sum_e_cv2_base / (self.sum_w + T::from(1e-12).unwrap())
            } else {
                self.directions[n_reg - 2].mse()
            } + T::from(1e-10).unwrap();

            mse_last < params.add_threshold * mse_prev
                && last.n_data > T::from(0.99).unwrap() * self.directions[0].n_data
                && last.n_data * (T::one() - last.lambda) > T::from(0.5).unwrap()
        };

        if grow {
            self.directions
                .push(Direction::new(self.n_in(), params.init_lambda, params.init_s2));
            tracing::debug!(n_reg = n_reg + 1, "added PLS direction");
        }
        grow
    }

    /// Advance all forgetting factors one step.
    pub fn anneal(&mut self, params: &FieldParams<T>) {
        let decay = params.lambda_decay;
        self.lambda = decay * self.lambda + (T::one() - decay) * params.final_lambda;
        for dir in &mut self.directions {
            dir.anneal(decay, params.final_lambda);
        }
    }
}
