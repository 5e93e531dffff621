//! Distance-metric adaptation.
//!
//! ## Purpose
//!
//! This module moves a receptive field's distance metric down the gradient of
//! a penalised leave-one-out cost, shrinking or widening the field so that its
//! local linear model stays accurate. The metric is parametrised by a
//! lower-triangular factor `L` with `D = L * Lᵀ`; gradient steps are taken on
//! `L`, so `D` stays symmetric positive semi-definite by construction.
//!
//! ## Design notes
//!
//! * **Stochastic leave-one-out gradient**: The cost derivative w.r.t. the
//!   activation is approximated from the field's running sums and the
//!   per-direction memory terms `H` and `r`.
//! * **Penalty**: `penalty / nIn * Σ Dᵢⱼ²` keeps fields from shrinking to
//!   points.
//! * **Per-element rates**: Each factor element has its own learning rate.
//!   With meta learning the log-rates follow an IDBD-style update.
//! * **Step clipping**: An element whose step would exceed a tenth of the
//!   largest factor entry (or is not finite) is skipped and its rate halved.
//! * **Transient damping**: Steps are damped while the fitted error is still
//!   large relative to the leave-one-out error.
//!
//! ## Invariants
//!
//! * The dense metric is always rebuilt from the factor after a step.
//! * Zero activation leaves every statistic untouched.
//!
//! ## Non-goals
//!
//! * Choosing whether to adapt at all (callers check `update_d`).

// Feature-gated imports
#[cfg(not(feature = "std"))]
use alloc::{vec, vec::Vec};
#[cfg(feature = "std")]
use std::vec::Vec;

// External dependencies
use num_traits::Float;

// Internal dependencies
use crate::algorithms::receptive_field::{LocalUpdate, ReceptiveField};
use crate::math::kernel::Kernel;
use crate::primitives::triangular::LowerTriangular;

/// Guard added to running sums before division.
const TINY: f64 = 1e-10;

/// Largest allowed meta step on a log learning rate.
const MAX_META_STEP: f64 = 0.1;

/// Bound on the log learning rates.
const MAX_LOG_RATE: f64 = 10.0;

/// Largest allowed factor step relative to the largest factor entry.
const MAX_RELATIVE_STEP: f64 = 0.1;

// ============================================================================
// Parameters
// ============================================================================

/// Settings of the distance-metric adaptation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricParams<T> {
    /// Smoothness penalty strength.
    pub penalty: T,

    /// Adapt only the diagonal of the factor.
    pub diag_only: bool,

    /// Enable second-order meta learning of the learning rates.
    pub use_meta: bool,

    /// Meta learning rate.
    pub meta_rate: T,
}

// ============================================================================
// Adapter
// ============================================================================

/// Gradient step on a receptive field's distance metric.
pub struct DistanceMetricAdapter;

impl DistanceMetricAdapter {
    /// Derivative of `q = dxᵀ L Lᵀ dx` w.r.t. each element `Lᵢₖ`.
    ///
    /// `∂q/∂Lᵢₖ = 2 (Lᵀ dx)ₖ dxᵢ`.
    pub fn distance_gradient<T: Float>(factor: &LowerTriangular<T>, dx: &[T]) -> LowerTriangular<T> {
        let n = factor.dim();
        let mut v = vec![T::zero(); n];
        factor.transpose_mul_into(dx, &mut v);
        let two = T::from(2.0).unwrap();
        let mut out = LowerTriangular::zeros(n);
        for i in 0..n {
            for k in 0..=i {
                out.set(i, k, two * v[k] * dx[i]);
            }
        }
        out
    }

    /// Derivative of the penalty `pen * Σ Dᵢⱼ²` w.r.t. each element `Lᵢₖ`.
    ///
    /// `∂/∂Lᵢₖ = 4 pen (D L)ᵢₖ`.
    pub fn penalty_gradient<T: Float>(factor: &LowerTriangular<T>, metric: &[T], pen: T) -> LowerTriangular<T> {
        let n = factor.dim();
        let four = T::from(4.0).unwrap();
        let mut out = LowerTriangular::zeros(n);
        for i in 0..n {
            for k in 0..=i {
                let dl = (k..n).fold(T::zero(), |acc, b| acc + metric[i * n + b] * factor.get(b, k));
                out.set(i, k, four * pen * dl);
            }
        }
        out
    }

    /// One adaptation step for sample `x` with activation `w`.
    ///
    /// `local` is the result of the field's local update on the same sample.
    /// Returns whether the factor changed.
    pub fn step<T: Float>(
        rf: &mut ReceptiveField<T>,
        x: &[T],
        w: T,
        local: &LocalUpdate<T>,
        kernel: Kernel,
        params: &MetricParams<T>,
    ) -> bool {
        let tiny = T::from(TINY).unwrap();
        if !(w > T::zero()) || rf.sum_w <= tiny {
            return false;
        }

        let two = T::from(2.0).unwrap();
        let big_w = rf.sum_w;
        let big_e = rf.sum_e_cv2;
        let e_cv2 = local.e_cv * local.e_cv;
        let e2 = local.e * local.e;
        let transient = (rf.sum_e2 / (rf.sum_e_cv2 + tiny)).powi(4).min(T::one());

        // Per-direction terms, restricted to directions with enough data.
        let s = &local.projections;
        let ps: Vec<T> = rf
            .directions
            .iter()
            .enumerate()
            .map(|(k, dir)| {
                let ok = rf.trustworthy
                    && dir.n_data > T::from(0.1).unwrap() / (T::one() - dir.lambda)
                    && dir.ss_s2 > tiny;
                match s.get(k) {
                    Some(&sk) if ok => sk / dir.ss_s2,
                    _ => T::zero(),
                }
            })
            .collect();
        let any_ok = ps.iter().any(|&p| p != T::zero());

        let s_ps = s.iter().zip(&ps).fold(T::zero(), |acc, (&a, &b)| acc + a * b);
        let h = w * s_ps;

        let mut changed = false;
        if any_ok {
            let pse: Vec<T> = ps.iter().map(|&p| local.e * p).collect();
            let (sum_pse_h, sum_ps2_r) = rf.directions.iter().enumerate().fold(
                (T::zero(), T::zero()),
                |(a, b), (k, dir)| (a + pse[k] * dir.h, b + ps[k] * ps[k] * dir.r),
            );

            let dj1dw = -big_e / (big_w * big_w) + (e_cv2 - two * sum_pse_h - two * sum_ps2_r) / big_w;

            let dj1j1dwdw = if params.use_meta {
                let s_pse = s.iter().zip(&pse).fold(T::zero(), |acc, (&a, &b)| acc + a * b);
                let sum_term = rf.directions.iter().enumerate().fold(T::zero(), |acc, (k, dir)| {
                    acc + (-pse[k] / big_w - two * ps[k] * s_pse) * dir.h
                });
                -e_cv2 / (big_w * big_w) - two / big_w * sum_term + two / big_w * e2 * s_ps
                    - (e_cv2 - two * sum_pse_h) / (big_w * big_w)
                    + two * big_e / (big_w * big_w * big_w)
            } else {
                T::zero()
            };

            changed = Self::apply(rf, x, w, big_w, dj1dw, dj1j1dwdw, transient, kernel, params);
        }

        // Memory terms of the leave-one-out gradient.
        let one_minus_h = T::one() - h;
        if one_minus_h > tiny {
            for (k, dir) in rf.directions.iter_mut().enumerate() {
                let sk = match s.get(k) {
                    Some(&v) => v,
                    None => continue,
                };
                dir.h = dir.lambda * dir.h + (w / one_minus_h) * sk * local.e_cv * transient;
                dir.r = dir.lambda * dir.r + (w * w * e_cv2 / one_minus_h) * sk * sk * transient;
            }
        }

        changed
    }

    /// Element-wise factor update given the activation-level derivatives.
    #[allow(clippy::too_many_arguments)]
    fn apply<T: Float>(
        rf: &mut ReceptiveField<T>,
        x: &[T],
        w: T,
        big_w: T,
        dj1dw: T,
        dj1j1dwdw: T,
        transient: T,
        kernel: Kernel,
        params: &MetricParams<T>,
    ) -> bool {
        let n = rf.factor.dim();
        let two = T::from(2.0).unwrap();
        let four = T::from(4.0).unwrap();
        let pen = params.penalty / T::from(n).unwrap();
        let meta_step = T::from(MAX_META_STEP).unwrap();
        let max_log = T::from(MAX_LOG_RATE).unwrap();

        let dx: Vec<T> = x.iter().zip(&rf.center).map(|(&a, &c)| a - c).collect();
        let (dwdq, dwwdqq) = kernel.derivatives(w);
        let dq = Self::distance_gradient(&rf.factor, &dx);
        let dj2 = Self::penalty_gradient(&rf.factor, &rf.metric, pen);
        let limit = T::from(MAX_RELATIVE_STEP).unwrap() * rf.factor.max_abs();
        let w_ratio = w / big_w;

        let mut updated = rf.factor.clone();
        let mut changed = false;
        for i in 0..n {
            for k in 0..=i {
                if params.diag_only && i != k {
                    continue;
                }
                let l_ik = rf.factor.get(i, k);
                let dq_ik = dq.get(i, k);
                let dwdm = dwdq * dq_ik;
                let djdm = dwdm * dj1dw + w_ratio * dj2.get(i, k);

                let mut djj = T::zero();
                if params.use_meta {
                    let col_sq = (k..n).fold(T::zero(), |acc, b| {
                        let l = rf.factor.get(b, k);
                        acc + l * l
                    });
                    let dj2j2 = four * pen * (col_sq + l_ik * l_ik + rf.metric[i * n + i]);
                    let dwwdmdm = dwwdqq * dq_ik * dq_ik + dwdq * two * dx[i] * dx[i];
                    djj = dwwdmdm * dj1dw + dwdm * dwdm * dj1j1dwdw + w_ratio * dj2j2;

                    let aux = (params.meta_rate * transient * djdm * rf.meta_h.get(i, k))
                        .max(-meta_step)
                        .min(meta_step);
                    let b = (rf.meta_b.get(i, k) - aux).max(-max_log).min(max_log);
                    rf.meta_b.set(i, k, b);
                    rf.alpha.set(i, k, b.exp());
                }

                let alpha = rf.alpha.get(i, k);
                let delta = alpha * djdm * transient;
                if !delta.is_finite() || delta.abs() > limit {
                    let halved = alpha * T::from(0.5).unwrap();
                    rf.alpha.set(i, k, halved);
                    rf.meta_b.set(i, k, halved.ln());
                    tracing::trace!(i, k, "metric step too large; learning rate halved");
                    continue;
                }

                updated.set(i, k, l_ik - delta);
                changed = changed || delta != T::zero();

                if params.use_meta {
                    let decay = (T::one() - alpha * djj * transient).max(T::zero());
                    let trace = rf.meta_h.get(i, k) * decay - alpha * djdm * transient;
                    rf.meta_h.set(i, k, trace);
                }
            }
        }

        rf.factor = updated;
        rf.factor.gram_into(&mut rf.metric);
        changed
    }
}
