//! Incremental partial least squares for receptive fields.
//!
//! ## Purpose
//!
//! Each receptive field fits its local linear model with an incremental PLS
//! regression: the centred input is projected onto a small number of latent
//! directions, one after another, each direction deflating the input residual
//! before the next one sees it. This module holds one latent direction with
//! its sufficient statistics, the forward pass over a stack of directions,
//! and the slope of the resulting linear model.
//!
//! ## Design notes
//!
//! * **Exponential forgetting**: Every statistic decays with the direction's
//!   forgetting factor `λ` and is incremented by the kernel-weighted sample.
//!   Projection and loading statistics use the slower factor `0.9 + 0.1 λ`.
//! * **Re-projection**: A sample first refreshes `u`, then its projection on
//!   the refreshed `u` feeds the regression statistics.
//! * **Not yet estimable**: Directions whose accumulated projection variance
//!   is degenerate keep their previous coefficient and loading.
//! * **Pure slope**: The slope is recomputed from `U`, `P`, `β` on demand.
//!
//! ## Key concepts
//!
//! * **Projection** `zₖ = uₖ · rₖ`, with `r₀ = x - mean_x`.
//! * **Deflation** `rₖ₊₁ = rₖ - zₖ pₖ`.
//! * **Prediction** `ŷ = β₀ + Σ βₖ zₖ`.
//!
//! ## Invariants
//!
//! * `u` is either zero (never updated) or unit length.
//! * All vectors of a direction have length `nIn`.

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
use crate::math::linalg::{axpy, dot, scale_add};

/// Denominators below this are treated as "not yet estimable".
const MIN_DENOMINATOR: f64 = 1e-12;

// ============================================================================
// Direction
// ============================================================================

/// One PLS latent direction and its sufficient statistics.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Direction<T> {
    /// Unit projection direction `u` (nIn).
    pub u: Vec<T>,

    /// Deflation (loading) direction `p` (nIn).
    pub p: Vec<T>,

    /// Regression coefficient `β`.
    pub beta: T,

    /// Forgetting-weighted number of samples seen.
    pub n_data: T,

    /// Forgetting-weighted sum of kernel weights.
    pub sum_w: T,

    /// Current forgetting factor.
    pub lambda: T,

    /// Weighted sum of squared projections.
    pub ss_s2: T,

    /// Weighted sum of projection times output residual.
    pub ss_yres: T,

    /// Weighted sum of input residual times output residual (nIn).
    pub sxres_yres: Vec<T>,

    /// Weighted sum of input residual times projection (nIn).
    pub ss_xres: Vec<T>,

    /// Weighted sum of squared leave-one-out errors after this direction.
    pub sum_e_cv2: T,

    /// Metric-gradient statistic `H`.
    pub h: T,

    /// Metric-gradient statistic `r`.
    pub r: T,
}

impl<T: Float> Direction<T> {
    /// Fresh direction with zero statistics.
    pub fn new(n_in: usize, init_lambda: T, init_s2: T) -> Self {
        Self {
            u: vec![T::zero(); n_in],
            p: vec![T::zero(); n_in],
            beta: T::zero(),
            n_data: T::zero(),
            sum_w: T::zero(),
            lambda: init_lambda,
            ss_s2: init_s2,
            ss_yres: T::zero(),
            sxres_yres: vec![T::zero(); n_in],
            ss_xres: vec![T::zero(); n_in],
            sum_e_cv2: T::zero(),
            h: T::zero(),
            r: T::zero(),
        }
    }

    /// Incorporate one weighted sample.
    ///
    /// `xres` is the input residual this direction sees and `yres` the output
    /// residual left by the previous directions. Returns the leave-one-out
    /// error `yres - β s`, computed with the direction and coefficient from
    /// before the update. The statistics use the projection onto the
    /// refreshed direction.
    pub fn update(&mut self, xres: &[T], yres: T, w: T) -> T {
        let lambda = self.lambda;
        let slow = T::from(0.9).unwrap() + T::from(0.1).unwrap() * lambda;
        let min_den = T::from(MIN_DENOMINATOR).unwrap();

        let e_cv = yres - self.beta * dot(&self.u, xres);

        self.sum_w = lambda * self.sum_w + w;
        self.n_data = lambda * self.n_data + T::one();

        scale_add(slow, &mut self.sxres_yres, w * yres, xres);
        let norm = dot(&self.sxres_yres, &self.sxres_yres).sqrt();
        if norm > min_den {
            for (u, &v) in self.u.iter_mut().zip(&self.sxres_yres) {
                *u = v / norm;
            }
        }
        let s = dot(&self.u, xres);

        self.ss_s2 = lambda * self.ss_s2 + w * s * s;
        self.ss_yres = lambda * self.ss_yres + w * yres * s;
        scale_add(slow, &mut self.ss_xres, w * s, xres);

        if self.ss_s2 > min_den {
            self.beta = self.ss_yres / self.ss_s2;
            let inv = T::one() / self.ss_s2;
            for (p, &v) in self.p.iter_mut().zip(&self.ss_xres) {
                *p = v * inv;
            }
        }

        self.sum_e_cv2 = lambda * self.sum_e_cv2 + w * e_cv * e_cv;
        e_cv
    }

    /// Move the forgetting factor one step towards `final_lambda`.
    #[inline]
    pub fn anneal(&mut self, decay: T, final_lambda: T) {
        self.lambda = decay * self.lambda + (T::one() - decay) * final_lambda;
    }

    /// Leave-one-out mean squared error after this direction.
    #[inline]
    pub fn mse(&self) -> T {
        self.sum_e_cv2 / (self.sum_w + T::from(MIN_DENOMINATOR).unwrap())
    }
}

// ============================================================================
// Forward pass
// ============================================================================

/// Project a centred input onto a stack of directions.
///
/// Fills `s` with one projection per direction and `xres` with the
/// `n_reg x n_in` row-major input residuals each direction saw.
pub fn project_into<T: Float>(
    directions: &[Direction<T>],
    x_centered: &[T],
    s: &mut Vec<T>,
    xres: &mut Vec<T>,
) {
    let n_in = x_centered.len();
    s.clear();
    xres.clear();
    let mut residual = x_centered.to_vec();
    for dir in directions {
        let z = dot(&dir.u, &residual);
        xres.extend_from_slice(&residual);
        axpy(-z, &dir.p, &mut residual);
        s.push(z);
    }
    debug_assert_eq!(xres.len(), directions.len() * n_in);
}

/// Projections of a centred input.
pub fn project<T: Float>(directions: &[Direction<T>], x_centered: &[T]) -> Vec<T> {
    let mut s = Vec::with_capacity(directions.len());
    let mut residual = x_centered.to_vec();
    for dir in directions {
        let z = dot(&dir.u, &residual);
        axpy(-z, &dir.p, &mut residual);
        s.push(z);
    }
    s
}

/// `β₀ + Σ βₖ zₖ`.
#[inline]
pub fn combine<T: Float>(directions: &[Direction<T>], beta0: T, s: &[T]) -> T {
    directions
        .iter()
        .zip(s)
        .fold(beta0, |acc, (dir, &z)| acc + dir.beta * z)
}

/// Slope of the local linear model, `∂ŷ/∂x`.
///
/// Back-substitutes each coefficient through the deflation steps that precede
/// its direction: the contribution of direction `i` is
/// `(I - u₀p₀ᵀ) … (I - uᵢ₋₁pᵢ₋₁ᵀ) βᵢ uᵢ`.
pub fn slope<T: Float>(directions: &[Direction<T>], n_in: usize) -> Vec<T> {
    let mut total = vec![T::zero(); n_in];
    let mut t = vec![T::zero(); n_in];
    for (i, dir) in directions.iter().enumerate() {
        for (ti, &ui) in t.iter_mut().zip(&dir.u) {
            *ti = dir.beta * ui;
        }
        for prev in directions[..i].iter().rev() {
            let dp = dot(&prev.p, &t);
            axpy(-dp, &prev.u, &mut t);
        }
        axpy(T::one(), &t, &mut total);
    }
    total
}
