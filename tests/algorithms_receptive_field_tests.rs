#![cfg(feature = "dev")]
//! Tests for receptive fields.
//!
//! ## Test Organization
//!
//! 1. **Activation** - Distance, kernel weight and its input gradient
//! 2. **Local Update** - Statistics after single samples
//! 3. **PLS Growth** - Direction creation and the `n_in` cap
//! 4. **Learning** - Recovery of a linear function
//! 5. **Predictive Variance** - Prior for untrusted fields, corrected LOO error

use approx::assert_relative_eq;
use lwpr_rs::internals::algorithms::receptive_field::{FieldParams, ReceptiveField, PRIOR_VARIANCE};
use lwpr_rs::internals::engine::config::LwprConfig;
use lwpr_rs::internals::math::kernel::Kernel;
use lwpr_rs::internals::primitives::triangular::LowerTriangular;

fn field(center: &[f64], d: f64) -> ReceptiveField<f64> {
    let factor = LowerTriangular::scaled_identity(center.len(), d.sqrt());
    ReceptiveField::new(center, &factor, 50.0, 0.999)
}

fn params(n_in: usize, update_d: bool) -> FieldParams<f64> {
    let mut config = LwprConfig::<f64>::new(n_in);
    config.update_d = update_d;
    config.field_params()
}

// ============================================================================
// Activation
// ============================================================================

#[test]
fn test_activation_at_and_away_from_center() {
    let rf = field(&[0.0, 1.0], 25.0);

    let (w, q) = rf.activation(&[0.0, 1.0], Kernel::Gaussian);
    assert_relative_eq!(w, 1.0);
    assert_relative_eq!(q, 0.0);

    let (w, q) = rf.activation(&[0.2, 1.0], Kernel::Gaussian);
    assert_relative_eq!(q, 1.0, epsilon = 1e-12);
    assert_relative_eq!(w, (-0.5f64).exp(), epsilon = 1e-12);

    let (w, _) = rf.activation(&[1.0, 1.0], Kernel::BiSquare);
    assert_eq!(w, 0.0);
}

#[test]
fn test_metric_matches_factor() {
    let rf = field(&[0.0, 0.0], 4.0);
    assert_eq!(rf.metric, vec![4.0, 0.0, 0.0, 4.0]);
    assert_relative_eq!(rf.metric_trace(), 8.0);
}

#[test]
fn test_activation_gradient_matches_finite_differences() {
    let rf = field(&[0.1, -0.2], 10.0);
    let x = [0.25, -0.1];
    let h = 1e-6;
    for kernel in [Kernel::Gaussian, Kernel::BiSquare] {
        let (w, _) = rf.activation(&x, kernel);
        let grad = rf.activation_gradient(&x, w, kernel);
        for i in 0..2 {
            let mut plus = x;
            let mut minus = x;
            plus[i] += h;
            minus[i] -= h;
            let fd = (rf.activation(&plus, kernel).0 - rf.activation(&minus, kernel).0) / (2.0 * h);
            assert_relative_eq!(grad[i], fd, epsilon = 1e-6);
        }
    }
}

// ============================================================================
// Local update
// ============================================================================

#[test]
fn test_first_sample_sets_intercept() {
    let mut rf = field(&[0.5], 25.0);
    let p = params(1, false);

    let local = rf.update_local(&[0.5], 3.0, 1.0, &p);
    assert_eq!(local.prediction, 0.0);
    assert!(local.projections.is_empty());
    assert_relative_eq!(rf.beta0, 3.0);
    assert_relative_eq!(rf.mean_x[0], 0.5);
    assert_relative_eq!(rf.var_x[0], 0.0);
    assert_relative_eq!(rf.sum_w, 1.0);
    assert_relative_eq!(rf.n_data, 1.0);
    assert_eq!(rf.n_reg(), 0);

    let (y, _) = rf.predict_local(&[0.9]);
    assert_relative_eq!(y, 3.0);
}

#[test]
fn test_weighted_mean_and_variance() {
    let mut rf = field(&[0.0], 25.0);
    let p = params(1, false);
    rf.lambda = 1.0;

    rf.update_local(&[0.0], 0.0, 1.0, &p);
    rf.update_local(&[1.0], 2.0, 1.0, &p);

    assert_relative_eq!(rf.mean_x[0], 0.5);
    assert_relative_eq!(rf.beta0, 1.0);
    assert_relative_eq!(rf.sum_w, 2.0);
}

#[test]
fn test_trustworthy_flips_once() {
    let mut rf = field(&[0.0], 25.0);
    let p = params(1, false);

    for _ in 0..2 {
        rf.train(&[0.0], 1.0, 1.0, &p);
    }
    assert!(!rf.trustworthy);

    rf.train(&[0.0], 1.0, 1.0, &p);
    assert!(rf.trustworthy);
}

// ============================================================================
// PLS growth
// ============================================================================

#[test]
fn test_first_direction_needs_input_variation() {
    let mut rf = field(&[0.0], 25.0);
    let p = params(1, false);

    rf.train(&[0.0], 1.0, 1.0, &p);
    rf.train(&[0.0], 1.0, 1.0, &p);
    assert_eq!(rf.n_reg(), 0);

    rf.train(&[0.1], 1.2, 0.8, &p);
    assert_eq!(rf.n_reg(), 1);
}

#[test]
fn test_directions_capped_at_input_dimension() {
    let mut rf = field(&[0.0], 25.0);
    let p = params(1, false);
    for i in 0..50 {
        let x = (i % 5) as f64 * 0.05 - 0.1;
        rf.train(&[x], 2.0 * x, 1.0, &p);
    }
    assert_eq!(rf.n_reg(), 1);
    assert!(!rf.check_add_direction(&p));
}

// ============================================================================
// Learning
// ============================================================================

#[test]
fn test_recovers_linear_function() {
    let mut rf = field(&[0.0], 25.0);
    let p = params(1, false);

    for i in 0..400 {
        let x = (i % 21) as f64 * 0.02 - 0.2;
        let (w, _) = rf.activation(&[x], Kernel::Gaussian);
        rf.train(&[x], 1.0 + 2.0 * x, w, &p);
    }

    let slope = rf.slope();
    assert_relative_eq!(slope[0], 2.0, epsilon = 1e-3);

    let (y, _) = rf.predict_local(&[0.1]);
    assert_relative_eq!(y, 1.2, epsilon = 1e-3);
}

#[test]
fn test_slope_matches_local_prediction() {
    let mut rf = field(&[0.0, 0.0], 25.0);
    let p = params(2, false);

    for i in 0..300 {
        let a = (i % 7) as f64 * 0.05 - 0.15;
        let b = (i % 11) as f64 * 0.03 - 0.15;
        rf.train(&[a, b], a - 3.0 * b, 1.0, &p);
    }

    let slope = rf.slope();
    let h = 1e-6;
    let x = [0.02, -0.03];
    for i in 0..2 {
        let mut plus = x;
        let mut minus = x;
        plus[i] += h;
        minus[i] -= h;
        let fd = (rf.predict_local(&plus).0 - rf.predict_local(&minus).0) / (2.0 * h);
        assert_relative_eq!(slope[i], fd, epsilon = 1e-6);
    }
}

#[test]
fn test_anneal_raises_forgetting_factor() {
    let mut rf = field(&[0.0], 25.0);
    let p = params(1, false);
    let before = rf.lambda;
    rf.anneal(&p);
    assert!(rf.lambda > before);
    assert!(rf.lambda < p.final_lambda);
}

// ============================================================================
// Predictive variance
// ============================================================================

#[test]
fn test_untrustworthy_field_reports_prior_variance() {
    let mut rf = field(&[0.0], 25.0);
    let p = params(1, false);
    rf.train(&[0.0], 1.0, 1.0, &p);

    assert!(!rf.trustworthy);
    assert_eq!(rf.sum_e_cv2, 0.0);
    assert_relative_eq!(rf.local_variance(), PRIOR_VARIANCE);
}

#[test]
fn test_trusted_variance_discounts_fitted_parameters() {
    let mut rf = field(&[0.0], 25.0);
    let p = params(1, false);
    for i in 0..100 {
        let x = (i % 9) as f64 * 0.05 - 0.2;
        let noise = if i % 2 == 0 { 0.01 } else { -0.01 };
        rf.train(&[x], x * x + noise, 1.0, &p);
    }

    assert!(rf.trustworthy);
    let dof = rf.sum_w - (rf.n_reg() + 1) as f64;
    assert_relative_eq!(rf.local_variance(), rf.sum_e_cv2 / dof, epsilon = 1e-15);
    assert!(rf.local_variance() < PRIOR_VARIANCE);
}
