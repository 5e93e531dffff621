//! Tests for the online LWPR model.
//!
//! ## Test Organization
//!
//! 1. **Boundary Checks** - Errors leave the model untouched
//! 2. **Hyperparameters** - Initial metric, kernel and normalization
//! 3. **Inspection** - Receptive-field views and index checks
//! 4. **Learning** - Convergence and the Jacobian on noisy data

use approx::assert_relative_eq;
use lwpr_rs::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

fn trained_1d(samples: usize) -> LwprModel<f64> {
    let mut model = LwprModel::new(1, 1).unwrap();
    for i in 0..samples {
        let x = (i % 40) as f64 / 40.0;
        model.update(&[x], &[(3.0 * x).sin()]).unwrap();
    }
    model
}

// ============================================================================
// Boundary checks
// ============================================================================

#[test]
fn test_zero_dimensions_rejected() {
    assert_eq!(
        LwprModel::<f64>::new(0, 1).unwrap_err(),
        LwprError::BadInputDim { expected: 1, got: 0 }
    );
    assert_eq!(
        LwprModel::<f64>::new(1, 0).unwrap_err(),
        LwprError::BadOutputDim { expected: 1, got: 0 }
    );
}

#[test]
fn test_bad_update_leaves_model_untouched() {
    let mut model = trained_1d(50);
    let before = model.clone();

    assert_eq!(
        model.update(&[0.1, 0.2], &[1.0]).unwrap_err(),
        LwprError::BadInputDim { expected: 1, got: 2 }
    );
    assert_eq!(
        model.update(&[0.1], &[]).unwrap_err(),
        LwprError::BadOutputDim { expected: 1, got: 0 }
    );
    assert!(matches!(
        model.update(&[f64::NAN], &[1.0]),
        Err(LwprError::Unspecified(_))
    ));
    assert_eq!(model, before);
}

#[test]
fn test_bad_query_dimension() {
    let model = trained_1d(10);
    assert!(matches!(model.predict(&[], 0.0), Err(LwprError::BadInputDim { .. })));
    assert!(matches!(
        model.predict_with_confidence(&[0.0, 0.0], 0.0),
        Err(LwprError::BadInputDim { .. })
    ));
    assert!(matches!(
        model.predict_jacobian(&[0.0, 0.0], 0.0),
        Err(LwprError::BadInputDim { .. })
    ));
}

#[test]
fn test_update_returns_prediction_before_training() {
    let mut model = LwprModel::<f64>::new(1, 1).unwrap();
    assert_eq!(model.update(&[0.3], &[2.0]).unwrap(), vec![0.0]);
    let again = model.update(&[0.3], &[4.0]).unwrap();
    assert_relative_eq!(again[0], 2.0);
    assert_eq!(model.n_data(), 2);
}

#[test]
fn test_untrained_model_has_no_support() {
    let model = LwprModel::<f64>::new(2, 2).unwrap();
    let p = model.predict_with_confidence(&[0.0, 0.0], 0.0).unwrap();
    assert_eq!(p.y, vec![0.0, 0.0]);
    assert!(p.confidence.iter().all(|c| c.is_infinite()));
    assert_eq!(p.max_activation, vec![0.0, 0.0]);
}

#[test]
fn test_clone_is_independent() {
    let model = trained_1d(100);
    let mut copy = model.clone();
    let before = model.predict(&[0.5], 0.0).unwrap();

    for _ in 0..50 {
        copy.update(&[0.5], &[10.0]).unwrap();
    }
    assert_eq!(model.predict(&[0.5], 0.0).unwrap(), before);
    assert_eq!(model.n_data(), 100);
    assert_eq!(copy.n_data(), 150);
}

#[test]
fn test_original_training_leaves_clone_untouched() {
    let mut model = trained_1d(100);
    let copy = model.clone();
    let before = copy.predict_with_confidence(&[0.5], 0.0).unwrap();
    let rfs = copy.num_rfs(0).unwrap();

    for i in 0..50 {
        model.update(&[0.5 + i as f64 * 0.01], &[10.0]).unwrap();
    }
    let after = copy.predict_with_confidence(&[0.5], 0.0).unwrap();
    assert_eq!(after.y, before.y);
    assert_eq!(after.confidence, before.confidence);
    assert_eq!(copy.n_data(), 100);
    assert_eq!(copy.num_rfs(0).unwrap(), rfs);
    assert_eq!(model.n_data(), 150);
}

#[test]
fn test_single_sample_confidence_is_wider_than_trained() {
    let mut fresh = LwprModel::<f64>::new(1, 1).unwrap();
    fresh.update(&[0.0], &[1.0]).unwrap();
    let wide = fresh.predict_with_confidence(&[0.3], 0.001).unwrap();
    assert_eq!(wide.y.len(), 1);
    assert!(wide.confidence[0].is_finite());
    assert!(wide.confidence[0] > 0.0);
    assert_relative_eq!(wide.confidence[0], 1.0, epsilon = 1e-9);

    let trained = trained_1d(400);
    let narrow = trained.predict_with_confidence(&[0.5], 0.001).unwrap();
    assert!(
        narrow.confidence[0] < wide.confidence[0],
        "trained {} vs untrained {}",
        narrow.confidence[0],
        wide.confidence[0]
    );
}

// ============================================================================
// Hyperparameters
// ============================================================================

#[test]
fn test_default_hyperparameters() {
    let model = LwprModel::<f64>::new(3, 1).unwrap();
    assert_eq!(model.w_gen(), 0.1);
    assert_eq!(model.w_prune(), 1.0);
    assert_eq!(model.init_lambda(), 0.999);
    assert_eq!(model.final_lambda(), 0.99999);
    assert_eq!(model.trust_threshold(), 6.0);
    assert!(model.update_d());
    assert!(model.diag_only());
    assert!(!model.use_meta());
    assert_eq!(model.kernel(), Kernel::Gaussian);
    assert_eq!(model.norm_in(), &[1.0, 1.0, 1.0]);

    let d = model.init_d();
    for i in 0..3 {
        for j in 0..3 {
            assert_relative_eq!(d[i * 3 + j], if i == j { 25.0 } else { 0.0 });
        }
    }
}

#[test]
fn test_invalid_init_d_is_rejected() {
    let mut model = LwprModel::<f64>::new(2, 1).unwrap();
    let before = model.init_d();

    assert!(matches!(model.set_init_d_spherical(-1.0), Err(LwprError::BadInitD(_))));
    assert!(matches!(model.set_init_d_diagonal(&[1.0, 0.0]), Err(LwprError::BadInitD(_))));
    assert!(matches!(model.set_init_d(&[1.0, 2.0, 0.0, 1.0]), Err(LwprError::BadInitD(_))));
    assert!(matches!(model.set_init_d(&[1.0, 2.0, 2.0, 1.0]), Err(LwprError::BadInitD(_))));
    assert_eq!(
        model.set_init_d(&[1.0, 0.0, 0.0]).unwrap_err(),
        LwprError::BadInputDim { expected: 4, got: 3 }
    );
    assert_eq!(model.init_d(), before);
}

#[test]
fn test_valid_init_d_round_trips() {
    let mut model = LwprModel::<f64>::new(2, 1).unwrap();

    model.set_init_d_diagonal(&[4.0, 9.0]).unwrap();
    assert_eq!(model.init_d(), vec![4.0, 0.0, 0.0, 9.0]);

    let full = [4.0, 1.0, 1.0, 3.0];
    model.set_init_d(&full).unwrap();
    for (a, b) in model.init_d().iter().zip(&full) {
        assert_relative_eq!(a, b, epsilon = 1e-12);
    }

    model.update(&[0.0, 0.0], &[1.0]).unwrap();
    let rf = model.receptive_field(0, 0).unwrap();
    for (a, b) in rf.d().iter().zip(&full) {
        assert_relative_eq!(a, b, epsilon = 1e-12);
    }
}

#[test]
fn test_kernel_by_name() {
    let mut model = LwprModel::<f64>::new(1, 1).unwrap();
    model.set_kernel_name("BiSquare").unwrap();
    assert_eq!(model.kernel(), Kernel::BiSquare);

    assert!(matches!(
        model.set_kernel_name("Triangle"),
        Err(LwprError::UnknownKernel(_))
    ));
    assert_eq!(model.kernel(), Kernel::BiSquare);
}

#[test]
fn test_normalization_setters_validate() {
    let mut model = LwprModel::<f64>::new(2, 1).unwrap();
    assert_eq!(
        model.set_norm_in(&[1.0]).unwrap_err(),
        LwprError::BadInputDim { expected: 2, got: 1 }
    );
    assert!(matches!(model.set_norm_out(&[0.0]), Err(LwprError::Unspecified(_))));

    model.set_norm_in_scalar(2.5).unwrap();
    assert_eq!(model.norm_in(), &[2.5, 2.5]);
    assert_eq!(model.norm_out(), &[1.0]);
}

#[test]
fn test_normalization_is_a_change_of_units() {
    let mut scaled = Lwpr::new(1, 1).norm_in(vec![2.0]).norm_out(vec![3.0]).build().unwrap();
    let mut plain = LwprModel::<f64>::new(1, 1).unwrap();

    for i in 0..300 {
        let x = (i % 30) as f64 / 15.0;
        let y = x * x;
        scaled.update(&[x], &[y]).unwrap();
        plain.update(&[x / 2.0], &[y / 3.0]).unwrap();
    }

    for &x in &[0.2, 0.9, 1.7] {
        let a = scaled.predict(&[x], 0.0).unwrap()[0];
        let b = plain.predict(&[x / 2.0], 0.0).unwrap()[0];
        assert_relative_eq!(a, 3.0 * b, epsilon = 1e-12);

        let ja = scaled.predict_jacobian(&[x], 0.0).unwrap()[0][0];
        let jb = plain.predict_jacobian(&[x / 2.0], 0.0).unwrap()[0][0];
        assert_relative_eq!(ja, 1.5 * jb, epsilon = 1e-12);
    }
}

// ============================================================================
// Inspection
// ============================================================================

#[test]
fn test_receptive_field_index_checks() {
    let model = trained_1d(40);
    let n = model.num_rfs(0).unwrap();
    assert!(n >= 1);

    assert_eq!(
        model.receptive_field(0, n).unwrap_err(),
        LwprError::OutOfRange {
            what: "receptive field",
            index: n,
            len: n
        }
    );
    assert_eq!(
        model.receptive_field(1, 0).unwrap_err(),
        LwprError::OutOfRange {
            what: "output",
            index: 1,
            len: 1
        }
    );
    assert!(model.num_rfs(3).is_err());
}

#[test]
fn test_receptive_field_view() {
    let model = trained_1d(400);
    let rf = model.receptive_field(0, 0).unwrap();

    assert_eq!(rf.n_in(), 1);
    assert_eq!(rf.center().len(), 1);
    assert!(rf.sum_w() > 0.0);
    assert!(rf.n_reg() <= 1);
    assert_eq!(rf.beta().len(), rf.n_reg());
    assert_eq!(rf.u().len(), rf.n_reg());

    // D = Mᵀ M
    let m = rf.m();
    assert_relative_eq!(rf.d()[0], m[0] * m[0], epsilon = 1e-12);
}

#[test]
fn test_outputs_are_independent() {
    let mut model = LwprModel::<f64>::new(1, 2).unwrap();
    for i in 0..200 {
        let x = (i % 20) as f64 / 20.0;
        model.update(&[x], &[x, -2.0 * x]).unwrap();
    }
    assert!(model.num_rfs(0).unwrap() >= 1);
    assert!(model.num_rfs(1).unwrap() >= 1);

    let y = model.predict(&[0.5], 0.0).unwrap();
    assert_relative_eq!(y[1], -2.0 * y[0], epsilon = 0.05);

    let jac = model.predict_jacobian(&[0.5], 0.0).unwrap();
    assert_eq!(jac.len(), 2);
    assert_eq!(jac[0].len(), 1);
}

#[test]
fn test_input_statistics() {
    let mut model = LwprModel::<f64>::new(1, 1).unwrap();
    for &x in &[1.0, 2.0, 3.0, 4.0] {
        model.update(&[x], &[0.0]).unwrap();
    }
    assert_relative_eq!(model.mean_x()[0], 2.5);
    assert_relative_eq!(model.var_x()[0], 1.25, epsilon = 1e-12);
}

// ============================================================================
// Learning
// ============================================================================

fn test_error(model: &LwprModel<f64>, f: impl Fn(f64) -> f64) -> f64 {
    let n = 101;
    (0..n)
        .map(|i| {
            let x = i as f64 / (n - 1) as f64;
            let e = model.predict(&[x], 0.0).unwrap()[0] - f(x);
            e * e
        })
        .sum::<f64>()
        / n as f64
}

#[test]
fn test_learns_noisy_sine() {
    let f = |x: f64| (2.0 * std::f64::consts::PI * x).sin();
    let mut rng = StdRng::seed_from_u64(7);
    let noise = Normal::new(0.0, 0.05).unwrap();
    let mut model = LwprModel::<f64>::new(1, 1).unwrap();

    for _ in 0..200 {
        let x: f64 = rng.random_range(0.0..1.0);
        model.update(&[x], &[f(x) + noise.sample(&mut rng)]).unwrap();
    }
    let early = test_error(&model, f);

    for _ in 0..4000 {
        let x: f64 = rng.random_range(0.0..1.0);
        model.update(&[x], &[f(x) + noise.sample(&mut rng)]).unwrap();
    }
    let late = test_error(&model, f);

    // Variance of sin over a period is 0.5.
    assert!(late / 0.5 < 0.05, "normalized MSE {}", late / 0.5);
    assert!(late <= early);
    assert!(model.num_rfs(0).unwrap() >= 2);
}

#[test]
fn test_windowed_error_decreases_on_sine() {
    use std::f64::consts::PI;

    let mut rng = StdRng::seed_from_u64(23);
    let mut model = LwprModel::<f64>::new(1, 1).unwrap();
    let window = 200;
    let mut mse = Vec::new();

    for _ in 0..15 {
        let mut sq = 0.0;
        for _ in 0..window {
            let x: f64 = rng.random_range(-PI..PI);
            let yp = model.update(&[x], &[x.sin()]).unwrap();
            sq += (yp[0] - x.sin()).powi(2);
        }
        mse.push(sq / window as f64);
    }

    let first = mse[0];
    let last = mse[mse.len() - 1];
    assert!(last < first, "window MSEs {:?}", mse);
    let head: f64 = mse[..3].iter().sum::<f64>() / 3.0;
    let tail: f64 = mse[mse.len() - 3..].iter().sum::<f64>() / 3.0;
    assert!(tail < head, "window MSEs {:?}", mse);
    assert!(last < 5e-3, "window MSEs {:?}", mse);
}

fn surface(x: &[f64]) -> f64 {
    x[0] * x[0] - 0.5 * x[1]
}

#[test]
fn test_jacobian_matches_finite_differences() {
    let mut rng = StdRng::seed_from_u64(11);
    let mut model = Lwpr::new(2, 1).w_gen(0.2).build().unwrap();

    for _ in 0..1500 {
        let x = [rng.random_range(-0.5..0.5), rng.random_range(-0.5..0.5)];
        model.update(&x, &[surface(&x)]).unwrap();
    }

    let h = 1e-6;
    for x in [[0.1, 0.2], [-0.2, 0.0], [0.3, -0.3]] {
        let jac = model.predict_jacobian(&x, 0.0).unwrap();
        for i in 0..2 {
            let mut plus = x;
            let mut minus = x;
            plus[i] += h;
            minus[i] -= h;
            let fd = (model.predict(&plus, 0.0).unwrap()[0] - model.predict(&minus, 0.0).unwrap()[0]) / (2.0 * h);
            assert_relative_eq!(jac[0][i], fd, epsilon = 1e-4);
        }
    }
}

#[test]
fn test_confidence_is_finite_where_trained() {
    let model = trained_1d(400);
    let p = model.predict_with_confidence(&[0.5], 0.001).unwrap();
    assert!(p.confidence[0].is_finite());
    assert!(p.confidence[0] >= 0.0);
    assert!(p.max_activation[0] > 0.5);

    let far = model.predict_with_confidence(&[100.0], 0.001).unwrap();
    assert!(far.confidence[0].is_infinite());
}
