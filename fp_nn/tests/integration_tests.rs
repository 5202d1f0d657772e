//! Integration tests for module-structured traces.
//!
//! Exercises the full path: module registration, scoped forward calls,
//! init/apply round trips, and failure hygiene across traces.

use fp_core::{transform, Error};
use fp_nn::{Linear, Mlp, Module};
use ndarray::{array, Array2, Ix1, Ix2};

// ============================================================================
// Test: Concrete Linear Scenario
// ============================================================================

#[test]
fn test_linear_4_on_batch_of_3_features() {
    let model = transform(|x: &Array2<f32>| Linear::new(4)?.forward(x));
    let x = array![[0.5_f32, -1.0, 2.0], [1.0, 0.0, -0.5]];

    let params = model.init(11, &x).unwrap();

    // Exactly two parameters, at the documented paths and shapes.
    assert_eq!(params.len(), 2);
    assert_eq!(params["~/Linear_0/forward/W"].shape(), &[3, 4]);
    assert_eq!(params["~/Linear_0/forward/b"].shape(), &[4]);

    // apply computes x · W + b.
    let y = model.apply(&params, &x).unwrap();
    assert_eq!(y.dim(), (2, 4));

    let w = params["~/Linear_0/forward/W"]
        .clone()
        .into_dimensionality::<Ix2>()
        .unwrap();
    let b = params["~/Linear_0/forward/b"]
        .clone()
        .into_dimensionality::<Ix1>()
        .unwrap();
    assert_eq!(y, x.dot(&w) + &b);
}

// ============================================================================
// Test: Nested Model Round Trip
// ============================================================================

#[test]
fn test_nested_model_round_trip() {
    let model = transform(|x: &Array2<f32>| {
        let trunk = Mlp::new(&[16, 8])?;
        let head = Linear::new(1)?;
        head.forward(&trunk.forward(x)?)
    });
    let x = array![[0.1_f32, 0.2], [0.3, 0.4], [0.5, 0.6]];

    let params = model.init(2024, &x).unwrap();
    eprintln!("initialized {} parameters:", params.len());
    for (path, value) in &params {
        eprintln!("  {} {:?}", path, value.shape());
    }

    // Trunk layers nest under the Mlp scope; the head sits at top level and
    // shares the frame-wide Linear counter with them.
    assert!(params.contains_key("~/Mlp_0/forward/Linear_0/forward/W"));
    assert!(params.contains_key("~/Mlp_0/forward/Linear_1/forward/W"));
    assert!(params.contains_key("~/Linear_2/forward/W"));

    let y = model.apply(&params, &x).unwrap();
    assert_eq!(y.dim(), (3, 1));

    // Re-tracing is deterministic: same params, same input, same output.
    assert_eq!(y, model.apply(&params, &x).unwrap());

    // Same seed, same mapping.
    assert_eq!(params, model.init(2024, &x).unwrap());
}

// ============================================================================
// Test: Mismatched Params Mapping
// ============================================================================

#[test]
fn test_params_from_a_differently_structured_init_fail() {
    let one_layer = transform(|x: &Array2<f32>| Linear::new(4)?.forward(x));
    let two_layers = transform(|x: &Array2<f32>| {
        let first = Linear::new(4)?;
        let second = Linear::new(4)?;
        second.forward(&first.forward(x)?)
    });
    let x = array![[1.0_f32, 2.0, 3.0]];

    let params = one_layer.init(0, &x).unwrap();

    // The second layer's paths were never initialized.
    let err = two_layers.apply(&params, &x).unwrap_err();
    assert_eq!(
        err,
        Error::MissingParam {
            path: "~/Linear_1/forward/W".to_string()
        }
    );
}

#[test]
fn test_wrongly_shaped_params_fail_at_lookup() {
    let narrow = transform(|x: &Array2<f32>| Linear::new(2)?.forward(x));
    let wide = transform(|x: &Array2<f32>| Linear::new(4)?.forward(x));
    let x = array![[1.0_f32, 2.0, 3.0]];

    let params = narrow.init(0, &x).unwrap();
    let err = wide.apply(&params, &x).unwrap_err();
    assert_eq!(
        err,
        Error::ShapeMismatch {
            path: "~/Linear_0/forward/W".to_string(),
            requested: vec![3, 4],
            stored: vec![3, 2],
        }
    );
}

// ============================================================================
// Test: Failure Hygiene Across Traces
// ============================================================================

#[test]
fn test_failed_apply_does_not_corrupt_later_traces() {
    let model = transform(|x: &Array2<f32>| {
        let trunk = Mlp::new(&[4])?;
        let head = Linear::new(1)?;
        head.forward(&trunk.forward(x)?)
    });
    let x = array![[1.0_f32, 2.0]];

    // A failing apply exits mid-scope (inside the Mlp's forward).
    let err = model.apply(&fp_core::Params::new(), &x).unwrap_err();
    assert!(matches!(err, Error::MissingParam { .. }));

    // The frame and call stacks were unwound, so a fresh trace on this
    // thread still produces clean names and paths.
    let params = model.init(5, &x).unwrap();
    assert!(params.contains_key("~/Mlp_0/forward/Linear_0/forward/W"));
    assert!(params.contains_key("~/Linear_1/forward/W"));
    let y = model.apply(&params, &x).unwrap();
    assert_eq!(y.dim(), (1, 1));
}

#[test]
fn test_traces_on_different_threads_are_isolated() {
    let handles: Vec<_> = (0..4)
        .map(|seed| {
            std::thread::spawn(move || {
                let model = transform(|x: &Array2<f32>| Linear::new(4)?.forward(x));
                let x = array![[1.0_f32, 2.0, 3.0]];
                let params = model.init(seed, &x).unwrap();
                assert_eq!(params.len(), 2);
                model.apply(&params, &x).unwrap()
            })
        })
        .collect();

    for handle in handles {
        let y = handle.join().unwrap();
        assert_eq!(y.dim(), (1, 4));
    }
}
