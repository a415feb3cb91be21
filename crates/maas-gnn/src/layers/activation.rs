//! Element-wise activations and dropout.

use ndarray::{Array2, Zip};

use maas_core::SimRng;

pub fn elu(x: &Array2<f64>) -> Array2<f64> {
    x.mapv(|v| if v > 0.0 { v } else { v.exp_m1() })
}

/// `dL/dx` for [`elu`], given the pre-activation input.
pub fn elu_backward(x: &Array2<f64>, dy: &Array2<f64>) -> Array2<f64> {
    let mut dx = dy.clone();
    Zip::from(&mut dx).and(x).for_each(|d, &v| {
        if v <= 0.0 {
            *d *= v.exp();
        }
    });
    dx
}

pub fn relu(x: &Array2<f64>) -> Array2<f64> {
    x.mapv(|v| v.max(0.0))
}

/// `dL/dx` for [`relu`], given the pre-activation input.
pub fn relu_backward(x: &Array2<f64>, dy: &Array2<f64>) -> Array2<f64> {
    let mut dx = dy.clone();
    Zip::from(&mut dx).and(x).for_each(|d, &v| {
        if v <= 0.0 {
            *d = 0.0;
        }
    });
    dx
}

/// Inverted-dropout mask: each entry is `0` with probability `p`, otherwise
/// `1 / (1 - p)`, so the expected activation is unchanged.
pub fn dropout_mask(shape: (usize, usize), p: f64, rng: &mut SimRng) -> Array2<f64> {
    if p <= 0.0 {
        return Array2::ones(shape);
    }
    if p >= 1.0 {
        return Array2::zeros(shape);
    }
    let keep = 1.0 / (1.0 - p);
    Array2::from_shape_fn(shape, |_| if rng.gen_bool(p) { 0.0 } else { keep })
}
