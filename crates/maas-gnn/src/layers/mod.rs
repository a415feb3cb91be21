//! Layer parameter blocks with explicit forward and backward passes.
//!
//! Each layer struct holds only learnable parameters and is its own gradient
//! container: [`Parameterized::zeros_like`] produces an accumulator with the
//! same shapes, which the backward pass fills in.

pub mod activation;
pub mod gat;
pub mod linear;
pub mod norm;
pub mod sage;

use ndarray::{Array1, Array2, ArrayViewD, ArrayViewMutD};

use maas_core::SimRng;

/// Uniform access to a layer's learnable tensors.
///
/// `tensors` and `tensors_mut` must list the same tensors in the same order;
/// the optimiser pairs them positionally.
pub trait Parameterized {
    fn tensors(&self) -> Vec<ArrayViewD<'_, f64>>;
    fn tensors_mut(&mut self) -> Vec<ArrayViewMutD<'_, f64>>;
    fn zeros_like(&self) -> Self;

    fn parameter_count(&self) -> usize {
        self.tensors().iter().map(|t| t.len()).sum()
    }

    /// `false` if any parameter is NaN or infinite.
    fn is_finite(&self) -> bool {
        self.tensors().iter().all(|t| t.iter().all(|v| v.is_finite()))
    }
}

/// Glorot-uniform matrix: `U(-a, a)` with `a = sqrt(6 / (fan_in + fan_out))`.
pub(crate) fn glorot(shape: (usize, usize), fans: (usize, usize), rng: &mut SimRng) -> Array2<f64> {
    let a = (6.0 / (fans.0 + fans.1).max(1) as f64).sqrt();
    Array2::from_shape_fn(shape, |_| rng.gen_range(-a..=a))
}

pub(crate) fn zeros_like2(a: &Array2<f64>) -> Array2<f64> {
    Array2::zeros(a.raw_dim())
}

pub(crate) fn zeros_like1(a: &Array1<f64>) -> Array1<f64> {
    Array1::zeros(a.raw_dim())
}
