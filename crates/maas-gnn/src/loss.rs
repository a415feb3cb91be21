//! Mean squared error over every node and output channel.

use ndarray::{Array2, Zip};

/// `mean((pred - target)²)` over all `N × C` entries.
pub fn mse_loss(pred: &Array2<f64>, target: &Array2<f64>) -> f64 {
    let n = pred.len().max(1) as f64;
    let mut sum = 0.0;
    Zip::from(pred).and(target).for_each(|&p, &t| sum += (p - t) * (p - t));
    sum / n
}

/// `dL/d(pred)` for [`mse_loss`]: `2 (pred - target) / (N × C)`.
pub fn mse_grad(pred: &Array2<f64>, target: &Array2<f64>) -> Array2<f64> {
    let scale = 2.0 / pred.len().max(1) as f64;
    (pred - target) * scale
}
