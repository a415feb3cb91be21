//! Training observer trait for progress reporting.

use crate::TrainReport;

/// Callbacks invoked by [`Trainer::fit`][crate::Trainer::fit].
///
/// All methods have default no-op implementations.
pub trait TrainObserver {
    /// Called after every epoch with the loss measured on that epoch's
    /// forward pass (before the parameter update).  Epochs count from 1.
    fn on_epoch_end(&mut self, _epoch: usize, _loss: f64) {}

    /// Called once after the last epoch.
    fn on_train_end(&mut self, _report: &TrainReport) {}
}

/// A [`TrainObserver`] that does nothing.
pub struct NoopObserver;

impl TrainObserver for NoopObserver {}

/// Logs `Epoch 010/500 | Loss: 0.1234` at `info` level every `interval`
/// epochs.
pub struct LogObserver {
    pub interval: usize,
    pub epochs:   usize,
}

impl LogObserver {
    pub fn new(interval: usize, epochs: usize) -> Self {
        Self { interval: interval.max(1), epochs }
    }
}

impl TrainObserver for LogObserver {
    fn on_epoch_end(&mut self, epoch: usize, loss: f64) {
        if epoch % self.interval == 0 {
            log::info!("Epoch {epoch:03}/{:03} | Loss: {loss:.4}", self.epochs);
        }
    }

    fn on_train_end(&mut self, report: &TrainReport) {
        log::info!(
            "training complete: {} epochs, loss {:.4} -> {:.4}",
            report.epochs,
            report.initial_loss,
            report.final_loss
        );
    }
}

/// Records every epoch's loss.
#[derive(Debug, Default)]
pub struct LossHistory {
    pub losses: Vec<f64>,
}

impl TrainObserver for LossHistory {
    fn on_epoch_end(&mut self, _epoch: usize, loss: f64) {
        self.losses.push(loss);
    }
}
