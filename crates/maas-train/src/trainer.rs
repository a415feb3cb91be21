//! The full-batch training loop.

use std::path::PathBuf;

use maas_core::SimRng;
use maas_features::TrainingSet;
use maas_gnn::{mse_grad, mse_loss, Adam, MaasGraphNetwork, Parameterized};

use crate::{TrainConfig, TrainError, TrainObserver, TrainResult};

/// Summary of a finished run.
#[derive(Clone, Debug, PartialEq)]
pub struct TrainReport {
    pub epochs:       usize,
    /// Loss of the first epoch.
    pub initial_loss: f64,
    /// Loss of the last epoch.
    pub final_loss:   f64,
    /// Where the parameters were saved, if they were.
    pub weights_path: Option<PathBuf>,
}

/// Fits a [`MaasGraphNetwork`] to one [`TrainingSet`].
///
/// Every epoch is one forward pass over the whole graph in training mode,
/// the MSE against the targets, one backward pass, and one Adam step.  There
/// is no validation split and no early stopping; the run always lasts
/// `config.epochs` epochs unless the loss stops being finite.
pub struct Trainer {
    config: TrainConfig,
}

impl Trainer {
    pub fn new(config: TrainConfig) -> TrainResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &TrainConfig {
        &self.config
    }

    /// Train `network` in place.
    ///
    /// # Errors
    ///
    /// [`TrainError::Diverged`] as soon as an epoch's loss is NaN or
    /// infinite; the parameters are left as they were before that epoch's
    /// update.  [`TrainError::NonFiniteParameters`] if an update produces a
    /// NaN or infinite parameter.
    pub fn fit<O: TrainObserver>(
        &self,
        network:  &mut MaasGraphNetwork,
        set:      &TrainingSet,
        rng:      &mut SimRng,
        observer: &mut O,
    ) -> TrainResult<TrainReport> {
        let graph = network.prepare(&set.tensors)?;
        let expected = (set.tensors.num_nodes(), network.config.out_channels);
        if set.targets.dim() != expected {
            return Err(TrainError::TargetShape { expected, got: set.targets.dim() });
        }

        let features = &set.tensors.features;
        let mut adam = Adam::new(self.config.learning_rate, self.config.weight_decay);
        let mut initial_loss = f64::NAN;
        let mut final_loss = f64::NAN;

        for epoch in 1..=self.config.epochs {
            let (pred, cache) = network.forward_train(features, &graph, rng)?;
            let loss = mse_loss(&pred, &set.targets);
            if !loss.is_finite() {
                return Err(TrainError::Diverged { epoch, loss });
            }

            let grads = network.backward(&cache, &graph, &mse_grad(&pred, &set.targets));
            adam.step(&mut network.params, &grads);
            check_parameters(network, epoch)?;

            if epoch == 1 {
                initial_loss = loss;
            }
            final_loss = loss;
            observer.on_epoch_end(epoch, loss);
        }

        let report = TrainReport {
            epochs: self.config.epochs,
            initial_loss,
            final_loss,
            weights_path: None,
        };
        observer.on_train_end(&report);
        Ok(report)
    }

    /// Initialise a fresh network from the config and train it.
    pub fn train<O: TrainObserver>(
        &self,
        set:      &TrainingSet,
        rng:      &mut SimRng,
        observer: &mut O,
    ) -> TrainResult<(MaasGraphNetwork, TrainReport)> {
        let mut network = MaasGraphNetwork::new(self.config.network.clone(), rng);
        log::info!(
            "training {} parameters for {} epochs on {} nodes / {} edges",
            network.params.parameter_count(),
            self.config.epochs,
            set.tensors.num_nodes(),
            set.tensors.num_edges()
        );
        let report = self.fit(&mut network, set, rng, observer)?;
        Ok((network, report))
    }

    /// The whole pipeline: load the dataset, build the training set, train,
    /// and write the parameters to `config.weights_path`.
    ///
    /// # Errors
    ///
    /// A missing or malformed dataset surfaces as [`TrainError::Features`]
    /// (see [`TrainError::is_dataset_unavailable`]).  A failed save after
    /// successful training is [`TrainError::Persist`].
    pub fn train_and_save<O: TrainObserver>(&self, observer: &mut O) -> TrainResult<TrainReport> {
        let mut rng = match self.config.seed {
            Some(seed) => SimRng::new(seed),
            None       => SimRng::from_entropy(),
        };
        let set = maas_features::load(&self.config.dataset_path, &mut rng)?;
        let (network, mut report) = self.train(&set, &mut rng, observer)?;

        let path = &self.config.weights_path;
        network
            .save(path)
            .map_err(|source| TrainError::Persist { path: path.clone(), source })?;
        log::info!("saved trained parameters to {}", path.display());
        report.weights_path = Some(path.clone());
        Ok(report)
    }
}

pub(crate) fn check_parameters(network: &MaasGraphNetwork, epoch: usize) -> TrainResult<()> {
    if network.params.is_finite() {
        Ok(())
    } else {
        Err(TrainError::NonFiniteParameters { epoch })
    }
}
