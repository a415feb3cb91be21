//! Unit tests for maas-train.

#[cfg(test)]
mod helpers {
    use std::path::Path;

    use maas_core::SimRng;
    use maas_features::{build_training_set, TrainingSet};
    use maas_gnn::NetworkConfig;
    use maas_graph::{write_dataset, RawDataset, RoadNetwork, SyntheticSpec};

    use crate::TrainConfig;

    pub fn small_network() -> RoadNetwork {
        let spec = SyntheticSpec { num_nodes: 24, edge_probability: 0.15, ..SyntheticSpec::default() };
        spec.generate(&mut SimRng::new(5)).unwrap()
    }

    pub fn small_set() -> TrainingSet {
        build_training_set(&small_network(), &mut SimRng::new(6)).unwrap()
    }

    pub fn quick_config(epochs: usize) -> TrainConfig {
        TrainConfig {
            epochs,
            seed: Some(1),
            network: NetworkConfig { hidden_channels: 8, heads: 2, dropout: 0.0, ..NetworkConfig::default() },
            ..TrainConfig::default()
        }
    }

    pub fn write_small_dataset(path: &Path) {
        write_dataset(path, &RawDataset::from_network(&small_network(), "test")).unwrap();
    }
}

// ── Configuration ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod config {
    use std::io::Write;
    use std::path::PathBuf;

    use crate::{TrainConfig, DEFAULT_WEIGHTS_PATH};

    #[test]
    fn defaults() {
        let c = TrainConfig::default();
        assert_eq!(c.epochs, 500);
        assert_eq!(c.learning_rate, 0.01);
        assert_eq!(c.weight_decay, 5e-4);
        assert_eq!(c.log_interval, 10);
        assert_eq!(c.weights_path, PathBuf::from(DEFAULT_WEIGHTS_PATH));
        assert_eq!(c.network.hidden_channels, 32);
        assert_eq!(c.network.heads, 4);
        assert_eq!(c.network.dropout, 0.1);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn toml_overrides_only_named_fields() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "epochs = 20\nseed = 7\n\n[network]\ndropout = 0.25").unwrap();
        let c = TrainConfig::from_toml(f.path()).unwrap();
        assert_eq!(c.epochs, 20);
        assert_eq!(c.seed, Some(7));
        assert_eq!(c.network.dropout, 0.25);
        assert_eq!(c.network.heads, 4);
        assert_eq!(c.learning_rate, 0.01);
    }

    #[test]
    fn invalid_values_rejected() {
        assert!(TrainConfig { epochs: 0, ..TrainConfig::default() }.validate().is_err());
        assert!(TrainConfig { learning_rate: -1.0, ..TrainConfig::default() }.validate().is_err());
        assert!(TrainConfig { log_interval: 0, ..TrainConfig::default() }.validate().is_err());

        let mut c = TrainConfig::default();
        c.network.dropout = 1.0;
        assert!(c.validate().is_err());
    }
}

// ── Training loop ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod fit {
    use maas_core::SimRng;
    use maas_gnn::MaasGraphNetwork;

    use super::helpers::{quick_config, small_set};
    use crate::trainer::check_parameters;
    use crate::{LogObserver, LossHistory, TrainError, Trainer};

    #[test]
    fn loss_decreases_and_every_epoch_is_observed() {
        let set = small_set();
        let trainer = Trainer::new(quick_config(80)).unwrap();
        let mut history = LossHistory::default();
        let (_, report) = trainer.train(&set, &mut SimRng::new(2), &mut history).unwrap();

        assert_eq!(history.losses.len(), 80);
        assert_eq!(report.initial_loss, history.losses[0]);
        assert_eq!(report.final_loss, history.losses[79]);
        assert!(report.final_loss < report.initial_loss, "{report:?}");
        assert!(report.weights_path.is_none());
    }

    #[test]
    fn seeded_runs_match() {
        let set = small_set();
        let trainer = Trainer::new(quick_config(5)).unwrap();
        let (a, _) = trainer.train(&set, &mut SimRng::new(3), &mut LossHistory::default()).unwrap();
        let (b, _) = trainer.train(&set, &mut SimRng::new(3), &mut LossHistory::default()).unwrap();
        assert_eq!(a.forward(&set.tensors).unwrap(), b.forward(&set.tensors).unwrap());
    }

    #[test]
    fn trains_with_dropout_and_logging() {
        let set = small_set();
        let mut config = quick_config(20);
        config.network.dropout = 0.1;
        let trainer = Trainer::new(config).unwrap();
        let mut observer = LogObserver::new(10, 20);
        let (net, report) = trainer.train(&set, &mut SimRng::new(4), &mut observer).unwrap();
        assert!(report.final_loss.is_finite());
        assert!(net.forward(&set.tensors).unwrap().iter().all(|v| *v >= 0.0));
    }

    #[test]
    fn non_finite_loss_is_divergence() {
        let mut set = small_set();
        set.targets[[0, 0]] = f64::NAN;
        let trainer = Trainer::new(quick_config(10)).unwrap();
        let mut rng = SimRng::new(5);
        let mut net = MaasGraphNetwork::new(trainer.config().network.clone(), &mut rng);
        let before = net.params.clone();

        let err = trainer.fit(&mut net, &set, &mut rng, &mut LossHistory::default()).unwrap_err();
        assert!(matches!(err, TrainError::Diverged { epoch: 1, .. }));
        assert_eq!(net.params.sage.lin_l, before.sage.lin_l);
    }

    #[test]
    fn non_finite_parameters_stop_training() {
        let mut rng = SimRng::new(8);
        let mut net = MaasGraphNetwork::new(quick_config(1).network, &mut rng);
        assert!(check_parameters(&net, 1).is_ok());

        net.params.gat.bias[0] = f64::NAN;
        let err = check_parameters(&net, 7).unwrap_err();
        assert!(matches!(err, TrainError::NonFiniteParameters { epoch: 7 }));
    }

    #[test]
    fn target_shape_checked() {
        let mut set = small_set();
        set.targets = ndarray::Array2::zeros((3, 3));
        let trainer = Trainer::new(quick_config(1)).unwrap();
        let err = trainer.train(&set, &mut SimRng::new(6), &mut LossHistory::default()).unwrap_err();
        assert!(matches!(err, TrainError::TargetShape { .. }));
    }
}

// ── Pipeline ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod pipeline {
    use maas_gnn::MaasGraphNetwork;

    use super::helpers::{quick_config, write_small_dataset};
    use crate::{NoopObserver, TrainError, Trainer};

    #[test]
    fn trains_and_saves_loadable_parameters() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = quick_config(3);
        config.dataset_path = dir.path().join("network.json");
        config.weights_path = dir.path().join("models").join("weights.json");
        write_small_dataset(&config.dataset_path);

        let report = Trainer::new(config.clone()).unwrap().train_and_save(&mut NoopObserver).unwrap();
        assert_eq!(report.weights_path.as_deref(), Some(config.weights_path.as_path()));
        let loaded = MaasGraphNetwork::load_compatible(&config.weights_path, &config.network).unwrap();
        assert_eq!(loaded.config, config.network);
    }

    #[test]
    fn missing_dataset_is_reported_as_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = quick_config(3);
        config.dataset_path = dir.path().join("absent.json");
        let err = Trainer::new(config).unwrap().train_and_save(&mut NoopObserver).unwrap_err();
        assert!(err.is_dataset_unavailable(), "{err}");
    }

    #[test]
    fn save_failure_is_distinct_from_divergence() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not_a_dir");
        std::fs::write(&blocker, b"file").unwrap();

        let mut config = quick_config(2);
        config.dataset_path = dir.path().join("network.json");
        config.weights_path = blocker.join("weights.json");
        write_small_dataset(&config.dataset_path);

        let err = Trainer::new(config).unwrap().train_and_save(&mut NoopObserver).unwrap_err();
        assert!(matches!(err, TrainError::Persist { .. }), "{err}");
    }
}
