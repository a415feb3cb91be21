//! maas: operator CLI for the Mumbai MaaS road-capacity model.
//!
//! ```text
//! maas generate                 # synthetic dataset -> data/mumbai_network.json
//! maas train --epochs 500       # fit and save models/maas_gnn_weights.json
//! maas simulate --reduction 90  # one scenario step, JSON report on stdout
//! maas baseline                 # mock private-vehicle metrics
//! maas status
//! ```
//!
//! Set `RUST_LOG=info` to see training progress.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use maas_core::SimRng;
use maas_gnn::NetworkConfig;
use maas_graph::{write_dataset, RawDataset, SyntheticSpec};
use maas_sim::{
    baseline_metrics, GraphSource, ModelRegistry, ScenarioConfig, ScenarioOutcome, ScenarioService, BASELINE_SCENARIO,
};
use maas_train::{LogObserver, TrainConfig, Trainer, DEFAULT_DATASET_PATH, DEFAULT_WEIGHTS_PATH};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// fit the network to the dataset and save its parameters
    Train {
        /// training config TOML file
        #[arg(short, long, value_name = "*.toml")]
        config: Option<PathBuf>,
        #[arg(long)]
        dataset: Option<PathBuf>,
        #[arg(long)]
        weights: Option<PathBuf>,
        #[arg(long)]
        epochs: Option<usize>,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// run scenario steps through the trained network
    Simulate {
        /// scenario config TOML file
        #[arg(short, long, value_name = "*.toml")]
        config: Option<PathBuf>,
        /// training config TOML file, for a non-default network architecture
        #[arg(long, value_name = "*.toml")]
        train_config: Option<PathBuf>,
        #[arg(long, default_value = DEFAULT_DATASET_PATH)]
        dataset: PathBuf,
        #[arg(long)]
        weights: Option<PathBuf>,
        /// fleet reduction percentage (0-100)
        #[arg(long)]
        reduction: Option<f64>,
        #[arg(long)]
        no_motorways: bool,
        #[arg(long, default_value_t = 1)]
        steps: usize,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// print mock private-vehicle baseline metrics
    Baseline {
        #[arg(long)]
        seed: Option<u64>,
    },
    /// write a synthetic road-network dataset
    Generate {
        #[arg(short, long, default_value = DEFAULT_DATASET_PATH)]
        output: PathBuf,
        #[arg(long, default_value_t = 500)]
        nodes: usize,
        #[arg(long, default_value_t = 0.02)]
        edge_probability: f64,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// report whether trained parameters are available
    Status {
        #[arg(long, default_value = DEFAULT_DATASET_PATH)]
        dataset: PathBuf,
        #[arg(long, default_value = DEFAULT_WEIGHTS_PATH)]
        weights: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Train { config, dataset, weights, epochs, seed } => {
            let mut config = load_train_config(config.as_deref())?;
            if let Some(path) = dataset {
                config.dataset_path = path;
            }
            if let Some(path) = weights {
                config.weights_path = path;
            }
            if let Some(n) = epochs {
                config.epochs = n;
            }
            if seed.is_some() {
                config.seed = seed;
            }
            train(config)
        }
        Command::Simulate { config, train_config, dataset, weights, reduction, no_motorways, steps, seed } => {
            let mut scenario = match config {
                Some(path) => ScenarioConfig::from_toml(&path)?,
                None => ScenarioConfig::default(),
            };
            if let Some(pct) = reduction {
                scenario.fleet_reduction_percentage = pct;
            }
            if no_motorways {
                scenario.use_motorways = false;
            }
            let train = load_train_config(train_config.as_deref())?;
            let weights = weights.unwrap_or(train.weights_path);
            simulate(&scenario, &train.network, &dataset, &weights, steps, seed)
        }
        Command::Baseline { seed } => {
            let outcome = ScenarioOutcome {
                scenario:       BASELINE_SCENARIO.to_string(),
                metrics:        baseline_metrics(&mut rng_for(seed)),
                config_applied: None,
            };
            println!("{}", serde_json::to_string_pretty(&outcome)?);
            Ok(())
        }
        Command::Generate { output, nodes, edge_probability, seed } => generate(&output, nodes, edge_probability, seed),
        Command::Status { dataset, weights } => {
            let registry = ModelRegistry::load_or_init(&weights, &NetworkConfig::default(), &mut SimRng::new(0));
            let service = ScenarioService::new(registry, GraphSource::File(dataset));
            println!("{}", serde_json::to_string_pretty(&service.status())?);
            Ok(())
        }
    }
}

fn rng_for(seed: Option<u64>) -> SimRng {
    match seed {
        Some(s) => SimRng::new(s),
        None => SimRng::from_entropy(),
    }
}

fn load_train_config(path: Option<&Path>) -> Result<TrainConfig> {
    match path {
        Some(p) => TrainConfig::from_toml(p).with_context(|| format!("loading training config {}", p.display())),
        None => Ok(TrainConfig::default()),
    }
}

// ── Subcommands ───────────────────────────────────────────────────────────────

fn train(config: TrainConfig) -> Result<()> {
    println!("=== maas train ===");
    println!("Dataset: {}  |  Epochs: {}", config.dataset_path.display(), config.epochs);

    let trainer = Trainer::new(config)?;
    let mut observer = LogObserver::new(trainer.config().log_interval, trainer.config().epochs);
    let t0 = Instant::now();

    let report = match trainer.train_and_save(&mut observer) {
        Ok(report) => report,
        Err(err) if err.is_dataset_unavailable() => {
            bail!("{err}\nrun `maas generate` first to write a dataset")
        }
        Err(err) => return Err(err.into()),
    };

    println!(
        "Loss {:.4} -> {:.4} over {} epochs in {:.1}s",
        report.initial_loss,
        report.final_loss,
        report.epochs,
        t0.elapsed().as_secs_f64()
    );
    if let Some(path) = &report.weights_path {
        println!("Parameters saved to {}", path.display());
    }
    Ok(())
}

fn simulate(
    scenario: &ScenarioConfig,
    network:  &NetworkConfig,
    dataset:  &Path,
    weights:  &Path,
    steps:    usize,
    seed:     Option<u64>,
) -> Result<()> {
    let mut rng = rng_for(seed);
    let registry = ModelRegistry::load_or_init(weights, network, &mut rng);
    let service = ScenarioService::new(registry, GraphSource::File(dataset.to_path_buf()));

    let mut failed = false;
    for step in 1..=steps.max(1) {
        let report = service.simulate_scenario(scenario, &mut rng);
        log::debug!("step {step}: success = {}", report.is_success());
        failed |= !report.is_success();
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    if failed {
        bail!("one or more simulation steps failed");
    }
    Ok(())
}

fn generate(output: &Path, nodes: usize, edge_probability: f64, seed: Option<u64>) -> Result<()> {
    let spec = SyntheticSpec { num_nodes: nodes, edge_probability, ..SyntheticSpec::default() };
    let network = spec.generate(&mut rng_for(seed))?;

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
    }
    write_dataset(output, &RawDataset::from_network(&network, "synthetic Erdős–Rényi"))?;
    println!(
        "Wrote {} nodes and {} edges to {}",
        network.node_count(),
        network.edge_count(),
        output.display()
    );
    Ok(())
}
