//! Parameter file I/O.
//!
//! The file is the JSON encoding of a whole [`MaasGraphNetwork`]: the
//! architecture config followed by every tensor.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use maas_core::SimRng;

use crate::layers::Parameterized;
use crate::network::{MaasGraphNetwork, NetworkConfig};
use crate::{GnnError, GnnResult};

/// Where a network's parameters came from.
#[derive(Clone, Debug, PartialEq)]
pub enum ParamSource {
    /// Loaded from a trained parameter file.
    Trained(PathBuf),
    /// Randomly initialised because the file could not be used.
    Untrained { reason: String },
}

impl ParamSource {
    pub fn is_trained(&self) -> bool {
        matches!(self, ParamSource::Trained(_))
    }
}

impl MaasGraphNetwork {
    /// Write the network to `path`, creating parent directories.
    ///
    /// NaN or infinite parameters are rejected before anything is written;
    /// JSON would encode them as `null` and the file could not be loaded.
    pub fn save(&self, path: &Path) -> GnnResult<()> {
        if !self.params.is_finite() {
            return Err(GnnError::NonFinite { path: path.to_path_buf() });
        }
        let write_err = |source| GnnError::Write { path: path.to_path_buf(), source };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        let mut writer = BufWriter::new(File::create(path).map_err(write_err)?);
        serde_json::to_writer(&mut writer, self)?;
        writer.flush().map_err(write_err)?;
        log::debug!("saved network parameters to {}", path.display());
        Ok(())
    }

    /// Read a network from `path` and check its tensors against its own
    /// config.
    pub fn load(path: &Path) -> GnnResult<Self> {
        let file = File::open(path).map_err(|source| GnnError::Read { path: path.to_path_buf(), source })?;
        let network: Self = serde_json::from_reader(BufReader::new(file))
            .map_err(|source| GnnError::Decode { path: path.to_path_buf(), source })?;
        if let Some(reason) = network.params.shape_mismatch(&network.config) {
            return Err(GnnError::Incompatible { path: path.to_path_buf(), reason });
        }
        Ok(network)
    }

    /// Read a network from `path`, requiring it to match `expected`.
    pub fn load_compatible(path: &Path, expected: &NetworkConfig) -> GnnResult<Self> {
        let network = Self::load(path)?;
        if network.config.in_channels != expected.in_channels
            || network.config.hidden_channels != expected.hidden_channels
            || network.config.heads != expected.heads
            || network.config.out_channels != expected.out_channels
            || network.config.edge_dim != expected.edge_dim
        {
            return Err(GnnError::Incompatible {
                path:   path.to_path_buf(),
                reason: format!("stored architecture {:?} differs from {:?}", network.config, expected),
            });
        }
        Ok(network)
    }

    /// Load trained parameters if possible, otherwise fall back to a fresh
    /// network and log a warning.
    pub fn load_or_init(path: &Path, config: &NetworkConfig, rng: &mut SimRng) -> (Self, ParamSource) {
        match Self::load_compatible(path, config) {
            Ok(network) => {
                log::info!("loaded trained network parameters from {}", path.display());
                (network, ParamSource::Trained(path.to_path_buf()))
            }
            Err(err) => {
                log::warn!("using untrained network parameters: {err}");
                (Self::new(config.clone(), rng), ParamSource::Untrained { reason: err.to_string() })
            }
        }
    }
}
