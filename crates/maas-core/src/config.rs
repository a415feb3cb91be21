//! TOML-backed configuration loading.
//!
//! Configuration structs (`TrainConfig`, `ScenarioConfig`) carry
//! `#[serde(default)]` so a file only needs to name the fields it overrides.

use std::path::Path;

use serde::de::DeserializeOwned;

use crate::{MaasError, MaasResult};

/// Read and deserialize a TOML file into `T`.
pub fn load_toml<T: DeserializeOwned>(path: &Path) -> MaasResult<T> {
    let text = std::fs::read_to_string(path)?;
    parse_toml(&text, path)
}

/// Deserialize TOML text; `origin` is only used in error messages.
pub fn parse_toml<T: DeserializeOwned>(text: &str, origin: &Path) -> MaasResult<T> {
    toml::from_str(text).map_err(|source| MaasError::Toml {
        path: origin.to_path_buf(),
        source,
    })
}
