//! Settings file.

use std::path::Path;

use anyhow::{Context, Result};
use rivulet_graph::NetworkConfig;
use rivulet_registry::RegistryConfig;
use serde::Deserialize;

/// Contents of the JSON settings file. Every section is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
  pub network: NetworkConfig,
  pub registry: RegistryConfig,
  /// Log filter directive used when neither `--log` nor `RUST_LOG` is set.
  pub log_filter: Option<String>,
}

impl Settings {
  /// Load settings from `path`, or defaults when no path is given.
  pub fn load(path: Option<&Path>) -> Result<Self> {
    let Some(path) = path else {
      return Ok(Self::default());
    };

    let content = std::fs::read_to_string(path)
      .with_context(|| format!("failed to read settings file: {}", path.display()))?;
    serde_json::from_str(&content)
      .with_context(|| format!("failed to parse settings file: {}", path.display()))
  }
}
