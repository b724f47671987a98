use serde::{Deserialize, Serialize};

/// Registry settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
  /// Maximum number of registered types. Unbounded when absent.
  pub capacity: Option<usize>,
}
