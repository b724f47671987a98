use serde::{Deserialize, Serialize};

/// Network settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
  /// Capacity of channels created by `connect` and by IIP delivery.
  /// Zero means unbuffered.
  pub buffer_size: usize,
}
