use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single protocol message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
  /// One of `runtime`, `component`, `graph` or `network`.
  pub protocol: String,
  pub command: String,
  #[serde(default)]
  pub payload: Value,
}

impl Message {
  pub fn new(protocol: impl Into<String>, command: impl Into<String>, payload: Value) -> Self {
    Self {
      protocol: protocol.into(),
      command: command.into(),
      payload,
    }
  }

  /// Handler key, `protocol.command`.
  pub fn key(&self) -> String {
    format!("{}.{}", self.protocol, self.command)
  }
}
