//! Typed command payloads.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Identity reported by `runtime.getruntime`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeInfo {
  #[serde(rename = "type")]
  pub kind: String,
  pub version: String,
  pub capabilities: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Clear {
  pub id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AddNode {
  pub id: String,
  pub component: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Endpoint {
  pub node: String,
  pub port: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct EdgeMetadata {
  pub buffer: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AddEdge {
  pub src: Endpoint,
  pub tgt: Endpoint,
  #[serde(default)]
  pub metadata: Option<EdgeMetadata>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct InitialData {
  pub data: Value,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AddInitial {
  pub src: InitialData,
  pub tgt: Endpoint,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RemoveInitial {
  pub tgt: Endpoint,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ExposePort {
  pub public: String,
  pub node: String,
  pub port: String,
}
