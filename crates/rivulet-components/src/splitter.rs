use std::collections::BTreeMap;

use rivulet_port::{Component, InPort, OutPort, Port, async_trait};
use serde_json::Value;

/// Copies every packet from `In` to each keyed outport `Out[key]`.
///
/// Outports are created on first lookup, so any key may be wired.
#[derive(Default)]
pub struct Splitter {
  input: InPort<Value>,
  outputs: BTreeMap<String, OutPort<Value>>,
}

impl Splitter {
  pub fn new() -> Self {
    Self::default()
  }
}

#[async_trait]
impl Component for Splitter {
  fn port(&mut self, name: &str, key: &str) -> Option<&mut dyn Port> {
    match name {
      "In" => Some(&mut self.input),
      "Out" if !key.is_empty() => Some(self.outputs.entry(key.to_string()).or_default()),
      _ => None,
    }
  }

  async fn run(self: Box<Self>) {
    while let Some(packet) = self.input.recv().await {
      for output in self.outputs.values() {
        let _ = output.send(packet.clone()).await;
      }
    }
  }
}
