use rivulet_port::{Component, InPort, OutPort, Port, async_trait};
use serde_json::Value;

/// Forwards every packet from `In` to `Out`.
#[derive(Default)]
pub struct Echo {
  input: InPort<Value>,
  output: OutPort<Value>,
}

impl Echo {
  pub fn new() -> Self {
    Self::default()
  }
}

#[async_trait]
impl Component for Echo {
  fn port(&mut self, name: &str, _key: &str) -> Option<&mut dyn Port> {
    match name {
      "In" => Some(&mut self.input),
      "Out" => Some(&mut self.output),
      _ => None,
    }
  }

  async fn run(self: Box<Self>) {
    while let Some(packet) = self.input.recv().await {
      // An unconnected output discards.
      let _ = self.output.send(packet).await;
    }
  }
}
