use rivulet_port::{Component, InPort, Port, async_trait};
use serde_json::Value;
use tokio::io::{AsyncWrite, AsyncWriteExt, Stdout};
use tracing::warn;

/// Writes every packet from `In` as one JSON line.
pub struct Output<W = Stdout> {
  input: InPort<Value>,
  writer: W,
}

impl Output {
  /// An output printing to standard output.
  pub fn new() -> Self {
    Self::with_writer(tokio::io::stdout())
  }
}

impl Default for Output {
  fn default() -> Self {
    Self::new()
  }
}

impl<W> Output<W>
where
  W: AsyncWrite + Unpin + Send + 'static,
{
  pub fn with_writer(writer: W) -> Self {
    Self {
      input: InPort::new(),
      writer,
    }
  }
}

#[async_trait]
impl<W> Component for Output<W>
where
  W: AsyncWrite + Unpin + Send + 'static,
{
  fn port(&mut self, name: &str, _key: &str) -> Option<&mut dyn Port> {
    match name {
      "In" => Some(&mut self.input),
      _ => None,
    }
  }

  async fn run(self: Box<Self>) {
    let Output { input, mut writer } = *self;

    while let Some(packet) = input.recv().await {
      let mut line = packet.to_string();
      line.push('\n');
      if let Err(err) = writer.write_all(line.as_bytes()).await {
        warn!(error = %err, "output_write_failed");
        continue;
      }
      if let Err(err) = writer.flush().await {
        warn!(error = %err, "output_flush_failed");
      }
    }
  }
}
