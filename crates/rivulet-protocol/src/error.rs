use rivulet_graph::GraphError;

/// Errors raised while handling a protocol message.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
  /// No handler is registered for `protocol.command`.
  #[error("unknown command: {key}")]
  UnknownCommand { key: String },

  /// The payload does not have the shape the command expects.
  #[error("invalid payload for {command}: {source}")]
  InvalidPayload {
    command: String,
    #[source]
    source: serde_json::Error,
  },

  /// The graph rejected the command.
  #[error(transparent)]
  Graph(#[from] GraphError),

  /// No network has been started.
  #[error("network is not running")]
  NotRunning,
}
