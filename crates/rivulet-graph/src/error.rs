//! Graph error types.

use rivulet_registry::RegistryError;

/// Errors raised while building or wiring a network.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
  /// No process with the name exists in the network.
  #[error("process not found: {process}")]
  ProcessNotFound { process: String },

  /// The process exists but has no such port.
  #[error("port not found: {process}.{port}")]
  PortNotFound { process: String, port: String },

  /// The process manages its own channels and cannot be wired.
  #[error("process '{process}' does not accept channel bindings")]
  ProcessNotSettable { process: String },

  /// The endpoint exists but cannot be used the way it was asked to.
  #[error("invalid port '{address}': {reason}")]
  InvalidPort { address: String, reason: String },

  /// Both endpoints are already bound to different channels.
  #[error("ports already in use: {sender} and {receiver} are bound to different channels")]
  PortsAlreadyInUse { sender: String, receiver: String },

  /// A process with the name already exists in the network.
  #[error("duplicate process name: {name}")]
  DuplicateName { name: String },

  /// Creating a process from the factory failed.
  #[error(transparent)]
  Registry(#[from] RegistryError),

  /// No IIP is pending for the address.
  #[error("no initial packet for {address}")]
  IipNotFound { address: String },
}
