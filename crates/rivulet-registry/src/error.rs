use thiserror::Error;

/// Errors that can occur when working with a component registry.
#[derive(Debug, Error)]
pub enum RegistryError {
  /// No constructor is registered under the name.
  #[error("component type not found: {name}")]
  TypeNotFound { name: String },

  /// A constructor is already registered under the name.
  #[error("component type already registered: {name}")]
  DuplicateName { name: String },

  /// The registry holds as many types as it is configured for.
  #[error("registry is full ({capacity} types)")]
  RegistryFull { capacity: usize },
}
