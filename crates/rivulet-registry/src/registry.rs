//! Component type registry.
//!
//! Maps type names to constructors. A registry is shared between networks
//! through an `Arc`; every method takes `&self` and the table is guarded by
//! a read/write lock.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use serde::Serialize;
use tracing::debug;

use crate::annotation::Annotation;
use crate::config::RegistryConfig;
use crate::error::RegistryError;

/// Builds a fresh instance of a registered type.
pub type Constructor<T> = Arc<dyn Fn() -> T + Send + Sync>;

struct Entry<T> {
  constructor: Constructor<T>,
  annotation: Option<Annotation>,
}

/// A registered type as reported by [`Registry::list`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisteredType {
  pub name: String,
  pub annotation: Option<Annotation>,
}

pub struct Registry<T> {
  config: RegistryConfig,
  entries: RwLock<HashMap<String, Entry<T>>>,
}

impl<T> Registry<T> {
  pub fn new() -> Self {
    Self::with_config(RegistryConfig::default())
  }

  pub fn with_config(config: RegistryConfig) -> Self {
    Self {
      config,
      entries: RwLock::new(HashMap::new()),
    }
  }

  pub fn config(&self) -> &RegistryConfig {
    &self.config
  }

  /// Register a constructor under `name`.
  pub fn register<F>(
    &self,
    name: impl Into<String>,
    constructor: F,
    annotation: Option<Annotation>,
  ) -> Result<(), RegistryError>
  where
    F: Fn() -> T + Send + Sync + 'static,
  {
    let name = name.into();
    let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);

    if entries.contains_key(&name) {
      return Err(RegistryError::DuplicateName { name });
    }
    if let Some(capacity) = self.config.capacity
      && entries.len() >= capacity
    {
      return Err(RegistryError::RegistryFull { capacity });
    }

    debug!(name = %name, "component_type_registered");
    entries.insert(
      name,
      Entry {
        constructor: Arc::new(constructor),
        annotation,
      },
    );
    Ok(())
  }

  /// Build a new instance of the type registered under `name`.
  pub fn create(&self, name: &str) -> Result<T, RegistryError> {
    let constructor = {
      let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
      match entries.get(name) {
        Some(entry) => entry.constructor.clone(),
        None => {
          return Err(RegistryError::TypeNotFound {
            name: name.to_string(),
          });
        }
      }
    };

    // Constructors may themselves consult the registry.
    Ok(constructor())
  }

  /// Replace the annotation of a registered type.
  pub fn annotate(&self, name: &str, annotation: Annotation) -> Result<(), RegistryError> {
    let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
    let entry = entries
      .get_mut(name)
      .ok_or_else(|| RegistryError::TypeNotFound {
        name: name.to_string(),
      })?;
    entry.annotation = Some(annotation);
    Ok(())
  }

  pub fn unregister(&self, name: &str) -> Result<(), RegistryError> {
    let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
    match entries.remove(name) {
      Some(_) => {
        debug!(name, "component_type_unregistered");
        Ok(())
      }
      None => Err(RegistryError::TypeNotFound {
        name: name.to_string(),
      }),
    }
  }

  pub fn annotation(&self, name: &str) -> Option<Annotation> {
    let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
    entries.get(name).and_then(|entry| entry.annotation.clone())
  }

  pub fn contains(&self, name: &str) -> bool {
    let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
    entries.contains_key(name)
  }

  pub fn len(&self) -> usize {
    self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// All registered types, sorted by name.
  pub fn list(&self) -> Vec<RegisteredType> {
    let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
    let mut types: Vec<RegisteredType> = entries
      .iter()
      .map(|(name, entry)| RegisteredType {
        name: name.clone(),
        annotation: entry.annotation.clone(),
      })
      .collect();
    types.sort_by(|a, b| a.name.cmp(&b.name));
    types
  }
}

impl<T> Default for Registry<T> {
  fn default() -> Self {
    Self::new()
  }
}
