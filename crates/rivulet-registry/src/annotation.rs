use serde::{Deserialize, Serialize};

/// Descriptive metadata shown to clients listing component types.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
  #[serde(default)]
  pub description: String,

  /// Icon name, in whatever vocabulary the client uses.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub icon: Option<String>,
}

impl Annotation {
  pub fn new(description: impl Into<String>) -> Self {
    Self {
      description: description.into(),
      icon: None,
    }
  }

  pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
    self.icon = Some(icon.into());
    self
  }
}
