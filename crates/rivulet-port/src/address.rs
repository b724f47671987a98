use std::fmt;

/// A fully qualified port accessor within a network.
///
/// `key` selects an element of an indexed or keyed port and is parsed from a
/// bracketed suffix, e.g. `Out[left]`. It is empty for plain ports.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Address {
  pub process: String,
  pub port: String,
  pub key: String,
}

impl Address {
  /// Parse a port name that may carry a `[key]` suffix.
  pub fn parse(process: &str, port: &str) -> Self {
    let (port, key) = match port.split_once('[') {
      Some((bare, rest)) => {
        let key = rest.split_once(']').map(|(key, _)| key).unwrap_or("");
        (bare, key)
      }
      None => (port, ""),
    };

    Self {
      process: process.to_string(),
      port: port.to_string(),
      key: key.to_string(),
    }
  }

  /// Address of a network boundary port: no process, just the exposed name.
  pub fn external(port: &str) -> Self {
    Self::parse("", port)
  }

  /// Whether this address names a network boundary port.
  pub fn is_external(&self) -> bool {
    self.process.is_empty()
  }
}

impl fmt::Display for Address {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if !self.process.is_empty() {
      write!(f, "{}.", self.process)?;
    }
    f.write_str(&self.port)?;
    if !self.key.is_empty() {
      write!(f, "[{}]", self.key)?;
    }
    Ok(())
  }
}
