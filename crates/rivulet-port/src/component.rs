use async_trait::async_trait;

use crate::port::Port;

/// A self-contained unit of work with named ports.
///
/// The wiring engine binds channels through [`Component::port`] before the
/// network starts, then hands the component to the scheduler, which calls
/// [`Component::run`] once.
#[async_trait]
pub trait Component: Send + 'static {
  /// Resolve the endpoint named `name`. `key` is the bracketed index of a
  /// keyed port and is empty otherwise.
  fn port(&mut self, name: &str, key: &str) -> Option<&mut dyn Port>;

  /// Whether the engine may bind channels to this component's ports.
  fn is_settable(&self) -> bool {
    true
  }

  /// Run until the component has nothing left to do. The component is
  /// consumed, so every endpoint it owns is released when this returns.
  async fn run(self: Box<Self>);
}
