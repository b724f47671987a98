use std::fmt;

use futures::FutureExt;
use futures::future::BoxFuture;
use rivulet_port::Component;

use crate::network::Network;

/// A node of a network: either a leaf component or a nested network.
pub enum Process {
  Component(Box<dyn Component>),
  Network(Box<Network>),
}

impl Process {
  pub fn component(component: impl Component) -> Self {
    Process::Component(Box::new(component))
  }

  pub fn network(network: Network) -> Self {
    Process::Network(Box::new(network))
  }

  pub fn is_network(&self) -> bool {
    matches!(self, Process::Network(_))
  }

  /// Whether the engine may bind channels to this process.
  pub fn is_settable(&self) -> bool {
    match self {
      Process::Component(component) => component.is_settable(),
      Process::Network(_) => true,
    }
  }

  /// Run the process to completion. A nested network is started with its
  /// own scheduler and awaited.
  pub(crate) fn run(self) -> BoxFuture<'static, ()> {
    match self {
      Process::Component(component) => component.run(),
      Process::Network(network) => async move { (*network).run().wait().await }.boxed(),
    }
  }
}

impl From<Network> for Process {
  fn from(network: Network) -> Self {
    Process::network(network)
  }
}

impl fmt::Debug for Process {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Process::Component(_) => f.write_str("Component(..)"),
      Process::Network(network) => f.debug_tuple("Network").field(network).finish(),
    }
  }
}
