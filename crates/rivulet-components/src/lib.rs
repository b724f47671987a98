//! Stock components for rivulet networks.
//!
//! Every port carries [`serde_json::Value`] packets, so these components can
//! be wired freely with each other and fed from JSON initial packets.

mod double_echo;
mod echo;
mod output;
mod repeat;
mod splitter;

pub use double_echo::double_echo;
pub use echo::Echo;
pub use output::Output;
pub use repeat::Repeat;
pub use splitter::Splitter;

use rivulet_graph::{Factory, GraphError, Network, NetworkConfig, Process};
use rivulet_registry::Annotation;
use tracing::error;

/// Register every stock component type with `factory`. Subgraphs are built
/// with `config`.
pub fn register_all(factory: &Factory, config: NetworkConfig) -> Result<(), GraphError> {
  factory.register(
    "core/echo",
    || Process::component(Echo::new()),
    Some(Annotation::new("Forwards every packet unchanged").with_icon("arrow-right")),
  )?;
  factory.register(
    "core/repeat",
    || Process::component(Repeat::new()),
    Some(Annotation::new("Repeats the last word by the last count").with_icon("repeat")),
  )?;
  factory.register(
    "core/splitter",
    || Process::component(Splitter::new()),
    Some(Annotation::new("Copies every packet to each keyed output").with_icon("share-alt")),
  )?;
  factory.register(
    "core/output",
    || Process::component(Output::new()),
    Some(Annotation::new("Prints every packet as a JSON line").with_icon("terminal")),
  )?;

  // Wire the subgraph once up front so a broken definition fails here.
  double_echo(config.clone())?;
  factory.register(
    "core/doubleecho",
    move || match double_echo(config.clone()) {
      Ok(net) => Process::network(net),
      Err(err) => {
        error!(error = %err, "subgraph_wiring_failed");
        Process::network(Network::new(config.clone()))
      }
    },
    Some(Annotation::new("Two echoes in series").with_icon("arrows-h")),
  )?;

  Ok(())
}
