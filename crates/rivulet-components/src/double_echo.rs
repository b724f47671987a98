use rivulet_graph::{GraphError, Network, NetworkConfig};

use crate::echo::Echo;

/// A subgraph of two echoes in series, exposing `In` and `Out`.
pub fn double_echo(config: NetworkConfig) -> Result<Network, GraphError> {
  let mut net = Network::new(config);
  net.add("e1", Echo::new())?;
  net.add("e2", Echo::new())?;
  net.connect("e1", "Out", "e2", "In")?;
  net.map_in_port("In", "e1", "In")?;
  net.map_out_port("Out", "e2", "Out")?;
  Ok(net)
}
