//! Network: a named set of processes, the connections between them, and the
//! ports the network exposes to its parent.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use rivulet_port::{Address, AnyChannel, ChannelId, Component, Direction, Port};
use tracing::debug;

use crate::Factory;
use crate::config::NetworkConfig;
use crate::connect::Connection;
use crate::error::GraphError;
use crate::iip::Iip;
use crate::process::Process;
use crate::refcount::SenderRefTable;

pub struct Network {
  pub(crate) config: NetworkConfig,
  pub(crate) processes: BTreeMap<String, Process>,
  pub(crate) connections: Vec<Connection>,
  pub(crate) in_ports: HashMap<String, Address>,
  pub(crate) out_ports: HashMap<String, Address>,
  pub(crate) iips: HashMap<Address, Iip>,
  pub(crate) sender_refs: SenderRefTable,
}

impl Network {
  pub fn new(config: NetworkConfig) -> Self {
    Self {
      config,
      processes: BTreeMap::new(),
      connections: Vec::new(),
      in_ports: HashMap::new(),
      out_ports: HashMap::new(),
      iips: HashMap::new(),
      sender_refs: SenderRefTable::default(),
    }
  }

  /// Add a leaf component under `name`.
  pub fn add(&mut self, name: &str, component: impl Component) -> Result<(), GraphError> {
    self.add_process(name, Process::component(component))
  }

  /// Add a nested network under `name`.
  pub fn add_network(&mut self, name: &str, network: Network) -> Result<(), GraphError> {
    self.add_process(name, Process::network(network))
  }

  pub fn add_process(&mut self, name: &str, process: Process) -> Result<(), GraphError> {
    if self.processes.contains_key(name) {
      return Err(GraphError::DuplicateName {
        name: name.to_string(),
      });
    }
    debug!(process = name, subnet = process.is_network(), "process_added");
    self.processes.insert(name.to_string(), process);
    Ok(())
  }

  /// Create a process of `type_name` from the factory and add it as `name`.
  pub fn add_new(&mut self, name: &str, type_name: &str, factory: &Factory) -> Result<(), GraphError> {
    if self.processes.contains_key(name) {
      return Err(GraphError::DuplicateName {
        name: name.to_string(),
      });
    }
    let process = factory.create(type_name)?;
    self.add_process(name, process)
  }

  /// Expose the receive endpoint `process.port` as the inport `name`.
  pub fn map_in_port(&mut self, name: &str, process: &str, port: &str) -> Result<(), GraphError> {
    let target = Address::parse(process, port);
    self.check_mappable(&target, Direction::Receive)?;
    debug!(name, target = %target, "inport_mapped");
    self.in_ports.insert(name.to_string(), target);
    Ok(())
  }

  /// Expose the send endpoint `process.port` as the outport `name`.
  pub fn map_out_port(&mut self, name: &str, process: &str, port: &str) -> Result<(), GraphError> {
    let target = Address::parse(process, port);
    self.check_mappable(&target, Direction::Send)?;
    debug!(name, target = %target, "outport_mapped");
    self.out_ports.insert(name.to_string(), target);
    Ok(())
  }

  fn check_mappable(&mut self, target: &Address, direction: Direction) -> Result<(), GraphError> {
    self
      .inspect(target, direction)
      .map(|_| ())
      .map_err(|err| unresolved_as_port_not_found(err, target))
  }

  /// Internal address exposed as the inport `name`.
  pub fn in_port(&self, name: &str) -> Option<&Address> {
    self.in_ports.get(name)
  }

  /// Internal address exposed as the outport `name`.
  pub fn out_port(&self, name: &str) -> Option<&Address> {
    self.out_ports.get(name)
  }

  pub fn process_names(&self) -> impl Iterator<Item = &str> {
    self.processes.keys().map(String::as_str)
  }

  pub fn connections(&self) -> &[Connection] {
    &self.connections
  }

  pub fn len(&self) -> usize {
    self.processes.len()
  }

  pub fn is_empty(&self) -> bool {
    self.processes.is_empty()
  }

  /// Start tracking one more sender of `channel`. Returns the new count.
  pub fn inc_sender_ref(&self, channel: &AnyChannel) -> usize {
    self.sender_refs.inc(channel)
  }

  /// Release one sender of the channel. Returns `true` when the caller
  /// should close it.
  pub fn dec_sender_ref(&self, id: ChannelId) -> bool {
    self.sender_refs.dec(id)
  }

  pub fn sender_ref_count(&self, id: ChannelId) -> usize {
    self.sender_refs.count(id)
  }

  /// Resolve `address` to an endpoint, descending into nested networks
  /// through their exposed ports.
  pub(crate) fn resolve_port(
    &mut self,
    address: &Address,
    direction: Direction,
  ) -> Result<&mut dyn Port, GraphError> {
    let process = self
      .processes
      .get_mut(&address.process)
      .ok_or_else(|| GraphError::ProcessNotFound {
        process: address.process.clone(),
      })?;

    if !process.is_settable() {
      return Err(GraphError::ProcessNotSettable {
        process: address.process.clone(),
      });
    }

    match process {
      Process::Component(component) => {
        component
          .port(&address.port, &address.key)
          .ok_or_else(|| port_not_found(address))
      }
      Process::Network(network) => {
        let exposed = exposed_name(address);
        let target = match direction {
          Direction::Receive => network.in_ports.get(&exposed),
          _ => network.out_ports.get(&exposed),
        }
        .cloned()
        .ok_or_else(|| port_not_found(address))?;
        network.resolve_port(&target, direction)
      }
    }
  }
}

impl Default for Network {
  fn default() -> Self {
    Self::new(NetworkConfig::default())
  }
}

impl fmt::Debug for Network {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Network")
      .field("processes", &self.processes.keys().collect::<Vec<_>>())
      .field("connections", &self.connections.len())
      .field("in_ports", &self.in_ports)
      .field("out_ports", &self.out_ports)
      .field("iips", &self.iips.len())
      .finish()
  }
}

/// Name a nested network's port is exposed under, e.g. `Out` or `Out[a]`.
fn exposed_name(address: &Address) -> String {
  if address.key.is_empty() {
    address.port.clone()
  } else {
    format!("{}[{}]", address.port, address.key)
  }
}

pub(crate) fn port_not_found(address: &Address) -> GraphError {
  GraphError::PortNotFound {
    process: address.process.clone(),
    port: exposed_name(address),
  }
}

/// Mapping and IIP targets report a missing process as a missing port.
pub(crate) fn unresolved_as_port_not_found(err: GraphError, address: &Address) -> GraphError {
  match err {
    GraphError::ProcessNotFound { .. } => port_not_found(address),
    other => other,
  }
}
