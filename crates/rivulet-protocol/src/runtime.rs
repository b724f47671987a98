//! Protocol runtime.
//!
//! A [`Runtime`] owns the graph currently being built by a client and, once
//! started, the completion handle of the running network. Commands are
//! dispatched through a handler table keyed by `protocol.command`.

use std::collections::HashMap;
use std::sync::Arc;

use rivulet_graph::{Factory, Network, NetworkConfig, Wait};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, info};

use crate::error::ProtocolError;
use crate::message::Message;
use crate::payload::{
  AddEdge, AddInitial, AddNode, Clear, ExposePort, RemoveInitial, RuntimeInfo,
};

type Handler = fn(&mut Runtime, &str, Value) -> Result<Vec<Message>, ProtocolError>;

const CAPABILITIES: [&str; 4] = [
  "protocol:runtime",
  "protocol:graph",
  "protocol:component",
  "protocol:network",
];

pub struct Runtime {
  factory: Arc<Factory>,
  config: NetworkConfig,
  graph_id: Option<String>,
  graph: Network,
  running: Option<Wait>,
  handlers: HashMap<&'static str, Handler>,
}

impl Runtime {
  pub fn new(factory: Arc<Factory>, config: NetworkConfig) -> Self {
    let mut handlers: HashMap<&'static str, Handler> = HashMap::new();
    handlers.insert("runtime.getruntime", Runtime::get_runtime);
    handlers.insert("component.list", Runtime::list_components);
    handlers.insert("graph.clear", Runtime::clear);
    handlers.insert("graph.addnode", Runtime::add_node);
    handlers.insert("graph.addedge", Runtime::add_edge);
    handlers.insert("graph.addinitial", Runtime::add_initial);
    handlers.insert("graph.removeinitial", Runtime::remove_initial);
    handlers.insert("graph.addinport", Runtime::add_inport);
    handlers.insert("graph.addoutport", Runtime::add_outport);
    handlers.insert("network.start", Runtime::start);
    handlers.insert("network.getstatus", Runtime::status);

    Self {
      graph: Network::new(config.clone()),
      factory,
      config,
      graph_id: None,
      running: None,
      handlers,
    }
  }

  /// Identity descriptor of this runtime.
  pub fn info() -> RuntimeInfo {
    RuntimeInfo {
      kind: "rivulet".to_string(),
      version: env!("CARGO_PKG_VERSION").to_string(),
      capabilities: CAPABILITIES.iter().map(|c| c.to_string()).collect(),
    }
  }

  /// Handle one message, returning the replies to send back.
  ///
  /// `network.start` spawns onto the current tokio runtime.
  pub fn handle(&mut self, msg: Message) -> Result<Vec<Message>, ProtocolError> {
    let key = msg.key();
    let handler = *self
      .handlers
      .get(key.as_str())
      .ok_or_else(|| ProtocolError::UnknownCommand { key: key.clone() })?;

    debug!(command = %key, "protocol_command");
    handler(self, &msg.command, msg.payload)
  }

  /// Completion handle of the most recently started network.
  pub fn wait(&self) -> Result<Wait, ProtocolError> {
    self.running.clone().ok_or(ProtocolError::NotRunning)
  }

  /// The graph currently being built.
  pub fn graph(&self) -> &Network {
    &self.graph
  }

  fn get_runtime(&mut self, _: &str, _: Value) -> Result<Vec<Message>, ProtocolError> {
    let info = serde_json::to_value(Runtime::info()).map_err(|source| {
      ProtocolError::InvalidPayload {
        command: "getruntime".to_string(),
        source,
      }
    })?;
    Ok(vec![Message::new("runtime", "runtime", info)])
  }

  fn list_components(&mut self, _: &str, _: Value) -> Result<Vec<Message>, ProtocolError> {
    let types = self.factory.list();
    let count = types.len();

    let mut replies: Vec<Message> = types
      .into_iter()
      .map(|t| {
        let annotation = t.annotation.unwrap_or_default();
        Message::new(
          "component",
          "component",
          json!({
            "name": t.name,
            "description": annotation.description,
            "icon": annotation.icon,
          }),
        )
      })
      .collect();
    replies.push(Message::new("component", "componentsready", json!(count)));
    Ok(replies)
  }

  fn clear(&mut self, command: &str, payload: Value) -> Result<Vec<Message>, ProtocolError> {
    let clear: Clear = parse(command, &payload)?;
    debug!(graph = %clear.id, "graph_cleared");
    self.graph = Network::new(self.config.clone());
    self.graph_id = Some(clear.id);
    Ok(vec![echo(command, payload)])
  }

  fn add_node(&mut self, command: &str, payload: Value) -> Result<Vec<Message>, ProtocolError> {
    let node: AddNode = parse(command, &payload)?;
    self.graph.add_new(&node.id, &node.component, &self.factory)?;
    Ok(vec![echo(command, payload)])
  }

  fn add_edge(&mut self, command: &str, payload: Value) -> Result<Vec<Message>, ProtocolError> {
    let edge: AddEdge = parse(command, &payload)?;
    match edge.metadata.and_then(|m| m.buffer) {
      Some(buffer) => self.graph.connect_buf(
        &edge.src.node,
        &edge.src.port,
        &edge.tgt.node,
        &edge.tgt.port,
        buffer,
      )?,
      None => self.graph.connect(
        &edge.src.node,
        &edge.src.port,
        &edge.tgt.node,
        &edge.tgt.port,
      )?,
    }
    Ok(vec![echo(command, payload)])
  }

  fn add_initial(&mut self, command: &str, payload: Value) -> Result<Vec<Message>, ProtocolError> {
    let initial: AddInitial = parse(command, &payload)?;
    self
      .graph
      .add_iip(&initial.tgt.node, &initial.tgt.port, initial.src.data)?;
    Ok(vec![echo(command, payload)])
  }

  fn remove_initial(
    &mut self,
    command: &str,
    payload: Value,
  ) -> Result<Vec<Message>, ProtocolError> {
    let initial: RemoveInitial = parse(command, &payload)?;
    self
      .graph
      .remove_iip(&initial.tgt.node, &initial.tgt.port)?;
    Ok(vec![echo(command, payload)])
  }

  fn add_inport(&mut self, command: &str, payload: Value) -> Result<Vec<Message>, ProtocolError> {
    let port: ExposePort = parse(command, &payload)?;
    self.graph.map_in_port(&port.public, &port.node, &port.port)?;
    Ok(vec![echo(command, payload)])
  }

  fn add_outport(&mut self, command: &str, payload: Value) -> Result<Vec<Message>, ProtocolError> {
    let port: ExposePort = parse(command, &payload)?;
    self
      .graph
      .map_out_port(&port.public, &port.node, &port.port)?;
    Ok(vec![echo(command, payload)])
  }

  fn start(&mut self, _: &str, _: Value) -> Result<Vec<Message>, ProtocolError> {
    let graph = std::mem::replace(&mut self.graph, Network::new(self.config.clone()));
    info!(graph = ?self.graph_id, processes = graph.len(), "network_start_requested");
    self.running = Some(graph.run());
    Ok(vec![Message::new(
      "network",
      "started",
      json!({ "graph": self.graph_id }),
    )])
  }

  fn status(&mut self, _: &str, _: Value) -> Result<Vec<Message>, ProtocolError> {
    let started = self.running.is_some();
    let running = self.running.as_ref().is_some_and(|wait| !wait.is_done());
    Ok(vec![Message::new(
      "network",
      "status",
      json!({
        "graph": self.graph_id,
        "started": started,
        "running": running,
      }),
    )])
  }
}

fn parse<T: DeserializeOwned>(command: &str, payload: &Value) -> Result<T, ProtocolError> {
  T::deserialize(payload).map_err(|source| ProtocolError::InvalidPayload {
    command: command.to_string(),
    source,
  })
}

fn echo(command: &str, payload: Value) -> Message {
  Message::new("graph", command, payload)
}
