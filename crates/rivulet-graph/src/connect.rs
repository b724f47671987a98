//! Connection engine.
//!
//! Connecting two endpoints picks a channel for them: the receiver's if it
//! already has one (fan-in), else the sender's, else a new one. Every sender
//! newly bound to a channel is counted, so the channel closes only after the
//! last of its senders is done.

use rivulet_port::{Address, AnyChannel, Channel, Direction, ElementType};
use tracing::debug;

use crate::error::GraphError;
use crate::network::{Network, port_not_found};

/// A recorded link between two addresses.
#[derive(Debug, Clone)]
pub struct Connection {
  sender: Address,
  receiver: Address,
  channel: AnyChannel,
  buffer_size: usize,
}

impl Connection {
  pub fn sender(&self) -> &Address {
    &self.sender
  }

  pub fn receiver(&self) -> &Address {
    &self.receiver
  }

  pub fn channel(&self) -> &AnyChannel {
    &self.channel
  }

  pub fn buffer_size(&self) -> usize {
    self.buffer_size
  }
}

/// Snapshot of a validated endpoint.
pub(crate) struct Endpoint {
  pub(crate) element: ElementType,
  pub(crate) channel: Option<AnyChannel>,
}

impl Network {
  /// Connect `sender_process.sender_port` to `receiver_process.receiver_port`
  /// using the network's default buffer size.
  pub fn connect(
    &mut self,
    sender_process: &str,
    sender_port: &str,
    receiver_process: &str,
    receiver_port: &str,
  ) -> Result<(), GraphError> {
    let buffer_size = self.config.buffer_size;
    self.connect_buf(
      sender_process,
      sender_port,
      receiver_process,
      receiver_port,
      buffer_size,
    )
  }

  /// Connect two endpoints, creating a channel of `buffer_size` if neither
  /// side is bound yet.
  pub fn connect_buf(
    &mut self,
    sender_process: &str,
    sender_port: &str,
    receiver_process: &str,
    receiver_port: &str,
    buffer_size: usize,
  ) -> Result<(), GraphError> {
    let sender = Address::parse(sender_process, sender_port);
    let receiver = Address::parse(receiver_process, receiver_port);

    let send_side = self.inspect(&sender, Direction::Send)?;
    let recv_side = self.inspect(&receiver, Direction::Receive)?;

    if send_side.element != recv_side.element {
      return Err(GraphError::InvalidPort {
        address: receiver.to_string(),
        reason: format!(
          "element type mismatch: {} sends {}, {} receives {}",
          sender, send_side.element, receiver, recv_side.element
        ),
      });
    }

    let bind_sender = send_side.channel.is_none();
    let bind_receiver = recv_side.channel.is_none();
    let channel = match (send_side.channel, recv_side.channel) {
      (Some(s), Some(r)) if s.id() != r.id() => {
        return Err(GraphError::PortsAlreadyInUse {
          sender: sender.to_string(),
          receiver: receiver.to_string(),
        });
      }
      (_, Some(r)) => r,
      (Some(s), None) => s,
      (None, None) => self
        .resolve_port(&sender, Direction::Send)?
        .make_channel(buffer_size),
    };

    if bind_sender {
      self.bind(&sender, Direction::Send, &channel)?;
    }
    if bind_receiver {
      self.bind(&receiver, Direction::Receive, &channel)?;
    }

    debug!(
      sender = %sender,
      receiver = %receiver,
      channel = %channel.id(),
      buffer_size = channel.capacity(),
      "connected"
    );
    self.connections.push(Connection {
      sender,
      receiver,
      channel,
      buffer_size,
    });
    Ok(())
  }

  /// Bind an externally owned channel to the exposed inport `name`.
  pub fn set_in_port<T: Send + 'static>(
    &mut self,
    name: &str,
    channel: &Channel<T>,
  ) -> Result<(), GraphError> {
    let target = self
      .in_ports
      .get(name)
      .cloned()
      .ok_or_else(|| port_not_found(&Address::external(name)))?;
    self.attach(Address::external(name), target, Direction::Receive, channel.erase())
  }

  /// Bind an externally owned channel to the exposed outport `name`. The
  /// channel closes once the internal sender and any other counted senders
  /// are done.
  pub fn set_out_port<T: Send + 'static>(
    &mut self,
    name: &str,
    channel: &Channel<T>,
  ) -> Result<(), GraphError> {
    let target = self
      .out_ports
      .get(name)
      .cloned()
      .ok_or_else(|| port_not_found(&Address::external(name)))?;
    self.attach(Address::external(name), target, Direction::Send, channel.erase())
  }

  fn attach(
    &mut self,
    external: Address,
    target: Address,
    direction: Direction,
    channel: AnyChannel,
  ) -> Result<(), GraphError> {
    let endpoint = self.inspect(&target, direction)?;
    if endpoint.element != channel.element_type() {
      return Err(GraphError::InvalidPort {
        address: target.to_string(),
        reason: format!(
          "element type mismatch: port carries {}, channel carries {}",
          endpoint.element,
          channel.element_type()
        ),
      });
    }

    let (sender, receiver) = match direction {
      Direction::Send => (target, external),
      _ => (external, target),
    };

    match endpoint.channel {
      Some(bound) if bound.id() == channel.id() => {}
      Some(_) => {
        return Err(GraphError::PortsAlreadyInUse {
          sender: sender.to_string(),
          receiver: receiver.to_string(),
        });
      }
      None => {
        let internal = if direction == Direction::Send {
          &sender
        } else {
          &receiver
        };
        self.bind(internal, direction, &channel)?;
      }
    }

    debug!(
      sender = %sender,
      receiver = %receiver,
      channel = %channel.id(),
      "external_channel_attached"
    );
    let buffer_size = channel.capacity();
    self.connections.push(Connection {
      sender,
      receiver,
      channel,
      buffer_size,
    });
    Ok(())
  }

  /// Resolve and validate the endpoint at `address` for use in `direction`.
  pub(crate) fn inspect(
    &mut self,
    address: &Address,
    direction: Direction,
  ) -> Result<Endpoint, GraphError> {
    let port = self.resolve_port(address, direction)?;

    if !port.direction().permits(direction) {
      return Err(GraphError::InvalidPort {
        address: address.to_string(),
        reason: format!("port is {}, expected {}", port.direction(), direction),
      });
    }
    if !port.is_bindable() {
      return Err(GraphError::InvalidPort {
        address: address.to_string(),
        reason: "port is closed".to_string(),
      });
    }

    Ok(Endpoint {
      element: port.element_type(),
      channel: port.channel(),
    })
  }

  /// Bind `channel` to the endpoint at `address`. A newly bound sender is
  /// counted against the channel.
  fn bind(
    &mut self,
    address: &Address,
    direction: Direction,
    channel: &AnyChannel,
  ) -> Result<(), GraphError> {
    self
      .resolve_port(address, direction)?
      .bind(channel)
      .map_err(|err| GraphError::InvalidPort {
        address: address.to_string(),
        reason: err.to_string(),
      })?;

    if direction == Direction::Send {
      let senders = self.sender_refs.inc(channel);
      debug!(address = %address, channel = %channel.id(), senders, "sender_bound");
    }
    Ok(())
  }
}
