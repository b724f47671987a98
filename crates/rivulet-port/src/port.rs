//! Port endpoints.
//!
//! An endpoint is a named, directional slot on a component that holds at
//! most one channel. The wiring engine only sees endpoints through the
//! type-erased [`Port`] trait; components use the typed [`InPort`] and
//! [`OutPort`].

use std::any::TypeId;
use std::fmt;

use tracing::trace;

use crate::channel::{AnyChannel, Channel};
use crate::error::{BindError, SendError};

/// Direction an endpoint moves data in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
  Send,
  Receive,
  /// Either way; used by boundary ports that are not bound yet.
  Bidirectional,
}

impl Direction {
  /// Whether an endpoint of this direction can serve as `required`.
  pub fn permits(self, required: Direction) -> bool {
    self == required || self == Direction::Bidirectional
  }
}

impl fmt::Display for Direction {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Direction::Send => "send-only",
      Direction::Receive => "receive-only",
      Direction::Bidirectional => "bidirectional",
    })
  }
}

/// Element type tag of a port or channel.
#[derive(Debug, Clone, Copy)]
pub struct ElementType {
  id: TypeId,
  name: &'static str,
}

impl ElementType {
  pub fn of<T: 'static>() -> Self {
    Self {
      id: TypeId::of::<T>(),
      name: std::any::type_name::<T>(),
    }
  }

  pub fn name(&self) -> &'static str {
    self.name
  }
}

impl PartialEq for ElementType {
  fn eq(&self, other: &Self) -> bool {
    self.id == other.id
  }
}

impl Eq for ElementType {}

impl fmt::Display for ElementType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name)
  }
}

/// Type-erased endpoint capability consumed by the wiring engine.
pub trait Port: Send {
  fn direction(&self) -> Direction;

  fn element_type(&self) -> ElementType;

  /// The channel currently bound to this endpoint, if any.
  fn channel(&self) -> Option<AnyChannel>;

  /// Whether the endpoint can still take part in wiring.
  fn is_bindable(&self) -> bool {
    true
  }

  /// Allocate a channel of this endpoint's element type.
  fn make_channel(&self, capacity: usize) -> AnyChannel;

  /// Attach `channel` to this endpoint.
  fn bind(&mut self, channel: &AnyChannel) -> Result<(), BindError>;
}

fn typed<T: Send + 'static>(channel: &AnyChannel) -> Result<Channel<T>, BindError> {
  channel.downcast::<T>().ok_or(BindError::TypeMismatch {
    expected: ElementType::of::<T>(),
    actual: channel.element_type(),
  })
}

/// Receive-only endpoint.
pub struct InPort<T> {
  channel: Option<Channel<T>>,
}

impl<T> Default for InPort<T> {
  fn default() -> Self {
    Self { channel: None }
  }
}

impl<T: Send + 'static> InPort<T> {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn is_connected(&self) -> bool {
    self.channel.is_some()
  }

  /// Receive the next value. Returns `None` when the port is unbound or its
  /// channel is closed and drained.
  pub async fn recv(&self) -> Option<T> {
    match &self.channel {
      Some(channel) => channel.recv().await,
      None => None,
    }
  }
}

impl<T: Send + 'static> Port for InPort<T> {
  fn direction(&self) -> Direction {
    Direction::Receive
  }

  fn element_type(&self) -> ElementType {
    ElementType::of::<T>()
  }

  fn channel(&self) -> Option<AnyChannel> {
    self.channel.as_ref().map(Channel::erase)
  }

  fn make_channel(&self, capacity: usize) -> AnyChannel {
    Channel::<T>::new(capacity).erase()
  }

  fn bind(&mut self, channel: &AnyChannel) -> Result<(), BindError> {
    if self.channel.is_some() {
      return Err(BindError::AlreadyBound);
    }
    self.channel = Some(typed::<T>(channel)?);
    Ok(())
  }
}

/// Send-only endpoint.
///
/// Closing the port, explicitly or by dropping it, releases its share of
/// the channel; the last sender to release performs the real close.
pub struct OutPort<T> {
  channel: Option<Channel<T>>,
  closed: bool,
}

impl<T> Default for OutPort<T> {
  fn default() -> Self {
    Self {
      channel: None,
      closed: false,
    }
  }
}

impl<T> OutPort<T> {
  /// Release this endpoint. Safe to call more than once.
  pub fn close(&mut self) {
    self.closed = true;
    let Some(channel) = self.channel.take() else {
      return;
    };
    if channel.senders().release() {
      let closed = channel.close();
      trace!(channel = %channel.id(), closed, "last_sender_released");
    }
  }
}

impl<T: Send + 'static> OutPort<T> {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn is_connected(&self) -> bool {
    self.channel.is_some()
  }

  pub fn is_closed(&self) -> bool {
    self.closed
  }

  /// Send a value downstream. Fails, handing the value back, when the port
  /// is unbound or closed.
  pub async fn send(&self, value: T) -> Result<(), SendError<T>> {
    match &self.channel {
      Some(channel) => channel.send(value).await,
      None => Err(SendError(value)),
    }
  }
}

impl<T> Drop for OutPort<T> {
  fn drop(&mut self) {
    self.close();
  }
}

impl<T: Send + 'static> Port for OutPort<T> {
  fn direction(&self) -> Direction {
    Direction::Send
  }

  fn element_type(&self) -> ElementType {
    ElementType::of::<T>()
  }

  fn channel(&self) -> Option<AnyChannel> {
    self.channel.as_ref().map(Channel::erase)
  }

  fn is_bindable(&self) -> bool {
    !self.closed
  }

  fn make_channel(&self, capacity: usize) -> AnyChannel {
    Channel::<T>::new(capacity).erase()
  }

  fn bind(&mut self, channel: &AnyChannel) -> Result<(), BindError> {
    if self.closed {
      return Err(BindError::Closed);
    }
    if self.channel.is_some() {
      return Err(BindError::AlreadyBound);
    }
    self.channel = Some(typed::<T>(channel)?);
    Ok(())
  }
}
