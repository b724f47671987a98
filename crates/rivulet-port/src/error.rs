use std::fmt;

use crate::port::ElementType;

/// The channel was closed before the value could be sent. The value is
/// handed back.
pub struct SendError<T>(pub T);

impl<T> fmt::Debug for SendError<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("SendError(..)")
  }
}

impl<T> fmt::Display for SendError<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("channel closed")
  }
}

impl<T> std::error::Error for SendError<T> {}

/// Failure of a non-blocking send.
pub enum TrySendError<T> {
  /// The queue has no free slot right now.
  Full(T),
  /// The channel no longer accepts values.
  Closed(T),
}

impl<T> fmt::Debug for TrySendError<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Full(_) => f.write_str("Full(..)"),
      Self::Closed(_) => f.write_str("Closed(..)"),
    }
  }
}

impl<T> fmt::Display for TrySendError<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Full(_) => f.write_str("channel full"),
      Self::Closed(_) => f.write_str("channel closed"),
    }
  }
}

impl<T> std::error::Error for TrySendError<T> {}

/// Errors raised when a channel cannot be bound to a port endpoint.
#[derive(Debug, thiserror::Error)]
pub enum BindError {
  /// The channel carries a different element type than the port.
  #[error("element type mismatch: port carries {expected}, channel carries {actual}")]
  TypeMismatch {
    expected: ElementType,
    actual: ElementType,
  },

  /// The port already holds a channel.
  #[error("port is already bound")]
  AlreadyBound,

  /// The port was closed and cannot be bound again.
  #[error("port is closed")]
  Closed,
}
