//! Typed, capacity-bounded FIFO channels.
//!
//! A [`Channel`] connects one receiving endpoint to any number of sending
//! endpoints. The channel owns its sending half; endpoints borrow a clone of
//! it for the duration of a send. [`Channel::close`] drops that sending half,
//! which is the single real close of the channel: queued values are still
//! drained, after which receivers observe end-of-stream.

use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::mpsc;

use crate::error::{SendError, TrySendError};
use crate::port::ElementType;
use crate::refcount::SenderCount;

static NEXT_CHANNEL_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique channel identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChannelId(u64);

impl ChannelId {
  fn next() -> Self {
    Self(NEXT_CHANNEL_ID.fetch_add(1, Ordering::Relaxed))
  }
}

impl fmt::Display for ChannelId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "#{}", self.0)
  }
}

struct Inner<T> {
  id: ChannelId,
  capacity: usize,
  senders: SenderCount,
  tx: Mutex<Option<mpsc::Sender<T>>>,
  rx: tokio::sync::Mutex<mpsc::Receiver<T>>,
}

/// Shared handle to a typed message queue.
///
/// Cloning is shallow: every clone refers to the same queue.
pub struct Channel<T> {
  inner: Arc<Inner<T>>,
}

impl<T> Clone for Channel<T> {
  fn clone(&self) -> Self {
    Self {
      inner: self.inner.clone(),
    }
  }
}

impl<T> fmt::Debug for Channel<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Channel")
      .field("id", &self.inner.id)
      .field("capacity", &self.inner.capacity)
      .field("senders", &self.inner.senders.get())
      .finish()
  }
}

impl<T> Channel<T> {
  pub fn id(&self) -> ChannelId {
    self.inner.id
  }

  /// Requested buffer capacity.
  pub fn capacity(&self) -> usize {
    self.inner.capacity
  }

  /// Sender endpoints attached to this channel.
  pub fn senders(&self) -> &SenderCount {
    &self.inner.senders
  }

  /// Close the channel. Returns `true` only for the call that closed it.
  pub fn close(&self) -> bool {
    self
      .inner
      .tx
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .take()
      .is_some()
  }

  /// Whether the channel stopped accepting new values.
  pub fn is_closed(&self) -> bool {
    self
      .inner
      .tx
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .is_none()
  }

  fn sending_half(&self) -> Option<mpsc::Sender<T>> {
    self
      .inner
      .tx
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .clone()
  }
}

impl<T: Send + 'static> Channel<T> {
  /// Create a channel buffering up to `capacity` values.
  ///
  /// A capacity of zero requests an unbuffered channel. tokio queues need at
  /// least one slot, so such a channel holds a single value and the sender
  /// resumes as soon as it is queued.
  pub fn new(capacity: usize) -> Self {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    Self {
      inner: Arc::new(Inner {
        id: ChannelId::next(),
        capacity,
        senders: SenderCount::new(),
        tx: Mutex::new(Some(tx)),
        rx: tokio::sync::Mutex::new(rx),
      }),
    }
  }

  /// Send a value, waiting for a free slot.
  pub async fn send(&self, value: T) -> Result<(), SendError<T>> {
    let Some(tx) = self.sending_half() else {
      return Err(SendError(value));
    };
    tx.send(value).await.map_err(|e| SendError(e.0))
  }

  /// Send a value only if a slot is free right now.
  pub fn try_send(&self, value: T) -> Result<(), TrySendError<T>> {
    let Some(tx) = self.sending_half() else {
      return Err(TrySendError::Closed(value));
    };
    tx.try_send(value).map_err(|e| match e {
      mpsc::error::TrySendError::Full(value) => TrySendError::Full(value),
      mpsc::error::TrySendError::Closed(value) => TrySendError::Closed(value),
    })
  }

  /// A sending handle that keeps the channel open until it is dropped.
  ///
  /// Returns `None` if the channel is already closed.
  pub fn sender(&self) -> Option<SendHandle<T>> {
    self.sending_half().map(|tx| SendHandle { tx })
  }

  /// Receive the next value. Returns `None` once the channel is closed and
  /// drained.
  pub async fn recv(&self) -> Option<T> {
    let mut rx = self.inner.rx.lock().await;
    rx.recv().await
  }

  /// Type-erased handle used by the wiring engine.
  pub fn erase(&self) -> AnyChannel {
    AnyChannel {
      id: self.id(),
      element: ElementType::of::<T>(),
      capacity: self.capacity(),
      senders: self.inner.senders.clone(),
      inner: Arc::new(self.clone()),
    }
  }
}

/// A cloned sending half. While alive, the queue stays open for it even if
/// the channel is closed.
pub struct SendHandle<T> {
  tx: mpsc::Sender<T>,
}

impl<T> SendHandle<T> {
  pub async fn send(&self, value: T) -> Result<(), SendError<T>> {
    self.tx.send(value).await.map_err(|e| SendError(e.0))
  }
}

trait ErasedChannel: Send + Sync {
  fn as_any(&self) -> &dyn Any;
  fn close(&self) -> bool;
  fn is_closed(&self) -> bool;
}

impl<T: Send + 'static> ErasedChannel for Channel<T> {
  fn as_any(&self) -> &dyn Any {
    self
  }

  fn close(&self) -> bool {
    Channel::close(self)
  }

  fn is_closed(&self) -> bool {
    Channel::is_closed(self)
  }
}

/// Type-erased channel handle carrying its element type tag.
#[derive(Clone)]
pub struct AnyChannel {
  id: ChannelId,
  element: ElementType,
  capacity: usize,
  senders: SenderCount,
  inner: Arc<dyn ErasedChannel>,
}

impl AnyChannel {
  pub fn id(&self) -> ChannelId {
    self.id
  }

  pub fn element_type(&self) -> ElementType {
    self.element
  }

  pub fn capacity(&self) -> usize {
    self.capacity
  }

  pub fn senders(&self) -> &SenderCount {
    &self.senders
  }

  pub fn close(&self) -> bool {
    self.inner.close()
  }

  pub fn is_closed(&self) -> bool {
    self.inner.is_closed()
  }

  /// Recover the typed channel. Returns `None` on an element type mismatch.
  pub fn downcast<T: Send + 'static>(&self) -> Option<Channel<T>> {
    self.inner.as_any().downcast_ref::<Channel<T>>().cloned()
  }
}

impl fmt::Debug for AnyChannel {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("AnyChannel")
      .field("id", &self.id)
      .field("element", &self.element)
      .field("capacity", &self.capacity)
      .field("senders", &self.senders.get())
      .finish()
  }
}
