//! Port and channel primitives for rivulet networks.
//!
//! - [`Address`] names a port within a network.
//! - [`Channel`] is the typed queue between endpoints; [`AnyChannel`] is its
//!   type-erased form.
//! - [`InPort`] and [`OutPort`] are the endpoints components expose.
//! - [`Component`] is the contract a component implements to be wired.

mod address;
mod channel;
mod component;
mod error;
mod port;
mod refcount;

pub use address::Address;
pub use channel::{AnyChannel, Channel, ChannelId, SendHandle};
pub use component::Component;
pub use error::{BindError, SendError, TrySendError};
pub use port::{Direction, ElementType, InPort, OutPort, Port};
pub use refcount::SenderCount;

pub use async_trait::async_trait;
