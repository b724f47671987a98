//! FBP protocol adapter.
//!
//! Translates protocol [`Message`]s into graph-building and network-start
//! calls. Transport is left to the caller.

mod error;
mod message;
mod payload;
mod runtime;

pub use error::ProtocolError;
pub use message::Message;
pub use payload::RuntimeInfo;
pub use runtime::Runtime;
