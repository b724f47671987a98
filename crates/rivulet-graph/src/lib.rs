//! Network wiring and execution for rivulet.
//!
//! A [`Network`] holds named processes, connects their ports with
//! channels, and runs them concurrently. Networks nest: a network exposes
//! internal ports under public names and can be added to another network
//! as a single process.

mod config;
mod connect;
mod error;
mod iip;
mod network;
mod process;
mod refcount;
mod run;

pub use config::NetworkConfig;
pub use connect::Connection;
pub use error::GraphError;
pub use network::Network;
pub use process::Process;
pub use run::{Wait, run};

/// Registry of process constructors.
pub type Factory = rivulet_registry::Registry<Process>;
