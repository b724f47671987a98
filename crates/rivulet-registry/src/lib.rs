mod annotation;
mod config;
mod error;
mod registry;

pub use annotation::Annotation;
pub use config::RegistryConfig;
pub use error::RegistryError;
pub use registry::{Constructor, RegisteredType, Registry};
