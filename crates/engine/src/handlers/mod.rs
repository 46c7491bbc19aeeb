//! Field type handlers backing the registry's built-in registrations.

mod composite;
mod default_field;

pub use composite::{CompositeCapabilities, CompositeFieldHandler};
pub use default_field::DefaultFieldHandler;
