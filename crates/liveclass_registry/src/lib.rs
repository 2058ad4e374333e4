// --- File: crates/liveclass_registry/src/lib.rs ---
//! Device push-token registry.
//!
//! Holds three token kinds (push-to-start, activity, plain APNs), each keyed
//! so that re-registration overwrites rather than duplicates. Expiry is driven
//! solely by `last_updated`.

pub mod cleanup;
pub mod error;
pub mod memory;
pub mod models;
pub mod registry;
#[cfg(test)]
mod registry_proptest;
pub mod store;

pub use error::RegistryError;
pub use memory::InMemoryTokenStore;
pub use models::*;
pub use registry::TokenRegistry;
pub use store::TokenStore;
