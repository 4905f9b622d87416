//! Channel registry.
//!
//! The set of chat channels in which checklist tracking is enabled. The set is
//! loaded once at startup and written back in full after every add/remove.

pub mod error;
pub mod registry;
pub mod store;
pub mod store_file;
pub mod store_memory;

pub use {
    error::{Error, Result},
    registry::ChannelRegistry,
    store::{ChannelStore, RegistryFile, TrackedChannel},
    store_file::FileChannelStore,
    store_memory::InMemoryChannelStore,
};
