//! Configuration loading and secret resolution.
//!
//! Config files: `cartlist.toml`, `cartlist.yaml`, or `cartlist.json`,
//! searched in `./` then `~/.config/cartlist/`. Every section is optional.
//!
//! Supports `${ENV_VAR}` and `${ENV_VAR:-default}` substitution in the raw file.

pub mod env_subst;
pub mod error;
pub mod loader;
pub mod schema;

pub use {
    error::{Error, Result},
    loader::{config_dir, discover_and_load, find_config_file, load_config},
    schema::{CartlistConfig, ChecklistConfig, DiscordConfig, Glyphs, RegistryConfig},
};
