use std::path::{Path, PathBuf};

use tracing::debug;

use crate::{Error, Result, env_subst::substitute_env, schema::CartlistConfig};

/// Standard config file names, checked in order.
const CONFIG_FILENAMES: &[&str] = &[
    "cartlist.toml",
    "cartlist.yaml",
    "cartlist.yml",
    "cartlist.json",
];

/// Load config from the given path (any supported format).
pub fn load_config(path: &Path) -> Result<CartlistConfig> {
    let raw = std::fs::read_to_string(path).map_err(|e| Error::read(path, e))?;
    let raw = substitute_env(&raw);
    parse_config(&raw, path)
}

/// Discover and load config from standard locations.
///
/// Search order:
/// 1. `./cartlist.{toml,yaml,yml,json}`
/// 2. `~/.config/cartlist/cartlist.{toml,yaml,yml,json}`
///
/// Returns defaults when no file exists. A file that exists but cannot be
/// read or parsed is an error.
pub fn discover_and_load() -> Result<CartlistConfig> {
    match find_config_file() {
        Some(path) => {
            debug!(path = %path.display(), "loading config");
            load_config(&path)
        },
        None => {
            debug!("no config file found, using defaults");
            Ok(CartlistConfig::default())
        },
    }
}

/// Find the first config file in standard locations.
pub fn find_config_file() -> Option<PathBuf> {
    let local = CONFIG_FILENAMES.iter().map(PathBuf::from);
    let global = config_dir()
        .into_iter()
        .flat_map(|dir| CONFIG_FILENAMES.iter().map(move |name| dir.join(name)));

    local.chain(global).find(|p| p.exists())
}

/// Returns the user-global config directory (`~/.config/cartlist/`).
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "cartlist").map(|d| d.config_dir().to_path_buf())
}

fn parse_config(raw: &str, path: &Path) -> Result<CartlistConfig> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match ext {
        "toml" => toml::from_str(raw).map_err(|e| Error::parse(path, e)),
        "yaml" | "yml" => serde_yaml::from_str(raw).map_err(|e| Error::parse(path, e)),
        "json" => serde_json::from_str(raw).map_err(|e| Error::parse(path, e)),
        _ => Err(Error::UnsupportedFormat {
            extension: ext.to_string(),
        }),
    }
}
