// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::Result;

/// Load a configuration file from a given path and return the raw `RawConfigFile`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file from path and validate it.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw_config = load_from_path(&path)?;
    let config = ConfigFile::try_from(raw_config)?;
    Ok(config)
}

/// Raw config for the CLI.
///
/// - An explicit path must exist.
/// - Otherwise [`default_config_path`] is used if present.
/// - Otherwise built-in defaults apply.
pub fn load_or_default(explicit: Option<&Path>) -> Result<RawConfigFile> {
    if let Some(path) = explicit {
        return load_from_path(path);
    }

    let path = default_config_path();
    if path.is_file() {
        debug!("using config file {:?}", path);
        load_from_path(&path)
    } else {
        debug!("no {:?} found; using defaults", path);
        Ok(RawConfigFile::default())
    }
}

/// `Pollwatch.toml` in the current working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Pollwatch.toml")
}
