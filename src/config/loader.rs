// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::Result;

/// Read and deserialize a plan file without semantic validation.
///
/// Use [`load_and_validate`] to also check task references and rule fields.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;
    debug!(
        path = %path.display(),
        tasks = config.task.len(),
        rules = config.rule.len(),
        "plan file parsed"
    );

    Ok(config)
}

/// Load a plan file and validate it.
///
/// This is the entry point the binary uses: it reads TOML, applies serde
/// defaults, and checks that every rule references known tasks and carries
/// usable settings.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw_config = load_from_path(&path)?;
    let config = ConfigFile::try_from(raw_config)?;
    Ok(config)
}

/// `Taskweave.toml` in the current working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Taskweave.toml")
}
