use crate::opt::Encoding;
use crate::{Error, Result};

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::{fs, io};
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("failed to load configuration - {0}")]
    Load(io::Error),
    #[error("failed to deserialize configuration - {0}")]
    Deserialize(serde_yaml::Error),
    #[error("failed to determine user config directory")]
    FindUserDir,
}

const CONFIG_FILE: &str = "fxattr.yml";

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub no_follow: bool,
    #[serde(default)]
    pub pretty_output: bool,
    pub encoding: Option<Encoding>,
}

impl Config {
    /// Reads `fxattr.yml` from the directory `path`. Fields missing from the file fall back to
    /// their defaults, so an empty mapping disables every option.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().join(CONFIG_FILE);
        serde_yaml::from_slice(&fs::read(path).map_err(ConfigError::Load)?)
            .map_err(ConfigError::Deserialize)
            .map_err(Error::from)
    }

    /// Reads `fxattr.yml` from the config directory of the current user, for example
    /// `~/.config` on Linux.
    pub fn load_default_location() -> Result<Self> {
        Self::load(dirs::config_dir().ok_or(ConfigError::FindUserDir)?)
    }
}
