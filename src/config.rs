use crate::error::{Error, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_DIR: &str = "glpi-tools";
const CONFIG_FILE: &str = "config.yaml";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Optional on-disk defaults, e.g. `~/.config/glpi-tools/config.yaml`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub instance: Option<String>,
    pub token: Option<String>,
    pub no_verify: Option<bool>,
    pub timeout_secs: Option<u64>,
}

/// Connection settings passed explicitly down to every command.
#[derive(Debug, Clone)]
pub struct Settings {
    pub instance: String,
    pub token: String,
    pub no_verify: bool,
    pub timeout_secs: u64,
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
}

/// Loads the config file. An explicit path must exist; the default path is
/// optional.
pub fn load_file_config(explicit: Option<&Path>) -> Result<FileConfig> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match default_config_path() {
            Some(path) if path.exists() => path,
            _ => return Ok(FileConfig::default()),
        },
    };

    log::debug!("Loading configuration from {}", path.display());
    let contents = fs::read_to_string(&path)?;
    if contents.trim().is_empty() {
        return Ok(FileConfig::default());
    }
    Ok(serde_yaml::from_str(&contents)?)
}

impl Settings {
    /// Flag/env values (already merged by clap) win over the config file.
    pub fn resolve(
        instance: Option<String>,
        token: Option<String>,
        no_verify: bool,
        file: FileConfig,
    ) -> Result<Self> {
        let instance = instance.or(file.instance).ok_or_else(|| {
            Error::Config("no GLPI instance given (use --ip, GLPI_INSTANCE or the config file)".into())
        })?;
        let token = token.or(file.token).ok_or_else(|| {
            Error::Config("no GLPI user token given (use --token, GLPI_TOKEN or the config file)".into())
        })?;

        Ok(Settings {
            instance,
            token,
            no_verify: no_verify || file.no_verify.unwrap_or(false),
            timeout_secs: file.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
        })
    }
}
