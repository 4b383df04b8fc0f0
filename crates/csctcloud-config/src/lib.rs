//! Settings for CSCT Cloud Connect
//!
//! Every value has a built-in default, so the tool runs without any settings
//! file. A YAML file may override individual fields:
//!
//! ```yaml
//! host: csctcloud.uwe.ac.uk
//! resource_name: CSCT Cloud Programming
//! linger_secs: 0
//! ```

pub mod error;
pub mod paths;

pub use error::*;
pub use paths::SshPaths;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Display name of the cloud resource an account must have access to
pub const DEFAULT_RESOURCE_NAME: &str = "CSCT Cloud Programming";
/// SSH target host
pub const DEFAULT_HOST: &str = "csctcloud.uwe.ac.uk";

const APP_DIR_NAME: &str = "csctcloud-connect";
const SETTINGS_FILE_NAME: &str = "config.yaml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Resource name matched against the `name` field of account payloads
    pub resource_name: String,
    pub host: String,
    /// Directory under `~/.ssh` holding generated keys and the config fragment
    pub key_dir_name: String,
    /// Name of the az extension providing `az ssh`
    pub extension: String,
    pub az_program: String,
    pub editor_program: String,
    /// Log file name, relative to the home directory
    pub log_file_name: String,
    pub notification_title: String,
    /// Seconds to keep the console open after a successful run
    pub linger_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            resource_name: DEFAULT_RESOURCE_NAME.to_string(),
            host: DEFAULT_HOST.to_string(),
            key_dir_name: "csctcloud".to_string(),
            extension: "ssh".to_string(),
            az_program: "az".to_string(),
            editor_program: "code".to_string(),
            log_file_name: "csctcloud-connect.log".to_string(),
            notification_title: "CSCT Cloud Connection Error".to_string(),
            linger_secs: 10,
        }
    }
}

impl Settings {
    /// Load settings
    ///
    /// An explicit path must exist. Without one, the per-user settings file
    /// (`<config_dir>/csctcloud-connect/config.yaml`) is read when present and
    /// the defaults are used otherwise.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => {
                if !path.is_file() {
                    return Err(ConfigError::SettingsFileNotFound(path.to_path_buf()));
                }
                Self::from_file(path)
            }
            None => match default_settings_path() {
                Some(path) if path.is_file() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    /// Parse a settings file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_yaml::from_str(&content).map_err(|source| ConfigError::InvalidSettings {
            path: path.to_path_buf(),
            source,
        })
    }

    /// SSH file layout below the given home directory
    pub fn ssh_paths(&self, home: &Path) -> SshPaths {
        SshPaths::from_home(home, &self.key_dir_name)
    }

    pub fn log_path(&self, home: &Path) -> PathBuf {
        home.join(&self.log_file_name)
    }
}

/// Current user's home directory
pub fn home_dir() -> Result<PathBuf> {
    dirs::home_dir().ok_or(ConfigError::HomeDirNotFound)
}

/// Location of the per-user settings file, whether or not it exists
pub fn default_settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join(SETTINGS_FILE_NAME))
}
