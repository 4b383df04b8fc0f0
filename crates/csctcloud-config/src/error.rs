use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("home directory could not be determined")]
    HomeDirNotFound,

    #[error("settings file not found: {}", .0.display())]
    SettingsFileNotFound(PathBuf),

    #[error("invalid settings file {}: {source}", path.display())]
    InvalidSettings {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
