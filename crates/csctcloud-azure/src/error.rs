//! Azure CLI error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AzureError {
    #[error("az not found. Please install the Azure CLI: https://aka.ms/installazurecli")]
    CliNotFound,

    #[error("az login failed: {stderr}")]
    LoginFailed { stderr: String },

    #[error("az {command} failed: {stderr}")]
    CommandFailed { command: String, stderr: String },

    #[error("unexpected account payload: {0}")]
    AccountPayload(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl AzureError {
    /// Captured stderr of the failed command, if any
    pub fn stderr(&self) -> Option<&str> {
        match self {
            Self::LoginFailed { stderr } | Self::CommandFailed { stderr, .. } => Some(stderr),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, AzureError>;
