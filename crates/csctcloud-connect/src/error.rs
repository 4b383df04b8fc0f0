//! Failures that abort a connection attempt

use csctcloud_azure::AzureError;
use thiserror::Error;

const TRY_AGAIN: &str = "Please try running the connection shortcut again.";

const RETRY_WITH_UWE_ACCOUNT: &str =
    "Please run the connection shortcut again and login with your UWE account when prompted.";

#[derive(Error, Debug)]
pub enum ConnectError {
    #[error(
        "This program is designed to run on Windows, macOS or Linux, it cannot be run on {0}"
    )]
    UnsupportedPlatform(String),

    #[error("Azure CLI tools need to be installed: https://aka.ms/installazurecli")]
    CliMissing,

    #[error("Unexpected error occurred checking access to {resource}: {source}")]
    AuthorizationAmbiguous {
        resource: String,
        #[source]
        source: AzureError,
    },

    #[error(
        "Login flow failed, this normally indicates an error with the login process itself (user exited the login flow, entered an incorrect password or failed the MFA check): {stderr}"
    )]
    LoginFailed { stderr: String },

    #[error(
        "Logged in account is not allowed access to {resource}, either the login flow was completed with a non-UWE account or the UWE account does not have access to the server"
    )]
    WrongAccount { resource: String },

    #[error("An error occurred adding the {extension} extension: {stderr}")]
    ExtensionInstall { extension: String, stderr: String },

    #[error("Creating keys failed: {stderr}")]
    KeyGeneration { stderr: String },

    #[error("Failed to launch Visual Studio Code: {stderr}")]
    EditorLaunch { stderr: String },

    #[error("Unexpected exception: {0}")]
    Azure(#[from] AzureError),

    #[error("Unexpected exception: {0}")]
    Io(#[from] std::io::Error),
}

/// How loudly a failure is logged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Critical,
}

impl ConnectError {
    pub fn severity(&self) -> Severity {
        match self {
            Self::UnsupportedPlatform(_)
            | Self::CliMissing
            | Self::LoginFailed { .. }
            | Self::WrongAccount { .. } => Severity::Error,
            _ => Severity::Critical,
        }
    }

    /// Text for the blocking message box, if this failure warrants one
    ///
    /// Captured command output never appears here; it goes to the log only.
    pub fn notification(&self) -> Option<String> {
        let text = match self {
            Self::UnsupportedPlatform(_) | Self::CliMissing | Self::Azure(_) | Self::Io(_) => {
                return None;
            }
            Self::AuthorizationAmbiguous { .. } => {
                format!("There was a problem completing your login.\n\n{RETRY_WITH_UWE_ACCOUNT}")
            }
            Self::LoginFailed { .. } => {
                format!("There was a problem with your login.\n\n{RETRY_WITH_UWE_ACCOUNT}")
            }
            Self::WrongAccount { .. } => format!(
                "The account you have used to login is not a UWE account, or your UWE account is not allowed access to this resource.\n\n{RETRY_WITH_UWE_ACCOUNT}"
            ),
            Self::ExtensionInstall { .. } => format!(
                "There was an unexpected error while adding the SSH extension.\n\n{TRY_AGAIN}"
            ),
            Self::KeyGeneration { .. } => {
                format!("There was an unexpected error while creating SSH keys.\n\n{TRY_AGAIN}")
            }
            Self::EditorLaunch { .. } => format!(
                "An unknown error occurred while launching Visual Studio Code.\n\n{TRY_AGAIN}"
            ),
        };
        Some(text)
    }
}
