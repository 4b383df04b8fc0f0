use crate::error::ConnectError;

/// Operating system families the tool runs on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    MacOs,
    Linux,
}

impl Platform {
    /// Platform of the running process
    pub fn current() -> Result<Self, ConnectError> {
        Self::from_os(std::env::consts::OS)
    }

    /// Map a `std::env::consts::OS` value to a supported platform
    pub fn from_os(os: &str) -> Result<Self, ConnectError> {
        match os {
            "windows" => Ok(Self::Windows),
            "macos" => Ok(Self::MacOs),
            "linux" => Ok(Self::Linux),
            other => Err(ConnectError::UnsupportedPlatform(other.to_string())),
        }
    }

    /// What the user should open to type a command
    pub fn terminal_name(&self) -> &'static str {
        match self {
            Self::Windows => "PowerShell",
            Self::MacOs => "Terminal",
            Self::Linux => "a terminal",
        }
    }
}
