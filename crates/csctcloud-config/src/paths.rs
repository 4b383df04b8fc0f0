//! SSH file layout for the target host

use std::path::{Path, PathBuf};

/// Files and directories the provisioner reads and writes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SshPaths {
    /// `~/.ssh`
    pub ssh_dir: PathBuf,
    /// `~/.ssh/<key_dir_name>`, wiped and regenerated on every run
    pub key_dir: PathBuf,
    /// Per-target config fragment written by `az ssh config`
    pub fragment: PathBuf,
    /// The user's own `~/.ssh/config`
    pub master_config: PathBuf,
}

impl SshPaths {
    pub fn from_home(home: &Path, key_dir_name: &str) -> Self {
        let ssh_dir = home.join(".ssh");
        let key_dir = ssh_dir.join(key_dir_name);
        Self {
            fragment: key_dir.join("config"),
            master_config: ssh_dir.join("config"),
            key_dir,
            ssh_dir,
        }
    }

    /// `Include` directive pointing the master config at the fragment
    ///
    /// OpenSSH accepts forward slashes on every platform; paths containing
    /// whitespace are quoted.
    pub fn include_line(&self) -> String {
        let path = self.fragment.to_string_lossy().replace('\\', "/");
        if path.chars().any(char::is_whitespace) {
            format!("Include \"{}\"", path)
        } else {
            format!("Include {}", path)
        }
    }
}
