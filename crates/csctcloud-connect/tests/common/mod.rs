use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Throwaway home directory plus settings file for one CLI run
pub struct TestHome {
    pub root: TempDir,
}

impl TestHome {
    pub fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        Self { root }
    }

    pub fn path(&self) -> &Path {
        self.root.path()
    }

    /// Write `config.yaml` and return its path
    pub fn write_settings(&self, content: &str) -> PathBuf {
        let path = self.path().join("config.yaml");
        fs::write(&path, content).unwrap();
        path
    }

    #[allow(dead_code)]
    pub fn log_file(&self) -> PathBuf {
        self.path().join("csctcloud-connect.log")
    }

    /// Write an executable shell script standing in for an external CLI
    #[cfg(unix)]
    #[allow(dead_code)]
    pub fn write_script(&self, name: &str, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = self.path().join(name);
        fs::write(&path, format!("#!/bin/sh\n{}", body)).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    /// The binary with its home and settings pointed at this directory
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::Command::cargo_bin("csctcloud-connect").unwrap();
        cmd.env("HOME", self.path())
            .env("USERPROFILE", self.path())
            .env_remove("CSCTCLOUD_CONFIG")
            .arg("--no-dialog");
        cmd
    }
}
