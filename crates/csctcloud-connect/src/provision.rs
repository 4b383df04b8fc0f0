//! SSH key generation and `~/.ssh/config` wiring
//!
//! Keys are never reused: the per-host key directory is emptied and az issues
//! a fresh key pair and certificate on every run. The user's own SSH config
//! only ever gains a single `Include` line at the top.

use crate::error::ConnectError;
use csctcloud_azure::{AzureCli, AzureError};
use csctcloud_config::SshPaths;
use std::fs;
use std::io;
use std::path::Path;

/// What [`merge_include`] did to the master config
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    Created,
    Prepended,
    AlreadyPresent,
}

/// Generate fresh credentials for `host` and make them visible to ssh
pub async fn provision(az: &AzureCli, host: &str, paths: &SshPaths) -> Result<(), ConnectError> {
    tracing::info!("SSH config directory is {}", paths.ssh_dir.display());
    prepare_key_dir(paths)?;

    tracing::debug!("Generating SSH keys");
    let output = az
        .generate_ssh_config(host, &paths.fragment, &paths.key_dir)
        .await
        .map_err(|e| match e {
            AzureError::CommandFailed { .. } | AzureError::IoError(_) => {
                ConnectError::KeyGeneration {
                    stderr: e.stderr().map(str::to_string).unwrap_or_else(|| e.to_string()),
                }
            }
            other => other.into(),
        })?;

    match output.certificate_expiry() {
        Some(valid_until) => {
            tracing::info!("Generated SSH keys, certificate is valid until {}", valid_until)
        }
        None => tracing::warn!("Generated SSH keys but couldn't extract expiry time from output"),
    }

    let include = paths.include_line();
    match merge_include(&paths.master_config, &include)? {
        MergeOutcome::Created => tracing::info!(
            "Created SSH config {} including {}",
            paths.master_config.display(),
            paths.fragment.display()
        ),
        MergeOutcome::Prepended => tracing::info!(
            "Added include for {} to {}",
            paths.fragment.display(),
            paths.master_config.display()
        ),
        MergeOutcome::AlreadyPresent => {
            tracing::debug!("SSH config already includes {}", paths.fragment.display())
        }
    }

    Ok(())
}

/// Create `~/.ssh` if needed and leave an empty key directory behind
fn prepare_key_dir(paths: &SshPaths) -> io::Result<()> {
    tracing::debug!("Checking if user's SSH config directory exists");
    if !paths.ssh_dir.exists() {
        tracing::warn!("SSH config directory doesn't currently exist");
        fs::create_dir_all(&paths.ssh_dir)?;
        tracing::info!("SSH config directory created");
    }

    tracing::info!("Key directory is {}", paths.key_dir.display());
    if paths.key_dir.exists() {
        tracing::debug!("Key directory exists, clearing contents");
        clear_dir_contents(&paths.key_dir)?;
        tracing::debug!("Contents of key directory cleared");
    } else {
        tracing::debug!("Key directory doesn't exist");
        fs::create_dir_all(&paths.key_dir)?;
    }

    Ok(())
}

/// Delete everything below `dir`, depth first, keeping `dir` itself
pub fn clear_dir_contents(dir: &Path) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            clear_dir_contents(&path)?;
            fs::remove_dir(&path)?;
        } else {
            fs::remove_file(&path)?;
        }
    }
    Ok(())
}

/// Put `include` at the top of the SSH config at `master`
///
/// The file is created when missing and left untouched when a line before
/// the first `Host` or `Match` block already equals `include`. An include
/// inside a block only applies to that block's hosts.
pub fn merge_include(master: &Path, include: &str) -> io::Result<MergeOutcome> {
    let existing = match fs::read_to_string(master) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            fs::write(master, format!("{}\n", include))?;
            return Ok(MergeOutcome::Created);
        }
        Err(e) => return Err(e),
    };

    let included = existing
        .lines()
        .take_while(|line| !starts_block(line))
        .any(|line| line.trim() == include);
    if included {
        return Ok(MergeOutcome::AlreadyPresent);
    }

    fs::write(master, format!("{}\n{}", include, existing))?;
    Ok(MergeOutcome::Prepended)
}

fn starts_block(line: &str) -> bool {
    line.split_whitespace().next().is_some_and(|keyword| {
        keyword.eq_ignore_ascii_case("host") || keyword.eq_ignore_ascii_case("match")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use csctcloud_azure::CommandOutput;
    use csctcloud_azure::testing::ScriptedRunner;
    use std::path::PathBuf;
    use std::sync::Arc;

    const HOST: &str = "csctcloud.uwe.ac.uk";

    /// Stand-in for `az ssh config` that writes the files az would
    fn fake_keygen(args: &[&str]) -> CommandOutput {
        let value = |flag: &str| {
            let index = args.iter().position(|arg| *arg == flag).unwrap();
            PathBuf::from(args[index + 1])
        };
        let key_dir = value("--keys-destination-folder");
        let config_file = value("--file");

        fs::write(key_dir.join("id_rsa"), "new private").unwrap();
        fs::write(key_dir.join("id_rsa.pub"), "new public").unwrap();
        fs::write(key_dir.join("id_rsa.pub-aadcert.pub"), "new cert").unwrap();
        fs::write(&config_file, format!("Host {}\n", HOST)).unwrap();

        CommandOutput::ok("").with_stderr(
            "Generated SSH certificate id_rsa.pub-aadcert.pub is valid until 2026-10-18 15:00:00 in local time.",
        )
    }

    fn names_in(dir: &Path) -> Vec<String> {
        let mut names: Vec<_> = fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_merge_creates_missing_config() {
        let temp_dir = tempfile::tempdir().unwrap();
        let master = temp_dir.path().join("config");

        let outcome = merge_include(&master, "Include /x/config").unwrap();

        assert_eq!(outcome, MergeOutcome::Created);
        let content = fs::read_to_string(&master).unwrap();
        assert_eq!(content.lines().collect::<Vec<_>>(), ["Include /x/config"]);
    }

    #[test]
    fn test_merge_prepends_and_keeps_content() {
        let temp_dir = tempfile::tempdir().unwrap();
        let master = temp_dir.path().join("config");
        fs::write(&master, "Host github.com\n    User git\n").unwrap();

        let outcome = merge_include(&master, "Include /x/config").unwrap();

        assert_eq!(outcome, MergeOutcome::Prepended);
        assert_eq!(
            fs::read_to_string(&master).unwrap(),
            "Include /x/config\nHost github.com\n    User git\n"
        );
    }

    #[test]
    fn test_merge_is_idempotent() {
        let temp_dir = tempfile::tempdir().unwrap();
        let master = temp_dir.path().join("config");
        fs::write(&master, "Host github.com\n").unwrap();

        merge_include(&master, "Include /x/config").unwrap();
        let second = merge_include(&master, "Include /x/config").unwrap();

        assert_eq!(second, MergeOutcome::AlreadyPresent);
        let content = fs::read_to_string(&master).unwrap();
        assert_eq!(content.matches("Include /x/config").count(), 1);
    }

    #[test]
    fn test_merge_recognises_indented_include() {
        let temp_dir = tempfile::tempdir().unwrap();
        let master = temp_dir.path().join("config");
        fs::write(&master, "# keys\n  Include /x/config  \nHost *\n").unwrap();

        assert_eq!(
            merge_include(&master, "Include /x/config").unwrap(),
            MergeOutcome::AlreadyPresent
        );
    }

    #[test]
    fn test_merge_ignores_include_scoped_to_a_block() {
        let temp_dir = tempfile::tempdir().unwrap();
        let master = temp_dir.path().join("config");
        fs::write(&master, "Host github.com\n  Include /x/config\n").unwrap();

        assert_eq!(
            merge_include(&master, "Include /x/config").unwrap(),
            MergeOutcome::Prepended
        );
        assert_eq!(
            fs::read_to_string(&master).unwrap(),
            "Include /x/config\nHost github.com\n  Include /x/config\n"
        );

        let matched = temp_dir.path().join("matched");
        fs::write(&matched, "match user student\n  Include /x/config\n").unwrap();
        assert_eq!(
            merge_include(&matched, "Include /x/config").unwrap(),
            MergeOutcome::Prepended
        );
    }

    #[test]
    fn test_clear_dir_contents_is_recursive() {
        let temp_dir = tempfile::tempdir().unwrap();
        let dir = temp_dir.path().join("keys");
        fs::create_dir_all(dir.join("nested/deeper")).unwrap();
        fs::write(dir.join("id_rsa"), "old").unwrap();
        fs::write(dir.join("nested/deeper/stale.pub"), "old").unwrap();

        clear_dir_contents(&dir).unwrap();

        assert!(dir.is_dir());
        assert!(names_in(&dir).is_empty());
    }

    #[tokio::test]
    async fn test_provision_leaves_only_fresh_artifacts() {
        let temp_dir = tempfile::tempdir().unwrap();
        let paths = SshPaths::from_home(temp_dir.path(), "csctcloud");
        fs::create_dir_all(paths.key_dir.join("old-run")).unwrap();
        fs::write(paths.key_dir.join("old-run/leftover"), "old").unwrap();
        fs::write(paths.key_dir.join("id_rsa.pub-aadcert.pub"), "old cert").unwrap();
        fs::write(paths.key_dir.join("expired-cert.pub"), "old").unwrap();

        let runner = Arc::new(ScriptedRunner::new().on_call("az ssh config", fake_keygen));
        provision(&AzureCli::new("az", runner.clone()), HOST, &paths)
            .await
            .unwrap();

        assert_eq!(
            names_in(&paths.key_dir),
            ["config", "id_rsa", "id_rsa.pub", "id_rsa.pub-aadcert.pub"]
        );
        assert_eq!(
            fs::read_to_string(paths.key_dir.join("id_rsa.pub-aadcert.pub")).unwrap(),
            "new cert"
        );
    }

    #[tokio::test]
    async fn test_provision_creates_ssh_dir_and_master_config() {
        let temp_dir = tempfile::tempdir().unwrap();
        let paths = SshPaths::from_home(temp_dir.path(), "csctcloud");
        assert!(!paths.ssh_dir.exists());

        let runner = Arc::new(ScriptedRunner::new().on_call("az ssh config", fake_keygen));
        provision(&AzureCli::new("az", runner.clone()), HOST, &paths)
            .await
            .unwrap();

        let content = fs::read_to_string(&paths.master_config).unwrap();
        assert_eq!(content.lines().collect::<Vec<_>>(), [paths.include_line()]);
    }

    #[tokio::test]
    async fn test_provision_key_generation_failure() {
        let temp_dir = tempfile::tempdir().unwrap();
        let paths = SshPaths::from_home(temp_dir.path(), "csctcloud");

        let runner = Arc::new(
            ScriptedRunner::new().on("az ssh config", CommandOutput::failed(1, "AADSTS700082")),
        );
        let result = provision(&AzureCli::new("az", runner.clone()), HOST, &paths).await;

        match result {
            Err(ConnectError::KeyGeneration { stderr }) => assert_eq!(stderr, "AADSTS700082"),
            other => panic!("Expected KeyGeneration, got {:?}", other),
        }
        assert!(!paths.master_config.exists());
    }

    #[tokio::test]
    async fn test_provision_without_expiry_still_succeeds() {
        let temp_dir = tempfile::tempdir().unwrap();
        let paths = SshPaths::from_home(temp_dir.path(), "csctcloud");

        let runner = Arc::new(ScriptedRunner::new().on("az ssh config", CommandOutput::ok("")));
        provision(&AzureCli::new("az", runner.clone()), HOST, &paths)
            .await
            .unwrap();
        assert!(paths.master_config.exists());
    }

    #[tokio::test]
    async fn test_keygen_that_cannot_start_is_a_generation_failure() {
        let temp_dir = tempfile::tempdir().unwrap();
        let paths = SshPaths::from_home(temp_dir.path(), "csctcloud");

        let runner = Arc::new(ScriptedRunner::new());
        let result = provision(&AzureCli::new("az", runner.clone()), HOST, &paths).await;

        match result {
            Err(e @ ConnectError::KeyGeneration { .. }) => {
                assert!(e.notification().is_some());
                assert!(e.to_string().contains("no scripted response"));
            }
            other => panic!("Expected KeyGeneration, got {:?}", other),
        }
    }
}
