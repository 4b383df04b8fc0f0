//! az CLI wrapper
//!
//! Wraps the az commands needed to obtain SSH credentials for a host.

use crate::account::{SessionStatus, is_resource_allowed};
use crate::error::{AzureError, Result};
use crate::process::{CommandOutput, CommandRunner};
use regex::Regex;
use std::path::Path;
use std::sync::{Arc, LazyLock};

static EXPIRY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"valid until (.*) in local time").expect("expiry pattern is valid")
});

/// az CLI wrapper
#[derive(Clone)]
pub struct AzureCli {
    program: String,
    runner: Arc<dyn CommandRunner>,
}

impl AzureCli {
    pub fn new(program: impl Into<String>, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            program: program.into(),
            runner,
        }
    }

    /// Run an az command and return its output whatever the exit status
    async fn run_command(&self, args: &[&str]) -> Result<CommandOutput> {
        tracing::debug!("Running: {} {}", self.program, args.join(" "));

        let output = self.runner.run(&self.program, args).await?;

        tracing::debug!("{} {} exited with {:?}", self.program, args.join(" "), output.status);
        Ok(output)
    }

    /// Run an az command, failing on a non-zero exit
    async fn run_checked(&self, args: &[&str]) -> Result<CommandOutput> {
        let output = self.run_command(args).await?;
        if !output.success() {
            return Err(AzureError::CommandFailed {
                command: args.join(" "),
                stderr: output.stderr.trim().to_string(),
            });
        }
        Ok(output)
    }

    /// Check that az can be started at all
    pub async fn check_installed(&self) -> Result<()> {
        match self.run_command(&["--version"]).await {
            Ok(output) if output.success() => Ok(()),
            Ok(_) | Err(AzureError::IoError(_)) => Err(AzureError::CliNotFound),
            Err(e) => Err(e),
        }
    }

    /// Inspect the current session against `resource_name`
    pub async fn session_status(&self, resource_name: &str) -> Result<SessionStatus> {
        let output = self.run_command(&["account", "show"]).await?;
        if !output.success() {
            tracing::debug!("No az account currently logged in");
            return Ok(SessionStatus::Absent);
        }

        tracing::debug!("An az account is currently logged in");
        if is_resource_allowed(&output.stdout, resource_name)? {
            Ok(SessionStatus::Authorized)
        } else {
            Ok(SessionStatus::Unauthorized)
        }
    }

    /// Turn off the login experience v2 account picker
    ///
    /// The picker waits for input on the terminal, which a double-clicked
    /// shortcut never provides. Failure is only logged.
    pub async fn disable_login_experience_v2(&self) -> Result<()> {
        let output = self
            .run_command(&["config", "set", "core.login_experience_v2=off"])
            .await?;
        if !output.success() {
            tracing::debug!(
                "Could not disable login experience v2: {}",
                output.stderr.trim()
            );
        }
        Ok(())
    }

    /// Run the interactive browser login and return the subscription payload
    pub async fn login(&self) -> Result<String> {
        let output = self.run_command(&["login"]).await?;
        if !output.success() {
            return Err(AzureError::LoginFailed {
                stderr: output.stderr.trim().to_string(),
            });
        }
        Ok(output.stdout)
    }

    /// Whether an az extension is installed
    pub async fn extension_installed(&self, name: &str) -> Result<bool> {
        let output = self
            .run_command(&["extension", "show", "--name", name])
            .await?;
        Ok(output.success())
    }

    pub async fn add_extension(&self, name: &str) -> Result<()> {
        self.run_checked(&["extension", "add", "--name", name]).await?;
        Ok(())
    }

    /// Generate a key pair and short-lived certificate for `host`
    ///
    /// Keys are written to `key_dir`, and an SSH config entry for `host`
    /// pointing at them is written to `config_file`, replacing any previous
    /// content of that file.
    pub async fn generate_ssh_config(
        &self,
        host: &str,
        config_file: &Path,
        key_dir: &Path,
    ) -> Result<SshConfigOutput> {
        let config_file = config_file.to_string_lossy();
        let key_dir = key_dir.to_string_lossy();

        let output = self
            .run_checked(&[
                "ssh",
                "config",
                "--ip",
                host,
                "--file",
                config_file.as_ref(),
                "--keys-destination-folder",
                key_dir.as_ref(),
                "--overwrite",
            ])
            .await?;

        Ok(SshConfigOutput {
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}

/// Captured output of `az ssh config`
#[derive(Debug, Clone, Default)]
pub struct SshConfigOutput {
    pub stdout: String,
    pub stderr: String,
}

impl SshConfigOutput {
    /// Certificate expiry as printed by az, e.g. `2026-10-18 14:02:11`
    ///
    /// az reports this on stderr even when it succeeds. The text is free-form,
    /// so a missing match is expected to happen eventually.
    pub fn certificate_expiry(&self) -> Option<String> {
        certificate_expiry(&self.stderr).or_else(|| certificate_expiry(&self.stdout))
    }
}

fn certificate_expiry(text: &str) -> Option<String> {
    EXPIRY_PATTERN
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedRunner;

    const RESOURCE: &str = "CSCT Cloud Programming";

    fn cli(runner: &Arc<ScriptedRunner>) -> AzureCli {
        AzureCli::new("az", runner.clone())
    }

    #[tokio::test]
    async fn test_check_installed() {
        let runner = Arc::new(
            ScriptedRunner::new().on("az --version", CommandOutput::ok("azure-cli 2.67.0")),
        );
        assert!(cli(&runner).check_installed().await.is_ok());

        let missing = Arc::new(ScriptedRunner::new());
        assert!(matches!(
            cli(&missing).check_installed().await,
            Err(AzureError::CliNotFound)
        ));

        let broken =
            Arc::new(ScriptedRunner::new().on("az --version", CommandOutput::failed(1, "")));
        assert!(matches!(
            cli(&broken).check_installed().await,
            Err(AzureError::CliNotFound)
        ));
    }

    #[tokio::test]
    async fn test_session_absent() {
        let runner = Arc::new(ScriptedRunner::new().on(
            "az account show",
            CommandOutput::failed(1, "Please run 'az login' to setup account."),
        ));
        let status = cli(&runner).session_status(RESOURCE).await.unwrap();
        assert_eq!(status, SessionStatus::Absent);
    }

    #[tokio::test]
    async fn test_session_authorized_and_unauthorized() {
        let runner = Arc::new(ScriptedRunner::new().on(
            "az account show",
            CommandOutput::ok(r#"{ "name": "CSCT Cloud Programming" }"#),
        ));
        assert_eq!(
            cli(&runner).session_status(RESOURCE).await.unwrap(),
            SessionStatus::Authorized
        );

        let runner = Arc::new(ScriptedRunner::new().on(
            "az account show",
            CommandOutput::ok(r#"{ "name": "Visual Studio" }"#),
        ));
        assert_eq!(
            cli(&runner).session_status(RESOURCE).await.unwrap(),
            SessionStatus::Unauthorized
        );
    }

    #[tokio::test]
    async fn test_session_malformed_payload_is_error() {
        let runner = Arc::new(
            ScriptedRunner::new().on("az account show", CommandOutput::ok("WARNING: something")),
        );
        assert!(matches!(
            cli(&runner).session_status(RESOURCE).await,
            Err(AzureError::AccountPayload(_))
        ));
    }

    #[tokio::test]
    async fn test_login_failure_keeps_stderr() {
        let runner = Arc::new(
            ScriptedRunner::new().on("az login", CommandOutput::failed(1, "User cancelled\n")),
        );
        match cli(&runner).login().await {
            Err(AzureError::LoginFailed { stderr }) => assert_eq!(stderr, "User cancelled"),
            other => panic!("Expected LoginFailed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_disable_login_experience_ignores_failure() {
        let runner = Arc::new(
            ScriptedRunner::new().on("az config set", CommandOutput::failed(2, "unknown")),
        );
        assert!(cli(&runner).disable_login_experience_v2().await.is_ok());
        assert!(runner.was_called("az config set core.login_experience_v2=off"));
    }

    #[tokio::test]
    async fn test_add_extension_failure() {
        let runner = Arc::new(ScriptedRunner::new().on(
            "az extension add",
            CommandOutput::failed(1, "network unreachable"),
        ));
        let err = cli(&runner).add_extension("ssh").await.unwrap_err();
        assert_eq!(err.stderr(), Some("network unreachable"));
        assert!(runner.was_called("az extension add --name ssh"));
    }

    #[tokio::test]
    async fn test_generate_ssh_config_arguments() {
        let runner = Arc::new(ScriptedRunner::new().on(
            "az ssh config",
            CommandOutput::ok("").with_stderr(
                "Generated SSH certificate /k/id_rsa.pub-aadcert.pub is valid until 2026-10-18 14:02:11 in local time.\n",
            ),
        ));

        let output = cli(&runner)
            .generate_ssh_config(
                "csctcloud.uwe.ac.uk",
                Path::new("/k/config"),
                Path::new("/k"),
            )
            .await
            .unwrap();

        assert_eq!(
            runner.calls(),
            vec![
                "az ssh config --ip csctcloud.uwe.ac.uk --file /k/config --keys-destination-folder /k --overwrite"
                    .to_string()
            ]
        );
        assert_eq!(
            output.certificate_expiry().as_deref(),
            Some("2026-10-18 14:02:11")
        );
    }

    #[test]
    fn test_certificate_expiry_missing() {
        let output = SshConfigOutput {
            stdout: String::new(),
            stderr: "Generated SSH certificate somewhere.".to_string(),
        };
        assert_eq!(output.certificate_expiry(), None);
    }

    #[test]
    fn test_certificate_expiry_falls_back_to_stdout() {
        let output = SshConfigOutput {
            stdout: "certificate is valid until 10/18/2026 2:02:11 PM in local time".to_string(),
            stderr: String::new(),
        };
        assert_eq!(
            output.certificate_expiry().as_deref(),
            Some("10/18/2026 2:02:11 PM")
        );
    }
}
