//! Visual Studio Code launcher

use crate::error::ConnectError;
use crate::platform::Platform;
use csctcloud_azure::CommandRunner;
use std::sync::Arc;

/// How the user ends up on the remote host
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Launch {
    /// The editor opened a remote window
    Opened,
    /// No editor; the user was told how to connect by hand
    Manual(String),
}

/// Editor CLI wrapper
pub struct Editor {
    program: String,
    runner: Arc<dyn CommandRunner>,
}

impl Editor {
    pub fn new(program: impl Into<String>, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            program: program.into(),
            runner,
        }
    }

    /// Whether the editor CLI answers a version query
    pub async fn is_available(&self) -> bool {
        tracing::debug!("Running: {} --version", self.program);
        match self.runner.run(&self.program, &["--version"]).await {
            Ok(output) => output.success(),
            Err(e) => {
                tracing::debug!("{} could not be started: {}", self.program, e);
                false
            }
        }
    }

    /// Open a new window connected to `host` over SSH
    pub async fn open_remote(&self, host: &str) -> Result<(), ConnectError> {
        let target = format!("ssh-remote+{}", host);
        let args = ["-n", "--remote", target.as_str()];
        tracing::debug!("Running: {} {}", self.program, args.join(" "));

        let output = self
            .runner
            .run(&self.program, &args)
            .await
            .map_err(|e| ConnectError::EditorLaunch {
                stderr: e.to_string(),
            })?;
        if !output.success() {
            return Err(ConnectError::EditorLaunch {
                stderr: output.stderr.trim().to_string(),
            });
        }
        Ok(())
    }
}

/// Open the editor on `host`, or print the ssh command when there is no editor
pub async fn launch_or_instruct(
    editor: &Editor,
    host: &str,
    platform: Platform,
) -> Result<Launch, ConnectError> {
    tracing::debug!("Launching Visual Studio Code");
    if !editor.is_available().await {
        tracing::warn!("Visual Studio Code is not available");
        let instructions = manual_instructions(host, platform);
        println!("{}", instructions);
        return Ok(Launch::Manual(instructions));
    }

    editor.open_remote(host).await?;
    tracing::info!("Visual Studio Code launched with remote connection to {}", host);
    Ok(Launch::Opened)
}

/// What to type to connect without the editor
pub fn manual_instructions(host: &str, platform: Platform) -> String {
    format!(
        "To connect, open {} and run:\n\n    ssh {}\n",
        platform.terminal_name(),
        host
    )
}
