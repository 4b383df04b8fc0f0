//! Blocking message boxes
//!
//! The tool is usually started from a desktop shortcut, so the console window
//! may close before anyone reads it. Failures are therefore also shown in a
//! modal dialog. Each platform family gets its own [`Notifier`]; all of them
//! fall back to a single log line when no dialog can be shown.

use crate::platform::Platform;
use async_trait::async_trait;
use csctcloud_azure::CommandRunner;
use std::sync::Arc;

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Show `message` and wait until the user dismisses it
    async fn notify(&self, message: &str, title: &str);
}

/// Pick the notifier for `platform`
///
/// With `dialogs` off every notification becomes a log line.
pub fn for_platform(
    platform: Platform,
    runner: Arc<dyn CommandRunner>,
    dialogs: bool,
) -> Box<dyn Notifier> {
    if !dialogs {
        return Box::new(LogNotifier);
    }

    match platform {
        #[cfg(any(windows, target_os = "macos"))]
        Platform::Windows | Platform::MacOs => Box::new(DialogNotifier),
        Platform::Linux => Box::new(ZenityNotifier::new(runner)),
        #[allow(unreachable_patterns)]
        _ => Box::new(LogNotifier),
    }
}

/// Message box text squashed onto one line
pub fn flatten(message: &str) -> String {
    message
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Writes notifications to the log only
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, message: &str, title: &str) {
        tracing::error!("{}: {}", title, flatten(message));
    }
}

/// Native message box on Windows and macOS
///
/// The box has no parent window and may open behind the console, so the
/// message is also written to the log before it is shown.
#[cfg(any(windows, target_os = "macos"))]
pub struct DialogNotifier;

#[cfg(any(windows, target_os = "macos"))]
#[async_trait]
impl Notifier for DialogNotifier {
    async fn notify(&self, message: &str, title: &str) {
        LogNotifier.notify(message, title).await;

        let result = rfd::MessageDialog::new()
            .set_level(rfd::MessageLevel::Error)
            .set_title(title)
            .set_description(message)
            .set_buttons(rfd::MessageButtons::Ok)
            .show();
        tracing::debug!("Message box closed with {:?}", result);
    }
}

/// `zenity --error` dialog on Linux desktops
pub struct ZenityNotifier {
    runner: Arc<dyn CommandRunner>,
}

impl ZenityNotifier {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }
}

#[async_trait]
impl Notifier for ZenityNotifier {
    async fn notify(&self, message: &str, title: &str) {
        let title_arg = format!("--title={}", title);
        let text_arg = format!("--text={}", escape_markup(message));

        match self
            .runner
            .run("zenity", &["--error", "--no-wrap", title_arg.as_str(), text_arg.as_str()])
            .await
        {
            Ok(output) if output.success() => {}
            Ok(output) => {
                tracing::debug!("zenity exited with {:?}", output.status);
                LogNotifier.notify(message, title).await;
            }
            Err(e) => {
                tracing::debug!("zenity unavailable: {}", e);
                LogNotifier.notify(message, title).await;
            }
        }
    }
}

/// zenity renders `--text` as Pango markup
fn escape_markup(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
