//! The connection procedure
//!
//! Steps run strictly one after another. The first failure ends the run: it
//! is logged with its captured output and, when the user needs to act on it,
//! also shown in a blocking message box.

use crate::editor::{self, Editor, Launch};
use crate::error::{ConnectError, Severity};
use crate::extension::ensure_extension;
use crate::logging::critical;
use crate::notify::Notifier;
use crate::platform::Platform;
use crate::provision::provision;
use crate::session::ensure_session;
use csctcloud_azure::{AzureCli, AzureError};
use csctcloud_config::{Settings, SshPaths};
use futures_util::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;

/// Everything one connection attempt needs
pub struct Context {
    pub settings: Settings,
    pub paths: SshPaths,
    pub platform: Platform,
    pub az: AzureCli,
    pub editor: Editor,
    pub notifier: Box<dyn Notifier>,
}

/// Run every step and report the first failure
///
/// Returns whether the run succeeded.
pub async fn execute(ctx: &Context) -> bool {
    match run(ctx).await {
        Ok(_) => true,
        Err(e) => {
            report(ctx, &e).await;
            false
        }
    }
}

/// Await `run`, turning a panic into a logged critical failure
pub async fn guarded<F>(run: F) -> bool
where
    F: Future<Output = bool>,
{
    std::panic::set_hook(Box::new(|info| {
        critical!("Unexpected exception: {}", info);
    }));
    let succeeded = AssertUnwindSafe(run).catch_unwind().await.unwrap_or(false);
    let _ = std::panic::take_hook();
    succeeded
}

/// Run every step, stopping at the first failure
pub async fn run(ctx: &Context) -> Result<Launch, ConnectError> {
    let settings = &ctx.settings;

    tracing::debug!("Checking Azure CLI tools are installed");
    ctx.az.check_installed().await.map_err(|e| match e {
        AzureError::CliNotFound => ConnectError::CliMissing,
        other => other.into(),
    })?;
    tracing::debug!("Azure CLI tools are installed");

    ensure_session(&ctx.az, &settings.resource_name).await?;
    ensure_extension(&ctx.az, &settings.extension).await?;
    provision(&ctx.az, &settings.host, &ctx.paths).await?;

    editor::launch_or_instruct(&ctx.editor, &settings.host, ctx.platform).await
}

/// Log `e` at its severity, then show its message box if it has one
pub async fn report(ctx: &Context, e: &ConnectError) {
    match e.severity() {
        Severity::Critical => critical!("{}", e),
        Severity::Error => tracing::error!("{}", e),
    }

    if let Some(message) = e.notification() {
        ctx.notifier
            .notify(&message, &ctx.settings.notification_title)
            .await;
    }
}
