mod banner;
mod connect;
mod editor;
mod error;
mod extension;
mod logging;
mod notify;
mod platform;
mod provision;
mod session;

use anyhow::Context as _;
use clap::Parser;
use colored::Colorize;
use csctcloud_azure::{AzureCli, CommandRunner, SystemRunner};
use csctcloud_config::Settings;
use logging::LogLevel;
use platform::Platform;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "csctcloud-connect")]
#[command(version)]
#[command(
    about = "Sets up an SSH configuration and necessary keys to establish a connection to the CSCT Cloud server, using the Azure CLI tools",
    long_about = None
)]
struct Cli {
    /// Level of detail written to the log file
    #[arg(short, long, value_enum, ignore_case = true, default_value_t = LogLevel::Error)]
    log: LogLevel,
    /// Settings file (YAML)
    #[arg(short, long, env = "CSCTCLOUD_CONFIG")]
    config: Option<PathBuf>,
    /// Never show message boxes, only log failures
    #[arg(long)]
    no_dialog: bool,
    /// Seconds to keep the window open after a successful run
    #[arg(long, value_name = "SECS")]
    linger: Option<u64>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<bool> {
    let settings = Settings::load(cli.config.as_deref()).context("Failed to load settings")?;
    let home = csctcloud_config::home_dir()?;

    let log_path = settings.log_path(&home);
    let log_guard = logging::init(&log_path, cli.log)
        .with_context(|| format!("Failed to open log file {}", log_path.display()))?;

    banner::print_header();
    tracing::info!("CSCT Cloud Connect (v{})", env!("CARGO_PKG_VERSION"));
    tracing::debug!("Logging to {}", log_guard.path().display());

    let platform = match Platform::current() {
        Ok(platform) => platform,
        Err(e) => {
            tracing::error!("{}", e);
            return Ok(false);
        }
    };
    tracing::debug!("Running on {:?}", platform);

    let runner: Arc<dyn CommandRunner> = Arc::new(SystemRunner);
    let ctx = connect::Context {
        paths: settings.ssh_paths(&home),
        platform,
        az: AzureCli::new(settings.az_program.clone(), runner.clone()),
        editor: editor::Editor::new(settings.editor_program.clone(), runner.clone()),
        notifier: notify::for_platform(platform, runner, !cli.no_dialog),
        settings,
    };

    let succeeded = connect::guarded(connect::execute(&ctx)).await;

    if succeeded {
        let linger = cli.linger.unwrap_or(ctx.settings.linger_secs);
        if linger > 0 {
            tokio::time::sleep(Duration::from_secs(linger)).await;
        }
    }

    Ok(succeeded)
}
