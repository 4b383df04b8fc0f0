use crate::error::ConnectError;
use csctcloud_azure::{AzureCli, AzureError};

/// Install the az extension `name` unless it is already available
pub async fn ensure_extension(az: &AzureCli, name: &str) -> Result<(), ConnectError> {
    tracing::debug!("Checking if {} extension is available", name);
    let installed = az
        .extension_installed(name)
        .await
        .map_err(|e| install_error(name, e))?;
    if installed {
        tracing::info!("{} extension available", name);
        return Ok(());
    }

    tracing::warn!("{} extension not available - adding it now", name);
    az.add_extension(name)
        .await
        .map_err(|e| install_error(name, e))?;

    tracing::info!("{} extension successfully added", name);
    Ok(())
}

fn install_error(name: &str, e: AzureError) -> ConnectError {
    match e {
        AzureError::CommandFailed { .. } | AzureError::IoError(_) => {
            ConnectError::ExtensionInstall {
                extension: name.to_string(),
                stderr: e.stderr().map(str::to_string).unwrap_or_else(|| e.to_string()),
            }
        }
        other => other.into(),
    }
}
