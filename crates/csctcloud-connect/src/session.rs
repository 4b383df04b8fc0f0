//! Azure session check and interactive login

use crate::error::ConnectError;
use csctcloud_azure::{AzureCli, AzureError, SessionStatus, is_resource_allowed};

/// Make sure the logged in az account can see `resource`, logging in through
/// the browser when it cannot
pub async fn ensure_session(az: &AzureCli, resource: &str) -> Result<(), ConnectError> {
    tracing::debug!("Checking Azure account status");
    let status = az
        .session_status(resource)
        .await
        .map_err(|e| authorization_error(e, resource))?;

    if !status.needs_login() {
        tracing::info!("Azure account is allowed access to this resource");
        return Ok(());
    }
    if status == SessionStatus::Unauthorized {
        tracing::warn!("Currently logged in Azure account is not allowed access to this resource");
    } else {
        tracing::debug!("No Azure account currently logged in");
    }

    tracing::debug!("Running Azure login flow");
    az.disable_login_experience_v2().await?;
    tracing::info!(
        "Login required, please login to your UWE account in the browser window that has just opened"
    );

    let payload = az.login().await.map_err(|e| match e {
        AzureError::LoginFailed { stderr } => ConnectError::LoginFailed { stderr },
        other => other.into(),
    })?;
    tracing::info!("Azure account logged in");

    tracing::debug!("Checking if account is allowed access to this resource");
    let allowed =
        is_resource_allowed(&payload, resource).map_err(|e| authorization_error(e, resource))?;
    if !allowed {
        return Err(ConnectError::WrongAccount {
            resource: resource.to_string(),
        });
    }

    tracing::info!("Azure account is allowed access to this resource");
    Ok(())
}

/// A payload that cannot be read is never treated as "log in again"
fn authorization_error(e: AzureError, resource: &str) -> ConnectError {
    match e {
        AzureError::AccountPayload(_) => ConnectError::AuthorizationAmbiguous {
            resource: resource.to_string(),
            source: e,
        },
        other => other.into(),
    }
}
