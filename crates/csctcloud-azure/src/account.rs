//! Account payload inspection
//!
//! `az account show` prints a single object, while `az login` prints one
//! object per subscription the user can see. Either way the subscription
//! display name lives in `name`.

use crate::error::Result;
use serde::Deserialize;

/// State of the locally cached az session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// No account is logged in
    Absent,
    /// An account is logged in but cannot see the target resource
    Unauthorized,
    Authorized,
}

impl SessionStatus {
    pub fn needs_login(&self) -> bool {
        !matches!(self, Self::Authorized)
    }
}

#[derive(Debug, Deserialize)]
struct Subscription {
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AccountPayload {
    Many(Vec<Subscription>),
    One(Subscription),
}

/// Check whether an account payload grants access to `resource_name`
///
/// Anything that is not an object or an array of objects, each carrying a
/// string `name`, is an error rather than `false`: an unexpected shape usually
/// means an unexpected tenant, and asking the user to log in again would not
/// help.
pub fn is_resource_allowed(payload: &str, resource_name: &str) -> Result<bool> {
    let allowed = match serde_json::from_str::<AccountPayload>(payload)? {
        AccountPayload::Many(subscriptions) => subscriptions
            .iter()
            .any(|subscription| subscription.name == resource_name),
        AccountPayload::One(subscription) => subscription.name == resource_name,
    };
    Ok(allowed)
}
