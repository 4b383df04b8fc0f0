//! Azure CLI integration for CSCT Cloud Connect
//!
//! This crate drives the `az` CLI to check the user's session, log in,
//! install the `ssh` extension and issue short-lived SSH certificates.
//!
//! # Requirements
//!
//! - `az` must be installed and on `PATH`
//! - Authentication is handled entirely by `az login`
//!
//! # Example
//!
//! ```ignore
//! use csctcloud_azure::{AzureCli, SystemRunner};
//! use std::sync::Arc;
//!
//! let az = AzureCli::new("az", Arc::new(SystemRunner));
//! az.check_installed().await?;
//!
//! let status = az.session_status("CSCT Cloud Programming").await?;
//! if status.needs_login() {
//!     let payload = az.login().await?;
//! }
//! ```

pub mod account;
pub mod az;
pub mod error;
pub mod process;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use account::{SessionStatus, is_resource_allowed};
pub use az::{AzureCli, SshConfigOutput};
pub use error::{AzureError, Result};
pub use process::{CommandOutput, CommandRunner, SystemRunner};
