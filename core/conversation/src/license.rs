//! License validation for managed mode.

use std::fmt::Debug;

use async_trait::async_trait;

use crate::error::Result;

/// Advisory shown while the managed service is unavailable.
pub const MANAGED_UNAVAILABLE: &str =
    "Premium features are coming soon! Please use Personal mode for now.";

/// Advisory shown when a valid license has no assistant attached.
pub const MANAGED_REQUIRES_ASSISTANT: &str =
    "Premium mode requires an Assistant. Please contact support.";

/// Outcome of a license check.
#[derive(Clone, PartialEq, Eq)]
pub enum LicenseStatus {
    /// The license unlocks a credential and, normally, an assistant.
    Valid {
        credential: String,
        assistant_id: String,
    },
    /// The license cannot be used; `advisory` is shown instead of a reply.
    Invalid { advisory: String },
}

impl Debug for LicenseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LicenseStatus::Valid { assistant_id, .. } => f
                .debug_struct("Valid")
                .field("credential", &"[REDACTED]")
                .field("assistant_id", assistant_id)
                .finish(),
            LicenseStatus::Invalid { advisory } => {
                f.debug_struct("Invalid").field("advisory", advisory).finish()
            }
        }
    }
}

/// Exchanges a managed-mode license code for service credentials.
#[async_trait]
pub trait LicenseValidator: Send + Sync + Debug {
    async fn validate(&self, license_code: &str) -> Result<LicenseStatus>;
}

/// Validator used until the managed service exists: every license is
/// reported invalid with [`MANAGED_UNAVAILABLE`].
#[derive(Debug, Default, Clone, Copy)]
pub struct PendingLicenseValidator;

#[async_trait]
impl LicenseValidator for PendingLicenseValidator {
    async fn validate(&self, _license_code: &str) -> Result<LicenseStatus> {
        Ok(LicenseStatus::Invalid {
            advisory: MANAGED_UNAVAILABLE.to_string(),
        })
    }
}
