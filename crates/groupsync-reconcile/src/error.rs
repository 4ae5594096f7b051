//! Errors that abort a reconciliation run.

use groupsync_entra::EntraError;
use groupsync_scim::ScimClientError;
use thiserror::Error;

pub type ReconcileResult<T> = Result<T, ReconcileError>;

/// Whole-phase failure. Per-user resolution problems never surface here;
/// they are recorded in the run report instead.
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("Entra ID: {0}")]
    Source(#[from] EntraError),

    #[error("SCIM target: {0}")]
    Target(#[from] ScimClientError),
}

impl ReconcileError {
    /// Credentials were rejected on either side.
    #[must_use]
    pub fn is_auth(&self) -> bool {
        match self {
            Self::Source(e) => e.is_auth(),
            Self::Target(e) => matches!(e, ScimClientError::AuthError(_)),
        }
    }

    /// No usable HTTP response was received.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        match self {
            Self::Source(e) => e.is_transport(),
            Self::Target(e) => e.is_transport(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        let auth: ReconcileError = EntraError::Auth("bad secret".into()).into();
        assert!(auth.is_auth());
        assert!(!auth.is_transport());

        let scim_auth: ReconcileError = ScimClientError::AuthError("401".into()).into();
        assert!(scim_auth.is_auth());

        let net: ReconcileError = ScimClientError::Unreachable("dns".into()).into();
        assert!(net.is_transport());
        assert!(net.to_string().starts_with("SCIM target:"));
    }
}
