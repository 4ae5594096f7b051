//! CLI error types and exit codes

use groupsync_reconcile::{Outcome, ReconcileError, RunReport};
use thiserror::Error;

use crate::config::ConfigError;

/// Exit codes for the CLI
/// - 0: Success, all present, dry run or declined
/// - 1: Configuration or internal error
/// - 2: Authentication failure
/// - 3: Network error
/// - 4: Group not found
/// - 5: Patch rejected or failed
/// - 6: Some missing users could not be resolved
pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Remote service error: {0}")]
    Remote(String),

    #[error("Group not found: {0}")]
    GroupNotFound(String),

    #[error("Membership update failed: {0}")]
    PatchFailed(String),

    #[error("{unresolved} missing user(s) could not be resolved in Netskope")]
    Partial { unresolved: usize },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Config(_) | CliError::Remote(_) | CliError::Internal(_) => 1,
            CliError::Auth(_) => 2,
            CliError::Network(_) => 3,
            CliError::GroupNotFound(_) => 4,
            CliError::PatchFailed(_) => 5,
            CliError::Partial { .. } => 6,
        }
    }

    /// Print the error to stderr with optional color
    pub fn print(&self) {
        let use_color = std::env::var("NO_COLOR").is_err();

        if use_color {
            eprintln!("\x1b[31mError:\x1b[0m {}", self);
        } else {
            eprintln!("Error: {}", self);
        }

        if let Some(suggestion) = self.suggestion() {
            if use_color {
                eprintln!("\n\x1b[33mSuggestion:\x1b[0m {}", suggestion);
            } else {
                eprintln!("\nSuggestion: {}", suggestion);
            }
        }
    }

    fn suggestion(&self) -> Option<&'static str> {
        match self {
            CliError::Config(_) => {
                Some("Check your environment variables or the file passed with --env-file.")
            }
            CliError::Auth(_) => Some(
                "Verify ENTRA_CLIENT_ID/ENTRA_CLIENT_SECRET and NETSKOPE_API_TOKEN, and that the app registration has GroupMember.Read.All.",
            ),
            CliError::Network(_) => Some("Check your network connection and try again."),
            CliError::GroupNotFound(_) => {
                Some("Group names are matched exactly, including case and whitespace.")
            }
            CliError::Partial { .. } => Some(
                "Users must be provisioned in Netskope with a userName equal to their Entra principal name.",
            ),
            _ => None,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        CliError::Config(err.to_string())
    }
}

impl From<ReconcileError> for CliError {
    fn from(err: ReconcileError) -> Self {
        if err.is_auth() {
            CliError::Auth(err.to_string())
        } else if err.is_transport() {
            CliError::Network(err.to_string())
        } else {
            CliError::Remote(err.to_string())
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        CliError::Internal(format!("JSON serialization failed: {}", err))
    }
}

/// Map a completed run to its exit status.
///
/// A missing group outranks a failed patch, which outranks unresolved users.
pub fn check_report(report: &RunReport) -> CliResult<()> {
    let mut missing_groups = Vec::new();
    if report.source_group_id.is_none() {
        missing_groups.push(format!("'{}' in Entra ID", report.source_group));
    }
    if report.target_group_id.is_none() {
        missing_groups.push(format!("'{}' in Netskope", report.target_group));
    }
    if !missing_groups.is_empty() {
        return Err(CliError::GroupNotFound(missing_groups.join(", ")));
    }

    match &report.outcome {
        Outcome::PatchRejected { status, body } => {
            return Err(CliError::PatchFailed(format!("HTTP {}: {}", status, body)));
        }
        Outcome::PatchFailed { error } => {
            return Err(CliError::PatchFailed(error.clone()));
        }
        _ => {}
    }

    if report.is_partial() {
        return Err(CliError::Partial {
            unresolved: report.unresolved.len(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use groupsync_entra::EntraError;
    use groupsync_reconcile::Unresolved;
    use groupsync_scim::ScimClientError;

    fn report(outcome: Outcome) -> RunReport {
        RunReport {
            source_group: "Crest Core QA".into(),
            target_group: "Crest Core QA".into(),
            source_group_id: Some("entra-1".into()),
            target_group_id: Some("scim-1".into()),
            source_member_count: 2,
            target_member_count: 1,
            missing: vec!["Bob B".into()],
            resolved: Vec::new(),
            unresolved: Vec::new(),
            dry_run: false,
            outcome,
        }
    }

    fn unresolved(name: &str) -> Unresolved {
        Unresolved {
            display_name: name.into(),
            principal_name: format!("{}@x.com", name.to_lowercase()),
            reason: "not found in target directory".into(),
        }
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(CliError::Config("x".into()).exit_code(), 1);
        assert_eq!(CliError::Internal("x".into()).exit_code(), 1);
        assert_eq!(CliError::Auth("x".into()).exit_code(), 2);
        assert_eq!(CliError::Network("x".into()).exit_code(), 3);
        assert_eq!(CliError::GroupNotFound("x".into()).exit_code(), 4);
        assert_eq!(CliError::PatchFailed("x".into()).exit_code(), 5);
        assert_eq!(CliError::Partial { unresolved: 1 }.exit_code(), 6);
    }

    #[test]
    fn test_reconcile_error_mapping() {
        let auth: CliError = ReconcileError::from(EntraError::Auth("bad secret".into())).into();
        assert_eq!(auth.exit_code(), 2);

        let scim_auth: CliError =
            ReconcileError::from(ScimClientError::AuthError("HTTP 401".into())).into();
        assert_eq!(scim_auth.exit_code(), 2);

        let net: CliError = ReconcileError::from(ScimClientError::Timeout("30s".into())).into();
        assert_eq!(net.exit_code(), 3);

        let remote: CliError = ReconcileError::from(ScimClientError::ScimError {
            status: 500,
            detail: "boom".into(),
        })
        .into();
        assert_eq!(remote.exit_code(), 1);
    }

    #[test]
    fn test_check_report_success() {
        assert!(check_report(&report(Outcome::Patched {
            status: 200,
            added: 1
        }))
        .is_ok());
        assert!(check_report(&report(Outcome::DryRun)).is_ok());
        assert!(check_report(&report(Outcome::Declined)).is_ok());
        assert!(check_report(&report(Outcome::AllPresent)).is_ok());
    }

    #[test]
    fn test_check_report_group_not_found() {
        let mut r = report(Outcome::AllPresent);
        r.source_group_id = None;
        let err = check_report(&r).unwrap_err();
        assert_eq!(err.exit_code(), 4);
        assert!(err.to_string().contains("in Entra ID"));

        let mut r = report(Outcome::TargetGroupMissing);
        r.target_group_id = None;
        assert_eq!(check_report(&r).unwrap_err().exit_code(), 4);
    }

    #[test]
    fn test_check_report_patch_failure() {
        let err = check_report(&report(Outcome::PatchRejected {
            status: 400,
            body: "invalid value".into(),
        }))
        .unwrap_err();
        assert_eq!(err.exit_code(), 5);
        assert!(err.to_string().contains("HTTP 400"));

        let mut r = report(Outcome::PatchFailed {
            error: "timed out".into(),
        });
        r.unresolved.push(unresolved("Carol"));
        assert_eq!(check_report(&r).unwrap_err().exit_code(), 5);
    }

    #[test]
    fn test_check_report_partial() {
        let mut r = report(Outcome::Patched {
            status: 200,
            added: 1,
        });
        r.unresolved.push(unresolved("Carol"));
        assert_eq!(check_report(&r).unwrap_err().exit_code(), 6);

        let mut r = report(Outcome::NothingResolved);
        r.unresolved.push(unresolved("Bob"));
        r.unresolved.push(unresolved("Carol"));
        let err = check_report(&r).unwrap_err();
        assert_eq!(err.exit_code(), 6);
        assert!(err.to_string().starts_with("2 missing"));
    }
}
