//! Result of one reconciliation run.

use serde::Serialize;

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    /// Every source member is already in the target group.
    AllPresent,
    /// Members are missing but none could be found on the target.
    NothingResolved,
    /// Users resolved, but the target group does not exist.
    TargetGroupMissing,
    /// Users resolved; submission suppressed.
    DryRun,
    /// Users resolved; the operator declined the change.
    Declined,
    Patched { status: u16, added: usize },
    PatchRejected { status: u16, body: String },
    PatchFailed { error: String },
}

impl Outcome {
    /// A change was wanted but did not go through.
    #[must_use]
    pub fn is_patch_failure(&self) -> bool {
        matches!(self, Self::PatchRejected { .. } | Self::PatchFailed { .. })
    }
}

/// A missing member matched to a target user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedUser {
    pub display_name: String,
    pub principal_name: String,
    pub target_id: String,
}

/// A missing member that will not be added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Unresolved {
    pub display_name: String,
    pub principal_name: String,
    pub reason: String,
}

/// Everything the run observed and did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub source_group: String,
    pub target_group: String,
    pub source_group_id: Option<String>,
    pub target_group_id: Option<String>,
    pub source_member_count: usize,
    pub target_member_count: usize,
    /// Sorted display names.
    pub missing: Vec<String>,
    pub resolved: Vec<ResolvedUser>,
    pub unresolved: Vec<Unresolved>,
    pub dry_run: bool,
    pub outcome: Outcome,
}

impl RunReport {
    /// Both named groups exist.
    #[must_use]
    pub fn groups_found(&self) -> bool {
        self.source_group_id.is_some() && self.target_group_id.is_some()
    }

    /// Some missing members could not be resolved.
    #[must_use]
    pub fn is_partial(&self) -> bool {
        !self.unresolved.is_empty()
    }
}
