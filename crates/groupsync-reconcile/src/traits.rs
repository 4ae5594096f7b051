//! Directory seams the reconciler works against.
//!
//! Production implementations live in [`crate::adapters`]; tests plug in
//! in-memory fakes.

use async_trait::async_trait;
use groupsync_entra::{DirectoryMember, EntraGroupId};
use groupsync_scim::{PatchOutcome, ScimGroupId, ScimUserId};

use crate::error::ReconcileResult;

/// Authoritative side: where membership is read from.
#[async_trait]
pub trait SourceDirectory: Send + Sync {
    /// Group ID for an exact display name, `None` if absent.
    async fn resolve_group(&self, name: &str) -> ReconcileResult<Option<EntraGroupId>>;

    /// Every user member of the group, across all pages.
    async fn list_members(&self, group_id: &EntraGroupId) -> ReconcileResult<Vec<DirectoryMember>>;
}

/// Provisioned side: where missing members are added.
#[async_trait]
pub trait TargetDirectory: Send + Sync {
    async fn resolve_group(&self, name: &str) -> ReconcileResult<Option<ScimGroupId>>;

    /// Display names of current members.
    async fn list_member_names(&self, group_id: &ScimGroupId) -> ReconcileResult<Vec<String>>;

    /// Target user ID for a principal name, `None` if absent.
    async fn resolve_user(&self, principal_name: &str) -> ReconcileResult<Option<ScimUserId>>;

    /// Add users to the group in one request.
    async fn add_members(&self, group_id: Option<&ScimGroupId>, ids: &[ScimUserId]) -> PatchOutcome;
}

/// Asked once before any membership change is submitted.
pub trait Confirm: Send + Sync {
    fn confirm(&self, group_name: &str, count: usize) -> bool;
}

/// Approves every change.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysConfirm;

impl Confirm for AlwaysConfirm {
    fn confirm(&self, _group_name: &str, _count: usize) -> bool {
        true
    }
}

impl<F> Confirm for F
where
    F: Fn(&str, usize) -> bool + Send + Sync,
{
    fn confirm(&self, group_name: &str, count: usize) -> bool {
        self(group_name, count)
    }
}
