//! Directory trait implementations over the Entra and SCIM clients.

use async_trait::async_trait;
use groupsync_entra::{DirectoryClient, DirectoryMember, EntraGroupId};
use groupsync_scim::{GroupPatcher, PatchOutcome, ScimGroupClient, ScimGroupId, ScimUserId};

use crate::error::ReconcileResult;
use crate::traits::{SourceDirectory, TargetDirectory};

#[async_trait]
impl SourceDirectory for DirectoryClient {
    async fn resolve_group(&self, name: &str) -> ReconcileResult<Option<EntraGroupId>> {
        Ok(self.resolve_group_id(name).await?)
    }

    async fn list_members(&self, group_id: &EntraGroupId) -> ReconcileResult<Vec<DirectoryMember>> {
        Ok(DirectoryClient::list_members(self, group_id).await?)
    }
}

/// SCIM target made of a lookup client and a patcher sharing one HTTP client.
#[derive(Debug, Clone)]
pub struct ScimTarget {
    groups: ScimGroupClient,
    patcher: GroupPatcher,
}

impl ScimTarget {
    #[must_use]
    pub fn new(groups: ScimGroupClient, patcher: GroupPatcher) -> Self {
        Self { groups, patcher }
    }
}

#[async_trait]
impl TargetDirectory for ScimTarget {
    async fn resolve_group(&self, name: &str) -> ReconcileResult<Option<ScimGroupId>> {
        Ok(self.groups.resolve_group_id(name).await?)
    }

    async fn list_member_names(&self, group_id: &ScimGroupId) -> ReconcileResult<Vec<String>> {
        Ok(self.groups.list_group_members(group_id).await?)
    }

    async fn resolve_user(&self, principal_name: &str) -> ReconcileResult<Option<ScimUserId>> {
        Ok(self.groups.resolve_user_id(principal_name).await?)
    }

    async fn add_members(&self, group_id: Option<&ScimGroupId>, ids: &[ScimUserId]) -> PatchOutcome {
        self.patcher.submit(group_id, ids).await
    }
}
