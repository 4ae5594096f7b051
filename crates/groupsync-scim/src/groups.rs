//! Group and user lookups on the SCIM target.

use crate::client::{escape_scim_filter_value, ScimClient};
use crate::config::DEFAULT_PAGE_SIZE;
use crate::error::ScimClientResult;
use crate::models::{ScimGroupId, ScimGroupMembers, ScimGroupSummary, ScimUserId, ScimUserSummary};
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument, warn};

/// Read-side operations on SCIM groups and users.
#[derive(Debug, Clone)]
pub struct ScimGroupClient {
    client: ScimClient,
    page_size: i64,
}

impl ScimGroupClient {
    #[must_use]
    pub fn new(client: ScimClient) -> Self {
        Self {
            client,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    #[must_use]
    pub fn with_page_size(mut self, page_size: i64) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    #[must_use]
    pub fn client(&self) -> &ScimClient {
        &self.client
    }

    /// Find a group by exact, case-sensitive `displayName`.
    #[instrument(skip(self), fields(page_size = self.page_size))]
    pub async fn resolve_group_id(&self, name: &str) -> ScimClientResult<Option<ScimGroupId>> {
        let found: Option<String> = self
            .find_paged("Groups", None, |group: ScimGroupSummary| {
                group
                    .id
                    .filter(|_| group.display_name.as_deref() == Some(name))
            })
            .await?;

        match found {
            Some(id) => {
                info!(group_id = %id, "Resolved SCIM group");
                Ok(Some(ScimGroupId::new(id)))
            }
            None => {
                warn!("SCIM group not found");
                Ok(None)
            }
        }
    }

    /// Display names of the group's current members.
    ///
    /// A group without a `members` attribute is empty. Entries without
    /// `display` are skipped.
    #[instrument(skip_all, fields(group_id = %group_id))]
    pub async fn list_group_members(&self, group_id: &ScimGroupId) -> ScimClientResult<Vec<String>> {
        let path = format!("Groups/{}", group_id.as_str());
        let group: ScimGroupMembers = self.client.get_resource(&path, "members").await?;

        let members = group.members.unwrap_or_default();
        let total = members.len();
        let names: Vec<String> = members
            .into_iter()
            .filter_map(|m| m.display.filter(|d| !d.is_empty()))
            .collect();

        if names.len() < total {
            debug!(skipped = total - names.len(), "Members without display name skipped");
        }
        info!(count = names.len(), "Fetched SCIM group members");
        Ok(names)
    }

    /// Find a user by `userName`, compared case-insensitively.
    #[instrument(skip(self))]
    pub async fn resolve_user_id(&self, user_name: &str) -> ScimClientResult<Option<ScimUserId>> {
        let filter = format!("userName eq \"{}\"", escape_scim_filter_value(user_name));
        let wanted = user_name.to_lowercase();

        let found: Option<String> = self
            .find_paged("Users", Some(&filter), |user: ScimUserSummary| {
                let exact = user
                    .user_name
                    .as_deref()
                    .is_some_and(|n| n.to_lowercase() == wanted);
                user.id.filter(|_| exact)
            })
            .await?;

        Ok(found.map(|id| {
            debug!(user_id = %id, "Resolved SCIM user");
            ScimUserId::new(id)
        }))
    }

    /// Walk `startIndex`/`count` pages until `select` yields a value or the
    /// listing is exhausted.
    ///
    /// Stops on an empty page, a short page, or once `totalResults` says
    /// nothing is left.
    async fn find_paged<T, R, F>(
        &self,
        resource: &str,
        filter: Option<&str>,
        mut select: F,
    ) -> ScimClientResult<Option<R>>
    where
        T: DeserializeOwned,
        F: FnMut(T) -> Option<R>,
    {
        let count = self.page_size;
        let mut start_index: i64 = 1;

        loop {
            let page = self
                .client
                .list_page::<T>(resource, filter, start_index, count)
                .await?;
            let fetched = page.resources.len() as i64;
            debug!(resource, start_index, fetched, total = ?page.total_results, "Fetched page");

            if fetched == 0 {
                return Ok(None);
            }
            if let Some(hit) = page.resources.into_iter().find_map(&mut select) {
                return Ok(Some(hit));
            }
            if page
                .total_results
                .is_some_and(|total| total < start_index + count)
                || fetched < count
            {
                return Ok(None);
            }

            start_index += count;
        }
    }
}
