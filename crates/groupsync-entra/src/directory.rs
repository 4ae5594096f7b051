//! Group lookup and membership listing against Entra ID.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, instrument, warn};

use crate::{EntraConfig, EntraError, EntraResult, GraphClient};

/// `@odata.type` marker of user objects in a membership listing.
const USER_ODATA_TYPE: &str = "#microsoft.graph.user";

/// Entra object ID of a group.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntraGroupId(String);

impl EntraGroupId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntraGroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A user member of an Entra group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryMember {
    /// Display name, used as the comparison key.
    pub display_name: String,
    /// User principal name, used to find the user on the SCIM side.
    pub principal_name: String,
}

impl DirectoryMember {
    /// Builds a member from a Graph directory object.
    ///
    /// Returns `None` for non-user objects (groups, devices, service
    /// principals) and for users missing either name.
    #[must_use]
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        let odata_type = value.get("@odata.type").and_then(|v| v.as_str());
        if odata_type != Some(USER_ODATA_TYPE) {
            return None;
        }

        let display_name = value
            .get("displayName")
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())?;
        let principal_name = value
            .get("userPrincipalName")
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())?;

        Some(Self {
            display_name: display_name.to_string(),
            principal_name: principal_name.to_string(),
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroupRef {
    id: String,
    #[serde(default)]
    display_name: Option<String>,
}

/// Read-only view of Entra groups and their members.
#[derive(Debug, Clone)]
pub struct DirectoryClient {
    graph: GraphClient,
    strict_group_names: bool,
}

impl DirectoryClient {
    #[must_use]
    pub fn new(graph: GraphClient, config: &EntraConfig) -> Self {
        Self {
            graph,
            strict_group_names: config.strict_group_names,
        }
    }

    /// Returns the underlying Graph client.
    #[must_use]
    pub fn graph_client(&self) -> &GraphClient {
        &self.graph
    }

    /// Finds a group by its exact display name.
    ///
    /// A missing group is `Ok(None)`. When several groups share the name the
    /// first one returned by Graph is used, unless strict group names are
    /// enabled, in which case the lookup fails.
    #[instrument(skip(self))]
    pub async fn resolve_group_id(&self, name: &str) -> EntraResult<Option<EntraGroupId>> {
        let filter = format!("displayName eq '{}'", escape_odata_string(name));
        let url = format!(
            "{}/groups?$filter={}&$select=id,displayName",
            self.graph.base_url(),
            urlencoding::encode(&filter)
        );

        info!("Entra: searching for group '{}'", name);

        let mut groups: Vec<GroupRef> = Vec::new();
        self.graph
            .get_paginated(&url, |page: Vec<GroupRef>| {
                groups.extend(page);
                Ok(())
            })
            .await?;

        let Some(first) = groups.first() else {
            warn!("Entra: group '{}' not found", name);
            return Ok(None);
        };

        if groups.len() > 1 {
            if self.strict_group_names {
                return Err(EntraError::AmbiguousGroup {
                    name: name.to_string(),
                    count: groups.len(),
                });
            }
            warn!(
                count = groups.len(),
                "Entra: multiple groups named '{}', using first: {}", name, first.id
            );
        }

        debug!(display_name = ?first.display_name, "Entra: matched group");
        info!("Entra: found group '{}' with ID {}", name, first.id);
        Ok(Some(EntraGroupId::new(first.id.clone())))
    }

    /// Lists the user members of a group, following every result page.
    ///
    /// A failure on any page fails the whole listing.
    #[instrument(skip(self), fields(group_id = %group_id))]
    pub async fn list_members(&self, group_id: &EntraGroupId) -> EntraResult<Vec<DirectoryMember>> {
        let url = format!(
            "{}/groups/{}/members?$select=displayName,userPrincipalName",
            self.graph.base_url(),
            urlencoding::encode(group_id.as_str())
        );

        info!("Entra: fetching members for group {}", group_id);

        let mut members = Vec::new();
        let mut skipped = 0usize;
        let pages = self
            .graph
            .get_paginated(&url, |page: Vec<serde_json::Value>| {
                for value in &page {
                    match DirectoryMember::from_json(value) {
                        Some(member) => members.push(member),
                        None => skipped += 1,
                    }
                }
                Ok(())
            })
            .await?;

        if skipped > 0 {
            debug!(skipped, "Entra: ignored non-user or incomplete members");
        }
        info!(pages, "Entra: found {} members", members.len());
        Ok(members)
    }
}

/// Escapes a string literal for an `OData` `$filter` expression.
fn escape_odata_string(value: &str) -> String {
    value.replace('\'', "''")
}
