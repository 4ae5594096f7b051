//! SCIM 2.0 wire types (RFC 7643/7644) for group membership work.

use serde::{Deserialize, Serialize};

/// Identifier of a group on the SCIM service provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScimGroupId(String);

impl ScimGroupId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ScimGroupId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a user on the SCIM service provider.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScimUserId(String);

impl ScimUserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ScimUserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// SCIM List Response (RFC 7644 Section 3.4.2).
///
/// Every field except the resources is optional; providers differ in what
/// they echo back.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScimListResponse<T> {
    #[serde(default)]
    pub schemas: Vec<String>,

    /// Total number of results matching the query.
    #[serde(default)]
    pub total_results: Option<i64>,

    /// 1-based index of the first result in this page.
    #[serde(default)]
    pub start_index: Option<i64>,

    #[serde(default)]
    pub items_per_page: Option<i64>,

    /// The resources in this page.
    #[serde(rename = "Resources", default = "Vec::new")]
    pub resources: Vec<T>,
}

/// Group summary as returned by `GET /Groups`.
///
/// Entries without an `id` can still be listed; they are never matched.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScimGroupSummary {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// User summary as returned by `GET /Users`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScimUserSummary {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub user_name: Option<String>,
}

/// Entry of a group's `members` attribute.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScimMemberRef {
    /// SCIM id of the member. Only the display name is read.
    #[serde(default)]
    pub value: Option<String>,

    /// Display name; Netskope fills this with the userName.
    #[serde(default)]
    pub display: Option<String>,
}

/// Projection of a group resource fetched with `attributes=members`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScimGroupMembers {
    #[serde(default)]
    pub id: Option<String>,

    /// Absent or `null` when the group is empty.
    #[serde(default)]
    pub members: Option<Vec<ScimMemberRef>>,
}

/// SCIM PATCH operation (RFC 7644 Section 3.5.2).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScimPatchOp {
    pub op: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
}

/// SCIM PATCH request (RFC 7644 Section 3.5.2).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScimPatchRequest {
    #[serde(rename = "Operations")]
    pub operations: Vec<ScimPatchOp>,

    pub schemas: Vec<String>,
}

impl ScimPatchRequest {
    /// SCIM Patch Operation schema URI.
    pub const SCHEMA: &'static str = "urn:ietf:params:scim:api:messages:2.0:PatchOp";

    /// Single `add` operation on `members`, one `{"value": id}` per user.
    #[must_use]
    pub fn add_members(ids: &[ScimUserId]) -> Self {
        let value = ids
            .iter()
            .map(|id| serde_json::json!({ "value": id.as_str() }))
            .collect();
        Self {
            operations: vec![ScimPatchOp {
                op: "add".to_string(),
                path: Some("members".to_string()),
                value: Some(serde_json::Value::Array(value)),
            }],
            schemas: vec![Self::SCHEMA.to_string()],
        }
    }
}
