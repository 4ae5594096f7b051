//! Membership PATCH submission.

use crate::client::ScimClient;
use crate::models::{ScimGroupId, ScimPatchRequest, ScimUserId};
use serde::Serialize;
use tracing::{debug, error, info, instrument, warn};

/// An `add members` PATCH bound to its target group.
#[derive(Debug, Clone)]
pub struct PatchRequest {
    pub group_id: ScimGroupId,
    pub body: ScimPatchRequest,
}

impl PatchRequest {
    /// One `add` operation on `members`, in input order.
    #[must_use]
    pub fn add_members(group_id: &ScimGroupId, ids: &[ScimUserId]) -> Self {
        Self {
            group_id: group_id.clone(),
            body: ScimPatchRequest::add_members(ids),
        }
    }

    #[must_use]
    pub fn path(&self) -> String {
        format!("Groups/{}", self.group_id.as_str())
    }
}

/// Result of a membership PATCH.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum PatchOutcome {
    /// Nothing was sent.
    Skipped { reason: String },
    /// 2xx from the provider.
    Applied { status: u16, added: usize },
    /// 4xx/5xx from the provider; `body` is the raw response.
    Rejected { status: u16, body: String },
    /// No response was received.
    Failed { error: String },
}

impl PatchOutcome {
    #[must_use]
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }
}

/// Submits membership additions. Never retries.
#[derive(Debug, Clone)]
pub struct GroupPatcher {
    client: ScimClient,
}

impl GroupPatcher {
    #[must_use]
    pub fn new(client: ScimClient) -> Self {
        Self { client }
    }

    #[instrument(skip_all, fields(group_id = ?group_id.map(ScimGroupId::as_str), count = ids.len()))]
    pub async fn submit(&self, group_id: Option<&ScimGroupId>, ids: &[ScimUserId]) -> PatchOutcome {
        let Some(group_id) = group_id else {
            warn!("Target group ID unknown, skipping PATCH");
            return PatchOutcome::Skipped {
                reason: "target group not found".to_string(),
            };
        };

        if ids.is_empty() {
            info!("No user IDs to add, skipping PATCH");
            return PatchOutcome::Skipped {
                reason: "no user IDs to add".to_string(),
            };
        }

        let request = PatchRequest::add_members(group_id, ids);
        let payload = match serde_json::to_string(&request.body) {
            Ok(payload) => payload,
            Err(e) => {
                return PatchOutcome::Failed {
                    error: format!("Failed to serialize PATCH body: {e}"),
                }
            }
        };
        debug!(%payload, "PATCH payload");

        match self.client.send_patch(&request.path(), payload).await {
            Ok((status, _)) if status.is_success() => {
                info!(status = status.as_u16(), added = ids.len(), "Users added to SCIM group");
                PatchOutcome::Applied {
                    status: status.as_u16(),
                    added: ids.len(),
                }
            }
            Ok((status, body)) => {
                error!(status = status.as_u16(), %body, "SCIM group PATCH rejected");
                PatchOutcome::Rejected {
                    status: status.as_u16(),
                    body,
                }
            }
            Err(e) => {
                error!(error = %e, "SCIM group PATCH failed");
                PatchOutcome::Failed {
                    error: e.to_string(),
                }
            }
        }
    }
}
