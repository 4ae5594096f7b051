//! # groupsync-scim
//!
//! SCIM 2.0 client for the target side of group reconciliation, tuned for
//! Netskope's `/api/v2/scim` endpoint.
//!
//! - [`ScimGroupClient`] resolves groups and users with `startIndex`/`count`
//!   pagination and reads a group's current members.
//! - [`GroupPatcher`] adds users to a group with a single PatchOp request.
//!
//! Reads back off on HTTP 429 (honouring `Retry-After`) and on 502/503/504.
//! The membership PATCH is sent exactly once.
//!
//! ```no_run
//! use groupsync_scim::{GroupPatcher, ScimClient, ScimConfig, ScimCredentials, ScimGroupClient};
//! use secrecy::SecretString;
//!
//! # async fn example() -> groupsync_scim::ScimClientResult<()> {
//! let config = ScimConfig::new(
//!     ScimConfig::netskope_base_url("acme"),
//!     ScimCredentials::netskope(SecretString::from("api-token".to_string())),
//! );
//! let client = ScimClient::new(&config)?;
//! let groups = ScimGroupClient::new(client.clone()).with_page_size(config.page_size);
//!
//! let group_id = groups.resolve_group_id("Crest Core QA").await?;
//! if let Some(user_id) = groups.resolve_user_id("bob@x.com").await? {
//!     GroupPatcher::new(client).submit(group_id.as_ref(), &[user_id]).await;
//! }
//! # Ok(())
//! # }
//! ```

mod auth;
mod client;
mod config;
mod error;
mod groups;
mod models;
mod patch;
mod retry;

pub use auth::{ScimAuth, ScimCredentials, NETSKOPE_TOKEN_HEADER};
pub use client::{
    escape_scim_filter_value, parse_retry_after, ScimClient, SCIM_ACCEPT, SCIM_CONTENT_TYPE,
};
pub use config::{ScimConfig, DEFAULT_PAGE_SIZE, DEFAULT_TIMEOUT_SECS};
pub use error::{ScimClientError, ScimClientResult};
pub use groups::ScimGroupClient;
pub use models::{
    ScimGroupId, ScimGroupMembers, ScimGroupSummary, ScimListResponse, ScimMemberRef,
    ScimPatchOp, ScimPatchRequest, ScimUserId, ScimUserSummary,
};
pub use patch::{GroupPatcher, PatchOutcome, PatchRequest};
pub use retry::RetryPolicy;
