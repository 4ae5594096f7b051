//! Microsoft Entra ID directory client for groupsync
//!
//! Reads group membership from Entra ID (formerly Azure AD) through the
//! Microsoft Graph API.
//!
//! # Features
//!
//! - `OAuth2` client credentials authentication with token caching
//! - Group lookup by display name
//! - Member listing with `@odata.nextLink` pagination
//! - Retry on throttling (`429` + `Retry-After`) and transient gateway errors
//! - Multi-cloud support (Global, US Government, China)
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use groupsync_entra::{
//!     DirectoryClient, EntraConfig, EntraCredentials, GraphClient, TokenCache,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = EntraConfig::builder().tenant_id("your-tenant-id").build()?;
//! let credentials = EntraCredentials {
//!     client_id: "your-client-id".to_string(),
//!     client_secret: "your-client-secret".to_string().into(),
//! };
//!
//! let tokens = Arc::new(TokenCache::new(
//!     credentials,
//!     config.cloud_environment.clone(),
//!     config.tenant_id.clone(),
//!     reqwest::Client::new(),
//! ));
//! let graph = GraphClient::new(
//!     tokens,
//!     config.cloud_environment.clone(),
//!     config.api_version.clone(),
//!     Duration::from_secs(config.timeout_secs),
//! )?;
//! let directory = DirectoryClient::new(graph, &config);
//!
//! if let Some(group_id) = directory.resolve_group_id("Engineering").await? {
//!     let members = directory.list_members(&group_id).await?;
//!     println!("{} members", members.len());
//! }
//! # Ok(())
//! # }
//! ```

mod auth;
mod config;
mod directory;
mod error;
mod graph_client;
mod rate_limit;

pub use auth::{StaticToken, TokenCache, TokenProvider};
pub use config::{EntraCloudEnvironment, EntraConfig, EntraConfigBuilder, EntraCredentials};
pub use directory::{DirectoryClient, DirectoryMember, EntraGroupId};
pub use error::{EntraError, EntraResult};
pub use graph_client::{GraphClient, ODataError, ODataErrorBody, ODataResponse};
pub use rate_limit::{RateLimitConfig, RateLimiter};
