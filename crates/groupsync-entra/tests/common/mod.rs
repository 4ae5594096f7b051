//! Common test utilities for groupsync-entra integration tests.

#![allow(dead_code)]

use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use groupsync_entra::{
    DirectoryClient, EntraCloudEnvironment, EntraConfig, GraphClient, RateLimitConfig,
    StaticToken, TokenProvider,
};

pub const TENANT_ID: &str = "test-tenant";

/// Test data factory for a user member as returned by `/groups/{id}/members`.
pub fn create_user_member(display_name: &str, upn: &str) -> Value {
    json!({
        "@odata.type": "#microsoft.graph.user",
        "displayName": display_name,
        "userPrincipalName": upn
    })
}

/// Test data factory for a nested group member.
pub fn create_group_member(display_name: &str) -> Value {
    json!({
        "@odata.type": "#microsoft.graph.group",
        "displayName": display_name
    })
}

/// Test data factory for a group search hit.
pub fn create_group(id: &str, name: &str) -> Value {
    json!({ "id": id, "displayName": name })
}

/// Wraps items in an OData response format.
pub fn create_odata_response(items: Vec<Value>, next_link: Option<&str>) -> Value {
    let mut response = json!({ "value": items });
    if let Some(link) = next_link {
        response["@odata.nextLink"] = json!(link);
    }
    response
}

/// Creates an OData error response.
pub fn create_odata_error(code: &str, message: &str) -> Value {
    json!({
        "error": {
            "code": code,
            "message": message
        }
    })
}

/// Creates a mock OAuth token response.
pub fn create_token_response(access_token: &str, expires_in: u64) -> Value {
    json!({
        "access_token": access_token,
        "token_type": "Bearer",
        "expires_in": expires_in
    })
}

/// Generates `count` user members named `User {i}`.
pub fn generate_members(count: usize) -> Vec<Value> {
    (0..count)
        .map(|i| create_user_member(&format!("User {i}"), &format!("user{i}@test.onmicrosoft.com")))
        .collect()
}

/// Mock server wrapper with common setup helpers.
pub struct MockGraphServer {
    pub server: MockServer,
}

impl MockGraphServer {
    /// Creates a new mock Graph API server.
    pub async fn new() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Returns the mock server's base URL.
    pub fn url(&self) -> String {
        self.server.uri()
    }

    /// Cloud environment pointing both Graph and login at the mock.
    pub fn cloud(&self) -> EntraCloudEnvironment {
        EntraCloudEnvironment::Custom {
            graph_endpoint: self.url(),
            login_endpoint: self.url(),
        }
    }

    /// Graph client authenticated with a fixed token.
    pub fn graph_client(&self) -> GraphClient {
        self.graph_client_with(Arc::new(StaticToken::new("mock-access-token")))
    }

    /// Graph client using the given token provider.
    pub fn graph_client_with(&self, tokens: Arc<dyn TokenProvider>) -> GraphClient {
        GraphClient::new(
            tokens,
            self.cloud(),
            "v1.0".to_string(),
            Duration::from_secs(5),
        )
        .unwrap()
        .with_rate_limit_config(RateLimitConfig::for_testing())
        .unwrap()
    }

    /// Directory client with the given strictness.
    pub fn directory(&self, strict_group_names: bool) -> DirectoryClient {
        let config = EntraConfig::builder()
            .tenant_id(TENANT_ID)
            .cloud_environment(self.cloud())
            .strict_group_names(strict_group_names)
            .build()
            .unwrap();
        DirectoryClient::new(self.graph_client(), &config)
    }

    /// Sets up the OAuth token endpoint.
    pub async fn mock_token_endpoint(&self, access_token: &str, expected_calls: u64) {
        Mock::given(method("POST"))
            .and(path(format!("/{TENANT_ID}/oauth2/v2.0/token")))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(create_token_response(access_token, 3600)),
            )
            .expect(expected_calls)
            .mount(&self.server)
            .await;
    }

    /// Sets up the group search endpoint.
    pub async fn mock_groups_endpoint(&self, groups: Vec<Value>) {
        Mock::given(method("GET"))
            .and(path("/v1.0/groups"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(create_odata_response(groups, None)),
            )
            .mount(&self.server)
            .await;
    }

    /// Serves `members` in pages of `page_size`, chained with `$skiptoken` links.
    ///
    /// Every page is expected to be requested exactly once.
    pub async fn mock_paged_members(&self, group_id: &str, members: Vec<Value>, page_size: usize) {
        let pages: Vec<Vec<Value>> = if members.is_empty() {
            vec![Vec::new()]
        } else {
            members.chunks(page_size).map(<[Value]>::to_vec).collect()
        };
        let total_pages = pages.len();
        let members_path = format!("/v1.0/groups/{group_id}/members");

        for (i, page) in pages.into_iter().enumerate() {
            let next_link = (i + 1 < total_pages).then(|| {
                format!(
                    "{}{}?$select=displayName,userPrincipalName&$skiptoken=page{}",
                    self.url(),
                    members_path,
                    i + 1
                )
            });
            let response = create_odata_response(page, next_link.as_deref());

            let template = ResponseTemplate::new(200).set_body_json(response);
            let mock = if i == 0 {
                Mock::given(method("GET"))
                    .and(path(members_path.clone()))
                    .respond_with(template)
                    .with_priority(5)
            } else {
                Mock::given(method("GET"))
                    .and(path(members_path.clone()))
                    .and(query_param("$skiptoken", format!("page{i}")))
                    .respond_with(template)
                    .with_priority(1)
            };
            mock.expect(1).mount(&self.server).await;
        }
    }
}
