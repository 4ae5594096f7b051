//! Mock SCIM server using wiremock for integration testing.

#![allow(dead_code)]

use groupsync_scim::{
    GroupPatcher, RetryPolicy, ScimAuth, ScimClient, ScimCredentials, ScimGroupClient,
};
use secrecy::SecretString;
use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::test_data::list_response;

pub const API_TOKEN: &str = "test-token-123";

pub struct MockScimServer {
    pub server: MockServer,
}

impl MockScimServer {
    pub async fn new() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    /// Client with the Netskope token header and zero-delay backoff.
    pub fn client(&self) -> ScimClient {
        let auth = ScimAuth::new(ScimCredentials::netskope(SecretString::from(
            API_TOKEN.to_string(),
        )));
        ScimClient::with_http_client(self.uri(), auth, reqwest::Client::new())
            .with_retry_policy(RetryPolicy::immediate(3))
    }

    pub fn groups(&self, page_size: i64) -> ScimGroupClient {
        ScimGroupClient::new(self.client()).with_page_size(page_size)
    }

    pub fn patcher(&self) -> GroupPatcher {
        GroupPatcher::new(self.client())
    }

    /// Serve `groups` over `GET /Groups` in pages of `page_size`, each page
    /// expected exactly once.
    pub async fn mock_groups_pages(&self, groups: Vec<Value>, page_size: usize) {
        let total = groups.len();
        if groups.is_empty() {
            Mock::given(method("GET"))
                .and(path("/Groups"))
                .and(query_param("startIndex", "1"))
                .respond_with(ResponseTemplate::new(200).set_body_json(list_response(
                    Vec::new(),
                    Some(0),
                    1,
                )))
                .expect(1)
                .mount(&self.server)
                .await;
            return;
        }

        for (i, chunk) in groups.chunks(page_size).enumerate() {
            let start_index = i * page_size + 1;
            Mock::given(method("GET"))
                .and(path("/Groups"))
                .and(query_param("startIndex", start_index.to_string()))
                .and(query_param("count", page_size.to_string()))
                .respond_with(ResponseTemplate::new(200).set_body_json(list_response(
                    chunk.to_vec(),
                    Some(total),
                    start_index,
                )))
                .expect(1)
                .mount(&self.server)
                .await;
        }
    }

    /// One page of `GET /Groups` at `start_index`.
    pub async fn mock_groups_page(&self, start_index: usize, body: Value) {
        Mock::given(method("GET"))
            .and(path("/Groups"))
            .and(query_param("startIndex", start_index.to_string()))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(1)
            .mount(&self.server)
            .await;
    }

    /// `GET /Groups/{id}?attributes=members`.
    pub async fn mock_group_members(&self, group_id: &str, body: Value) {
        Mock::given(method("GET"))
            .and(path(format!("/Groups/{group_id}")))
            .and(query_param("attributes", "members"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(1)
            .mount(&self.server)
            .await;
    }

    /// `GET /Users?filter=userName eq "<user_name>"` answering with `users`.
    pub async fn mock_user_lookup(&self, user_name: &str, users: Vec<Value>) {
        let total = users.len();
        Mock::given(method("GET"))
            .and(path("/Users"))
            .and(query_param("filter", format!("userName eq \"{user_name}\"")))
            .respond_with(ResponseTemplate::new(200).set_body_json(list_response(
                users,
                Some(total),
                1,
            )))
            .mount(&self.server)
            .await;
    }

    /// `PATCH /Groups/{id}` answering with `status` and `body`.
    pub async fn mock_patch(&self, group_id: &str, status: u16, body: Value, expected: u64) {
        Mock::given(method("PATCH"))
            .and(path(format!("/Groups/{group_id}")))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .expect(expected)
            .mount(&self.server)
            .await;
    }

    pub fn scim_error(status: u16, detail: &str) -> Value {
        json!({
            "schemas": ["urn:ietf:params:scim:api:messages:2.0:Error"],
            "status": status.to_string(),
            "detail": detail
        })
    }
}
