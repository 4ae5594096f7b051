//! Integration tests for membership PATCH submission.

mod helpers;

use groupsync_scim::{
    GroupPatcher, PatchOutcome, ScimAuth, ScimClient, ScimCredentials, ScimGroupId, ScimUserId,
};
use helpers::mock_scim_server::{MockScimServer, API_TOKEN};
use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, ResponseTemplate};

fn ids(raw: &[&str]) -> Vec<ScimUserId> {
    raw.iter().map(|id| ScimUserId::new(*id)).collect()
}

#[tokio::test]
async fn test_patch_sends_single_add_operation() {
    let mock = MockScimServer::new().await;

    Mock::given(method("PATCH"))
        .and(path("/Groups/grp-1"))
        .and(header("Content-Type", "application/scim+json"))
        .and(header("Netskope-api-token", API_TOKEN))
        .and(body_json(json!({
            "Operations": [{
                "op": "add",
                "path": "members",
                "value": [{"value": "abc-123"}, {"value": "def-456"}]
            }],
            "schemas": ["urn:ietf:params:scim:api:messages:2.0:PatchOp"]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "grp-1"})))
        .expect(1)
        .mount(&mock.server)
        .await;

    let outcome = mock
        .patcher()
        .submit(Some(&ScimGroupId::new("grp-1")), &ids(&["abc-123", "def-456"]))
        .await;

    assert_eq!(
        outcome,
        PatchOutcome::Applied {
            status: 200,
            added: 2
        }
    );
}

#[tokio::test]
async fn test_patch_no_content_is_applied() {
    let mock = MockScimServer::new().await;

    Mock::given(method("PATCH"))
        .and(path("/Groups/grp-1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock.server)
        .await;

    let outcome = mock
        .patcher()
        .submit(Some(&ScimGroupId::new("grp-1")), &ids(&["u1"]))
        .await;
    assert!(outcome.is_applied());
}

#[tokio::test]
async fn test_patch_rejection_surfaces_body() {
    let mock = MockScimServer::new().await;
    mock.mock_patch(
        "grp-1",
        400,
        MockScimServer::scim_error(400, "Invalid member value"),
        1,
    )
    .await;

    let outcome = mock
        .patcher()
        .submit(Some(&ScimGroupId::new("grp-1")), &ids(&["bad"]))
        .await;

    match outcome {
        PatchOutcome::Rejected { status, body } => {
            assert_eq!(status, 400);
            assert!(body.contains("Invalid member value"));
        }
        other => panic!("expected Rejected, got {other:?}"),
    }
}

#[tokio::test]
async fn test_patch_is_never_retried() {
    let mock = MockScimServer::new().await;

    Mock::given(method("PATCH"))
        .and(path("/Groups/grp-1"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "0"))
        .expect(1)
        .mount(&mock.server)
        .await;

    let outcome = mock
        .patcher()
        .submit(Some(&ScimGroupId::new("grp-1")), &ids(&["u1"]))
        .await;
    assert!(matches!(outcome, PatchOutcome::Rejected { status: 429, .. }));
}

#[tokio::test]
async fn test_patch_skipped_without_group() {
    let mock = MockScimServer::new().await;
    mock.mock_patch("grp-1", 200, json!({}), 0).await;

    let outcome = mock.patcher().submit(None, &ids(&["u1"])).await;
    assert!(matches!(outcome, PatchOutcome::Skipped { .. }));
}

#[tokio::test]
async fn test_patch_skipped_without_ids() {
    let mock = MockScimServer::new().await;
    mock.mock_patch("grp-1", 200, json!({}), 0).await;

    let outcome = mock
        .patcher()
        .submit(Some(&ScimGroupId::new("grp-1")), &[])
        .await;
    assert!(matches!(outcome, PatchOutcome::Skipped { .. }));
}

#[tokio::test]
async fn test_patch_unreachable_target_fails() {
    let auth = ScimAuth::new(ScimCredentials::netskope(SecretString::from(
        API_TOKEN.to_string(),
    )));
    // Nothing listens on port 1.
    let client = ScimClient::with_http_client(
        "http://127.0.0.1:1".to_string(),
        auth,
        reqwest::Client::new(),
    );

    let outcome = GroupPatcher::new(client)
        .submit(Some(&ScimGroupId::new("grp-1")), &ids(&["u1"]))
        .await;
    assert!(matches!(outcome, PatchOutcome::Failed { .. }));
}
