//! Test data generators for SCIM client integration tests.

#![allow(dead_code)]

use serde_json::{json, Value};

/// A group resource as listed by `GET /Groups`.
pub fn scim_group(id: &str, display_name: &str) -> Value {
    json!({
        "schemas": ["urn:ietf:params:scim:schemas:core:2.0:Group"],
        "id": id,
        "displayName": display_name
    })
}

/// A user resource as listed by `GET /Users`.
pub fn scim_user(id: &str, user_name: &str) -> Value {
    json!({
        "schemas": ["urn:ietf:params:scim:schemas:core:2.0:User"],
        "id": id,
        "userName": user_name,
        "active": true
    })
}

/// An entry of a group's `members` attribute.
pub fn member(value: &str, display: &str) -> Value {
    json!({ "value": value, "display": display })
}

/// A SCIM ListResponse page. `total` is omitted from the body when `None`.
pub fn list_response(resources: Vec<Value>, total: Option<usize>, start_index: usize) -> Value {
    let mut body = json!({
        "schemas": ["urn:ietf:params:scim:api:messages:2.0:ListResponse"],
        "startIndex": start_index,
        "itemsPerPage": resources.len(),
        "Resources": resources
    });
    if let Some(total) = total {
        body["totalResults"] = json!(total);
    }
    body
}

/// `count` groups named "Group 0".."Group {count-1}".
pub fn generate_groups(count: usize) -> Vec<Value> {
    (0..count)
        .map(|i| scim_group(&format!("grp-{i}"), &format!("Group {i}")))
        .collect()
}
