//! Data structures for authentication-related entities.
//!
//! This module defines models for credentials, users, roles, and permissions,
//! parsed at the API boundary with explicit schemas rather than trusted
//! implicitly.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Login request payload sent to the credential exchange endpoint
#[derive(Debug, Clone, Serialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,

    pub tenant_id: i64,
}

/// Bearer credential issued by the exchange: an opaque token plus its scheme
/// label (e.g. "Bearer"). Attached to every authenticated request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub access_token: String,
    pub token_type: String,
}

impl Credential {
    /// Value for the `Authorization` header, e.g. "Bearer abc".
    pub fn header_value(&self) -> String {
        format!("{} {}", self.token_type, self.access_token)
    }
}

/// Atomic named capability referenced by roles. Defined by the server; the
/// client only ever reads these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    pub id: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Named bundle of permissions assigned to a user. Membership is a set:
/// duplicates have no effect and order is irrelevant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub permissions: Vec<Permission>,
}

/// The authenticated principal as returned by the identity endpoint.
///
/// A `None` role is tolerated at the parsing edge but grants nothing: the
/// evaluator treats "role missing" as "not authorized for anything".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<i64>,
    #[serde(default)]
    pub role: Option<Role>,
}
