//! Application users and login payloads.
//!
//! The stored PIN hash never appears on these types, so no response can leak it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::auth::{Capabilities, Role};

/// A user who signs in with a PIN code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub role: Role,
    pub created_at: String,
    pub updated_at: String,
}

/// Request body for creating a user.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub name: String,
    pub role: Role,
    pub pin_code: String,
}

/// Request body for `POST /auth/login`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[serde(default)]
    pub pin_code: Option<String>,
}

/// Successful login: the user plus a bearer token.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub user: User,
    pub token: String,
    pub expires_at: String,
}

/// The signed-in user and what the UI may offer them.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    pub user: User,
    pub expires_at: String,
    pub permissions: BTreeMap<&'static str, Capabilities>,
}
