// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User account model for storage and API.

use serde::{Deserialize, Serialize};

/// Account role, embedded in access tokens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    User,
    Viewer,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
            Role::Viewer => "viewer",
        }
    }
}

/// User account stored in the `users` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Numeric ID (also used as document ID)
    pub id: u64,
    /// Display name
    #[serde(rename = "nome")]
    pub name: String,
    /// Login email, unique across accounts
    pub email: String,
    /// Password digest (hex), never the plaintext
    #[serde(rename = "senha")]
    pub password_digest: String,
    pub role: Role,
    /// Inactive accounts can't log in and their tokens stop working
    pub active: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// Public view of a user (no password digest).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: u64,
    #[serde(rename = "nome")]
    pub name: String,
    pub email: String,
    pub role: Role,
    pub active: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            active: user.active,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_wire_format() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
        assert_eq!(
            serde_json::from_str::<Role>("\"viewer\"").unwrap(),
            Role::Viewer
        );
        assert!(serde_json::from_str::<Role>("\"root\"").is_err());
        assert_eq!(Role::default(), Role::User);
    }

    #[test]
    fn test_user_response_omits_digest() {
        let user = User {
            id: 7,
            name: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            password_digest: "deadbeef".to_string(),
            role: Role::User,
            active: true,
            created_at: "2026-01-01T00:00:00Z".to_string(),
            updated_at: "2026-01-01T00:00:00Z".to_string(),
        };

        let json = serde_json::to_value(UserResponse::from(user)).unwrap();
        assert!(json.get("senha").is_none());
        assert_eq!(json["nome"], "Ana");
        assert_eq!(json["role"], "user");
    }
}
