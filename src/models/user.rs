// SPDX-License-Identifier: MIT

//! User profile and role models.

use serde::{Deserialize, Serialize};

/// Coarse authorization tier.
///
/// Decoding is fail-closed: an unknown or missing `role` field resolves to
/// [`Role::Client`], the least-privileged tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    #[serde(other)]
    Client,
}

impl Role {
    pub fn is_admin(self) -> bool {
        matches!(self, Role::Admin)
    }
}

/// User profile stored in Firestore under `users/{uid}`.
///
/// `uid` and `registration_date` are set once at creation and never change.
/// `role` is read-only from the client's perspective; store-side security
/// rules are expected to reject client writes to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Identity-provider UID (also used as document ID)
    pub uid: String,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    /// When the account was created (epoch millis)
    pub registration_date: i64,
    /// Authorization tier, defaults to client when absent
    #[serde(default)]
    pub role: Role,
}

/// Password credential stored under `credentials/{encoded email}`.
///
/// Kept separate from the profile so profile reads never carry the hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    pub uid: String,
    pub email: String,
    pub password_hash: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_decodes_known_values() {
        let admin: Role = serde_json::from_str("\"admin\"").unwrap();
        assert_eq!(admin, Role::Admin);

        let client: Role = serde_json::from_str("\"client\"").unwrap();
        assert_eq!(client, Role::Client);
    }

    #[test]
    fn test_role_unknown_value_defaults_to_client() {
        let role: Role = serde_json::from_str("\"superuser\"").unwrap();
        assert_eq!(role, Role::Client);
    }

    #[test]
    fn test_missing_role_field_defaults_to_client() {
        let json = r#"{
            "uid": "U1",
            "fullName": "Test User",
            "email": "test@example.com",
            "phone": "555-0100",
            "address": "1 Main St",
            "registrationDate": 1700000000000
        }"#;

        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.role, Role::Client);
    }

    #[test]
    fn test_role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
        assert_eq!(serde_json::to_string(&Role::Client).unwrap(), "\"client\"");
    }
}
