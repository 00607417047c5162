// SPDX-License-Identifier: MIT

//! Identity boundary: sign-up, sign-in, profile edits, and the in-process
//! session cache.
//!
//! The session cache holds display fields only. It is never consulted for
//! authorization; the role always comes from a fresh store read (see
//! [`crate::services::roles`]).

use crate::db::FirestoreDb;
use crate::error::{AppError, Result};
use crate::middleware::auth::Principal;
use crate::models::{Credential, Role, User};
use crate::time_utils::now_millis;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use dashmap::DashMap;
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

/// Session context created at sign-in and destroyed at sign-out.
#[derive(Debug, Clone)]
pub struct Session {
    pub uid: String,
    pub email: String,
    /// When this session was established (epoch millis)
    pub login_timestamp: i64,
    // Cached display fields; non-authoritative.
    pub full_name: String,
    pub phone: String,
    pub address: String,
}

impl Session {
    fn from_user(user: &User) -> Self {
        Self {
            uid: user.uid.clone(),
            email: user.email.clone(),
            login_timestamp: now_millis(),
            full_name: user.full_name.clone(),
            phone: user.phone.clone(),
            address: user.address.clone(),
        }
    }
}

/// In-process session registry, keyed by UID.
///
/// Explicit create/destroy lifecycle tied to sign-in and sign-out. Sessions
/// here are advisory (display cache); the JWT is what authenticates requests.
#[derive(Default)]
pub struct SessionStore {
    sessions: DashMap<String, Session>,
}

impl SessionStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn create(&self, session: Session) {
        self.sessions.insert(session.uid.clone(), session);
    }

    pub fn get(&self, uid: &str) -> Option<Session> {
        self.sessions.get(uid).map(|s| s.clone())
    }

    /// Refresh the cached display fields after a profile edit.
    pub fn refresh_profile(&self, user: &User) {
        if let Some(mut session) = self.sessions.get_mut(&user.uid) {
            session.email = user.email.clone();
            session.full_name = user.full_name.clone();
            session.phone = user.phone.clone();
            session.address = user.address.clone();
        }
    }

    /// Destroy a session. Returns whether one existed.
    pub fn destroy(&self, uid: &str) -> bool {
        self.sessions.remove(uid).is_some()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

/// Sign-up form.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SignupForm {
    #[validate(length(min = 1, message = "full name is required"))]
    pub full_name: String,
    #[validate(email(message = "please enter a valid email"))]
    pub email: String,
    #[validate(length(min = 1, message = "phone is required"))]
    pub phone: String,
    #[validate(length(min = 1, message = "address is required"))]
    pub address: String,
    #[validate(length(min = 6, message = "password must be at least 6 characters"))]
    pub password: String,
}

/// Sign-in form.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Profile edit: name/email/phone/address only. UID, registration date and
/// role are never touched by this path.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProfileEdit {
    #[validate(length(min = 1, message = "full name is required"))]
    pub full_name: String,
    #[validate(email(message = "please enter a valid email"))]
    pub email: String,
    pub phone: String,
    pub address: String,
}

/// Password change form. The confirmation must match the new password.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChange {
    #[validate(length(min = 1, message = "current password is required"))]
    pub current_password: String,
    #[validate(length(min = 6, message = "password must be at least 6 characters"))]
    pub new_password: String,
    pub confirm_password: String,
}

/// Identity service: password credentials plus profile management.
#[derive(Clone)]
pub struct IdentityService {
    db: FirestoreDb,
    sessions: Arc<SessionStore>,
}

impl IdentityService {
    pub fn new(db: FirestoreDb, sessions: Arc<SessionStore>) -> Self {
        Self { db, sessions }
    }

    /// Register a new account. New users always start as clients; the role
    /// field is not part of the sign-up surface.
    pub async fn sign_up(&self, form: SignupForm) -> Result<User> {
        validate_form(&form)?;

        if self.db.get_credential(&form.email).await?.is_some() {
            return Err(AppError::validation("email", "email is already registered"));
        }

        let uid = uuid::Uuid::new_v4().to_string();
        let email = form.email.trim().to_lowercase();

        // Profile first, credential last. The credential is what claims the
        // email, so a failure between the two writes leaves only an orphaned
        // profile under a fresh UID; a retry is not blocked by the duplicate
        // check and sign-in never sees a credential without a profile.
        let user = User {
            uid: uid.clone(),
            full_name: form.full_name.trim().to_string(),
            email: email.clone(),
            phone: form.phone.trim().to_string(),
            address: form.address.trim().to_string(),
            registration_date: now_millis(),
            role: Role::Client,
        };
        self.db.upsert_user(&user).await?;

        let credential = Credential {
            uid,
            email,
            password_hash: hash_password(&form.password)?,
        };
        self.db.set_credential(&credential).await?;

        self.sessions.create(Session::from_user(&user));
        tracing::info!(uid = %user.uid, "Account created");
        Ok(user)
    }

    /// Verify a password sign-in and establish a session.
    ///
    /// A wrong email and a wrong password fail identically, so the response
    /// never reveals which accounts exist.
    pub async fn sign_in(&self, form: LoginForm) -> Result<User> {
        let credential = self
            .db
            .get_credential(&form.email)
            .await?
            .ok_or(AppError::Unauthorized)?;

        verify_password(&form.password, &credential.password_hash)?;

        let user = self
            .db
            .get_user(&credential.uid)
            .await?
            .ok_or_else(|| AppError::NotFound("User profile not found".to_string()))?;

        self.sessions.create(Session::from_user(&user));
        tracing::info!(uid = %user.uid, "Signed in");
        Ok(user)
    }

    /// Destroy the session for a UID.
    pub fn sign_out(&self, uid: &str) -> bool {
        let existed = self.sessions.destroy(uid);
        if existed {
            tracing::info!(uid, "Signed out");
        }
        existed
    }

    /// Update the editable profile fields, preserving uid, registration date
    /// and role. An email change re-keys the credential record.
    pub async fn update_profile(&self, principal: &Principal, edit: ProfileEdit) -> Result<User> {
        validate_form(&edit)?;

        let mut user = self
            .db
            .get_user(&principal.uid)
            .await?
            .ok_or_else(|| AppError::NotFound("User profile not found".to_string()))?;

        let new_email = edit.email.trim().to_lowercase();
        if new_email != user.email {
            let credential = self
                .db
                .get_credential(&user.email)
                .await?
                .ok_or_else(|| AppError::NotFound("Credential not found".to_string()))?;

            if self.db.get_credential(&new_email).await?.is_some() {
                return Err(AppError::validation("email", "email is already registered"));
            }

            self.db
                .set_credential(&Credential {
                    email: new_email.clone(),
                    ..credential
                })
                .await?;
            self.db.delete_credential(&user.email).await?;
        }

        user.full_name = edit.full_name.trim().to_string();
        user.email = new_email;
        user.phone = edit.phone.trim().to_string();
        user.address = edit.address.trim().to_string();

        self.db.upsert_user(&user).await?;
        self.sessions.refresh_profile(&user);

        tracing::info!(uid = %user.uid, "Profile updated");
        Ok(user)
    }

    /// Change the account password.
    ///
    /// The current password is verified against the stored hash before any
    /// write; the new password is re-hashed with a fresh salt. The credential
    /// key (email) is untouched.
    pub async fn change_password(
        &self,
        principal: &Principal,
        change: PasswordChange,
    ) -> Result<()> {
        validate_form(&change)?;
        if change.new_password != change.confirm_password {
            return Err(AppError::validation(
                "confirm_password",
                "passwords do not match",
            ));
        }

        let user = self
            .db
            .get_user(&principal.uid)
            .await?
            .ok_or_else(|| AppError::NotFound("User profile not found".to_string()))?;

        let credential = self
            .db
            .get_credential(&user.email)
            .await?
            .ok_or_else(|| AppError::NotFound("Credential not found".to_string()))?;

        verify_password(&change.current_password, &credential.password_hash)?;

        self.db
            .set_credential(&Credential {
                password_hash: hash_password(&change.new_password)?,
                ..credential
            })
            .await?;

        tracing::info!(uid = %user.uid, "Password changed");
        Ok(())
    }

    /// Current profile, straight from the store.
    pub async fn profile(&self, uid: &str) -> Result<User> {
        self.db
            .get_user(uid)
            .await?
            .ok_or_else(|| AppError::NotFound("User profile not found".to_string()))
    }
}

/// Map the first validator failure to a field-level validation error.
fn validate_form<T: Validate>(form: &T) -> Result<()> {
    if let Err(errors) = form.validate() {
        for (field, field_errors) in errors.field_errors() {
            if let Some(first) = field_errors.first() {
                let reason = first
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "invalid value".to_string());
                return Err(AppError::Validation {
                    field: field.to_string(),
                    reason,
                });
            }
        }
        return Err(AppError::validation("form", "invalid input"));
    }
    Ok(())
}

fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Password hashing failed: {}", e)))
}

fn verify_password(password: &str, hash: &str) -> Result<()> {
    let parsed = PasswordHash::new(hash).map_err(|_| AppError::Unauthorized)?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| AppError::Unauthorized)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(uid: &str) -> Session {
        Session {
            uid: uid.to_string(),
            email: format!("{}@example.com", uid),
            login_timestamp: now_millis(),
            full_name: "Test User".to_string(),
            phone: "555-0100".to_string(),
            address: "1 Main St".to_string(),
        }
    }

    #[test]
    fn test_session_lifecycle() {
        let store = SessionStore::new();
        assert!(store.is_empty());

        store.create(session("U1"));
        assert_eq!(store.len(), 1);
        assert!(store.get("U1").is_some());

        assert!(store.destroy("U1"));
        assert!(store.get("U1").is_none());
        // Second destroy is a no-op
        assert!(!store.destroy("U1"));
    }

    #[test]
    fn test_refresh_profile_updates_cached_fields() {
        let store = SessionStore::new();
        store.create(session("U1"));

        let user = User {
            uid: "U1".to_string(),
            full_name: "New Name".to_string(),
            email: "new@example.com".to_string(),
            phone: "555-0199".to_string(),
            address: "2 Oak Ave".to_string(),
            registration_date: 0,
            role: Role::Client,
        };
        store.refresh_profile(&user);

        let cached = store.get("U1").unwrap();
        assert_eq!(cached.full_name, "New Name");
        assert_eq!(cached.email, "new@example.com");
    }

    #[test]
    fn test_password_hash_round_trip() {
        let hash = hash_password("hunter2-secret").unwrap();
        assert!(verify_password("hunter2-secret", &hash).is_ok());
        assert!(verify_password("wrong-password", &hash).is_err());
    }

    #[test]
    fn test_password_change_rejects_short_new_password() {
        let change = PasswordChange {
            current_password: "old-secret".to_string(),
            new_password: "short".to_string(),
            confirm_password: "short".to_string(),
        };
        let err = validate_form(&change).unwrap_err();
        assert!(matches!(err, AppError::Validation { ref field, .. } if field == "new_password"));
    }

    #[test]
    fn test_signup_form_rejects_bad_email() {
        let form = SignupForm {
            full_name: "Test".to_string(),
            email: "not-an-email".to_string(),
            phone: "555-0100".to_string(),
            address: "1 Main St".to_string(),
            password: "secret1".to_string(),
        };
        let err = validate_form(&form).unwrap_err();
        assert!(matches!(err, AppError::Validation { ref field, .. } if field == "email"));
    }
}
