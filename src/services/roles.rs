// SPDX-License-Identifier: MIT

//! Role resolution against the user store.

use crate::db::FirestoreDb;
use crate::models::Role;

/// Resolve the role for a UID with a single store read.
///
/// Fail-closed: an absent record, a missing `role` field, or any read failure
/// resolves to [`Role::Client`]. No retry is attempted; a transient error on
/// the lookup costs a legitimate admin their elevated view for that call.
///
/// The result is never cached across calls. Every authorization decision
/// re-resolves so a revoked admin loses privileges on the next operation.
pub async fn resolve_role(db: &FirestoreDb, uid: &str) -> Role {
    if uid.is_empty() {
        return Role::Client;
    }

    match db.get_user(uid).await {
        Ok(Some(user)) => user.role,
        Ok(None) => Role::Client,
        Err(e) => {
            tracing::warn!(uid, error = %e, "Role lookup failed, defaulting to client");
            Role::Client
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_read_failure_resolves_to_client() {
        // Offline mock: every read errors, so resolution must fail closed.
        let db = FirestoreDb::new_mock();
        assert_eq!(resolve_role(&db, "U1").await, Role::Client);
    }

    #[tokio::test]
    async fn test_empty_uid_resolves_to_client() {
        let db = FirestoreDb::new_mock();
        assert_eq!(resolve_role(&db, "").await, Role::Client);
    }
}
