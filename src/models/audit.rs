// SPDX-License-Identifier: MIT

//! Audit trail entries for admin actions on requests.

use serde::{Deserialize, Serialize};

/// Immutable record of an admin action, stored in `request_history`.
///
/// Entries are append-only: each gets a fresh store-generated key and is
/// never overwritten. Queried by `request_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    /// When the action was taken (epoch millis)
    pub timestamp: i64,
    /// UID of the acting admin
    pub admin_id: String,
    /// Display name of the acting admin
    pub admin_name: String,
    /// The status the request was moved to
    pub action: String,
    pub notes: String,
    pub request_id: String,
}
