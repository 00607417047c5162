// SPDX-License-Identifier: MIT

//! Database layer (Firestore).

pub mod firestore;

pub use firestore::FirestoreDb;

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    pub const CREDENTIALS: &str = "credentials";
    pub const SERVICE_REQUESTS: &str = "service_requests";
    /// Append-only audit trail of admin actions
    pub const REQUEST_HISTORY: &str = "request_history";
}
