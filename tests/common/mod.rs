// SPDX-License-Identifier: MIT

use std::sync::Arc;
use trident_services::config::Config;
use trident_services::db::FirestoreDb;
use trident_services::routes::create_router;
use trident_services::services::{IdentityService, RequestFeed, RequestService, SessionStore};
use trident_services::AppState;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Create a mock database connection (offline).
#[allow(dead_code)]
pub fn test_db_offline() -> FirestoreDb {
    FirestoreDb::new_mock()
}

/// Create a test app with offline mock dependencies.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    let config = Config::test_default();
    let db = test_db_offline();
    let sessions = SessionStore::new();
    let feed = RequestFeed::new(db.clone());
    let identity = IdentityService::new(db.clone(), sessions.clone());
    let requests = RequestService::new(db.clone(), feed.clone());

    let state = Arc::new(AppState {
        config,
        db,
        sessions,
        identity,
        requests,
        feed,
    });

    (create_router(state.clone()), state)
}

/// Create a JWT the same way the auth routes do.
#[allow(dead_code)]
pub fn create_test_jwt(uid: &str, email: &str, signing_key: &[u8]) -> String {
    trident_services::middleware::auth::create_jwt(uid, email, signing_key)
        .expect("Failed to create JWT")
}
