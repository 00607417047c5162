// SPDX-License-Identifier: MIT

//! Trident Smart Services API Server
//!
//! Backend for the Trident Smart Solutions home-services platform: account
//! management, service request submission, and role-based request triage
//! with live status feeds.

use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use trident_services::{
    config::Config,
    db::FirestoreDb,
    services::{IdentityService, RequestFeed, RequestService, SessionStore},
    AppState,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting Trident Smart Services API");

    // Initialize Firestore database
    let db = FirestoreDb::new(&config.gcp_project_id)
        .await
        .expect("Failed to connect to Firestore");

    // Session registry: one entry per signed-in user, display cache only
    let sessions = SessionStore::new();

    // Live request feed shared by all subscribers
    let feed = RequestFeed::new(db.clone());

    let identity = IdentityService::new(db.clone(), sessions.clone());
    let requests = RequestService::new(db.clone(), feed.clone());

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        db,
        sessions,
        identity,
        requests,
        feed,
    });

    // Build router
    let app = trident_services::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("trident_services=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
