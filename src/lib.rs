// SPDX-License-Identifier: MIT

//! Trident Smart Services: home-services request backend
//!
//! This crate provides the API for submitting and triaging home service
//! requests (plumbing, security, emergency). Clients see and manage their
//! own requests; admins triage everything. Firestore holds all persistent
//! state; live views are delivered as full-snapshot subscriptions.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::FirestoreDb;
use services::{IdentityService, RequestFeed, RequestService, SessionStore};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: FirestoreDb,
    pub sessions: Arc<SessionStore>,
    pub identity: IdentityService,
    pub requests: RequestService,
    pub feed: Arc<RequestFeed>,
}
