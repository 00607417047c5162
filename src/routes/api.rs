// SPDX-License-Identifier: MIT

//! API routes for authenticated users.

use crate::error::{AppError, Result};
use crate::middleware::auth::Principal;
use crate::models::{AuditEntry, RequestStatus, Role, ServiceRequest};
use crate::services::history::{HistoryRendering, HistoryView};
use crate::services::identity::{PasswordChange, ProfileEdit};
use crate::services::requests::RequestDraft;
use crate::services::roles::resolve_role;
use crate::AppState;
use axum::{
    extract::{Path, State},
    response::sse::{Event, KeepAlive, Sse},
    routing::{get, post, put},
    Extension, Json, Router,
};
use futures_util::stream::{self, Stream};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::sync::Arc;

/// API routes (require authentication via JWT).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/me", get(get_me).put(update_me))
        .route("/api/me/password", put(change_password))
        .route("/api/requests", post(submit_request).get(list_requests))
        .route("/api/requests/stream", get(stream_requests))
        .route("/api/requests/{id}/status", post(transition_request))
        .route("/api/requests/{id}/cancel", post(cancel_request))
        .route("/api/requests/{id}/history", get(request_history))
}

// ─── User Profile ────────────────────────────────────────────

/// Current user response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub uid: String,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub registration_date: i64,
    pub role: Role,
}

impl From<crate::models::User> for UserResponse {
    fn from(user: crate::models::User) -> Self {
        Self {
            uid: user.uid,
            full_name: user.full_name,
            email: user.email,
            phone: user.phone,
            address: user.address,
            registration_date: user.registration_date,
            role: user.role,
        }
    }
}

/// Get current user profile.
async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<UserResponse>> {
    let user = state.identity.profile(&principal.uid).await?;
    Ok(Json(user.into()))
}

/// Edit name/email/phone/address.
async fn update_me(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Json(edit): Json<ProfileEdit>,
) -> Result<Json<UserResponse>> {
    let user = state.identity.update_profile(&principal, edit).await?;
    Ok(Json(user.into()))
}

#[derive(Serialize)]
struct PasswordChangeResponse {
    success: bool,
}

/// Change the account password after verifying the current one.
async fn change_password(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Json(change): Json<PasswordChange>,
) -> Result<Json<PasswordChangeResponse>> {
    state.identity.change_password(&principal, change).await?;
    Ok(Json(PasswordChangeResponse { success: true }))
}

// ─── Request Submission ──────────────────────────────────────

/// Submit a new service request.
async fn submit_request(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Json(draft): Json<RequestDraft>,
) -> Result<Json<ServiceRequest>> {
    let request = state.requests.submit(&principal, draft).await?;
    Ok(Json(request))
}

// ─── Request History (one-shot + live) ───────────────────────

/// One-shot role-scoped snapshot, rendered through the history view.
async fn list_requests(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<HistoryRendering>> {
    let role = resolve_role(&state.db, &principal.uid).await;
    let snapshot = state.requests.list(&principal, role).await?;

    let mut view = HistoryView::new(role);
    view.apply_snapshot(snapshot);
    Ok(Json(view.render()))
}

/// Live request feed as server-sent events.
///
/// Emits one full rendering per snapshot, starting with the current state.
/// Closing the connection drops the subscription and detaches the listener.
async fn stream_requests(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
) -> Result<Sse<impl Stream<Item = std::result::Result<Event, Infallible>>>> {
    let role = resolve_role(&state.db, &principal.uid).await;
    let subscription = state.requests.subscribe(&principal, role).await?;
    let view = HistoryView::new(role);

    tracing::debug!(uid = %principal.uid, admin = role.is_admin(), "Live feed attached");

    let stream = stream::unfold(
        (subscription, view),
        |(mut subscription, mut view)| async move {
            let snapshot = subscription.next().await?;
            view.apply_snapshot(snapshot);
            let event = Event::default().json_data(&view.render()).ok()?;
            Some((Ok::<_, Infallible>(event), (subscription, view)))
        },
    );

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

// ─── Status Transitions ──────────────────────────────────────

#[derive(Deserialize)]
struct TransitionBody {
    status: RequestStatus,
    #[serde(default)]
    note: Option<String>,
}

/// Move a request to a new status (approve/decline/complete, or the owner
/// cancelling). Authorization happens in the lifecycle manager with a
/// freshly resolved role.
async fn transition_request(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(request_id): Path<String>,
    Json(body): Json<TransitionBody>,
) -> Result<Json<ServiceRequest>> {
    let role = resolve_role(&state.db, &principal.uid).await;
    let request = state
        .requests
        .transition(&request_id, body.status, &principal, role, body.note)
        .await?;
    Ok(Json(request))
}

/// Cancel own request.
async fn cancel_request(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(request_id): Path<String>,
) -> Result<Json<ServiceRequest>> {
    let role = resolve_role(&state.db, &principal.uid).await;
    let request = state.requests.cancel(&request_id, &principal, role).await?;
    Ok(Json(request))
}

// ─── Audit Trail ─────────────────────────────────────────────

/// Admin-only view of the audit trail for a request.
async fn request_history(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(request_id): Path<String>,
) -> Result<Json<Vec<AuditEntry>>> {
    let role = resolve_role(&state.db, &principal.uid).await;
    if !role.is_admin() {
        return Err(AppError::Forbidden);
    }

    let entries = state.requests.history(&request_id).await?;
    Ok(Json(entries))
}
