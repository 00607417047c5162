// SPDX-License-Identifier: MIT

//! Request lifecycle manager: submission, status transitions, queries.
//!
//! Owns the state machine for service requests:
//!
//! ```text
//! pending ──> approved / declined / in_progress ──> completed
//!    │                                   │
//!    └──────────── cancelled <───────────┘   (owner only)
//! ```
//!
//! `completed` and `cancelled` are terminal; nothing transitions out of them.

use crate::db::FirestoreDb;
use crate::error::{AppError, Result};
use crate::middleware::auth::Principal;
use crate::models::{AuditEntry, RequestStatus, Role, ServiceRequest};
use crate::services::feed::{QueryScope, RequestFeed, RequestSubscription};
use crate::time_utils::now_millis;
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

/// Minimum length for a problem description.
const MIN_DESCRIPTION_LEN: usize = 10;

/// Grace for clock skew between the submitting device and the server,
/// matching the one-second allowance the date picker grants.
const PREFERRED_DATE_GRACE_MS: i64 = 1_000;

/// A request draft as submitted by a client.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RequestDraft {
    #[validate(length(min = 1, message = "service type is required"))]
    pub service_type: String,
    pub problem_description: String,
    #[validate(length(min = 1, message = "urgency is required"))]
    pub urgency: String,
    /// Requested visit date (epoch millis)
    pub preferred_date: i64,
    pub preferred_time: Option<String>,
    #[validate(length(min = 1, message = "contact preference is required"))]
    pub contact_preference: String,
}

/// Validate a draft. Runs entirely locally; a failing draft is never
/// dispatched to the store, so validation failures cannot leave partial
/// records behind.
pub fn validate_draft(draft: &RequestDraft, now_ms: i64) -> Result<()> {
    if let Err(errors) = draft.validate() {
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
        return Err(AppError::validation("request", "invalid draft"));
    }

    let description = draft.problem_description.trim();
    if description.is_empty() {
        return Err(AppError::validation(
            "problemDescription",
            "please describe the problem",
        ));
    }
    if description.chars().count() < MIN_DESCRIPTION_LEN {
        return Err(AppError::validation(
            "problemDescription",
            "please provide more details (at least 10 characters)",
        ));
    }

    if draft.preferred_date < now_ms - PREFERRED_DATE_GRACE_MS {
        return Err(AppError::validation(
            "preferredDate",
            "preferred date must not be in the past",
        ));
    }

    Ok(())
}

/// Authorization rules for a status transition.
///
/// Checked in this order:
/// 1. a terminal current status rejects every transition, regardless of role;
/// 2. `cancelled` may only be requested by the record's owner;
/// 3. every other target status requires the admin role.
pub fn authorize_transition(
    current: RequestStatus,
    new_status: RequestStatus,
    role: Role,
    actor_uid: &str,
    owner_uid: &str,
) -> Result<()> {
    if current.is_terminal() {
        return Err(AppError::IllegalTransition { from: current });
    }

    match new_status {
        RequestStatus::Cancelled => {
            if actor_uid != owner_uid {
                return Err(AppError::Forbidden);
            }
        }
        _ => {
            if !role.is_admin() {
                return Err(AppError::Forbidden);
            }
        }
    }

    Ok(())
}

/// Request lifecycle manager.
#[derive(Clone)]
pub struct RequestService {
    db: FirestoreDb,
    feed: Arc<RequestFeed>,
}

impl RequestService {
    pub fn new(db: FirestoreDb, feed: Arc<RequestFeed>) -> Self {
        Self { db, feed }
    }

    /// Submit a new service request.
    ///
    /// Validation happens before any store call. The owner is always the
    /// authenticated principal's UID, never an email address.
    pub async fn submit(
        &self,
        principal: &Principal,
        draft: RequestDraft,
    ) -> Result<ServiceRequest> {
        let now = now_millis();
        validate_draft(&draft, now)?;

        let request = ServiceRequest {
            id: uuid::Uuid::new_v4().to_string(),
            service_type: draft.service_type.trim().to_string(),
            problem_description: draft.problem_description.trim().to_string(),
            urgency: draft.urgency,
            preferred_date: draft.preferred_date,
            preferred_time: draft.preferred_time,
            contact_preference: draft.contact_preference,
            timestamp: now,
            status: RequestStatus::Pending,
            user_id: principal.uid.clone(),
            admin_notes: None,
            updated_by: None,
            last_updated: None,
        };

        self.db.create_request(&request).await?;

        tracing::info!(
            request_id = %request.id,
            service_type = %request.service_type,
            "Service request submitted"
        );

        self.feed.publish().await;
        Ok(request)
    }

    /// One-shot role-scoped snapshot of requests, newest first.
    pub async fn list(&self, principal: &Principal, role: Role) -> Result<Vec<ServiceRequest>> {
        match QueryScope::for_principal(role, &principal.uid) {
            QueryScope::All => self.db.list_all_requests().await,
            QueryScope::Owner(uid) => self.db.list_requests_for_owner(&uid).await,
        }
    }

    /// Attach a live subscription for the principal's scope.
    pub async fn subscribe(
        &self,
        principal: &Principal,
        role: Role,
    ) -> Result<RequestSubscription> {
        self.feed
            .subscribe(QueryScope::for_principal(role, &principal.uid))
            .await
    }

    /// Move a request to a new status.
    ///
    /// Patches `status`, `lastUpdated`, `updatedBy` (and `adminNotes` when a
    /// note is given) in a single atomic update; a store failure leaves the
    /// record in its prior state. Admin-initiated transitions then append an
    /// immutable audit entry.
    pub async fn transition(
        &self,
        request_id: &str,
        new_status: RequestStatus,
        principal: &Principal,
        role: Role,
        note: Option<String>,
    ) -> Result<ServiceRequest> {
        let mut request = self
            .db
            .get_request(request_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Request {} not found", request_id)))?;

        authorize_transition(request.status, new_status, role, &principal.uid, &request.user_id)?;

        let now = now_millis();
        request.status = new_status;
        request.last_updated = Some(now);
        request.updated_by = Some(principal.uid.clone());

        let with_notes = note.is_some();
        if let Some(text) = &note {
            request.admin_notes = Some(text.clone());
        }

        self.db.patch_request_status(&request, with_notes).await?;

        tracing::info!(
            request_id = %request.id,
            status = %new_status,
            actor = %principal.uid,
            "Request status updated"
        );

        // The status change has landed; publish before the audit append so
        // subscribers see it even if the append then fails.
        self.feed.publish().await;

        if role.is_admin() {
            let admin_name = match self.db.get_user(&principal.uid).await {
                Ok(Some(user)) => user.full_name,
                _ => principal.email.clone(),
            };

            let entry = AuditEntry {
                timestamp: now,
                admin_id: principal.uid.clone(),
                admin_name,
                action: new_status.to_string(),
                notes: note.unwrap_or_default(),
                request_id: request.id.clone(),
            };
            self.db.append_audit_entry(&entry).await?;
        }

        Ok(request)
    }

    /// Cancel a request. Thin wrapper over [`Self::transition`]: owner-only,
    /// rejected once the request is already terminal.
    pub async fn cancel(
        &self,
        request_id: &str,
        principal: &Principal,
        role: Role,
    ) -> Result<ServiceRequest> {
        self.transition(
            request_id,
            RequestStatus::Cancelled,
            principal,
            role,
            Some("Cancelled by user".to_string()),
        )
        .await
    }

    /// Audit trail for a request, oldest first. Admin view only; the route
    /// layer enforces the role check.
    pub async fn history(&self, request_id: &str) -> Result<Vec<AuditEntry>> {
        self.db.list_audit_entries(request_id).await
    }
}
