// SPDX-License-Identifier: MIT

//! History view model: role-scoped projection of request snapshots.
//!
//! Pure over snapshots. Feed a full replacement snapshot in, get a sorted,
//! role-filtered rendering out. Sorting is re-applied on every snapshot so
//! the projection never depends on store ordering.

use crate::models::{Role, ServiceRequest};
use crate::time_utils::format_millis;
use serde::Serialize;

/// Display state of the request list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewState {
    /// No snapshot received yet
    Loading,
    Empty,
    Populated,
}

/// One rendered row. `user_id` appears only in admin renderings.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestRow {
    pub id: String,
    pub service_type: String,
    pub status: String,
    /// Compact urgency tier ("High")
    pub urgency: String,
    pub problem_description: String,
    pub preferred_date: String,
    pub submitted: String,
    pub contact_preference: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

/// Rendered view: state plus rows, serialized as one SSE payload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRendering {
    pub state: ViewState,
    pub requests: Vec<RequestRow>,
}

/// Materialized, role-scoped list of requests.
pub struct HistoryView {
    role: Role,
    state: ViewState,
    requests: Vec<ServiceRequest>,
}

impl HistoryView {
    pub fn new(role: Role) -> Self {
        Self {
            role,
            state: ViewState::Loading,
            requests: Vec::new(),
        }
    }

    pub fn state(&self) -> ViewState {
        self.state
    }

    /// Replace the projection with a new full snapshot.
    ///
    /// Re-sorts by submission time descending and re-derives the view state:
    /// empty exactly when the list has no records. Empty and Populated may
    /// alternate freely across snapshots.
    pub fn apply_snapshot(&mut self, mut snapshot: Vec<ServiceRequest>) {
        snapshot.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        self.state = if snapshot.is_empty() {
            ViewState::Empty
        } else {
            ViewState::Populated
        };
        self.requests = snapshot;
    }

    /// Current rendering for the subscriber's role.
    pub fn render(&self) -> HistoryRendering {
        let is_admin = self.role.is_admin();
        let requests = self
            .requests
            .iter()
            .map(|r| RequestRow {
                id: r.id.clone(),
                service_type: r.service_type.clone(),
                status: r.status.to_string(),
                urgency: r.urgency_level().to_string(),
                problem_description: r.problem_description.clone(),
                preferred_date: format_millis(r.preferred_date),
                submitted: format_millis(r.timestamp),
                contact_preference: r.contact_preference.clone(),
                admin_notes: r.admin_notes.clone(),
                // Owner identity is admin-only; client renderings never
                // carry another user's UID (or even their own).
                user_id: if is_admin { Some(r.user_id.clone()) } else { None },
            })
            .collect();

        HistoryRendering {
            state: self.state,
            requests,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RequestStatus;

    fn request(id: &str, uid: &str, timestamp: i64) -> ServiceRequest {
        ServiceRequest {
            id: id.to_string(),
            service_type: "plumbing".to_string(),
            problem_description: "Kitchen sink is leaking badly".to_string(),
            urgency: "High - Within 24 hours".to_string(),
            preferred_date: timestamp + 86_400_000,
            preferred_time: None,
            contact_preference: "Phone Call".to_string(),
            timestamp,
            status: RequestStatus::Pending,
            user_id: uid.to_string(),
            admin_notes: None,
            updated_by: None,
            last_updated: None,
        }
    }

    #[test]
    fn test_initial_state_is_loading() {
        let view = HistoryView::new(Role::Client);
        assert_eq!(view.state(), ViewState::Loading);
    }

    #[test]
    fn test_first_empty_snapshot_moves_to_empty() {
        let mut view = HistoryView::new(Role::Client);
        view.apply_snapshot(vec![]);
        assert_eq!(view.state(), ViewState::Empty);
    }

    #[test]
    fn test_empty_and_populated_alternate() {
        let mut view = HistoryView::new(Role::Client);

        view.apply_snapshot(vec![request("r1", "U1", 100)]);
        assert_eq!(view.state(), ViewState::Populated);

        view.apply_snapshot(vec![]);
        assert_eq!(view.state(), ViewState::Empty);

        view.apply_snapshot(vec![request("r2", "U1", 200)]);
        assert_eq!(view.state(), ViewState::Populated);
    }

    #[test]
    fn test_rows_sorted_newest_first() {
        let mut view = HistoryView::new(Role::Client);
        view.apply_snapshot(vec![
            request("old", "U1", 100),
            request("new", "U1", 300),
            request("mid", "U1", 200),
        ]);

        let rendering = view.render();
        let ids: Vec<&str> = rendering.requests.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["new", "mid", "old"]);
    }

    #[test]
    fn test_client_rendering_never_carries_user_id() {
        let mut view = HistoryView::new(Role::Client);
        view.apply_snapshot(vec![request("r1", "U1", 100)]);

        let rendering = view.render();
        assert!(rendering.requests[0].user_id.is_none());
    }

    #[test]
    fn test_admin_rendering_includes_user_id() {
        let mut view = HistoryView::new(Role::Admin);
        view.apply_snapshot(vec![request("r1", "U1", 100)]);

        let rendering = view.render();
        assert_eq!(rendering.requests[0].user_id.as_deref(), Some("U1"));
    }

    #[test]
    fn test_rendering_compacts_urgency() {
        let mut view = HistoryView::new(Role::Client);
        view.apply_snapshot(vec![request("r1", "U1", 100)]);
        assert_eq!(view.render().requests[0].urgency, "High");
    }
}
