// SPDX-License-Identifier: MIT

//! Service request model and status vocabulary.

use serde::{Deserialize, Serialize};

/// Wire-level request status. Strings are case-sensitive and fixed.
///
/// `in_progress` is a legacy value still present on old records; it decodes
/// and behaves like any other non-terminal status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    Approved,
    Declined,
    InProgress,
    Completed,
    Cancelled,
}

impl RequestStatus {
    /// Terminal statuses admit no further transition.
    pub fn is_terminal(self) -> bool {
        matches!(self, RequestStatus::Completed | RequestStatus::Cancelled)
    }

    /// Wire string for this status.
    pub fn as_str(self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Approved => "approved",
            RequestStatus::Declined => "declined",
            RequestStatus::InProgress => "in_progress",
            RequestStatus::Completed => "completed",
            RequestStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Service request stored in Firestore under `service_requests/{id}`.
///
/// `id`, `user_id` and `timestamp` are immutable once written. `user_id` is
/// always the identity-provider UID of the submitting principal, never an
/// email address; ownership queries depend on this.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRequest {
    /// Store-generated key (also used as document ID)
    pub id: String,
    /// "plumbing", "security", "emergency", or free-form
    pub service_type: String,
    pub problem_description: String,
    /// One of four tiers, e.g. "High - Within 24 hours"
    pub urgency: String,
    /// Requested visit date (epoch millis)
    pub preferred_date: i64,
    /// Optional time-of-day preference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_time: Option<String>,
    /// "Phone Call", "SMS", "Email", or "WhatsApp"
    pub contact_preference: String,
    /// Submission time (epoch millis)
    pub timestamp: i64,
    pub status: RequestStatus,
    /// Owner's UID
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_notes: Option<String>,
    /// UID of the last status-changer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<i64>,
}

impl ServiceRequest {
    /// Compact urgency tier for display: the first word of the urgency string
    /// ("High - Within 24 hours" -> "High").
    pub fn urgency_level(&self) -> &str {
        self.urgency.split(' ').next().unwrap_or(&self.urgency)
    }
}
