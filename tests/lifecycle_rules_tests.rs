// SPDX-License-Identifier: MIT

//! Transition authorization rules.
//!
//! These are the invariants the whole lifecycle hangs on: terminal statuses
//! are final for everyone, clients can only cancel what they own, and every
//! other transition needs the admin role.

use trident_services::error::AppError;
use trident_services::models::{RequestStatus, Role};
use trident_services::services::requests::authorize_transition;

const OWNER: &str = "U1";
const OTHER: &str = "U2";
const ADMIN: &str = "ADMIN1";

#[test]
fn test_terminal_statuses_reject_all_actors() {
    for terminal in [RequestStatus::Completed, RequestStatus::Cancelled] {
        for (role, actor) in [
            (Role::Admin, ADMIN),
            (Role::Client, OWNER),
            (Role::Client, OTHER),
        ] {
            for target in [
                RequestStatus::Pending,
                RequestStatus::Approved,
                RequestStatus::Declined,
                RequestStatus::Completed,
                RequestStatus::Cancelled,
            ] {
                let err = authorize_transition(terminal, target, role, actor, OWNER).unwrap_err();
                assert!(
                    matches!(err, AppError::IllegalTransition { from } if from == terminal),
                    "{terminal} -> {target} as {actor} should be an illegal transition"
                );
            }
        }
    }
}

#[test]
fn test_client_cannot_approve_or_decline() {
    for target in [
        RequestStatus::Approved,
        RequestStatus::Declined,
        RequestStatus::Completed,
        RequestStatus::InProgress,
    ] {
        let err =
            authorize_transition(RequestStatus::Pending, target, Role::Client, OWNER, OWNER)
                .unwrap_err();
        assert!(matches!(err, AppError::Forbidden));
    }
}

#[test]
fn test_client_may_cancel_own_request() {
    assert!(authorize_transition(
        RequestStatus::Pending,
        RequestStatus::Cancelled,
        Role::Client,
        OWNER,
        OWNER
    )
    .is_ok());

    // Also from an approved (non-terminal) state
    assert!(authorize_transition(
        RequestStatus::Approved,
        RequestStatus::Cancelled,
        Role::Client,
        OWNER,
        OWNER
    )
    .is_ok());
}

#[test]
fn test_client_cannot_cancel_someone_elses_request() {
    let err = authorize_transition(
        RequestStatus::Pending,
        RequestStatus::Cancelled,
        Role::Client,
        OTHER,
        OWNER,
    )
    .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));
}

#[test]
fn test_admin_cannot_cancel_on_behalf_of_owner() {
    // Cancellation is reserved for the owner, even against an admin.
    let err = authorize_transition(
        RequestStatus::Pending,
        RequestStatus::Cancelled,
        Role::Admin,
        ADMIN,
        OWNER,
    )
    .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));
}

#[test]
fn test_admin_may_triage_pending_request() {
    for target in [
        RequestStatus::Approved,
        RequestStatus::Declined,
        RequestStatus::InProgress,
        RequestStatus::Completed,
    ] {
        assert!(
            authorize_transition(RequestStatus::Pending, target, Role::Admin, ADMIN, OWNER)
                .is_ok(),
            "admin should be able to set {target}"
        );
    }
}

#[test]
fn test_legacy_in_progress_is_not_terminal() {
    assert!(authorize_transition(
        RequestStatus::InProgress,
        RequestStatus::Completed,
        Role::Admin,
        ADMIN,
        OWNER
    )
    .is_ok());

    assert!(authorize_transition(
        RequestStatus::InProgress,
        RequestStatus::Cancelled,
        Role::Client,
        OWNER,
        OWNER
    )
    .is_ok());
}

#[test]
fn test_second_cancel_is_illegal_transition() {
    // First cancel succeeds...
    assert!(authorize_transition(
        RequestStatus::Pending,
        RequestStatus::Cancelled,
        Role::Client,
        OWNER,
        OWNER
    )
    .is_ok());

    // ...and once cancelled, a second attempt is rejected for everyone.
    let err = authorize_transition(
        RequestStatus::Cancelled,
        RequestStatus::Cancelled,
        Role::Client,
        OWNER,
        OWNER,
    )
    .unwrap_err();
    assert!(matches!(
        err,
        AppError::IllegalTransition {
            from: RequestStatus::Cancelled
        }
    ));
}
