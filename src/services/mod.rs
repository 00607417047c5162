// SPDX-License-Identifier: MIT

//! Services module - business logic layer.

pub mod feed;
pub mod history;
pub mod identity;
pub mod requests;
pub mod roles;

pub use feed::{QueryScope, RequestFeed, RequestSubscription};
pub use history::{HistoryRendering, HistoryView, ViewState};
pub use identity::{IdentityService, PasswordChange, Session, SessionStore};
pub use requests::{RequestDraft, RequestService};
pub use roles::resolve_role;
