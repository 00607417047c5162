// SPDX-License-Identifier: MIT

//! Data models for the application.

pub mod audit;
pub mod request;
pub mod user;

pub use audit::AuditEntry;
pub use request::{RequestStatus, ServiceRequest};
pub use user::{Credential, Role, User};
