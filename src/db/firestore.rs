// SPDX-License-Identifier: MIT

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Users (profile storage, keyed by UID)
//! - Credentials (password hashes, keyed by email)
//! - Service requests (lifecycle records)
//! - Audit entries (append-only admin action trail)

use crate::db::collections;
use crate::error::AppError;
use crate::models::{AuditEntry, Credential, ServiceRequest, User};

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated
        // connection to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    /// Document ID for a credential record.
    ///
    /// Emails are lowercased before encoding so lookups are case-insensitive.
    fn credential_doc_id(email: &str) -> String {
        urlencoding::encode(&email.to_lowercase()).into_owned()
    }

    // ─── User Operations ─────────────────────────────────────────

    /// Get a user profile by UID.
    pub async fn get_user(&self, uid: &str) -> Result<Option<User>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(uid)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create or update a user profile.
    pub async fn upsert_user(&self, user: &User) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(&user.uid)
            .object(user)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Credential Operations ───────────────────────────────────

    /// Get a password credential by email.
    pub async fn get_credential(&self, email: &str) -> Result<Option<Credential>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::CREDENTIALS)
            .obj()
            .one(&Self::credential_doc_id(email))
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Store a password credential.
    pub async fn set_credential(&self, credential: &Credential) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::CREDENTIALS)
            .document_id(Self::credential_doc_id(&credential.email))
            .object(credential)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Delete a credential (email re-key during profile edit).
    pub async fn delete_credential(&self, email: &str) -> Result<(), AppError> {
        self.get_client()?
            .fluent()
            .delete()
            .from(collections::CREDENTIALS)
            .document_id(Self::credential_doc_id(email))
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Service Request Operations ──────────────────────────────

    /// Get a service request by ID.
    pub async fn get_request(&self, request_id: &str) -> Result<Option<ServiceRequest>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::SERVICE_REQUESTS)
            .obj()
            .one(request_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a service request.
    ///
    /// The write is a single full-record insert: it either lands complete or
    /// not at all, so a failure leaves no partial record behind.
    pub async fn create_request(&self, request: &ServiceRequest) -> Result<(), AppError> {
        let _created: ServiceRequest = self
            .get_client()?
            .fluent()
            .insert()
            .into(collections::SERVICE_REQUESTS)
            .document_id(&request.id)
            .object(request)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// List all service requests (admin scope), newest first.
    pub async fn list_all_requests(&self) -> Result<Vec<ServiceRequest>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::SERVICE_REQUESTS)
            .order_by([(
                "timestamp",
                firestore::FirestoreQueryDirection::Descending,
            )])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List service requests owned by a UID (client scope), newest first.
    ///
    /// Exact equality on `userId`; never a prefix or range match.
    pub async fn list_requests_for_owner(
        &self,
        owner_uid: &str,
    ) -> Result<Vec<ServiceRequest>, AppError> {
        let owner_uid = owner_uid.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::SERVICE_REQUESTS)
            .filter(move |q| q.field("userId").eq(owner_uid.clone()))
            .order_by([(
                "timestamp",
                firestore::FirestoreQueryDirection::Descending,
            )])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Patch the lifecycle fields of a request in a single atomic update.
    ///
    /// Only `status`, `lastUpdated`, `updatedBy` (and `adminNotes` when a note
    /// was given) are touched; the rest of the record is left as-is. A failed
    /// patch leaves the record in its prior state.
    pub async fn patch_request_status(
        &self,
        request: &ServiceRequest,
        with_notes: bool,
    ) -> Result<(), AppError> {
        let client = self.get_client()?;

        let fields = if with_notes {
            firestore::paths_camel_case!(ServiceRequest::{status, last_updated, updated_by, admin_notes})
        } else {
            firestore::paths_camel_case!(ServiceRequest::{status, last_updated, updated_by})
        };

        let _: () = client
            .fluent()
            .update()
            .fields(fields)
            .in_col(collections::SERVICE_REQUESTS)
            .document_id(&request.id)
            .object(request)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Audit Trail Operations ──────────────────────────────────

    /// Append an audit entry under a fresh store-generated key.
    ///
    /// Entries are never overwritten: the document ID combines the request ID
    /// with a random key, so every append lands in a new document.
    pub async fn append_audit_entry(&self, entry: &AuditEntry) -> Result<(), AppError> {
        let doc_id = format!("{}_{}", entry.request_id, uuid::Uuid::new_v4());

        let _created: AuditEntry = self
            .get_client()?
            .fluent()
            .insert()
            .into(collections::REQUEST_HISTORY)
            .document_id(doc_id)
            .object(entry)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// List audit entries for a request, oldest first.
    pub async fn list_audit_entries(
        &self,
        request_id: &str,
    ) -> Result<Vec<AuditEntry>, AppError> {
        let request_id = request_id.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::REQUEST_HISTORY)
            .filter(move |q| q.field("requestId").eq(request_id.clone()))
            .order_by([(
                "timestamp",
                firestore::FirestoreQueryDirection::Ascending,
            )])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
