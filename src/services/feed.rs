// SPDX-License-Identifier: MIT

//! Live request feed: cancellable subscriptions over the request store.
//!
//! Replaces the push-listener model of the upstream store with an explicit
//! broker. Each subscription owns a watch channel that always holds the
//! latest full snapshot for its scope; every successful mutation triggers a
//! scope re-read and a fresh publish. Dropping a subscription detaches it,
//! so a discarded viewer never leaks a listener.

use crate::db::FirestoreDb;
use crate::error::AppError;
use crate::models::{Role, ServiceRequest};
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

/// Which slice of the request collection a subscriber observes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryScope {
    /// Every request (admin only)
    All,
    /// Requests whose `userId` equals this UID exactly
    Owner(String),
}

impl QueryScope {
    /// Scope for a principal: admins see everything, clients only their own.
    pub fn for_principal(role: Role, uid: &str) -> Self {
        if role.is_admin() {
            QueryScope::All
        } else {
            QueryScope::Owner(uid.to_string())
        }
    }
}

type Snapshot = Vec<ServiceRequest>;

struct FeedEntry {
    scope: QueryScope,
    tx: watch::Sender<Snapshot>,
}

/// Broker for live request subscriptions.
pub struct RequestFeed {
    db: FirestoreDb,
    subscribers: DashMap<u64, FeedEntry>,
    next_id: AtomicU64,
}

impl RequestFeed {
    pub fn new(db: FirestoreDb) -> Arc<Self> {
        Arc::new(Self {
            db,
            subscribers: DashMap::new(),
            next_id: AtomicU64::new(1),
        })
    }

    async fn read_scope(&self, scope: &QueryScope) -> Result<Snapshot, AppError> {
        match scope {
            QueryScope::All => self.db.list_all_requests().await,
            QueryScope::Owner(uid) => self.db.list_requests_for_owner(uid).await,
        }
    }

    /// Attach a new subscription for a scope.
    ///
    /// The initial snapshot is read before the subscription is handed out, so
    /// the first `next()` call resolves immediately.
    pub async fn subscribe(
        self: &Arc<Self>,
        scope: QueryScope,
    ) -> Result<RequestSubscription, AppError> {
        let initial = self.read_scope(&scope).await?;
        let (tx, rx) = watch::channel(initial);
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.subscribers.insert(id, FeedEntry { scope, tx });

        tracing::debug!(subscription = id, "Request subscription attached");

        Ok(RequestSubscription {
            id,
            rx,
            feed: Arc::clone(self),
            first: true,
        })
    }

    /// Re-read every subscribed scope and publish fresh full snapshots.
    ///
    /// Called after each successful mutation. A failed re-read keeps the
    /// subscriber on its previous snapshot rather than tearing it down.
    pub async fn publish(&self) {
        let targets: Vec<(u64, QueryScope)> = self
            .subscribers
            .iter()
            .map(|entry| (*entry.key(), entry.value().scope.clone()))
            .collect();

        for (id, scope) in targets {
            match self.read_scope(&scope).await {
                Ok(snapshot) => {
                    if let Some(entry) = self.subscribers.get(&id) {
                        let _ = entry.tx.send(snapshot);
                    }
                }
                Err(e) => {
                    tracing::warn!(subscription = id, error = %e, "Snapshot refresh failed");
                }
            }
        }
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    fn detach(&self, id: u64) {
        self.subscribers.remove(&id);
        tracing::debug!(subscription = id, "Request subscription detached");
    }
}

/// A live, cancellable subscription yielding full replacement snapshots.
///
/// Snapshots for one subscription arrive in publish order; there is no
/// ordering guarantee across independent subscriptions or operations.
/// Dropping the subscription detaches it from the feed.
pub struct RequestSubscription {
    id: u64,
    rx: watch::Receiver<Snapshot>,
    feed: Arc<RequestFeed>,
    first: bool,
}

impl RequestSubscription {
    /// Wait for the next full snapshot.
    ///
    /// The first call yields the current snapshot immediately; subsequent
    /// calls resolve once a newer snapshot has been published. Returns `None`
    /// if the feed side has gone away.
    pub async fn next(&mut self) -> Option<Snapshot> {
        if self.first {
            self.first = false;
            return Some(self.rx.borrow_and_update().clone());
        }
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }

    /// The most recently published snapshot, without waiting.
    pub fn current(&self) -> Snapshot {
        self.rx.borrow().clone()
    }
}

impl Drop for RequestSubscription {
    fn drop(&mut self) {
        self.feed.detach(self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_for_principal() {
        assert_eq!(QueryScope::for_principal(Role::Admin, "A1"), QueryScope::All);
        assert_eq!(
            QueryScope::for_principal(Role::Client, "U1"),
            QueryScope::Owner("U1".to_string())
        );
    }
}
