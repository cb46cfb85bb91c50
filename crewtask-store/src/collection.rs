//! Generic document collection with full-snapshot subscriptions
//!
//! A [`Collection`] is a named set of id-addressed records. It reproduces
//! the operations the original backend exposed per collection:
//!
//! - `create(record)` → stored record with a fresh id and timestamp
//! - `update(id, patch)`: partial update; absent (`None`) fields are
//!   silently ignored, never written as null placeholders
//! - `delete(id)`
//! - `get(id)` / `query(predicate)`: one-shot reads
//! - `subscribe()`: push stream delivering the complete current set on
//!   registration and after every change
//!
//! Reads return records in descending creation-time order; nothing
//! downstream re-sorts. Subscriptions carry the full materialized set, not
//! diffs. The derived views (visibility, filters) assume a complete set
//! each time, so full-replace semantics are load-bearing.
//!
//! # Example
//!
//! ```no_run
//! use crewtask_store::Store;
//!
//! # async fn example() {
//! let store = Store::new();
//! let mut sub = store.tasks.subscribe();
//!
//! // Initial snapshot is available immediately
//! let snapshot = sub.current();
//! println!("{} tasks", snapshot.len());
//!
//! // Wait for the next push
//! if sub.changed().await {
//!     let snapshot = sub.current();
//!     println!("now {} tasks", snapshot.len());
//! }
//! # }
//! ```

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{watch, RwLock};
use tokio_stream::wrappers::WatchStream;
use uuid::Uuid;

/// Store error type
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No record with the given id in the named collection
    #[error("{collection} record {id} not found")]
    NotFound {
        collection: &'static str,
        id: Uuid,
    },
}

/// A record that can live in a [`Collection`]
pub trait Document: Clone + Send + Sync + 'static {
    /// Partial-update type; `None` fields leave the record untouched
    type Patch: Send;

    fn id(&self) -> Uuid;
    fn set_id(&mut self, id: Uuid);
    fn created_at(&self) -> DateTime<Utc>;
    fn set_created_at(&mut self, at: DateTime<Utc>);

    /// Applies a partial update in place
    fn apply_patch(&mut self, patch: Self::Patch);

    /// Reconciles legacy fields at the read boundary; default is a no-op
    fn normalize(&mut self) {}
}

/// Named in-memory document collection
pub struct Collection<T: Document> {
    /// Collection name, used in errors and traces
    name: &'static str,

    /// Records by id
    docs: RwLock<HashMap<Uuid, T>>,

    /// Latest full snapshot, pushed to subscribers on every change
    snapshot_tx: watch::Sender<Arc<Vec<T>>>,
}

impl<T: Document> Collection<T> {
    /// Creates an empty named collection
    pub fn new(name: &'static str) -> Self {
        let (snapshot_tx, _) = watch::channel(Arc::new(Vec::new()));
        Collection {
            name,
            docs: RwLock::new(HashMap::new()),
            snapshot_tx,
        }
    }

    /// Collection name
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Creates a record, assigning a fresh id and creation timestamp
    ///
    /// Returns the stored record.
    pub async fn create(&self, mut doc: T) -> T {
        doc.set_id(Uuid::new_v4());
        doc.set_created_at(Utc::now());

        let mut docs = self.docs.write().await;
        docs.insert(doc.id(), doc.clone());
        self.publish(&docs);
        tracing::debug!(collection = self.name, id = %doc.id(), "record created");
        doc
    }

    /// Inserts a record keeping its id and timestamp
    ///
    /// Upsert semantics; used when the caller controls identity (pending
    /// invite adoption, seeding legacy documents).
    pub async fn insert(&self, doc: T) -> T {
        let mut docs = self.docs.write().await;
        docs.insert(doc.id(), doc.clone());
        self.publish(&docs);
        doc
    }

    /// Applies a partial update to a record
    ///
    /// `None` fields in the patch are ignored. Returns the updated record.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the id does not resolve.
    pub async fn update(&self, id: Uuid, patch: T::Patch) -> Result<T, StoreError> {
        let mut docs = self.docs.write().await;
        let doc = docs.get_mut(&id).ok_or(StoreError::NotFound {
            collection: self.name,
            id,
        })?;
        doc.apply_patch(patch);
        let updated = doc.clone();
        self.publish(&docs);
        Ok(updated)
    }

    /// Deletes a record; returns whether it existed
    pub async fn delete(&self, id: Uuid) -> bool {
        let mut docs = self.docs.write().await;
        let existed = docs.remove(&id).is_some();
        if existed {
            self.publish(&docs);
            tracing::debug!(collection = self.name, %id, "record deleted");
        }
        existed
    }

    /// Fetches one record by id
    pub async fn get(&self, id: Uuid) -> Option<T> {
        let docs = self.docs.read().await;
        docs.get(&id).cloned().map(|mut doc| {
            doc.normalize();
            doc
        })
    }

    /// One-shot query: current matching set, newest first
    pub async fn query(&self, predicate: impl Fn(&T) -> bool) -> Vec<T> {
        let docs = self.docs.read().await;
        let mut matched: Vec<T> = docs
            .values()
            .cloned()
            .map(|mut doc| {
                doc.normalize();
                doc
            })
            .filter(|doc| predicate(doc))
            .collect();
        sort_newest_first(&mut matched);
        matched
    }

    /// All records, newest first
    pub async fn all(&self) -> Vec<T> {
        self.query(|_| true).await
    }

    /// Number of records
    pub async fn count(&self) -> usize {
        self.docs.read().await.len()
    }

    /// Registers a live subscription
    ///
    /// The current snapshot is available immediately; every subsequent
    /// change pushes the complete new set. Dropping the handle
    /// unsubscribes.
    pub fn subscribe(&self) -> Subscription<T> {
        Subscription {
            rx: self.snapshot_tx.subscribe(),
        }
    }

    /// Rebuilds and broadcasts the full snapshot; caller holds the write lock
    fn publish(&self, docs: &HashMap<Uuid, T>) {
        let mut snapshot: Vec<T> = docs
            .values()
            .cloned()
            .map(|mut doc| {
                doc.normalize();
                doc
            })
            .collect();
        sort_newest_first(&mut snapshot);
        self.snapshot_tx.send_replace(Arc::new(snapshot));
    }
}

/// Descending creation time, id as a deterministic tie-breaker
fn sort_newest_first<T: Document>(docs: &mut [T]) {
    docs.sort_by(|a, b| {
        b.created_at()
            .cmp(&a.created_at())
            .then_with(|| b.id().cmp(&a.id()))
    });
}

/// Live subscription handle for a collection
///
/// Wraps a watch channel: only the latest snapshot is retained, so a slow
/// consumer observes the newest state rather than a backlog of diffs.
pub struct Subscription<T: Document> {
    rx: watch::Receiver<Arc<Vec<T>>>,
}

impl<T: Document> Subscription<T> {
    /// Latest full snapshot
    pub fn current(&self) -> Arc<Vec<T>> {
        self.rx.borrow().clone()
    }

    /// Waits for the next push; returns `false` if the collection is gone
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }

    /// Consumes the handle into a `Stream` of snapshots
    pub fn into_stream(self) -> WatchStream<Arc<Vec<T>>> {
        WatchStream::new(self.rx)
    }
}
