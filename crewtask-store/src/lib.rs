//! # CrewTask Store
//!
//! In-memory document store reproducing the backend contract the CrewTask
//! services consume: named collections of id-addressed records with create,
//! partial update, delete, one-shot query, and a live subscription that
//! pushes the **complete** current set on every change (full-replace
//! semantics, never diffs). Also hosts the auth collaborator: email/password
//! sign-up and sign-in, session state, and a live "current session changed"
//! subscription.
//!
//! ## Module Organization
//!
//! - `collection`: Generic document collection with snapshot subscriptions
//! - `documents`: `Document` implementations for the domain records
//! - `store`: The eight named collections bundled together
//! - `auth`: Password hashing and the session-holding auth service
//!
//! ## Consistency model
//!
//! Last-write-wins per document. There are no cross-document transactions:
//! multi-record operations are sequential independent writes, and a failure
//! partway leaves earlier writes committed.

pub mod auth;
pub mod collection;
pub mod documents;
pub mod store;

pub use collection::{Collection, Document, StoreError, Subscription};
pub use store::Store;

/// Current version of the CrewTask store library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
