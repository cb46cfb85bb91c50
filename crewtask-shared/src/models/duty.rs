//! Duties: reusable ownerless task templates
//!
//! A duty is a library entry with a title and description, referenced by
//! one or more routines. Deleting a duty does not touch the routines that reference
//! it; expansion silently skips ids that no longer resolve.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Duty record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Duty {
    /// Unique duty ID
    pub id: Uuid,

    /// Duty title, becomes the generated task's title
    pub title: String,

    /// Duty description, becomes the generated task's description
    #[serde(default)]
    pub description: String,

    /// When the duty was created
    pub created_at: DateTime<Utc>,
}
