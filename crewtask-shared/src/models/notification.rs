//! Persistent per-user notifications
//!
//! Notifications are stored records, one per recipient, emitted when a task
//! is shared, a project gains a member, or a routine is assigned. They are
//! consumed through a per-user full-snapshot subscription.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Notification severity kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationKind {
    Info,
    Warning,
    Success,
    Error,
}

/// Notification record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    /// Unique notification ID
    pub id: Uuid,

    /// Recipient
    pub user_id: Uuid,

    /// Short title
    pub title: String,

    /// Message body
    pub message: String,

    /// Severity kind
    #[serde(rename = "type")]
    pub kind: NotificationKind,

    /// Whether the recipient has read it
    #[serde(default)]
    pub read: bool,

    /// When it was emitted
    pub created_at: DateTime<Utc>,

    /// Optional in-app link (e.g. "/project/<id>")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

/// Partial update for a notification record
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPatch {
    pub read: Option<bool>,
}
