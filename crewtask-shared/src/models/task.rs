//! Task records and their helper predicates
//!
//! Tasks carry free-text tags, a shared-with set, inline attachments, and
//! multi-project membership. The legacy single `projectId` field is kept
//! read-compatible and reconciled into `projectIds` at the store boundary.
//!
//! Every predicate here treats an absent or empty collection as empty and
//! never panics: the filter pipeline depends on that.
//!
//! # Example
//!
//! ```
//! use crewtask_shared::models::task::{Task, TaskStatus};
//! use uuid::Uuid;
//!
//! # fn example(task: &Task) {
//! let me = Uuid::new_v4();
//! if task.is_owned_by(me) || task.is_shared_with(me) {
//!     // visible to a plain user
//! }
//! # }
//! ```

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Task workflow status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Todo,
    InProgress,
    InWaiting,
    Done,
}

impl TaskStatus {
    /// Wire-format name, used in log details
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "TODO",
            TaskStatus::InProgress => "IN_PROGRESS",
            TaskStatus::InWaiting => "IN_WAITING",
            TaskStatus::Done => "DONE",
        }
    }
}

/// Task priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
}

/// Declared kind of an inline attachment
///
/// Only `File` payloads are text-searched; image and video payloads are
/// matched by name alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttachmentKind {
    Image,
    Video,
    File,
}

/// Inline binary attachment embedded in the task record
///
/// The payload is a base64 data URL (`data:<mime>;base64,<payload>`), not a
/// reference into separate blob storage. Size thresholds are enforced as
/// warnings in the service layer only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    /// Unique attachment ID
    pub id: Uuid,

    /// Original file name
    pub name: String,

    /// Declared kind
    #[serde(rename = "type")]
    pub kind: AttachmentKind,

    /// Base64 data URL payload
    pub data: String,

    /// Declared size in bytes
    pub size: u64,
}

impl Attachment {
    /// Decodes the payload of a `File` attachment as text
    ///
    /// Returns `None` for image/video attachments, malformed data URLs, and
    /// undecodable payloads. Never errors: an unreadable attachment is
    /// simply not searchable.
    pub fn decoded_text(&self) -> Option<String> {
        if self.kind != AttachmentKind::File {
            return None;
        }
        let payload = self.data.split_once(',')?.1;
        let bytes = STANDARD.decode(payload).ok()?;
        Some(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// Task record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique task ID
    pub id: Uuid,

    /// Task title
    pub title: String,

    /// Task description
    #[serde(default)]
    pub description: String,

    /// Free-text tags; tag filtering is conjunctive
    #[serde(default)]
    pub tags: Vec<String>,

    /// Workflow status
    pub status: TaskStatus,

    /// Optional priority
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<TaskPriority>,

    /// When the task was created (collections are ordered by this, descending)
    pub created_at: DateTime<Utc>,

    /// Optional due date
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,

    /// Owner; `None` means unassigned ("needs triage")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<Uuid>,

    /// Owner display name, denormalized at write time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_username: Option<String>,

    /// Users this task is shared with
    #[serde(default)]
    pub shared_with: Vec<Uuid>,

    /// Inline attachments
    #[serde(default)]
    pub attachments: Vec<Attachment>,

    /// Projects this task belongs to
    #[serde(default)]
    pub project_ids: Vec<Uuid>,

    /// Legacy single-project field, reconciled into `project_ids` on read
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<Uuid>,

    /// Tasks that must be completed before this one
    #[serde(default)]
    pub dependency_ids: Vec<Uuid>,
}

impl Task {
    /// Folds the legacy `project_id` field into `project_ids`
    ///
    /// Applied once at the store read boundary. The legacy value is moved
    /// into the array, never dropped.
    pub fn normalize(&mut self) {
        if self.project_ids.is_empty() {
            if let Some(project_id) = self.project_id.take() {
                self.project_ids.push(project_id);
            }
        }
        self.project_id = None;
    }

    /// Whether `user_id` owns this task
    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.owner_id == Some(user_id)
    }

    /// Whether this task is shared with `user_id`
    pub fn is_shared_with(&self, user_id: Uuid) -> bool {
        self.shared_with.contains(&user_id)
    }

    /// Whether this task has no owner
    pub fn is_unassigned(&self) -> bool {
        self.owner_id.is_none()
    }

    /// Whether this task carries every tag in `tags`
    ///
    /// Conjunctive: an empty selection matches everything.
    pub fn has_all_tags(&self, tags: &[String]) -> bool {
        tags.iter().all(|t| self.tags.contains(t))
    }

    /// Case-insensitive substring search over title, description, and
    /// attachments
    ///
    /// Attachment names always participate; the decoded payload only for
    /// `File` attachments. `query_lower` must already be lowercased. The
    /// empty query matches everything.
    pub fn matches_text(&self, query_lower: &str) -> bool {
        if query_lower.is_empty() {
            return true;
        }
        if self.title.to_lowercase().contains(query_lower)
            || self.description.to_lowercase().contains(query_lower)
        {
            return true;
        }
        self.attachments.iter().any(|att| {
            att.name.to_lowercase().contains(query_lower)
                || att
                    .decoded_text()
                    .is_some_and(|text| text.to_lowercase().contains(query_lower))
        })
    }
}

/// Partial update for a task record
///
/// `None` fields are left untouched; the store never writes a null
/// placeholder for an absent field. Clearing an optional field is not
/// expressible through a patch, matching the legacy update semantics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub due_date: Option<NaiveDate>,
    pub owner_id: Option<Uuid>,
    pub owner_username: Option<String>,
    pub shared_with: Option<Vec<Uuid>>,
    pub attachments: Option<Vec<Attachment>>,
    pub project_ids: Option<Vec<Uuid>>,
    pub dependency_ids: Option<Vec<Uuid>>,
}
