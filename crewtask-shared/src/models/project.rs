//! Project records
//!
//! Projects group tasks, carry their own shared-with and responsible-leader
//! sets, and support one surfaced level of hierarchy through
//! `parent_project_id`. Deleting a parent does not cascade to children: a
//! child keeps its (now dangling) parent reference.
//!
//! Unlike tasks, project visibility relies on the project's own membership
//! sets, with no team inheritance.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::task::TaskPriority;
use super::user::User;

/// Project lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProjectStatus {
    Active,
    Completed,
    Archived,
}

impl ProjectStatus {
    /// Wire-format name, used in log details
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Active => "ACTIVE",
            ProjectStatus::Completed => "COMPLETED",
            ProjectStatus::Archived => "ARCHIVED",
        }
    }
}

/// Project record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Unique project ID
    pub id: Uuid,

    /// Project title
    pub title: String,

    /// Project description
    #[serde(default)]
    pub description: String,

    /// Owner
    pub owner_id: Uuid,

    /// When the project was created
    pub created_at: DateTime<Utc>,

    /// Lifecycle status
    pub status: ProjectStatus,

    /// Users this project is shared with
    #[serde(default)]
    pub shared_with: Vec<Uuid>,

    /// Teams associated with this project
    #[serde(default)]
    pub team_ids: Vec<Uuid>,

    /// Responsible leaders
    #[serde(default)]
    pub responsible_ids: Vec<Uuid>,

    /// Optional priority
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<TaskPriority>,

    /// Optional due date
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,

    /// Parent project (one surfaced level of hierarchy)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_project_id: Option<Uuid>,

    /// Machine-generated from a routine assignment
    #[serde(default)]
    pub is_routine_instance: bool,
}

impl Project {
    /// Whether `user` may see this project
    ///
    /// Admins see everything; otherwise the project's own membership sets
    /// decide: owner, shared-with, or responsible. No team inheritance.
    pub fn is_visible_to(&self, user: &User) -> bool {
        user.is_admin()
            || self.owner_id == user.id
            || self.shared_with.contains(&user.id)
            || self.responsible_ids.contains(&user.id)
    }

    /// Whether this project is a sub-project of `parent_id`
    pub fn is_child_of(&self, parent_id: Uuid) -> bool {
        self.parent_project_id == Some(parent_id)
    }
}

/// Partial update for a project record
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<ProjectStatus>,
    pub shared_with: Option<Vec<Uuid>>,
    pub team_ids: Option<Vec<Uuid>>,
    pub responsible_ids: Option<Vec<Uuid>>,
    pub priority: Option<TaskPriority>,
    pub due_date: Option<NaiveDate>,
    pub parent_project_id: Option<Uuid>,
}
