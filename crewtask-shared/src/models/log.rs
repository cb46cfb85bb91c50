//! Append-only audit log records
//!
//! Every mutating operation appends one entry recording who did what to
//! which entity. Writes are fire-and-forget: a failed log write never fails
//! the operation that triggered it. Visibility of entries is role-scoped at
//! read time (see `crewtask-app::logs`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Audited action kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogAction {
    Create,
    Update,
    Delete,
    StatusChange,
    Register,
    ProjectCreate,
    ProjectUpdate,
    ProjectDelete,
    TeamCreate,
    TeamUpdate,
    TeamDelete,
    PasswordChange,
    RoutineCreate,
    RoutineAssign,
}

/// Audit log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    /// Unique entry ID
    pub id: Uuid,

    /// What happened
    pub action: LogAction,

    /// Who did it
    pub user_id: Uuid,

    /// Author display name, denormalized for readability
    pub username: String,

    /// Author's primary team at write time, used for manager scoping
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_id: Option<Uuid>,

    /// Target entity id; free-form because targets include emails and
    /// synthetic ids like "maintenance"
    pub target_id: String,

    /// Target title, denormalized for readability
    pub target_title: String,

    /// Human-readable details
    pub details: String,

    /// When it happened
    pub timestamp: DateTime<Utc>,
}
