//! Domain records for CrewTask
//!
//! All records serialize with camelCase field names and SCREAMING_SNAKE_CASE
//! enum variants, matching the document shapes the legacy deployment stored.
//! Legacy single-reference fields (`task.projectId`, `user.teamId`) coexist
//! with the current array fields and are reconciled once at the store read
//! boundary, never silently dropped.
//!
//! # Models
//!
//! - `user`: Accounts, global roles, team membership, per-team role overrides
//! - `team`: Named user groupings used for visibility scoping
//! - `task`: Work items with tags, shares, inline attachments
//! - `project`: Task containers with one surfaced level of hierarchy
//! - `duty`: Reusable ownerless task templates
//! - `routine`: Named duty bundles with a suggested frequency
//! - `log`: Append-only audit records
//! - `notification`: Persistent per-user notifications

pub mod duty;
pub mod log;
pub mod notification;
pub mod project;
pub mod routine;
pub mod task;
pub mod team;
pub mod user;

pub use duty::Duty;
pub use log::{LogAction, LogEntry};
pub use notification::{Notification, NotificationKind, NotificationPatch};
pub use project::{Project, ProjectPatch, ProjectStatus};
pub use routine::{Routine, RoutineFrequency};
pub use task::{Attachment, AttachmentKind, Task, TaskPatch, TaskPriority, TaskStatus};
pub use team::{Team, TeamPatch};
pub use user::{CreateUserRequest, RegisterRequest, Role, User, UserPatch};
