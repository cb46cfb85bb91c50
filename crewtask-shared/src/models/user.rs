//! User accounts, roles, and team membership
//!
//! A user carries one global [`Role`] plus a sparse per-team override map.
//! The override map is consulted first when asking "what is this user in
//! team X"; the global role is the fallback. There is no inheritance
//! between the two.
//!
//! # Effective manager
//!
//! A user is an *effective manager* when their global role is `Manager`, or
//! they hold a `Manager` override for at least one team they belong to.
//! Effective managers see the tasks of every user belonging to a team they
//! manage (see the visibility resolver in `crewtask-app`).
//!
//! # Soft delete
//!
//! `is_deleted` marks the account inactive without removing it: the user is
//! excluded from every visibility and assignment computation, but their
//! historical log entries and authored tasks remain. `is_disabled` only
//! gates login.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;
use validator::Validate;

/// Global or per-team user role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Sees and manages everything
    Admin,

    /// Sees own, shared, unassigned, and managed members' tasks
    Manager,

    /// Sees only own and shared tasks
    User,
}

impl Role {
    /// Wire-format name, used in log details
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Manager => "MANAGER",
            Role::User => "USER",
        }
    }
}

/// User account record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user ID
    pub id: Uuid,

    /// Display name, unique in practice (login accepts it in place of email)
    pub username: String,

    /// Email address used for authentication
    pub email: String,

    /// Global role
    pub role: Role,

    /// Argon2id password hash (empty for pending invites)
    #[serde(default)]
    pub password_hash: String,

    /// Legacy single-team field, reconciled into `team_ids` on read
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_id: Option<Uuid>,

    /// Teams this user belongs to
    #[serde(default)]
    pub team_ids: Vec<Uuid>,

    /// Sparse per-team role overrides; absent entries fall back to `role`
    #[serde(default)]
    pub team_roles: HashMap<Uuid, Role>,

    /// Invited by an admin but not yet registered
    #[serde(default)]
    pub is_pending: bool,

    /// Login disabled by an admin (data retained, computations unaffected)
    #[serde(default)]
    pub is_disabled: bool,

    /// Soft-deleted (login refused, excluded from all active computations)
    #[serde(default)]
    pub is_deleted: bool,

    /// Optional avatar URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,

    /// When the account record was created
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Folds the legacy `team_id` field into `team_ids`
    ///
    /// Applied once at the store read boundary so consumers only ever see
    /// the array form. The legacy value is moved, not dropped.
    pub fn normalize(&mut self) {
        if self.team_ids.is_empty() {
            if let Some(team_id) = self.team_id.take() {
                self.team_ids.push(team_id);
            }
        }
        self.team_id = None;
    }

    /// Role this user holds inside a specific team
    ///
    /// The sparse override map wins; the global role is the default.
    pub fn role_in_team(&self, team_id: Uuid) -> Role {
        self.team_roles.get(&team_id).copied().unwrap_or(self.role)
    }

    /// Whether this user is an admin
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Whether this user is an effective manager
    ///
    /// Global `Manager`, or a `Manager` override for at least one team they
    /// belong to.
    pub fn is_effective_manager(&self) -> bool {
        self.role == Role::Manager
            || self
                .team_ids
                .iter()
                .any(|tid| self.team_roles.get(tid) == Some(&Role::Manager))
    }

    /// Teams this user manages
    ///
    /// For a global manager that is every team they belong to; otherwise
    /// only the teams with a `Manager` override.
    pub fn managed_team_ids(&self) -> Vec<Uuid> {
        self.team_ids
            .iter()
            .copied()
            .filter(|tid| {
                self.role == Role::Manager || self.team_roles.get(tid) == Some(&Role::Manager)
            })
            .collect()
    }

    /// Whether the account participates in active computations
    ///
    /// Only soft deletion removes a user from visibility and assignment
    /// math; a disabled account merely cannot log in.
    pub fn is_active(&self) -> bool {
        !self.is_deleted
    }
}

/// Input for self-service registration
///
/// Validated before any store call; failures never reach the backend.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Desired display name
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,

    /// Email address
    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    /// Password, minimum 6 characters
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

/// Input for direct account creation by an admin
///
/// Unlike self-service registration, the new account can be placed into a
/// team immediately. The creating admin's own session is not touched.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateUserRequest {
    /// Display name
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,

    /// Email address
    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    /// Initial password, minimum 6 characters
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,

    /// Global role for the new account
    pub role: Role,

    /// Optional initial team; the member role defaults to `User`
    pub team_id: Option<Uuid>,
}

/// Partial update for a user record
///
/// `None` fields are left untouched; the store never writes a null
/// placeholder for an absent field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    pub username: Option<String>,
    pub role: Option<Role>,
    pub password_hash: Option<String>,
    pub team_ids: Option<Vec<Uuid>>,
    pub team_roles: Option<HashMap<Uuid, Role>>,
    pub is_pending: Option<bool>,
    pub is_disabled: Option<bool>,
    pub is_deleted: Option<bool>,
    pub photo_url: Option<String>,
}
