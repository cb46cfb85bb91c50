//! Role-based task visibility
//!
//! Visibility is computed in the service layer, never enforced by the
//! store: every consumer of a raw collection snapshot must pass it through
//! a [`VisibilityResolver`] before showing it to a user.
//!
//! The rules per role:
//!
//! - **Admin** sees every task.
//! - **Effective manager** (global `Manager` role, or a `Manager` override
//!   for a team they belong to) sees unassigned tasks, their own tasks,
//!   tasks shared with them, and tasks owned by members of the teams they
//!   manage.
//! - **User** sees their own tasks and tasks shared with them.
//!
//! Soft-deleted users never count as managed members, so their tasks drop
//! out of a manager's view the moment the account is trashed.

use crewtask_shared::models::{Project, Task, User};
use std::collections::HashSet;
use uuid::Uuid;

/// Users whose tasks `viewer` can see through team management
///
/// Members of every team the viewer manages, excluding soft-deleted
/// accounts. The viewer themself is included when they belong to a managed
/// team; callers that want "others only" filter the viewer out.
pub fn managed_member_ids(viewer: &User, all_users: &[User]) -> HashSet<Uuid> {
    let managed_teams = viewer.managed_team_ids();
    if managed_teams.is_empty() {
        return HashSet::new();
    }
    all_users
        .iter()
        .filter(|u| u.is_active())
        .filter(|u| u.team_ids.iter().any(|tid| managed_teams.contains(tid)))
        .map(|u| u.id)
        .collect()
}

/// Precomputed visibility decision for one viewer
///
/// Resolves the managed-member set once and answers per-task questions in
/// constant time. Build one per snapshot; the resolver does not observe
/// later user changes.
#[derive(Debug, Clone)]
pub struct VisibilityResolver {
    viewer: User,
    managed: HashSet<Uuid>,
}

impl VisibilityResolver {
    /// Builds a resolver for `viewer` against the current user roster
    pub fn new(viewer: User, all_users: &[User]) -> Self {
        let managed = managed_member_ids(&viewer, all_users);
        Self { viewer, managed }
    }

    /// The viewer this resolver was built for
    pub fn viewer(&self) -> &User {
        &self.viewer
    }

    /// Users the viewer manages (soft-deleted accounts excluded)
    pub fn managed(&self) -> &HashSet<Uuid> {
        &self.managed
    }

    /// Whether the viewer may see `task`
    pub fn can_see(&self, task: &Task) -> bool {
        if self.viewer.is_admin() {
            return true;
        }
        let own_or_shared =
            task.is_owned_by(self.viewer.id) || task.is_shared_with(self.viewer.id);
        if self.viewer.is_effective_manager() {
            own_or_shared
                || task.is_unassigned()
                || task.owner_id.is_some_and(|owner| self.managed.contains(&owner))
        } else {
            own_or_shared
        }
    }

    /// Filters `tasks` down to what the viewer may see, preserving order
    pub fn visible_tasks(&self, tasks: &[Task]) -> Vec<Task> {
        tasks.iter().filter(|t| self.can_see(t)).cloned().collect()
    }

    /// Filters `projects` down to what the viewer may see, preserving order
    ///
    /// Projects use their own membership sets with no team inheritance.
    pub fn visible_projects(&self, projects: &[Project]) -> Vec<Project> {
        projects
            .iter()
            .filter(|p| p.is_visible_to(&self.viewer))
            .cloned()
            .collect()
    }
}
