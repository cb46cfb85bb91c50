//! Task list filtering
//!
//! Filters compose conjunctively on top of an already visibility-resolved
//! list: scope, leader, text search, status, and tags must all pass.
//! Filtering never re-expands visibility: a filter can only narrow what
//! the resolver already allowed through.

use crate::visibility::{managed_member_ids, VisibilityResolver};
use crewtask_shared::models::{Task, TaskStatus, User};

/// Named viewing scope over the visible task list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewScope {
    /// Everything the viewer can see
    #[default]
    All,

    /// Tasks the viewer owns
    Mine,

    /// Tasks shared with the viewer by someone else
    Shared,

    /// Tasks the viewer owns and has shared out
    SharedByMe,

    /// Tasks owned by the viewer's managed team members (viewer excluded)
    Team,

    /// Ownerless tasks awaiting triage
    Unassigned,
}

/// Composite task filter
///
/// The default value passes every visible task through unchanged. `leader`
/// is honored only for admin viewers; everyone else has it silently
/// ignored.
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    /// Viewing scope
    pub view: ViewScope,

    /// Case-insensitive free-text query (title, description, attachments)
    pub search: String,

    /// Exact status; `None` means any
    pub status: Option<TaskStatus>,

    /// Conjunctive tag selection
    pub tags: Vec<String>,

    /// Admin-only: restrict to one leader's span of control
    pub leader: Option<uuid::Uuid>,
}

impl TaskFilter {
    /// Applies the filter to an already visibility-resolved task list
    ///
    /// `all_users` is the current roster, needed to expand the leader's
    /// span of control. Order is preserved.
    pub fn apply(
        &self,
        resolver: &VisibilityResolver,
        all_users: &[User],
        tasks: &[Task],
    ) -> Vec<Task> {
        let viewer = resolver.viewer();
        let query_lower = self.search.trim().to_lowercase();

        // An unknown leader id leaves the list unrestricted, matching the
        // behavior when the selected leader account is trashed mid-session.
        let leader_span = self
            .leader
            .filter(|_| viewer.is_admin())
            .and_then(|id| all_users.iter().find(|u| u.id == id && u.is_active()))
            .map(|leader| (leader.id, managed_member_ids(leader, all_users)));

        tasks
            .iter()
            .filter(|task| match self.view {
                ViewScope::All => true,
                ViewScope::Mine => task.is_owned_by(viewer.id),
                ViewScope::Shared => {
                    task.is_shared_with(viewer.id) && !task.is_owned_by(viewer.id)
                }
                ViewScope::SharedByMe => {
                    task.is_owned_by(viewer.id) && !task.shared_with.is_empty()
                }
                ViewScope::Team => task.owner_id.is_some_and(|owner| {
                    owner != viewer.id && resolver.managed().contains(&owner)
                }),
                ViewScope::Unassigned => task.is_unassigned(),
            })
            .filter(|task| match &leader_span {
                // Ownerless tasks are outside any leader's span
                Some((leader_id, span)) => task.owner_id.is_some_and(|owner| {
                    owner == *leader_id || span.contains(&owner)
                }),
                None => true,
            })
            .filter(|task| task.matches_text(&query_lower))
            .filter(|task| self.status.map_or(true, |s| task.status == s))
            .filter(|task| task.has_all_tags(&self.tags))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use crewtask_shared::models::Role;
    use std::collections::HashMap;
    use uuid::Uuid;

    fn user(role: Role, team_ids: Vec<Uuid>) -> User {
        User {
            id: Uuid::new_v4(),
            username: "u".to_string(),
            email: "u@example.com".to_string(),
            role,
            password_hash: String::new(),
            team_id: None,
            team_ids,
            team_roles: HashMap::new(),
            is_pending: false,
            is_disabled: false,
            is_deleted: false,
            photo_url: None,
            created_at: Utc::now(),
        }
    }

    fn task(title: &str, owner: Option<Uuid>) -> Task {
        Task {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: String::new(),
            tags: Vec::new(),
            status: TaskStatus::Todo,
            priority: None,
            created_at: Utc::now(),
            due_date: None,
            owner_id: owner,
            owner_username: None,
            shared_with: Vec::new(),
            attachments: Vec::new(),
            project_ids: Vec::new(),
            project_id: None,
            dependency_ids: Vec::new(),
        }
    }

    #[test]
    fn test_default_filter_passes_everything() {
        let viewer = user(Role::Admin, Vec::new());
        let resolver = VisibilityResolver::new(viewer, &[]);
        let tasks = vec![task("a", None), task("b", Some(Uuid::new_v4()))];

        let out = TaskFilter::default().apply(&resolver, &[], &tasks);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_scopes() {
        let viewer = user(Role::User, Vec::new());
        let other = Uuid::new_v4();
        let resolver = VisibilityResolver::new(viewer.clone(), &[]);

        let mine = task("mine", Some(viewer.id));
        let mut shared_out = task("shared out", Some(viewer.id));
        shared_out.shared_with.push(other);
        let mut shared_in = task("shared in", Some(other));
        shared_in.shared_with.push(viewer.id);
        let unassigned = task("loose", None);
        let tasks = vec![
            mine.clone(),
            shared_out.clone(),
            shared_in.clone(),
            unassigned.clone(),
        ];

        let scope = |view| TaskFilter { view, ..Default::default() }.apply(&resolver, &[], &tasks);

        assert_eq!(
            scope(ViewScope::Mine).iter().map(|t| t.id).collect::<Vec<_>>(),
            vec![mine.id, shared_out.id]
        );
        assert_eq!(
            scope(ViewScope::Shared).iter().map(|t| t.id).collect::<Vec<_>>(),
            vec![shared_in.id]
        );
        assert_eq!(
            scope(ViewScope::SharedByMe).iter().map(|t| t.id).collect::<Vec<_>>(),
            vec![shared_out.id]
        );
        assert_eq!(
            scope(ViewScope::Unassigned).iter().map(|t| t.id).collect::<Vec<_>>(),
            vec![unassigned.id]
        );
    }

    #[test]
    fn test_team_scope_excludes_viewer() {
        let team = Uuid::new_v4();
        let manager = user(Role::Manager, vec![team]);
        let member = user(Role::User, vec![team]);
        let roster = vec![manager.clone(), member.clone()];
        let resolver = VisibilityResolver::new(manager.clone(), &roster);

        let tasks = vec![task("own", Some(manager.id)), task("member", Some(member.id))];
        let out = TaskFilter { view: ViewScope::Team, ..Default::default() }
            .apply(&resolver, &roster, &tasks);

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].owner_id, Some(member.id));
    }

    #[test]
    fn test_leader_filter_is_admin_only() {
        let team = Uuid::new_v4();
        let admin = user(Role::Admin, Vec::new());
        let leader = user(Role::Manager, vec![team]);
        let member = user(Role::User, vec![team]);
        let outsider = user(Role::User, Vec::new());
        let roster = vec![admin.clone(), leader.clone(), member.clone(), outsider.clone()];

        let tasks = vec![
            task("leader own", Some(leader.id)),
            task("member", Some(member.id)),
            task("outside", Some(outsider.id)),
            task("loose", None),
        ];
        let filter = TaskFilter { leader: Some(leader.id), ..Default::default() };

        let resolver = VisibilityResolver::new(admin, &roster);
        let out = filter.apply(&resolver, &roster, &tasks);
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|t| {
            t.owner_id == Some(leader.id) || t.owner_id == Some(member.id)
        }));

        // The same filter in a non-admin's hands is ignored: the whole
        // input list (visibility is applied upstream) passes through.
        let resolver = VisibilityResolver::new(leader.clone(), &roster);
        let out = filter.apply(&resolver, &roster, &tasks);
        assert_eq!(out.len(), 4);
    }

    #[test]
    fn test_unknown_leader_leaves_list_unrestricted() {
        let admin = user(Role::Admin, Vec::new());
        let resolver = VisibilityResolver::new(admin, &[]);
        let tasks = vec![task("a", Some(Uuid::new_v4()))];

        let filter = TaskFilter { leader: Some(Uuid::new_v4()), ..Default::default() };
        assert_eq!(filter.apply(&resolver, &[], &tasks).len(), 1);
    }

    #[test]
    fn test_reapplying_filter_is_a_no_op() {
        let team = Uuid::new_v4();
        let manager = user(Role::Manager, vec![team]);
        let member = user(Role::User, vec![team]);
        let roster = vec![manager.clone(), member.clone()];
        let resolver = VisibilityResolver::new(manager.clone(), &roster);

        let mut tagged = task("Inspect rigging", Some(member.id));
        tagged.tags = vec!["ops".to_string()];
        let tasks = vec![
            task("Own item", Some(manager.id)),
            tagged,
            task("loose", None),
        ];
        let filter = TaskFilter {
            view: ViewScope::Team,
            search: "rigging".to_string(),
            tags: vec!["ops".to_string()],
            ..Default::default()
        };

        let once = filter.apply(&resolver, &roster, &tasks);
        assert_eq!(once.len(), 1);

        let twice = filter.apply(&resolver, &roster, &once);
        assert_eq!(
            twice.iter().map(|t| t.id).collect::<Vec<_>>(),
            once.iter().map(|t| t.id).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_search_status_and_tags_compose() {
        let viewer = user(Role::Admin, Vec::new());
        let resolver = VisibilityResolver::new(viewer, &[]);

        let mut hit = task("Deploy release", None);
        hit.status = TaskStatus::InProgress;
        hit.tags = vec!["ops".to_string(), "q3".to_string()];
        let mut wrong_status = hit.clone();
        wrong_status.id = Uuid::new_v4();
        wrong_status.status = TaskStatus::Done;
        let tasks = vec![hit.clone(), wrong_status, task("Unrelated", None)];

        let filter = TaskFilter {
            search: "DEPLOY".to_string(),
            status: Some(TaskStatus::InProgress),
            tags: vec!["ops".to_string()],
            ..Default::default()
        };
        let out = filter.apply(&resolver, &[], &tasks);

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, hit.id);
    }
}
