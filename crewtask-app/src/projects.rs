//! Project lifecycle
//!
//! Projects group tasks and carry their own membership sets. Deleting a
//! parent never cascades: children keep a dangling parent reference and
//! simply stop appearing under any parent. Member additions notify the
//! affected users.

use crate::error::{flatten_validation, require_admin, AppError, AppResult};
use crate::logs::LogService;
use crate::notifications::NotificationService;
use crate::visibility::VisibilityResolver;
use chrono::NaiveDate;
use crewtask_shared::models::{
    LogAction, NotificationKind, Project, ProjectPatch, ProjectStatus, TaskPriority, User,
};
use crewtask_store::Store;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

/// Input for project creation
#[derive(Debug, Clone, Validate)]
pub struct NewProject {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    pub description: String,
    pub status: ProjectStatus,
    pub shared_with: Vec<Uuid>,
    pub team_ids: Vec<Uuid>,
    pub responsible_ids: Vec<Uuid>,
    pub priority: Option<TaskPriority>,
    pub due_date: Option<NaiveDate>,
    pub parent_project_id: Option<Uuid>,
    pub is_routine_instance: bool,
}

impl Default for NewProject {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            status: ProjectStatus::Active,
            shared_with: Vec::new(),
            team_ids: Vec::new(),
            responsible_ids: Vec::new(),
            priority: None,
            due_date: None,
            parent_project_id: None,
            is_routine_instance: false,
        }
    }
}

/// Project operations
#[derive(Clone)]
pub struct ProjectService {
    store: Arc<Store>,
    logs: LogService,
    notifications: NotificationService,
}

impl ProjectService {
    pub fn new(store: Arc<Store>, logs: LogService, notifications: NotificationService) -> Self {
        Self {
            store,
            logs,
            notifications,
        }
    }

    /// Creates a project owned by `actor`
    ///
    /// Everyone in the shared-with and responsible sets (minus the actor)
    /// is notified once, even when listed in both sets.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for an empty title.
    pub async fn create_project(&self, actor: &User, input: NewProject) -> AppResult<Project> {
        input
            .validate()
            .map_err(|e| AppError::Validation(flatten_validation(&e)))?;

        let project = Project {
            id: Uuid::nil(),
            title: input.title,
            description: input.description,
            owner_id: actor.id,
            created_at: chrono::Utc::now(),
            status: input.status,
            shared_with: input.shared_with,
            team_ids: input.team_ids,
            responsible_ids: input.responsible_ids,
            priority: input.priority,
            due_date: input.due_date,
            parent_project_id: input.parent_project_id,
            is_routine_instance: input.is_routine_instance,
        };
        let stored = self.store.projects.create(project).await;

        let details = if stored.parent_project_id.is_some() {
            "Sub-project created"
        } else {
            "Project created"
        };
        self.logs
            .record(
                actor,
                LogAction::ProjectCreate,
                stored.id.to_string(),
                stored.title.clone(),
                details,
            )
            .await;

        let mut members = stored.shared_with.clone();
        members.extend(&stored.responsible_ids);
        self.notifications
            .notify_many(
                &members,
                actor.id,
                "New Project",
                &format!("You were added to project: {}", stored.title),
                NotificationKind::Info,
                Some(format!("/project/{}", stored.id)),
            )
            .await;

        Ok(stored)
    }

    /// Applies a partial update to a project
    ///
    /// # Errors
    ///
    /// Returns a store error if the project does not exist.
    pub async fn update_project(
        &self,
        actor: &User,
        project_id: Uuid,
        patch: ProjectPatch,
    ) -> AppResult<Project> {
        let status_change = patch.status;
        let updated = self.store.projects.update(project_id, patch).await?;

        let details = match status_change {
            Some(status) => format!("Project status: {}", status.as_str()),
            None => "Project updated".to_string(),
        };
        self.logs
            .record(
                actor,
                LogAction::ProjectUpdate,
                updated.id.to_string(),
                updated.title.clone(),
                details,
            )
            .await;
        Ok(updated)
    }

    /// Deletes a project without touching its children or tasks
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the project does not exist.
    pub async fn delete_project(&self, actor: &User, project_id: Uuid) -> AppResult<()> {
        let project = self
            .store
            .projects
            .get(project_id)
            .await
            .ok_or_else(|| AppError::NotFound("project".to_string()))?;
        self.store.projects.delete(project_id).await;

        self.logs
            .record(
                actor,
                LogAction::ProjectDelete,
                project_id.to_string(),
                project.title,
                "Project deleted",
            )
            .await;
        Ok(())
    }

    /// Projects the viewer may see, newest first
    pub async fn visible_projects(&self, viewer: &User) -> Vec<Project> {
        let users = self.store.users.all().await;
        let projects = self.store.projects.all().await;
        VisibilityResolver::new(viewer.clone(), &users).visible_projects(&projects)
    }

    /// Direct children of one project, newest first
    pub async fn sub_projects_of(&self, parent_id: Uuid) -> Vec<Project> {
        self.store
            .projects
            .query(|p| p.is_child_of(parent_id))
            .await
    }

    /// Deletes every archived project; admin only
    ///
    /// Returns how many projects were removed.
    pub async fn delete_archived_projects(&self, actor: &User) -> AppResult<usize> {
        require_admin(actor)?;

        let archived = self
            .store
            .projects
            .query(|p| p.status == ProjectStatus::Archived)
            .await;
        let mut removed = 0;
        for project in archived {
            if self.store.projects.delete(project.id).await {
                removed += 1;
            }
        }
        if removed > 0 {
            self.logs
                .record(
                    actor,
                    LogAction::ProjectDelete,
                    "maintenance",
                    "System",
                    format!("Deleted {removed} archived projects"),
                )
                .await;
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use crewtask_shared::config::Config;
    use crewtask_shared::models::Role;
    use std::collections::HashMap;

    fn user(role: Role) -> User {
        User {
            id: Uuid::new_v4(),
            username: "lead".to_string(),
            email: "lead@example.com".to_string(),
            role,
            password_hash: String::new(),
            team_id: None,
            team_ids: Vec::new(),
            team_roles: HashMap::new(),
            is_pending: false,
            is_disabled: false,
            is_deleted: false,
            photo_url: None,
            created_at: Utc::now(),
        }
    }

    fn service(store: &Arc<Store>) -> ProjectService {
        let config = Config::default();
        ProjectService::new(
            store.clone(),
            LogService::new(store.clone(), config.logs),
            NotificationService::new(store.clone()),
        )
    }

    #[tokio::test]
    async fn test_create_notifies_members_once() {
        let store = Store::new();
        let projects = service(&store);
        let actor = user(Role::User);
        let both_sets = Uuid::new_v4();

        projects
            .create_project(
                &actor,
                NewProject {
                    title: "Launch".to_string(),
                    shared_with: vec![both_sets, actor.id],
                    responsible_ids: vec![both_sets],
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let inbox = store.notifications.query(|n| n.user_id == both_sets).await;
        assert_eq!(inbox.len(), 1);
        assert!(store
            .notifications
            .query(|n| n.user_id == actor.id)
            .await
            .is_empty());
    }

    #[tokio::test]
    async fn test_sub_project_creation_is_flagged_in_log() {
        let store = Store::new();
        let projects = service(&store);
        let actor = user(Role::User);

        let parent = projects
            .create_project(
                &actor,
                NewProject {
                    title: "Parent".to_string(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let child = projects
            .create_project(
                &actor,
                NewProject {
                    title: "Child".to_string(),
                    parent_project_id: Some(parent.id),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let entries = store
            .logs
            .query(|e| e.action == LogAction::ProjectCreate)
            .await;
        let child_entry = entries.iter().find(|e| e.target_title == "Child").unwrap();
        assert_eq!(child_entry.details, "Sub-project created");

        let children = projects.sub_projects_of(parent.id).await;
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].id, child.id);
    }

    #[tokio::test]
    async fn test_delete_parent_keeps_children() {
        let store = Store::new();
        let projects = service(&store);
        let actor = user(Role::Admin);

        let parent = projects
            .create_project(
                &actor,
                NewProject {
                    title: "Parent".to_string(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let child = projects
            .create_project(
                &actor,
                NewProject {
                    title: "Child".to_string(),
                    parent_project_id: Some(parent.id),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        projects.delete_project(&actor, parent.id).await.unwrap();

        // The child survives with its dangling parent reference intact
        let survivor = store.projects.get(child.id).await.unwrap();
        assert_eq!(survivor.parent_project_id, Some(parent.id));
    }

    #[tokio::test]
    async fn test_archived_sweep() {
        let store = Store::new();
        let projects = service(&store);
        let admin = user(Role::Admin);
        let member = user(Role::User);

        let keep = projects
            .create_project(
                &admin,
                NewProject {
                    title: "Active".to_string(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        projects
            .create_project(
                &admin,
                NewProject {
                    title: "Old".to_string(),
                    status: ProjectStatus::Archived,
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert!(projects.delete_archived_projects(&member).await.is_err());
        assert_eq!(projects.delete_archived_projects(&admin).await.unwrap(), 1);
        assert!(store.projects.get(keep.id).await.is_some());
    }
}
