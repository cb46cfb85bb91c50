//! Duties, routines, and routine assignment
//!
//! A routine bundles duty references under a suggested frequency. The
//! admin panel maintains the catalogue; assigning a routine to a user on a
//! date expands it into one project plus one task per duty that still
//! resolves. The expansion writes records one by one; a failure partway
//! can leave the project without some of its tasks, which the original
//! backend accepted too.

use crate::error::{require_admin, AppError, AppResult};
use crate::logs::LogService;
use crate::notifications::NotificationService;
use chrono::NaiveDate;
use crewtask_shared::models::{
    Duty, LogAction, NotificationKind, Project, ProjectStatus, Routine, RoutineFrequency, Task,
    TaskPriority, TaskStatus, User,
};
use crewtask_store::Store;
use std::sync::Arc;
use uuid::Uuid;

/// Tags stamped on every generated task
const GENERATED_TAGS: [&str; 2] = ["Routine", "Auto-Generated"];

/// Result of expanding a routine assignment
#[derive(Debug, Clone)]
pub struct RoutineAssignment {
    /// The generated container project
    pub project: Project,

    /// One task per duty that resolved
    pub tasks: Vec<Task>,

    /// Duty references that no longer resolved and were skipped
    pub skipped_duties: usize,
}

/// Duty and routine catalogue plus assignment
#[derive(Clone)]
pub struct RoutineService {
    store: Arc<Store>,
    logs: LogService,
    notifications: NotificationService,
}

impl RoutineService {
    pub fn new(store: Arc<Store>, logs: LogService, notifications: NotificationService) -> Self {
        Self {
            store,
            logs,
            notifications,
        }
    }

    /// The duty catalogue, alphabetical by title
    pub async fn duties(&self) -> Vec<Duty> {
        let mut duties = self.store.duties.all().await;
        duties.sort_by(|a, b| a.title.to_lowercase().cmp(&b.title.to_lowercase()));
        duties
    }

    /// Adds a duty to the catalogue; admin only
    pub async fn create_duty(&self, actor: &User, title: &str, description: &str) -> AppResult<Duty> {
        require_admin(actor)?;
        let title = title.trim();
        if title.is_empty() {
            return Err(AppError::Validation("Duty title is required".to_string()));
        }

        let duty = Duty {
            id: Uuid::nil(),
            title: title.to_string(),
            description: description.trim().to_string(),
            created_at: chrono::Utc::now(),
        };
        Ok(self.store.duties.create(duty).await)
    }

    /// Removes a duty; admin only
    ///
    /// Routines referencing it keep the dangling id; assignment skips it.
    pub async fn delete_duty(&self, actor: &User, duty_id: Uuid) -> AppResult<()> {
        require_admin(actor)?;
        if !self.store.duties.delete(duty_id).await {
            return Err(AppError::NotFound("duty".to_string()));
        }
        Ok(())
    }

    /// The routine catalogue, alphabetical by title
    pub async fn routines(&self) -> Vec<Routine> {
        let mut routines = self.store.routines.all().await;
        routines.sort_by(|a, b| a.title.to_lowercase().cmp(&b.title.to_lowercase()));
        routines
    }

    /// Creates a routine; admin only
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for a blank title or an empty duty
    /// selection.
    pub async fn create_routine(
        &self,
        actor: &User,
        title: &str,
        description: Option<String>,
        frequency: RoutineFrequency,
        duty_ids: Vec<Uuid>,
    ) -> AppResult<Routine> {
        require_admin(actor)?;
        let title = title.trim();
        if title.is_empty() {
            return Err(AppError::Validation("Routine title is required".to_string()));
        }
        if duty_ids.is_empty() {
            return Err(AppError::Validation(
                "A routine needs at least one duty".to_string(),
            ));
        }

        let routine = Routine {
            id: Uuid::nil(),
            title: title.to_string(),
            description,
            frequency,
            duty_ids,
            created_at: chrono::Utc::now(),
        };
        let stored = self.store.routines.create(routine).await;

        self.logs
            .record(
                actor,
                LogAction::RoutineCreate,
                stored.id.to_string(),
                stored.title.clone(),
                "New routine created",
            )
            .await;
        Ok(stored)
    }

    /// Removes a routine; admin only
    pub async fn delete_routine(&self, actor: &User, routine_id: Uuid) -> AppResult<()> {
        require_admin(actor)?;
        if !self.store.routines.delete(routine_id).await {
            return Err(AppError::NotFound("routine".to_string()));
        }
        Ok(())
    }

    /// Expands a routine into a project and its tasks for one user and date
    ///
    /// The project and every generated task are owned by the assigner and
    /// shared with the target, and the project is flagged as a routine
    /// instance. Each resolvable duty becomes one `TODO`/`MEDIUM` task;
    /// duty ids that no longer resolve are skipped without failing the
    /// assignment. The target gets one notification and the audit trail
    /// one `ROUTINE_ASSIGN` entry.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Forbidden`] unless the actor is an admin or an
    /// effective manager, and [`AppError::NotFound`] when the routine or
    /// target user is missing.
    pub async fn assign(
        &self,
        actor: &User,
        routine_id: Uuid,
        target_user_id: Uuid,
        date: NaiveDate,
    ) -> AppResult<RoutineAssignment> {
        if !actor.is_admin() && !actor.is_effective_manager() {
            return Err(AppError::Forbidden(
                "admin or manager role required".to_string(),
            ));
        }
        let routine = self
            .store
            .routines
            .get(routine_id)
            .await
            .ok_or_else(|| AppError::NotFound("routine".to_string()))?;
        let target = self
            .store
            .users
            .get(target_user_id)
            .await
            .ok_or_else(|| AppError::NotFound("user".to_string()))?;

        let mut duties = Vec::new();
        let mut skipped = 0;
        for duty_id in &routine.duty_ids {
            match self.store.duties.get(*duty_id).await {
                Some(duty) => duties.push(duty),
                None => {
                    skipped += 1;
                    tracing::warn!(routine = %routine.id, duty = %duty_id, "skipping duty that no longer resolves");
                }
            }
        }

        let project = Project {
            id: Uuid::nil(),
            title: format!("Routine: {} - {}", routine.title, date.format("%Y-%m-%d")),
            description: format!(
                "Scheduled routine execution ({}).\n{}",
                routine.frequency.as_str(),
                routine.description.clone().unwrap_or_default()
            ),
            owner_id: actor.id,
            created_at: chrono::Utc::now(),
            status: ProjectStatus::Active,
            shared_with: vec![target.id],
            team_ids: Vec::new(),
            responsible_ids: vec![target.id],
            priority: Some(TaskPriority::Medium),
            due_date: Some(date),
            parent_project_id: None,
            is_routine_instance: true,
        };
        let project = self.store.projects.create(project).await;

        let mut tasks = Vec::new();
        for duty in duties {
            let description = if duty.description.is_empty() {
                format!("Duty from routine {}", routine.title)
            } else {
                duty.description.clone()
            };
            let task = Task {
                id: Uuid::nil(),
                title: duty.title.clone(),
                description,
                tags: GENERATED_TAGS.iter().map(|t| t.to_string()).collect(),
                status: TaskStatus::Todo,
                priority: Some(TaskPriority::Medium),
                created_at: chrono::Utc::now(),
                due_date: Some(date),
                owner_id: Some(actor.id),
                owner_username: Some(actor.username.clone()),
                shared_with: vec![target.id],
                attachments: Vec::new(),
                project_ids: vec![project.id],
                project_id: None,
                dependency_ids: Vec::new(),
            };
            tasks.push(self.store.tasks.create(task).await);
        }

        self.logs
            .record(
                actor,
                LogAction::RoutineAssign,
                project.id.to_string(),
                routine.title.clone(),
                format!("Routine assigned to {}", target.username),
            )
            .await;
        self.notifications
            .notify_many(
                &[target.id],
                actor.id,
                "New Routine Assigned",
                &format!(
                    "You have been assigned the routine \"{}\" for {}",
                    routine.title,
                    date.format("%Y-%m-%d")
                ),
                NotificationKind::Info,
                Some(format!("/project/{}", project.id)),
            )
            .await;

        Ok(RoutineAssignment {
            project,
            tasks,
            skipped_duties: skipped,
        })
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
            username: "chief".to_string(),
            email: "chief@example.com".to_string(),
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

    fn service(store: &Arc<Store>) -> RoutineService {
        let config = Config::default();
        RoutineService::new(
            store.clone(),
            LogService::new(store.clone(), config.logs),
            NotificationService::new(store.clone()),
        )
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
    }

    async fn seed_routine(store: &Arc<Store>, routines: &RoutineService, admin: &User) -> Routine {
        let open = routines
            .create_duty(admin, "Open the bridge", "Unlock and check instruments")
            .await
            .unwrap();
        let log_weather = routines.create_duty(admin, "Log weather", "").await.unwrap();
        routines
            .create_routine(
                admin,
                "Morning watch",
                Some("Start-of-day checks".to_string()),
                RoutineFrequency::Daily,
                vec![open.id, log_weather.id],
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_assignment_expands_into_project_and_tasks() {
        let store = Store::new();
        let routines = service(&store);
        let admin = user(Role::Admin);
        let mut target = user(Role::User);
        target.username = "sailor".to_string();
        let target = store.users.insert(target).await;
        let routine = seed_routine(&store, &routines, &admin).await;

        let assignment = routines
            .assign(&admin, routine.id, target.id, date())
            .await
            .unwrap();

        assert_eq!(
            assignment.project.title,
            "Routine: Morning watch - 2025-03-10"
        );
        assert!(assignment.project.is_routine_instance);
        assert_eq!(assignment.project.owner_id, admin.id);
        assert_eq!(assignment.project.shared_with, vec![target.id]);
        assert_eq!(assignment.project.responsible_ids, vec![target.id]);

        // Generated tasks mirror the project: assigner owns, target is
        // the share recipient
        assert_eq!(assignment.tasks.len(), 2);
        for task in &assignment.tasks {
            assert_eq!(task.status, TaskStatus::Todo);
            assert_eq!(task.priority, Some(TaskPriority::Medium));
            assert_eq!(task.owner_id, Some(admin.id));
            assert_eq!(task.owner_username.as_deref(), Some("chief"));
            assert_eq!(task.shared_with, vec![target.id]);
            assert_eq!(task.project_ids, vec![assignment.project.id]);
            assert!(task.has_all_tags(&[
                "Routine".to_string(),
                "Auto-Generated".to_string()
            ]));
        }
        // Empty duty descriptions get the fallback text
        let weather = assignment
            .tasks
            .iter()
            .find(|t| t.title == "Log weather")
            .unwrap();
        assert_eq!(weather.description, "Duty from routine Morning watch");

        let entries = store
            .logs
            .query(|e| e.action == LogAction::RoutineAssign)
            .await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].details, "Routine assigned to sailor");

        let inbox = store.notifications.query(|n| n.user_id == target.id).await;
        assert_eq!(inbox.len(), 1);
        assert!(inbox[0].message.contains("Morning watch"));
    }

    #[tokio::test]
    async fn test_assignment_skips_unresolvable_duties() {
        let store = Store::new();
        let routines = service(&store);
        let admin = user(Role::Admin);
        let target = store.users.insert(user(Role::User)).await;
        let routine = seed_routine(&store, &routines, &admin).await;

        let gone = routine.duty_ids[0];
        routines.delete_duty(&admin, gone).await.unwrap();

        let assignment = routines
            .assign(&admin, routine.id, target.id, date())
            .await
            .unwrap();
        assert_eq!(assignment.tasks.len(), 1);
        assert_eq!(assignment.skipped_duties, 1);
    }

    #[tokio::test]
    async fn test_assignment_requires_manager_or_admin() {
        let store = Store::new();
        let routines = service(&store);
        let admin = user(Role::Admin);
        let target = store.users.insert(user(Role::User)).await;
        let routine = seed_routine(&store, &routines, &admin).await;

        let plain = user(Role::User);
        let err = routines
            .assign(&plain, routine.id, target.id, date())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        // A team-level manager override is enough
        let team = Uuid::new_v4();
        let mut lead = user(Role::User);
        lead.team_ids = vec![team];
        lead.team_roles.insert(team, Role::Manager);
        assert!(routines.assign(&lead, routine.id, target.id, date()).await.is_ok());
    }

    #[tokio::test]
    async fn test_catalogue_is_alphabetical() {
        let store = Store::new();
        let routines = service(&store);
        let admin = user(Role::Admin);

        routines.create_duty(&admin, "zulu", "").await.unwrap();
        routines.create_duty(&admin, "Alpha", "").await.unwrap();
        routines.create_duty(&admin, "mike", "").await.unwrap();

        let titles: Vec<String> = routines.duties().await.into_iter().map(|d| d.title).collect();
        assert_eq!(titles, vec!["Alpha", "mike", "zulu"]);
    }

    #[tokio::test]
    async fn test_routine_needs_duties() {
        let store = Store::new();
        let routines = service(&store);
        let admin = user(Role::Admin);

        let err = routines
            .create_routine(&admin, "Empty", None, RoutineFrequency::Once, Vec::new())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
