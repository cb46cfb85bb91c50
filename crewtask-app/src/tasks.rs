//! Task lifecycle: create, update, delete, and derived views
//!
//! Every mutation appends an audit entry; sharing fans out notifications.
//! Attachment size thresholds are advisory only: oversized payloads are
//! logged as warnings and stored anyway, because the legacy data already
//! contains records past the limits.

use crate::error::{flatten_validation, require_admin, AppError, AppResult};
use crate::filter::TaskFilter;
use crate::logs::LogService;
use crate::notifications::NotificationService;
use crate::visibility::VisibilityResolver;
use chrono::NaiveDate;
use crewtask_shared::config::AttachmentConfig;
use crewtask_shared::models::{
    Attachment, LogAction, NotificationKind, Task, TaskPatch, TaskPriority, TaskStatus, User,
};
use crewtask_store::Store;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

/// Input for task creation
#[derive(Debug, Clone, Validate)]
pub struct NewTask {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub status: TaskStatus,
    pub priority: Option<TaskPriority>,
    pub due_date: Option<NaiveDate>,
    pub shared_with: Vec<Uuid>,
    pub attachments: Vec<Attachment>,
    pub project_ids: Vec<Uuid>,
    pub dependency_ids: Vec<Uuid>,
}

impl Default for NewTask {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            tags: Vec::new(),
            status: TaskStatus::Todo,
            priority: None,
            due_date: None,
            shared_with: Vec::new(),
            attachments: Vec::new(),
            project_ids: Vec::new(),
            dependency_ids: Vec::new(),
        }
    }
}

/// Task operations
#[derive(Clone)]
pub struct TaskService {
    store: Arc<Store>,
    logs: LogService,
    notifications: NotificationService,
    attachments: AttachmentConfig,
}

impl TaskService {
    pub fn new(
        store: Arc<Store>,
        logs: LogService,
        notifications: NotificationService,
        attachments: AttachmentConfig,
    ) -> Self {
        Self {
            store,
            logs,
            notifications,
            attachments,
        }
    }

    /// Creates a task owned by `actor`
    ///
    /// Users named in `shared_with` are notified; the audit trail records
    /// the creation. The owner display name is denormalized at write time.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for an empty title.
    pub async fn create_task(&self, actor: &User, input: NewTask) -> AppResult<Task> {
        input
            .validate()
            .map_err(|e| AppError::Validation(flatten_validation(&e)))?;
        self.warn_attachment_sizes(&input.attachments);

        let task = Task {
            id: Uuid::nil(),
            title: input.title,
            description: input.description,
            tags: input.tags,
            status: input.status,
            priority: input.priority,
            created_at: chrono::Utc::now(),
            due_date: input.due_date,
            owner_id: Some(actor.id),
            owner_username: Some(actor.username.clone()),
            shared_with: input.shared_with,
            attachments: input.attachments,
            project_ids: input.project_ids,
            project_id: None,
            dependency_ids: input.dependency_ids,
        };
        let stored = self.store.tasks.create(task).await;

        self.logs
            .record(
                actor,
                LogAction::Create,
                stored.id.to_string(),
                stored.title.clone(),
                "Task created",
            )
            .await;
        self.notifications
            .notify_many(
                &stored.shared_with,
                actor.id,
                "New Shared Task",
                &format!("\"{}\" was shared with you", stored.title),
                NotificationKind::Info,
                Some(format!("/task/{}", stored.id)),
            )
            .await;

        Ok(stored)
    }

    /// Applies a partial update to a task
    ///
    /// A status change is audited as `STATUS_CHANGE` with the new status
    /// name; a share-list change as a share update; anything else as a
    /// plain update.
    ///
    /// # Errors
    ///
    /// Returns a store error if the task does not exist.
    pub async fn update_task(
        &self,
        actor: &User,
        task_id: Uuid,
        patch: TaskPatch,
    ) -> AppResult<Task> {
        if let Some(attachments) = &patch.attachments {
            self.warn_attachment_sizes(attachments);
        }
        let status_change = patch.status;
        let share_change = patch.shared_with.is_some();

        let updated = self.store.tasks.update(task_id, patch).await?;

        let (action, details) = match status_change {
            Some(status) => (
                LogAction::StatusChange,
                format!("Status changed to {}", status.as_str()),
            ),
            None if share_change => (LogAction::Update, "Share list updated".to_string()),
            None => (LogAction::Update, "Task updated".to_string()),
        };
        self.logs
            .record(actor, action, updated.id.to_string(), updated.title.clone(), details)
            .await;

        Ok(updated)
    }

    /// Deletes a task
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the task does not exist.
    pub async fn delete_task(&self, actor: &User, task_id: Uuid) -> AppResult<()> {
        let task = self
            .store
            .tasks
            .get(task_id)
            .await
            .ok_or_else(|| AppError::NotFound("task".to_string()))?;
        self.store.tasks.delete(task_id).await;

        self.logs
            .record(
                actor,
                LogAction::Delete,
                task_id.to_string(),
                task.title,
                "Task deleted",
            )
            .await;
        Ok(())
    }

    /// Everything the viewer may see, newest first
    pub async fn visible_tasks(&self, viewer: &User) -> Vec<Task> {
        let users = self.store.users.all().await;
        let tasks = self.store.tasks.all().await;
        VisibilityResolver::new(viewer.clone(), &users).visible_tasks(&tasks)
    }

    /// Visible tasks narrowed by a composite filter, newest first
    pub async fn filtered_tasks(&self, viewer: &User, filter: &TaskFilter) -> Vec<Task> {
        let users = self.store.users.all().await;
        let tasks = self.store.tasks.all().await;
        let resolver = VisibilityResolver::new(viewer.clone(), &users);
        let visible = resolver.visible_tasks(&tasks);
        filter.apply(&resolver, &users, &visible)
    }

    /// Deletes tasks whose owner account no longer exists; admin only
    ///
    /// Unassigned tasks are kept: only a dangling owner reference counts
    /// as orphaned. Returns how many tasks were removed.
    pub async fn delete_orphan_tasks(&self, actor: &User) -> AppResult<usize> {
        require_admin(actor)?;

        let users = self.store.users.all().await;
        let known: std::collections::HashSet<Uuid> = users.iter().map(|u| u.id).collect();
        let orphans = self
            .store
            .tasks
            .query(|t| t.owner_id.is_some_and(|owner| !known.contains(&owner)))
            .await;

        let mut removed = 0;
        for task in orphans {
            if self.store.tasks.delete(task.id).await {
                removed += 1;
            }
        }
        if removed > 0 {
            self.logs
                .record(
                    actor,
                    LogAction::Delete,
                    "maintenance",
                    "System",
                    format!("Deleted {removed} orphaned tasks"),
                )
                .await;
        }
        Ok(removed)
    }

    /// Warns about attachment payloads past the configured thresholds
    fn warn_attachment_sizes(&self, attachments: &[Attachment]) {
        let mut total = 0u64;
        for att in attachments {
            total += att.size;
            if att.size > self.attachments.max_file_bytes {
                tracing::warn!(
                    name = %att.name,
                    size = att.size,
                    limit = self.attachments.max_file_bytes,
                    "attachment exceeds per-file size threshold"
                );
            }
        }
        if total > self.attachments.max_total_bytes {
            tracing::warn!(
                total,
                limit = self.attachments.max_total_bytes,
                "attachments exceed aggregate size threshold"
            );
        }
    }
}
