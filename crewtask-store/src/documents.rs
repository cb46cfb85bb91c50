//! [`Document`] implementations for the domain records
//!
//! Each record wires its id and creation timestamp into the generic
//! collection machinery and defines how its patch type applies. Records
//! without an update surface (duties, routines, log entries) use `()` as
//! their patch: the store can still hold and order them, but nothing can
//! partially rewrite them.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::collection::Document;
use crewtask_shared::models::{
    Duty, LogEntry, Notification, NotificationPatch, Project, ProjectPatch, Routine, Task,
    TaskPatch, Team, TeamPatch, User, UserPatch,
};

impl Document for User {
    type Patch = UserPatch;

    fn id(&self) -> Uuid {
        self.id
    }
    fn set_id(&mut self, id: Uuid) {
        self.id = id;
    }
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
    fn set_created_at(&mut self, at: DateTime<Utc>) {
        self.created_at = at;
    }

    fn apply_patch(&mut self, patch: UserPatch) {
        if let Some(username) = patch.username {
            self.username = username;
        }
        if let Some(role) = patch.role {
            self.role = role;
        }
        if let Some(password_hash) = patch.password_hash {
            self.password_hash = password_hash;
        }
        if let Some(team_ids) = patch.team_ids {
            self.team_ids = team_ids;
        }
        if let Some(team_roles) = patch.team_roles {
            self.team_roles = team_roles;
        }
        if let Some(is_pending) = patch.is_pending {
            self.is_pending = is_pending;
        }
        if let Some(is_disabled) = patch.is_disabled {
            self.is_disabled = is_disabled;
        }
        if let Some(is_deleted) = patch.is_deleted {
            self.is_deleted = is_deleted;
        }
        if let Some(photo_url) = patch.photo_url {
            self.photo_url = Some(photo_url);
        }
    }

    fn normalize(&mut self) {
        User::normalize(self);
    }
}

impl Document for Team {
    type Patch = TeamPatch;

    fn id(&self) -> Uuid {
        self.id
    }
    fn set_id(&mut self, id: Uuid) {
        self.id = id;
    }
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
    fn set_created_at(&mut self, at: DateTime<Utc>) {
        self.created_at = at;
    }

    fn apply_patch(&mut self, patch: TeamPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
    }
}

impl Document for Task {
    type Patch = TaskPatch;

    fn id(&self) -> Uuid {
        self.id
    }
    fn set_id(&mut self, id: Uuid) {
        self.id = id;
    }
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
    fn set_created_at(&mut self, at: DateTime<Utc>) {
        self.created_at = at;
    }

    fn apply_patch(&mut self, patch: TaskPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(tags) = patch.tags {
            self.tags = tags;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(priority) = patch.priority {
            self.priority = Some(priority);
        }
        if let Some(due_date) = patch.due_date {
            self.due_date = Some(due_date);
        }
        if let Some(owner_id) = patch.owner_id {
            self.owner_id = Some(owner_id);
        }
        if let Some(owner_username) = patch.owner_username {
            self.owner_username = Some(owner_username);
        }
        if let Some(shared_with) = patch.shared_with {
            self.shared_with = shared_with;
        }
        if let Some(attachments) = patch.attachments {
            self.attachments = attachments;
        }
        if let Some(project_ids) = patch.project_ids {
            self.project_ids = project_ids;
        }
        if let Some(dependency_ids) = patch.dependency_ids {
            self.dependency_ids = dependency_ids;
        }
    }

    fn normalize(&mut self) {
        Task::normalize(self);
    }
}

impl Document for Project {
    type Patch = ProjectPatch;

    fn id(&self) -> Uuid {
        self.id
    }
    fn set_id(&mut self, id: Uuid) {
        self.id = id;
    }
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
    fn set_created_at(&mut self, at: DateTime<Utc>) {
        self.created_at = at;
    }

    fn apply_patch(&mut self, patch: ProjectPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(shared_with) = patch.shared_with {
            self.shared_with = shared_with;
        }
        if let Some(team_ids) = patch.team_ids {
            self.team_ids = team_ids;
        }
        if let Some(responsible_ids) = patch.responsible_ids {
            self.responsible_ids = responsible_ids;
        }
        if let Some(priority) = patch.priority {
            self.priority = Some(priority);
        }
        if let Some(due_date) = patch.due_date {
            self.due_date = Some(due_date);
        }
        if let Some(parent_project_id) = patch.parent_project_id {
            self.parent_project_id = Some(parent_project_id);
        }
    }
}

impl Document for Duty {
    type Patch = ();

    fn id(&self) -> Uuid {
        self.id
    }
    fn set_id(&mut self, id: Uuid) {
        self.id = id;
    }
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
    fn set_created_at(&mut self, at: DateTime<Utc>) {
        self.created_at = at;
    }

    fn apply_patch(&mut self, _patch: ()) {}
}

impl Document for Routine {
    type Patch = ();

    fn id(&self) -> Uuid {
        self.id
    }
    fn set_id(&mut self, id: Uuid) {
        self.id = id;
    }
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
    fn set_created_at(&mut self, at: DateTime<Utc>) {
        self.created_at = at;
    }

    fn apply_patch(&mut self, _patch: ()) {}
}

impl Document for LogEntry {
    type Patch = ();

    fn id(&self) -> Uuid {
        self.id
    }
    fn set_id(&mut self, id: Uuid) {
        self.id = id;
    }
    fn created_at(&self) -> DateTime<Utc> {
        self.timestamp
    }
    fn set_created_at(&mut self, at: DateTime<Utc>) {
        self.timestamp = at;
    }

    fn apply_patch(&mut self, _patch: ()) {}
}

impl Document for Notification {
    type Patch = NotificationPatch;

    fn id(&self) -> Uuid {
        self.id
    }
    fn set_id(&mut self, id: Uuid) {
        self.id = id;
    }
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
    fn set_created_at(&mut self, at: DateTime<Utc>) {
        self.created_at = at;
    }

    fn apply_patch(&mut self, patch: NotificationPatch) {
        if let Some(read) = patch.read {
            self.read = read;
        }
    }
}
