//! The eight named collections bundled together
//!
//! A [`Store`] is the whole backend surface: one collection per record
//! type, individually subscribable. Cloning the `Arc` shares the same
//! underlying state across services.

use std::sync::Arc;

use crate::collection::Collection;
use crewtask_shared::models::{
    Duty, LogEntry, Notification, Project, Routine, Task, Team, User,
};

/// The CrewTask document store
pub struct Store {
    pub users: Collection<User>,
    pub teams: Collection<Team>,
    pub tasks: Collection<Task>,
    pub projects: Collection<Project>,
    pub duties: Collection<Duty>,
    pub routines: Collection<Routine>,
    pub logs: Collection<LogEntry>,
    pub notifications: Collection<Notification>,
}

impl Store {
    /// Creates an empty store
    pub fn new() -> Arc<Self> {
        Arc::new(Store {
            users: Collection::new("users"),
            teams: Collection::new("teams"),
            tasks: Collection::new("tasks"),
            projects: Collection::new("projects"),
            duties: Collection::new("duties"),
            routines: Collection::new("routines"),
            logs: Collection::new("logs"),
            notifications: Collection::new("notifications"),
        })
    }
}
