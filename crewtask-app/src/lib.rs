//! CrewTask application services
//!
//! The domain layer on top of the document store: role-based visibility,
//! composable task filters, the task/project/team/user lifecycles, the
//! duty/routine catalogue with assignment expansion, the audit trail, and
//! per-user notifications.
//!
//! Construct a [`Services`] bundle per process and hand out clones; every
//! service is cheap to clone and shares the same store.
//!
//! # Example
//!
//! ```no_run
//! use crewtask_app::Services;
//! use crewtask_shared::config::Config;
//! use crewtask_store::Store;
//!
//! # async fn example() {
//! let store = Store::new();
//! let services = Services::new(store, Config::default());
//! let teams = services.teams.teams().await;
//! println!("{} teams", teams.len());
//! # }
//! ```

pub mod error;
pub mod filter;
pub mod logs;
pub mod notifications;
pub mod projects;
pub mod routines;
pub mod tasks;
pub mod teams;
pub mod users;
pub mod visibility;

pub use error::{AppError, AppResult};
pub use filter::{TaskFilter, ViewScope};
pub use logs::LogService;
pub use notifications::NotificationService;
pub use projects::{NewProject, ProjectService};
pub use routines::{RoutineAssignment, RoutineService};
pub use tasks::{NewTask, TaskService};
pub use teams::TeamService;
pub use users::{ProfileUpdate, UserService};
pub use visibility::{managed_member_ids, VisibilityResolver};

use crewtask_shared::config::Config;
use crewtask_store::Store;
use std::sync::Arc;

/// One bundle of every application service, sharing one store
#[derive(Clone)]
pub struct Services {
    pub tasks: TaskService,
    pub projects: ProjectService,
    pub teams: TeamService,
    pub users: UserService,
    pub routines: RoutineService,
    pub logs: LogService,
    pub notifications: NotificationService,
}

impl Services {
    /// Wires every service against `store` with the given configuration
    pub fn new(store: Arc<Store>, config: Config) -> Self {
        let logs = LogService::new(store.clone(), config.logs);
        let notifications = NotificationService::new(store.clone());

        Services {
            tasks: TaskService::new(
                store.clone(),
                logs.clone(),
                notifications.clone(),
                config.attachments,
            ),
            projects: ProjectService::new(store.clone(), logs.clone(), notifications.clone()),
            teams: TeamService::new(store.clone(), logs.clone()),
            users: UserService::new(store.clone(), logs.clone()),
            routines: RoutineService::new(store, logs.clone(), notifications.clone()),
            logs,
            notifications,
        }
    }
}
