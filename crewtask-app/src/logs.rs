//! Activity log recording and role-scoped retrieval
//!
//! Writes are fire-and-forget: a log append can never fail the operation
//! that triggered it. Reads go through a bounded recent window (admins get
//! their own window size) and are then role-filtered in memory, so entries
//! older than the window are unreachable for non-admin roles even when
//! they would pass the role filter.

use crate::error::{require_admin, AppResult};
use crewtask_shared::config::LogConfig;
use crewtask_shared::models::{LogAction, LogEntry, User};
use crewtask_store::Store;
use std::sync::Arc;

/// Append and read the audit trail
#[derive(Clone)]
pub struct LogService {
    store: Arc<Store>,
    config: LogConfig,
}

impl LogService {
    pub fn new(store: Arc<Store>, config: LogConfig) -> Self {
        Self { store, config }
    }

    /// Appends one audit entry authored by `actor`
    ///
    /// The entry snapshots the author's name and primary team at write
    /// time; later renames or team moves do not rewrite history.
    pub async fn record(
        &self,
        actor: &User,
        action: LogAction,
        target_id: impl Into<String>,
        target_title: impl Into<String>,
        details: impl Into<String>,
    ) {
        let mut author = actor.clone();
        author.normalize();

        let entry = LogEntry {
            id: uuid::Uuid::nil(),
            action,
            user_id: author.id,
            username: author.username.clone(),
            team_id: author.team_ids.first().copied(),
            target_id: target_id.into(),
            target_title: target_title.into(),
            details: details.into(),
            timestamp: chrono::Utc::now(),
        };
        let stored = self.store.logs.create(entry).await;
        tracing::debug!(action = ?action, entry = %stored.id, "log entry recorded");
    }

    /// Recent entries the viewer is allowed to see, newest first
    ///
    /// Admins read the full admin window. Everyone else reads the member
    /// window and then keeps only entries they authored, plus, for
    /// effective managers, entries tagged with a team they manage.
    pub async fn recent_for(&self, viewer: &User) -> Vec<LogEntry> {
        let mut entries = self.store.logs.all().await;

        if viewer.is_admin() {
            entries.truncate(self.config.admin_window);
            return entries;
        }

        entries.truncate(self.config.member_window);
        if viewer.is_effective_manager() {
            let managed = viewer.managed_team_ids();
            entries.retain(|e| {
                e.user_id == viewer.id || e.team_id.is_some_and(|t| managed.contains(&t))
            });
        } else {
            entries.retain(|e| e.user_id == viewer.id);
        }
        entries
    }

    /// Clears the log in one bounded sweep; admin only
    ///
    /// At most `clear_batch` entries are removed. A trail larger than the
    /// batch keeps its oldest entries and needs another sweep.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Forbidden`](crate::AppError::Forbidden) for
    /// non-admin actors.
    pub async fn clear_all(&self, actor: &User) -> AppResult<usize> {
        require_admin(actor)?;

        let entries = self.store.logs.all().await;
        let batch: Vec<_> = entries
            .into_iter()
            .take(self.config.clear_batch)
            .collect();
        let mut removed = 0;
        for entry in batch {
            if self.store.logs.delete(entry.id).await {
                removed += 1;
            }
        }
        tracing::info!(removed, actor = %actor.username, "activity log cleared");
        Ok(removed)
    }
}
