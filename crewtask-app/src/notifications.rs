//! Per-user persistent notifications
//!
//! One record per recipient. Fan-out helpers always skip the acting user:
//! sharing a task with yourself is silently a no-op, never a self-ping.
//! Consumers watch the collection-wide snapshot and narrow it to one user.

use crate::error::AppResult;
use crewtask_shared::models::{Notification, NotificationKind, NotificationPatch};
use crewtask_store::{Store, Subscription};
use std::sync::Arc;
use uuid::Uuid;

/// Emit and read notifications
#[derive(Clone)]
pub struct NotificationService {
    store: Arc<Store>,
}

impl NotificationService {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    /// Emits one notification to a single recipient
    pub async fn notify(
        &self,
        recipient: Uuid,
        title: impl Into<String>,
        message: impl Into<String>,
        kind: NotificationKind,
        link: Option<String>,
    ) -> Notification {
        let notification = Notification {
            id: Uuid::nil(),
            user_id: recipient,
            title: title.into(),
            message: message.into(),
            kind,
            read: false,
            created_at: chrono::Utc::now(),
            link,
        };
        self.store.notifications.create(notification).await
    }

    /// Fans one notification out to several recipients
    ///
    /// Recipients are deduplicated and the actor is always skipped. Returns
    /// how many notifications were emitted.
    pub async fn notify_many(
        &self,
        recipients: &[Uuid],
        actor_id: Uuid,
        title: &str,
        message: &str,
        kind: NotificationKind,
        link: Option<String>,
    ) -> usize {
        let mut seen = std::collections::HashSet::new();
        let mut sent = 0;
        for &recipient in recipients {
            if recipient == actor_id || !seen.insert(recipient) {
                continue;
            }
            self.notify(recipient, title, message, kind, link.clone())
                .await;
            sent += 1;
        }
        sent
    }

    /// All notifications for one user, newest first
    pub async fn for_user(&self, user_id: Uuid) -> Vec<Notification> {
        self.store
            .notifications
            .query(|n| n.user_id == user_id)
            .await
    }

    /// Number of unread notifications for one user
    pub async fn unread_count(&self, user_id: Uuid) -> usize {
        self.for_user(user_id)
            .await
            .iter()
            .filter(|n| !n.read)
            .count()
    }

    /// Marks one notification as read
    ///
    /// # Errors
    ///
    /// Returns a store error if the notification does not exist.
    pub async fn mark_read(&self, id: Uuid) -> AppResult<Notification> {
        let updated = self
            .store
            .notifications
            .update(id, NotificationPatch { read: Some(true) })
            .await?;
        Ok(updated)
    }

    /// Marks every unread notification of one user as read
    pub async fn mark_all_read(&self, user_id: Uuid) -> AppResult<usize> {
        let unread: Vec<_> = self
            .for_user(user_id)
            .await
            .into_iter()
            .filter(|n| !n.read)
            .collect();
        let count = unread.len();
        for notification in unread {
            self.store
                .notifications
                .update(notification.id, NotificationPatch { read: Some(true) })
                .await?;
        }
        Ok(count)
    }

    /// Live subscription over the whole notification collection
    ///
    /// Snapshots carry every user's notifications; callers narrow to one
    /// recipient per push, mirroring how every other derived view filters a
    /// full snapshot.
    pub fn subscribe(&self) -> Subscription<Notification> {
        self.store.notifications.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fan_out_skips_actor_and_duplicates() {
        let store = Store::new();
        let notifications = NotificationService::new(store.clone());
        let actor = Uuid::new_v4();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        let sent = notifications
            .notify_many(
                &[a, actor, b, a],
                actor,
                "New Shared Task",
                "A task was shared with you",
                NotificationKind::Info,
                None,
            )
            .await;

        assert_eq!(sent, 2);
        assert_eq!(notifications.for_user(actor).await.len(), 0);
        assert_eq!(notifications.for_user(a).await.len(), 1);
        assert_eq!(notifications.for_user(b).await.len(), 1);
    }

    #[tokio::test]
    async fn test_mark_read_flow() {
        let store = Store::new();
        let notifications = NotificationService::new(store.clone());
        let user = Uuid::new_v4();

        notifications
            .notify(user, "One", "first", NotificationKind::Info, None)
            .await;
        notifications
            .notify(user, "Two", "second", NotificationKind::Success, None)
            .await;
        assert_eq!(notifications.unread_count(user).await, 2);

        let first = notifications.for_user(user).await.remove(0);
        notifications.mark_read(first.id).await.unwrap();
        assert_eq!(notifications.unread_count(user).await, 1);

        assert_eq!(notifications.mark_all_read(user).await.unwrap(), 1);
        assert_eq!(notifications.unread_count(user).await, 0);
    }

    #[tokio::test]
    async fn test_subscription_sees_new_notifications() {
        let store = Store::new();
        let notifications = NotificationService::new(store.clone());
        let user = Uuid::new_v4();
        let mut sub = notifications.subscribe();

        notifications
            .notify(user, "Hi", "hello", NotificationKind::Info, Some("/task/x".into()))
            .await;
        assert!(sub.changed().await);

        let mine: Vec<_> = sub
            .current()
            .iter()
            .filter(|n| n.user_id == user)
            .cloned()
            .collect();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].link.as_deref(), Some("/task/x"));
    }
}
