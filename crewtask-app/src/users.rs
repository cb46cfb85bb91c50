//! User administration
//!
//! Admin-side account management: inviting placeholders that a later
//! self-registration adopts, profile edits, the disable switch, and the
//! two-stage delete (trash, then permanent removal). Self-service flows
//! (registration, login, password changes) live in the auth collaborator.

use crate::error::{require_admin, AppError, AppResult};
use crate::logs::LogService;
use crewtask_shared::models::{LogAction, Role, User, UserPatch};
use crewtask_store::Store;
use std::sync::Arc;
use uuid::Uuid;

/// Maximum hits returned by the user search box
const SEARCH_LIMIT: usize = 5;

/// Admin profile edit
///
/// `team_id` resets the membership to that single team, mirroring the
/// one-team form the admin panel exposes.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub username: Option<String>,
    pub role: Option<Role>,
    pub team_id: Option<Uuid>,
}

/// User administration operations
#[derive(Clone)]
pub struct UserService {
    store: Arc<Store>,
    logs: LogService,
}

impl UserService {
    pub fn new(store: Arc<Store>, logs: LogService) -> Self {
        Self { store, logs }
    }

    /// All user records, newest first, trashed accounts included
    pub async fn all_users(&self) -> Vec<User> {
        self.store.users.all().await
    }

    /// Case-insensitive search over username and email
    ///
    /// Trashed accounts are excluded and at most five hits are returned,
    /// matching the share-picker autocomplete.
    pub async fn search_users(&self, term: &str) -> Vec<User> {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return Vec::new();
        }
        let mut hits = self
            .store
            .users
            .query(|u| {
                u.is_active()
                    && (u.username.to_lowercase().contains(&term)
                        || u.email.to_lowercase().contains(&term))
            })
            .await;
        hits.truncate(SEARCH_LIMIT);
        hits
    }

    /// Finds one active user by exact username
    pub async fn find_by_username(&self, username: &str) -> Option<User> {
        self.store
            .users
            .query(|u| u.is_active() && u.username == username)
            .await
            .into_iter()
            .next()
    }

    /// Creates a pending placeholder account; admin only
    ///
    /// The placeholder cannot log in. When someone later self-registers
    /// with the same email, the registration adopts the placeholder's role
    /// and team configuration and any shares pointing at it.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the email is already in use by
    /// a live account.
    pub async fn invite_user(
        &self,
        actor: &User,
        username: &str,
        email: &str,
        role: Role,
        team_id: Option<Uuid>,
    ) -> AppResult<User> {
        require_admin(actor)?;
        let email = email.trim().to_lowercase();
        let taken = self
            .store
            .users
            .query(|u| !u.is_deleted && u.email == email)
            .await;
        if !taken.is_empty() {
            return Err(AppError::Validation(
                "Email is already registered".to_string(),
            ));
        }

        let placeholder = User {
            id: Uuid::nil(),
            username: username.trim().to_string(),
            email: email.clone(),
            role,
            password_hash: String::new(),
            team_id: None,
            team_ids: team_id.into_iter().collect(),
            team_roles: Default::default(),
            is_pending: true,
            is_disabled: false,
            is_deleted: false,
            photo_url: None,
            created_at: chrono::Utc::now(),
        };
        let stored = self.store.users.create(placeholder).await;

        self.logs
            .record(
                actor,
                LogAction::Create,
                email,
                stored.username.clone(),
                "User invited",
            )
            .await;
        Ok(stored)
    }

    /// Edits a user's profile; admin only
    pub async fn update_profile(
        &self,
        actor: &User,
        user_id: Uuid,
        update: ProfileUpdate,
    ) -> AppResult<User> {
        require_admin(actor)?;

        let updated = self
            .store
            .users
            .update(
                user_id,
                UserPatch {
                    username: update.username,
                    role: update.role,
                    team_ids: update.team_id.map(|tid| vec![tid]),
                    ..Default::default()
                },
            )
            .await?;
        self.logs
            .record(
                actor,
                LogAction::Update,
                user_id.to_string(),
                updated.username.clone(),
                "User profile updated",
            )
            .await;
        Ok(updated)
    }

    /// Flips the login switch; admin only
    ///
    /// A disabled account keeps all its data and stays in every visibility
    /// computation; it just cannot sign in.
    pub async fn set_disabled(&self, actor: &User, user_id: Uuid, disabled: bool) -> AppResult<User> {
        require_admin(actor)?;

        let updated = self
            .store
            .users
            .update(
                user_id,
                UserPatch {
                    is_disabled: Some(disabled),
                    ..Default::default()
                },
            )
            .await?;
        let details = if disabled {
            "Access disabled (standby)"
        } else {
            "Access re-enabled"
        };
        self.logs
            .record(
                actor,
                LogAction::Update,
                user_id.to_string(),
                updated.username.clone(),
                details,
            )
            .await;
        Ok(updated)
    }

    /// Moves an account to the trash; admin only
    ///
    /// The account drops out of login, search, and every visibility and
    /// assignment computation, but its records stay for the audit trail.
    pub async fn soft_delete_user(&self, actor: &User, user_id: Uuid) -> AppResult<User> {
        require_admin(actor)?;

        let updated = self
            .store
            .users
            .update(
                user_id,
                UserPatch {
                    is_deleted: Some(true),
                    ..Default::default()
                },
            )
            .await?;
        self.logs
            .record(
                actor,
                LogAction::Delete,
                user_id.to_string(),
                updated.username.clone(),
                "User moved to trash",
            )
            .await;
        Ok(updated)
    }

    /// Restores a trashed account; admin only
    pub async fn restore_user(&self, actor: &User, user_id: Uuid) -> AppResult<User> {
        require_admin(actor)?;

        let updated = self
            .store
            .users
            .update(
                user_id,
                UserPatch {
                    is_deleted: Some(false),
                    ..Default::default()
                },
            )
            .await?;
        self.logs
            .record(
                actor,
                LogAction::Update,
                user_id.to_string(),
                updated.username.clone(),
                "User restored from trash",
            )
            .await;
        Ok(updated)
    }

    /// Permanently removes an account record; admin only
    ///
    /// Tasks the account owned become orphans, cleaned up separately by
    /// the maintenance sweep.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the account does not exist.
    pub async fn hard_delete_user(&self, actor: &User, user_id: Uuid) -> AppResult<()> {
        require_admin(actor)?;
        let user = self
            .store
            .users
            .get(user_id)
            .await
            .ok_or_else(|| AppError::NotFound("user".to_string()))?;
        self.store.users.delete(user_id).await;

        self.logs
            .record(
                actor,
                LogAction::Delete,
                user_id.to_string(),
                user.username,
                "User permanently deleted",
            )
            .await;
        Ok(())
    }
}
