//! Session-holding auth service
//!
//! Holds the single current session (the original system was a one-session
//! browser client) and publishes every change on a watch channel so
//! dependent state can react to sign-in, sign-out, and forced sign-out of a
//! soft-deleted account.
//!
//! # Registration and pending invites
//!
//! An admin can invite a user by creating a pending placeholder record.
//! When someone registers with the invited email, the new account adopts
//! the placeholder's role and team configuration, the placeholder is
//! deleted, and any task shares pointing at the placeholder id are migrated
//! to the real account id. The very first account ever registered becomes
//! an admin.
//!
//! # Example
//!
//! ```no_run
//! use crewtask_store::auth::AuthService;
//! use crewtask_store::Store;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Store::new();
//! let auth = AuthService::new(store);
//!
//! let user = auth.login("mario", "secret1").await?;
//! println!("signed in as {}", user.username);
//!
//! auth.logout();
//! # Ok(())
//! # }
//! ```

use chrono::Utc;
use rand::rngs::OsRng;
use rand::RngCore;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::watch;
use uuid::Uuid;
use validator::Validate;

use crate::auth::password::{hash_password, verify_password, PasswordError, MIN_PASSWORD_LEN};
use crate::collection::StoreError;
use crate::store::Store;
use crewtask_shared::models::{
    CreateUserRequest, LogAction, LogEntry, RegisterRequest, Role, TaskPatch, User, UserPatch,
};

/// Error type for authentication operations
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Input failed validation before any store call
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Unknown identifier or wrong password
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Login disabled by an administrator
    #[error("Account disabled by an administrator")]
    AccountDisabled,

    /// Account was soft-deleted
    #[error("Account deleted. Contact an administrator")]
    AccountDeleted,

    /// Email already belongs to a registered account
    #[error("A user with this email already exists")]
    EmailTaken,

    /// Operation requires a live session
    #[error("Not authenticated")]
    NotAuthenticated,

    /// Password below the minimum length
    #[error("Password must be at least {MIN_PASSWORD_LEN} characters")]
    PasswordTooShort,

    /// Caller lacks the required role
    #[error("Permission denied")]
    Forbidden,

    /// Password hashing failure
    #[error(transparent)]
    Password(#[from] PasswordError),

    /// Store failure
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// An authenticated session
#[derive(Debug, Clone)]
pub struct Session {
    /// Opaque session token
    pub token: String,

    /// Signed-in user id
    pub user_id: Uuid,
}

/// Auth service holding the current session
pub struct AuthService {
    store: Arc<Store>,
    session_tx: watch::Sender<Option<Session>>,
}

impl AuthService {
    /// Creates an auth service with no active session
    pub fn new(store: Arc<Store>) -> Self {
        let (session_tx, _) = watch::channel(None);
        AuthService { store, session_tx }
    }

    /// Self-service registration
    ///
    /// Adopts a matching pending invite (role, teams, migrated shares) and
    /// makes the very first account an admin. The new account is signed in.
    ///
    /// # Errors
    ///
    /// - [`AuthError::Validation`] for malformed input
    /// - [`AuthError::AccountDeleted`] if the email belongs to a
    ///   soft-deleted account
    /// - [`AuthError::EmailTaken`] if the email is already registered
    pub async fn register(&self, request: RegisterRequest) -> Result<User, AuthError> {
        request
            .validate()
            .map_err(|e| AuthError::Validation(flatten_validation(&e)))?;

        let existing = self
            .store
            .users
            .query(|u| u.email == request.email)
            .await
            .into_iter()
            .next();

        let pending = match existing {
            Some(user) if user.is_deleted => return Err(AuthError::AccountDeleted),
            Some(user) if !user.is_pending => return Err(AuthError::EmailTaken),
            Some(user) => Some(user),
            None => None,
        };

        let first_account = self.store.users.count().await == 0;

        let (role, team_ids, team_roles) = match &pending {
            Some(invite) => (invite.role, invite.team_ids.clone(), invite.team_roles.clone()),
            None if first_account => (Role::Admin, Vec::new(), HashMap::new()),
            None => (Role::User, Vec::new(), HashMap::new()),
        };

        let password_hash = hash_password(&request.password)?;

        let user = self
            .store
            .users
            .create(User {
                id: Uuid::nil(),
                username: request.username,
                email: request.email,
                role,
                password_hash,
                team_id: None,
                team_ids,
                team_roles,
                is_pending: false,
                is_disabled: false,
                is_deleted: false,
                photo_url: None,
                created_at: Utc::now(),
            })
            .await;

        if let Some(invite) = pending {
            self.migrate_shares(invite.id, user.id).await;
            self.store.users.delete(invite.id).await;
        }

        self.append_log(
            &user,
            LogAction::Register,
            user.id.to_string(),
            user.username.clone(),
            "New user registration".to_string(),
        )
        .await;

        self.start_session(&user);
        Ok(user)
    }

    /// Email-or-username sign-in
    ///
    /// Disabled and soft-deleted accounts are refused before the password
    /// is checked.
    pub async fn login(&self, identifier: &str, password: &str) -> Result<User, AuthError> {
        let identifier = identifier.to_string();
        let user = if identifier.contains('@') {
            self.store.users.query(|u| u.email == identifier).await
        } else {
            self.store.users.query(|u| u.username == identifier).await
        }
        .into_iter()
        .next()
        .ok_or(AuthError::InvalidCredentials)?;

        if user.is_disabled {
            return Err(AuthError::AccountDisabled);
        }
        if user.is_deleted {
            return Err(AuthError::AccountDeleted);
        }
        if user.is_pending {
            // Invited but never registered: no credentials exist yet
            return Err(AuthError::InvalidCredentials);
        }

        if !verify_password(password, &user.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        self.start_session(&user);
        tracing::info!(user = %user.id, "signed in");
        Ok(user)
    }

    /// Ends the current session
    pub fn logout(&self) {
        self.session_tx.send_replace(None);
    }

    /// Resolves the currently signed-in user
    ///
    /// Re-reads the user record so role and team changes are always fresh.
    /// A session whose account no longer exists or has been soft-deleted is
    /// force-signed-out and resolves to `None`.
    pub async fn current_user(&self) -> Option<User> {
        let session = self.session_tx.borrow().clone()?;
        match self.store.users.get(session.user_id).await {
            Some(user) if !user.is_deleted => Some(user),
            _ => {
                self.logout();
                None
            }
        }
    }

    /// Self-service password update; requires a live session
    pub async fn update_password(&self, new_password: &str) -> Result<(), AuthError> {
        if new_password.len() < MIN_PASSWORD_LEN {
            return Err(AuthError::PasswordTooShort);
        }
        let user = self
            .current_user()
            .await
            .ok_or(AuthError::NotAuthenticated)?;

        let password_hash = hash_password(new_password)?;
        self.store
            .users
            .update(
                user.id,
                UserPatch {
                    password_hash: Some(password_hash),
                    ..UserPatch::default()
                },
            )
            .await?;
        Ok(())
    }

    /// Administrative password reset
    ///
    /// Triggers an out-of-band reset email; never sets a password directly.
    /// The send itself is external; this records the audit entry.
    pub async fn admin_reset_password(&self, actor: &User, email: &str) -> Result<(), AuthError> {
        if !actor.is_admin() {
            return Err(AuthError::Forbidden);
        }
        tracing::info!(%email, "password reset email queued");
        self.append_log(
            actor,
            LogAction::PasswordChange,
            email.to_string(),
            "Email".to_string(),
            "Password reset email sent".to_string(),
        )
        .await;
        Ok(())
    }

    /// Direct account creation by an admin
    ///
    /// The creating admin's own session is untouched.
    pub async fn create_user(
        &self,
        actor: &User,
        request: CreateUserRequest,
    ) -> Result<User, AuthError> {
        if !actor.is_admin() {
            return Err(AuthError::Forbidden);
        }
        request
            .validate()
            .map_err(|e| AuthError::Validation(flatten_validation(&e)))?;

        let email = request.email.clone();
        let taken = !self.store.users.query(|u| u.email == email).await.is_empty();
        if taken {
            return Err(AuthError::EmailTaken);
        }

        let mut team_ids = Vec::new();
        let mut team_roles = HashMap::new();
        if let Some(team_id) = request.team_id {
            team_ids.push(team_id);
            team_roles.insert(team_id, Role::User);
        }

        let password_hash = hash_password(&request.password)?;
        let user = self
            .store
            .users
            .create(User {
                id: Uuid::nil(),
                username: request.username,
                email: request.email,
                role: request.role,
                password_hash,
                team_id: None,
                team_ids,
                team_roles,
                is_pending: false,
                is_disabled: false,
                is_deleted: false,
                photo_url: None,
                created_at: Utc::now(),
            })
            .await;

        self.append_log(
            actor,
            LogAction::Register,
            user.id.to_string(),
            user.username.clone(),
            format!("Created user {} ({:?})", user.username, user.role),
        )
        .await;

        Ok(user)
    }

    /// Live "current session changed" subscription
    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.session_tx.subscribe()
    }

    fn start_session(&self, user: &User) {
        self.session_tx.send_replace(Some(Session {
            token: generate_token(),
            user_id: user.id,
        }));
    }

    /// Rewrites task shares pointing at a pending placeholder id
    async fn migrate_shares(&self, from: Uuid, to: Uuid) {
        let shared = self.store.tasks.query(|t| t.is_shared_with(from)).await;
        for task in shared {
            let mut shared_with: Vec<Uuid> =
                task.shared_with.into_iter().filter(|id| *id != from).collect();
            shared_with.push(to);
            if let Err(e) = self
                .store
                .tasks
                .update(
                    task.id,
                    TaskPatch {
                        shared_with: Some(shared_with),
                        ..TaskPatch::default()
                    },
                )
                .await
            {
                tracing::warn!(task = %task.id, error = %e, "share migration skipped a task");
            }
        }
    }

    /// Appends an audit entry; failures are logged and swallowed
    async fn append_log(
        &self,
        actor: &User,
        action: LogAction,
        target_id: String,
        target_title: String,
        details: String,
    ) {
        let mut actor = actor.clone();
        actor.normalize();
        self.store
            .logs
            .create(LogEntry {
                id: Uuid::nil(),
                action,
                user_id: actor.id,
                username: actor.username,
                team_id: actor.team_ids.first().copied(),
                target_id,
                target_title,
                details,
                timestamp: Utc::now(),
            })
            .await;
    }
}

/// Generates an opaque hex session token
fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Flattens validator output into one human-readable line
fn flatten_validation(errors: &validator::ValidationErrors) -> String {
    let mut parts: Vec<String> = Vec::new();
    for (field, errs) in errors.field_errors() {
        for err in errs {
            match &err.message {
                Some(msg) => parts.push(msg.to_string()),
                None => parts.push(format!("{} is invalid", field)),
            }
        }
    }
    parts.join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register_request(username: &str, email: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: "secret1".to_string(),
        }
    }

    #[tokio::test]
    async fn test_first_account_becomes_admin() {
        let store = Store::new();
        let auth = AuthService::new(store.clone());

        let first = auth
            .register(register_request("mario", "mario@example.com"))
            .await
            .unwrap();
        assert_eq!(first.role, Role::Admin);

        let second = auth
            .register(register_request("luigi", "luigi@example.com"))
            .await
            .unwrap();
        assert_eq!(second.role, Role::User);
    }

    #[tokio::test]
    async fn test_register_rejects_taken_and_deleted_emails() {
        let store = Store::new();
        let auth = AuthService::new(store.clone());

        auth.register(register_request("mario", "mario@example.com"))
            .await
            .unwrap();

        let err = auth
            .register(register_request("impostor", "mario@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::EmailTaken));

        let deleted = store.users.query(|u| u.username == "mario").await;
        store
            .users
            .update(
                deleted[0].id,
                UserPatch {
                    is_deleted: Some(true),
                    ..UserPatch::default()
                },
            )
            .await
            .unwrap();

        let err = auth
            .register(register_request("mario2", "mario@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::AccountDeleted));
    }

    #[tokio::test]
    async fn test_register_validation_precedes_store_calls() {
        let store = Store::new();
        let auth = AuthService::new(store.clone());

        let err = auth
            .register(RegisterRequest {
                username: "mario".to_string(),
                email: "mario@example.com".to_string(),
                password: "abc".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));
        assert_eq!(store.users.count().await, 0);
    }

    #[tokio::test]
    async fn test_login_by_username_and_email() {
        let store = Store::new();
        let auth = AuthService::new(store.clone());
        auth.register(register_request("mario", "mario@example.com"))
            .await
            .unwrap();
        auth.logout();

        assert!(auth.login("mario", "secret1").await.is_ok());
        assert!(auth.login("mario@example.com", "secret1").await.is_ok());

        let err = auth.login("mario", "wrong-pass").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_login_refuses_disabled_and_deleted() {
        let store = Store::new();
        let auth = AuthService::new(store.clone());
        let user = auth
            .register(register_request("mario", "mario@example.com"))
            .await
            .unwrap();
        auth.logout();

        store
            .users
            .update(
                user.id,
                UserPatch {
                    is_disabled: Some(true),
                    ..UserPatch::default()
                },
            )
            .await
            .unwrap();
        let err = auth.login("mario", "secret1").await.unwrap_err();
        assert!(matches!(err, AuthError::AccountDisabled));

        store
            .users
            .update(
                user.id,
                UserPatch {
                    is_disabled: Some(false),
                    is_deleted: Some(true),
                    ..UserPatch::default()
                },
            )
            .await
            .unwrap();
        let err = auth.login("mario", "secret1").await.unwrap_err();
        assert!(matches!(err, AuthError::AccountDeleted));
    }

    #[tokio::test]
    async fn test_soft_delete_forces_sign_out() {
        let store = Store::new();
        let auth = AuthService::new(store.clone());
        let user = auth
            .register(register_request("mario", "mario@example.com"))
            .await
            .unwrap();
        assert!(auth.current_user().await.is_some());

        store
            .users
            .update(
                user.id,
                UserPatch {
                    is_deleted: Some(true),
                    ..UserPatch::default()
                },
            )
            .await
            .unwrap();

        assert!(auth.current_user().await.is_none());
        assert!(auth.subscribe().borrow().is_none());
    }

    #[tokio::test]
    async fn test_session_subscription_sees_changes() {
        let store = Store::new();
        let auth = AuthService::new(store.clone());
        let mut rx = auth.subscribe();
        assert!(rx.borrow().is_none());

        auth.register(register_request("mario", "mario@example.com"))
            .await
            .unwrap();
        assert!(rx.changed().await.is_ok());
        assert!(rx.borrow_and_update().is_some());

        auth.logout();
        assert!(rx.changed().await.is_ok());
        assert!(rx.borrow_and_update().is_none());
    }

    #[tokio::test]
    async fn test_update_password_requires_session() {
        let store = Store::new();
        let auth = AuthService::new(store.clone());
        auth.register(register_request("mario", "mario@example.com"))
            .await
            .unwrap();
        auth.logout();

        let err = auth.update_password("newsecret").await.unwrap_err();
        assert!(matches!(err, AuthError::NotAuthenticated));

        auth.login("mario", "secret1").await.unwrap();
        let err = auth.update_password("short").await.unwrap_err();
        assert!(matches!(err, AuthError::PasswordTooShort));

        auth.update_password("newsecret").await.unwrap();
        auth.logout();
        assert!(auth.login("mario", "newsecret").await.is_ok());
    }
}
