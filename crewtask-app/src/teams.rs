//! Team administration
//!
//! Teams are pure groupings: membership and per-team roles live on the
//! user records, so every team mutation here is really a fan-out over
//! users. The fan-out is sequential and unrolled: a failure partway
//! leaves earlier members already updated, matching the per-document
//! writes of the original backend.
//!
//! All mutations are admin-only.

use crate::error::{require_admin, AppError, AppResult};
use crate::logs::LogService;
use crewtask_shared::models::{LogAction, Role, Team, TeamPatch, User, UserPatch};
use crewtask_store::Store;
use std::sync::Arc;
use uuid::Uuid;

/// Team administration operations
#[derive(Clone)]
pub struct TeamService {
    store: Arc<Store>,
    logs: LogService,
}

impl TeamService {
    pub fn new(store: Arc<Store>, logs: LogService) -> Self {
        Self { store, logs }
    }

    /// All teams, newest first
    pub async fn teams(&self) -> Vec<Team> {
        self.store.teams.all().await
    }

    /// Creates a team
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Forbidden`] for non-admin actors and
    /// [`AppError::Validation`] for a blank name.
    pub async fn create_team(&self, actor: &User, name: &str) -> AppResult<Team> {
        require_admin(actor)?;
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("Team name is required".to_string()));
        }

        let team = Team {
            id: Uuid::nil(),
            name: name.to_string(),
            created_at: chrono::Utc::now(),
        };
        let stored = self.store.teams.create(team).await;

        self.logs
            .record(
                actor,
                LogAction::TeamCreate,
                stored.id.to_string(),
                stored.name.clone(),
                "Team created",
            )
            .await;
        Ok(stored)
    }

    /// Renames a team
    pub async fn rename_team(&self, actor: &User, team_id: Uuid, name: &str) -> AppResult<Team> {
        require_admin(actor)?;
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("Team name is required".to_string()));
        }

        let updated = self
            .store
            .teams
            .update(
                team_id,
                TeamPatch {
                    name: Some(name.to_string()),
                },
            )
            .await?;
        self.logs
            .record(
                actor,
                LogAction::TeamUpdate,
                team_id.to_string(),
                updated.name.clone(),
                "Team renamed",
            )
            .await;
        Ok(updated)
    }

    /// Deletes a team and strips its membership from every user
    ///
    /// The membership fan-out runs after the team record is gone; a crash
    /// in between leaves users pointing at a team that no longer resolves,
    /// which every consumer already tolerates.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the team does not exist.
    pub async fn delete_team(&self, actor: &User, team_id: Uuid) -> AppResult<()> {
        require_admin(actor)?;
        let team = self
            .store
            .teams
            .get(team_id)
            .await
            .ok_or_else(|| AppError::NotFound("team".to_string()))?;
        self.store.teams.delete(team_id).await;

        let members = self
            .store
            .users
            .query(|u| u.team_ids.contains(&team_id))
            .await;
        for member in members {
            let team_ids: Vec<Uuid> = member
                .team_ids
                .iter()
                .copied()
                .filter(|tid| *tid != team_id)
                .collect();
            let mut team_roles = member.team_roles.clone();
            team_roles.remove(&team_id);
            self.store
                .users
                .update(
                    member.id,
                    UserPatch {
                        team_ids: Some(team_ids),
                        team_roles: Some(team_roles),
                        ..Default::default()
                    },
                )
                .await?;
        }

        self.logs
            .record(
                actor,
                LogAction::TeamDelete,
                team_id.to_string(),
                team.name,
                "Team deleted",
            )
            .await;
        Ok(())
    }

    /// Adds a user to a team; already-members are a no-op
    pub async fn add_member(&self, actor: &User, team_id: Uuid, user_id: Uuid) -> AppResult<()> {
        require_admin(actor)?;
        let team = self
            .store
            .teams
            .get(team_id)
            .await
            .ok_or_else(|| AppError::NotFound("team".to_string()))?;
        let member = self
            .store
            .users
            .get(user_id)
            .await
            .ok_or_else(|| AppError::NotFound("user".to_string()))?;
        if member.team_ids.contains(&team_id) {
            return Ok(());
        }

        let mut team_ids = member.team_ids.clone();
        team_ids.push(team_id);
        self.store
            .users
            .update(
                user_id,
                UserPatch {
                    team_ids: Some(team_ids),
                    ..Default::default()
                },
            )
            .await?;

        self.logs
            .record(
                actor,
                LogAction::TeamUpdate,
                team_id.to_string(),
                team.name,
                format!("Added {} to team", member.username),
            )
            .await;
        Ok(())
    }

    /// Removes a user from a team, dropping any per-team role override
    pub async fn remove_member(&self, actor: &User, team_id: Uuid, user_id: Uuid) -> AppResult<()> {
        require_admin(actor)?;
        let team = self
            .store
            .teams
            .get(team_id)
            .await
            .ok_or_else(|| AppError::NotFound("team".to_string()))?;
        let member = self
            .store
            .users
            .get(user_id)
            .await
            .ok_or_else(|| AppError::NotFound("user".to_string()))?;

        let team_ids: Vec<Uuid> = member
            .team_ids
            .iter()
            .copied()
            .filter(|tid| *tid != team_id)
            .collect();
        let mut team_roles = member.team_roles.clone();
        team_roles.remove(&team_id);
        self.store
            .users
            .update(
                user_id,
                UserPatch {
                    team_ids: Some(team_ids),
                    team_roles: Some(team_roles),
                    ..Default::default()
                },
            )
            .await?;

        self.logs
            .record(
                actor,
                LogAction::TeamUpdate,
                team_id.to_string(),
                team.name,
                format!("Removed {} from team", member.username),
            )
            .await;
        Ok(())
    }

    /// Sets a user's role override inside one team
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the user does not belong to the
    /// team.
    pub async fn set_team_role(
        &self,
        actor: &User,
        team_id: Uuid,
        user_id: Uuid,
        role: Role,
    ) -> AppResult<()> {
        require_admin(actor)?;
        let team = self
            .store
            .teams
            .get(team_id)
            .await
            .ok_or_else(|| AppError::NotFound("team".to_string()))?;
        let member = self
            .store
            .users
            .get(user_id)
            .await
            .ok_or_else(|| AppError::NotFound("user".to_string()))?;
        if !member.team_ids.contains(&team_id) {
            return Err(AppError::Validation(
                "User does not belong to the team".to_string(),
            ));
        }

        let mut team_roles = member.team_roles.clone();
        team_roles.insert(team_id, role);
        self.store
            .users
            .update(
                user_id,
                UserPatch {
                    team_roles: Some(team_roles),
                    ..Default::default()
                },
            )
            .await?;

        self.logs
            .record(
                actor,
                LogAction::TeamUpdate,
                team_id.to_string(),
                team.name,
                format!("Team role of {} set to {}", member.username, role.as_str()),
            )
            .await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use crewtask_shared::config::Config;
    use std::collections::HashMap;

    fn user(role: Role) -> User {
        User {
            id: Uuid::new_v4(),
            username: "crew".to_string(),
            email: "crew@example.com".to_string(),
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

    fn service(store: &Arc<Store>) -> TeamService {
        TeamService::new(
            store.clone(),
            LogService::new(store.clone(), Config::default().logs),
        )
    }

    #[tokio::test]
    async fn test_mutations_require_admin() {
        let store = Store::new();
        let teams = service(&store);
        let member = user(Role::Manager);

        assert!(matches!(
            teams.create_team(&member, "Deck").await.unwrap_err(),
            AppError::Forbidden(_)
        ));
    }

    #[tokio::test]
    async fn test_membership_round_trip() {
        let store = Store::new();
        let teams = service(&store);
        let admin = user(Role::Admin);
        let crew = store.users.insert(user(Role::User)).await;

        let team = teams.create_team(&admin, "Deck").await.unwrap();
        teams.add_member(&admin, team.id, crew.id).await.unwrap();
        // Adding twice is a no-op
        teams.add_member(&admin, team.id, crew.id).await.unwrap();

        let crew = store.users.get(crew.id).await.unwrap();
        assert_eq!(crew.team_ids, vec![team.id]);

        teams
            .set_team_role(&admin, team.id, crew.id, Role::Manager)
            .await
            .unwrap();
        let crew = store.users.get(crew.id).await.unwrap();
        assert_eq!(crew.role_in_team(team.id), Role::Manager);
        assert!(crew.is_effective_manager());

        teams.remove_member(&admin, team.id, crew.id).await.unwrap();
        let crew = store.users.get(crew.id).await.unwrap();
        assert!(crew.team_ids.is_empty());
        assert!(crew.team_roles.is_empty());
    }

    #[tokio::test]
    async fn test_role_override_needs_membership() {
        let store = Store::new();
        let teams = service(&store);
        let admin = user(Role::Admin);
        let outsider = store.users.insert(user(Role::User)).await;
        let team = teams.create_team(&admin, "Deck").await.unwrap();

        let err = teams
            .set_team_role(&admin, team.id, outsider.id, Role::Manager)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_delete_strips_membership_everywhere() {
        let store = Store::new();
        let teams = service(&store);
        let admin = user(Role::Admin);
        let a = store.users.insert(user(Role::User)).await;
        let b = store.users.insert(user(Role::User)).await;

        let team = teams.create_team(&admin, "Deck").await.unwrap();
        teams.add_member(&admin, team.id, a.id).await.unwrap();
        teams.add_member(&admin, team.id, b.id).await.unwrap();
        teams
            .set_team_role(&admin, team.id, b.id, Role::Manager)
            .await
            .unwrap();

        teams.delete_team(&admin, team.id).await.unwrap();

        assert!(store.teams.get(team.id).await.is_none());
        for id in [a.id, b.id] {
            let u = store.users.get(id).await.unwrap();
            assert!(u.team_ids.is_empty());
            assert!(u.team_roles.is_empty());
        }
        let entries = store.logs.query(|e| e.action == LogAction::TeamDelete).await;
        assert_eq!(entries.len(), 1);
    }
}
