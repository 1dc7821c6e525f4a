//! Team and user management

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::info;

use crate::models::{Team, TeamMember, User};
use crate::store::{StatsStore, TeamStore, UserDirectory};
use crate::Result;

/// Team registration, user activity and assignment reporting
pub struct TeamService<S> {
    store: Arc<S>,
}

impl<S> TeamService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}

impl<S> TeamService<S>
where
    S: TeamStore + UserDirectory,
{
    /// Register a team with its members
    ///
    /// Members that already exist elsewhere are moved onto this team. When a
    /// user id is listed more than once the last entry wins.
    pub async fn add_team(
        &self,
        name: &str,
        members: Vec<TeamMember>,
    ) -> Result<(Team, Vec<User>)> {
        let team = Team::new(name);

        let mut users: Vec<User> = Vec::with_capacity(members.len());
        for member in members {
            let user = member.into_user(&team);
            match users.iter_mut().find(|u| u.id == user.id) {
                Some(existing) => *existing = user,
                None => users.push(user),
            }
        }

        self.store.create_team(&team, &users).await?;
        info!(team = %team.name, members = users.len(), "Team created");
        Ok((team, users))
    }

    /// Look up a team and its current members
    pub async fn get_team(&self, name: &str) -> Result<(Team, Vec<User>)> {
        let team = self.store.get_team(name).await?;
        let members = self.store.get_team_members(&team.name).await?;
        Ok((team, members))
    }

    /// Look up a user
    pub async fn get_user(&self, id: &str) -> Result<User> {
        self.store.get_user(id).await
    }

    /// Activate or deactivate a user
    ///
    /// Only affects future assignments; current reviewer sets are untouched.
    pub async fn set_is_active(&self, id: &str, active: bool) -> Result<User> {
        let user = self.store.set_active(id, active).await?;
        info!(user_id = %id, active, "User activity updated");
        Ok(user)
    }
}

impl<S> TeamService<S>
where
    S: StatsStore,
{
    /// Current reviewer assignments per user
    pub async fn assignment_stats(&self) -> Result<BTreeMap<String, u64>> {
        self.store.count_assignments_by_user().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::Error;

    fn member(id: &str, name: &str, active: bool) -> TeamMember {
        TeamMember {
            user_id: id.into(),
            username: name.into(),
            is_active: active,
        }
    }

    #[tokio::test]
    async fn test_add_and_get_team() {
        let service = TeamService::new(Arc::new(MemoryStore::new()));
        let (team, users) = service
            .add_team(
                "backend",
                vec![member("u1", "Alice", true), member("u2", "Bob", false)],
            )
            .await
            .unwrap();
        assert_eq!(team.name, "backend");
        assert_eq!(users.len(), 2);

        let (_, members) = service.get_team("backend").await.unwrap();
        assert_eq!(members.len(), 2);
        assert!(!members.iter().find(|u| u.id == "u2").unwrap().is_active);
    }

    #[tokio::test]
    async fn test_add_team_twice() {
        let service = TeamService::new(Arc::new(MemoryStore::new()));
        service.add_team("backend", vec![]).await.unwrap();
        let err = service.add_team("backend", vec![]).await.unwrap_err();
        assert!(matches!(err, Error::TeamExists(name) if name == "backend"));
    }

    #[tokio::test]
    async fn test_add_team_moves_existing_user() {
        let service = TeamService::new(Arc::new(MemoryStore::new()));
        service
            .add_team("backend", vec![member("u1", "Alice", true)])
            .await
            .unwrap();
        service
            .add_team("platform", vec![member("u1", "Alice", true)])
            .await
            .unwrap();

        assert_eq!(service.get_user("u1").await.unwrap().team_id, "platform");
        let (_, backend) = service.get_team("backend").await.unwrap();
        assert!(backend.is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_member_last_wins() {
        let service = TeamService::new(Arc::new(MemoryStore::new()));
        let (_, users) = service
            .add_team(
                "backend",
                vec![member("u1", "Alice", true), member("u1", "Alicia", false)],
            )
            .await
            .unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].display_name, "Alicia");
    }

    #[tokio::test]
    async fn test_unknown_team_and_user() {
        let service = TeamService::new(Arc::new(MemoryStore::new()));
        assert!(matches!(service.get_team("x").await, Err(Error::NotFound(_))));
        assert!(matches!(
            service.set_is_active("ghost", false).await,
            Err(Error::NotFound(_))
        ));
    }
}
