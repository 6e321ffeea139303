//! Team and user directory operations.

use std::sync::Arc;

use api_types::{Team, TeamMember, User};
use tracing::instrument;

use crate::{
    error::{Entity, ServiceError},
    store::DirectoryStore,
};

#[derive(Clone)]
pub struct DirectoryService {
    directory: Arc<dyn DirectoryStore>,
}

impl DirectoryService {
    pub fn new(directory: Arc<dyn DirectoryStore>) -> Self {
        Self { directory }
    }

    /// Toggle a user's activity. Existing reviewer assignments are left as they are;
    /// the flag only affects future candidate pools.
    #[instrument(name = "directory.set_user_active", skip(self), fields(user_id = %user_id))]
    pub async fn set_user_active(&self, user_id: &str, is_active: bool) -> Result<User, ServiceError> {
        let mut user = self
            .directory
            .find_user(user_id)
            .await?
            .ok_or(ServiceError::NotFound(Entity::User))?;

        user.is_active = is_active;
        self.directory
            .update_user(&user)
            .await
            .map_err(|error| ServiceError::from_store(Entity::User, error))?;

        Ok(user)
    }

    /// Register a team and upsert its members.
    ///
    /// Listed users that already exist elsewhere are moved into this team and get
    /// their username and activity overwritten.
    #[instrument(
        name = "directory.create_team",
        skip(self, members),
        fields(team_name = %team_name, members = members.len())
    )]
    pub async fn create_team(
        &self,
        team_name: &str,
        members: Vec<TeamMember>,
    ) -> Result<Team, ServiceError> {
        if self.directory.find_team(team_name).await?.is_some() {
            return Err(ServiceError::AlreadyExists(Entity::Team));
        }

        let users: Vec<User> = members
            .iter()
            .map(|member| User {
                user_id: member.user_id.clone(),
                username: member.username.clone(),
                team_name: team_name.to_string(),
                is_active: member.is_active,
            })
            .collect();

        self.directory
            .create_team(team_name, &users)
            .await
            .map_err(|error| ServiceError::from_store(Entity::Team, error))?;

        tracing::info!("team created");

        Ok(Team {
            team_name: team_name.to_string(),
            members,
        })
    }

    #[instrument(name = "directory.get_team", skip(self), fields(team_name = %team_name))]
    pub async fn get_team(&self, team_name: &str) -> Result<Team, ServiceError> {
        let team_name = self
            .directory
            .find_team(team_name)
            .await?
            .ok_or(ServiceError::NotFound(Entity::Team))?;

        let members = self
            .directory
            .list_users_by_team(&team_name)
            .await?
            .into_iter()
            .map(TeamMember::from)
            .collect();

        Ok(Team { team_name, members })
    }
}
