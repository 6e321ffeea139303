use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::User;

/// A team member as exposed by the team endpoints.
///
/// Membership is derived from `User::team_name`; teams never store their own member list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
pub struct TeamMember {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub is_active: bool,
}

impl From<User> for TeamMember {
    fn from(user: User) -> Self {
        Self {
            user_id: user.user_id,
            username: user.username,
            is_active: user.is_active,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
pub struct Team {
    #[serde(default)]
    pub team_name: String,
    #[serde(default)]
    pub members: Vec<TeamMember>,
}

/// Request body of `POST /team/add`; it shares the shape of `Team`.
pub type CreateTeamRequest = Team;

#[derive(Debug, Clone, Deserialize)]
pub struct TeamQuery {
    #[serde(default)]
    pub team_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct TeamResponse {
    pub team: Team,
}
