//! In-memory implementation of the store traits.
//!
//! All state lives in `HashMap`s protected by `tokio::sync::RwLock` and is lost
//! on restart. Every mutating call holds the relevant write lock for its whole
//! read-modify-write, so each call is atomic with respect to the others.

use std::collections::{BTreeMap, HashMap, HashSet};

use api_types::{PullRequest, PullRequestShort, PullRequestStatus, User, UserReviewStat};
use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{DirectoryStore, PullRequestStore, StatusCounts, StoreError};

#[derive(Default)]
pub struct InMemoryStore {
    pull_requests: RwLock<HashMap<String, PullRequest>>,
    users: RwLock<HashMap<String, User>>,
    teams: RwLock<HashSet<String>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn sorted_by_id(mut users: Vec<User>) -> Vec<User> {
        users.sort_by(|a, b| a.user_id.cmp(&b.user_id));
        users
    }
}

#[async_trait]
impl PullRequestStore for InMemoryStore {
    async fn find_by_id(&self, id: &str) -> Result<Option<PullRequest>, StoreError> {
        let pull_requests = self.pull_requests.read().await;
        Ok(pull_requests.get(id).cloned())
    }

    async fn create(&self, pr: &PullRequest) -> Result<(), StoreError> {
        let mut pull_requests = self.pull_requests.write().await;
        if pull_requests.contains_key(&pr.pull_request_id) {
            return Err(StoreError::AlreadyExists);
        }
        pull_requests.insert(pr.pull_request_id.clone(), pr.clone());
        Ok(())
    }

    async fn update(&self, pr: &PullRequest) -> Result<i64, StoreError> {
        let mut pull_requests = self.pull_requests.write().await;
        let stored = pull_requests
            .get_mut(&pr.pull_request_id)
            .ok_or(StoreError::NotFound)?;

        if stored.version != pr.version {
            return Err(StoreError::VersionConflict);
        }

        stored.status = pr.status;
        stored.assigned_reviewers = pr.assigned_reviewers.clone();
        stored.merged_at = pr.merged_at;
        stored.version += 1;

        Ok(stored.version)
    }

    async fn list_by_reviewer(
        &self,
        reviewer_id: &str,
    ) -> Result<Vec<PullRequestShort>, StoreError> {
        let pull_requests = self.pull_requests.read().await;
        let mut matching: Vec<&PullRequest> = pull_requests
            .values()
            .filter(|pr| pr.has_reviewer(reviewer_id))
            .collect();
        matching.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.pull_request_id.cmp(&b.pull_request_id))
        });

        Ok(matching.into_iter().map(PullRequestShort::from).collect())
    }

    async fn count_by_status(&self) -> Result<StatusCounts, StoreError> {
        let pull_requests = self.pull_requests.read().await;
        let mut counts = StatusCounts {
            total: pull_requests.len() as i64,
            ..StatusCounts::default()
        };
        for pr in pull_requests.values() {
            match pr.status {
                PullRequestStatus::Open => counts.open += 1,
                PullRequestStatus::Merged => counts.merged += 1,
            }
        }

        Ok(counts)
    }

    async fn count_assignments_by_reviewer(&self) -> Result<Vec<UserReviewStat>, StoreError> {
        let pull_requests = self.pull_requests.read().await;
        let mut counts: BTreeMap<&str, i64> = BTreeMap::new();
        for reviewer in pull_requests
            .values()
            .flat_map(|pr| pr.assigned_reviewers.iter())
        {
            *counts.entry(reviewer.as_str()).or_default() += 1;
        }

        Ok(counts
            .into_iter()
            .map(|(user_id, reviews_count)| UserReviewStat {
                user_id: user_id.to_string(),
                reviews_count,
            })
            .collect())
    }
}

#[async_trait]
impl DirectoryStore for InMemoryStore {
    async fn find_user(&self, user_id: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.read().await;
        Ok(users.get(user_id).cloned())
    }

    async fn create_user(&self, user: &User) -> Result<(), StoreError> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.user_id) {
            return Err(StoreError::AlreadyExists);
        }
        users.insert(user.user_id.clone(), user.clone());
        Ok(())
    }

    async fn update_user(&self, user: &User) -> Result<(), StoreError> {
        let mut users = self.users.write().await;
        let stored = users.get_mut(&user.user_id).ok_or(StoreError::NotFound)?;
        stored.clone_from(user);
        Ok(())
    }

    async fn list_active_users_by_team(&self, team_name: &str) -> Result<Vec<User>, StoreError> {
        let users = self.users.read().await;
        Ok(Self::sorted_by_id(
            users
                .values()
                .filter(|user| user.team_name == team_name && user.is_active)
                .cloned()
                .collect(),
        ))
    }

    async fn list_users_by_team(&self, team_name: &str) -> Result<Vec<User>, StoreError> {
        let users = self.users.read().await;
        Ok(Self::sorted_by_id(
            users
                .values()
                .filter(|user| user.team_name == team_name)
                .cloned()
                .collect(),
        ))
    }

    async fn find_team(&self, team_name: &str) -> Result<Option<String>, StoreError> {
        let teams = self.teams.read().await;
        Ok(teams.get(team_name).cloned())
    }

    async fn create_team(&self, team_name: &str, members: &[User]) -> Result<(), StoreError> {
        // Lock order: teams, then users.
        let mut teams = self.teams.write().await;
        if teams.contains(team_name) {
            return Err(StoreError::AlreadyExists);
        }
        let mut users = self.users.write().await;

        teams.insert(team_name.to_string());
        for member in members {
            users.insert(member.user_id.clone(), member.clone());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn user(id: &str, team: &str, active: bool) -> User {
        User {
            user_id: id.to_string(),
            username: format!("name-{id}"),
            team_name: team.to_string(),
            is_active: active,
        }
    }

    fn open_pr(id: &str, reviewers: &[&str]) -> PullRequest {
        PullRequest {
            pull_request_id: id.to_string(),
            pull_request_name: format!("title-{id}"),
            author_id: "author".to_string(),
            status: PullRequestStatus::Open,
            assigned_reviewers: reviewers.iter().map(|r| r.to_string()).collect(),
            created_at: Utc::now(),
            merged_at: None,
            version: 0,
        }
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_id() {
        let store = InMemoryStore::new();
        store.create(&open_pr("pr-1", &[])).await.unwrap();

        let result = store.create(&open_pr("pr-1", &["u2"])).await;
        assert!(matches!(result, Err(StoreError::AlreadyExists)));

        let stored = store.find_by_id("pr-1").await.unwrap().unwrap();
        assert!(stored.assigned_reviewers.is_empty());
    }

    #[tokio::test]
    async fn test_update_bumps_version() {
        let store = InMemoryStore::new();
        let mut pr = open_pr("pr-1", &["u2"]);
        store.create(&pr).await.unwrap();

        pr.assigned_reviewers = vec!["u3".to_string()];
        let version = store.update(&pr).await.unwrap();
        assert_eq!(version, 1);

        let stored = store.find_by_id("pr-1").await.unwrap().unwrap();
        assert_eq!(stored.assigned_reviewers, vec!["u3".to_string()]);
        assert_eq!(stored.version, 1);
    }

    #[tokio::test]
    async fn test_update_with_stale_version_is_rejected() {
        let store = InMemoryStore::new();
        let pr = open_pr("pr-1", &["u2"]);
        store.create(&pr).await.unwrap();

        let mut first = pr.clone();
        first.assigned_reviewers = vec!["u3".to_string()];
        store.update(&first).await.unwrap();

        // Second writer still holds version 0.
        let mut second = pr.clone();
        second.assigned_reviewers = vec!["u4".to_string()];
        let result = store.update(&second).await;
        assert!(matches!(result, Err(StoreError::VersionConflict)));

        let stored = store.find_by_id("pr-1").await.unwrap().unwrap();
        assert_eq!(stored.assigned_reviewers, vec!["u3".to_string()]);
    }

    #[tokio::test]
    async fn test_update_missing_record() {
        let store = InMemoryStore::new();
        let result = store.update(&open_pr("missing", &[])).await;
        assert!(matches!(result, Err(StoreError::NotFound)));
    }

    #[tokio::test]
    async fn test_create_and_update_user() {
        let store = InMemoryStore::new();
        store.create_user(&user("u1", "backend", true)).await.unwrap();

        let result = store.create_user(&user("u1", "frontend", true)).await;
        assert!(matches!(result, Err(StoreError::AlreadyExists)));

        store.update_user(&user("u1", "backend", false)).await.unwrap();
        let u1 = store.find_user("u1").await.unwrap().unwrap();
        assert!(!u1.is_active);

        let result = store.update_user(&user("ghost", "backend", true)).await;
        assert!(matches!(result, Err(StoreError::NotFound)));
    }

    #[tokio::test]
    async fn test_create_team_upserts_members() {
        let store = InMemoryStore::new();
        store
            .create_team("backend", &[user("u1", "backend", true)])
            .await
            .unwrap();

        // Moving u1 to a new team overwrites its record.
        store
            .create_team(
                "frontend",
                &[user("u1", "frontend", false), user("u2", "frontend", true)],
            )
            .await
            .unwrap();

        assert!(store.list_users_by_team("backend").await.unwrap().is_empty());
        let frontend = store.list_users_by_team("frontend").await.unwrap();
        assert_eq!(frontend.len(), 2);
        let active = store.list_active_users_by_team("frontend").await.unwrap();
        assert_eq!(active, vec![user("u2", "frontend", true)]);
    }

    #[tokio::test]
    async fn test_create_existing_team_leaves_users_untouched() {
        let store = InMemoryStore::new();
        store
            .create_team("backend", &[user("u1", "backend", true)])
            .await
            .unwrap();

        let result = store
            .create_team("backend", &[user("u1", "backend", false)])
            .await;
        assert!(matches!(result, Err(StoreError::AlreadyExists)));

        let u1 = store.find_user("u1").await.unwrap().unwrap();
        assert!(u1.is_active);
    }

    #[tokio::test]
    async fn test_assignment_counts_include_merged() {
        let store = InMemoryStore::new();
        store.create(&open_pr("pr-1", &["u2", "u3"])).await.unwrap();
        let mut merged = open_pr("pr-2", &["u2"]);
        merged.status = PullRequestStatus::Merged;
        store.create(&merged).await.unwrap();

        let counts = store.count_by_status().await.unwrap();
        assert_eq!(
            counts,
            StatusCounts {
                total: 2,
                open: 1,
                merged: 1
            }
        );

        let per_reviewer = store.count_assignments_by_reviewer().await.unwrap();
        assert_eq!(
            per_reviewer,
            vec![
                UserReviewStat {
                    user_id: "u2".to_string(),
                    reviews_count: 2
                },
                UserReviewStat {
                    user_id: "u3".to_string(),
                    reviews_count: 1
                },
            ]
        );
    }
}
