use std::sync::Arc;

use api_types::Stats;
use tracing::instrument;

use crate::{error::ServiceError, store::PullRequestStore};

/// Computes counters fresh from the pull request store; nothing is cached.
#[derive(Clone)]
pub struct StatsService {
    pull_requests: Arc<dyn PullRequestStore>,
}

impl StatsService {
    pub fn new(pull_requests: Arc<dyn PullRequestStore>) -> Self {
        Self { pull_requests }
    }

    #[instrument(name = "stats.get", skip(self))]
    pub async fn get(&self) -> Result<Stats, ServiceError> {
        let counts = self.pull_requests.count_by_status().await?;
        let reviews_per_user = self.pull_requests.count_assignments_by_reviewer().await?;

        Ok(Stats {
            total_pr: counts.total,
            open_pr: counts.open,
            merged_pr: counts.merged,
            reviews_per_user,
        })
    }
}
