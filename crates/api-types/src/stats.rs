use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow, TS)]
pub struct UserReviewStat {
    pub user_id: String,
    pub reviews_count: i64,
}

/// Aggregate counters computed from the pull request store on every request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
pub struct Stats {
    pub total_pr: i64,
    pub open_pr: i64,
    pub merged_pr: i64,
    pub reviews_per_user: Vec<UserReviewStat>,
}
