use std::sync::Arc;

use crate::{
    assignment::{AssignmentEngine, sampling::RandomSource},
    directory::DirectoryService,
    stats::StatsService,
    store::{DirectoryStore, PullRequestStore},
};

#[derive(Clone)]
pub struct AppState {
    engine: AssignmentEngine,
    directory: DirectoryService,
    stats: StatsService,
}

impl AppState {
    pub fn new(
        pull_requests: Arc<dyn PullRequestStore>,
        directory: Arc<dyn DirectoryStore>,
        random: Arc<dyn RandomSource>,
    ) -> Self {
        Self {
            engine: AssignmentEngine::new(pull_requests.clone(), directory.clone(), random),
            directory: DirectoryService::new(directory),
            stats: StatsService::new(pull_requests),
        }
    }

    pub fn engine(&self) -> &AssignmentEngine {
        &self.engine
    }

    pub fn directory(&self) -> &DirectoryService {
        &self.directory
    }

    pub fn stats(&self) -> &StatsService {
        &self.stats
    }
}
