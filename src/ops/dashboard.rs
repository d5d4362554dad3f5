use std::sync::Arc;

use crate::io::api::TaskApi;
use crate::model::filter::FilterSpec;
use crate::model::project::Project;
use crate::model::task::TaskStatus;
use crate::ops::cache::CacheSnapshot;
use crate::ops::error::DeckError;
use crate::ops::join::{self, DisplayTask};
use crate::ops::query::QueryResolver;

#[derive(Debug, Clone)]
pub struct Dashboard {
    pub snapshot: Arc<CacheSnapshot>,
    pub tasks: Vec<DisplayTask>,
}

impl Dashboard {
    pub fn from_snapshot(snapshot: Arc<CacheSnapshot>) -> Self {
        let tasks = join::resolve_all(&snapshot.tasks, &snapshot.references);
        Dashboard { snapshot, tasks }
    }

    pub fn projects(&self) -> &[Project] {
        &self.snapshot.references.projects
    }

    /// Number of tasks in each status, in display order
    pub fn status_counts(&self) -> Vec<(TaskStatus, usize)> {
        TaskStatus::ALL
            .iter()
            .map(|&s| (s, self.tasks.iter().filter(|t| t.status == s).count()))
            .collect()
    }
}

/// Fetch projects, tasks, users, teams and tags in one go. The cache is
/// replaced only when all five arrive; on any failure the previous snapshot
/// stays in place.
pub async fn load(
    resolver: &mut QueryResolver,
    api: &dyn TaskApi,
    filter: &FilterSpec,
) -> Result<Dashboard, DeckError> {
    let snapshot = resolver.refresh_all(api, filter).await?;
    Ok(Dashboard::from_snapshot(snapshot))
}
