use std::sync::Arc;

use crate::io::api::{ApiResult, TaskApi};
use crate::model::filter::FilterSpec;
use crate::model::task::Task;
use crate::ops::cache::{CacheSnapshot, EntityCache, ReferenceData};
use crate::ops::error::DeckError;
use crate::ops::filter_codec::{self, FilterParams};

/// A task-list request that has been issued but not yet installed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingQuery {
    pub generation: u64,
    pub filter: FilterSpec,
    pub params: FilterParams,
}

/// Outcome of installing a response
#[derive(Debug, Clone)]
pub enum Applied {
    /// The response was installed; this is the resulting snapshot
    Replaced(Arc<CacheSnapshot>),
    /// A newer request had been issued; the response was dropped
    Stale { generation: u64, latest: u64 },
}

impl Applied {
    pub fn is_stale(&self) -> bool {
        matches!(self, Applied::Stale { .. })
    }
}

/// Issues task-list and reference requests and installs their results in
/// the [`EntityCache`].
///
/// Each request is tagged with a generation when issued. A response is
/// installed only if no newer request of the same kind has been issued
/// since. Requests are never cancelled, so this keeps a slow superseded
/// response from overwriting a newer view. `begin`, `fetch` and `apply` are
/// split so a caller can keep several requests in flight on one thread.
#[derive(Debug, Default)]
pub struct QueryResolver {
    cache: EntityCache,
    task_generation: u64,
    reference_generation: u64,
}

impl QueryResolver {
    pub fn new() -> Self {
        QueryResolver::default()
    }

    pub fn snapshot(&self) -> Arc<CacheSnapshot> {
        self.cache.snapshot()
    }

    // -----------------------------------------------------------------------
    // Task list
    // -----------------------------------------------------------------------

    /// Issue a new task-list request for `filter`, superseding any in flight.
    pub fn begin(&mut self, filter: &FilterSpec) -> PendingQuery {
        self.task_generation += 1;
        let params = filter_codec::encode(filter);
        tracing::debug!(
            generation = self.task_generation,
            query = %filter_codec::to_query_string(&params),
            "task query issued"
        );
        PendingQuery {
            generation: self.task_generation,
            filter: filter.clone(),
            params,
        }
    }

    /// Perform the request for a pending query. Does not touch the cache.
    pub async fn fetch(api: &dyn TaskApi, pending: &PendingQuery) -> ApiResult<Vec<Task>> {
        api.list_tasks(&pending.params).await
    }

    /// Install the response to `pending`.
    ///
    /// A superseded response is dropped whether it succeeded or not. A failed
    /// current response leaves the cache untouched and returns `FetchFailed`.
    pub fn apply(
        &mut self,
        pending: PendingQuery,
        result: ApiResult<Vec<Task>>,
    ) -> Result<Applied, DeckError> {
        if pending.generation < self.task_generation {
            tracing::warn!(
                generation = pending.generation,
                latest = self.task_generation,
                "discarding stale task response"
            );
            return Ok(Applied::Stale {
                generation: pending.generation,
                latest: self.task_generation,
            });
        }
        let tasks = result.map_err(DeckError::fetch("tasks"))?;
        tracing::info!(
            generation = pending.generation,
            count = tasks.len(),
            "task list replaced"
        );
        Ok(Applied::Replaced(
            self.cache.replace_tasks(tasks, pending.filter),
        ))
    }

    /// Issue, await and install a task-list request.
    pub async fn refresh_tasks(
        &mut self,
        api: &dyn TaskApi,
        filter: &FilterSpec,
    ) -> Result<Applied, DeckError> {
        let pending = self.begin(filter);
        let result = Self::fetch(api, &pending).await;
        self.apply(pending, result)
    }

    // -----------------------------------------------------------------------
    // Reference data
    // -----------------------------------------------------------------------

    /// Issue a reference-data refresh, returning its generation.
    pub fn begin_references(&mut self) -> u64 {
        self.reference_generation += 1;
        self.reference_generation
    }

    /// Fetch projects, teams, users and tags concurrently. Fails if any fails.
    pub async fn fetch_references(api: &dyn TaskApi) -> ApiResult<ReferenceData> {
        let (projects, teams, users, tags) = futures::try_join!(
            api.list_projects(),
            api.list_teams(),
            api.list_users(),
            api.list_tags(),
        )?;
        Ok(ReferenceData {
            projects,
            teams,
            users,
            tags,
        })
    }

    pub fn apply_references(
        &mut self,
        generation: u64,
        result: ApiResult<ReferenceData>,
    ) -> Result<Applied, DeckError> {
        if generation < self.reference_generation {
            tracing::warn!(
                generation,
                latest = self.reference_generation,
                "discarding stale reference data"
            );
            return Ok(Applied::Stale {
                generation,
                latest: self.reference_generation,
            });
        }
        let references = result.map_err(DeckError::fetch("reference data"))?;
        Ok(Applied::Replaced(self.cache.replace_references(references)))
    }

    pub async fn refresh_references(&mut self, api: &dyn TaskApi) -> Result<Applied, DeckError> {
        let generation = self.begin_references();
        let result = Self::fetch_references(api).await;
        self.apply_references(generation, result)
    }

    // -----------------------------------------------------------------------
    // Combined
    // -----------------------------------------------------------------------

    /// Refresh the task list and the reference data side by side. Neither
    /// waits on the other, and each reports its own outcome.
    pub async fn refresh_view(
        &mut self,
        api: &dyn TaskApi,
        filter: &FilterSpec,
    ) -> (Result<Applied, DeckError>, Result<Applied, DeckError>) {
        let pending = self.begin(filter);
        let ref_generation = self.begin_references();
        let (tasks, references) =
            futures::join!(Self::fetch(api, &pending), Self::fetch_references(api));
        (
            self.apply(pending, tasks),
            self.apply_references(ref_generation, references),
        )
    }

    /// Fetch the task list and all reference data as one unit: either every
    /// request succeeds and the whole cache is replaced, or nothing changes.
    pub async fn refresh_all(
        &mut self,
        api: &dyn TaskApi,
        filter: &FilterSpec,
    ) -> Result<Arc<CacheSnapshot>, DeckError> {
        let pending = self.begin(filter);
        let ref_generation = self.begin_references();
        let (tasks, references) =
            futures::try_join!(Self::fetch(api, &pending), Self::fetch_references(api))
                .map_err(DeckError::fetch("dashboard data"))?;
        tracing::info!(
            generation = pending.generation,
            reference_generation = ref_generation,
            count = tasks.len(),
            "cache replaced"
        );
        Ok(self.cache.replace_all(references, tasks, pending.filter))
    }
}
