use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use indexmap::IndexSet;

use crate::io::api::TaskApi;
use crate::model::report::{ClosedBuckets, LastWeekEntry, ReportDimension};
use crate::model::task::{Task, TaskStatus};
use crate::ops::cache::{CacheSnapshot, ReferenceData};
use crate::ops::error::DeckError;
use crate::ops::join;

#[async_trait]
pub trait ReportSource: Send + Sync {
    /// Tasks completed within the trailing window, as (name, estimate) rows
    async fn last_week_completed(&self) -> Result<Vec<LastWeekEntry>, DeckError>;
    /// Sum of remaining days across open tasks
    async fn pending_days_total(&self) -> Result<u64, DeckError>;
    /// Closed-task counts keyed by the dimension's display name
    async fn closed_by_dimension(
        &self,
        dimension: ReportDimension,
    ) -> Result<ClosedBuckets, DeckError>;
}

// ---------------------------------------------------------------------------
// Pure aggregation over a task set
// ---------------------------------------------------------------------------

/// Remaining days across every task that is not completed.
pub fn pending_days_total(tasks: &[Task]) -> u64 {
    tasks
        .iter()
        .filter(|t| t.status.is_open())
        .map(|t| u64::from(t.time_to_complete))
        .sum()
}

/// Completed tasks last updated within `window_days` of `now`, oldest first.
/// Tasks without an update timestamp cannot be placed and are left out.
pub fn last_week_completed(
    tasks: &[Task],
    now: DateTime<Utc>,
    window_days: u32,
) -> Vec<LastWeekEntry> {
    let since = now - Duration::days(i64::from(window_days));
    let mut done: Vec<(&DateTime<Utc>, &Task)> = tasks
        .iter()
        .filter(|t| t.status == TaskStatus::Completed)
        .filter_map(|t| t.updated_at.as_ref().map(|at| (at, t)))
        .filter(|(at, _)| **at >= since && **at <= now)
        .collect();
    done.sort_by_key(|(at, _)| **at);
    done.into_iter()
        .map(|(_, t)| LastWeekEntry {
            name: t.name.clone(),
            time_to_complete: t.time_to_complete,
        })
        .collect()
}

/// Count completed tasks per team, owner or project name.
///
/// A task with no reference for the dimension is skipped. A reference that
/// does not resolve is counted under the join placeholder. A task adds at
/// most one to any key, so several owners resolving to the same name count
/// once. Keys appear in first-seen order.
///
/// The three maps are not expected to agree on a total: a closed task with
/// no team is absent from the team map but still counted by project, and a
/// task with two owners counts once for each.
pub fn closed_by_dimension(
    tasks: &[Task],
    refs: &ReferenceData,
    dimension: ReportDimension,
) -> ClosedBuckets {
    let mut buckets = ClosedBuckets::new();
    for task in tasks.iter().filter(|t| t.status == TaskStatus::Completed) {
        let keys: Vec<String> = match dimension {
            ReportDimension::Team => task
                .team
                .as_deref()
                .map(|id| join::team_name(refs, Some(id)))
                .into_iter()
                .collect(),
            ReportDimension::Project => task
                .project
                .as_deref()
                .map(|id| join::project_name(refs, Some(id)))
                .into_iter()
                .collect(),
            ReportDimension::Owner => task
                .owners
                .iter()
                .map(|id| join::user_name(refs, id))
                .collect::<IndexSet<_>>()
                .into_iter()
                .collect(),
        };
        for key in keys {
            *buckets.entry(key).or_insert(0) += 1;
        }
    }
    buckets
}

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

/// Reports computed by the service's `/report/*` endpoints
pub struct ApiReportSource<'a> {
    api: &'a dyn TaskApi,
}

impl<'a> ApiReportSource<'a> {
    pub fn new(api: &'a dyn TaskApi) -> Self {
        ApiReportSource { api }
    }
}

#[async_trait]
impl ReportSource for ApiReportSource<'_> {
    async fn last_week_completed(&self) -> Result<Vec<LastWeekEntry>, DeckError> {
        self.api
            .report_last_week()
            .await
            .map_err(DeckError::fetch("last-week report"))
    }

    async fn pending_days_total(&self) -> Result<u64, DeckError> {
        self.api
            .report_pending()
            .await
            .map(|r| r.total_days_pending)
            .map_err(DeckError::fetch("pending report"))
    }

    async fn closed_by_dimension(
        &self,
        dimension: ReportDimension,
    ) -> Result<ClosedBuckets, DeckError> {
        self.api
            .report_closed(dimension)
            .await
            .map_err(DeckError::fetch(format!("closed-tasks report by {}", dimension)))
    }
}

/// Reports computed from a cache snapshot, for when the task set is already
/// loaded (or the service's report endpoints are unavailable)
pub struct LocalReportSource {
    snapshot: Arc<CacheSnapshot>,
    now: DateTime<Utc>,
    window_days: u32,
}

impl LocalReportSource {
    pub fn new(snapshot: Arc<CacheSnapshot>, now: DateTime<Utc>, window_days: u32) -> Self {
        LocalReportSource {
            snapshot,
            now,
            window_days,
        }
    }
}

#[async_trait]
impl ReportSource for LocalReportSource {
    async fn last_week_completed(&self) -> Result<Vec<LastWeekEntry>, DeckError> {
        Ok(last_week_completed(
            &self.snapshot.tasks,
            self.now,
            self.window_days,
        ))
    }

    async fn pending_days_total(&self) -> Result<u64, DeckError> {
        Ok(pending_days_total(&self.snapshot.tasks))
    }

    async fn closed_by_dimension(
        &self,
        dimension: ReportDimension,
    ) -> Result<ClosedBuckets, DeckError> {
        Ok(closed_by_dimension(
            &self.snapshot.tasks,
            &self.snapshot.references,
            dimension,
        ))
    }
}

// ---------------------------------------------------------------------------
// Collection
// ---------------------------------------------------------------------------

/// The five report reads, each with its own outcome
#[derive(Debug)]
pub struct ReportSet {
    pub last_week: Result<Vec<LastWeekEntry>, DeckError>,
    pub pending_days: Result<u64, DeckError>,
    pub closed_by_team: Result<ClosedBuckets, DeckError>,
    pub closed_by_owner: Result<ClosedBuckets, DeckError>,
    pub closed_by_project: Result<ClosedBuckets, DeckError>,
}

impl ReportSet {
    pub fn closed(&self, dimension: ReportDimension) -> &Result<ClosedBuckets, DeckError> {
        match dimension {
            ReportDimension::Team => &self.closed_by_team,
            ReportDimension::Owner => &self.closed_by_owner,
            ReportDimension::Project => &self.closed_by_project,
        }
    }

    /// Every failed read, labelled
    pub fn failures(&self) -> Vec<(&'static str, &DeckError)> {
        let mut out = Vec::new();
        if let Err(e) = &self.last_week {
            out.push(("last_week", e));
        }
        if let Err(e) = &self.pending_days {
            out.push(("pending_days", e));
        }
        for (label, dimension) in [
            ("closed_by_team", ReportDimension::Team),
            ("closed_by_owner", ReportDimension::Owner),
            ("closed_by_project", ReportDimension::Project),
        ] {
            if let Err(e) = self.closed(dimension) {
                out.push((label, e));
            }
        }
        out
    }
}

/// Run all five reads concurrently. A failing read never stops the others.
pub async fn collect_reports(source: &dyn ReportSource) -> ReportSet {
    let (last_week, pending_days, closed_by_team, closed_by_owner, closed_by_project) = futures::join!(
        source.last_week_completed(),
        source.pending_days_total(),
        source.closed_by_dimension(ReportDimension::Team),
        source.closed_by_dimension(ReportDimension::Owner),
        source.closed_by_dimension(ReportDimension::Project),
    );
    let set = ReportSet {
        last_week,
        pending_days,
        closed_by_team,
        closed_by_owner,
        closed_by_project,
    };
    for (label, e) in set.failures() {
        tracing::warn!(report = label, "report unavailable: {e}");
    }
    set
}
