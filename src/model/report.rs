use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::refs;

/// One row of the "completed last week" report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LastWeekEntry {
    pub name: String,
    #[serde(default, deserialize_with = "refs::days_or_zero")]
    pub time_to_complete: u32,
}

/// Body of `GET /report/pending`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingReport {
    pub total_days_pending: u64,
}

/// Closed-task counts keyed by team, owner or project name.
/// A key is present only when at least one closed task maps to it.
pub type ClosedBuckets = IndexMap<String, u64>;

/// Grouping dimension for closed-task reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportDimension {
    Team,
    Owner,
    Project,
}

impl ReportDimension {
    pub const ALL: [ReportDimension; 3] = [
        ReportDimension::Team,
        ReportDimension::Owner,
        ReportDimension::Project,
    ];

    /// Value of the `groupBy` query parameter
    pub fn group_by(self) -> &'static str {
        match self {
            ReportDimension::Team => "team",
            ReportDimension::Owner => "owner",
            ReportDimension::Project => "project",
        }
    }
}

impl fmt::Display for ReportDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.group_by())
    }
}
