use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::model::task::{Task, TaskStatus};
use crate::ops::cache::ReferenceData;

/// Placeholder for an unresolved project or team
pub const NOT_AVAILABLE: &str = "N/A";
/// Placeholder for each unresolved owner or tag
pub const UNKNOWN: &str = "Unknown";

/// A task with its references replaced by display names
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayTask {
    pub id: String,
    pub name: String,
    pub project: String,
    pub team: String,
    /// Owner names in assignment order
    pub owners: Vec<String>,
    pub tags: Vec<String>,
    pub status: TaskStatus,
    pub due_date: Option<DateTime<Utc>>,
    pub time_to_complete: u32,
}

impl DisplayTask {
    /// Owners as a single comma-separated label, for rendering
    pub fn owner_label(&self) -> String {
        self.owners.join(", ")
    }

    pub fn tag_label(&self) -> String {
        self.tags.join(", ")
    }
}

pub fn project_name(refs: &ReferenceData, id: Option<&str>) -> String {
    id.and_then(|id| refs.project(id))
        .map(|p| p.name.clone())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

pub fn team_name(refs: &ReferenceData, id: Option<&str>) -> String {
    id.and_then(|id| refs.team(id))
        .map(|t| t.name.clone())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

pub fn user_name(refs: &ReferenceData, id: &str) -> String {
    refs.user(id)
        .map(|u| u.name.clone())
        .unwrap_or_else(|| UNKNOWN.to_string())
}

pub fn tag_name(refs: &ReferenceData, name: &str) -> String {
    refs.tag(name)
        .map(|t| t.name.clone())
        .unwrap_or_else(|| UNKNOWN.to_string())
}

/// Resolve one task against the reference data. This never fails: a
/// reference with no matching record becomes [`NOT_AVAILABLE`], or
/// [`UNKNOWN`] for each unmatched entry of a list.
pub fn resolve(task: &Task, refs: &ReferenceData) -> DisplayTask {
    DisplayTask {
        id: task.id.clone(),
        name: task.name.clone(),
        project: project_name(refs, task.project.as_deref()),
        team: team_name(refs, task.team.as_deref()),
        owners: task.owners.iter().map(|id| user_name(refs, id)).collect(),
        tags: task.tags.iter().map(|name| tag_name(refs, name)).collect(),
        status: task.status,
        due_date: task.due_date,
        time_to_complete: task.time_to_complete,
    }
}

/// Resolve a task list, keeping its order.
pub fn resolve_all(tasks: &[Task], refs: &ReferenceData) -> Vec<DisplayTask> {
    tasks.iter().map(|t| resolve(t, refs)).collect()
}
