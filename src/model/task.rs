use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::refs;

/// Task workflow status, serialized with the service's labels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    #[serde(rename = "To Do")]
    ToDo,
    #[serde(rename = "In Progress")]
    InProgress,
    #[serde(rename = "Completed")]
    Completed,
    #[serde(rename = "Blocked")]
    Blocked,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 4] = [
        TaskStatus::ToDo,
        TaskStatus::InProgress,
        TaskStatus::Completed,
        TaskStatus::Blocked,
    ];

    /// The label the service uses on the wire and in query parameters
    pub fn label(self) -> &'static str {
        match self {
            TaskStatus::ToDo => "To Do",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Completed => "Completed",
            TaskStatus::Blocked => "Blocked",
        }
    }

    /// Open means "still has remaining work"
    pub fn is_open(self) -> bool {
        self != TaskStatus::Completed
    }

    /// Parse a wire label exactly (`"To Do"`)
    pub fn from_label(s: &str) -> Option<TaskStatus> {
        TaskStatus::ALL.into_iter().find(|st| st.label() == s)
    }

    /// Parse a wire label or a short command-line form (`todo`, `in-progress`, `done`)
    pub fn parse_label(s: &str) -> Result<TaskStatus, String> {
        if let Some(status) = TaskStatus::from_label(s) {
            return Ok(status);
        }
        match s.to_ascii_lowercase().replace(['_', ' '], "-").as_str() {
            "todo" | "to-do" => Ok(TaskStatus::ToDo),
            "in-progress" | "active" => Ok(TaskStatus::InProgress),
            "completed" | "done" => Ok(TaskStatus::Completed),
            "blocked" => Ok(TaskStatus::Blocked),
            _ => Err(format!(
                "unknown status '{}' (expected: todo, in-progress, completed, blocked)",
                s
            )),
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A task as returned by `GET /tasks`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    /// Owning project id
    #[serde(default, deserialize_with = "refs::opt_ref")]
    pub project: Option<String>,
    /// Owning team id
    #[serde(default, deserialize_with = "refs::opt_ref")]
    pub team: Option<String>,
    /// Owner user ids, in assignment order
    #[serde(default, deserialize_with = "refs::ref_list")]
    pub owners: Vec<String>,
    /// Tag names (not ids)
    #[serde(default, deserialize_with = "refs::string_list")]
    pub tags: Vec<String>,
    #[serde(
        default,
        deserialize_with = "refs::opt_timestamp",
        serialize_with = "refs::ser_opt_timestamp"
    )]
    pub due_date: Option<DateTime<Utc>>,
    pub status: TaskStatus,
    /// Remaining estimate in whole days
    #[serde(default, deserialize_with = "refs::days_or_zero")]
    pub time_to_complete: u32,
    #[serde(
        default,
        deserialize_with = "refs::opt_timestamp",
        serialize_with = "refs::ser_opt_timestamp"
    )]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(
        default,
        deserialize_with = "refs::opt_timestamp",
        serialize_with = "refs::ser_opt_timestamp"
    )]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Error for task and entity input that fails local validation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    Missing(&'static str),
    #[error("estimated time must be at least 1 day")]
    ZeroEstimate,
    #[error("invalid due date '{0}' (expected YYYY-MM-DD)")]
    BadDate(String),
    #[error("invalid due time '{0}' (expected HH:MM)")]
    BadTime(String),
}

/// Full-field body for `POST /tasks` and `POST /tasks/{id}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDraft {
    pub name: String,
    pub project: String,
    pub team: String,
    pub owners: Vec<String>,
    pub tags: Vec<String>,
    /// `YYYY-MM-DDTHH:MM`, or null when no due date was given
    pub due_date: Option<String>,
    pub status: TaskStatus,
    pub time_to_complete: u32,
}

impl TaskDraft {
    /// Build a draft for a new task. The status starts at `To Do` and the
    /// task has no owners or tags until it is updated.
    pub fn new(
        name: &str,
        project: &str,
        team: &str,
        time_to_complete: u32,
    ) -> Result<Self, ValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::Missing("task name"));
        }
        if project.trim().is_empty() {
            return Err(ValidationError::Missing("project"));
        }
        if team.trim().is_empty() {
            return Err(ValidationError::Missing("team"));
        }
        if time_to_complete == 0 {
            return Err(ValidationError::ZeroEstimate);
        }
        Ok(TaskDraft {
            name: name.to_string(),
            project: project.trim().to_string(),
            team: team.trim().to_string(),
            owners: Vec::new(),
            tags: Vec::new(),
            due_date: None,
            status: TaskStatus::ToDo,
            time_to_complete,
        })
    }

    /// Attach a due date. Date and time are only sent together; a date
    /// without a time (or vice versa) leaves the due date unset.
    pub fn with_due(
        mut self,
        date: Option<&str>,
        time: Option<&str>,
    ) -> Result<Self, ValidationError> {
        self.due_date = combine_due(date, time)?;
        Ok(self)
    }

    /// Copy every field of an existing task, for a full-field update.
    /// Missing project/team references are sent as empty strings.
    pub fn from_task(task: &Task) -> Self {
        TaskDraft {
            name: task.name.clone(),
            project: task.project.clone().unwrap_or_default(),
            team: task.team.clone().unwrap_or_default(),
            owners: task.owners.clone(),
            tags: task.tags.clone(),
            due_date: task
                .due_date
                .map(|dt| dt.format("%Y-%m-%dT%H:%M").to_string()),
            status: task.status,
            time_to_complete: task.time_to_complete,
        }
    }
}

fn combine_due(date: Option<&str>, time: Option<&str>) -> Result<Option<String>, ValidationError> {
    let (Some(date), Some(time)) = (date, time) else {
        return Ok(None);
    };
    let date = date.trim();
    let time = time.trim();
    if date.is_empty() || time.is_empty() {
        return Ok(None);
    }
    chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| ValidationError::BadDate(date.to_string()))?;
    chrono::NaiveTime::parse_from_str(time, "%H:%M")
        .map_err(|_| ValidationError::BadTime(time.to_string()))?;
    Ok(Some(format!("{}T{}", date, time)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_labels_round_trip() {
        for status in TaskStatus::ALL {
            assert_eq!(TaskStatus::from_label(status.label()), Some(status));
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.label()));
        }
    }

    #[test]
    fn parse_short_status_forms() {
        assert_eq!(TaskStatus::parse_label("todo"), Ok(TaskStatus::ToDo));
        assert_eq!(TaskStatus::parse_label("in_progress"), Ok(TaskStatus::InProgress));
        assert_eq!(TaskStatus::parse_label("In Progress"), Ok(TaskStatus::InProgress));
        assert_eq!(TaskStatus::parse_label("done"), Ok(TaskStatus::Completed));
        assert!(TaskStatus::parse_label("shipped").is_err());
    }

    #[test]
    fn deserialize_service_task() {
        let json = r#"{
            "_id": "t1",
            "name": "Draft moodboard",
            "project": {"_id": "p1", "name": "Brand"},
            "team": "tm1",
            "owners": [{"_id": "u1", "name": "Ana"}, "u2"],
            "tags": ["design"],
            "dueDate": "2025-06-01T17:00:00.000Z",
            "status": "In Progress",
            "timeToComplete": 4,
            "createdAt": "2025-05-20T08:00:00.000Z",
            "__v": 0
        }"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.project.as_deref(), Some("p1"));
        assert_eq!(task.team.as_deref(), Some("tm1"));
        assert_eq!(task.owners, vec!["u1", "u2"]);
        assert_eq!(task.status, TaskStatus::InProgress);
        assert_eq!(task.time_to_complete, 4);
        assert!(task.due_date.is_some());
        assert!(task.updated_at.is_none());
    }

    #[test]
    fn null_estimate_reads_as_zero() {
        let json = r#"[
            {"_id": "t1", "name": "Copy", "status": "To Do", "timeToComplete": 3},
            {"_id": "t2", "name": "Logo", "status": "Blocked", "timeToComplete": null},
            {"_id": "t3", "name": "Deck", "status": "Completed"}
        ]"#;
        let tasks: Vec<Task> = serde_json::from_str(json).unwrap();
        let days: Vec<u32> = tasks.iter().map(|t| t.time_to_complete).collect();
        assert_eq!(days, vec![3, 0, 0]);
    }

    #[test]
    fn draft_validation() {
        assert_eq!(
            TaskDraft::new("  ", "p1", "t1", 2),
            Err(ValidationError::Missing("task name"))
        );
        assert_eq!(
            TaskDraft::new("Write copy", "", "t1", 2),
            Err(ValidationError::Missing("project"))
        );
        assert_eq!(
            TaskDraft::new("Write copy", "p1", "t1", 0),
            Err(ValidationError::ZeroEstimate)
        );

        let draft = TaskDraft::new(" Write copy ", "p1", "t1", 2).unwrap();
        assert_eq!(draft.name, "Write copy");
        assert_eq!(draft.status, TaskStatus::ToDo);
        assert!(draft.owners.is_empty() && draft.tags.is_empty());
    }

    #[test]
    fn due_date_needs_both_parts() {
        let draft = TaskDraft::new("a", "p", "t", 1).unwrap();
        let only_date = draft.clone().with_due(Some("2025-06-01"), None).unwrap();
        assert_eq!(only_date.due_date, None);

        let both = draft
            .clone()
            .with_due(Some("2025-06-01"), Some("17:30"))
            .unwrap();
        assert_eq!(both.due_date.as_deref(), Some("2025-06-01T17:30"));

        assert!(matches!(
            draft.with_due(Some("06/01/2025"), Some("17:30")),
            Err(ValidationError::BadDate(_))
        ));
    }

    #[test]
    fn draft_body_uses_camel_case() {
        let draft = TaskDraft::new("a", "p", "t", 3).unwrap();
        let value = serde_json::to_value(&draft).unwrap();
        assert_eq!(value["timeToComplete"], 3);
        assert_eq!(value["status"], "To Do");
        assert!(value["dueDate"].is_null());
    }
}
