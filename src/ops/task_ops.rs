use crate::io::api::TaskApi;
use crate::model::project::{NewProject, Project};
use crate::model::task::{Task, TaskDraft, TaskStatus, ValidationError};
use crate::ops::cache::CacheSnapshot;
use crate::ops::error::DeckError;

// ---------------------------------------------------------------------------
// Edits
// ---------------------------------------------------------------------------

/// A partial change to an existing task. Unset fields keep the task's
/// current value; the result is always sent as a full-field replace.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskEdit {
    pub name: Option<String>,
    pub project: Option<String>,
    pub team: Option<String>,
    pub owners: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
    pub status: Option<TaskStatus>,
    pub time_to_complete: Option<u32>,
    /// Due date and time, both required
    pub due: Option<(String, String)>,
}

impl TaskEdit {
    pub fn is_empty(&self) -> bool {
        *self == TaskEdit::default()
    }

    /// Checks that need no current task. An explicit estimate must be at
    /// least a day, as on create; only [`completion_draft`] sets it to 0.
    pub fn check(&self) -> Result<(), ValidationError> {
        if self.time_to_complete == Some(0) {
            return Err(ValidationError::ZeroEstimate);
        }
        if self.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(ValidationError::Missing("task name"));
        }
        Ok(())
    }

    /// Merge this edit over `task`, producing the replacement body.
    pub fn apply(&self, task: &Task) -> Result<TaskDraft, ValidationError> {
        self.check()?;
        let mut draft = TaskDraft::from_task(task);
        if let Some(name) = &self.name {
            draft.name = name.trim().to_string();
        }
        if let Some(project) = &self.project {
            draft.project = project.trim().to_string();
        }
        if let Some(team) = &self.team {
            draft.team = team.trim().to_string();
        }
        if let Some(owners) = &self.owners {
            draft.owners = owners.clone();
        }
        if let Some(tags) = &self.tags {
            draft.tags = tags.clone();
        }
        if let Some(status) = self.status {
            draft.status = status;
        }
        if let Some(days) = self.time_to_complete {
            draft.time_to_complete = days;
        }
        if let Some((date, time)) = &self.due {
            draft = draft.with_due(Some(date.as_str()), Some(time.as_str()))?;
        }

        if draft.name.is_empty() {
            return Err(ValidationError::Missing("task name"));
        }
        if draft.project.is_empty() {
            return Err(ValidationError::Missing("project"));
        }
        if draft.team.is_empty() {
            return Err(ValidationError::Missing("team"));
        }
        Ok(draft)
    }
}

/// Replacement body that closes `task`: status `Completed`, nothing left to do.
pub fn completion_draft(task: &Task) -> TaskDraft {
    let mut draft = TaskDraft::from_task(task);
    draft.status = TaskStatus::Completed;
    draft.time_to_complete = 0;
    draft
}

/// Find a task in the cached list. The service has no single-task read,
/// so lookups go through the last fetched task set.
pub fn find_task<'a>(snapshot: &'a CacheSnapshot, id: &str) -> Result<&'a Task, DeckError> {
    snapshot.task(id).ok_or_else(|| DeckError::NotFound {
        kind: "task",
        id: id.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Writes
// ---------------------------------------------------------------------------

pub async fn create_task(api: &dyn TaskApi, draft: &TaskDraft) -> Result<Task, DeckError> {
    let task = api
        .create_task(draft)
        .await
        .map_err(DeckError::fetch("create task"))?;
    tracing::info!(id = %task.id, name = %task.name, "task created");
    Ok(task)
}

/// Replace every field of task `id` with `draft`.
pub async fn update_task(api: &dyn TaskApi, id: &str, draft: &TaskDraft) -> Result<Task, DeckError> {
    let task = api
        .update_task(id, draft)
        .await
        .map_err(DeckError::fetch(format!("update task {}", id)))?;
    tracing::info!(id, status = %task.status, "task updated");
    Ok(task)
}

pub async fn mark_complete(api: &dyn TaskApi, task: &Task) -> Result<Task, DeckError> {
    update_task(api, &task.id, &completion_draft(task)).await
}

/// Delete task `id`. The caller refreshes afterwards; cached lists still
/// hold the task until then.
pub async fn delete_task(api: &dyn TaskApi, id: &str) -> Result<(), DeckError> {
    api.delete_task(id)
        .await
        .map_err(DeckError::fetch(format!("delete task {}", id)))?;
    tracing::info!(id, "task deleted");
    Ok(())
}

pub async fn create_project(api: &dyn TaskApi, project: &NewProject) -> Result<Project, DeckError> {
    let created = api
        .create_project(project)
        .await
        .map_err(DeckError::fetch("create project"))?;
    tracing::info!(id = %created.id, name = %created.name, "project created");
    Ok(created)
}
