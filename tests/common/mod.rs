#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;

use taskdeck::io::api::{ApiError, ApiResult, TaskApi};
use taskdeck::model::project::{NewProject, Project};
use taskdeck::model::refs::parse_timestamp;
use taskdeck::model::report::{ClosedBuckets, LastWeekEntry, PendingReport, ReportDimension};
use taskdeck::model::tag::Tag;
use taskdeck::model::task::{Task, TaskDraft, TaskStatus};
use taskdeck::model::team::{NewTeam, Team};
use taskdeck::model::user::User;
use taskdeck::ops::filter_codec::{self, FilterParams, SORT_KEY};

#[derive(Default)]
pub struct FakeState {
    pub projects: Vec<Project>,
    pub teams: Vec<Team>,
    pub users: Vec<User>,
    pub tags: Vec<Tag>,
    pub tasks: Vec<Task>,
    pub last_week: Vec<LastWeekEntry>,
    pub pending_days: u64,
    pub closed: HashMap<ReportDimension, ClosedBuckets>,
    /// Endpoints that return an error
    pub failing: HashSet<String>,
    /// Delay for task queries, keyed by query string
    pub delays: HashMap<String, u64>,
    pub calls: Vec<String>,
    next_id: u32,
}

#[derive(Default)]
pub struct FakeApi {
    state: Mutex<FakeState>,
}

impl FakeApi {
    pub fn new(state: FakeState) -> Self {
        FakeApi {
            state: Mutex::new(state),
        }
    }

    /// A small workspace: two projects, two teams, three users, one tag and
    /// five tasks spread across them.
    pub fn seeded() -> Self {
        FakeApi::new(FakeState {
            projects: vec![project("p1", "Brand Refresh"), project("p2", "Launch")],
            teams: vec![team("tm1", "Design"), team("tm2", "Marketing")],
            users: vec![user("u1", "Ana"), user("u2", "Bo"), user("u3", "Cy")],
            tags: vec![Tag {
                id: "tg1".into(),
                name: "urgent".into(),
            }],
            tasks: vec![
                task("t1", "Moodboard", "p2", "tm1", &["u1"], TaskStatus::InProgress, 5),
                task("t2", "Logo", "p1", "tm1", &["u1", "u2"], TaskStatus::ToDo, 2),
                task("t3", "Press kit", "p2", "tm2", &["u3"], TaskStatus::Completed, 0),
                task("t4", "Palette", "p1", "tm1", &["u2"], TaskStatus::Blocked, 8),
                task("t5", "Teaser", "p2", "tm2", &["u3"], TaskStatus::ToDo, 1),
            ],
            ..FakeState::default()
        })
    }

    pub fn fail(&self, endpoint: &str) {
        self.lock().failing.insert(endpoint.to_string());
    }

    pub fn recover(&self, endpoint: &str) {
        self.lock().failing.remove(endpoint);
    }

    pub fn delay(&self, params: &FilterParams, millis: u64) {
        self.lock()
            .delays
            .insert(filter_codec::to_query_string(params), millis);
    }

    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }

    pub fn with_state<R>(&self, f: impl FnOnce(&mut FakeState) -> R) -> R {
        f(&mut self.lock())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    /// Record the call and return the injected failure, if any
    fn enter(&self, endpoint: &str) -> ApiResult<()> {
        let mut state = self.lock();
        state.calls.push(endpoint.to_string());
        if state.failing.contains(endpoint) {
            return Err(ApiError::Unavailable(format!("{} is down", endpoint)));
        }
        Ok(())
    }
}

fn not_found(what: &str) -> ApiError {
    ApiError::Status {
        status: StatusCode::NOT_FOUND,
        message: format!("{} not found", what),
    }
}

fn matches(task: &Task, params: &FilterParams) -> bool {
    params.iter().all(|(key, value)| match key.as_str() {
        "project" => task.project.as_deref() == Some(value.as_str()),
        "team" => task.team.as_deref() == Some(value.as_str()),
        "owner" => task.owners.iter().any(|o| o == value),
        "tags" => task.tags.iter().any(|t| t == value),
        "status" => task.status.label() == value,
        _ => true,
    })
}

fn task_from_draft(id: String, draft: &TaskDraft) -> Task {
    Task {
        id,
        name: draft.name.clone(),
        project: Some(draft.project.clone()).filter(|p| !p.is_empty()),
        team: Some(draft.team.clone()).filter(|t| !t.is_empty()),
        owners: draft.owners.clone(),
        tags: draft.tags.clone(),
        due_date: draft.due_date.as_deref().and_then(parse_timestamp),
        status: draft.status,
        time_to_complete: draft.time_to_complete,
        created_at: None,
        updated_at: None,
    }
}

#[async_trait]
impl TaskApi for FakeApi {
    async fn list_projects(&self) -> ApiResult<Vec<Project>> {
        self.enter("projects")?;
        Ok(self.lock().projects.clone())
    }

    async fn list_teams(&self) -> ApiResult<Vec<Team>> {
        self.enter("teams")?;
        Ok(self.lock().teams.clone())
    }

    async fn list_users(&self) -> ApiResult<Vec<User>> {
        self.enter("users")?;
        Ok(self.lock().users.clone())
    }

    async fn list_tags(&self) -> ApiResult<Vec<Tag>> {
        self.enter("tags")?;
        Ok(self.lock().tags.clone())
    }

    async fn list_tasks(&self, params: &FilterParams) -> ApiResult<Vec<Task>> {
        let query = filter_codec::to_query_string(params);
        let delay = self.lock().delays.get(&query).copied();
        if let Some(ms) = delay {
            tokio::time::sleep(Duration::from_millis(ms)).await;
        }
        self.enter("tasks")?;
        let mut tasks: Vec<Task> = self
            .lock()
            .tasks
            .iter()
            .filter(|t| matches(t, params))
            .cloned()
            .collect();
        if params.get(SORT_KEY).map(String::as_str) == Some("timeToComplete") {
            tasks.sort_by_key(|t| t.time_to_complete);
        }
        Ok(tasks)
    }

    async fn create_task(&self, draft: &TaskDraft) -> ApiResult<Task> {
        self.enter("create_task")?;
        let mut state = self.lock();
        state.next_id += 1;
        let task = task_from_draft(format!("new{}", state.next_id), draft);
        state.tasks.push(task.clone());
        Ok(task)
    }

    async fn update_task(&self, id: &str, draft: &TaskDraft) -> ApiResult<Task> {
        self.enter("update_task")?;
        let mut state = self.lock();
        let slot = state
            .tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| not_found("task"))?;
        *slot = task_from_draft(id.to_string(), draft);
        Ok(slot.clone())
    }

    async fn delete_task(&self, id: &str) -> ApiResult<()> {
        self.enter("delete_task")?;
        let mut state = self.lock();
        let before = state.tasks.len();
        state.tasks.retain(|t| t.id != id);
        if state.tasks.len() == before {
            return Err(not_found("task"));
        }
        Ok(())
    }

    async fn create_project(&self, new: &NewProject) -> ApiResult<Project> {
        self.enter("create_project")?;
        let mut state = self.lock();
        state.next_id += 1;
        let created = Project {
            id: format!("p-new{}", state.next_id),
            name: new.name.clone(),
            description: new.description.clone(),
            status: None,
        };
        state.projects.push(created.clone());
        Ok(created)
    }

    async fn create_team(&self, new: &NewTeam) -> ApiResult<Team> {
        self.enter("create_team")?;
        let mut state = self.lock();
        state.next_id += 1;
        let created = Team {
            id: format!("tm-new{}", state.next_id),
            name: new.name.clone(),
            description: Some(new.description.clone()),
        };
        state.teams.push(created.clone());
        Ok(created)
    }

    async fn report_last_week(&self) -> ApiResult<Vec<LastWeekEntry>> {
        self.enter("report_last_week")?;
        Ok(self.lock().last_week.clone())
    }

    async fn report_pending(&self) -> ApiResult<PendingReport> {
        self.enter("report_pending")?;
        Ok(PendingReport {
            total_days_pending: self.lock().pending_days,
        })
    }

    async fn report_closed(&self, dimension: ReportDimension) -> ApiResult<ClosedBuckets> {
        self.enter(&format!("report_closed:{}", dimension))?;
        Ok(self
            .lock()
            .closed
            .get(&dimension)
            .cloned()
            .unwrap_or_default())
    }
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

pub fn project(id: &str, name: &str) -> Project {
    Project {
        id: id.into(),
        name: name.into(),
        description: String::new(),
        status: None,
    }
}

pub fn team(id: &str, name: &str) -> Team {
    Team {
        id: id.into(),
        name: name.into(),
        description: None,
    }
}

pub fn user(id: &str, name: &str) -> User {
    User {
        id: id.into(),
        name: name.into(),
        email: None,
    }
}

pub fn task(
    id: &str,
    name: &str,
    project: &str,
    team: &str,
    owners: &[&str],
    status: TaskStatus,
    days: u32,
) -> Task {
    Task {
        id: id.into(),
        name: name.into(),
        project: Some(project.into()),
        team: Some(team.into()),
        owners: owners.iter().map(|s| s.to_string()).collect(),
        tags: Vec::new(),
        due_date: None,
        status,
        time_to_complete: days,
        created_at: None,
        updated_at: None,
    }
}
