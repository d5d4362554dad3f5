use async_trait::async_trait;
use reqwest::StatusCode;

use crate::model::project::{NewProject, Project};
use crate::model::report::{ClosedBuckets, LastWeekEntry, PendingReport, ReportDimension};
use crate::model::tag::Tag;
use crate::model::task::{Task, TaskDraft};
use crate::model::team::{NewTeam, Team};
use crate::model::user::User;
use crate::ops::filter_codec::FilterParams;

/// Error type for collaborator calls
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("could not decode response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("server returned {status}: {message}")]
    Status { status: StatusCode, message: String },
    #[error("invalid task id '{0}'")]
    InvalidId(String),
    #[error("not signed in (run `td login`)")]
    Unauthorized,
    #[error("{0}")]
    Unavailable(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Everything the core needs from the service. The HTTP client implements
/// it in production and an in-memory fake in tests.
#[async_trait]
pub trait TaskApi: Send + Sync {
    /// `GET /projects`
    async fn list_projects(&self) -> ApiResult<Vec<Project>>;
    /// `GET /teams`
    async fn list_teams(&self) -> ApiResult<Vec<Team>>;
    /// `GET /auth/users`
    async fn list_users(&self) -> ApiResult<Vec<User>>;
    /// `GET /tags`
    async fn list_tags(&self) -> ApiResult<Vec<Tag>>;
    /// `GET /tasks?<params>`; filtering and sorting happen on the server
    async fn list_tasks(&self, params: &FilterParams) -> ApiResult<Vec<Task>>;

    /// `POST /tasks`
    async fn create_task(&self, draft: &TaskDraft) -> ApiResult<Task>;
    /// `POST /tasks/{id}`, replacing every field
    async fn update_task(&self, id: &str, draft: &TaskDraft) -> ApiResult<Task>;
    /// `DELETE /tasks/{id}`
    async fn delete_task(&self, id: &str) -> ApiResult<()>;
    /// `POST /projects`
    async fn create_project(&self, project: &NewProject) -> ApiResult<Project>;
    /// `POST /teams`
    async fn create_team(&self, team: &NewTeam) -> ApiResult<Team>;

    /// `GET /report/last-week`
    async fn report_last_week(&self) -> ApiResult<Vec<LastWeekEntry>>;
    /// `GET /report/pending`
    async fn report_pending(&self) -> ApiResult<PendingReport>;
    /// `GET /report/closed-tasks?groupBy=<dimension>`
    async fn report_closed(&self, dimension: ReportDimension) -> ApiResult<ClosedBuckets>;
}
