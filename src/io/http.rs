use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Client as ReqwestClient, Method, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::io::api::{ApiError, ApiResult, TaskApi};
use crate::model::config::ApiConfig;
use crate::model::project::{NewProject, Project};
use crate::model::report::{ClosedBuckets, LastWeekEntry, PendingReport, ReportDimension};
use crate::model::session::{LoginRequest, LoginResponse, Session, SignupRequest};
use crate::model::tag::Tag;
use crate::model::task::{Task, TaskDraft};
use crate::model::team::{NewTeam, Team};
use crate::model::user::User;
use crate::ops::filter_codec::{self, FilterParams};

/// REST client for the task service
#[derive(Debug, Clone)]
pub struct HttpApi {
    http: ReqwestClient,
    base_url: Url,
    session: Session,
}

impl HttpApi {
    /// Build a client for `config.base_url`, authenticating as `session`.
    pub fn new(config: &ApiConfig, session: Session) -> ApiResult<Self> {
        let mut base_url = Url::parse(&config.base_url)?;
        // Relative joins drop the last path segment unless it ends in '/'
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        let http = ReqwestClient::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(HttpApi {
            http,
            base_url,
            session,
        })
    }

    /// `POST /api/login`, returning the session to store
    pub async fn login(&self, email: &str, password: &str) -> ApiResult<Session> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let resp: LoginResponse = self.post("api/login", &body).await?;
        Ok(resp.into())
    }

    /// `POST /api/signup`. The service does not sign the new user in.
    pub async fn signup(&self, name: &str, email: &str, password: &str) -> ApiResult<()> {
        let body = SignupRequest {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };
        let _: serde_json::Value = self.post("api/signup", &body).await?;
        Ok(())
    }

    // Private helpers

    fn url(&self, path: &str, query: Option<&str>) -> ApiResult<Url> {
        let mut url = self.base_url.join(path.trim_start_matches('/'))?;
        if let Some(q) = query.filter(|q| !q.is_empty()) {
            url.set_query(Some(q));
        }
        Ok(url)
    }

    /// `tasks/{id}` with the id as a single escaped path segment
    fn task_url(&self, id: &str) -> ApiResult<Url> {
        if matches!(id, "" | "." | "..") {
            return Err(ApiError::InvalidId(id.to_string()));
        }
        let mut url = self.url("tasks", None)?;
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidId(id.to_string()))?
            .pop_if_empty()
            .push(id);
        Ok(url)
    }

    fn auth_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Some(bearer) = self.session.bearer()
            && let Ok(value) = HeaderValue::from_str(&bearer)
        {
            headers.insert(AUTHORIZATION, value);
        }
        headers
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: Option<&str>) -> ApiResult<T> {
        let url = self.url(path, query)?;
        self.request(Method::GET, url, None::<&()>).await
    }

    async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        let url = self.url(path, None)?;
        self.request(Method::POST, url, Some(body)).await
    }

    async fn request<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> ApiResult<T> {
        tracing::debug!(%method, %url, "api request");
        let mut request = self.http.request(method, url).headers(self.auth_headers());
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await?;
        handle_response(response).await
    }
}

async fn handle_response<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
    let status = response.status();
    let text = response.text().await?;
    if status.is_success() {
        let body = if text.trim().is_empty() { "null" } else { &text };
        return Ok(serde_json::from_str(body)?);
    }
    if status == StatusCode::UNAUTHORIZED {
        return Err(ApiError::Unauthorized);
    }
    Err(ApiError::Status {
        status,
        message: error_message(&text),
    })
}

/// The service reports failures as `{"error": "..."}`; fall back to the raw body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .or_else(|| v.get("message"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.trim().to_string())
}

#[async_trait]
impl TaskApi for HttpApi {
    async fn list_projects(&self) -> ApiResult<Vec<Project>> {
        self.get("projects", None).await
    }

    async fn list_teams(&self) -> ApiResult<Vec<Team>> {
        self.get("teams", None).await
    }

    async fn list_users(&self) -> ApiResult<Vec<User>> {
        self.get("auth/users", None).await
    }

    async fn list_tags(&self) -> ApiResult<Vec<Tag>> {
        self.get("tags", None).await
    }

    async fn list_tasks(&self, params: &FilterParams) -> ApiResult<Vec<Task>> {
        let query = filter_codec::to_query_string(params);
        self.get("tasks", Some(&query)).await
    }

    async fn create_task(&self, draft: &TaskDraft) -> ApiResult<Task> {
        self.post("tasks", draft).await
    }

    async fn update_task(&self, id: &str, draft: &TaskDraft) -> ApiResult<Task> {
        let url = self.task_url(id)?;
        self.request(Method::POST, url, Some(draft)).await
    }

    async fn delete_task(&self, id: &str) -> ApiResult<()> {
        let url = self.task_url(id)?;
        let _: serde_json::Value = self.request(Method::DELETE, url, None::<&()>).await?;
        Ok(())
    }

    async fn create_project(&self, project: &NewProject) -> ApiResult<Project> {
        self.post("projects", project).await
    }

    async fn create_team(&self, team: &NewTeam) -> ApiResult<Team> {
        self.post("teams", team).await
    }

    async fn report_last_week(&self) -> ApiResult<Vec<LastWeekEntry>> {
        self.get("report/last-week", None).await
    }

    async fn report_pending(&self) -> ApiResult<PendingReport> {
        self.get("report/pending", None).await
    }

    async fn report_closed(&self, dimension: ReportDimension) -> ApiResult<ClosedBuckets> {
        let query = format!("groupBy={}", dimension.group_by());
        self.get("report/closed-tasks", Some(&query)).await
    }
}
