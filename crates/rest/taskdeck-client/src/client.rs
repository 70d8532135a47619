//! HTTP client adapter for the taskdeck backend.
//!
//! Every operation is a single attempt: failures surface to the caller
//! with no retry or backoff. A 401 from any endpoint clears the stored
//! token and fires the auth-failure hook before the error is returned.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{RequestBuilder, Response, StatusCode};
use taskdeck_api::auth::{LoginRequest, LoginResponse, RegisterRequest, User};
use taskdeck_api::{ApiErrorBody, Task, TaskCreate, TaskQuery, TaskUpdate};
use taskdeck_session::SessionStore;
use tracing::{debug, warn};

use crate::error::{ApiError, ApiResult};

/// Hook invoked when the backend signals an expired or invalid session.
/// The app uses it to navigate back to the login entry point.
pub type AuthFailureHook = Arc<dyn Fn() + Send + Sync>;

/// Helper function to join URL segments properly
fn join_url_segments(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    if path.is_empty() {
        base.to_string()
    } else {
        format!("{}/{}", base, path)
    }
}

/// Builder for [`TaskApiClient`]
pub struct TaskApiClientBuilder {
    server_url: String,
    timeout: Option<Duration>,
    session: Option<SessionStore>,
    on_auth_failure: Option<AuthFailureHook>,
}

impl TaskApiClientBuilder {
    /// Create a new client builder with the required server URL
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            timeout: None,
            session: None,
            on_auth_failure: None,
        }
    }

    /// Set the default timeout for requests
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Use `session` for token reads and writes instead of an ephemeral
    /// in-memory store
    pub fn with_session(mut self, session: SessionStore) -> Self {
        self.session = Some(session);
        self
    }

    /// Register the hook fired when the backend rejects the session
    pub fn on_auth_failure(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_auth_failure = Some(Arc::new(hook));
        self
    }

    /// Build the client
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client fails to build
    pub fn build(self) -> ApiResult<TaskApiClient> {
        let mut client_builder = reqwest::Client::builder();
        if let Some(timeout) = self.timeout {
            client_builder = client_builder.timeout(timeout);
        }
        let http = client_builder.build()?;

        Ok(TaskApiClient {
            http,
            server_url: self.server_url,
            base_path: "/api".to_string(),
            session: self.session.unwrap_or_else(SessionStore::in_memory),
            on_auth_failure: self.on_auth_failure,
        })
    }
}

/// Typed client for the backend REST API
#[derive(Clone)]
pub struct TaskApiClient {
    http: reqwest::Client,
    server_url: String,
    base_path: String,
    session: SessionStore,
    on_auth_failure: Option<AuthFailureHook>,
}

impl TaskApiClient {
    /// The session store this client reads tokens from
    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        join_url_segments(&join_url_segments(&self.server_url, &self.base_path), path)
    }

    /// Attach the bearer credential (unless the endpoint is exempt), send
    /// the request, and map the response status onto the error taxonomy.
    async fn send(&self, request: RequestBuilder, authenticated: bool) -> ApiResult<Response> {
        let request = match self.session.token() {
            Some(token) if authenticated => request.bearer_auth(token),
            _ => request,
        };

        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let detail = Self::error_detail(response).await;
        if status == StatusCode::UNAUTHORIZED {
            self.handle_auth_failure();
            return Err(ApiError::Auth { detail });
        }

        Err(match status {
            StatusCode::NOT_FOUND => ApiError::NotFound { detail },
            status if status.is_client_error() => ApiError::Validation { detail },
            status => ApiError::Server { status, detail },
        })
    }

    /// Runs exactly once per failing response, regardless of which
    /// operation triggered it.
    fn handle_auth_failure(&self) {
        warn!("backend rejected the session token; clearing stored credentials");
        if let Err(err) = self.session.clear() {
            warn!("failed to clear stored token: {err}");
        }
        if let Some(hook) = &self.on_auth_failure {
            hook();
        }
    }

    /// Best-effort extraction of the backend's `detail` message.
    async fn error_detail(response: Response) -> String {
        let status = response.status();
        match response.text().await {
            Ok(body) => match serde_json::from_str::<ApiErrorBody>(&body) {
                Ok(parsed) => parsed.detail,
                Err(_) if !body.is_empty() => body,
                Err(_) => status.to_string(),
            },
            Err(_) => status.to_string(),
        }
    }

    // Task operations

    /// Fetch the current user's tasks, optionally narrowed by `query`
    pub async fn list_tasks(&self, query: &TaskQuery) -> ApiResult<Vec<Task>> {
        let request = self.http.get(self.url("/tasks")).query(query);
        let response = self.send(request, true).await?;
        Ok(response.json().await?)
    }

    /// Fetch a single task by id
    pub async fn get_task(&self, id: i64) -> ApiResult<Task> {
        let request = self.http.get(self.url(&format!("/tasks/{id}")));
        let response = self.send(request, true).await?;
        Ok(response.json().await?)
    }

    /// Create a task; the returned record carries the server-assigned id
    /// and timestamps
    pub async fn create_task(&self, fields: &TaskCreate) -> ApiResult<Task> {
        let request = self.http.post(self.url("/tasks")).json(fields);
        let response = self.send(request, true).await?;
        Ok(response.json().await?)
    }

    /// Partially update a task; unset fields are left untouched
    pub async fn update_task(&self, id: i64, fields: &TaskUpdate) -> ApiResult<Task> {
        let request = self.http.put(self.url(&format!("/tasks/{id}"))).json(fields);
        let response = self.send(request, true).await?;
        Ok(response.json().await?)
    }

    /// Flip a task's completion state on the server
    pub async fn toggle_complete(&self, id: i64) -> ApiResult<Task> {
        let request = self.http.patch(self.url(&format!("/tasks/{id}/complete")));
        let response = self.send(request, true).await?;
        Ok(response.json().await?)
    }

    /// Delete a task
    pub async fn delete_task(&self, id: i64) -> ApiResult<()> {
        let request = self.http.delete(self.url(&format!("/tasks/{id}")));
        self.send(request, true).await?;
        Ok(())
    }

    // Auth operations

    /// Obtain a session; on success the token is written to the session
    /// store so subsequent requests carry it
    pub async fn login(&self, credentials: &LoginRequest) -> ApiResult<LoginResponse> {
        let request = self.http.post(self.url("/auth/login")).json(credentials);
        let response = self.send(request, false).await?;
        let login: LoginResponse = response.json().await?;
        self.session.set(login.access_token.clone())?;
        debug!(user = %login.user.email, "login succeeded; session token stored");
        Ok(login)
    }

    /// Create an account. Does not log in; call [`login`](Self::login)
    /// with the same credentials afterwards
    pub async fn register(&self, data: &RegisterRequest) -> ApiResult<User> {
        let request = self.http.post(self.url("/auth/register")).json(data);
        let response = self.send(request, false).await?;
        Ok(response.json().await?)
    }

    /// Discard the stored token. Local-only: succeeds without contacting
    /// the server
    pub fn logout(&self) -> ApiResult<()> {
        debug!("logging out locally");
        self.session.clear()?;
        Ok(())
    }
}
