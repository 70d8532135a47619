//! In-memory task list view-model.
//!
//! Mirrors the most recent successful fetch and patches itself from
//! mutation responses instead of re-fetching. List order is the server's
//! response order; the client never re-sorts.

use taskdeck_api::{Task, TaskCreate, TaskQuery};
use tracing::debug;

use crate::client::TaskApiClient;
use crate::error::{ApiError, ApiResult};

/// Completion-status filter over the cached list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Filter {
    #[default]
    All,
    Active,
    Completed,
}

impl Filter {
    pub const ALL: [Filter; 3] = [Filter::All, Filter::Active, Filter::Completed];

    pub fn matches(&self, task: &Task) -> bool {
        match self {
            Filter::All => true,
            Filter::Active => !task.completed,
            Filter::Completed => task.completed,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Filter::All => "All",
            Filter::Active => "Active",
            Filter::Completed => "Completed",
        }
    }
}

/// Client-side view of the user's tasks plus the page-level flags the UI
/// renders from: loading, last error, active filter.
pub struct TaskList {
    client: TaskApiClient,
    tasks: Vec<Task>,
    loading: bool,
    error: Option<String>,
    filter: Filter,
}

impl TaskList {
    pub fn new(client: TaskApiClient) -> Self {
        Self {
            client,
            tasks: Vec::new(),
            loading: false,
            error: None,
            filter: Filter::default(),
        }
    }

    /// The cached list, in server order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// The most recent failure message; stays set until dismissed.
    pub fn last_error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub fn filter(&self) -> Filter {
        self.filter
    }

    pub fn set_filter(&mut self, filter: Filter) {
        self.filter = filter;
    }

    /// The client this list issues its requests through.
    pub fn client(&self) -> &TaskApiClient {
        &self.client
    }

    /// Fetch the full list and replace the cache on success; on failure
    /// the previous list stays untouched. The loading flag is cleared on
    /// every exit path.
    pub async fn load(&mut self) -> ApiResult<()> {
        self.loading = true;
        let result = self.client.list_tasks(&TaskQuery::default()).await;
        self.loading = false;

        match result {
            Ok(tasks) => {
                debug!(count = tasks.len(), "task list replaced from server");
                self.tasks = tasks;
                Ok(())
            }
            Err(err) => {
                self.error = Some("Failed to load tasks".to_string());
                Err(err)
            }
        }
    }

    /// Create a task and prepend the server's record to the list head.
    ///
    /// An empty (or whitespace-only) title is rejected before any network
    /// call is made.
    pub async fn create(&mut self, fields: TaskCreate) -> ApiResult<Task> {
        if fields.title.trim().is_empty() {
            self.error = Some("Title is required".to_string());
            return Err(ApiError::Validation {
                detail: "title must not be empty".to_string(),
            });
        }

        match self.client.create_task(&fields).await {
            Ok(task) => {
                self.tasks.insert(0, task.clone());
                Ok(task)
            }
            Err(err) => {
                self.error = Some("Failed to create task".to_string());
                Err(err)
            }
        }
    }

    /// Toggle a task's completion state.
    ///
    /// A task not present locally is a no-op and sends nothing. On
    /// success only the `completed` field of the local entry is patched
    /// from the response, so concurrent local edits to other fields are
    /// not clobbered.
    pub async fn toggle_complete(&mut self, id: i64) -> ApiResult<()> {
        if !self.tasks.iter().any(|task| task.id == id) {
            debug!(id, "toggle requested for a task not in the local list");
            return Ok(());
        }

        match self.client.toggle_complete(id).await {
            Ok(updated) => {
                if let Some(local) = self.tasks.iter_mut().find(|task| task.id == id) {
                    local.completed = updated.completed;
                }
                Ok(())
            }
            Err(err) => {
                self.error = Some("Failed to update task".to_string());
                Err(err)
            }
        }
    }

    /// Delete a task. `confirmed` is the caller's explicit confirmation;
    /// without it nothing is sent and the list is unchanged.
    pub async fn remove(&mut self, id: i64, confirmed: bool) -> ApiResult<()> {
        if !confirmed {
            debug!(id, "delete not confirmed; nothing sent");
            return Ok(());
        }

        match self.client.delete_task(id).await {
            Ok(()) => {
                self.tasks.retain(|task| task.id != id);
                Ok(())
            }
            Err(err) => {
                self.error = Some("Failed to delete task".to_string());
                Err(err)
            }
        }
    }

    /// Borrow the subset matching `filter` without mutating the cache.
    pub fn filtered(&self, filter: Filter) -> Vec<&Task> {
        self.tasks
            .iter()
            .filter(|task| filter.matches(task))
            .collect()
    }

    /// The subset matching the active filter.
    pub fn visible(&self) -> Vec<&Task> {
        self.filtered(self.filter)
    }
}
