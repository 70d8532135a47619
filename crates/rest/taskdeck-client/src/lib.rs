//! HTTP client adapter and task-list view-model for the taskdeck backend.

pub mod client;
pub mod error;
pub mod list;

pub use client::{TaskApiClient, TaskApiClientBuilder};
pub use error::{ApiError, ApiResult};
pub use list::{Filter, TaskList};
