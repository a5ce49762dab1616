//! Next task endpoint

use crate::WorkerClient;
use crate::error::{ClientError, Result};
use helix_core::domain::task::Task;

/// Raw body of a task response
///
/// The body is kept undecoded so it can be echoed verbatim before the
/// mandatory fields are checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskPayload {
    body: String,
}

impl TaskPayload {
    pub fn new(body: impl Into<String>) -> Self {
        Self { body: body.into() }
    }

    /// The response body exactly as received
    pub fn raw(&self) -> &str {
        &self.body
    }

    /// Decode the body into a [`Task`]
    pub fn decode(&self) -> Result<Task> {
        serde_json::from_str(&self.body).map_err(|e| ClientError::parse("task", e))
    }
}

impl WorkerClient {
    /// Pop the next task off the queue
    ///
    /// # Returns
    /// `None` while the endpoint answers anything but 200
    pub async fn fetch_next_task(&self) -> Result<Option<TaskPayload>> {
        let body = self.get_ready_body(&self.next_task_url).await?;
        Ok(body.map(TaskPayload::new))
    }
}
