//! Helix worker client
//!
//! HTTP client for the two worker endpoints a model process talks to:
//! the initial-session URL (read once at boot) and the next-task URL
//! (polled for work).
//!
//! Both endpoints answer 200 with a JSON body when something is ready and
//! any other status when it is not. The client reports "not ready" as
//! `Ok(None)` and leaves the retry policy to the caller.
//!
//! # Example
//!
//! ```no_run
//! use helix_client::WorkerClient;
//!
//! #[tokio::main]
//! async fn main() -> helix_client::Result<()> {
//!     let client = WorkerClient::new(
//!         "http://localhost:8080/api/v1/worker/task/abc",
//!         "http://localhost:8080/api/v1/worker/initial_session/abc",
//!     );
//!
//!     if let Some(session) = client.fetch_initial_session().await? {
//!         println!("lora dir: {}", session.lora_dir);
//!     }
//!     Ok(())
//! }
//! ```

pub mod error;
mod sessions;
mod tasks;

pub use error::{ClientError, Result};
pub use tasks::TaskPayload;

use reqwest::{Client, StatusCode};
use tracing::trace;

/// HTTP client for the worker task and session endpoints
#[derive(Debug, Clone)]
pub struct WorkerClient {
    /// URL that pops the next task off the queue
    next_task_url: String,
    /// URL that reads the session this process was started for
    initial_session_url: String,
    /// HTTP client instance
    client: Client,
}

impl WorkerClient {
    /// Create a new worker client
    ///
    /// # Arguments
    /// * `next_task_url` - Full URL polled for the next task
    /// * `initial_session_url` - Full URL read once for the session config
    pub fn new(next_task_url: impl Into<String>, initial_session_url: impl Into<String>) -> Self {
        Self::with_client(next_task_url, initial_session_url, Client::new())
    }

    /// Create a new worker client with a custom HTTP client
    ///
    /// The default client has no request timeout, so a stalled server blocks
    /// the caller indefinitely. Pass a configured client to change that.
    pub fn with_client(
        next_task_url: impl Into<String>,
        initial_session_url: impl Into<String>,
        client: Client,
    ) -> Self {
        Self {
            next_task_url: next_task_url.into(),
            initial_session_url: initial_session_url.into(),
            client,
        }
    }

    pub fn next_task_url(&self) -> &str {
        &self.next_task_url
    }

    pub fn initial_session_url(&self) -> &str {
        &self.initial_session_url
    }

    /// Issue a bare GET and return the body only for a 200 response
    async fn get_ready_body(&self, url: &str) -> Result<Option<String>> {
        let response = self.client.get(url).send().await?;
        let status = response.status();

        if status != StatusCode::OK {
            trace!("GET {} answered {}, not ready", url, status);
            return Ok(None);
        }

        Ok(Some(response.text().await?))
    }
}
