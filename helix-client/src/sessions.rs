//! Initial session endpoint

use crate::WorkerClient;
use crate::error::{ClientError, Result};
use helix_core::domain::session::Session;

impl WorkerClient {
    /// Read the session this process was started for
    ///
    /// # Returns
    /// `None` while the endpoint answers anything but 200
    pub async fn fetch_initial_session(&self) -> Result<Option<Session>> {
        let Some(body) = self.get_ready_body(&self.initial_session_url).await? else {
            return Ok(None);
        };

        serde_json::from_str(&body)
            .map(Some)
            .map_err(|e| ClientError::parse("session", e))
    }
}
