//! Mock inference
//!
//! Answers every task with the same scripted response: a short warmup, the
//! session start marker, the prompt echoed back, a run of placeholder tokens
//! and the closing markers.

use anyhow::Result;
use async_trait::async_trait;
use helix_core::domain::stream::StreamMarker;
use helix_core::domain::task::Task;
use std::time::Duration;
use tracing::debug;

use crate::config::Config;
use crate::sink::OutputSink;

/// Produces the response stream for a task
#[async_trait]
pub trait InferenceService: Send + Sync {
    /// Writes the complete response for `task`, markers included
    async fn respond(&self, task: &Task, sink: &mut dyn OutputSink) -> Result<()>;
}

/// Inference service that streams a fixed placeholder response
#[derive(Debug, Clone)]
pub struct ScriptedInference {
    warmup: Duration,
    token_interval: Duration,
    token_count: usize,
}

impl ScriptedInference {
    pub fn new(warmup: Duration, token_interval: Duration, token_count: usize) -> Self {
        Self {
            warmup,
            token_interval,
            token_count,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.warmup, config.token_interval, config.token_count)
    }
}

#[async_trait]
impl InferenceService for ScriptedInference {
    async fn respond(&self, task: &Task, sink: &mut dyn OutputSink) -> Result<()> {
        tokio::time::sleep(self.warmup).await;

        sink.write_line(&StreamMarker::session_start(&task.session_id).to_string())?;
        sink.write_line(&task.prompt)?;
        sink.write_line("")?;

        for i in 1..=self.token_count {
            sink.write_line(&format!("hello{} ", i))?;
            tokio::time::sleep(self.token_interval).await;
        }

        sink.write_line(&StreamMarker::EndOfStream.to_string())?;
        sink.write_line(&StreamMarker::session_end(&task.session_id).to_string())?;

        debug!(
            "Streamed {} tokens for session {}",
            self.token_count, task.session_id
        );
        Ok(())
    }
}
