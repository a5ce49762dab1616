//! Helix Mock Runner
//!
//! A stand-in for a model process, used to exercise the runner harness
//! without loading a model.
//!
//! Architecture:
//! - Configuration: Read from the environment once at startup
//! - Client: HTTP access to the session and task endpoints
//! - Services: The scripted inference response
//! - Scheduler: Session acquisition and the task polling loop
//!
//! The harness reads stdout as a live stream, so stdout carries only the
//! response protocol. Diagnostics go to stderr.

mod config;
mod scheduler;
mod service;
mod sink;

use anyhow::Result;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::scheduler::TaskPoller;
use crate::service::{InferenceService, ScriptedInference};
use crate::sink::StdoutSink;
use helix_client::WorkerClient;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "helix_runner=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting Helix mock runner");

    // Load configuration
    let config = load_config()?;
    info!(
        "Loaded configuration: next_task_url={}, initial_session_url={}",
        config.next_task_url, config.initial_session_url
    );
    if let Some(message) = &config.mock_error {
        info!("Mock error enabled: {}", message);
    }
    if let Some(delay) = &config.mock_delay {
        info!("Mock delay enabled: {}s", delay);
    }

    let client = WorkerClient::new(
        config.next_task_url.clone(),
        config.initial_session_url.clone(),
    );
    let inference: Arc<dyn InferenceService> = Arc::new(ScriptedInference::from_config(&config));

    let mut poller = TaskPoller::new(config, client, inference, StdoutSink::new());

    if let Err(e) = poller.run().await {
        error!("Runner stopped: {:#}", e);
        return Err(e);
    }

    Ok(())
}

/// Loads and validates configuration from environment variables
fn load_config() -> Result<Config> {
    let config = Config::from_env()?;
    config.validate()?;
    Ok(config)
}
