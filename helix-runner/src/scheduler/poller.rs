//! Task poller
//!
//! Reads the initial session once, then polls for tasks forever. A non-200
//! answer from either endpoint means "not ready" and is retried after a
//! fixed pause with no limit. Every other failure is returned to the caller.

use anyhow::{Context, Result};
use helix_client::WorkerClient;
use helix_core::domain::session::Session;
use helix_core::domain::task::Task;
use std::sync::Arc;
use tracing::{debug, info, trace};

use crate::config::Config;
use crate::service::InferenceService;
use crate::sink::OutputSink;

const LORA_BANNER: &str = "🟡🟡🟡 Lora dir --------------------------------------------------";
const JOB_BANNER: &str = "🟣🟣🟣 Mistral Job --------------------------------------------------";

/// Sequential poller that feeds tasks to an inference service
pub struct TaskPoller<S: OutputSink> {
    config: Config,
    client: WorkerClient,
    inference: Arc<dyn InferenceService>,
    sink: S,
}

impl<S: OutputSink> TaskPoller<S> {
    /// Creates a new task poller
    pub fn new(
        config: Config,
        client: WorkerClient,
        inference: Arc<dyn InferenceService>,
        sink: S,
    ) -> Self {
        Self {
            config,
            client,
            inference,
            sink,
        }
    }

    /// Reads the session, then processes tasks until something fails
    pub async fn run(&mut self) -> Result<()> {
        let session = self.acquire_session().await?;
        info!("Initial session ready (lora_dir={:?})", session.lora_dir);

        info!(
            "Polling {} for tasks (interval: {:?})",
            self.client.next_task_url(),
            self.config.poll_interval
        );

        loop {
            let task = self.process_next_task().await?;
            info!("Finished task for session {}", task.session_id);
        }
    }

    /// Waits for the initial session and announces its LoRA directory
    pub async fn acquire_session(&mut self) -> Result<Session> {
        let mut attempts: u64 = 0;

        let session = loop {
            attempts += 1;

            let fetched = self
                .client
                .fetch_initial_session()
                .await
                .context("Failed to fetch initial session")?;

            match fetched {
                Some(session) => break session,
                None => {
                    trace!("Initial session not ready (attempt {})", attempts);
                    tokio::time::sleep(self.config.poll_interval).await;
                }
            }
        };

        debug!("Initial session fetched after {} attempt(s)", attempts);

        if session.has_lora() {
            self.emit(LORA_BANNER)?;
            self.emit("")?;
            self.emit(&session.lora_dir)?;
        }

        Ok(session)
    }

    /// Waits for one task and streams the response for it
    pub async fn process_next_task(&mut self) -> Result<Task> {
        let payload = loop {
            let fetched = self
                .client
                .fetch_next_task()
                .await
                .context("Failed to fetch next task")?;

            match fetched {
                Some(payload) => break payload,
                None => tokio::time::sleep(self.config.poll_interval).await,
            }
        };

        self.emit(JOB_BANNER)?;
        self.emit(payload.raw())?;

        if let Some(message) = &self.config.mock_error {
            anyhow::bail!("Mock error {}", message);
        }

        if let Some(delay) = self.config.mock_delay()? {
            debug!("Applying mock delay of {:?}", delay);
            tokio::time::sleep(delay).await;
        }

        let task = payload.decode().context("Failed to decode task")?;
        debug!("Running task for session {}", task.session_id);

        self.inference
            .respond(&task, &mut self.sink)
            .await
            .with_context(|| format!("Failed to respond to session {}", task.session_id))?;

        Ok(task)
    }

    fn emit(&mut self, line: &str) -> Result<()> {
        self.sink
            .write_line(line)
            .context("Failed to write to output stream")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{INITIAL_SESSION_URL_VAR, MOCK_DELAY_VAR, NEXT_TASK_URL_VAR};
    use crate::service::ScriptedInference;
    use crate::sink::MemorySink;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fast_config(server: &MockServer) -> Config {
        let mut config = Config::new(
            format!("{}/task", server.uri()),
            format!("{}/session", server.uri()),
        );
        config.poll_interval = Duration::from_millis(1);
        config.warmup = Duration::ZERO;
        config.token_interval = Duration::ZERO;
        config
    }

    fn poller(config: Config, sink: MemorySink) -> TaskPoller<MemorySink> {
        let client = WorkerClient::new(
            config.next_task_url.clone(),
            config.initial_session_url.clone(),
        );
        let inference = Arc::new(ScriptedInference::from_config(&config));
        TaskPoller::new(config, client, inference, sink)
    }

    async fn mount_task(server: &MockServer, body: &str) {
        Mock::given(method("GET"))
            .and(path("/task"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_session_retries_until_ready() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/session"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(3)
            .expect(3)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/session"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "lora_dir": "/x" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let sink = MemorySink::new();
        let mut poller = poller(fast_config(&server), sink.clone());

        let session = poller.acquire_session().await.unwrap();
        assert_eq!(session.lora_dir, "/x");
        assert_eq!(sink.lines(), vec![LORA_BANNER, "", "/x"]);
    }

    #[tokio::test]
    async fn test_empty_lora_dir_prints_nothing() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/session"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "lora_dir": "" })),
            )
            .mount(&server)
            .await;

        let sink = MemorySink::new();
        let mut poller = poller(fast_config(&server), sink.clone());

        poller.acquire_session().await.unwrap();
        assert!(sink.lines().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_session_is_fatal() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/session"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
            .mount(&server)
            .await;

        let mut poller = poller(fast_config(&server), MemorySink::new());
        assert!(poller.acquire_session().await.is_err());
    }

    #[tokio::test]
    async fn test_task_output_order() {
        let server = MockServer::start().await;
        let body = r#"{"prompt": "hi", "session_id": "s1"}"#;
        mount_task(&server, body).await;

        let sink = MemorySink::new();
        let mut poller = poller(fast_config(&server), sink.clone());

        let task = poller.process_next_task().await.unwrap();
        assert_eq!(task.session_id, "s1");

        let mut expected = vec![
            JOB_BANNER.to_string(),
            body.to_string(),
            " [SESSION_START]session_id=s1 ".to_string(),
            "hi".to_string(),
            String::new(),
        ];
        expected.extend((1..=9).map(|i| format!("hello{} ", i)));
        expected.push("</s>".to_string());
        expected.push(" [SESSION_END]session_id=s1 ".to_string());

        assert_eq!(sink.lines(), expected);
    }

    #[tokio::test]
    async fn test_task_retries_then_repeats() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/task"))
            .respond_with(ResponseTemplate::new(404))
            .up_to_n_times(2)
            .expect(2)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/task"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(r#"{"prompt": "a", "session_id": "s1"}"#),
            )
            .up_to_n_times(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/task"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(r#"{"prompt": "b", "session_id": "s2"}"#),
            )
            .mount(&server)
            .await;

        let sink = MemorySink::new();
        let mut poller = poller(fast_config(&server), sink.clone());

        let first = poller.process_next_task().await.unwrap();
        let second = poller.process_next_task().await.unwrap();
        assert_eq!(first.session_id, "s1");
        assert_eq!(second.session_id, "s2");

        let lines = sink.lines();
        let end_s1 = lines
            .iter()
            .position(|l| l == " [SESSION_END]session_id=s1 ")
            .unwrap();
        let start_s2 = lines
            .iter()
            .position(|l| l == " [SESSION_START]session_id=s2 ")
            .unwrap();
        assert!(end_s1 < start_s2);
    }

    #[tokio::test]
    async fn test_mock_error_stops_after_body() {
        let server = MockServer::start().await;
        let body = r#"{"prompt": "hi", "session_id": "s1"}"#;
        mount_task(&server, body).await;

        let mut config = fast_config(&server);
        config.mock_error = Some("boom".to_string());

        let sink = MemorySink::new();
        let mut poller = poller(config, sink.clone());

        let err = poller.process_next_task().await.unwrap_err();
        assert!(err.to_string().contains("boom"));
        assert_eq!(sink.lines(), vec![JOB_BANNER, body]);
    }

    fn config_with_mock_delay(server: &MockServer, delay: &str) -> Config {
        let task_url = format!("{}/task", server.uri());
        let session_url = format!("{}/session", server.uri());
        let mut config = Config::from_lookup(|name: &str| match name {
            NEXT_TASK_URL_VAR => Some(task_url.clone()),
            INITIAL_SESSION_URL_VAR => Some(session_url.clone()),
            MOCK_DELAY_VAR => Some(delay.to_string()),
            _ => None,
        })
        .unwrap();
        config.poll_interval = Duration::from_millis(1);
        config.warmup = Duration::ZERO;
        config.token_interval = Duration::ZERO;
        config
    }

    #[tokio::test]
    async fn test_mock_delay_before_session_start() {
        let server = MockServer::start().await;
        let body = r#"{"prompt": "hi", "session_id": "s1"}"#;
        mount_task(&server, body).await;

        let sink = MemorySink::new();
        let mut poller = poller(config_with_mock_delay(&server, "2"), sink.clone());
        poller.process_next_task().await.unwrap();

        let echoed = sink.written_at(body).unwrap();
        let started = sink.written_at(" [SESSION_START]session_id=s1 ").unwrap();
        assert!(started.duration_since(echoed) >= Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_malformed_mock_delay_fails_after_echo() {
        let server = MockServer::start().await;
        let body = r#"{"prompt": "hi", "session_id": "s1"}"#;
        mount_task(&server, body).await;

        let sink = MemorySink::new();
        let mut poller = poller(config_with_mock_delay(&server, "soon"), sink.clone());

        let err = poller.process_next_task().await.unwrap_err();
        assert!(format!("{:#}", err).contains(MOCK_DELAY_VAR));
        assert_eq!(sink.lines(), vec![JOB_BANNER, body]);
    }

    #[tokio::test]
    async fn test_missing_key_is_fatal_after_echo() {
        let server = MockServer::start().await;
        let body = r#"{"prompt": "hi"}"#;
        mount_task(&server, body).await;

        let sink = MemorySink::new();
        let mut poller = poller(fast_config(&server), sink.clone());

        let err = poller.process_next_task().await.unwrap_err();
        assert!(format!("{:#}", err).contains("session_id"));
        assert_eq!(sink.lines(), vec![JOB_BANNER, body]);
    }
}
