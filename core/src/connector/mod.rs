//! Agent service connector
//!
//! A process-wide client for the remote agent service, constructed once at
//! startup and shared by handle with every session controller. Owns the
//! connectivity state: a successful health probe is sticky and never
//! re-checked, while a failed probe is retried on the next `initialize`
//! call. Invocations come in a blocking form returning the full reply text
//! and a streaming form yielding text increments followed by a terminal
//! item carrying the full concatenation.

pub mod stream;
pub mod wire;

pub use stream::{AgentEvent, StreamAggregator};

use crate::config::AgentConfig;
use crate::error::{CoreError, Result};
use async_trait::async_trait;
use futures::stream::BoxStream;
use futures_util::StreamExt;
use parking_lot::Mutex;
use std::future::Future;
use wire::{GenerateRequest, GenerateResponse, Message, StreamPart};

/// Lifecycle of the shared connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectorState {
    /// No probe attempted yet
    Uninitialized,
    /// A probe is in flight
    Initializing,
    /// Health probe succeeded; sticky
    Ready,
    /// Health probe failed; retried on the next initialize call
    Failed,
}

/// One invocation of the agent
#[derive(Debug, Clone)]
pub struct AgentRequest {
    /// Opaque correlation key, stable for one AI-mode session
    pub thread_id: String,
    /// User text, optionally prefixed with a serialized context snapshot
    pub prompt: String,
}

/// The narrow interface session controllers talk to; implemented by
/// [`AgentConnector`] and by mocks in tests.
#[async_trait]
pub trait AgentService: Send + Sync {
    /// Probe connectivity; idempotent once healthy
    async fn initialize(&self) -> bool;

    /// Blocking invocation returning the full reply text
    async fn generate(&self, request: &AgentRequest) -> Result<String>;

    /// Streaming invocation: chunks in arrival order, then exactly one
    /// [`AgentEvent::Complete`]
    fn stream(&self, request: &AgentRequest) -> BoxStream<'static, Result<AgentEvent>>;
}

/// HTTP client for the agent service
pub struct AgentConnector {
    config: AgentConfig,
    http: reqwest::Client,
    state: Mutex<ConnectorState>,
}

impl AgentConnector {
    /// Create a new connector; no network traffic until `initialize`
    pub fn new(config: AgentConfig) -> Result<Self> {
        let http = reqwest::Client::builder().build()?;
        Ok(AgentConnector {
            config,
            http,
            state: Mutex::new(ConnectorState::Uninitialized),
        })
    }

    /// Current lifecycle state
    pub fn state(&self) -> ConnectorState {
        *self.state.lock()
    }

    /// The configuration this connector was built with
    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Single read-only connectivity check: 2xx on the health endpoint
    async fn probe_health(&self) -> bool {
        let url = format!("{}/api/health", self.config.base_url);
        let result = self
            .http
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .timeout(self.config.health_timeout())
            .send()
            .await;

        match result {
            Ok(response) => response.status().is_success(),
            Err(err) => {
                tracing::debug!("health probe failed: {err}");
                false
            }
        }
    }

    /// Shared initialize logic with an injectable probe, so the sticky-state
    /// transitions stay testable without a live server.
    async fn initialize_with<F>(&self, probe: F) -> bool
    where
        F: Future<Output = bool>,
    {
        {
            let mut state = self.state.lock();
            if *state == ConnectorState::Ready {
                return true;
            }
            *state = ConnectorState::Initializing;
        }

        let healthy = probe.await;
        let mut state = self.state.lock();
        *state = if healthy {
            tracing::info!("agent service ready at {}", self.config.base_url);
            ConnectorState::Ready
        } else {
            tracing::warn!("agent service unreachable at {}", self.config.base_url);
            ConnectorState::Failed
        };
        healthy
    }

    fn ensure_ready(&self) -> Result<()> {
        if *self.state.lock() != ConnectorState::Ready {
            return Err(CoreError::ConnectorUnavailable {
                base_url: self.config.base_url.clone(),
            });
        }
        Ok(())
    }

    fn request_body(request: &AgentRequest) -> GenerateRequest {
        GenerateRequest {
            messages: vec![Message::user(request.prompt.clone())],
            thread_id: Some(request.thread_id.clone()),
        }
    }
}

#[async_trait]
impl AgentService for AgentConnector {
    async fn initialize(&self) -> bool {
        self.initialize_with(self.probe_health()).await
    }

    async fn generate(&self, request: &AgentRequest) -> Result<String> {
        self.ensure_ready()?;

        let url = format!(
            "{}/api/agents/{}/generate",
            self.config.base_url, self.config.agent_id
        );
        let response = self
            .http
            .post(&url)
            .json(&Self::request_body(request))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CoreError::AgentInvocation {
                message: format!("generate returned {status}"),
            });
        }

        let body: GenerateResponse = response.json().await?;
        Ok(body.text)
    }

    fn stream(&self, request: &AgentRequest) -> BoxStream<'static, Result<AgentEvent>> {
        let ready = self.ensure_ready();
        let url = format!(
            "{}/api/agents/{}/stream",
            self.config.base_url, self.config.agent_id
        );
        let body = Self::request_body(request);
        let http = self.http.clone();

        Box::pin(async_stream::try_stream! {
            ready?;

            let response = http.post(&url).json(&body).send().await?;
            let status = response.status();
            if !status.is_success() {
                Err(CoreError::AgentInvocation {
                    message: format!("stream returned {status}"),
                })?;
            }

            let mut bytes = response.bytes_stream();
            let mut buffer = String::new();
            let mut aggregator = StreamAggregator::new();

            'receive: while let Some(chunk) = bytes.next().await {
                let chunk = chunk?;
                buffer.push_str(&String::from_utf8_lossy(&chunk));

                // Process complete SSE lines
                while let Some(newline) = buffer.find('\n') {
                    let line = buffer[..newline].trim_end_matches('\r').to_string();
                    buffer = buffer[newline + 1..].to_string();

                    let Some(data) = line.strip_prefix("data: ") else {
                        continue;
                    };
                    if data == "[DONE]" {
                        break 'receive;
                    }
                    if let Ok(part) = serde_json::from_str::<StreamPart>(data) {
                        if let Some(text) = part.text {
                            aggregator.push(&text);
                            yield AgentEvent::Chunk(text);
                        }
                    }
                }
            }

            yield AgentEvent::Complete {
                text: aggregator.finish(),
            };
        })
    }
}
