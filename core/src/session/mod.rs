//! Per-terminal session controller
//!
//! Binds the classifier, context gatherer, agent connector and command
//! extractor into an interactive flow layered on top of a live terminal
//! input stream. One controller exists per terminal instance and owns its
//! state exclusively; the agent connector is shared by handle across all
//! sessions.
//!
//! Phases: `Disabled` (all input passes through untouched), `Listening`
//! (AI mode on, accumulating an input line), `Processing` (a request is in
//! flight), `AwaitingConfirmation` (a candidate command is displayed,
//! waiting for y/n). Toggling AI mode off never aborts an in-flight
//! request; a cancellation token suppresses its eventual UI side effects
//! instead.

pub mod notices;

use crate::classifier::{classify, InputKind};
use crate::connector::{AgentEvent, AgentRequest, AgentService, StreamAggregator};
use crate::context::ContextSnapshot;
use crate::error::Result;
use crate::extractor::{self, CommandCandidate};
use futures_util::StreamExt;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Write-only sink for escape-coded output; the terminal renderer in
/// production, a string buffer in tests.
pub trait TerminalDelegate: Send {
    fn write(&mut self, data: &str);
}

/// Phase of the interactive flow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// AI mode off; input is not interpreted
    Disabled,
    /// Accumulating an input line
    Listening,
    /// A request is in flight
    Processing,
    /// A candidate command is displayed, waiting for y/n
    AwaitingConfirmation,
}

/// Work handed back to the event loop by `handle_data`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionSignal {
    /// A completed input line, ready for `process`
    Submit(String),
    /// A confirmed command for the execution collaborator
    Execute(String),
}

/// Outcome of processing a submitted line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// Literal input; run it untouched
    PassThrough(String),
    /// Consumed by the AI pipeline
    Handled,
}

/// Interactive state machine for one terminal session
pub struct SessionController<D: TerminalDelegate> {
    agent: Arc<dyn AgentService>,
    delegate: D,
    phase: SessionPhase,
    input_line: String,
    thread_id: String,
    pending_confirmation: Option<CommandCandidate>,
    cancel: CancellationToken,
    streaming: bool,
    working_dir: PathBuf,
}

impl<D: TerminalDelegate> SessionController<D> {
    /// Create a controller starting in `Disabled`, with a fresh thread id
    /// for the lifetime of the AI-mode session.
    pub fn new(agent: Arc<dyn AgentService>, delegate: D, working_dir: PathBuf, streaming: bool) -> Self {
        SessionController {
            agent,
            delegate,
            phase: SessionPhase::Disabled,
            input_line: String::new(),
            thread_id: format!("terminal-{}", Uuid::new_v4()),
            pending_confirmation: None,
            cancel: CancellationToken::new(),
            streaming,
            working_dir,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_enabled(&self) -> bool {
        self.phase != SessionPhase::Disabled
    }

    pub fn thread_id(&self) -> &str {
        &self.thread_id
    }

    pub fn delegate(&self) -> &D {
        &self.delegate
    }

    /// Token cancelled when AI mode is toggled off; checked before UI side
    /// effects of an in-flight request are applied.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Toggle AI mode. Enabling clears any residual input; disabling
    /// suppresses the UI effects of whatever is still in flight.
    pub fn toggle_ai_mode(&mut self) {
        if self.phase == SessionPhase::Disabled {
            self.input_line.clear();
            self.pending_confirmation = None;
            self.cancel = CancellationToken::new();
            self.phase = SessionPhase::Listening;
            self.delegate.write(notices::MODE_ENABLED);
            self.delegate.write(notices::PROMPT);
        } else {
            self.cancel.cancel();
            self.pending_confirmation = None;
            self.phase = SessionPhase::Disabled;
            self.delegate.write(notices::MODE_DISABLED);
        }
    }

    /// Feed one terminal data event through the state machine.
    ///
    /// Returns `Submit` when a line is ready for [`process`](Self::process)
    /// and `Execute` when the user confirmed a pending command. In
    /// `Disabled` everything is ignored so the caller can pass input
    /// through untouched.
    pub fn handle_data(&mut self, data: &str) -> Option<SessionSignal> {
        match self.phase {
            SessionPhase::Disabled => None,
            SessionPhase::AwaitingConfirmation => self.handle_confirmation(data),
            SessionPhase::Listening | SessionPhase::Processing => self.handle_keystrokes(data),
        }
    }

    fn handle_confirmation(&mut self, data: &str) -> Option<SessionSignal> {
        if data.eq_ignore_ascii_case("y") {
            let candidate = self.pending_confirmation.take()?;
            self.phase = SessionPhase::Listening;
            self.delegate.write(&notices::executing(&candidate.raw));
            Some(SessionSignal::Execute(candidate.raw))
        } else if data.eq_ignore_ascii_case("n") {
            self.pending_confirmation = None;
            self.phase = SessionPhase::Listening;
            self.delegate.write(notices::CANCELLED);
            self.delegate.write(notices::PROMPT);
            None
        } else {
            // anything else is ignored until a valid y/n arrives
            None
        }
    }

    fn handle_keystrokes(&mut self, data: &str) -> Option<SessionSignal> {
        match data {
            "\r" | "\n" => {
                // A submit needs a non-empty line and no request in flight
                if self.phase != SessionPhase::Listening || self.input_line.trim().is_empty() {
                    return None;
                }
                let line = std::mem::take(&mut self.input_line);
                self.delegate.write("\r\n");
                Some(SessionSignal::Submit(line))
            }
            "\x08" | "\x7f" => {
                if self.input_line.pop().is_some() {
                    self.delegate.write("\x08 \x08");
                }
                None
            }
            _ => {
                if !data.contains('\r') && !data.contains('\n') {
                    self.input_line.push_str(data);
                    self.delegate.write(data);
                }
                None
            }
        }
    }

    /// Run a submitted line through the pipeline: classification, context
    /// enrichment, agent invocation, command extraction.
    ///
    /// Literal input short-circuits to `PassThrough` without touching the
    /// connector. Natural-language input always ends `Handled`; failures
    /// recover to `Listening` with an error notice, never terminating the
    /// session.
    pub async fn process(&mut self, line: &str) -> Submission {
        if self.phase == SessionPhase::Processing {
            return Submission::Handled;
        }
        if classify(line) == InputKind::Literal {
            return Submission::PassThrough(line.to_string());
        }

        self.phase = SessionPhase::Processing;
        self.delegate.write(notices::PROCESSING);
        let cancel = self.cancel.clone();

        // Snapshot is built fresh per request; directory state may have
        // changed since the last turn
        let snapshot = ContextSnapshot::gather(&self.working_dir).await;
        let prompt = snapshot.to_prompt(line);

        if !self.agent.initialize().await {
            if !cancel.is_cancelled() {
                self.show_error("agent service is not reachable, is it running?");
            }
            return Submission::Handled;
        }

        let request = AgentRequest {
            thread_id: self.thread_id.clone(),
            prompt,
        };
        let reply = if self.streaming {
            self.stream_reply(&request, &cancel).await
        } else {
            self.agent.generate(&request).await
        };

        if cancel.is_cancelled() {
            // AI mode was toggled off mid-flight; drop the result
            tracing::debug!("discarding reply for cancelled session {}", self.thread_id);
            return Submission::Handled;
        }

        match reply {
            Ok(text) => match extractor::parse_for_execution(&text) {
                Some(candidate) => {
                    self.delegate.write(&notices::command_found(&candidate.raw));
                    self.delegate.write(notices::CONFIRM);
                    self.pending_confirmation = Some(candidate);
                    self.phase = SessionPhase::AwaitingConfirmation;
                }
                None => {
                    self.delegate.write(notices::REPLY_PREFIX);
                    self.delegate.write(&text);
                    self.delegate.write(notices::REPLY_SUFFIX);
                    self.delegate.write(notices::PROMPT);
                    self.phase = SessionPhase::Listening;
                }
            },
            Err(err) => {
                self.show_error(&err.user_message());
            }
        }

        Submission::Handled
    }

    async fn stream_reply(
        &mut self,
        request: &AgentRequest,
        cancel: &CancellationToken,
    ) -> Result<String> {
        let agent = Arc::clone(&self.agent);
        let mut events = agent.stream(request);
        let mut aggregator = StreamAggregator::new();

        while let Some(event) = events.next().await {
            match event? {
                AgentEvent::Chunk(chunk) => {
                    if !cancel.is_cancelled() {
                        self.delegate.write(&chunk);
                    }
                    aggregator.push(&chunk);
                }
                AgentEvent::Complete { text } => return Ok(text),
            }
        }

        // Stream ended without a terminal item; fall back to what arrived
        Ok(aggregator.finish())
    }

    fn show_error(&mut self, message: &str) {
        self.delegate.write(notices::ERROR_PREFIX);
        self.delegate.write(message);
        self.delegate.write(notices::ERROR_SUFFIX);
        self.delegate.write(notices::PROMPT);
        self.phase = SessionPhase::Listening;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use async_trait::async_trait;
    use futures::stream::BoxStream;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct BufferDelegate {
        written: String,
    }

    impl TerminalDelegate for BufferDelegate {
        fn write(&mut self, data: &str) {
            self.written.push_str(data);
        }
    }

    struct MockAgent {
        healthy: bool,
        reply: std::result::Result<String, String>,
        chunks: Vec<String>,
        initialize_calls: AtomicUsize,
        generate_calls: AtomicUsize,
    }

    impl MockAgent {
        fn replying(reply: &str) -> Self {
            MockAgent {
                healthy: true,
                reply: Ok(reply.to_string()),
                chunks: Vec::new(),
                initialize_calls: AtomicUsize::new(0),
                generate_calls: AtomicUsize::new(0),
            }
        }

        fn streaming(chunks: &[&str]) -> Self {
            let mut agent = Self::replying("");
            agent.chunks = chunks.iter().map(|c| c.to_string()).collect();
            agent
        }

        fn unreachable_service() -> Self {
            let mut agent = Self::replying("");
            agent.healthy = false;
            agent
        }

        fn failing(message: &str) -> Self {
            let mut agent = Self::replying("");
            agent.reply = Err(message.to_string());
            agent
        }
    }

    #[async_trait]
    impl AgentService for MockAgent {
        async fn initialize(&self) -> bool {
            self.initialize_calls.fetch_add(1, Ordering::SeqCst);
            self.healthy
        }

        async fn generate(&self, _request: &AgentRequest) -> Result<String> {
            self.generate_calls.fetch_add(1, Ordering::SeqCst);
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(message) => Err(CoreError::AgentInvocation {
                    message: message.clone(),
                }),
            }
        }

        fn stream(&self, _request: &AgentRequest) -> BoxStream<'static, Result<AgentEvent>> {
            let mut events: Vec<Result<AgentEvent>> = self
                .chunks
                .iter()
                .map(|chunk| Ok(AgentEvent::Chunk(chunk.clone())))
                .collect();
            events.push(Ok(AgentEvent::Complete {
                text: self.chunks.concat(),
            }));
            Box::pin(futures::stream::iter(events))
        }
    }

    fn controller(agent: MockAgent) -> (SessionController<BufferDelegate>, Arc<MockAgent>) {
        let agent = Arc::new(agent);
        let controller = SessionController::new(
            Arc::clone(&agent) as Arc<dyn AgentService>,
            BufferDelegate::default(),
            std::env::temp_dir(),
            false,
        );
        (controller, agent)
    }

    fn type_line(controller: &mut SessionController<BufferDelegate>, line: &str) {
        for ch in line.chars() {
            controller.handle_data(&ch.to_string());
        }
    }

    #[test]
    fn test_starts_disabled_and_ignores_input() {
        let (mut controller, _) = controller(MockAgent::replying(""));
        assert_eq!(controller.phase(), SessionPhase::Disabled);
        assert_eq!(controller.handle_data("x"), None);
        assert!(controller.delegate().written.is_empty());
    }

    #[test]
    fn test_toggle_enables_and_disables() {
        let (mut controller, _) = controller(MockAgent::replying(""));
        controller.toggle_ai_mode();
        assert_eq!(controller.phase(), SessionPhase::Listening);
        assert!(controller.delegate().written.contains("[AI mode on"));

        controller.toggle_ai_mode();
        assert_eq!(controller.phase(), SessionPhase::Disabled);
        assert!(controller.delegate().written.contains("[AI mode off"));
    }

    #[test]
    fn test_typing_echoes_and_backspace_erases() {
        let (mut controller, _) = controller(MockAgent::replying(""));
        controller.toggle_ai_mode();
        type_line(&mut controller, "lsx");
        controller.handle_data("\x7f");
        let signal = controller.handle_data("\r");
        assert_eq!(signal, Some(SessionSignal::Submit("ls".to_string())));
    }

    #[test]
    fn test_empty_line_does_not_submit() {
        let (mut controller, _) = controller(MockAgent::replying(""));
        controller.toggle_ai_mode();
        assert_eq!(controller.handle_data("\r"), None);
    }

    #[tokio::test]
    async fn test_literal_input_never_reaches_connector() {
        let (mut controller, agent) = controller(MockAgent::replying("unused"));
        controller.toggle_ai_mode();
        let outcome = controller.process("git status").await;
        assert_eq!(outcome, Submission::PassThrough("git status".to_string()));
        assert_eq!(agent.initialize_calls.load(Ordering::SeqCst), 0);
        assert_eq!(agent.generate_calls.load(Ordering::SeqCst), 0);
        assert_eq!(controller.phase(), SessionPhase::Listening);
    }

    #[tokio::test]
    async fn test_natural_language_flow_to_confirmation() {
        let reply = "You can list everything with:\n```bash\nls -la\n```\n";
        let (mut controller, agent) = controller(MockAgent::replying(reply));
        controller.toggle_ai_mode();

        let outcome = controller.process("如何查看当前目录下的所有文件").await;
        assert_eq!(outcome, Submission::Handled);
        assert_eq!(controller.phase(), SessionPhase::AwaitingConfirmation);
        assert_eq!(agent.generate_calls.load(Ordering::SeqCst), 1);
        assert!(controller.delegate().written.contains("ls -la"));
        assert!(controller.delegate().written.contains("(y/n)"));
    }

    #[tokio::test]
    async fn test_affirmative_confirmation_executes() {
        let reply = "```bash\nls -la\n```";
        let (mut controller, _) = controller(MockAgent::replying(reply));
        controller.toggle_ai_mode();
        controller.process("show all hidden files").await;

        // other keys are ignored while waiting for y/n
        assert_eq!(controller.handle_data("x"), None);
        assert_eq!(controller.phase(), SessionPhase::AwaitingConfirmation);

        let signal = controller.handle_data("y");
        assert_eq!(signal, Some(SessionSignal::Execute("ls -la".to_string())));
        assert_eq!(controller.phase(), SessionPhase::Listening);
    }

    #[tokio::test]
    async fn test_negative_confirmation_cancels() {
        let reply = "```bash\nrm old.log\n```";
        let (mut controller, _) = controller(MockAgent::replying(reply));
        controller.toggle_ai_mode();
        controller.process("remove the old log file").await;

        assert_eq!(controller.handle_data("n"), None);
        assert_eq!(controller.phase(), SessionPhase::Listening);
        assert!(controller.delegate().written.contains("Command cancelled"));
    }

    #[tokio::test]
    async fn test_reply_without_command_shows_raw_text() {
        let (mut controller, _) =
            controller(MockAgent::replying("That depends on your filesystem."));
        controller.toggle_ai_mode();
        controller.process("explain my disk layout please").await;

        assert_eq!(controller.phase(), SessionPhase::Listening);
        assert!(controller
            .delegate()
            .written
            .contains("That depends on your filesystem."));
    }

    #[tokio::test]
    async fn test_unreachable_service_recovers_to_listening() {
        let (mut controller, agent) = controller(MockAgent::unreachable_service());
        controller.toggle_ai_mode();
        controller.process("show all hidden files").await;

        assert_eq!(controller.phase(), SessionPhase::Listening);
        assert_eq!(agent.generate_calls.load(Ordering::SeqCst), 0);
        assert!(controller.delegate().written.contains("[AI error]"));
    }

    #[tokio::test]
    async fn test_invocation_error_recovers_to_listening() {
        let (mut controller, _) = controller(MockAgent::failing("connection reset"));
        controller.toggle_ai_mode();
        controller.process("show all hidden files").await;

        assert_eq!(controller.phase(), SessionPhase::Listening);
        assert!(controller.delegate().written.contains("connection reset"));
    }

    #[tokio::test]
    async fn test_streaming_chunks_arrive_in_order() {
        let agent = MockAgent::streaming(&["ls ", "-la"]);
        let agent = Arc::new(agent);
        let mut controller = SessionController::new(
            Arc::clone(&agent) as Arc<dyn AgentService>,
            BufferDelegate::default(),
            std::env::temp_dir(),
            true,
        );
        controller.toggle_ai_mode();
        controller.process("show all hidden files").await;

        let written = &controller.delegate().written;
        let first = written.find("ls ").unwrap();
        let second = written.find("-la").unwrap();
        assert!(first < second);
        // the aggregated reply has no command-shaped content, so the raw
        // text path runs and the session listens again
        assert_eq!(controller.phase(), SessionPhase::Listening);
    }

    #[tokio::test]
    async fn test_streamed_fenced_reply_reaches_confirmation() {
        let agent = Arc::new(MockAgent::streaming(&["```bash\nls ", "-la\n```"]));
        let mut controller = SessionController::new(
            Arc::clone(&agent) as Arc<dyn AgentService>,
            BufferDelegate::default(),
            std::env::temp_dir(),
            true,
        );
        controller.toggle_ai_mode();
        controller.process("show all hidden files").await;

        assert_eq!(controller.phase(), SessionPhase::AwaitingConfirmation);
        let signal = controller.handle_data("Y");
        assert_eq!(signal, Some(SessionSignal::Execute("ls -la".to_string())));
    }

    #[tokio::test]
    async fn test_cancelled_session_suppresses_reply() {
        let (mut controller, _) = controller(MockAgent::replying("```bash\nls\n```"));
        controller.toggle_ai_mode();
        controller.cancellation_token().cancel();
        controller.process("show all hidden files").await;

        assert!(!controller.delegate().written.contains("(y/n)"));
        assert_ne!(controller.phase(), SessionPhase::AwaitingConfirmation);
    }
}
