//! Interactive terminal loop
//!
//! Raw-mode input with a Ctrl+Space toggle between a plain shell prompt and
//! AI mode. In plain mode lines run directly through the executor; in AI
//! mode every key event is fed to the session controller, which decides
//! when a line is ready for the agent and when a confirmed command should
//! be executed.

use anyhow::{Context, Result};
use console::Style;
use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use futures::StreamExt;
use std::io::{self, Write};
use std::sync::Arc;
use termai_core::executor::CommandExecutor;
use termai_core::session::{notices, SessionSignal, Submission, TerminalDelegate};
use termai_core::{AgentService, SessionController};

/// Writes session output straight to the raw-mode terminal
pub struct StdoutDelegate;

impl TerminalDelegate for StdoutDelegate {
    fn write(&mut self, data: &str) {
        let mut stdout = io::stdout();
        let _ = stdout.write_all(data.as_bytes());
        let _ = stdout.flush();
    }
}

/// Restores cooked mode even on early returns
struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> Result<Self> {
        terminal::enable_raw_mode().context("failed to enable raw mode")?;
        Ok(RawModeGuard)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

/// Run the interactive shell until Ctrl+C or `exit`
pub async fn run(agent: Arc<dyn AgentService>, streaming: bool) -> Result<()> {
    let working_dir = std::env::current_dir().context("cannot resolve working directory")?;
    let executor = CommandExecutor::new().with_working_dir(&working_dir);
    let mut controller = SessionController::new(agent, StdoutDelegate, working_dir, streaming);
    let mut plain_line = String::new();

    let _guard = RawModeGuard::enable()?;
    let cyan = Style::new().cyan();
    write_raw(&format!(
        "{}\r\n",
        cyan.apply_to("termai shell (Ctrl+Space toggles AI mode, Ctrl+C exits)")
    ));
    write_raw(PLAIN_PROMPT);

    let mut events = EventStream::new();
    while let Some(event) = events.next().await {
        let event = event.context("failed to read terminal event")?;
        let Event::Key(key) = event else { continue };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) {
            if key.code == KeyCode::Char('c') {
                break;
            }
            // Ctrl+Space arrives as Char(' ') or Null depending on the terminal
            if key.code == KeyCode::Char(' ') || key.code == KeyCode::Null {
                controller.toggle_ai_mode();
                if !controller.is_enabled() {
                    plain_line.clear();
                    write_raw(PLAIN_PROMPT);
                }
                continue;
            }
        }

        if controller.is_enabled() {
            let data = key_to_data(&key);
            if data.is_empty() {
                continue;
            }
            match controller.handle_data(&data) {
                Some(SessionSignal::Submit(line)) => {
                    if let Submission::PassThrough(command) = controller.process(&line).await {
                        run_command(&executor, &command).await;
                        write_raw(notices::PROMPT);
                    }
                }
                Some(SessionSignal::Execute(command)) => {
                    run_command(&executor, &command).await;
                    write_raw(notices::PROMPT);
                }
                None => {}
            }
        } else if !handle_plain_key(&key, &mut plain_line, &executor).await {
            break;
        }
    }

    write_raw("\r\n");
    Ok(())
}

const PLAIN_PROMPT: &str = "\r\n$ ";

/// Returns false when the user asked to leave the shell
async fn handle_plain_key(key: &KeyEvent, line: &mut String, executor: &CommandExecutor) -> bool {
    match key.code {
        KeyCode::Enter => {
            write_raw("\r\n");
            let submitted = std::mem::take(line);
            let submitted = submitted.trim().to_string();
            if submitted == "exit" || submitted == "quit" {
                return false;
            }
            if !submitted.is_empty() {
                run_command(executor, &submitted).await;
            }
            write_raw(PLAIN_PROMPT);
        }
        KeyCode::Backspace => {
            if line.pop().is_some() {
                write_raw("\x08 \x08");
            }
        }
        KeyCode::Char(c)
            if key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT =>
        {
            line.push(c);
            write_raw(&c.to_string());
        }
        _ => {}
    }
    true
}

fn key_to_data(key: &KeyEvent) -> String {
    match key.code {
        KeyCode::Enter => "\r".to_string(),
        KeyCode::Backspace => "\x7f".to_string(),
        KeyCode::Char(c)
            if key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT =>
        {
            c.to_string()
        }
        _ => String::new(),
    }
}

async fn run_command(executor: &CommandExecutor, command: &str) {
    tracing::debug!("running confirmed command: {command}");
    match executor.execute(command).await {
        Ok(result) => {
            if !result.stdout.is_empty() {
                write_block(&result.stdout);
            }
            if !result.stderr.is_empty() {
                write_block(&result.stderr);
            }
            if !result.success {
                write_raw(&format!(
                    "\r\n\x1b[31m[exit {}]\x1b[0m\r\n",
                    result.exit_code.unwrap_or(-1)
                ));
            }
        }
        Err(err) => {
            write_raw(notices::ERROR_PREFIX);
            write_raw(&err.user_message());
            write_raw(notices::ERROR_SUFFIX);
        }
    }
}

fn write_raw(data: &str) {
    let mut stdout = io::stdout();
    let _ = stdout.write_all(data.as_bytes());
    let _ = stdout.flush();
}

/// Raw mode needs `\r\n` endings; captured command output has bare `\n`
fn write_block(text: &str) {
    write_raw("\r\n");
    write_raw(&text.replace('\n', "\r\n"));
}
