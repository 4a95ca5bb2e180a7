//! `termai` - AI command mode for the terminal
//!
//! A toggleable AI mode that turns natural-language requests into shell
//! commands through a remote agent service, with explicit confirmation
//! before anything runs. Literal commands pass through untouched.

use anyhow::{bail, Context, Result};
use clap::Parser;
use console::Style;
use std::io::Write;
use std::sync::Arc;

use crate::cli::Cli;
use termai_core::connector::AgentEvent;
use termai_core::context::ContextSnapshot;
use termai_core::{extractor, AgentConfig, AgentConnector, AgentRequest, AgentService};

mod cli;
mod terminal;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = AgentConfig::from_env();
    if let Some(base_url) = &cli.base_url {
        config = config.with_base_url(base_url);
    }
    if let Some(agent_id) = &cli.agent {
        config = config.with_agent_id(agent_id);
    }
    tracing::debug!("agent service: {} ({})", config.base_url, config.agent_id);

    let connector =
        Arc::new(AgentConnector::new(config).context("failed to build agent connector")?);

    if cli.query.is_empty() {
        terminal::run(connector, !cli.no_stream).await
    } else {
        one_shot(connector, &cli.query.join(" "), !cli.no_stream).await
    }
}

/// Answer a single query and exit; no raw mode, no confirmation loop
async fn one_shot(agent: Arc<AgentConnector>, query: &str, streaming: bool) -> Result<()> {
    use futures::StreamExt;

    if !agent.initialize().await {
        bail!(
            "agent service is not reachable at {}, is it running?",
            agent.config().base_url
        );
    }

    let working_dir = std::env::current_dir().context("cannot resolve working directory")?;
    let snapshot = ContextSnapshot::gather(&working_dir).await;
    let request = AgentRequest {
        thread_id: format!("cli-{}", std::process::id()),
        prompt: snapshot.to_prompt(query),
    };

    let text = if streaming {
        let mut events = agent.stream(&request);
        let mut full = String::new();
        while let Some(event) = events.next().await {
            match event.context("agent stream failed")? {
                AgentEvent::Chunk(chunk) => {
                    print!("{chunk}");
                    std::io::stdout().flush()?;
                }
                AgentEvent::Complete { text } => full = text,
            }
        }
        println!();
        full
    } else {
        let text = agent
            .generate(&request)
            .await
            .context("agent invocation failed")?;
        println!("{text}");
        text
    };

    if let Some(candidate) = extractor::parse_for_execution(&text) {
        let green = Style::new().green();
        println!("\n{} {}", green.apply_to("Suggested command:"), candidate);
    }
    Ok(())
}
