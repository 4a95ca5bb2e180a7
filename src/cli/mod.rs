//! CLI argument parsing using clap 4.x derive macros

use clap::Parser;

/// AI command mode for the terminal
///
/// Turns natural-language requests into shell commands through a remote
/// agent service. Run without arguments for the interactive shell, or pass
/// a query for a one-shot answer.
#[derive(Parser, Debug)]
#[command(name = "termai")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// One-shot natural-language query; omit to start the interactive shell
    #[arg(num_args = 0..)]
    pub query: Vec<String>,

    /// Agent service base URL (overrides TERMAI_AGENT_URL)
    #[arg(long)]
    pub base_url: Option<String>,

    /// Agent id on the service (overrides TERMAI_AGENT_ID)
    #[arg(long)]
    pub agent: Option<String>,

    /// Wait for the full reply instead of streaming chunks
    #[arg(long)]
    pub no_stream: bool,
}
