pub mod classifier;
pub mod config;
pub mod connector;
pub mod context;
pub mod error;
pub mod executor;
pub mod extractor;
pub mod session;

// Re-exports for convenience
pub use config::AgentConfig;
pub use connector::{AgentConnector, AgentRequest, AgentService};
pub use executor::CommandExecutor;
pub use session::SessionController;
