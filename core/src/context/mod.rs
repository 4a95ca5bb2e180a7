//! Session context collection
//!
//! Builds a point-in-time snapshot of the working directory and inferred
//! project characteristics to send alongside a prompt. Collection fails
//! soft: every sub-step degrades to an `unknown`/empty placeholder so the
//! request pipeline never blocks on enrichment failure. Snapshots are built
//! fresh per request and never cached, since directory state may change
//! between turns.

pub mod project;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variables worth forwarding; everything else is noise or a
/// potential secret.
const ENVIRONMENT_ALLOWLIST: &[&str] = &["PATH", "HOME", "SHELL", "TERM", "LANG", "USER", "EDITOR"];

/// Maximum directory entries serialized into the prompt
const MAX_PROMPT_ENTRIES: usize = 30;

/// A single entry of the working directory listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirEntry {
    /// File or directory name
    pub name: String,
    /// Whether the entry is a directory
    pub is_directory: bool,
    /// Size in bytes (0 for directories)
    pub size: u64,
    /// Last modification time, if the filesystem reports one
    pub modified_at: Option<DateTime<Utc>>,
}

/// Point-in-time description of the session environment
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContextSnapshot {
    /// Working directory the snapshot was taken in
    pub current_directory: String,
    /// Directory listing
    pub entries: Vec<DirEntry>,
    /// Detected project type ("node", "go", "rust", a language name, or "unknown")
    pub project_type: String,
    /// Detected framework, when a package manifest names one
    pub framework: Option<String>,
    /// Detected languages, most prominent first
    pub languages: Vec<String>,
    /// Selected environment variables as "KEY=VALUE"
    pub environment: Vec<String>,
}

impl ContextSnapshot {
    /// Collect a fresh snapshot for `dir`. Never fails; missing data is
    /// reported as `unknown` or left empty.
    pub async fn gather(dir: &Path) -> Self {
        let current_directory = dir.to_string_lossy().to_string();
        let entries = read_entries(dir).await;
        let project = project::detect(dir, &entries).await;
        let environment = ENVIRONMENT_ALLOWLIST
            .iter()
            .filter_map(|key| std::env::var(key).ok().map(|value| format!("{key}={value}")))
            .collect();

        ContextSnapshot {
            current_directory,
            entries,
            project_type: project.project_type,
            framework: project.framework,
            languages: project.languages,
            environment,
        }
    }

    /// Serialize the snapshot into a prompt preamble followed by the user
    /// request.
    pub fn to_prompt(&self, user_input: &str) -> String {
        let mut prompt = String::new();

        prompt.push_str("## Session Context\n");
        prompt.push_str(&format!("- Working directory: {}\n", self.current_directory));
        match &self.framework {
            Some(framework) => {
                prompt.push_str(&format!(
                    "- Project type: {} ({})\n",
                    self.project_type, framework
                ));
            }
            None => {
                prompt.push_str(&format!("- Project type: {}\n", self.project_type));
            }
        }
        if !self.languages.is_empty() {
            prompt.push_str(&format!("- Languages: {}\n", self.languages.join(", ")));
        }
        if !self.environment.is_empty() {
            prompt.push_str(&format!("- Environment: {}\n", self.environment.join(" ")));
        }

        if !self.entries.is_empty() {
            prompt.push_str(&format!("- Directory entries ({}):\n", self.entries.len()));
            for entry in self.entries.iter().take(MAX_PROMPT_ENTRIES) {
                if entry.is_directory {
                    prompt.push_str(&format!("  - {}/\n", entry.name));
                } else {
                    prompt.push_str(&format!("  - {} ({} bytes)\n", entry.name, entry.size));
                }
            }
            if self.entries.len() > MAX_PROMPT_ENTRIES {
                prompt.push_str(&format!(
                    "  - ... and {} more\n",
                    self.entries.len() - MAX_PROMPT_ENTRIES
                ));
            }
        }

        prompt.push_str("\n## User Request\n");
        prompt.push_str(user_input);
        prompt.push('\n');

        prompt
    }
}

/// List the directory, degrading to an empty listing on any error.
async fn read_entries(dir: &Path) -> Vec<DirEntry> {
    let mut entries = Vec::new();
    let mut reader = match tokio::fs::read_dir(dir).await {
        Ok(reader) => reader,
        Err(err) => {
            tracing::debug!("context: cannot read {}: {err}", dir.display());
            return entries;
        }
    };

    while let Ok(Some(entry)) = reader.next_entry().await {
        let name = entry.file_name().to_string_lossy().to_string();
        match entry.metadata().await {
            Ok(metadata) => {
                entries.push(DirEntry {
                    name,
                    is_directory: metadata.is_dir(),
                    size: if metadata.is_dir() { 0 } else { metadata.len() },
                    modified_at: metadata.modified().ok().map(DateTime::<Utc>::from),
                });
            }
            Err(_) => {
                entries.push(DirEntry {
                    name,
                    is_directory: false,
                    size: 0,
                    modified_at: None,
                });
            }
        }
    }

    entries.sort_by(|a, b| a.name.cmp(&b.name));
    entries
}
