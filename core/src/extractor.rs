//! Command extraction from agent replies
//!
//! Parses the free-text reply of the agent for a single executable command
//! candidate. Extraction is textual only; nothing here validates shell
//! syntax.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref CODE_BLOCK: Regex =
        Regex::new(r"(?s)```(?:bash|shell|sh|zsh)?[ \t]*\n?(.*?)```").unwrap();
    static ref INLINE_CODE: Regex = Regex::new(r"`([^`\n]+)`").unwrap();
    static ref TRAILING_COMMENT: Regex = Regex::new(r"(?m)#.*$").unwrap();
    static ref LINE_CONTINUATION: Regex = Regex::new(r"\\\s*\n").unwrap();
    static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").unwrap();
}

/// A command extracted from an agent reply, pending user confirmation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandCandidate {
    /// The normalized command string
    pub raw: String,
}

impl std::fmt::Display for CommandCandidate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.raw)
    }
}

/// Extract the first command-shaped span from a reply.
///
/// Precedence, first match wins: fenced code block (bash/sh/shell/zsh tag or
/// untagged), then inline back-tick span, then a line starting with `"$ "`.
/// Returns `None` when the reply carries no command-shaped content, in which
/// case the caller surfaces the raw text instead.
pub fn extract(response: &str) -> Option<String> {
    if let Some(captures) = CODE_BLOCK.captures(response) {
        let block = captures.get(1).map(|m| m.as_str().trim())?;
        if !block.is_empty() {
            return Some(block.to_string());
        }
    }

    if let Some(captures) = INLINE_CODE.captures(response) {
        let span = captures.get(1).map(|m| m.as_str().trim())?;
        if !span.is_empty() {
            return Some(span.to_string());
        }
    }

    for line in response.lines() {
        let trimmed = line.trim();
        if let Some(rest) = trimmed.strip_prefix("$ ") {
            return Some(rest.trim().to_string());
        }
    }

    None
}

/// Normalize an extracted command: strip `#` trailing comments, join
/// backslash-continued lines with a single space, and collapse whitespace
/// runs to one space.
pub fn format_command(command: &str) -> String {
    let without_comments = TRAILING_COMMENT.replace_all(command, "");
    let joined = LINE_CONTINUATION.replace_all(without_comments.trim(), " ");
    WHITESPACE_RUN.replace_all(&joined, " ").trim().to_string()
}

/// Extract and normalize in one step. The result is ready to show for
/// confirmation; `None` means no command was found.
pub fn parse_for_execution(response: &str) -> Option<CommandCandidate> {
    let extracted = extract(response)?;
    let formatted = format_command(&extracted);
    if formatted.is_empty() {
        return None;
    }
    Some(CommandCandidate { raw: formatted })
}
