//! Wire types for the agent service HTTP API

use serde::{Deserialize, Serialize};

/// A single chat message in a generate request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Role of the sender ("user")
    pub role: String,
    /// Message text
    pub content: String,
}

impl Message {
    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Message {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Request body for the generate and stream endpoints
#[derive(Debug, Clone, Serialize)]
pub struct GenerateRequest {
    /// Conversation messages; a single user message per invocation
    pub messages: Vec<Message>,
    /// Correlation key for context continuity on the agent side
    #[serde(rename = "threadId", skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<String>,
}

/// Response body of the blocking generate endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateResponse {
    /// Full reply text
    pub text: String,
}

/// A single decoded part of the streaming response
#[derive(Debug, Clone, Deserialize)]
pub struct StreamPart {
    /// Text increment, absent for non-text parts
    #[serde(default)]
    pub text: Option<String>,
}
