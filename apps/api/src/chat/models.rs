//! Wire types for the chat endpoint.
//!
//! Conversation history lives entirely on the caller side; this service
//! truncates what it receives and never persists any of it.

use serde::{Deserialize, Serialize};

/// Hard cap on a single message (and on each history entry's content).
pub const MAX_MESSAGE_CHARS: usize = 2_000;
/// History entries kept, counted from the end.
pub const HISTORY_LIMIT: usize = 20;
/// Cap on the optional freeform context string.
pub const MAX_CONTEXT_CHARS: usize = 4_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationMessage {
    pub role: Role,
    pub content: String,
    /// Epoch milliseconds, caller-supplied.
    #[serde(default)]
    pub timestamp: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub history: Vec<ConversationMessage>,
    #[serde(default)]
    pub context: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
    /// Epoch milliseconds.
    pub timestamp: i64,
}

/// Keeps the most recent `HISTORY_LIMIT` entries and clamps each entry's
/// content to `MAX_MESSAGE_CHARS` characters.
pub fn normalize_history(history: Vec<ConversationMessage>) -> Vec<ConversationMessage> {
    let skip = history.len().saturating_sub(HISTORY_LIMIT);
    history
        .into_iter()
        .skip(skip)
        .map(|mut message| {
            message.content = clamp_chars(message.content, MAX_MESSAGE_CHARS);
            message
        })
        .collect()
}

/// Truncates an owned string to at most `max_chars` characters.
pub fn clamp_chars(text: String, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => {
            let mut clamped = text;
            clamped.truncate(idx);
            clamped
        }
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(role: Role, content: &str) -> ConversationMessage {
        ConversationMessage {
            role,
            content: content.to_string(),
            timestamp: None,
        }
    }

    #[test]
    fn test_role_serde_is_lowercase() {
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), r#""user""#);
        assert_eq!(serde_json::to_string(&Role::Model).unwrap(), r#""model""#);
        let role: Role = serde_json::from_str(r#""model""#).unwrap();
        assert_eq!(role, Role::Model);
    }

    #[test]
    fn test_normalize_history_keeps_most_recent_entries() {
        let history: Vec<_> = (0..30)
            .map(|i| message(Role::User, &format!("message {i}")))
            .collect();
        let normalized = normalize_history(history);
        assert_eq!(normalized.len(), HISTORY_LIMIT);
        assert_eq!(normalized[0].content, "message 10");
        assert_eq!(normalized.last().unwrap().content, "message 29");
    }

    #[test]
    fn test_normalize_history_clamps_long_entries() {
        let history = vec![message(Role::User, &"x".repeat(5_000))];
        let normalized = normalize_history(history);
        assert_eq!(normalized[0].content.chars().count(), MAX_MESSAGE_CHARS);
    }

    #[test]
    fn test_clamp_chars_short_string_untouched() {
        assert_eq!(clamp_chars("short".to_string(), 100), "short");
    }

    #[test]
    fn test_chat_request_defaults_optional_fields() {
        let request: ChatRequest =
            serde_json::from_str(r#"{"message": "hello"}"#).unwrap();
        assert!(request.history.is_empty());
        assert!(request.context.is_none());
    }

    #[test]
    fn test_chat_response_omits_absent_job_id() {
        let response = ChatResponse {
            response: "hi".to_string(),
            job_id: None,
            timestamp: 1_700_000_000_000,
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(!json.contains("job_id"));
    }
}
