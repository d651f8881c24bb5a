//! Inbound message payload and its validation rules.

use serde::{Deserialize, Serialize};
use validator::Validate;

use parley_core::error::AppError;

use super::model::MessageKind;

/// Maximum message body length, in characters.
pub const MAX_CONTENT_LENGTH: u64 = 4096;

/// Payload a client sends to post a message into a chat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct NewMessage {
    /// Content kind.
    #[serde(rename = "type")]
    pub kind: MessageKind,
    /// Text body or media reference.
    #[validate(length(min = 1, max = 4096))]
    pub content: String,
}

impl NewMessage {
    /// Parse and validate a raw JSON payload.
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        let payload: NewMessage = serde_json::from_str(raw)
            .map_err(|e| AppError::validation(format!("Malformed message payload: {e}")))?;
        payload.check()?;
        Ok(payload)
    }

    /// Run field validation.
    pub fn check(&self) -> Result<(), AppError> {
        self.validate()
            .map_err(|e| AppError::validation(format!("Invalid message: {e}")))?;
        if self.content.trim().is_empty() {
            return Err(AppError::validation("Invalid message: content is blank"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_text() {
        let msg = NewMessage::parse(r#"{"type":"TEXT","content":"hello"}"#).unwrap();
        assert_eq!(msg.kind, MessageKind::Text);
        assert_eq!(msg.content, "hello");
    }

    #[test]
    fn test_rejects_unknown_kind() {
        let err = NewMessage::parse(r#"{"type":"STICKER","content":"x"}"#).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_rejects_blank_and_oversized_content() {
        assert!(NewMessage::parse(r#"{"type":"TEXT","content":""}"#).is_err());
        assert!(NewMessage::parse(r#"{"type":"TEXT","content":"   "}"#).is_err());
        let long = "a".repeat(MAX_CONTENT_LENGTH as usize + 1);
        let raw = serde_json::json!({"type": "TEXT", "content": long}).to_string();
        assert!(NewMessage::parse(&raw).is_err());
    }

    #[test]
    fn test_extra_fields_are_dropped() {
        let msg =
            NewMessage::parse(r#"{"type":"TEXT","content":"x","chat_id":1,"temp_id":"c-17"}"#)
                .unwrap();
        assert_eq!(
            msg,
            NewMessage {
                kind: MessageKind::Text,
                content: "x".to_string(),
            }
        );
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            serde_json::json!({"type": "TEXT", "content": "x"})
        );
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(NewMessage::parse("not json").is_err());
        assert!(NewMessage::parse(r#"{"content":"x"}"#).is_err());
    }
}
