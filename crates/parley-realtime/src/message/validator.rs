//! Frame and topic validation rules.

use parley_core::error::AppError;

/// Maximum topic name length.
const MAX_TOPIC_LENGTH: usize = 128;

/// Validates a raw inbound frame before it is parsed.
pub fn validate_inbound(raw: &str, max_bytes: usize) -> Result<(), AppError> {
    if raw.len() > max_bytes {
        return Err(AppError::validation(format!(
            "Message exceeds maximum size of {max_bytes} bytes"
        )));
    }

    if raw.trim().is_empty() {
        return Err(AppError::validation("Empty message"));
    }

    Ok(())
}

/// Validates topic name format.
pub fn validate_topic_name(topic: &str) -> Result<(), AppError> {
    if topic.is_empty() || topic.len() > MAX_TOPIC_LENGTH {
        return Err(AppError::validation("Invalid topic name length"));
    }

    if !topic
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_')
    {
        return Err(AppError::validation("Topic name contains invalid characters"));
    }

    Ok(())
}
