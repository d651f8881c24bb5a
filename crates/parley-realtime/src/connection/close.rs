//! Close reasons and their WebSocket close codes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Why the server closed a connection.
///
/// Business-rule rejections use application codes (3000–4999) so clients
/// can tell them apart from protocol-level closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CloseReason {
    /// No usable identity on the connection.
    AuthMissing,
    /// Chat id malformed or chat absent.
    ChatNotFound,
    /// Caller is not a member of the chat.
    UnauthorizedAccess,
    /// Inbound payload failed validation.
    InvalidMessage,
    /// Session store or storage backend failed during setup.
    ServerError,
    /// The server is shutting down.
    GoingAway,
}

impl CloseReason {
    /// Machine-readable close code.
    pub fn code(&self) -> u16 {
        match self {
            Self::AuthMissing => 4003,
            Self::ChatNotFound => 3003,
            Self::UnauthorizedAccess => 4004,
            Self::InvalidMessage => 3001,
            Self::ServerError => 1011,
            Self::GoingAway => 1001,
        }
    }

    /// Short human-readable reason sent in the close frame.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::AuthMissing => "authentication required",
            Self::ChatNotFound => "chat not found",
            Self::UnauthorizedAccess => "not a member of this chat",
            Self::InvalidMessage => "invalid message",
            Self::ServerError => "internal error",
            Self::GoingAway => "server shutting down",
        }
    }
}

impl fmt::Display for CloseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.reason(), self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_codes_are_distinct() {
        let all = [
            CloseReason::AuthMissing,
            CloseReason::ChatNotFound,
            CloseReason::UnauthorizedAccess,
            CloseReason::InvalidMessage,
            CloseReason::ServerError,
            CloseReason::GoingAway,
        ];
        let codes: HashSet<u16> = all.iter().map(CloseReason::code).collect();
        assert_eq!(codes.len(), all.len());
        assert_eq!(CloseReason::AuthMissing.code(), 4003);
        assert_eq!(CloseReason::InvalidMessage.code(), 3001);
    }
}
