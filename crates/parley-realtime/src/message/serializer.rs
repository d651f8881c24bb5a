//! JSON serialization for client frames.

use super::types::OutboundMessage;

/// Serialize an outbound frame to JSON text.
pub fn serialize_outbound(msg: &OutboundMessage) -> Result<String, serde_json::Error> {
    serde_json::to_string(msg)
}
