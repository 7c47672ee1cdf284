use base64::Engine;
use base64::engine::general_purpose::STANDARD as B64;
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

use crate::models::Message;

/// Structured record carried in the first segment of a scanned token.
///
/// Senders serialize this; the collector never deserializes straight into it
/// because untrusted input has to be checked field by field first.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WirePayload {
    #[serde(rename = "message", alias = "encryptedMessage")]
    Message(MessageWire),
    #[serde(rename = "share")]
    Share(ShareWire),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageWire {
    pub id: String,
    pub ciphertext: String,
    pub nonce: String,
    pub sender_public_key: String,
    pub created_at: i64,
    pub threshold: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareWire {
    pub message_id: String,
    pub x: String,
    pub y: String,
}

impl MessageWire {
    pub fn from_message(message: &Message) -> Self {
        Self {
            id: message.id.clone(),
            ciphertext: B64.encode(&message.ciphertext),
            nonce: B64.encode(&message.nonce),
            sender_public_key: B64.encode(message.sender_public_key),
            created_at: message.created_at.timestamp(),
            threshold: message.threshold,
        }
    }
}

impl ShareWire {
    /// Encode a point as minimal big-endian integers (zero is a single 0x00 byte).
    pub fn new(message_id: &str, x: &BigUint, y: &BigUint) -> Self {
        Self {
            message_id: message_id.to_string(),
            x: B64.encode(x.to_bytes_be()),
            y: B64.encode(y.to_bytes_be()),
        }
    }
}

impl WirePayload {
    /// Compact JSON, the exact bytes a sender signs.
    pub fn to_bytes(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }
}
