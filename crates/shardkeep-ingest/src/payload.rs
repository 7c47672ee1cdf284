//! Field-by-field validation of a decoded record.
//!
//! The record comes from an untrusted scan, so nothing is read from it
//! except through the typed accessors below.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as B64;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use shardkeep_types::Message;
use shardkeep_types::constants::{NONCE_LEN, PUBLIC_KEY_LEN};

use crate::error::IngestError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Message(MessagePayload),
    Share(SharePayload),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessagePayload {
    pub id: String,
    pub ciphertext: Vec<u8>,
    pub nonce: Vec<u8>,
    pub sender_public_key: [u8; PUBLIC_KEY_LEN],
    pub threshold: u32,
    pub created_at: Option<DateTime<Utc>>,
}

/// A share's fields before authentication. The coordinates stay in their
/// wire form until the signature over them has been checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharePayload {
    pub message_id: String,
    pub x: String,
    pub y: String,
}

impl Payload {
    pub fn classify(record: &Map<String, Value>) -> Result<Self, IngestError> {
        let kind = match record.get("type") {
            Some(Value::String(kind)) => kind.as_str(),
            Some(other) => return Err(IngestError::UnknownPayloadType(other.to_string())),
            None => return Err(IngestError::UnknownPayloadType(String::new())),
        };

        match kind {
            "message" | "encryptedMessage" => MessagePayload::from_record(record).map(Payload::Message),
            "share" => SharePayload::from_record(record).map(Payload::Share),
            other => Err(IngestError::UnknownPayloadType(other.to_string())),
        }
    }
}

impl MessagePayload {
    fn from_record(record: &Map<String, Value>) -> Result<Self, IngestError> {
        let id = required_str(record, "id")?.to_string();
        let ciphertext = required_base64(record, "ciphertext")?;
        let nonce = required_base64(record, "nonce")?;
        let sender_public_key = required_base64(record, "senderPublicKey")?;
        let threshold = required_threshold(record)?;
        let created_at = optional_timestamp(record, "createdAt")?;

        if nonce.len() != NONCE_LEN {
            return Err(IngestError::InvalidField {
                field: "nonce",
                reason: format!("expected {} bytes, got {}", NONCE_LEN, nonce.len()),
            });
        }
        let key_len = sender_public_key.len();
        let sender_public_key = sender_public_key.try_into().map_err(|_| IngestError::InvalidField {
            field: "senderPublicKey",
            reason: format!("expected {} bytes, got {}", PUBLIC_KEY_LEN, key_len),
        })?;

        Ok(Self {
            id,
            ciphertext,
            nonce,
            sender_public_key,
            threshold,
            created_at,
        })
    }

    /// The stored record; a missing `createdAt` falls back to `received_at`.
    pub fn into_message(self, received_at: DateTime<Utc>) -> Message {
        Message {
            id: self.id,
            ciphertext: self.ciphertext,
            nonce: self.nonce,
            sender_public_key: self.sender_public_key,
            threshold: self.threshold,
            created_at: self.created_at.unwrap_or(received_at),
        }
    }
}

impl SharePayload {
    fn from_record(record: &Map<String, Value>) -> Result<Self, IngestError> {
        Ok(Self {
            message_id: required_str(record, "messageId")?.to_string(),
            x: required_str(record, "x")?.to_string(),
            y: required_str(record, "y")?.to_string(),
        })
    }
}

/// An absent, null or empty string field counts as missing.
fn required_str<'a>(record: &'a Map<String, Value>, field: &'static str) -> Result<&'a str, IngestError> {
    match record.get(field) {
        None | Some(Value::Null) => Err(IngestError::MissingField(field)),
        Some(Value::String(s)) if s.is_empty() => Err(IngestError::MissingField(field)),
        Some(Value::String(s)) => Ok(s),
        Some(_) => Err(IngestError::InvalidField {
            field,
            reason: "expected a string".into(),
        }),
    }
}

pub(crate) fn decode_base64_field(field: &'static str, value: &str) -> Result<Vec<u8>, IngestError> {
    B64.decode(value)
        .map_err(|e| IngestError::MalformedToken(format!("field `{}`: {}", field, e)))
}

fn required_base64(record: &Map<String, Value>, field: &'static str) -> Result<Vec<u8>, IngestError> {
    decode_base64_field(field, required_str(record, field)?)
}

fn required_threshold(record: &Map<String, Value>) -> Result<u32, IngestError> {
    let invalid = || IngestError::InvalidField {
        field: "threshold",
        reason: "expected a positive integer".into(),
    };

    match record.get("threshold") {
        None | Some(Value::Null) => Err(IngestError::MissingField("threshold")),
        Some(Value::Number(n)) => n
            .as_u64()
            .filter(|&t| t > 0)
            .and_then(|t| u32::try_from(t).ok())
            .ok_or_else(invalid),
        Some(_) => Err(invalid()),
    }
}

fn optional_timestamp(record: &Map<String, Value>, field: &'static str) -> Result<Option<DateTime<Utc>>, IngestError> {
    match record.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_i64()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .map(Some)
            .ok_or_else(|| IngestError::InvalidField {
                field,
                reason: "expected seconds since the epoch".into(),
            }),
        Some(_) => Err(IngestError::InvalidField {
            field,
            reason: "expected seconds since the epoch".into(),
        }),
    }
}
