//! Scanned token format.
//!
//! ```text
//! base64(json record)                      message
//! base64(json record) "." base64(sig)      share
//! ```
//!
//! Standard alphabet with padding. The decoded first segment is kept
//! byte-for-byte in a `SignedRegion`: that span, and only that span, is what
//! the sender signed.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as B64;
use serde_json::{Map, Value};

use crate::error::IngestError;

/// The untouched decoded bytes of a token's first segment.
///
/// Only the codec can build one, so a signature can never be checked
/// against a re-serialized record by mistake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRegion(Vec<u8>);

impl SignedRegion {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

#[derive(Debug, Clone)]
pub struct DecodedToken {
    record: Map<String, Value>,
    signed: SignedRegion,
    signature: Option<Vec<u8>>,
}

impl DecodedToken {
    /// The parsed structured record. Nothing in it has been validated.
    pub fn record(&self) -> &Map<String, Value> {
        &self.record
    }

    pub fn signed_region(&self) -> &SignedRegion {
        &self.signed
    }

    pub fn signature(&self) -> Option<&[u8]> {
        self.signature.as_deref()
    }
}

pub fn decode_token(token: &str) -> Result<DecodedToken, IngestError> {
    let mut segments = token.split('.');
    let record_b64 = segments.next().unwrap_or_default();
    let signature_b64 = segments.next();
    if segments.next().is_some() {
        return Err(IngestError::MalformedToken("more than two segments".into()));
    }

    let signed = B64
        .decode(record_b64)
        .map_err(|e| IngestError::MalformedToken(format!("record segment: {}", e)))?;

    let record = match serde_json::from_slice::<Value>(&signed) {
        Ok(Value::Object(map)) => map,
        Ok(_) => return Err(IngestError::MalformedToken("record is not a JSON object".into())),
        Err(e) => return Err(IngestError::MalformedToken(format!("record JSON: {}", e))),
    };

    // A trailing "." with nothing after it carries no signature.
    let signature = signature_b64
        .filter(|s| !s.is_empty())
        .map(|s| B64.decode(s))
        .transpose()
        .map_err(|e| IngestError::MalformedToken(format!("signature segment: {}", e)))?;

    Ok(DecodedToken {
        record,
        signed: SignedRegion(signed),
        signature,
    })
}
