use chrono::{DateTime, Utc};
use num_bigint::BigUint;

use crate::constants::PUBLIC_KEY_LEN;

/// An encrypted payload distributed by a sender.
///
/// `id` is the only identity: storing a second record with the same id
/// replaces the first one wholesale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: String,
    pub ciphertext: Vec<u8>,
    pub nonce: Vec<u8>,
    pub sender_public_key: [u8; PUBLIC_KEY_LEN],
    pub threshold: u32,
    pub created_at: DateTime<Utc>,
}

/// One authenticated point (x, y) on a sender's sharing polynomial.
///
/// Identity is `(message_id, x)`. A share only exists once its signature
/// has been checked against the referenced message's sender key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Share {
    pub message_id: String,
    pub x: BigUint,
    pub y: BigUint,
    pub scanned_at: DateTime<Utc>,
}

impl Share {
    /// `x` rendered the way collectors display it.
    pub fn x_hex(&self) -> String {
        format!("0x{:x}", self.x)
    }
}
