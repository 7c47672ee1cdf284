//! Sender side: encrypt a plaintext, split the key, and emit the tokens a
//! collector scans.

use base64::Engine;
use base64::engine::general_purpose::{STANDARD as B64, URL_SAFE_NO_PAD};
use chrono::{DateTime, Utc};
use ed25519_dalek::{Signer, SigningKey};
use shardkeep_crypto::encrypt::{derive_key, encrypt_message};
use shardkeep_crypto::keys::{generate_signing_seed, random_array, random_below};
use shardkeep_crypto::split::split_secret;
use shardkeep_crypto::{SharePoint, field_prime};
use shardkeep_types::constants::PUBLIC_KEY_LEN;
use shardkeep_types::{Message, MessageWire, ShareWire, WirePayload};

use crate::error::DealError;

/// Everything a sender hands out for one secret.
#[derive(Debug, Clone)]
pub struct Deal {
    pub message: Message,
    pub points: Vec<SharePoint>,
    /// Unsigned token carrying the encrypted message.
    pub message_token: String,
    /// One signed token per point, in x order.
    pub share_tokens: Vec<String>,
}

pub struct Dealer {
    signing_key: SigningKey,
}

impl Dealer {
    /// Dealer with a fresh random signing key.
    pub fn generate() -> Self {
        Self::from_seed(generate_signing_seed())
    }

    pub fn from_seed(seed: [u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(&seed),
        }
    }

    pub fn public_key(&self) -> [u8; PUBLIC_KEY_LEN] {
        self.signing_key.verifying_key().to_bytes()
    }

    /// Encrypt `plaintext` under a random field element and split that
    /// element into `share_count` points with the given threshold.
    pub fn seal(&self, plaintext: &[u8], share_count: u32, threshold: u32) -> Result<Deal, DealError> {
        self.seal_at(plaintext, share_count, threshold, Utc::now())
    }

    pub fn seal_at(
        &self,
        plaintext: &[u8],
        share_count: u32,
        threshold: u32,
        created_at: DateTime<Utc>,
    ) -> Result<Deal, DealError> {
        let p = field_prime();
        let secret = random_below(&p);
        let points = split_secret(&secret, share_count, threshold, &p)?;

        let key = derive_key(&secret)?;
        let (ciphertext, nonce) = encrypt_message(&key, plaintext)?;

        let message = Message {
            id: URL_SAFE_NO_PAD.encode(random_array::<16>()),
            ciphertext,
            nonce: nonce.to_vec(),
            sender_public_key: self.public_key(),
            threshold,
            // Tokens carry whole seconds.
            created_at: DateTime::from_timestamp(created_at.timestamp(), 0).unwrap_or(created_at),
        };

        let message_token = Self::message_token(&message)?;
        let share_tokens = points
            .iter()
            .map(|point| self.share_token(&ShareWire::new(&message.id, &point.x, &point.y)))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Deal {
            message,
            points,
            message_token,
            share_tokens,
        })
    }

    pub fn message_token(message: &Message) -> Result<String, DealError> {
        let record = WirePayload::Message(MessageWire::from_message(message)).to_bytes()?;
        Ok(B64.encode(record))
    }

    pub fn share_token(&self, share: &ShareWire) -> Result<String, DealError> {
        let record = WirePayload::Share(share.clone()).to_bytes()?;
        Ok(self.sign_record(&record))
    }

    /// Token for arbitrary record bytes, signed exactly as given.
    pub fn sign_record(&self, record: &[u8]) -> String {
        let signature = self.signing_key.sign(record);
        format!("{}.{}", B64.encode(record), B64.encode(signature.to_bytes()))
    }
}
