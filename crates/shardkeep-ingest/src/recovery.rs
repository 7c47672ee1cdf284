//! Threshold-gated reconstruction and decryption.
//!
//! Exactly one share subset is tried: the `threshold` oldest scans. If the
//! tag fails, the error is returned as is.

use std::fmt;

use num_bigint::BigUint;
use shardkeep_crypto::encrypt::{decrypt_message, derive_key};
use shardkeep_crypto::{SharePoint, field_prime, reconstruct};
use shardkeep_types::{Message, Share};
use tracing::{info, warn};

use crate::error::RecoveryError;
use crate::store::Store;

/// Secret material from one recovery. Never persisted or logged.
pub struct RecoveredSecret {
    pub secret: BigUint,
    pub plaintext: Vec<u8>,
}

impl RecoveredSecret {
    pub fn plaintext_utf8(&self) -> Option<&str> {
        std::str::from_utf8(&self.plaintext).ok()
    }
}

impl fmt::Debug for RecoveredSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecoveredSecret")
            .field("secret", &"<redacted>")
            .field("plaintext_len", &self.plaintext.len())
            .finish()
    }
}

/// Collection state of one stored message.
#[derive(Debug, Clone)]
pub struct MessageProgress {
    pub message: Message,
    /// Stored shares, oldest scan first.
    pub shares: Vec<Share>,
}

impl MessageProgress {
    pub fn collected(&self) -> usize {
        self.shares.len()
    }

    pub fn ready(&self) -> bool {
        self.collected() >= self.message.threshold as usize
    }

    /// Collected shares as a percentage of the threshold, rounded to the
    /// nearest whole percent (halves up) and capped at 100.
    pub fn percent(&self) -> u8 {
        let threshold = self.message.threshold.max(1) as usize;
        let collected = self.collected().min(threshold);
        ((collected * 200 + threshold) / (threshold * 2)) as u8
    }
}

/// Recover the plaintext of a stored message from its stored shares.
pub async fn recover(store: &dyn Store, message_id: &str) -> Result<RecoveredSecret, RecoveryError> {
    let message = store
        .get_message(message_id)
        .await?
        .ok_or_else(|| RecoveryError::UnknownMessage(message_id.to_string()))?;
    let shares = store.shares_for_message(message_id).await?;

    let result = recover_with(&message, shares);
    match &result {
        Ok(_) => info!(message_id, "Message recovered"),
        Err(e) => warn!(message_id, error = %e, "Recovery failed"),
    }
    result
}

/// Select the first `threshold` shares by scan time, reconstruct, derive
/// the key and decrypt. Fails with `InsufficientShares` without touching
/// the arithmetic when too few shares are available.
pub fn recover_with(message: &Message, mut shares: Vec<Share>) -> Result<RecoveredSecret, RecoveryError> {
    let required = message.threshold;
    if shares.len() < required as usize {
        return Err(RecoveryError::InsufficientShares {
            required,
            available: shares.len(),
        });
    }

    sort_by_scan(&mut shares);
    let points: Vec<SharePoint> = shares
        .into_iter()
        .take(required as usize)
        .map(|share| SharePoint { x: share.x, y: share.y })
        .collect();

    let secret = reconstruct(&points, &field_prime())?;
    let key = derive_key(&secret)?;
    let plaintext = decrypt_message(&key, &message.nonce, &message.ciphertext)?;

    Ok(RecoveredSecret { secret, plaintext })
}

/// Progress of every stored message, in storage order.
pub async fn progress(store: &dyn Store) -> anyhow::Result<Vec<MessageProgress>> {
    let messages = store.list_messages().await?;
    let mut shares = store.list_shares().await?;
    sort_by_scan(&mut shares);

    Ok(messages
        .into_iter()
        .map(|message| {
            let shares = shares
                .iter()
                .filter(|s| s.message_id == message.id)
                .cloned()
                .collect();
            MessageProgress { message, shares }
        })
        .collect())
}

fn sort_by_scan(shares: &mut [Share]) {
    shares.sort_by(|a, b| a.scanned_at.cmp(&b.scanned_at).then_with(|| a.x.cmp(&b.x)));
}
