//! The ingestion state machine.
//!
//! One token is processed to completion before the next is considered:
//! a second `ingest` while the first is suspended on storage returns
//! `Busy` without touching anything. Tokens are remembered only after they
//! were stored, so a failed scan can be retried once corrected (or once
//! the message a share refers to has arrived).

use std::collections::HashSet;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::Utc;
use num_bigint::BigUint;
use num_traits::Zero;
use shardkeep_crypto::field_prime;
use shardkeep_crypto::signature::verify_signature;
use shardkeep_types::Share;
use tracing::{debug, info, warn};

use crate::codec::{DecodedToken, decode_token};
use crate::error::IngestError;
use crate::guard::FlagGuard;
use crate::payload::{MessagePayload, Payload, SharePayload, decode_base64_field};
use crate::store::Store;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    MessageStored { id: String },
    ShareStored { message_id: String, x: BigUint },
    /// The exact token was stored before; nothing was done.
    Duplicate,
    /// Another ingestion is in flight; nothing was done.
    Busy,
}

pub struct IngestSession {
    store: Arc<dyn Store>,
    prime: BigUint,
    seen: Mutex<HashSet<String>>,
    busy: AtomicBool,
}

impl IngestSession {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            prime: field_prime(),
            seen: Mutex::new(HashSet::new()),
            busy: AtomicBool::new(false),
        }
    }

    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    /// Whether this exact token string has already been stored.
    pub fn has_seen(&self, token: &str) -> bool {
        self.seen.lock().unwrap_or_else(PoisonError::into_inner).contains(token)
    }

    pub fn seen_count(&self) -> usize {
        self.seen.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Forget every remembered token, e.g. after the store was cleared.
    pub fn forget_seen(&self) {
        self.seen.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }

    pub async fn ingest(&self, token: &str) -> Result<IngestOutcome, IngestError> {
        if self.has_seen(token) {
            return Ok(IngestOutcome::Duplicate);
        }

        let Some(_busy) = FlagGuard::acquire(&self.busy) else {
            debug!("Ingestion already in flight, skipping token");
            return Ok(IngestOutcome::Busy);
        };

        let outcome = self.process(token).await?;
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(token.to_string());
        Ok(outcome)
    }

    async fn process(&self, token: &str) -> Result<IngestOutcome, IngestError> {
        let decoded = decode_token(token)?;

        match Payload::classify(decoded.record())? {
            Payload::Message(message) => self.accept_message(message).await,
            Payload::Share(share) => self.accept_share(&decoded, share).await,
        }
    }

    async fn accept_message(&self, payload: MessagePayload) -> Result<IngestOutcome, IngestError> {
        let message = payload.into_message(Utc::now());
        let id = message.id.clone();
        let threshold = message.threshold;

        self.store.put_message(message).await?;

        info!(message_id = %id, threshold, "Encrypted message stored");
        Ok(IngestOutcome::MessageStored { id })
    }

    async fn accept_share(
        &self,
        decoded: &DecodedToken,
        payload: SharePayload,
    ) -> Result<IngestOutcome, IngestError> {
        let signature = decoded.signature().ok_or(IngestError::MissingSignature)?;

        let message = self
            .store
            .get_message(&payload.message_id)
            .await?
            .ok_or_else(|| IngestError::UnknownMessage(payload.message_id.clone()))?;

        let valid = verify_signature(
            &message.sender_public_key,
            decoded.signed_region().as_bytes(),
            signature,
        )
        .map_err(|_| IngestError::MalformedKeyOrSignature)?;

        if !valid {
            warn!(message_id = %payload.message_id, "Share signature rejected, share discarded");
            return Err(IngestError::InvalidSignature);
        }
        debug!(message_id = %payload.message_id, "Share signature verified");

        let x = self.coordinate("x", &payload.x)?;
        if x.is_zero() {
            return Err(IngestError::OutOfRange("x"));
        }
        let y = self.coordinate("y", &payload.y)?;

        let share = Share {
            message_id: payload.message_id,
            x: x.clone(),
            y,
            scanned_at: Utc::now(),
        };
        let message_id = share.message_id.clone();
        let x_hex = share.x_hex();
        self.store.put_share(share).await?;

        info!(message_id = %message_id, x = %x_hex, "Share stored");
        Ok(IngestOutcome::ShareStored { message_id, x })
    }

    /// Big-endian coordinate, which must be a field element.
    fn coordinate(&self, field: &'static str, encoded: &str) -> Result<BigUint, IngestError> {
        let value = BigUint::from_bytes_be(&decode_base64_field(field, encoded)?);
        if value >= self.prime {
            return Err(IngestError::OutOfRange(field));
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use async_trait::async_trait;
    use shardkeep_types::Message;
    use tokio::sync::Notify;

    use crate::dealer::Dealer;

    /// Store whose reads park until released, to hold an ingestion in flight.
    struct ParkedStore {
        release: Notify,
    }

    #[async_trait]
    impl Store for ParkedStore {
        async fn put_message(&self, _message: Message) -> anyhow::Result<()> {
            self.release.notified().await;
            Ok(())
        }
        async fn get_message(&self, _id: &str) -> anyhow::Result<Option<Message>> {
            Ok(None)
        }
        async fn list_messages(&self) -> anyhow::Result<Vec<Message>> {
            Ok(vec![])
        }
        async fn put_share(&self, _share: Share) -> anyhow::Result<()> {
            Ok(())
        }
        async fn shares_for_message(&self, _message_id: &str) -> anyhow::Result<Vec<Share>> {
            Ok(vec![])
        }
        async fn list_shares(&self) -> anyhow::Result<Vec<Share>> {
            Ok(vec![])
        }
        async fn clear(&self) -> anyhow::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn second_ingest_while_suspended_is_busy() {
        let store = Arc::new(ParkedStore { release: Notify::new() });
        let session = Arc::new(IngestSession::new(store.clone()));
        let deal = Dealer::from_seed([1u8; 32]).seal(b"hi", 2, 2).unwrap();

        let first = {
            let session = session.clone();
            let token = deal.message_token.clone();
            tokio::spawn(async move { session.ingest(&token).await })
        };

        // Let the first ingestion reach the parked write.
        while !session.busy.load(std::sync::atomic::Ordering::Acquire) {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }

        let second = session.ingest(&deal.share_tokens[0]).await.unwrap();
        assert_eq!(second, IngestOutcome::Busy);

        store.release.notify_one();
        let first = first.await.unwrap().unwrap();
        assert!(matches!(first, IngestOutcome::MessageStored { .. }));

        // Busy tokens were not remembered.
        assert!(!session.has_seen(&deal.share_tokens[0]));
        assert!(session.has_seen(&deal.message_token));
    }
}
