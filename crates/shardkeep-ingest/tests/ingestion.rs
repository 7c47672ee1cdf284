use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as B64;
use num_bigint::BigUint;
use shardkeep_crypto::field_prime;
use shardkeep_db::Database;
use shardkeep_ingest::{
    Dealer, IngestError, IngestOutcome, IngestSession, RecoveryError, SqliteStore, Store, progress, recover,
};
use shardkeep_types::{Message, Share, ShareWire};

fn sqlite_store() -> Arc<SqliteStore> {
    Arc::new(SqliteStore::new(Database::open_in_memory().unwrap()))
}

fn session_over(store: Arc<SqliteStore>) -> IngestSession {
    IngestSession::new(store)
}

#[tokio::test]
async fn message_then_shares_are_stored() {
    let store = sqlite_store();
    let session = session_over(store.clone());
    let deal = Dealer::generate().seal(b"meet at noon", 3, 2).unwrap();

    let outcome = session.ingest(&deal.message_token).await.unwrap();
    assert_eq!(outcome, IngestOutcome::MessageStored { id: deal.message.id.clone() });

    let outcome = session.ingest(&deal.share_tokens[0]).await.unwrap();
    assert_eq!(
        outcome,
        IngestOutcome::ShareStored {
            message_id: deal.message.id.clone(),
            x: BigUint::from(1u32),
        }
    );

    let stored = store.get_message(&deal.message.id).await.unwrap().unwrap();
    assert_eq!(stored, deal.message);
    let shares = store.shares_for_message(&deal.message.id).await.unwrap();
    assert_eq!(shares.len(), 1);
    assert_eq!(shares[0].y, deal.points[0].y);
}

#[tokio::test]
async fn duplicate_token_is_a_no_op() {
    let store = sqlite_store();
    let session = session_over(store.clone());
    let deal = Dealer::generate().seal(b"x", 2, 2).unwrap();

    session.ingest(&deal.message_token).await.unwrap();
    session.ingest(&deal.share_tokens[1]).await.unwrap();
    let again = session.ingest(&deal.share_tokens[1]).await.unwrap();

    assert_eq!(again, IngestOutcome::Duplicate);
    assert_eq!(session.seen_count(), 2);
    assert_eq!(store.list_shares().await.unwrap().len(), 1);
}

#[tokio::test]
async fn share_before_its_message_can_be_retried() {
    let session = session_over(sqlite_store());
    let deal = Dealer::generate().seal(b"x", 2, 2).unwrap();

    let err = session.ingest(&deal.share_tokens[0]).await.unwrap_err();
    assert!(matches!(err, IngestError::UnknownMessage(ref id) if *id == deal.message.id));
    assert!(!session.has_seen(&deal.share_tokens[0]));

    session.ingest(&deal.message_token).await.unwrap();
    let outcome = session.ingest(&deal.share_tokens[0]).await.unwrap();
    assert!(matches!(outcome, IngestOutcome::ShareStored { .. }));
}

#[tokio::test]
async fn tampered_share_is_rejected_and_not_stored() {
    let store = sqlite_store();
    let session = session_over(store.clone());
    let deal = Dealer::generate().seal(b"x", 2, 2).unwrap();
    session.ingest(&deal.message_token).await.unwrap();

    // Swap only the y value; every other byte and the signature stay put.
    let (record, signature) = deal.share_tokens[0].split_once('.').unwrap();
    let record = String::from_utf8(B64.decode(record).unwrap()).unwrap();
    let y_field = format!(r#""y":"{}""#, B64.encode(deal.points[0].y.to_bytes_be()));
    let forged_field = format!(r#""y":"{}""#, B64.encode((&deal.points[0].y + 1u32).to_bytes_be()));
    assert_eq!(record.matches(&y_field).count(), 1);
    let forged_record = record.replace(&y_field, &forged_field);
    let forged = format!("{}.{}", B64.encode(&forged_record), signature);

    // Re-encoding the untouched record reproduces the dealt token exactly.
    let untouched = format!("{}.{}", B64.encode(&record), signature);
    assert_eq!(untouched, deal.share_tokens[0]);

    let err = session.ingest(&forged).await.unwrap_err();
    assert!(matches!(err, IngestError::InvalidSignature));
    assert!(store.list_shares().await.unwrap().is_empty());

    // The same bytes with the signed y are accepted.
    assert!(matches!(
        session.ingest(&untouched).await,
        Ok(IngestOutcome::ShareStored { .. })
    ));
}

#[tokio::test]
async fn share_signed_by_another_key_is_rejected() {
    let session = session_over(sqlite_store());
    let deal = Dealer::generate().seal(b"x", 2, 2).unwrap();
    session.ingest(&deal.message_token).await.unwrap();

    let impostor = Dealer::generate();
    let point = &deal.points[0];
    let token = impostor
        .share_token(&ShareWire::new(&deal.message.id, &point.x, &point.y))
        .unwrap();

    assert!(matches!(
        session.ingest(&token).await,
        Err(IngestError::InvalidSignature)
    ));
}

#[tokio::test]
async fn unsigned_share_is_refused() {
    let session = session_over(sqlite_store());
    let deal = Dealer::generate().seal(b"x", 2, 2).unwrap();
    session.ingest(&deal.message_token).await.unwrap();

    let (record, _) = deal.share_tokens[0].split_once('.').unwrap();
    assert!(matches!(
        session.ingest(record).await,
        Err(IngestError::MissingSignature)
    ));
    assert!(matches!(
        session.ingest(&format!("{}.", record)).await,
        Err(IngestError::MissingSignature)
    ));
}

#[tokio::test]
async fn malformed_records_leave_state_intact() {
    let store = sqlite_store();
    let session = session_over(store.clone());
    let deal = Dealer::generate().seal(b"x", 2, 2).unwrap();
    session.ingest(&deal.message_token).await.unwrap();

    let missing_id = B64.encode(br#"{"type":"message","ciphertext":"AA==","nonce":"AA==","senderPublicKey":"AA==","threshold":2}"#);
    assert!(matches!(
        session.ingest(&missing_id).await,
        Err(IngestError::MissingField("id"))
    ));

    let unknown = B64.encode(br#"{"type":"bogus"}"#);
    assert!(matches!(
        session.ingest(&unknown).await,
        Err(IngestError::UnknownPayloadType(ref t)) if t == "bogus"
    ));

    assert!(matches!(
        session.ingest("a.b.c").await,
        Err(IngestError::MalformedToken(_))
    ));

    assert_eq!(store.list_messages().await.unwrap(), vec![deal.message.clone()]);
    assert!(store.list_shares().await.unwrap().is_empty());
    assert_eq!(session.seen_count(), 1);
}

#[tokio::test]
async fn coordinates_outside_the_field_are_refused() {
    let store = sqlite_store();
    let session = session_over(store.clone());
    let dealer = Dealer::generate();
    let deal = dealer.seal(b"x", 2, 2).unwrap();
    session.ingest(&deal.message_token).await.unwrap();

    let zero_x = dealer
        .share_token(&ShareWire::new(&deal.message.id, &BigUint::from(0u8), &BigUint::from(7u8)))
        .unwrap();
    assert!(matches!(
        session.ingest(&zero_x).await,
        Err(IngestError::OutOfRange("x"))
    ));

    let big_x = dealer
        .share_token(&ShareWire::new(&deal.message.id, &field_prime(), &BigUint::from(7u8)))
        .unwrap();
    assert!(matches!(
        session.ingest(&big_x).await,
        Err(IngestError::OutOfRange("x"))
    ));

    let wrapped_x = dealer
        .share_token(&ShareWire::new(&deal.message.id, &(field_prime() + 1u32), &BigUint::from(7u8)))
        .unwrap();
    assert!(matches!(
        session.ingest(&wrapped_x).await,
        Err(IngestError::OutOfRange("x"))
    ));

    let big_y = dealer
        .share_token(&ShareWire::new(&deal.message.id, &BigUint::from(3u8), &field_prime()))
        .unwrap();
    assert!(matches!(
        session.ingest(&big_y).await,
        Err(IngestError::OutOfRange("y"))
    ));

    assert!(store.list_shares().await.unwrap().is_empty());
}

#[tokio::test]
async fn padded_x_names_the_same_share() {
    let store = sqlite_store();
    let session = session_over(store.clone());
    let dealer = Dealer::generate();
    let deal = dealer.seal(b"x", 2, 2).unwrap();
    session.ingest(&deal.message_token).await.unwrap();
    session.ingest(&deal.share_tokens[0]).await.unwrap();

    let record = format!(
        r#"{{"type":"share","messageId":"{}","x":"{}","y":"{}"}}"#,
        deal.message.id,
        B64.encode([0u8, 1]),
        B64.encode(deal.points[0].y.to_bytes_be()),
    );
    let token = dealer.sign_record(record.as_bytes());
    assert!(matches!(
        session.ingest(&token).await,
        Ok(IngestOutcome::ShareStored { .. })
    ));
    assert_eq!(store.list_shares().await.unwrap().len(), 1);
}

struct FailingStore;

#[async_trait]
impl Store for FailingStore {
    async fn put_message(&self, _message: Message) -> anyhow::Result<()> {
        anyhow::bail!("disk full")
    }
    async fn get_message(&self, _id: &str) -> anyhow::Result<Option<Message>> {
        anyhow::bail!("disk full")
    }
    async fn list_messages(&self) -> anyhow::Result<Vec<Message>> {
        anyhow::bail!("disk full")
    }
    async fn put_share(&self, _share: Share) -> anyhow::Result<()> {
        anyhow::bail!("disk full")
    }
    async fn shares_for_message(&self, _message_id: &str) -> anyhow::Result<Vec<Share>> {
        anyhow::bail!("disk full")
    }
    async fn list_shares(&self) -> anyhow::Result<Vec<Share>> {
        anyhow::bail!("disk full")
    }
    async fn clear(&self) -> anyhow::Result<()> {
        anyhow::bail!("disk full")
    }
}

#[tokio::test]
async fn storage_errors_pass_through() {
    let session = IngestSession::new(Arc::new(FailingStore));
    let deal = Dealer::generate().seal(b"x", 2, 2).unwrap();

    let err = session.ingest(&deal.message_token).await.unwrap_err();
    assert!(matches!(err, IngestError::Storage(_)));
    assert_eq!(err.to_string(), "disk full");
    assert!(!session.has_seen(&deal.message_token));

    assert!(matches!(
        recover(&FailingStore, &deal.message.id).await,
        Err(RecoveryError::Storage(_))
    ));
}

#[tokio::test]
async fn scanned_shares_recover_the_plaintext() {
    let store = sqlite_store();
    let session = session_over(store.clone());
    let deal = Dealer::generate().seal("über secret".as_bytes(), 5, 3).unwrap();

    session.ingest(&deal.message_token).await.unwrap();
    for token in &deal.share_tokens[..2] {
        session.ingest(token).await.unwrap();
    }

    match recover(store.as_ref(), &deal.message.id).await {
        Err(RecoveryError::InsufficientShares { required, available }) => {
            assert_eq!((required, available), (3, 2));
        }
        other => panic!("unexpected {:?}", other),
    }
    let listed = progress(store.as_ref()).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].collected(), 2);
    let xs: Vec<String> = listed[0].shares.iter().map(|s| s.x_hex()).collect();
    assert_eq!(xs, vec!["0x1", "0x2"]);
    assert!(!listed[0].ready());

    session.ingest(&deal.share_tokens[4]).await.unwrap();
    let recovered = recover(store.as_ref(), &deal.message.id).await.unwrap();
    assert_eq!(recovered.plaintext_utf8(), Some("über secret"));
}

#[tokio::test]
async fn unknown_message_cannot_be_recovered() {
    let store = sqlite_store();
    assert!(matches!(
        recover(store.as_ref(), "nope").await,
        Err(RecoveryError::UnknownMessage(ref id)) if id == "nope"
    ));
}

#[tokio::test]
async fn shares_from_another_deal_fail_authentication() {
    let store = sqlite_store();
    let session = session_over(store.clone());
    let dealer = Dealer::generate();
    let deal = dealer.seal(b"x", 2, 2).unwrap();
    let other = dealer.seal(b"y", 2, 2).unwrap();

    session.ingest(&deal.message_token).await.unwrap();
    for point in &other.points {
        let token = dealer
            .share_token(&ShareWire::new(&deal.message.id, &point.x, &point.y))
            .unwrap();
        session.ingest(&token).await.unwrap();
    }

    assert!(matches!(
        recover(store.as_ref(), &deal.message.id).await,
        Err(RecoveryError::AuthenticationFailed)
    ));
}

#[tokio::test]
async fn clear_removes_everything() {
    let store = sqlite_store();
    let session = session_over(store.clone());
    let deal = Dealer::generate().seal(b"x", 2, 2).unwrap();
    session.ingest(&deal.message_token).await.unwrap();
    session.ingest(&deal.share_tokens[0]).await.unwrap();

    store.clear().await.unwrap();
    session.forget_seen();

    assert!(store.list_messages().await.unwrap().is_empty());
    assert!(store.list_shares().await.unwrap().is_empty());
    assert!(matches!(
        session.ingest(&deal.message_token).await,
        Ok(IngestOutcome::MessageStored { .. })
    ));
}
