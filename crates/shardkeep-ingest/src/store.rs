use std::sync::Arc;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use shardkeep_db::Database;
use shardkeep_types::{Message, Share};
use tracing::error;

/// Storage collaborator: a `messages` collection keyed by id and a `shares`
/// collection keyed by `(message_id, x)`. Puts are upserts. Errors are
/// passed through to callers unchanged.
#[async_trait]
pub trait Store: Send + Sync {
    async fn put_message(&self, message: Message) -> Result<()>;
    async fn get_message(&self, id: &str) -> Result<Option<Message>>;
    async fn list_messages(&self) -> Result<Vec<Message>>;

    async fn put_share(&self, share: Share) -> Result<()>;
    async fn shares_for_message(&self, message_id: &str) -> Result<Vec<Share>>;
    async fn list_shares(&self) -> Result<Vec<Share>>;

    /// Remove every message and share.
    async fn clear(&self) -> Result<()>;
}

/// `Store` over the SQLite database, with every query moved off the async
/// runtime.
#[derive(Clone)]
pub struct SqliteStore {
    db: Arc<Database>,
}

impl SqliteStore {
    pub fn new(db: Database) -> Self {
        Self { db: Arc::new(db) }
    }

    async fn blocking<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Database) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let db = self.db.clone();
        tokio::task::spawn_blocking(move || f(&db))
            .await
            .map_err(|e| {
                error!("spawn_blocking join error: {}", e);
                anyhow!("storage task failed: {}", e)
            })?
    }
}

#[async_trait]
impl Store for SqliteStore {
    async fn put_message(&self, message: Message) -> Result<()> {
        self.blocking(move |db| db.put_message(&message)).await
    }

    async fn get_message(&self, id: &str) -> Result<Option<Message>> {
        let id = id.to_string();
        self.blocking(move |db| db.get_message(&id)).await
    }

    async fn list_messages(&self) -> Result<Vec<Message>> {
        self.blocking(|db| db.list_messages()).await
    }

    async fn put_share(&self, share: Share) -> Result<()> {
        self.blocking(move |db| db.put_share(&share)).await
    }

    async fn shares_for_message(&self, message_id: &str) -> Result<Vec<Share>> {
        let message_id = message_id.to_string();
        self.blocking(move |db| db.shares_for_message(&message_id)).await
    }

    async fn list_shares(&self) -> Result<Vec<Share>> {
        self.blocking(|db| db.list_shares()).await
    }

    async fn clear(&self) -> Result<()> {
        self.blocking(|db| db.clear()).await
    }
}
