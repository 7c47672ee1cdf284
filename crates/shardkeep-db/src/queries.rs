use crate::Database;
use crate::models::{MessageRow, ShareRow};
use anyhow::{Result, anyhow};
use chrono::DateTime;
use num_bigint::BigUint;
use rusqlite::{Connection, Row};
use shardkeep_types::{Message, Share};

impl Database {
    // -- Messages --

    /// Insert or wholesale replace the message with the same id.
    pub fn put_message(&self, message: &Message) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT OR REPLACE INTO messages (id, ciphertext, nonce, sender_public_key, threshold, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![
                    message.id,
                    message.ciphertext,
                    message.nonce,
                    &message.sender_public_key[..],
                    message.threshold,
                    message.created_at.timestamp(),
                ],
            )?;
            Ok(())
        })
    }

    pub fn get_message(&self, id: &str) -> Result<Option<Message>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT id, ciphertext, nonce, sender_public_key, threshold, created_at
                     FROM messages WHERE id = ?1",
                    [id],
                    message_row,
                )
                .optional()?;
            row.map(Message::try_from).transpose()
        })
    }

    pub fn list_messages(&self) -> Result<Vec<Message>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, ciphertext, nonce, sender_public_key, threshold, created_at
                 FROM messages ORDER BY created_at, id",
            )?;
            let rows = stmt
                .query_map([], message_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            rows.into_iter().map(Message::try_from).collect()
        })
    }

    // -- Shares --

    /// Insert a share, or overwrite y and scan time for the same (message_id, x).
    pub fn put_share(&self, share: &Share) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT OR REPLACE INTO shares (message_id, x, y, scanned_at) VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![
                    share.message_id,
                    share.x.to_bytes_be(),
                    share.y.to_bytes_be(),
                    share.scanned_at.timestamp_millis(),
                ],
            )?;
            Ok(())
        })
    }

    /// Shares for one message, oldest scan first.
    pub fn shares_for_message(&self, message_id: &str) -> Result<Vec<Share>> {
        self.with_conn(|conn| query_shares(conn, Some(message_id)))
    }

    pub fn list_shares(&self) -> Result<Vec<Share>> {
        self.with_conn(|conn| query_shares(conn, None))
    }

    // -- Maintenance --

    /// Remove every message and share.
    pub fn clear(&self) -> Result<()> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            tx.execute("DELETE FROM shares", [])?;
            tx.execute("DELETE FROM messages", [])?;
            tx.commit()?;
            Ok(())
        })
    }
}

fn message_row(row: &Row<'_>) -> rusqlite::Result<MessageRow> {
    Ok(MessageRow {
        id: row.get(0)?,
        ciphertext: row.get(1)?,
        nonce: row.get(2)?,
        sender_public_key: row.get(3)?,
        threshold: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn share_row(row: &Row<'_>) -> rusqlite::Result<ShareRow> {
    Ok(ShareRow {
        message_id: row.get(0)?,
        x: row.get(1)?,
        y: row.get(2)?,
        scanned_at: row.get(3)?,
    })
}

fn query_shares(conn: &Connection, message_id: Option<&str>) -> Result<Vec<Share>> {
    let rows = match message_id {
        Some(id) => {
            let mut stmt = conn.prepare(
                "SELECT message_id, x, y, scanned_at FROM shares
                 WHERE message_id = ?1 ORDER BY scanned_at, x",
            )?;
            stmt.query_map([id], share_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?
        }
        None => {
            let mut stmt = conn.prepare(
                "SELECT message_id, x, y, scanned_at FROM shares ORDER BY message_id, scanned_at, x",
            )?;
            stmt.query_map([], share_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?
        }
    };

    rows.into_iter().map(Share::try_from).collect()
}

impl TryFrom<MessageRow> for Message {
    type Error = anyhow::Error;

    fn try_from(row: MessageRow) -> Result<Self> {
        let sender_public_key = row
            .sender_public_key
            .try_into()
            .map_err(|_| anyhow!("Corrupt sender_public_key on message '{}'", row.id))?;
        let threshold = u32::try_from(row.threshold)
            .map_err(|_| anyhow!("Corrupt threshold {} on message '{}'", row.threshold, row.id))?;
        let created_at = DateTime::from_timestamp(row.created_at, 0)
            .ok_or_else(|| anyhow!("Corrupt created_at {} on message '{}'", row.created_at, row.id))?;

        Ok(Message {
            id: row.id,
            ciphertext: row.ciphertext,
            nonce: row.nonce,
            sender_public_key,
            threshold,
            created_at,
        })
    }
}

impl TryFrom<ShareRow> for Share {
    type Error = anyhow::Error;

    fn try_from(row: ShareRow) -> Result<Self> {
        let scanned_at = DateTime::from_timestamp_millis(row.scanned_at).ok_or_else(|| {
            anyhow!("Corrupt scanned_at {} on share of '{}'", row.scanned_at, row.message_id)
        })?;

        Ok(Share {
            message_id: row.message_id,
            x: BigUint::from_bytes_be(&row.x),
            y: BigUint::from_bytes_be(&row.y),
            scanned_at,
        })
    }
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
