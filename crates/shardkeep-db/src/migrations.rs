use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);"
    )?;

    let version: i64 = conn
        .query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |r| r.get(0))?;

    if version < 1 {
        info!("Running migration v1 (messages + shares)");
        // No foreign key from shares to messages: a share may legally point
        // at a message that was cleared or never arrived.
        conn.execute_batch(
            "
            CREATE TABLE messages (
                id                TEXT PRIMARY KEY,
                ciphertext        BLOB NOT NULL,
                nonce             BLOB NOT NULL,
                sender_public_key BLOB NOT NULL,
                threshold         INTEGER NOT NULL,
                created_at        INTEGER NOT NULL
            );

            CREATE TABLE shares (
                message_id  TEXT NOT NULL,
                x           BLOB NOT NULL,
                y           BLOB NOT NULL,
                scanned_at  INTEGER NOT NULL,
                PRIMARY KEY (message_id, x)
            );

            CREATE INDEX IF NOT EXISTS idx_shares_message
                ON shares(message_id, scanned_at);

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}
