/// Database row types: these map directly to SQLite rows.
/// Conversion to the domain records in shardkeep-types happens in
/// `queries`, so a corrupt row surfaces as an error there.

pub struct MessageRow {
    pub id: String,
    pub ciphertext: Vec<u8>,
    pub nonce: Vec<u8>,
    pub sender_public_key: Vec<u8>,
    pub threshold: i64,
    /// Seconds since the Unix epoch.
    pub created_at: i64,
}

pub struct ShareRow {
    pub message_id: String,
    /// Minimal big-endian encoding of the canonical x coordinate.
    pub x: Vec<u8>,
    pub y: Vec<u8>,
    /// Milliseconds since the Unix epoch.
    pub scanned_at: i64,
}
