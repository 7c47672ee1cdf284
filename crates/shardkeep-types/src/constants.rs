//! Wire format constants shared out-of-band with senders. Nothing here is
//! negotiated: a sender using a different prime produces shares that
//! reconstruct to garbage without any error.

/// Field modulus P = 2^256 - 2^224 + 2^192 + 2^96 - 1, big-endian.
pub const PRIME_BYTES: [u8; 32] = [
    0xff, 0xff, 0xff, 0xff, 0x00, 0x00, 0x00, 0x01,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0xff, 0xff, 0xff, 0xff,
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
];

/// Ed25519 verification key length.
pub const PUBLIC_KEY_LEN: usize = 32;

/// Ed25519 signature length.
pub const SIGNATURE_LEN: usize = 64;

/// AES-256-GCM key length.
pub const KEY_LEN: usize = 32;

/// AES-256-GCM nonce length.
pub const NONCE_LEN: usize = 12;

/// GCM tag appended to every ciphertext.
pub const TAG_LEN: usize = 16;
