//! Ed25519 verification of detached share signatures.
//!
//! `message` must be the bytes the sender signed, exactly as they came off
//! the wire. Re-serializing a parsed record is not guaranteed to reproduce
//! them.

use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use shardkeep_types::constants::{PUBLIC_KEY_LEN, SIGNATURE_LEN};

use crate::error::{CryptoError, Result};

/// Returns `Ok(false)` for a well-formed signature that does not match.
/// Fails with `MalformedKeyOrSignature` when the key or signature has the
/// wrong length, or the key is not a valid curve point.
pub fn verify_signature(public_key: &[u8], message: &[u8], signature: &[u8]) -> Result<bool> {
    let key_bytes: &[u8; PUBLIC_KEY_LEN] = public_key
        .try_into()
        .map_err(|_| CryptoError::MalformedKeyOrSignature)?;
    let sig_bytes: &[u8; SIGNATURE_LEN] = signature
        .try_into()
        .map_err(|_| CryptoError::MalformedKeyOrSignature)?;

    let key = VerifyingKey::from_bytes(key_bytes).map_err(|_| CryptoError::MalformedKeyOrSignature)?;
    let signature = Signature::from_bytes(sig_bytes);

    Ok(key.verify(message, &signature).is_ok())
}
