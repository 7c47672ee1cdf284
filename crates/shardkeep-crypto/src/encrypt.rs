use aes_gcm::{
    Aes256Gcm, Key, Nonce,
    aead::{Aead, KeyInit},
};
use num_bigint::BigUint;
use shardkeep_types::constants::{KEY_LEN, NONCE_LEN};

use crate::error::{CryptoError, Result};
use crate::keys::generate_nonce;

/// Render a reconstructed secret as a 32-byte AES-256 key: big-endian,
/// left-padded with zeros, independent of the field prime's bit length.
pub fn derive_key(secret: &BigUint) -> Result<[u8; KEY_LEN]> {
    let bytes = secret.to_bytes_be();
    if bytes.len() > KEY_LEN {
        return Err(CryptoError::SecretTooLarge { max: KEY_LEN });
    }

    let mut key = [0u8; KEY_LEN];
    key[KEY_LEN - bytes.len()..].copy_from_slice(&bytes);
    Ok(key)
}

/// Encrypt a plaintext message with AES-256-GCM under a fresh random nonce.
/// Returns (ciphertext with tag, nonce).
pub fn encrypt_message(key: &[u8; KEY_LEN], plaintext: &[u8]) -> Result<(Vec<u8>, [u8; NONCE_LEN])> {
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));

    let nonce_bytes = generate_nonce();
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(nonce, plaintext)
        .map_err(|_| CryptoError::EncryptionFailed)?;

    Ok((ciphertext, nonce_bytes))
}

/// Decrypt a ciphertext message with AES-256-GCM.
///
/// `AuthenticationFailed` is the expected result when the key came from a
/// wrong or insufficient share set.
pub fn decrypt_message(key: &[u8; KEY_LEN], nonce: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>> {
    if nonce.len() != NONCE_LEN {
        return Err(CryptoError::InvalidNonceLength {
            expected: NONCE_LEN,
            got: nonce.len(),
        });
    }

    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));
    let nonce = Nonce::from_slice(nonce);

    cipher
        .decrypt(nonce, ciphertext)
        .map_err(|_| CryptoError::AuthenticationFailed)
}
