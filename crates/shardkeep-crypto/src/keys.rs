use aes_gcm::aead::OsRng;
use aes_gcm::aead::rand_core::RngCore;
use num_bigint::BigUint;
use num_traits::Zero;
use shardkeep_types::constants::{KEY_LEN, NONCE_LEN};

pub fn random_array<const N: usize>() -> [u8; N] {
    let mut bytes = [0u8; N];
    OsRng.fill_bytes(&mut bytes);
    bytes
}

/// Random 32-byte seed for an Ed25519 signing key.
pub fn generate_signing_seed() -> [u8; 32] {
    random_array()
}

pub fn generate_nonce() -> [u8; NONCE_LEN] {
    random_array()
}

/// Uniform field element in `[0, p)` by rejection sampling 32-byte strings.
/// `p` must fit in 32 bytes.
pub fn random_below(p: &BigUint) -> BigUint {
    loop {
        let candidate = BigUint::from_bytes_be(&random_array::<KEY_LEN>());
        if &candidate < p {
            return candidate;
        }
    }
}

/// Uniform field element in `[1, p)`.
pub fn random_nonzero_below(p: &BigUint) -> BigUint {
    loop {
        let candidate = random_below(p);
        if !candidate.is_zero() {
            return candidate;
        }
    }
}
