/// Shardkeep Crypto Library
///
/// Threshold secret recovery over a fixed 256-bit prime field:
/// - Modular arithmetic and Lagrange reconstruction of the shared secret
/// - Ed25519 verification of share signatures
/// - Secret-to-key derivation and AES-256-GCM payload decryption
///
/// The sender-side half (polynomial splitting, encryption, key sampling)
/// lives here too so both ends agree on one implementation.

pub mod encrypt;
pub mod error;
pub mod field;
pub mod keys;
pub mod reconstruct;
pub mod signature;
pub mod split;

pub use error::CryptoError;
pub use field::field_prime;
pub use reconstruct::{SharePoint, reconstruct};
