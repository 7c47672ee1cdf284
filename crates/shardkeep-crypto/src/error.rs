use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CryptoError {
    #[error("value is not invertible modulo the field prime")]
    NotInvertible,

    #[error("share set is empty or repeats an x coordinate")]
    DegenerateShareSet,

    #[error("public key or signature has the wrong length or encoding")]
    MalformedKeyOrSignature,

    #[error("reconstructed secret does not fit in {max} bytes")]
    SecretTooLarge { max: usize },

    #[error("AES-GCM authentication failed: wrong key or tampered ciphertext")]
    AuthenticationFailed,

    #[error("nonce must be {expected} bytes, got {got}")]
    InvalidNonceLength { expected: usize, got: usize },

    #[error("encryption failed")]
    EncryptionFailed,

    #[error("invalid sharing parameters: {0}")]
    InvalidSharing(String),
}

pub type Result<T> = std::result::Result<T, CryptoError>;
