use shardkeep_crypto::CryptoError;
use thiserror::Error;

/// Why a single scanned token was not accepted. None of these are fatal:
/// the token is left unmarked so a corrected re-scan can be retried.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("malformed token: {0}")]
    MalformedToken(String),

    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    #[error("invalid field `{field}`: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("share token carries no signature")]
    MissingSignature,

    #[error("no stored message with id `{0}`")]
    UnknownMessage(String),

    #[error("share signature does not match the sender key")]
    InvalidSignature,

    #[error("sender key or share signature is malformed")]
    MalformedKeyOrSignature,

    #[error("`{0}` is outside the field")]
    OutOfRange(&'static str),

    #[error("unknown payload type `{0}`")]
    UnknownPayloadType(String),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

/// Why a stored message could not be turned back into plaintext.
#[derive(Debug, Error)]
pub enum RecoveryError {
    #[error("no stored message with id `{0}`")]
    UnknownMessage(String),

    #[error("{available} of {required} shares collected")]
    InsufficientShares { required: u32, available: usize },

    #[error("share set is empty or repeats an x coordinate")]
    DegenerateShareSet,

    #[error("share coordinates are not invertible in the field")]
    NotInvertible,

    #[error("reconstructed secret does not fit in a 32-byte key")]
    SecretTooLarge,

    /// The key decrypted nothing: an insufficient, wrong or tampered share set.
    #[error("decryption failed authentication: wrong or tampered share set")]
    AuthenticationFailed,

    #[error(transparent)]
    Crypto(CryptoError),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl From<CryptoError> for RecoveryError {
    fn from(err: CryptoError) -> Self {
        match err {
            CryptoError::DegenerateShareSet => Self::DegenerateShareSet,
            CryptoError::NotInvertible => Self::NotInvertible,
            CryptoError::SecretTooLarge { .. } => Self::SecretTooLarge,
            CryptoError::AuthenticationFailed => Self::AuthenticationFailed,
            other => Self::Crypto(other),
        }
    }
}

#[derive(Debug, Error)]
pub enum DealError {
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error("failed to encode payload: {0}")]
    Encode(#[from] serde_json::Error),
}
