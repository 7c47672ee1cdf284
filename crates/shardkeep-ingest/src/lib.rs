//! Shardkeep ingestion and recovery.
//!
//! Turns untrusted scanned tokens into stored records and stored records
//! back into plaintext:
//! - `codec`: token → structured record + the exact signed bytes
//! - `payload`: field-by-field classification into message or share
//! - `session`: the ingestion state machine with dedup and re-entrancy guard
//! - `scanner`: rate-limited polling loop over a token source
//! - `recovery`: threshold-gated reconstruction and decryption
//! - `dealer`: the sender side, producing tokens the collector accepts

pub mod codec;
pub mod dealer;
pub mod error;
mod guard;
pub mod payload;
pub mod recovery;
pub mod report;
pub mod scanner;
pub mod session;
pub mod store;

pub use codec::{DecodedToken, SignedRegion, decode_token};
pub use dealer::{Deal, Dealer};
pub use error::{DealError, IngestError, RecoveryError};
pub use payload::{MessagePayload, Payload, SharePayload};
pub use recovery::{MessageProgress, RecoveredSecret, progress, recover, recover_with};
pub use report::{NullReporter, ScanEvent, ScanReporter, TracingReporter};
pub use scanner::{ChannelSource, Detection, ScanSummary, Scanner, TokenSource};
pub use session::{IngestOutcome, IngestSession};
pub use store::{SqliteStore, Store};
