/// Scan event reporting.
///
/// The scanner describes what happened to each polled token through a
/// `ScanReporter`, so the same loop can drive a terminal UI, plain
/// tracing output, or nothing at all in tests.

use std::fmt;

use num_bigint::BigUint;

use crate::error::IngestError;

/// Things the scan loop observes.
#[derive(Debug)]
pub enum ScanEvent {
    /// Scanning began on a source
    Started { interval_ms: u64 },
    /// Encrypted message stored
    MessageStored { id: String },
    /// Verified share stored
    ShareStored { message_id: String, x: BigUint },
    /// Token already stored earlier
    Duplicate,
    /// Token dropped because an ingestion was still in flight
    Skipped,
    /// Token refused; the scan continues
    Rejected { error: IngestError },
    /// The source itself failed to produce a frame
    SourceError { message: String },
    /// Active source replaced
    SourceSwitched,
    /// Scanning ended
    Stopped { polled: u64 },
}

impl fmt::Display for ScanEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Started { interval_ms } => write!(f, "scan_started interval_ms={}", interval_ms),
            Self::MessageStored { id } => write!(f, "message_stored id={}", id),
            Self::ShareStored { message_id, x } => {
                write!(f, "share_stored message_id={} x={}", message_id, x.to_str_radix(16))
            }
            Self::Duplicate => write!(f, "duplicate"),
            Self::Skipped => write!(f, "skipped busy"),
            Self::Rejected { error } => write!(f, "rejected: {}", error),
            Self::SourceError { message } => write!(f, "source_error: {}", message),
            Self::SourceSwitched => write!(f, "source_switched"),
            Self::Stopped { polled } => write!(f, "scan_stopped polled={}", polled),
        }
    }
}

pub trait ScanReporter: Send + Sync {
    fn report(&self, event: &ScanEvent);
}

/// Reporter that writes to `tracing`.
pub struct TracingReporter;

impl ScanReporter for TracingReporter {
    fn report(&self, event: &ScanEvent) {
        // Stored records and refusals are what an operator watches for;
        // duplicates repeat every frame while a code stays in view.
        match event {
            ScanEvent::Rejected { .. } | ScanEvent::SourceError { .. } => {
                tracing::warn!(target: "shardkeep_ingest::scan", "{}", event);
            }
            ScanEvent::Duplicate | ScanEvent::Skipped => {
                tracing::debug!(target: "shardkeep_ingest::scan", "{}", event);
            }
            _ => {
                tracing::info!(target: "shardkeep_ingest::scan", "{}", event);
            }
        }
    }
}

/// Reporter that discards everything.
pub struct NullReporter;

impl ScanReporter for NullReporter {
    fn report(&self, _event: &ScanEvent) {}
}
