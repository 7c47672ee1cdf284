//! Rate-limited polling loop over a token source.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Mutex, mpsc};
use tokio::time::{MissedTickBehavior, interval};

use crate::guard::FlagGuard;
use crate::report::{ScanEvent, ScanReporter};
use crate::session::{IngestOutcome, IngestSession};

/// Result of one poll of a source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Detection {
    Token(String),
    Nothing,
    /// The source will never produce another token.
    Closed,
}

/// Something that can be polled for scanned tokens: a camera decoder, a
/// pipe, a test script.
#[async_trait]
pub trait TokenSource: Send {
    async fn detect(&mut self) -> anyhow::Result<Detection>;
}

/// Source fed through a channel. Never waits: an empty channel is a frame
/// with nothing in it.
pub struct ChannelSource {
    rx: mpsc::Receiver<String>,
}

impl ChannelSource {
    pub fn new(rx: mpsc::Receiver<String>) -> Self {
        Self { rx }
    }

    pub fn channel(capacity: usize) -> (mpsc::Sender<String>, Self) {
        let (tx, rx) = mpsc::channel(capacity);
        (tx, Self::new(rx))
    }
}

#[async_trait]
impl TokenSource for ChannelSource {
    async fn detect(&mut self) -> anyhow::Result<Detection> {
        match self.rx.try_recv() {
            Ok(token) => Ok(Detection::Token(token)),
            Err(mpsc::error::TryRecvError::Empty) => Ok(Detection::Nothing),
            Err(mpsc::error::TryRecvError::Disconnected) => Ok(Detection::Closed),
        }
    }
}

/// Counters for one `run`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSummary {
    pub polled: u64,
    pub stored: u64,
    pub duplicates: u64,
    pub rejected: u64,
}

pub struct Scanner {
    session: Arc<IngestSession>,
    source: Mutex<Box<dyn TokenSource>>,
    reporter: Arc<dyn ScanReporter>,
    interval: Duration,
    scanning: AtomicBool,
    switching: AtomicBool,
    stop_requested: AtomicBool,
}

impl Scanner {
    pub fn new(
        session: Arc<IngestSession>,
        source: Box<dyn TokenSource>,
        reporter: Arc<dyn ScanReporter>,
        interval: Duration,
    ) -> Self {
        Self {
            session,
            source: Mutex::new(source),
            reporter,
            interval,
            scanning: AtomicBool::new(false),
            switching: AtomicBool::new(false),
            stop_requested: AtomicBool::new(false),
        }
    }

    /// Interval for a polling rate in frames per second.
    pub fn interval_for_fps(fps: u32) -> Duration {
        Duration::from_millis(1000 / u64::from(fps.max(1)))
    }

    pub fn session(&self) -> &Arc<IngestSession> {
        &self.session
    }

    pub fn is_scanning(&self) -> bool {
        self.scanning.load(Ordering::Acquire)
    }

    /// Poll the source until it closes or `stop` is called.
    ///
    /// Returns `None` without polling when a scan is already running.
    pub async fn run(&self) -> Option<ScanSummary> {
        let _scanning = FlagGuard::acquire(&self.scanning)?;
        // A stop requested while idle does not carry over into this scan.
        self.stop_requested.store(false, Ordering::Release);

        let mut ticker = interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut summary = ScanSummary::default();
        self.reporter.report(&ScanEvent::Started {
            interval_ms: self.interval.as_millis() as u64,
        });

        loop {
            ticker.tick().await;
            if self.stop_requested.swap(false, Ordering::AcqRel) {
                break;
            }
            if self.switching.load(Ordering::Acquire) {
                continue;
            }

            let detection = {
                let mut source = self.source.lock().await;
                source.detect().await
            };
            summary.polled += 1;

            match detection {
                Ok(Detection::Token(token)) => self.handle(&token, &mut summary).await,
                Ok(Detection::Nothing) => {}
                Ok(Detection::Closed) => break,
                Err(e) => self.reporter.report(&ScanEvent::SourceError {
                    message: e.to_string(),
                }),
            }
        }

        self.reporter.report(&ScanEvent::Stopped {
            polled: summary.polled,
        });
        Some(summary)
    }

    /// Ask a running scan to end after the current tick. Has no effect
    /// when no scan is running.
    pub fn stop(&self) {
        self.stop_requested.store(true, Ordering::Release);
    }

    /// Replace the token source. Waits for an in-flight poll to finish.
    /// Returns false when another switch is already in progress.
    pub async fn switch_source(&self, source: Box<dyn TokenSource>) -> bool {
        let Some(_switching) = FlagGuard::acquire(&self.switching) else {
            return false;
        };

        *self.source.lock().await = source;
        self.reporter.report(&ScanEvent::SourceSwitched);
        true
    }

    async fn handle(&self, token: &str, summary: &mut ScanSummary) {
        let event = match self.session.ingest(token).await {
            Ok(IngestOutcome::MessageStored { id }) => {
                summary.stored += 1;
                ScanEvent::MessageStored { id }
            }
            Ok(IngestOutcome::ShareStored { message_id, x }) => {
                summary.stored += 1;
                ScanEvent::ShareStored { message_id, x }
            }
            Ok(IngestOutcome::Duplicate) => {
                summary.duplicates += 1;
                ScanEvent::Duplicate
            }
            Ok(IngestOutcome::Busy) => ScanEvent::Skipped,
            Err(error) => {
                summary.rejected += 1;
                ScanEvent::Rejected { error }
            }
        };
        self.reporter.report(&event);
    }
}
