//! Asynchronous document constraint check.
//!
//! [`DocumentScanner`] is the seam where a real upload scanner plugs in.
//! [`SimulatedScanner`] stands in for one: it waits a fixed latency through
//! a [`Sleeper`] and then applies the size policy from [`check_sizes`].

use std::future::Future;
use std::time::Duration;

use crate::types::FileDescriptor;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum size of a single uploaded document in bytes (1 MiB).
pub const MAX_DOCUMENT_SIZE_BYTES: u64 = 1024 * 1024;

/// Latency of the simulated scan.
pub const DEFAULT_SCAN_LATENCY: Duration = Duration::from_millis(1000);

pub const SCAN_FAILED_MESSAGE: &str = "Document validation failed.";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DocumentError {
    #[error("One or more documents exceed the maximum allowed size ({}).", format_limit(.limit_bytes))]
    TooLarge { limit_bytes: u64 },

    /// The scanner failed for a reason of its own. An empty reason renders
    /// as [`SCAN_FAILED_MESSAGE`].
    #[error("{}", scan_failure_message(.0))]
    ScanFailed(String),
}

fn format_limit(bytes: &u64) -> String {
    let bytes = *bytes;
    const MIB: u64 = 1024 * 1024;
    const KIB: u64 = 1024;
    if bytes >= MIB && bytes % MIB == 0 {
        format!("{}MB", bytes / MIB)
    } else if bytes >= KIB && bytes % KIB == 0 {
        format!("{}KB", bytes / KIB)
    } else {
        format!("{bytes} bytes")
    }
}

fn scan_failure_message(reason: &str) -> &str {
    if reason.is_empty() {
        SCAN_FAILED_MESSAGE
    } else {
        reason
    }
}

// ---------------------------------------------------------------------------
// Policy
// ---------------------------------------------------------------------------

/// Reject the selection if any file is larger than `max_size_bytes`.
pub fn check_sizes(files: &[FileDescriptor], max_size_bytes: u64) -> Result<(), DocumentError> {
    if files.iter().any(|file| file.size > max_size_bytes) {
        return Err(DocumentError::TooLarge {
            limit_bytes: max_size_bytes,
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// Suspends the caller for a duration. Injected so tests need not wait.
pub trait Sleeper: Send + Sync {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send;
}

/// Real-time sleeps on the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Returns at once, ignoring the requested duration.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImmediateSleeper;

impl Sleeper for ImmediateSleeper {
    async fn sleep(&self, _duration: Duration) {}
}

/// Inspects a document selection and resolves or rejects it.
pub trait DocumentScanner: Send + Sync {
    fn scan(
        &self,
        files: &[FileDescriptor],
    ) -> impl Future<Output = Result<(), DocumentError>> + Send;
}

// ---------------------------------------------------------------------------
// SimulatedScanner
// ---------------------------------------------------------------------------

/// Waits `latency`, then applies the size policy.
#[derive(Debug, Clone)]
pub struct SimulatedScanner<S = TokioSleeper> {
    pub max_size_bytes: u64,
    pub latency: Duration,
    sleeper: S,
}

impl SimulatedScanner<TokioSleeper> {
    pub fn new(max_size_bytes: u64, latency: Duration) -> Self {
        Self::with_sleeper(max_size_bytes, latency, TokioSleeper)
    }
}

impl Default for SimulatedScanner<TokioSleeper> {
    fn default() -> Self {
        Self::new(MAX_DOCUMENT_SIZE_BYTES, DEFAULT_SCAN_LATENCY)
    }
}

impl<S: Sleeper> SimulatedScanner<S> {
    pub fn with_sleeper(max_size_bytes: u64, latency: Duration, sleeper: S) -> Self {
        Self {
            max_size_bytes,
            latency,
            sleeper,
        }
    }
}

impl<S: Sleeper> DocumentScanner for SimulatedScanner<S> {
    async fn scan(&self, files: &[FileDescriptor]) -> Result<(), DocumentError> {
        self.sleeper.sleep(self.latency).await;
        check_sizes(files, self.max_size_bytes)
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Run `scanner` over the current selection.
pub async fn check_documents<D: DocumentScanner>(
    files: &[FileDescriptor],
    scanner: &D,
) -> Result<(), DocumentError> {
    tracing::debug!(file_count = files.len(), "Document check started");

    let result = scanner.scan(files).await;
    match &result {
        Ok(()) => tracing::debug!(file_count = files.len(), "Document check passed"),
        Err(e) => tracing::warn!(error = %e, "Document check rejected selection"),
    }
    result
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
