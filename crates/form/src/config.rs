use std::time::Duration;

use admission_core::documents::{
    SimulatedScanner, DEFAULT_SCAN_LATENCY, MAX_DOCUMENT_SIZE_BYTES,
};

/// Form settings loaded from environment variables.
///
/// All fields default to the values the form ships with; unparseable
/// variables fall back to the default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormConfig {
    /// Largest accepted document in bytes (default: 1 MiB).
    pub max_document_size_bytes: u64,
    /// Latency of the simulated document scan (default: 1 s).
    pub document_scan_delay: Duration,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            max_document_size_bytes: MAX_DOCUMENT_SIZE_BYTES,
            document_scan_delay: DEFAULT_SCAN_LATENCY,
        }
    }
}

impl FormConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default   |
    /// |---------------------------|-----------|
    /// | `MAX_DOCUMENT_SIZE_BYTES` | `1048576` |
    /// | `DOCUMENT_SCAN_DELAY_MS`  | `1000`    |
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let max_document_size_bytes = lookup("MAX_DOCUMENT_SIZE_BYTES")
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(defaults.max_document_size_bytes);

        let document_scan_delay = lookup("DOCUMENT_SCAN_DELAY_MS")
            .and_then(|v| v.trim().parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.document_scan_delay);

        Self {
            max_document_size_bytes,
            document_scan_delay,
        }
    }

    /// Simulated scanner on the tokio timer using these settings.
    pub fn scanner(&self) -> SimulatedScanner {
        SimulatedScanner::new(self.max_document_size_bytes, self.document_scan_delay)
    }
}
