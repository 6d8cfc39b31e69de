//! Observation hooks for fetch and normalization events
//!
//! Fetchers and the normalizer report through an [`Observer`] instead of
//! logging directly. [`TracingObserver`] forwards everything to `tracing`.

use crate::error::{FetchError, NormalizeError};
use crate::normalize::NormalizeStats;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Receives events from a harvest run
///
/// All methods default to doing nothing.
pub trait Observer: Send + Sync {
    /// A harvest for `domain` is starting
    fn harvest_started(&self, _domain: &str, _archive_url: &str) {}

    /// A request is about to be sent
    fn attempt_started(&self, _url: &str, _attempt: u32, _user_agent: &str) {}

    /// An attempt failed; `retry_in` is set when another attempt follows
    fn attempt_failed(
        &self,
        _url: &str,
        _attempt: u32,
        _error: &FetchError,
        _retry_in: Option<Duration>,
    ) {
    }

    /// All attempts failed
    fn exhausted(&self, _url: &str, _attempts: u32) {}

    /// The retry wait was interrupted
    fn interrupted(&self, _url: &str) {}

    /// A raw token was dropped because it could not be parsed
    fn url_skipped(&self, _error: &NormalizeError) {}

    /// A normalization batch finished
    fn normalized(&self, _stats: &NormalizeStats) {}
}

/// Observer that emits `tracing` events
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl Observer for TracingObserver {
    fn harvest_started(&self, domain: &str, archive_url: &str) {
        info!(domain, archive_url, "Fetching URLs for {}", domain);
    }

    fn attempt_started(&self, url: &str, attempt: u32, user_agent: &str) {
        debug!(url, attempt, user_agent, "Fetching archive URL");
    }

    fn attempt_failed(
        &self,
        url: &str,
        attempt: u32,
        error: &FetchError,
        retry_in: Option<Duration>,
    ) {
        match retry_in {
            Some(delay) => warn!(
                url,
                attempt,
                error = %error,
                "Error fetching URL. Retrying in {:?}...",
                delay
            ),
            None => warn!(url, attempt, error = %error, "Error fetching URL"),
        }
    }

    fn exhausted(&self, url: &str, attempts: u32) {
        error!(url, attempts, "Failed to fetch URL after {} attempts", attempts);
    }

    fn interrupted(&self, url: &str) {
        warn!(url, "Interrupt received, aborting fetch");
    }

    fn url_skipped(&self, error: &NormalizeError) {
        debug!(error = %error, "Skipping URL");
    }

    fn normalized(&self, stats: &NormalizeStats) {
        info!(
            total = stats.total,
            malformed = stats.malformed,
            denied_extension = stats.denied_extension,
            no_query = stats.no_query,
            duplicates = stats.duplicates,
            "Found {} cleaned URLs",
            stats.kept
        );
    }
}
