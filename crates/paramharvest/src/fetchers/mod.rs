//! Fetchers that retrieve raw archive listings
//!
//! Design: the harvester only depends on the [`Fetcher`] trait, so the
//! HTTP transport can be swapped for a canned source in tests or replaced
//! by another archive backend.

mod archive;

pub use archive::ArchiveFetcher;

use crate::error::FetchError;
use async_trait::async_trait;

/// Trait for sources of raw archive responses
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Unique identifier for this fetcher (for logging/debugging)
    fn name(&self) -> &'static str;

    /// Fetch the body at `url`, optionally through `proxy`
    ///
    /// Implementations decide their own retry behavior. A returned error
    /// is terminal for the harvest.
    async fn fetch(&self, url: &str, proxy: Option<&str>) -> Result<String, FetchError>;
}
