//! paramharvest - web archive URL harvesting for fuzzing wordlists
//!
//! Pulls every archived URL of a domain from the Wayback Machine CDX
//! index, drops static assets and parameterless pages, and rewrites each
//! query value to a placeholder so the result can be fed to a fuzzer.
//!
//! ## Pipeline
//!
//! 1. [`ArchiveFetcher`] requests the CDX listing with a random
//!    User-Agent per attempt, retrying transient failures
//! 2. [`Normalizer`] filters, rewrites and deduplicates the raw URLs
//!
//! [`fetch_and_clean`] runs both with defaults. [`Harvester`] exposes every
//! knob: archive host, retry policy, User-Agent pool, denylist, observer
//! and interrupt.
//!
//! ```no_run
//! # async fn run() -> Result<(), paramharvest::FetchError> {
//! let urls = paramharvest::fetch_and_clean("example.com", "FUZZ", None).await?;
//! for url in urls {
//!     println!("{url}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
mod error;
pub mod fetchers;
mod harvester;
mod interrupt;
pub mod normalize;
mod observe;
mod retry;
mod types;
mod user_agents;

pub use client::{archive_url, fetch_and_clean, harvest, ARCHIVE_BASE_URL};
pub use error::{FetchError, NormalizeError};
pub use fetchers::{ArchiveFetcher, Fetcher};
pub use harvester::{Harvester, HarvesterBuilder};
pub use interrupt::{Interrupt, InterruptHandle};
pub use normalize::{
    normalize, ExtensionDenylist, NormalizeOutput, NormalizeStats, Normalized, Normalizer,
    DEFAULT_DENIED_EXTENSIONS, DEFAULT_PLACEHOLDER,
};
pub use observe::{Observer, TracingObserver};
pub use retry::{RetryPolicy, ATTEMPT_TIMEOUT, MAX_ATTEMPTS, RETRY_DELAY};
pub use types::{ArchiveQuery, HarvestResponse};
pub use user_agents::{UserAgentPool, DEFAULT_USER_AGENTS};

/// User-Agent used when a configured one is not a valid header value
pub const DEFAULT_USER_AGENT: &str = "paramharvest/0.1";
