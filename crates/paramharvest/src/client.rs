//! Archive query entry points
//!
//! [`fetch_and_clean`] is the one-call form: default archive, retry
//! policy, User-Agent pool and denylist. Use [`Harvester`] to change any
//! of them.

use crate::error::FetchError;
use crate::harvester::Harvester;
use crate::types::{ArchiveQuery, HarvestResponse};

/// Public web archive host
pub const ARCHIVE_BASE_URL: &str = "https://web.archive.org";

/// CDX listing URL for every archived URL under `domain`
///
/// Requests original URLs as plain text, collapsed by URL key.
pub fn archive_url(base: &str, domain: &str) -> String {
    format!(
        "{}/cdx/search/cdx?url={}/*&output=txt&collapse=urlkey&fl=original&page=/",
        base.trim_end_matches('/'),
        domain
    )
}

/// Harvest URLs for a query with default settings
pub async fn harvest(query: &ArchiveQuery) -> Result<HarvestResponse, FetchError> {
    Harvester::default().harvest(query).await
}

/// Fetch archived URLs for `domain` and return them normalized
///
/// Order of the returned URLs is unspecified.
pub async fn fetch_and_clean(
    domain: &str,
    placeholder: &str,
    proxy: Option<&str>,
) -> Result<Vec<String>, FetchError> {
    let mut query = ArchiveQuery::new(domain).placeholder(placeholder);
    if let Some(proxy) = proxy {
        query = query.proxy(proxy);
    }
    harvest(&query).await.map(|resp| resp.urls)
}
