//! Harvester builder and entry point

use crate::client::{archive_url, ARCHIVE_BASE_URL};
use crate::error::FetchError;
use crate::fetchers::{ArchiveFetcher, Fetcher};
use crate::interrupt::Interrupt;
use crate::normalize::{ExtensionDenylist, NormalizeOutput, Normalizer};
use crate::observe::{Observer, TracingObserver};
use crate::retry::RetryPolicy;
use crate::types::{ArchiveQuery, HarvestResponse};
use crate::user_agents::UserAgentPool;
use std::sync::Arc;

/// Builder for configuring a [`Harvester`]
#[derive(Clone)]
pub struct HarvesterBuilder {
    archive_base: String,
    user_agents: UserAgentPool,
    retry: RetryPolicy,
    denylist: ExtensionDenylist,
    observer: Arc<dyn Observer>,
    interrupt: Interrupt,
    fetcher: Option<Arc<dyn Fetcher>>,
}

impl Default for HarvesterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl HarvesterBuilder {
    /// Create a builder with the public archive and default settings
    pub fn new() -> Self {
        Self {
            archive_base: ARCHIVE_BASE_URL.to_string(),
            user_agents: UserAgentPool::default(),
            retry: RetryPolicy::default(),
            denylist: ExtensionDenylist::default(),
            observer: Arc::new(TracingObserver),
            interrupt: Interrupt::never(),
            fetcher: None,
        }
    }

    /// Query a different archive host (scheme and authority, no path)
    pub fn archive_base(mut self, base: impl Into<String>) -> Self {
        self.archive_base = base.into();
        self
    }

    /// Replace the User-Agent pool
    pub fn user_agents(mut self, pool: UserAgentPool) -> Self {
        self.user_agents = pool;
        self
    }

    /// Set the retry policy
    pub fn retry(mut self, policy: RetryPolicy) -> Self {
        self.retry = policy;
        self
    }

    /// Replace the extension denylist
    pub fn denylist(mut self, denylist: ExtensionDenylist) -> Self {
        self.denylist = denylist;
        self
    }

    /// Add one extension to the denylist
    pub fn deny_extension(mut self, ext: &str) -> Self {
        self.denylist.insert(ext);
        self
    }

    /// Report fetch and normalization events to `observer`
    pub fn observer(mut self, observer: Arc<dyn Observer>) -> Self {
        self.observer = observer;
        self
    }

    /// Abort retry waits when `interrupt` fires
    pub fn interrupt(mut self, interrupt: Interrupt) -> Self {
        self.interrupt = interrupt;
        self
    }

    /// Use a custom fetcher instead of [`ArchiveFetcher`]
    ///
    /// User-Agent pool, retry policy and interrupt only apply to the
    /// built-in fetcher.
    pub fn fetcher(mut self, fetcher: Arc<dyn Fetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// Build the harvester
    pub fn build(self) -> Harvester {
        let fetcher: Arc<dyn Fetcher> = match self.fetcher {
            Some(fetcher) => fetcher,
            None => Arc::new(
                ArchiveFetcher::new(self.user_agents, self.retry)
                    .with_observer(self.observer.clone())
                    .with_interrupt(self.interrupt),
            ),
        };

        Harvester {
            archive_base: self.archive_base,
            denylist: self.denylist,
            observer: self.observer,
            fetcher,
        }
    }
}

/// Configured harvester
#[derive(Clone)]
pub struct Harvester {
    archive_base: String,
    denylist: ExtensionDenylist,
    observer: Arc<dyn Observer>,
    fetcher: Arc<dyn Fetcher>,
}

impl std::fmt::Debug for Harvester {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Harvester")
            .field("archive_base", &self.archive_base)
            .field("denylist", &self.denylist)
            .field("fetcher", &self.fetcher.name())
            .finish_non_exhaustive()
    }
}

impl Default for Harvester {
    fn default() -> Self {
        HarvesterBuilder::new().build()
    }
}

impl Harvester {
    /// Create a new harvester builder
    pub fn builder() -> HarvesterBuilder {
        HarvesterBuilder::new()
    }

    /// Normalizer configured with this harvester's denylist and observer
    pub fn normalizer(&self, placeholder: &str) -> Normalizer {
        Normalizer::new(self.denylist.clone(), placeholder).with_observer(self.observer.clone())
    }

    /// Fetch the archive listing for the query's domain and normalize it
    pub async fn harvest(&self, query: &ArchiveQuery) -> Result<HarvestResponse, FetchError> {
        let domain = query.validated_domain()?;
        let url = archive_url(&self.archive_base, domain);
        self.observer.harvest_started(domain, &url);

        let body = self.fetcher.fetch(&url, query.effective_proxy()).await?;

        let placeholder = query.effective_placeholder();
        let output = self.clean(&body, placeholder);

        Ok(HarvestResponse {
            domain: domain.to_string(),
            placeholder: placeholder.to_string(),
            urls: output.urls.into_iter().collect(),
            stats: output.stats,
        })
    }

    /// Normalize whitespace-separated raw URLs without fetching
    pub fn clean(&self, raw: &str, placeholder: &str) -> NormalizeOutput {
        self.normalizer(placeholder).normalize(raw.split_whitespace())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetchers::testing::{FailingFetcher, StaticFetcher};
    use crate::observe::testing::{Event, RecordingObserver};
    use std::collections::HashSet;

    fn as_set(urls: &[String]) -> HashSet<&str> {
        urls.iter().map(String::as_str).collect()
    }

    #[tokio::test]
    async fn test_harvest_with_static_fetcher() {
        let fetcher = Arc::new(StaticFetcher::new(
            "http://ex.com/x?id=1&ref=2\nhttp://ex.com/x?id=9&ref=9\nhttp://ex.com/logo.png?v=1\n",
        ));
        let harvester = Harvester::builder().fetcher(fetcher.clone()).build();

        let resp = harvester
            .harvest(&ArchiveQuery::new("ex.com"))
            .await
            .unwrap();

        assert_eq!(resp.domain, "ex.com");
        assert_eq!(resp.placeholder, "FUZZ");
        assert_eq!(
            as_set(&resp.urls),
            HashSet::from(["http://ex.com/x?id=FUZZ&ref=FUZZ"])
        );
        assert_eq!(resp.stats.total, 3);
        assert_eq!(resp.stats.duplicates, 1);
        assert_eq!(resp.stats.denied_extension, 1);

        let requests = fetcher.requests.lock().unwrap();
        assert_eq!(
            requests[0].0,
            "https://web.archive.org/cdx/search/cdx?url=ex.com/*&output=txt&collapse=urlkey&fl=original&page=/"
        );
        assert_eq!(requests[0].1, None);
    }

    #[tokio::test]
    async fn test_harvest_passes_proxy_and_placeholder() {
        let fetcher = Arc::new(StaticFetcher::new("https://ex.com/a?q=1"));
        let harvester = Harvester::builder()
            .archive_base("http://archive.local/")
            .fetcher(fetcher.clone())
            .build();

        let query = ArchiveQuery::new("ex.com")
            .placeholder("INJECT")
            .proxy("http://127.0.0.1:8080");
        let resp = harvester.harvest(&query).await.unwrap();

        assert_eq!(resp.urls, vec!["https://ex.com/a?q=INJECT".to_string()]);
        let requests = fetcher.requests.lock().unwrap();
        assert!(requests[0].0.starts_with("http://archive.local/cdx/search/cdx?url=ex.com/*"));
        assert_eq!(requests[0].1.as_deref(), Some("http://127.0.0.1:8080"));
    }

    #[tokio::test]
    async fn test_harvest_rejects_missing_domain() {
        let fetcher = Arc::new(StaticFetcher::new(""));
        let harvester = Harvester::builder().fetcher(fetcher.clone()).build();

        let result = harvester.harvest(&ArchiveQuery::new("  ")).await;

        assert!(matches!(result, Err(FetchError::MissingDomain)));
        assert!(fetcher.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_harvest_surfaces_fetch_failure() {
        let harvester = Harvester::builder()
            .fetcher(Arc::new(FailingFetcher))
            .build();

        let result = harvester.harvest(&ArchiveQuery::new("ex.com")).await;

        assert!(matches!(result, Err(FetchError::Exhausted { attempts: 3, .. })));
    }

    #[tokio::test]
    async fn test_harvest_empty_listing() {
        let harvester = Harvester::builder()
            .fetcher(Arc::new(StaticFetcher::new("")))
            .build();

        let resp = harvester.harvest(&ArchiveQuery::new("ex.com")).await.unwrap();

        assert!(resp.urls.is_empty());
        assert_eq!(resp.stats.total, 0);
    }

    #[tokio::test]
    async fn test_observer_sees_harvest_events() {
        let observer = Arc::new(RecordingObserver::default());
        let harvester = Harvester::builder()
            .observer(observer.clone())
            .fetcher(Arc::new(StaticFetcher::new("http://ex.com/a?b=1 bogus")))
            .build();

        harvester.harvest(&ArchiveQuery::new("ex.com")).await.unwrap();

        assert_eq!(
            observer.events(),
            vec![
                Event::HarvestStarted("ex.com".to_string()),
                Event::Skipped("bogus".to_string()),
                Event::Normalized { kept: 1 },
            ]
        );
    }

    #[test]
    fn test_clean_with_extra_denied_extension() {
        let harvester = Harvester::builder().deny_extension("php").build();
        let output = harvester.clean(
            "http://ex.com/index.php?a=1 http://ex.com/search?q=1",
            "FUZZ",
        );
        assert_eq!(
            output.urls,
            HashSet::from(["http://ex.com/search?q=FUZZ".to_string()])
        );
        assert_eq!(output.stats.denied_extension, 1);
    }

    #[test]
    fn test_builder_defaults() {
        let harvester = Harvester::default();
        assert_eq!(harvester.archive_base, ARCHIVE_BASE_URL);
        assert_eq!(harvester.denylist.len(), 17);
        assert_eq!(harvester.fetcher.name(), "archive");
    }
}
