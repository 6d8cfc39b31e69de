//! HTTP fetcher for the archive index
//!
//! Sends a GET with a randomly chosen User-Agent per attempt and retries
//! transient failures with a fixed delay. An interrupt during the delay
//! ends the fetch immediately.

use crate::error::FetchError;
use crate::fetchers::Fetcher;
use crate::interrupt::Interrupt;
use crate::observe::{Observer, TracingObserver};
use crate::retry::RetryPolicy;
use crate::user_agents::UserAgentPool;
use crate::DEFAULT_USER_AGENT;
use async_trait::async_trait;
use reqwest::header::{HeaderValue, USER_AGENT};
use std::sync::Arc;
use std::time::Duration;

/// Archive fetcher with retry
#[derive(Clone)]
pub struct ArchiveFetcher {
    user_agents: UserAgentPool,
    policy: RetryPolicy,
    observer: Arc<dyn Observer>,
    interrupt: Interrupt,
}

impl std::fmt::Debug for ArchiveFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArchiveFetcher")
            .field("user_agents", &self.user_agents)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl Default for ArchiveFetcher {
    fn default() -> Self {
        Self::new(UserAgentPool::default(), RetryPolicy::default())
    }
}

impl ArchiveFetcher {
    /// Create a fetcher reporting to [`TracingObserver`]
    pub fn new(user_agents: UserAgentPool, policy: RetryPolicy) -> Self {
        Self {
            user_agents,
            policy,
            observer: Arc::new(TracingObserver),
            interrupt: Interrupt::never(),
        }
    }

    /// Report events to a custom observer
    pub fn with_observer(mut self, observer: Arc<dyn Observer>) -> Self {
        self.observer = observer;
        self
    }

    /// Abort retry waits when `interrupt` fires
    pub fn with_interrupt(mut self, interrupt: Interrupt) -> Self {
        self.interrupt = interrupt;
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Wait before the next attempt; errors if interrupted
    async fn wait(&self, url: &str, delay: Duration) -> Result<(), FetchError> {
        tokio::select! {
            biased;
            _ = self.interrupt.triggered() => {
                self.observer.interrupted(url);
                Err(FetchError::Interrupted)
            }
            _ = tokio::time::sleep(delay) => Ok(()),
        }
    }
}

#[async_trait]
impl Fetcher for ArchiveFetcher {
    fn name(&self) -> &'static str {
        "archive"
    }

    async fn fetch(&self, url: &str, proxy: Option<&str>) -> Result<String, FetchError> {
        let client = build_client(proxy, self.policy.attempt_timeout)?;

        let mut attempt = 1;
        loop {
            let user_agent = self.user_agents.choose();
            self.observer.attempt_started(url, attempt, user_agent);

            let err = match fetch_once(&client, url, user_agent).await {
                Ok(body) => return Ok(body),
                Err(err) if err.is_transient() => err,
                Err(err) => return Err(err),
            };

            if !self.policy.should_retry(attempt) {
                self.observer.attempt_failed(url, attempt, &err, None);
                self.observer.exhausted(url, attempt);
                return Err(FetchError::Exhausted {
                    url: url.to_string(),
                    attempts: attempt,
                    last: Box::new(err),
                });
            }

            self.observer
                .attempt_failed(url, attempt, &err, Some(self.policy.delay));
            self.wait(url, self.policy.delay).await?;
            attempt += 1;
        }
    }
}

/// Build a client with the attempt timeout and optional proxy
fn build_client(proxy: Option<&str>, timeout: Duration) -> Result<reqwest::Client, FetchError> {
    let mut builder = reqwest::Client::builder()
        .connect_timeout(timeout)
        .timeout(timeout);

    if let Some(proxy_url) = proxy.map(str::trim).filter(|p| !p.is_empty()) {
        let proxy = reqwest::Proxy::all(proxy_url).map_err(|source| FetchError::InvalidProxy {
            url: proxy_url.to_string(),
            source,
        })?;
        builder = builder.proxy(proxy);
    }

    builder.build().map_err(FetchError::ClientBuildError)
}

/// Single GET attempt; non-success status is an error
async fn fetch_once(
    client: &reqwest::Client,
    url: &str,
    user_agent: &str,
) -> Result<String, FetchError> {
    let user_agent = HeaderValue::from_str(user_agent)
        .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_USER_AGENT));

    let response = client
        .get(url)
        .header(USER_AGENT, user_agent)
        .send()
        .await
        .map_err(FetchError::from_reqwest)?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::HttpStatus(status.as_u16()));
    }

    response.text().await.map_err(FetchError::from_reqwest)
}
