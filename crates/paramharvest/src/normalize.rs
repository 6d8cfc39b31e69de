//! URL normalization and deduplication
//!
//! Turns raw archive URLs into fuzzing targets:
//! 1. default ports are dropped
//! 2. static assets are filtered by path extension
//! 3. URLs without query parameters are dropped
//! 4. every query value is replaced by a placeholder
//! 5. results are deduplicated on the final string

use crate::error::NormalizeError;
use crate::observe::{Observer, TracingObserver};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use url::Url;

/// Default placeholder written into every query value
pub const DEFAULT_PLACEHOLDER: &str = "FUZZ";

/// Static-asset extensions excluded by default
pub const DEFAULT_DENIED_EXTENSIONS: &[&str] = &[
    ".jpg", ".jpeg", ".png", ".gif", ".pdf", ".svg", ".json", ".css", ".js", ".webp", ".woff",
    ".woff2", ".eot", ".ttf", ".otf", ".mp4", ".txt",
];

/// Set of path extensions whose URLs are discarded
///
/// Extensions are stored lowercased with a leading dot, so `"PNG"`,
/// `".png"` and `".Png"` all denote the same entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionDenylist {
    extensions: HashSet<String>,
}

impl Default for ExtensionDenylist {
    fn default() -> Self {
        Self::new(DEFAULT_DENIED_EXTENSIONS.iter().copied())
    }
}

impl ExtensionDenylist {
    /// Create a denylist from the given extensions
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut denylist = Self::empty();
        for ext in extensions {
            denylist.insert(ext.as_ref());
        }
        denylist
    }

    /// A denylist that lets every extension through
    pub fn empty() -> Self {
        Self {
            extensions: HashSet::new(),
        }
    }

    /// Add an extension; blank input is ignored
    pub fn insert(&mut self, ext: &str) {
        let ext = ext.trim().to_lowercase();
        if ext.trim_start_matches('.').is_empty() {
            return;
        }
        if ext.starts_with('.') {
            self.extensions.insert(ext);
        } else {
            self.extensions.insert(format!(".{}", ext));
        }
    }

    /// Returns true if `ext` (with leading dot) is denied, ignoring case
    pub fn contains(&self, ext: &str) -> bool {
        self.extensions.contains(&ext.to_lowercase())
    }

    /// Returns true if the URL path ends in a denied extension
    ///
    /// `;params` on the last segment are not part of the extension.
    pub fn denies(&self, url: &Url) -> bool {
        let path = url.path();
        let last = path.rfind('/').map_or(0, |slash| slash + 1);
        let path = match path[last..].find(';') {
            Some(semi) => &path[..last + semi],
            None => path,
        };
        path_extension(path).is_some_and(|ext| self.contains(&ext))
    }

    pub fn len(&self) -> usize {
        self.extensions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }
}

/// Lowercase extension of the last path segment, including the dot
///
/// Leading dots do not start an extension, so `/.htaccess` has none.
pub fn path_extension(path: &str) -> Option<String> {
    let name = path.rsplit('/').next().unwrap_or(path);
    let stem = name.trim_start_matches('.');
    let dot = stem.rfind('.')?;
    Some(stem[dot..].to_lowercase())
}

/// Counters for one normalization batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizeStats {
    /// Raw tokens seen
    pub total: usize,
    /// Tokens that failed to parse
    pub malformed: usize,
    /// URLs dropped by the extension denylist
    pub denied_extension: usize,
    /// URLs dropped for lack of query parameters
    pub no_query: usize,
    /// URLs that normalized to an already-kept entry
    pub duplicates: usize,
    /// Distinct URLs in the output
    pub kept: usize,
}

/// Result of normalizing a single URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Normalized {
    /// The rewritten URL
    Kept(String),
    /// Path extension is on the denylist
    DeniedExtension,
    /// No non-empty query parameters
    NoQuery,
}

/// Deduplicated URLs plus batch statistics
#[derive(Debug, Clone, Default)]
pub struct NormalizeOutput {
    pub urls: HashSet<String>,
    pub stats: NormalizeStats,
}

/// Applies the filter/rewrite pipeline to batches of raw URLs
#[derive(Clone)]
pub struct Normalizer {
    denylist: ExtensionDenylist,
    placeholder: String,
    observer: Arc<dyn Observer>,
}

impl std::fmt::Debug for Normalizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Normalizer")
            .field("denylist", &self.denylist)
            .field("placeholder", &self.placeholder)
            .finish_non_exhaustive()
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(ExtensionDenylist::default(), DEFAULT_PLACEHOLDER)
    }
}

impl Normalizer {
    /// Create a normalizer reporting to [`TracingObserver`]
    pub fn new(denylist: ExtensionDenylist, placeholder: impl Into<String>) -> Self {
        Self {
            denylist,
            placeholder: placeholder.into(),
            observer: Arc::new(TracingObserver),
        }
    }

    /// Report events to a custom observer
    pub fn with_observer(mut self, observer: Arc<dyn Observer>) -> Self {
        self.observer = observer;
        self
    }

    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    pub fn denylist(&self) -> &ExtensionDenylist {
        &self.denylist
    }

    /// Normalize a single raw URL
    pub fn normalize_url(&self, raw: &str) -> Result<Normalized, NormalizeError> {
        // `Url` drops ports equal to the scheme default (80/http, 443/https)
        // while parsing, so the parsed form is already port-stripped.
        let mut url = Url::parse(raw).map_err(|source| NormalizeError::Malformed {
            url: raw.to_string(),
            source,
        })?;

        if self.denylist.denies(&url) {
            return Ok(Normalized::DeniedExtension);
        }

        let keys = query_keys(&url);
        if keys.is_empty() {
            return Ok(Normalized::NoQuery);
        }

        url.set_query(None);
        url.query_pairs_mut()
            .extend_pairs(keys.iter().map(|key| (key.as_str(), self.placeholder.as_str())));

        Ok(Normalized::Kept(url.to_string()))
    }

    /// Normalize and deduplicate a batch; malformed entries are skipped
    pub fn normalize<I, S>(&self, raw_urls: I) -> NormalizeOutput
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut output = NormalizeOutput::default();

        for raw in raw_urls {
            output.stats.total += 1;
            match self.normalize_url(raw.as_ref()) {
                Ok(Normalized::Kept(url)) => {
                    if !output.urls.insert(url) {
                        output.stats.duplicates += 1;
                    }
                }
                Ok(Normalized::DeniedExtension) => output.stats.denied_extension += 1,
                Ok(Normalized::NoQuery) => output.stats.no_query += 1,
                Err(err) => {
                    output.stats.malformed += 1;
                    self.observer.url_skipped(&err);
                }
            }
        }

        output.stats.kept = output.urls.len();
        self.observer.normalized(&output.stats);
        output
    }
}

/// Distinct query keys in first-seen order, ignoring blank values
fn query_keys(url: &Url) -> Vec<String> {
    let mut keys: Vec<String> = Vec::new();
    for (key, value) in url.query_pairs() {
        if value.is_empty() {
            continue;
        }
        if !keys.iter().any(|k| *k == key) {
            keys.push(key.into_owned());
        }
    }
    keys
}

/// Normalize a batch with the default observer
pub fn normalize<I, S>(raw_urls: I, denylist: &ExtensionDenylist, placeholder: &str) -> HashSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    Normalizer::new(denylist.clone(), placeholder)
        .normalize(raw_urls)
        .urls
}
