//! Client-identity strings sent as User-Agent

use rand::Rng;

/// Built-in browser identities
pub const DEFAULT_USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/58.0.3029.110 Safari/537.36",
    "Mozilla/5.0 (Windows NT 6.1; WOW64; rv:54.0) Gecko/20100101 Firefox/54.0",
];

/// Pool of User-Agent strings, one picked at random per attempt
///
/// The pool is never empty: constructing it from an empty list falls back
/// to [`DEFAULT_USER_AGENTS`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAgentPool {
    agents: Vec<String>,
}

impl Default for UserAgentPool {
    fn default() -> Self {
        Self {
            agents: DEFAULT_USER_AGENTS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl UserAgentPool {
    /// Create a pool from the given strings, skipping blank entries
    pub fn new<I, S>(agents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let agents: Vec<String> = agents
            .into_iter()
            .map(Into::into)
            .filter(|ua| !ua.trim().is_empty())
            .collect();

        if agents.is_empty() {
            Self::default()
        } else {
            Self { agents }
        }
    }

    /// Pick a User-Agent uniformly at random
    pub fn choose(&self) -> &str {
        let idx = rand::rng().random_range(0..self.agents.len());
        &self.agents[idx]
    }

    /// All configured User-Agent strings
    pub fn agents(&self) -> &[String] {
        &self.agents
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}
