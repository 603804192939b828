//! Chain node selection.
//!
//! The node a request goes to is chosen by an [`EndpointStrategy`] injected
//! through [`WaxConfig`](crate::config::WaxConfig). There is no process-wide
//! default node.

use crate::error::{WaxError, WaxResult};
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use url::Url;

/// Picks the chain node for the next request.
pub trait EndpointStrategy: Send + Sync + fmt::Debug {
    /// Returns the base URL to use for the next request.
    fn next_endpoint(&self) -> Url;

    /// Records that a request to `endpoint` failed at the transport level.
    fn report_failure(&self, endpoint: &Url) {
        let _ = endpoint;
    }

    /// Returns every endpoint this strategy can hand out.
    fn endpoints(&self) -> Vec<Url>;
}

/// Always returns the same node.
#[derive(Debug, Clone)]
pub struct FixedEndpoint {
    url: Url,
}

impl FixedEndpoint {
    /// Creates a strategy that always uses `url`.
    pub fn new(url: Url) -> Self {
        Self { url }
    }

    /// Parses `url` and wraps it.
    ///
    /// # Errors
    ///
    /// Returns an error if `url` is not a valid URL.
    pub fn parse(url: &str) -> WaxResult<Self> {
        Ok(Self::new(Url::parse(url)?))
    }
}

impl EndpointStrategy for FixedEndpoint {
    fn next_endpoint(&self) -> Url {
        self.url.clone()
    }

    fn endpoints(&self) -> Vec<Url> {
        vec![self.url.clone()]
    }
}

/// Rotates through a list of nodes, one per request.
///
/// A node reported as failing is skipped once on its next turn. When every
/// node is marked, rotation carries on regardless.
#[derive(Debug)]
pub struct RoundRobinEndpoints {
    urls: Vec<Url>,
    cursor: AtomicUsize,
    failed: Vec<AtomicBool>,
}

impl RoundRobinEndpoints {
    /// Creates a rotating strategy over `urls`.
    ///
    /// # Errors
    ///
    /// Returns [`WaxError::Config`] if `urls` is empty.
    pub fn new(urls: Vec<Url>) -> WaxResult<Self> {
        if urls.is_empty() {
            return Err(WaxError::Config(
                "at least one endpoint is required".to_string(),
            ));
        }
        let failed = urls.iter().map(|_| AtomicBool::new(false)).collect();
        Ok(Self {
            urls,
            cursor: AtomicUsize::new(0),
            failed,
        })
    }

    /// Parses every entry of `urls`.
    ///
    /// # Errors
    ///
    /// Returns an error if any URL is invalid or the list is empty.
    pub fn parse<I, S>(urls: I) -> WaxResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let urls = urls
            .into_iter()
            .map(|u| Url::parse(u.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(urls)
    }
}

impl EndpointStrategy for RoundRobinEndpoints {
    fn next_endpoint(&self) -> Url {
        let len = self.urls.len();
        for _ in 0..len {
            let index = self.cursor.fetch_add(1, Ordering::Relaxed) % len;
            if !self.failed[index].swap(false, Ordering::Relaxed) {
                return self.urls[index].clone();
            }
        }
        let index = self.cursor.fetch_add(1, Ordering::Relaxed) % len;
        self.urls[index].clone()
    }

    fn report_failure(&self, endpoint: &Url) {
        if let Some(index) = self.urls.iter().position(|url| url == endpoint) {
            self.failed[index].store(true, Ordering::Relaxed);
        }
    }

    fn endpoints(&self) -> Vec<Url> {
        self.urls.clone()
    }
}
