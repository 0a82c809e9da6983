//! Shared automation context and page handles
//!
//! One browser is launched lazily and shared for a whole crawl phase. Pages
//! are handed out one at a time and owned exclusively by the component that
//! asked for them. The crawl engine only sees the `SessionProvider` and
//! `PageHandle` traits so it can be driven by a scripted site in tests.

pub mod page;
pub mod pool;

pub use page::ChromePage;
pub use pool::{AutomationContext, SessionPool};

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::future::Future;

use crate::config::CrawlConfig;
use crate::crawl_engine::crawl_types::RawContent;
use crate::utils::{CHROME_USER_AGENT, VIEWPORT_HEIGHT, VIEWPORT_WIDTH};

/// One exclusively owned page on the shared context
pub trait PageHandle: Send {
    /// Load `url` and wait for navigation to finish
    fn navigate(&mut self, url: &str) -> impl Future<Output = Result<()>> + Send;

    /// Full rendered markup of the current document
    fn content(&mut self) -> impl Future<Output = Result<RawContent>> + Send;

    /// Release the page; never fails
    fn close(self) -> impl Future<Output = ()> + Send;
}

/// Source of page handles backed by one shared automation context
pub trait SessionProvider: Sync {
    type Page: PageHandle;

    /// Open a fresh, fully configured page, launching the context if needed
    fn new_page(&self) -> impl Future<Output = Result<Self::Page>> + Send;

    /// Tear down the context and every page on it; idempotent
    fn close_context(&self) -> impl Future<Output = ()> + Send;

    /// Resource counters; zeros rather than an error when nothing is live
    fn stats(&self) -> impl Future<Output = SessionStats> + Send;
}

/// Live resource counters reported by a `SessionProvider`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    /// Pages open on the live context
    pub pages: usize,
    /// Live contexts (0 or 1)
    pub contexts: usize,
    /// Contexts launched over the provider's lifetime
    pub launches: u64,
}

impl std::fmt::Display for SessionStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "pages={} contexts={} launches={}",
            self.pages, self.contexts, self.launches
        )
    }
}

/// Browser options fixed for the lifetime of a pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionPoolConfig {
    pub headless: bool,
    pub navigation_timeout_secs: u64,
    pub accept_language: String,
    pub user_agent: String,
    pub viewport_width: u32,
    pub viewport_height: u32,
    /// Fail image, stylesheet and font requests before they leave the browser
    pub block_resources: bool,
}

impl Default for SessionPoolConfig {
    fn default() -> Self {
        Self {
            headless: true,
            navigation_timeout_secs: crate::utils::NAVIGATION_TIMEOUT_SECS,
            accept_language: crate::utils::ACCEPT_LANGUAGE.to_string(),
            user_agent: CHROME_USER_AGENT.to_string(),
            viewport_width: VIEWPORT_WIDTH,
            viewport_height: VIEWPORT_HEIGHT,
            block_resources: true,
        }
    }
}

impl From<&CrawlConfig> for SessionPoolConfig {
    fn from(config: &CrawlConfig) -> Self {
        Self {
            headless: config.headless(),
            navigation_timeout_secs: config.navigation_timeout_secs(),
            accept_language: config.accept_language().to_string(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_config_follows_crawl_config() {
        let crawl = CrawlConfig::builder()
            .base_url("https://fitmap.jp")
            .headless(false)
            .navigation_timeout_secs(12)
            .build()
            .expect("valid config");
        let pool = SessionPoolConfig::from(&crawl);
        assert!(!pool.headless);
        assert_eq!(pool.navigation_timeout_secs, 12);
        assert_eq!(pool.accept_language, "ja-JP,ja;q=0.9,en;q=0.8");
        assert_eq!((pool.viewport_width, pool.viewport_height), (1920, 1080));
        assert!(pool.block_resources);
    }

    #[test]
    fn stats_display_is_compact() {
        let stats = SessionStats {
            pages: 2,
            contexts: 1,
            launches: 3,
        };
        assert_eq!(stats.to_string(), "pages=2 contexts=1 launches=3");
    }
}
