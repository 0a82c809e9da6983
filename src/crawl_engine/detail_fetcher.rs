//! Detail-page fetching through a recycled page handle
//!
//! Long-lived pages accumulate memory and eventually stop responding, so a
//! handle serves at most `session_request_ceiling` navigations before it is
//! closed and replaced. Any failed fetch recycles the handle immediately.

use anyhow::Result;
use log::{debug, info, warn};

use super::crawl_types::{ContentMap, ListingReference, RawContent};
use crate::config::CrawlConfig;
use crate::session_pool::{PageHandle, SessionProvider};
use crate::utils::sleep_for;

const TARGET: &str = "fitmap::detail";

/// Items between progress lines in `fetch_many`
const PROGRESS_INTERVAL: usize = 5;

/// Requests between session stats lines at debug level
const STATS_INTERVAL: u64 = 3;

pub struct DetailFetcher<'a, S: SessionProvider> {
    sessions: &'a S,
    config: &'a CrawlConfig,
    page: Option<S::Page>,
    requests_on_page: u32,
    recycles: u32,
    total_requests: u64,
}

impl<'a, S: SessionProvider> DetailFetcher<'a, S> {
    pub fn new(sessions: &'a S, config: &'a CrawlConfig) -> Self {
        Self {
            sessions,
            config,
            page: None,
            requests_on_page: 0,
            recycles: 0,
            total_requests: 0,
        }
    }

    /// Navigations served by the current page handle
    #[must_use]
    pub fn requests_on_page(&self) -> u32 {
        self.requests_on_page
    }

    /// Times the page handle has been recycled
    #[must_use]
    pub fn recycles(&self) -> u32 {
        self.recycles
    }

    /// Navigations issued over the fetcher's lifetime, retries included
    #[must_use]
    pub fn total_requests(&self) -> u64 {
        self.total_requests
    }

    /// Raw content of one listing, or `None` once its retries are spent
    ///
    /// An empty document counts as no content and is not retried.
    pub async fn fetch_detail(&mut self, reference: &ListingReference) -> Option<RawContent> {
        let policy = self.config.detail_retry();
        let mut attempt = 1;
        loop {
            if self.requests_on_page >= self.config.session_request_ceiling() {
                debug!(
                    target: TARGET,
                    "Request ceiling {} reached, recycling page",
                    self.config.session_request_ceiling()
                );
                self.recycle().await;
            }

            match self.try_fetch(reference).await {
                Ok(content) if content.trim().is_empty() => {
                    warn!(target: TARGET, "{reference}: empty document");
                    return None;
                }
                Ok(content) => return Some(content),
                Err(e) => {
                    self.recycle().await;
                    if !policy.should_retry(attempt) {
                        warn!(
                            target: TARGET,
                            "{reference}: giving up after {attempt} attempts: {e:#}"
                        );
                        return None;
                    }
                    warn!(target: TARGET, "{reference}: attempt {attempt} failed: {e:#}; retrying");
                    policy.pause().await;
                    attempt += 1;
                }
            }
        }
    }

    /// Fetch every reference in order; only non-empty successes are kept
    pub async fn fetch_many(&mut self, references: &[ListingReference]) -> ContentMap {
        let mut contents = ContentMap::new();
        let total = references.len();

        for (index, reference) in references.iter().enumerate() {
            if let Some(content) = self.fetch_detail(reference).await {
                contents.insert(reference.clone(), content);
            }

            let done = index + 1;
            if done % PROGRESS_INTERVAL == 0 || done == total {
                let stats = self.sessions.stats().await;
                info!(
                    target: TARGET,
                    "Details {done}/{total} ({} fetched) [{stats}]",
                    contents.len()
                );
            }

            if done < total {
                self.config.detail_delay().pause().await;
            }
        }

        contents
    }

    /// Release the page handle
    pub async fn close(&mut self) {
        if let Some(page) = self.page.take() {
            page.close().await;
        }
    }

    async fn try_fetch(&mut self, reference: &ListingReference) -> Result<RawContent> {
        if self.page.is_none() {
            self.page = Some(self.open_page().await?);
        }
        let Some(page) = self.page.as_mut() else {
            anyhow::bail!("Page handle unavailable");
        };

        self.requests_on_page += 1;
        self.total_requests += 1;

        page.navigate(reference.as_str()).await?;
        sleep_for(self.config.detail_settle()).await;
        let content = page.content().await?;

        if self.total_requests % STATS_INTERVAL == 0 {
            debug!(target: TARGET, "Session stats: {}", self.sessions.stats().await);
        }
        Ok(content)
    }

    /// New page, falling back to a fresh context if the current one refuses
    async fn open_page(&self) -> Result<S::Page> {
        match self.sessions.new_page().await {
            Ok(page) => Ok(page),
            Err(e) => {
                warn!(
                    target: TARGET,
                    "Page creation failed: {e:#}; restarting automation context"
                );
                self.sessions.close_context().await;
                self.sessions.new_page().await
            }
        }
    }

    /// Close the current handle and reset its request counter
    ///
    /// Only a handle that was actually closed counts as a recycle.
    async fn recycle(&mut self) {
        self.requests_on_page = 0;
        if let Some(page) = self.page.take() {
            page.close().await;
            self.recycles += 1;
        }
    }
}
