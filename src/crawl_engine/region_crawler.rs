//! Adaptive pagination over one region's listing pages
//!
//! Page 1 is fetched with a one-shot retry; a region whose page 1 only loads
//! on the retry yields that page's listings and is not paginated. Otherwise
//! pages 2.. are fetched until the page ceiling is reached or
//! `empty_page_tolerance` consecutive pages come back empty or fail.
//! Emptiness is decided by `classify`, never by the HTTP outcome alone,
//! because the site keeps serving hollow index pages past the end of a region.

use anyhow::{Result, anyhow};
use log::{debug, info, warn};
use std::time::Duration;

use super::crawl_types::{ListingSet, RawContent};
use super::extractor::ListingExtractor;
use super::page_probe::{PageVerdict, classify};
use super::retry::RetryPolicy;
use crate::config::CrawlConfig;
use crate::region::Region;
use crate::session_pool::{PageHandle, SessionProvider};
use crate::utils::{DelayRange, sleep_for};

const TARGET: &str = "fitmap::region";

/// Where the crawler is within the current region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlState {
    Init,
    FetchingFirstPage,
    FetchingNextPage { page: u32 },
    Done,
}

/// Settle time applied after a successful navigation
#[derive(Debug, Clone, Copy)]
enum Settle {
    /// First attempt waits `initial`, later attempts wait `retry`
    Escalating { initial: Duration, retry: Duration },
    Randomized(DelayRange),
}

impl Settle {
    fn for_attempt(&self, attempt: u32) -> Duration {
        match self {
            Self::Escalating { initial, retry } => {
                if attempt <= 1 {
                    *initial
                } else {
                    *retry
                }
            }
            Self::Randomized(range) => range.sample(),
        }
    }
}

/// A loaded document and the attempts it took
struct Loaded {
    html: RawContent,
    attempts: u32,
}

/// Collects the listing references of one region at a time
///
/// The crawler keeps one page handle across regions and rebuilds it only
/// after a navigation failure. Call `close` to release it.
pub struct RegionCrawler<'a, S: SessionProvider, E: ListingExtractor> {
    sessions: &'a S,
    extractor: &'a E,
    config: &'a CrawlConfig,
    page: Option<S::Page>,
    state: CrawlState,
    empty_pages: u32,
    pages_explored: u32,
}

impl<'a, S: SessionProvider, E: ListingExtractor> RegionCrawler<'a, S, E> {
    pub fn new(sessions: &'a S, extractor: &'a E, config: &'a CrawlConfig) -> Self {
        Self {
            sessions,
            extractor,
            config,
            page: None,
            state: CrawlState::Init,
            empty_pages: 0,
            pages_explored: 0,
        }
    }

    #[must_use]
    pub fn state(&self) -> CrawlState {
        self.state
    }

    /// Consecutive empty or failed pages at the end of the last region
    #[must_use]
    pub fn empty_pages(&self) -> u32 {
        self.empty_pages
    }

    /// Page numbers attempted for the last region, including failures
    #[must_use]
    pub fn pages_explored(&self) -> u32 {
        self.pages_explored
    }

    /// Every listing reference of `region`, deduplicated in discovery order
    ///
    /// Never fails: a region whose first page cannot be loaded yields an
    /// empty set, and pagination failures only count toward termination.
    pub async fn fetch_region(&mut self, region: Region) -> ListingSet {
        self.state = CrawlState::FetchingFirstPage;
        self.empty_pages = 0;
        self.pages_explored = 1;

        let config = self.config;
        let base_url = config.base_url();
        let mut listings = ListingSet::new();

        let first_url = region.page_url(base_url, 1);
        let first_settle = Settle::Escalating {
            initial: config.first_page_settle(),
            retry: config.retry_page_settle(),
        };
        match self.load(&first_url, config.first_page_retry(), first_settle).await {
            Ok(Loaded { html, attempts }) => {
                let probe = self.extractor.extract(&html);
                let added = listings.extend(probe.listings);
                info!(target: TARGET, "{region}: page 1 yielded {added} listings");
                // A region that only loaded on retry is not paginated
                if attempts > 1 {
                    info!(
                        target: TARGET,
                        "{region}: page 1 needed {attempts} attempts, keeping its {} listings",
                        listings.len()
                    );
                    self.state = CrawlState::Done;
                    return listings;
                }
            }
            Err(e) => {
                warn!(target: TARGET, "{region}: first page unavailable, skipping region: {e:#}");
                self.state = CrawlState::Done;
                return listings;
            }
        }

        let max_pages = config.effective_max_pages();
        let tolerance = config.empty_page_tolerance();
        let settle = Settle::Randomized(config.pagination_settle());

        for page_no in 2..=max_pages {
            self.state = CrawlState::FetchingNextPage { page: page_no };
            self.pages_explored = page_no;
            let url = region.page_url(base_url, page_no);

            let html = match self.load(&url, config.pagination_retry(), settle).await {
                Ok(loaded) => loaded.html,
                Err(e) => {
                    self.empty_pages += 1;
                    warn!(target: TARGET, "{region}: page {page_no} failed: {e:#}");
                    if self.empty_pages >= tolerance {
                        break;
                    }
                    continue;
                }
            };

            let probe = self.extractor.extract(&html);
            if config.debug() {
                debug!(target: TARGET, "{region}: page {page_no} probe {probe:?}");
            }
            debug!(
                target: TARGET,
                "{region}: page {page_no} next link present: {}",
                probe.has_next_link
            );

            match classify(&probe) {
                PageVerdict::Stop(reason) => {
                    self.empty_pages += 1;
                    info!(
                        target: TARGET,
                        "{region}: page {page_no} is empty ({}), {} of {tolerance} tolerated",
                        reason.as_str(),
                        self.empty_pages
                    );
                    if self.empty_pages >= tolerance {
                        break;
                    }
                }
                PageVerdict::Continue => {
                    self.empty_pages = 0;
                    let found = probe.listing_count();
                    let added = listings.extend(probe.listings);
                    debug!(
                        target: TARGET,
                        "{region}: page {page_no} yielded {found} listings ({added} new)"
                    );
                }
            }
        }

        self.state = CrawlState::Done;
        info!(
            target: TARGET,
            "{region}: {} unique listings over {} pages",
            listings.len(),
            self.pages_explored
        );
        listings
    }

    /// Release the page handle; the crawler can still be reused afterwards
    pub async fn close(&mut self) {
        if let Some(page) = self.page.take() {
            page.close().await;
        }
    }

    async fn load(&mut self, url: &str, policy: RetryPolicy, settle: Settle) -> Result<Loaded> {
        let mut attempt = 1;
        loop {
            match self.try_load(url, settle.for_attempt(attempt)).await {
                Ok(html) => {
                    return Ok(Loaded {
                        html,
                        attempts: attempt,
                    });
                }
                Err(e) => {
                    // A handle that failed once is not trusted again
                    self.close().await;
                    if !policy.should_retry(attempt) {
                        return Err(e);
                    }
                    warn!(
                        target: TARGET,
                        "Attempt {attempt} for {url} failed: {e:#}; retrying in {:?}",
                        policy.backoff()
                    );
                    policy.pause().await;
                    attempt += 1;
                }
            }
        }
    }

    async fn try_load(&mut self, url: &str, settle: Duration) -> Result<RawContent> {
        let page = self.ensure_page().await?;
        page.navigate(url).await?;
        sleep_for(settle).await;
        page.content().await
    }

    async fn ensure_page(&mut self) -> Result<&mut S::Page> {
        if self.page.is_none() {
            self.page = Some(self.sessions.new_page().await?);
        }
        self.page
            .as_mut()
            .ok_or_else(|| anyhow!("Page handle unavailable"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escalating_settle_switches_after_first_attempt() {
        let settle = Settle::Escalating {
            initial: Duration::from_millis(2000),
            retry: Duration::from_millis(3000),
        };
        assert_eq!(settle.for_attempt(1), Duration::from_millis(2000));
        assert_eq!(settle.for_attempt(2), Duration::from_millis(3000));
    }

    #[test]
    fn randomized_settle_stays_in_range() {
        let range = DelayRange::new(Duration::from_millis(1000), Duration::from_millis(2000));
        let settle = Settle::Randomized(range);
        for attempt in 1..5 {
            let d = settle.for_attempt(attempt);
            assert!(d >= range.min() && d <= range.max());
        }
    }
}
