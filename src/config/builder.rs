//! Type-safe builder for `CrawlConfig` using the typestate pattern
//!
//! The base URL is the only required field; `build()` exists only once it
//! has been supplied. Everything else starts from the defaults in
//! `utils::constants`.

use std::marker::PhantomData;
use std::time::Duration;
use url::Url;

use super::types::CrawlConfig;
use crate::crawl_engine::crawl_types::{CrawlError, CrawlResult};
use crate::crawl_engine::retry::RetryPolicy;
use crate::utils::{
    ACCEPT_LANGUAGE, DEFAULT_MAX_PAGES, DETAIL_DELAY_MAX, DETAIL_DELAY_MIN, DETAIL_SETTLE,
    DelayRange, EMPTY_PAGE_TOLERANCE, FIRST_PAGE_BACKOFF, FIRST_PAGE_SETTLE,
    NAVIGATION_TIMEOUT_SECS, PAGINATION_SETTLE_MAX, PAGINATION_SETTLE_MIN, REGION_COUNT,
    REGION_DELAY, RETRY_PAGE_SETTLE, SAMPLE_LISTING_LIMIT, SAMPLE_MAX_PAGES,
    SESSION_REQUEST_CEILING,
};

// Type states for the builder
pub struct WithBaseUrl;

pub struct CrawlConfigBuilder<State = ()> {
    pub(crate) draft: CrawlConfig,
    pub(crate) _phantom: PhantomData<State>,
}

impl Default for CrawlConfigBuilder<()> {
    fn default() -> Self {
        Self {
            draft: CrawlConfig {
                base_url: String::new(),
                sample_mode: false,
                debug: false,
                headless: true,
                first_region: 1,
                last_region: REGION_COUNT,
                max_pages: DEFAULT_MAX_PAGES,
                sample_max_pages: SAMPLE_MAX_PAGES,
                sample_listing_limit: SAMPLE_LISTING_LIMIT,
                empty_page_tolerance: EMPTY_PAGE_TOLERANCE,
                first_page_settle: FIRST_PAGE_SETTLE,
                retry_page_settle: RETRY_PAGE_SETTLE,
                pagination_settle: DelayRange::new(PAGINATION_SETTLE_MIN, PAGINATION_SETTLE_MAX),
                detail_settle: DETAIL_SETTLE,
                detail_delay: DelayRange::new(DETAIL_DELAY_MIN, DETAIL_DELAY_MAX),
                region_delay: REGION_DELAY,
                session_request_ceiling: SESSION_REQUEST_CEILING,
                first_page_retry: RetryPolicy::new(2, FIRST_PAGE_BACKOFF),
                pagination_retry: RetryPolicy::single_attempt(),
                detail_retry: RetryPolicy::new(2, Duration::ZERO),
                navigation_timeout_secs: NAVIGATION_TIMEOUT_SECS,
                accept_language: ACCEPT_LANGUAGE.to_string(),
            },
            _phantom: PhantomData,
        }
    }
}

impl CrawlConfig {
    /// Create a builder for configuring a `CrawlConfig` with a fluent interface
    #[must_use]
    pub fn builder() -> CrawlConfigBuilder<()> {
        CrawlConfigBuilder::default()
    }
}

impl CrawlConfigBuilder<()> {
    pub fn base_url(mut self, url: impl Into<String>) -> CrawlConfigBuilder<WithBaseUrl> {
        let url = url.into();
        self.draft.base_url = url.trim().trim_end_matches('/').to_string();
        CrawlConfigBuilder {
            draft: self.draft,
            _phantom: PhantomData,
        }
    }
}

// Build method only available when all required fields are set
impl CrawlConfigBuilder<WithBaseUrl> {
    pub fn build(self) -> CrawlResult<CrawlConfig> {
        self.draft.validated()
    }
}

impl CrawlConfig {
    /// Check every invariant `CrawlConfig` promises; shared by `build()` and
    /// deserialization
    pub(crate) fn validated(self) -> CrawlResult<Self> {
        let mut config = self;
        config.base_url = config.base_url.trim().trim_end_matches('/').to_string();

        let parsed = Url::parse(&config.base_url).map_err(|e| CrawlError::InvalidUrl {
            url: config.base_url.clone(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(CrawlError::InvalidUrl {
                url: config.base_url.clone(),
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }

        for id in [config.first_region, config.last_region] {
            if !(1..=REGION_COUNT).contains(&id) {
                return Err(CrawlError::InvalidRegion(id));
            }
        }
        if config.first_region > config.last_region {
            return Err(CrawlError::Config(format!(
                "region range {}-{} is reversed",
                config.first_region, config.last_region
            )));
        }

        if config.max_pages == 0 || config.sample_max_pages == 0 {
            return Err(CrawlError::Config("page ceilings must be at least 1".into()));
        }
        if config.session_request_ceiling == 0 {
            return Err(CrawlError::Config(
                "session_request_ceiling must be at least 1".into(),
            ));
        }
        if config.empty_page_tolerance == 0 {
            return Err(CrawlError::Config(
                "empty_page_tolerance must be at least 1".into(),
            ));
        }

        Ok(config)
    }
}

// Builder methods available at any state
impl<State> CrawlConfigBuilder<State> {
    /// Restrict page ceilings and per-region listings for a quick smoke run
    #[must_use]
    pub fn sample_mode(mut self, enabled: bool) -> Self {
        self.draft.sample_mode = enabled;
        self
    }

    /// Log the full page probe for every pagination page
    #[must_use]
    pub fn debug(mut self, enabled: bool) -> Self {
        self.draft.debug = enabled;
        self
    }

    #[must_use]
    pub fn headless(mut self, headless: bool) -> Self {
        self.draft.headless = headless;
        self
    }

    /// Visit regions `first..=last`; validated in `build()`
    #[must_use]
    pub fn regions(mut self, first: u8, last: u8) -> Self {
        self.draft.first_region = first;
        self.draft.last_region = last;
        self
    }

    #[must_use]
    pub fn max_pages(mut self, pages: u32) -> Self {
        self.draft.max_pages = pages;
        self
    }

    #[must_use]
    pub fn sample_max_pages(mut self, pages: u32) -> Self {
        self.draft.sample_max_pages = pages;
        self
    }

    #[must_use]
    pub fn sample_listing_limit(mut self, limit: usize) -> Self {
        self.draft.sample_listing_limit = limit;
        self
    }

    #[must_use]
    pub fn empty_page_tolerance(mut self, tolerance: u32) -> Self {
        self.draft.empty_page_tolerance = tolerance;
        self
    }

    #[must_use]
    pub fn first_page_settle(mut self, settle: Duration) -> Self {
        self.draft.first_page_settle = settle;
        self
    }

    #[must_use]
    pub fn retry_page_settle(mut self, settle: Duration) -> Self {
        self.draft.retry_page_settle = settle;
        self
    }

    #[must_use]
    pub fn pagination_settle(mut self, range: DelayRange) -> Self {
        self.draft.pagination_settle = range;
        self
    }

    #[must_use]
    pub fn detail_settle(mut self, settle: Duration) -> Self {
        self.draft.detail_settle = settle;
        self
    }

    #[must_use]
    pub fn detail_delay(mut self, range: DelayRange) -> Self {
        self.draft.detail_delay = range;
        self
    }

    #[must_use]
    pub fn region_delay(mut self, delay: Duration) -> Self {
        self.draft.region_delay = delay;
        self
    }

    #[must_use]
    pub fn session_request_ceiling(mut self, ceiling: u32) -> Self {
        self.draft.session_request_ceiling = ceiling;
        self
    }

    #[must_use]
    pub fn first_page_retry(mut self, policy: RetryPolicy) -> Self {
        self.draft.first_page_retry = policy;
        self
    }

    #[must_use]
    pub fn pagination_retry(mut self, policy: RetryPolicy) -> Self {
        self.draft.pagination_retry = policy;
        self
    }

    #[must_use]
    pub fn detail_retry(mut self, policy: RetryPolicy) -> Self {
        self.draft.detail_retry = policy;
        self
    }

    #[must_use]
    pub fn navigation_timeout_secs(mut self, secs: u64) -> Self {
        self.draft.navigation_timeout_secs = secs;
        self
    }

    #[must_use]
    pub fn accept_language(mut self, value: impl Into<String>) -> Self {
        self.draft.accept_language = value.into();
        self
    }

    /// Zero every settle, delay and backoff while keeping attempt counts
    ///
    /// Intended for tests that drive the engine against a scripted site.
    #[must_use]
    pub fn without_delays(mut self) -> Self {
        let c = &mut self.draft;
        c.first_page_settle = Duration::ZERO;
        c.retry_page_settle = Duration::ZERO;
        c.pagination_settle = DelayRange::none();
        c.detail_settle = Duration::ZERO;
        c.detail_delay = DelayRange::none();
        c.region_delay = Duration::ZERO;
        c.first_page_retry = RetryPolicy::new(c.first_page_retry.max_attempts(), Duration::ZERO);
        c.pagination_retry = RetryPolicy::new(c.pagination_retry.max_attempts(), Duration::ZERO);
        c.detail_retry = RetryPolicy::new(c.detail_retry.max_attempts(), Duration::ZERO);
        self
    }
}
