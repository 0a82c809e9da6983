//! Getter methods for `CrawlConfig`

use std::time::Duration;

use super::types::CrawlConfig;
use crate::crawl_engine::retry::RetryPolicy;
use crate::region::Region;
use crate::utils::DelayRange;

impl CrawlConfig {
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn sample_mode(&self) -> bool {
        self.sample_mode
    }

    #[must_use]
    pub fn debug(&self) -> bool {
        self.debug
    }

    #[must_use]
    pub fn headless(&self) -> bool {
        self.headless
    }

    #[must_use]
    pub fn first_region(&self) -> u8 {
        self.first_region
    }

    #[must_use]
    pub fn last_region(&self) -> u8 {
        self.last_region
    }

    /// Regions this run visits, in increasing id order
    pub fn regions(&self) -> impl Iterator<Item = Region> + use<> {
        Region::range(self.first_region, self.last_region)
    }

    #[must_use]
    pub fn max_pages(&self) -> u32 {
        self.max_pages
    }

    /// Page ceiling for the current mode
    #[must_use]
    pub fn effective_max_pages(&self) -> u32 {
        if self.sample_mode {
            self.sample_max_pages
        } else {
            self.max_pages
        }
    }

    /// Per-region cap on listings passed to the detail fetcher
    ///
    /// `None` outside sample mode.
    #[must_use]
    pub fn listing_limit(&self) -> Option<usize> {
        self.sample_mode.then_some(self.sample_listing_limit)
    }

    #[must_use]
    pub fn empty_page_tolerance(&self) -> u32 {
        self.empty_page_tolerance
    }

    #[must_use]
    pub fn first_page_settle(&self) -> Duration {
        self.first_page_settle
    }

    #[must_use]
    pub fn retry_page_settle(&self) -> Duration {
        self.retry_page_settle
    }

    #[must_use]
    pub fn pagination_settle(&self) -> DelayRange {
        self.pagination_settle
    }

    #[must_use]
    pub fn detail_settle(&self) -> Duration {
        self.detail_settle
    }

    #[must_use]
    pub fn detail_delay(&self) -> DelayRange {
        self.detail_delay
    }

    #[must_use]
    pub fn region_delay(&self) -> Duration {
        self.region_delay
    }

    #[must_use]
    pub fn session_request_ceiling(&self) -> u32 {
        self.session_request_ceiling
    }

    #[must_use]
    pub fn first_page_retry(&self) -> RetryPolicy {
        self.first_page_retry
    }

    #[must_use]
    pub fn pagination_retry(&self) -> RetryPolicy {
        self.pagination_retry
    }

    #[must_use]
    pub fn detail_retry(&self) -> RetryPolicy {
        self.detail_retry
    }

    #[must_use]
    pub fn navigation_timeout_secs(&self) -> u64 {
        self.navigation_timeout_secs
    }

    #[must_use]
    pub fn accept_language(&self) -> &str {
        &self.accept_language
    }
}
