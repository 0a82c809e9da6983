//! Core configuration type for a crawl run
//!
//! Every wait, ceiling and retry the crawl engine applies is a field here so a
//! test can shrink delays to zero and a run can be replayed from its
//! serialized config. Deserialized configs pass the same checks as `build()`.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::crawl_engine::crawl_types::CrawlError;
use crate::crawl_engine::retry::RetryPolicy;
use crate::utils::DelayRange;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ConfigFile")]
pub struct CrawlConfig {
    /// Site root without trailing slash
    ///
    /// **INVARIANT:** parses as an absolute http(s) URL (checked in builder).
    pub(crate) base_url: String,
    pub(crate) sample_mode: bool,
    pub(crate) debug: bool,
    pub(crate) headless: bool,

    /// First and last region id visited, inclusive, within `1..=47`
    pub(crate) first_region: u8,
    pub(crate) last_region: u8,

    /// Page ceiling per region in a full run
    pub(crate) max_pages: u32,
    /// Page ceiling per region in sample mode
    pub(crate) sample_max_pages: u32,
    /// Listings handed to the detail fetcher per region in sample mode
    pub(crate) sample_listing_limit: usize,

    /// Consecutive empty or failed pagination pages that end a region
    pub(crate) empty_page_tolerance: u32,

    pub(crate) first_page_settle: Duration,
    pub(crate) retry_page_settle: Duration,
    pub(crate) pagination_settle: DelayRange,
    pub(crate) detail_settle: Duration,
    pub(crate) detail_delay: DelayRange,
    pub(crate) region_delay: Duration,

    /// Navigations one detail page handle serves before it is recycled
    pub(crate) session_request_ceiling: u32,

    pub(crate) first_page_retry: RetryPolicy,
    pub(crate) pagination_retry: RetryPolicy,
    pub(crate) detail_retry: RetryPolicy,

    pub(crate) navigation_timeout_secs: u64,
    pub(crate) accept_language: String,
}

/// Serialized form of `CrawlConfig`, validated on the way in
#[derive(Deserialize)]
struct ConfigFile {
    base_url: String,
    sample_mode: bool,
    debug: bool,
    headless: bool,
    first_region: u8,
    last_region: u8,
    max_pages: u32,
    sample_max_pages: u32,
    sample_listing_limit: usize,
    empty_page_tolerance: u32,
    first_page_settle: Duration,
    retry_page_settle: Duration,
    pagination_settle: DelayRange,
    detail_settle: Duration,
    detail_delay: DelayRange,
    region_delay: Duration,
    session_request_ceiling: u32,
    first_page_retry: RetryPolicy,
    pagination_retry: RetryPolicy,
    detail_retry: RetryPolicy,
    navigation_timeout_secs: u64,
    accept_language: String,
}

impl TryFrom<ConfigFile> for CrawlConfig {
    type Error = CrawlError;

    fn try_from(file: ConfigFile) -> Result<Self, Self::Error> {
        CrawlConfig {
            base_url: file.base_url,
            sample_mode: file.sample_mode,
            debug: file.debug,
            headless: file.headless,
            first_region: file.first_region,
            last_region: file.last_region,
            max_pages: file.max_pages,
            sample_max_pages: file.sample_max_pages,
            sample_listing_limit: file.sample_listing_limit,
            empty_page_tolerance: file.empty_page_tolerance,
            first_page_settle: file.first_page_settle,
            retry_page_settle: file.retry_page_settle,
            pagination_settle: file.pagination_settle,
            detail_settle: file.detail_settle,
            detail_delay: file.detail_delay,
            region_delay: file.region_delay,
            session_request_ceiling: file.session_request_ceiling,
            first_page_retry: file.first_page_retry,
            pagination_retry: file.pagination_retry,
            detail_retry: file.detail_retry,
            navigation_timeout_secs: file.navigation_timeout_secs,
            accept_language: file.accept_language,
        }
        .validated()
    }
}
