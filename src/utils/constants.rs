//! Shared configuration constants for the crawler
//!
//! Default values used by `CrawlConfig` and the session pool. Everything the
//! crawl engine waits on or counts against is defined here so the numbers
//! live in one place.

use std::time::Duration;

/// Directory site crawled when no override is given
pub const DEFAULT_BASE_URL: &str = "https://fitmap.jp";

/// Number of regions (prefectures) enumerated by the crawl
pub const REGION_COUNT: u8 = 47;

/// Page-count ceiling per region in a full run
pub const DEFAULT_MAX_PAGES: u32 = 60;

/// Page-count ceiling per region in sample mode
pub const SAMPLE_MAX_PAGES: u32 = 3;

/// Listings passed to the detail fetcher per region in sample mode
pub const SAMPLE_LISTING_LIMIT: usize = 5;

/// Consecutive empty pages that end a region's pagination
///
/// The loop guard historically allowed two, but the site serves runs of
/// hollow pages once the real listings end, so the first one stops the loop.
pub const EMPTY_PAGE_TOLERANCE: u32 = 1;

/// Navigations a detail page handle serves before it is recycled
pub const SESSION_REQUEST_CEILING: u32 = 5;

/// Settle time after the first page of a region loads
pub const FIRST_PAGE_SETTLE: Duration = Duration::from_millis(2000);

/// Settle time after the first page is reloaded on the retry path
pub const RETRY_PAGE_SETTLE: Duration = Duration::from_millis(3000);

/// Backoff before the first page of a region is retried
pub const FIRST_PAGE_BACKOFF: Duration = Duration::from_millis(3000);

/// Randomized settle bounds after each pagination page loads
pub const PAGINATION_SETTLE_MIN: Duration = Duration::from_millis(1000);
pub const PAGINATION_SETTLE_MAX: Duration = Duration::from_millis(2000);

/// Settle time after a detail page loads
pub const DETAIL_SETTLE: Duration = Duration::from_millis(2000);

/// Randomized pause bounds between detail fetches
pub const DETAIL_DELAY_MIN: Duration = Duration::from_millis(1500);
pub const DETAIL_DELAY_MAX: Duration = Duration::from_millis(3000);

/// Pause between consecutive regions in both phases
pub const REGION_DELAY: Duration = Duration::from_millis(1000);

/// Deadline for a single navigation or content capture
pub const NAVIGATION_TIMEOUT_SECS: u64 = 30;

/// Language preference sent with every request
pub const ACCEPT_LANGUAGE: &str = "ja-JP,ja;q=0.9,en;q=0.8";

/// Desktop Chrome user agent presented by every page
pub const CHROME_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Fixed viewport for every page
pub const VIEWPORT_WIDTH: u32 = 1920;
pub const VIEWPORT_HEIGHT: u32 = 1080;
