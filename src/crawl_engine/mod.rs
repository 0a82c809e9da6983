//! Crawl Engine Module
//!
//! Region pagination, detail fetching and the orchestration that sequences
//! them over a shared `SessionProvider`.

// Sub-modules
pub mod crawl_types;
pub mod detail_fetcher;
pub mod extractor;
pub mod orchestrator;
pub mod page_probe;
pub mod page_timeout;
pub mod region_crawler;
pub mod retry;

// Re-export crawl types
pub use crawl_types::{ContentMap, CrawlError, CrawlResult, ListingReference, ListingSet, RawContent};

pub use detail_fetcher::DetailFetcher;
pub use extractor::{ListingExtractor, MarkupExtractor};
pub use orchestrator::{CrawlOrchestrator, CrawlReport, RegionSummary};
pub use page_probe::{EmptyReason, PageProbe, PageVerdict, classify};
pub use region_crawler::{CrawlState, RegionCrawler};
pub use retry::RetryPolicy;
