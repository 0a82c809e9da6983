pub mod browser_profile;
pub mod browser_setup;
pub mod config;
pub mod crawl_engine;
pub mod pipeline;
pub mod region;
pub mod session_pool;
pub mod utils;

pub use browser_setup::{download_managed_browser, find_browser_executable, launch_browser};
pub use config::CrawlConfig;
pub use crawl_engine::{
    ContentMap, CrawlError, CrawlOrchestrator, CrawlReport, CrawlResult, DetailFetcher,
    ListingExtractor, ListingReference, ListingSet, MarkupExtractor, PageProbe, PageVerdict,
    RegionCrawler, RegionSummary, RetryPolicy, classify,
};
pub use pipeline::{FacilityPipeline, FacilityRecord, ListingPipeline, save_records};
pub use region::Region;
pub use session_pool::{PageHandle, SessionPool, SessionPoolConfig, SessionProvider, SessionStats};

/// Crawl every configured region with a fresh browser and the facility pipeline
///
/// The browser is launched up front so a machine without a usable Chrome
/// fails here rather than region by region.
pub async fn crawl(config: &CrawlConfig) -> CrawlResult<CrawlReport<FacilityRecord>> {
    let extractor = MarkupExtractor::new(config.base_url())?;
    let pool = SessionPool::new(SessionPoolConfig::from(config));

    let preflight = pool.acquire_context().await.map(drop);
    if let Err(e) = preflight {
        pool.close_context().await;
        return Err(CrawlError::Browser(format!("{e:#}")));
    }

    let orchestrator = CrawlOrchestrator::new(&pool, &extractor, config, FacilityPipeline::new());
    Ok(orchestrator.run().await)
}
