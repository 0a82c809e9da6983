//! Two-phase crawl orchestration
//!
//! Phase 1 walks every configured region through the `RegionCrawler` and
//! collects listing sets. The automation context is then closed so phase 2
//! starts on a fresh browser. Phase 2 runs a fresh `DetailFetcher` per
//! non-empty region and hands its content to the pipeline. The context is
//! closed again when the run ends, whatever happened in between.

use log::{error, info};
use serde::Serialize;
use std::time::{Duration, Instant};

use super::crawl_types::ListingSet;
use super::detail_fetcher::DetailFetcher;
use super::extractor::ListingExtractor;
use super::region_crawler::RegionCrawler;
use crate::config::CrawlConfig;
use crate::pipeline::ListingPipeline;
use crate::region::Region;
use crate::session_pool::SessionProvider;
use crate::utils::sleep_for;

const TARGET: &str = "fitmap::orchestrator";

/// Per-region outcome of a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegionSummary {
    pub region: Region,
    /// Unique listing references discovered in phase 1
    pub listings_found: usize,
    /// References handed to the detail fetcher after the sample cap
    pub details_requested: usize,
    /// References that yielded content
    pub details_fetched: usize,
    /// Records the pipeline produced for this region
    pub records: usize,
}

/// Everything a run produced
#[derive(Debug, Serialize)]
pub struct CrawlReport<R> {
    pub regions: Vec<RegionSummary>,
    pub records: Vec<R>,
    pub elapsed: Duration,
}

impl<R> CrawlReport<R> {
    #[must_use]
    pub fn total_listings(&self) -> usize {
        self.regions.iter().map(|r| r.listings_found).sum()
    }

    #[must_use]
    pub fn total_details(&self) -> usize {
        self.regions.iter().map(|r| r.details_fetched).sum()
    }

    /// Summary for one region, if it was part of the run
    #[must_use]
    pub fn region(&self, region: Region) -> Option<&RegionSummary> {
        self.regions.iter().find(|r| r.region == region)
    }
}

pub struct CrawlOrchestrator<'a, S, E, L>
where
    S: SessionProvider,
    E: ListingExtractor,
    L: ListingPipeline,
{
    sessions: &'a S,
    extractor: &'a E,
    config: &'a CrawlConfig,
    pipeline: L,
}

impl<'a, S, E, L> CrawlOrchestrator<'a, S, E, L>
where
    S: SessionProvider,
    E: ListingExtractor,
    L: ListingPipeline,
{
    pub fn new(sessions: &'a S, extractor: &'a E, config: &'a CrawlConfig, pipeline: L) -> Self {
        Self {
            sessions,
            extractor,
            config,
            pipeline,
        }
    }

    /// Run both phases; the automation context is closed on return
    pub async fn run(mut self) -> CrawlReport<L::Record> {
        let started = Instant::now();
        let regions: Vec<Region> = self.config.regions().collect();
        info!(
            target: TARGET,
            "Starting crawl of {} regions (sample mode: {})",
            regions.len(),
            self.config.sample_mode()
        );

        let discovered = self.collect_listings(&regions).await;
        // Phase boundary: detail fetching starts on a fresh browser
        self.sessions.close_context().await;

        let (summaries, records) = self.fetch_details(discovered).await;
        self.sessions.close_context().await;

        let report = CrawlReport {
            regions: summaries,
            records,
            elapsed: started.elapsed(),
        };
        info!(
            target: TARGET,
            "Crawl finished in {:.1}s: {} listings found, {} details fetched, {} records",
            report.elapsed.as_secs_f64(),
            report.total_listings(),
            report.total_details(),
            report.records.len()
        );
        report
    }

    async fn collect_listings(&self, regions: &[Region]) -> Vec<(Region, ListingSet)> {
        let mut crawler = RegionCrawler::new(self.sessions, self.extractor, self.config);
        let mut discovered = Vec::with_capacity(regions.len());

        for (index, &region) in regions.iter().enumerate() {
            info!(
                target: TARGET,
                "[{}/{}] Collecting listings for {region}",
                index + 1,
                regions.len()
            );
            let listings = crawler.fetch_region(region).await;
            discovered.push((region, listings));

            if index + 1 < regions.len() {
                sleep_for(self.config.region_delay()).await;
            }
        }

        crawler.close().await;
        discovered
    }

    async fn fetch_details(
        &mut self,
        discovered: Vec<(Region, ListingSet)>,
    ) -> (Vec<RegionSummary>, Vec<L::Record>) {
        let limit = self.config.listing_limit();
        let mut summaries = Vec::with_capacity(discovered.len());
        let mut records = Vec::new();
        let pending = discovered.iter().filter(|(_, l)| !l.is_empty()).count();
        let mut visited = 0;

        for (region, listings) in &discovered {
            let mut summary = RegionSummary {
                region: *region,
                listings_found: listings.len(),
                details_requested: 0,
                details_fetched: 0,
                records: 0,
            };
            if listings.is_empty() {
                summaries.push(summary);
                continue;
            }
            visited += 1;

            let batch = listings.head(limit);
            summary.details_requested = batch.len();
            info!(
                target: TARGET,
                "[{visited}/{pending}] Fetching {} of {} details for {region}",
                batch.len(),
                listings.len()
            );

            let mut fetcher = DetailFetcher::new(self.sessions, self.config);
            let contents = fetcher.fetch_many(batch).await;
            fetcher.close().await;
            summary.details_fetched = contents.len();

            match self.pipeline.process(*region, &contents) {
                Ok(region_records) => {
                    summary.records = region_records.len();
                    records.extend(region_records);
                }
                Err(e) => {
                    error!(target: TARGET, "{region}: pipeline failed: {e:#}");
                }
            }
            summaries.push(summary);

            if visited < pending {
                sleep_for(self.config.region_delay()).await;
            }
        }

        (summaries, records)
    }
}
