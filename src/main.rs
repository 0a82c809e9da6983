//! fitmap-crawler
//!
//! Collects facility listings region by region and writes one normalized
//! JSON record per fetched listing.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fitmap_crawler::utils::{DEFAULT_BASE_URL, REGION_COUNT};
use fitmap_crawler::{CrawlConfig, save_records};

/// Region-by-region facility directory crawler
#[derive(Parser, Debug)]
#[command(name = "fitmap-crawler", version, about)]
struct Cli {
    /// Cap pages per region and listings fetched per region
    #[arg(long)]
    sample: bool,

    /// Verbose logging, including the page probe of every listing page
    #[arg(long)]
    debug: bool,

    /// Show the browser window
    #[arg(long)]
    headed: bool,

    /// Where the JSON records are written
    #[arg(short, long, default_value = "output/listings.json")]
    output: PathBuf,

    /// Site root to crawl
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Region range to visit, e.g. `13` or `1-47`
    #[arg(long, default_value = "1-47", value_parser = parse_region_range)]
    regions: (u8, u8),
}

fn parse_region_range(raw: &str) -> Result<(u8, u8), String> {
    let parse = |s: &str| {
        s.trim()
            .parse::<u8>()
            .map_err(|e| format!("invalid region id '{s}': {e}"))
    };
    let (first, last) = match raw.split_once('-') {
        Some((first, last)) => (parse(first)?, parse(last)?),
        None => {
            let id = parse(raw)?;
            (id, id)
        }
    };
    if first == 0 || last > REGION_COUNT || first > last {
        return Err(format!("region range must lie within 1-{REGION_COUNT}"));
    }
    Ok((first, last))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.debug { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let (first, last) = cli.regions;
    let config = CrawlConfig::builder()
        .base_url(cli.base_url)
        .sample_mode(cli.sample)
        .debug(cli.debug)
        .headless(!cli.headed)
        .regions(first, last)
        .build()
        .context("Invalid crawl configuration")?;

    tracing::info!(
        "Crawling {} regions {first}-{last}{}",
        config.base_url(),
        if config.sample_mode() { " (sample mode)" } else { "" }
    );

    let report = fitmap_crawler::crawl(&config).await?;
    if report.records.is_empty() {
        tracing::warn!("No listings were fetched");
    }
    save_records(&report.records, &cli.output).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_range_accepts_single_and_span() {
        assert_eq!(parse_region_range("13"), Ok((13, 13)));
        assert_eq!(parse_region_range("1-47"), Ok((1, 47)));
    }

    #[test]
    fn region_range_rejects_out_of_bounds() {
        assert!(parse_region_range("0-3").is_err());
        assert!(parse_region_range("40-48").is_err());
        assert!(parse_region_range("9-3").is_err());
        assert!(parse_region_range("x").is_err());
    }
}
