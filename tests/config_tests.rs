//! Tests for the type-safe configuration builder pattern

use fitmap_crawler::config::CrawlConfig;
use fitmap_crawler::utils::DelayRange;
use fitmap_crawler::{CrawlError, RetryPolicy};
use std::time::Duration;
use tempfile::TempDir;

#[test]
fn test_builder_requires_base_url() {
    // This should not compile if uncommented - base_url is required
    // let config = CrawlConfig::builder().build();

    let config = CrawlConfig::builder()
        .base_url("https://fitmap.jp/")
        .build()
        .unwrap();
    assert_eq!(config.base_url(), "https://fitmap.jp");
}

#[test]
fn test_builder_defaults_match_site_constants() {
    let config = CrawlConfig::builder()
        .base_url("https://fitmap.jp")
        .build()
        .unwrap();

    assert!(config.headless());
    assert!(!config.sample_mode());
    assert_eq!(config.regions().count(), 47);
    assert_eq!(config.effective_max_pages(), 60);
    assert_eq!(config.listing_limit(), None);
    assert_eq!(config.empty_page_tolerance(), 1);
    assert_eq!(config.session_request_ceiling(), 5);
    assert_eq!(config.first_page_settle(), Duration::from_millis(2000));
    assert_eq!(config.retry_page_settle(), Duration::from_millis(3000));
    assert_eq!(
        config.pagination_settle(),
        DelayRange::new(Duration::from_millis(1000), Duration::from_millis(2000))
    );
    assert_eq!(
        config.detail_delay(),
        DelayRange::new(Duration::from_millis(1500), Duration::from_millis(3000))
    );
    assert_eq!(config.first_page_retry(), RetryPolicy::new(2, Duration::from_secs(3)));
    assert_eq!(config.pagination_retry(), RetryPolicy::single_attempt());
    assert_eq!(config.detail_retry().max_attempts(), 2);
    assert_eq!(config.navigation_timeout_secs(), 30);
}

#[test]
fn test_sample_mode_limits() {
    let config = CrawlConfig::builder()
        .base_url("https://fitmap.jp")
        .sample_mode(true)
        .build()
        .unwrap();

    assert_eq!(config.effective_max_pages(), 3);
    assert_eq!(config.listing_limit(), Some(5));
}

#[test]
fn test_region_range_validation() {
    let err = CrawlConfig::builder()
        .base_url("https://fitmap.jp")
        .regions(0, 10)
        .build()
        .unwrap_err();
    assert!(matches!(err, CrawlError::InvalidRegion(0)));

    let err = CrawlConfig::builder()
        .base_url("https://fitmap.jp")
        .regions(40, 30)
        .build()
        .unwrap_err();
    assert!(matches!(err, CrawlError::Config(_)));

    let config = CrawlConfig::builder()
        .base_url("https://fitmap.jp")
        .regions(13, 14)
        .build()
        .unwrap();
    let ids: Vec<u8> = config.regions().map(|r| r.id()).collect();
    assert_eq!(ids, vec![13, 14]);
}

#[test]
fn test_invalid_base_url_is_rejected() {
    let err = CrawlConfig::builder().base_url("fitmap").build().unwrap_err();
    assert!(matches!(err, CrawlError::InvalidUrl { .. }));

    let err = CrawlConfig::builder()
        .base_url("ftp://fitmap.jp")
        .build()
        .unwrap_err();
    assert!(matches!(err, CrawlError::InvalidUrl { .. }));
}

#[test]
fn test_zero_ceilings_are_rejected() {
    for builder in [
        CrawlConfig::builder().base_url("https://fitmap.jp").session_request_ceiling(0),
        CrawlConfig::builder().base_url("https://fitmap.jp").max_pages(0),
        CrawlConfig::builder().base_url("https://fitmap.jp").empty_page_tolerance(0),
    ] {
        assert!(matches!(builder.build(), Err(CrawlError::Config(_))));
    }
}

#[test]
fn test_without_delays_keeps_attempt_counts() {
    let config = CrawlConfig::builder()
        .base_url("https://fitmap.jp")
        .without_delays()
        .build()
        .unwrap();

    assert_eq!(config.first_page_settle(), Duration::ZERO);
    assert_eq!(config.detail_delay(), DelayRange::none());
    assert_eq!(config.region_delay(), Duration::ZERO);
    assert_eq!(config.first_page_retry().max_attempts(), 2);
    assert_eq!(config.first_page_retry().backoff(), Duration::ZERO);
}

#[test]
fn test_config_round_trips_through_json_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("crawl.json");
    let config = CrawlConfig::builder()
        .base_url("https://fitmap.jp")
        .sample_mode(true)
        .regions(5, 9)
        .build()
        .unwrap();

    std::fs::write(&path, serde_json::to_string_pretty(&config).unwrap()).unwrap();
    let restored: CrawlConfig =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(restored, config);
}

#[test]
fn test_deserialized_config_is_validated() {
    let config = CrawlConfig::builder()
        .base_url("https://fitmap.jp")
        .build()
        .unwrap();
    let valid = serde_json::to_value(&config).unwrap();

    for (field, bad) in [
        ("max_pages", serde_json::json!(0)),
        ("session_request_ceiling", serde_json::json!(0)),
        ("base_url", serde_json::json!("not a url")),
        ("last_region", serde_json::json!(48)),
    ] {
        let mut value = valid.clone();
        value[field] = bad;
        let result: Result<CrawlConfig, _> = serde_json::from_value(value);
        assert!(result.is_err(), "{field} should be rejected");
    }

    let restored: CrawlConfig = serde_json::from_value(valid).unwrap();
    assert_eq!(restored, config);
}
