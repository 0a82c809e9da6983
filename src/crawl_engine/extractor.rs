//! Listing extraction from index-page markup
//!
//! `ListingExtractor` is the seam between the crawl engine and the target
//! site's markup. `MarkupExtractor` is the default, built on `scraper`.

use anyhow::{Context, Result};
use scraper::{Html, Selector};
use std::sync::LazyLock;
use url::Url;

use super::crawl_types::ListingReference;
use super::page_probe::PageProbe;

/// Reduce one listing-index page to the signals the crawl engine needs
pub trait ListingExtractor {
    fn extract(&self, html: &str) -> PageProbe;
}

static LISTING_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"a[href*="/gym/"]"#)
        .expect("BUG: hardcoded CSS selector 'a[href*=\"/gym/\"]' is invalid")
});

static ERROR_MARKER_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(".error, .not-found, .no-result")
        .expect("BUG: hardcoded CSS selector '.error, .not-found, .no-result' is invalid")
});

static NEXT_LINK_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"a[href*="?page="], .pagination .next, .page-next"#)
        .expect("BUG: hardcoded next-link selector is invalid")
});

static TITLE_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("title").expect("BUG: hardcoded CSS selector 'title' is invalid")
});

static BODY_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("body").expect("BUG: hardcoded CSS selector 'body' is invalid")
});

/// Substrings that mark an error page title
const ERROR_TITLE_MARKERS: &[&str] = &["404", "エラー", "見つかりません"];

/// Words an on-topic listing page is expected to contain
const DOMAIN_KEYWORDS: &[&str] = &["フィットネス", "ジム", "トレーニング"];

/// Default extractor for the directory site's listing pages
#[derive(Debug, Clone)]
pub struct MarkupExtractor {
    base: Url,
}

impl MarkupExtractor {
    /// `base_url` resolves relative listing links
    pub fn new(base_url: &str) -> Result<Self> {
        let base = Url::parse(base_url)
            .with_context(|| format!("Invalid base URL for listing extraction: {base_url}"))?;
        Ok(Self { base })
    }

    fn resolve(&self, href: &str) -> Option<ListingReference> {
        self.base
            .join(href.trim())
            .ok()
            .map(|url| ListingReference::new(String::from(url)))
    }
}

impl ListingExtractor for MarkupExtractor {
    fn extract(&self, html: &str) -> PageProbe {
        let document = Html::parse_document(html);

        let listings = document
            .select(&LISTING_SELECTOR)
            .filter_map(|a| a.value().attr("href"))
            .filter_map(|href| self.resolve(href))
            .collect();

        let title = document
            .select(&TITLE_SELECTOR)
            .next()
            .map(|t| t.text().collect::<String>().trim().to_string())
            .unwrap_or_default();
        let has_valid_title = !ERROR_TITLE_MARKERS.iter().any(|m| title.contains(m));

        // Same measure as the DOM's `body.textContent`: script bodies and
        // whitespace included
        let body_text: String = document
            .select(&BODY_SELECTOR)
            .next()
            .map(|body| body.text().collect())
            .unwrap_or_default();

        PageProbe {
            listings,
            has_error_marker: document.select(&ERROR_MARKER_SELECTOR).next().is_some(),
            has_valid_title,
            content_length: body_text.chars().count(),
            has_domain_keywords: DOMAIN_KEYWORDS.iter().any(|k| body_text.contains(k)),
            has_next_link: document.select(&NEXT_LINK_SELECTOR).next().is_some(),
            title,
        }
    }
}
