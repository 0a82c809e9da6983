//! Facility records built from detail-page markup
//!
//! Each fetched detail page is reduced to a `FacilityRecord`: name, address
//! split into prefecture and municipality, parsed prices, feature tags and
//! description. Pages without a usable name are skipped.

use log::{debug, info, warn};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use super::ListingPipeline;
use super::address::split_address;
use super::price::{Price, parse_prices};
use crate::crawl_engine::crawl_types::{ContentMap, ListingReference};
use crate::region::Region;

const TARGET: &str = "fitmap::pipeline";

fn selector_list(raw: &[&str]) -> Vec<Selector> {
    raw.iter()
        .map(|s| {
            Selector::parse(s).unwrap_or_else(|e| panic!("BUG: hardcoded CSS selector '{s}' is invalid: {e}"))
        })
        .collect()
}

static OG_TITLE_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"meta[property="og:title"]"#)
        .expect("BUG: hardcoded CSS selector 'meta[property=\"og:title\"]' is invalid")
});

static TITLE_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("title").expect("BUG: hardcoded CSS selector 'title' is invalid")
});

static BREADCRUMB_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(".breadcrumb a, .breadcrumbs a, .nav a")
        .expect("BUG: hardcoded breadcrumb selector is invalid")
});

static ADDRESS_SELECTORS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    selector_list(&[
        ".post_adress",
        ".gym-info .address",
        ".location-info .address",
        ".gym-detail .address",
        ".info-section .address",
        r#"[class*="address"]"#,
        ".gym-basic-info .address",
    ])
});

static PRICE_SELECTORS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    selector_list(&[
        ".panel_ryokin",
        ".gym-price",
        ".price-info",
        ".fee-info",
        ".cost-info",
        ".pricing",
        r#"[class*="price"]"#,
        r#"[class*="fee"]"#,
    ])
});

static FEATURE_SELECTORS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    selector_list(&[
        ".gym-tags .tag",
        ".gym-features .feature",
        ".gym-categories .category",
        ".badge-list .badge",
        r#"[class*="tag"]"#,
        r#"[class*="badge"]"#,
        r#"[class*="feature"]"#,
    ])
});

static DESCRIPTION_SELECTORS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    selector_list(&[
        ".gym-description",
        ".gym-intro",
        ".gym-about",
        ".description",
        ".about",
        ".intro",
    ])
});

/// Site suffix such as ` | fitmap` at the end of a page title
static TITLE_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s*\|\s*.*$").expect("BUG: hardcoded title suffix regex is invalid")
});

/// Addresses this short are navigation labels, not addresses
const MIN_ADDRESS_CHARS: usize = 10;
/// Descriptions this short are captions, not descriptions
const MIN_DESCRIPTION_CHARS: usize = 20;
/// Tags this long are paragraphs that happen to carry a tag class
const MAX_FEATURE_CHARS: usize = 50;

/// Names the site uses for pages that are not a facility
const PLACEHOLDER_NAMES: &[&str] = &["FitMap"];
const PLACEHOLDER_NAME_MARKER: &str = "日本最大級";

/// Fields read straight from one detail page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailFields {
    pub name: Option<String>,
    pub address: Option<String>,
    /// Price snippets joined with `, `
    pub price_text: Option<String>,
    pub features: Vec<String>,
    pub description: Option<String>,
    /// Prefecture named in the breadcrumb trail
    pub area: Option<String>,
}

/// One facility listing in normalized form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacilityRecord {
    pub name: String,
    pub area: String,
    pub prefecture: String,
    pub city: String,
    pub address: String,
    pub prices: Vec<Price>,
    pub url: String,
    pub features: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub region_id: u8,
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// First element of the first selector whose text passes `accept`
fn first_matching(
    document: &Html,
    selectors: &[Selector],
    accept: impl Fn(&str) -> bool,
) -> Option<String> {
    selectors.iter().find_map(|selector| {
        let text = element_text(document.select(selector).next()?);
        accept(&text).then_some(text)
    })
}

fn push_unique(values: &mut Vec<String>, value: String) {
    if !values.contains(&value) {
        values.push(value);
    }
}

/// Read the facility fields out of a detail page
#[must_use]
pub fn parse_detail(html: &str) -> DetailFields {
    let document = Html::parse_document(html);

    let og_title = document
        .select(&OG_TITLE_SELECTOR)
        .next()
        .and_then(|meta| meta.value().attr("content"))
        .map(|content| content.trim().to_string())
        .filter(|name| !name.is_empty());
    let name = og_title
        .or_else(|| {
            let title = document.select(&TITLE_SELECTOR).next().map(element_text)?;
            Some(TITLE_SUFFIX.replace(&title, "").trim().to_string())
        })
        .filter(|name| {
            !name.is_empty()
                && !PLACEHOLDER_NAMES.contains(&name.as_str())
                && !name.contains(PLACEHOLDER_NAME_MARKER)
        });

    let address = first_matching(&document, &ADDRESS_SELECTORS, |text| {
        text.chars().count() > MIN_ADDRESS_CHARS
    });

    let mut prices = Vec::new();
    for selector in PRICE_SELECTORS.iter() {
        for element in document.select(selector) {
            let text = element_text(element);
            let digits_only = !text.is_empty() && text.chars().all(|c| c.is_ascii_digit());
            if digits_only {
                push_unique(&mut prices, format!("{text}円"));
            } else if text.contains('円') {
                push_unique(&mut prices, text);
            }
        }
    }

    let mut features = Vec::new();
    for selector in FEATURE_SELECTORS.iter() {
        for element in document.select(selector) {
            let text = element_text(element);
            if !text.is_empty() && text.chars().count() < MAX_FEATURE_CHARS {
                push_unique(&mut features, text);
            }
        }
    }

    let description = first_matching(&document, &DESCRIPTION_SELECTORS, |text| {
        text.chars().count() > MIN_DESCRIPTION_CHARS
    });

    // The last prefecture link in the trail is the most specific
    let area = document
        .select(&BREADCRUMB_SELECTOR)
        .filter(|a| a.value().attr("href").is_some_and(|href| href.contains("/area/")))
        .map(element_text)
        .filter(|text| ['県', '都', '府'].iter().any(|c| text.contains(*c)))
        .last();

    DetailFields {
        name,
        address,
        price_text: (!prices.is_empty()).then(|| prices.join(", ")),
        features,
        description,
        area,
    }
}

impl FacilityRecord {
    /// Normalize parsed fields; `None` when the page had no usable name
    #[must_use]
    pub fn from_detail(region: Region, reference: &ListingReference, fields: DetailFields) -> Option<Self> {
        let name = fields.name?;
        let address = fields.address.unwrap_or_default();
        let parts = split_address(&address);
        let prefecture = if parts.prefecture.is_empty() {
            region.name().to_string()
        } else {
            parts.prefecture
        };

        Some(Self {
            name,
            area: fields.area.unwrap_or_else(|| prefecture.clone()),
            prefecture,
            city: parts.city,
            address,
            prices: fields.price_text.as_deref().map(parse_prices).unwrap_or_default(),
            url: reference.to_string(),
            features: fields.features,
            description: fields.description,
            region_id: region.id(),
        })
    }
}

/// Emits one `FacilityRecord` per fetched listing with a usable name
#[derive(Debug, Default)]
pub struct FacilityPipeline;

impl FacilityPipeline {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl ListingPipeline for FacilityPipeline {
    type Record = FacilityRecord;

    fn process(&mut self, region: Region, contents: &ContentMap) -> anyhow::Result<Vec<FacilityRecord>> {
        let mut records = Vec::with_capacity(contents.len());
        for (reference, html) in contents.iter() {
            let fields = parse_detail(html);
            debug!(
                target: TARGET,
                "{reference}: name={:?} address={:?} prices={:?}",
                fields.name,
                fields.address,
                fields.price_text
            );
            match FacilityRecord::from_detail(region, reference, fields) {
                Some(record) => records.push(record),
                None => warn!(target: TARGET, "{reference}: no facility name, skipped"),
            }
        }
        info!(
            target: TARGET,
            "{region}: {} of {} listings normalized",
            records.len(),
            contents.len()
        );
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::price::PricePeriod;

    const DETAIL: &str = r#"<!DOCTYPE html>
<html><head>
<title>ジムA 渋谷店 | FitMap</title>
<meta property="og:title" content=" ジムA 渋谷店 ">
</head><body>
<nav class="breadcrumb"><a href="/">トップ</a><a href="/area/1/">東京都</a></nav>
<div class="post_adress">東京都渋谷区神南1-2-3 サンプルビル</div>
<div class="panel_ryokin">月会費 8,800円/月</div>
<span class="price-tag">2200</span>
<ul class="gym-tags"><li class="tag">24時間</li><li class="tag">シャワー</li></ul>
<p class="gym-description">駅から徒歩3分。初心者向けのマシンが揃ったジムです。</p>
</body></html>"#;

    #[test]
    fn detail_fields_are_extracted() {
        let fields = parse_detail(DETAIL);
        assert_eq!(fields.name.as_deref(), Some("ジムA 渋谷店"));
        assert_eq!(fields.address.as_deref(), Some("東京都渋谷区神南1-2-3 サンプルビル"));
        assert_eq!(fields.price_text.as_deref(), Some("月会費 8,800円/月, 2200円"));
        assert_eq!(fields.area.as_deref(), Some("東京都"));
        assert!(fields.features.contains(&"24時間".to_string()));
        assert!(fields.features.contains(&"シャワー".to_string()));
        assert!(fields.description.is_some());
    }

    #[test]
    fn title_suffix_is_stripped_without_og_title() {
        let fields = parse_detail("<html><head><title>ジムB | FitMap</title></head><body></body></html>");
        assert_eq!(fields.name.as_deref(), Some("ジムB"));
    }

    #[test]
    fn site_placeholder_names_are_rejected() {
        let fields = parse_detail("<title>FitMap</title>");
        assert_eq!(fields.name, None);
        let fields = parse_detail("<title>日本最大級のジム検索 | FitMap</title>");
        assert_eq!(fields.name, None);
    }

    #[test]
    fn record_splits_address_and_prices() {
        let region = Region::new(1).expect("region 1");
        let reference = ListingReference::new("https://fitmap.jp/gym/1/");
        let record = FacilityRecord::from_detail(region, &reference, parse_detail(DETAIL))
            .expect("named facility");

        assert_eq!(record.prefecture, "東京都");
        assert_eq!(record.city, "渋谷区");
        assert_eq!(record.address, "東京都渋谷区神南1-2-3 サンプルビル");
        assert_eq!(
            record.prices,
            vec![Price::new(PricePeriod::Monthly, 8800), Price::new(PricePeriod::Single, 2200)]
        );
        assert_eq!(record.url, "https://fitmap.jp/gym/1/");
        assert_eq!(record.region_id, 1);
    }

    #[test]
    fn region_name_fills_missing_prefecture() {
        let region = Region::new(12).expect("region 12");
        let reference = ListingReference::new("https://fitmap.jp/gym/9/");
        let fields = DetailFields {
            name: Some("ジムC".to_string()),
            ..DetailFields::default()
        };
        let record = FacilityRecord::from_detail(region, &reference, fields).expect("named");
        assert_eq!(record.prefecture, "大阪府");
        assert_eq!(record.area, "大阪府");
        assert!(record.prices.is_empty());
    }

    #[test]
    fn pipeline_skips_unnamed_pages() {
        let mut contents = ContentMap::new();
        contents.insert("https://fitmap.jp/gym/1/".into(), DETAIL.to_string());
        contents.insert("https://fitmap.jp/gym/2/".into(), "<title>FitMap</title>".to_string());

        let region = Region::new(1).expect("region 1");
        let records = FacilityPipeline::new().process(region, &contents).expect("records");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "ジムA 渋谷店");
    }
}
