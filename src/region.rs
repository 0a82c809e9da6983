//! Geographic regions enumerated by the crawl
//!
//! A region is one of the 47 prefectures, identified by the site's area id.
//! Area ids follow the site's own ordering (Kanto first), not the standard
//! prefecture codes.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::crawl_engine::crawl_types::{CrawlError, CrawlResult};
use crate::utils::REGION_COUNT;

/// Prefecture names indexed by `area id - 1`
const REGION_NAMES: [&str; REGION_COUNT as usize] = [
    "東京都", "神奈川県", "千葉県", "埼玉県", "茨城県", "栃木県", "群馬県",
    "愛知県", "岐阜県", "三重県", "静岡県",
    "大阪府", "兵庫県", "京都府", "滋賀県", "奈良県", "和歌山県",
    "北海道", "青森県", "岩手県", "宮城県", "秋田県", "山形県", "福島県",
    "山梨県", "長野県", "新潟県", "富山県", "石川県", "福井県",
    "広島県", "岡山県", "鳥取県", "島根県", "山口県",
    "香川県", "徳島県", "愛媛県", "高知県",
    "福岡県", "佐賀県", "長崎県", "熊本県", "大分県", "宮崎県", "鹿児島県", "沖縄県",
];

/// Region identifier in `1..=47`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Region(u8);

impl Region {
    pub fn new(id: u8) -> CrawlResult<Self> {
        if (1..=REGION_COUNT).contains(&id) {
            Ok(Self(id))
        } else {
            Err(CrawlError::InvalidRegion(id))
        }
    }

    #[must_use]
    pub const fn id(&self) -> u8 {
        self.0
    }

    /// Human-readable name; total over the valid range
    #[must_use]
    pub fn name(&self) -> &'static str {
        REGION_NAMES[usize::from(self.0 - 1)]
    }

    /// Every region in increasing id order
    pub fn all() -> impl Iterator<Item = Region> {
        (1..=REGION_COUNT).map(Region)
    }

    /// Regions `first..=last`, clamped to the valid range
    pub fn range(first: u8, last: u8) -> impl Iterator<Item = Region> {
        let first = first.max(1);
        let last = last.min(REGION_COUNT);
        (first..=last).map(Region)
    }

    /// Base listing URL (page 1) for this region on the given site
    #[must_use]
    pub fn listing_url(&self, base_url: &str) -> String {
        format!("{}/area/{}/", base_url.trim_end_matches('/'), self.0)
    }

    /// Listing URL for page `page` of this region; page 1 is the base URL
    #[must_use]
    pub fn page_url(&self, base_url: &str, page: u32) -> String {
        let base = self.listing_url(base_url);
        if page <= 1 {
            base
        } else {
            format!("{base}?page={page}")
        }
    }
}

impl TryFrom<u8> for Region {
    type Error = CrawlError;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        Self::new(id)
    }
}

impl From<Region> for u8 {
    fn from(region: Region) -> Self {
        region.0
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (area {})", self.name(), self.0)
    }
}
