//! Japanese address splitting
//!
//! A listing address such as `東京都渋谷区神南1-2-3` is split into its
//! prefecture, its municipality and the remainder.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Prefectures in standard order; the first one contained in an address wins
const PREFECTURES: [&str; 47] = [
    "北海道", "青森県", "岩手県", "宮城県", "秋田県", "山形県", "福島県",
    "茨城県", "栃木県", "群馬県", "埼玉県", "千葉県", "東京都", "神奈川県",
    "新潟県", "富山県", "石川県", "福井県", "山梨県", "長野県",
    "岐阜県", "静岡県", "愛知県", "三重県",
    "滋賀県", "京都府", "大阪府", "兵庫県", "奈良県", "和歌山県",
    "鳥取県", "島根県", "岡山県", "広島県", "山口県",
    "徳島県", "香川県", "愛媛県", "高知県",
    "福岡県", "佐賀県", "長崎県", "熊本県", "大分県", "宮崎県", "鹿児島県", "沖縄県",
];

/// Municipality patterns, tried in order against the text after the prefecture
static CITY_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"^([^市区町村]+[市区町村])",
        r"^([^郡]+郡[^町村]+[町村])",
        r"^([^区]+区)",
        r"^([^市]+市)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("BUG: hardcoded municipality regex is invalid"))
    .collect()
});

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressParts {
    /// Empty when no prefecture name appears in the address
    pub prefecture: String,
    pub city: String,
    /// What follows the municipality, trimmed
    pub rest: String,
}

/// Split `address` into prefecture, municipality and remainder
#[must_use]
pub fn split_address(address: &str) -> AddressParts {
    let mut parts = AddressParts::default();
    if address.is_empty() {
        return parts;
    }

    let mut remaining = address;
    if let Some((prefecture, at)) = PREFECTURES
        .iter()
        .find_map(|p| address.find(p).map(|at| (*p, at)))
    {
        parts.prefecture = prefecture.to_string();
        remaining = &address[at + prefecture.len()..];
    }

    if let Some(city) = CITY_PATTERNS
        .iter()
        .find_map(|re| re.captures(remaining).and_then(|c| c.get(1)))
    {
        parts.city = city.as_str().to_string();
        remaining = &remaining[city.end()..];
    }

    parts.rest = remaining.trim().to_string();
    parts
}
