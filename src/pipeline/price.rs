//! Price extraction from free-form fee text
//!
//! Amounts are yen figures followed by `円`, optionally qualified by `/月`
//! (monthly) or `/日` (daily). An unqualified amount is a single-visit fee.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static PRICE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([0-9]+,?[0-9]*)\s*円(\s*/\s*([月日])?)?")
        .expect("BUG: hardcoded price regex is invalid")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PricePeriod {
    Monthly,
    Daily,
    Single,
}

impl PricePeriod {
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Monthly => "月額",
            Self::Daily => "日額",
            Self::Single => "単発",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    #[serde(rename = "type")]
    pub label: String,
    /// Yen
    pub amount: u64,
    pub period: PricePeriod,
}

impl Price {
    #[must_use]
    pub fn new(period: PricePeriod, amount: u64) -> Self {
        Self {
            label: period.label().to_string(),
            amount,
            period,
        }
    }
}

/// Every price in `text`: monthly fees first, then daily, then single
///
/// Amounts qualified by any other unit (`/週`, `/回`) are skipped.
#[must_use]
pub fn parse_prices(text: &str) -> Vec<Price> {
    let mut prices: Vec<Price> = PRICE_PATTERN
        .captures_iter(text)
        .filter_map(|caps| {
            let period = match (caps.get(2), caps.get(3).map(|m| m.as_str())) {
                (None, _) => PricePeriod::Single,
                (Some(_), Some("月")) => PricePeriod::Monthly,
                (Some(_), Some("日")) => PricePeriod::Daily,
                (Some(_), _) => return None,
            };
            let amount = caps[1].replace(',', "").parse().ok()?;
            Some(Price::new(period, amount))
        })
        .collect();
    // Stable, so amounts keep text order within a period
    prices.sort_by_key(|p| p.period);
    prices
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monthly_and_daily_fees_are_recognised() {
        let prices = parse_prices("入会金 3,300円、月会費 8,800円/月、ビジター 2,200円 / 日");
        assert_eq!(
            prices,
            vec![
                Price::new(PricePeriod::Monthly, 8800),
                Price::new(PricePeriod::Daily, 2200),
                Price::new(PricePeriod::Single, 3300),
            ]
        );
    }

    #[test]
    fn other_units_are_skipped() {
        assert!(parse_prices("4,000円/週").is_empty());
    }

    #[test]
    fn labels_follow_period() {
        let prices = parse_prices("1000円");
        assert_eq!(prices[0].label, "単発");
        assert_eq!(prices[0].amount, 1000);
    }

    #[test]
    fn text_without_yen_has_no_prices() {
        assert!(parse_prices("お問い合わせください").is_empty());
    }
}
