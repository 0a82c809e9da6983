//! Emptiness classification for listing-index pages
//!
//! The site keeps serving well-formed pages past the last real page of a
//! region, so "the page loaded" is not a stop signal. Instead every
//! pagination page is reduced to a `PageProbe` and `classify` decides whether
//! it still carries listings.

use serde::Serialize;

use super::crawl_types::ListingReference;

/// Body text at or below this many characters marks a page empty
pub const MIN_CONTENT_LENGTH: usize = 1000;

/// Body text below this many characters needs a domain keyword to count
pub const OFF_TOPIC_CONTENT_LENGTH: usize = 2000;

/// Signals captured from one listing-index page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PageProbe {
    pub listings: Vec<ListingReference>,
    pub title: String,
    pub has_error_marker: bool,
    pub has_valid_title: bool,
    /// Body text length in characters
    pub content_length: usize,
    pub has_domain_keywords: bool,
    pub has_next_link: bool,
}

impl PageProbe {
    #[must_use]
    pub fn listing_count(&self) -> usize {
        self.listings.len()
    }
}

/// Why a page was judged empty
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EmptyReason {
    NoListings,
    ErrorMarker,
    InvalidTitle,
    ContentTooShort,
    OffTopic,
}

impl EmptyReason {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoListings => "no listings",
            Self::ErrorMarker => "error marker",
            Self::InvalidTitle => "error title",
            Self::ContentTooShort => "content too short",
            Self::OffTopic => "no domain keywords",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PageVerdict {
    Continue,
    Stop(EmptyReason),
}

impl PageVerdict {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Stop(_))
    }
}

/// Decide whether a probed page still carries listings
///
/// The page is empty if any single signal says so; the first matching reason
/// is reported.
#[must_use]
pub fn classify(probe: &PageProbe) -> PageVerdict {
    let reason = if probe.listings.is_empty() {
        Some(EmptyReason::NoListings)
    } else if probe.has_error_marker {
        Some(EmptyReason::ErrorMarker)
    } else if !probe.has_valid_title {
        Some(EmptyReason::InvalidTitle)
    } else if probe.content_length <= MIN_CONTENT_LENGTH {
        Some(EmptyReason::ContentTooShort)
    } else if !probe.has_domain_keywords && probe.content_length < OFF_TOPIC_CONTENT_LENGTH {
        Some(EmptyReason::OffTopic)
    } else {
        None
    };

    reason.map_or(PageVerdict::Continue, PageVerdict::Stop)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn healthy() -> PageProbe {
        PageProbe {
            listings: vec![ListingReference::new("https://fitmap.jp/gym/1/")],
            title: "東京都のジム一覧".to_string(),
            has_error_marker: false,
            has_valid_title: true,
            content_length: 5000,
            has_domain_keywords: true,
            has_next_link: true,
        }
    }

    #[test]
    fn healthy_page_continues() {
        assert_eq!(classify(&healthy()), PageVerdict::Continue);
    }

    #[test]
    fn each_signal_alone_stops() {
        let mut probe = healthy();
        probe.listings.clear();
        assert_eq!(classify(&probe), PageVerdict::Stop(EmptyReason::NoListings));

        let mut probe = healthy();
        probe.has_error_marker = true;
        assert_eq!(classify(&probe), PageVerdict::Stop(EmptyReason::ErrorMarker));

        let mut probe = healthy();
        probe.has_valid_title = false;
        assert_eq!(classify(&probe), PageVerdict::Stop(EmptyReason::InvalidTitle));

        let mut probe = healthy();
        probe.content_length = MIN_CONTENT_LENGTH;
        assert_eq!(classify(&probe), PageVerdict::Stop(EmptyReason::ContentTooShort));
    }

    #[test]
    fn keywords_only_matter_for_short_pages() {
        let mut probe = healthy();
        probe.has_domain_keywords = false;
        probe.content_length = OFF_TOPIC_CONTENT_LENGTH - 1;
        assert_eq!(classify(&probe), PageVerdict::Stop(EmptyReason::OffTopic));

        probe.content_length = OFF_TOPIC_CONTENT_LENGTH;
        assert_eq!(classify(&probe), PageVerdict::Continue);
    }

    #[test]
    fn length_just_over_floor_with_keywords_continues() {
        let mut probe = healthy();
        probe.content_length = MIN_CONTENT_LENGTH + 1;
        assert_eq!(classify(&probe), PageVerdict::Continue);
    }

    #[test]
    fn next_link_does_not_affect_verdict() {
        let mut probe = healthy();
        probe.has_next_link = false;
        assert_eq!(classify(&probe), PageVerdict::Continue);
    }
}
