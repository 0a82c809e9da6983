//! Core types for the crawl engine.
//!
//! Error type, listing references and the ordered collections the region
//! crawler and detail fetcher hand to each other.

use ahash::{AHashMap, AHashSet};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Error type for crawl operations that surface to callers
#[derive(Debug, Error)]
pub enum CrawlError {
    /// Configuration rejected by the builder
    #[error("Configuration error: {0}")]
    Config(String),

    /// Region id outside the enumerable range
    #[error("Region id {0} is outside 1..={max}", max = crate::utils::REGION_COUNT)]
    InvalidRegion(u8),

    /// A listing or region URL could not be built
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Browser could not be launched or queried
    #[error("Browser error: {0}")]
    Browser(String),

    /// Other errors
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convenience alias for Result with `CrawlError`
pub type CrawlResult<T> = Result<T, CrawlError>;

/// Fetched textual content of one page
pub type RawContent = String;

/// URL identifying one facility listing; equality is exact string equality
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListingReference(String);

impl ListingReference {
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ListingReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ListingReference {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for ListingReference {
    fn from(url: String) -> Self {
        Self(url)
    }
}

impl From<&str> for ListingReference {
    fn from(url: &str) -> Self {
        Self(url.to_string())
    }
}

/// Insertion-ordered set of listing references
///
/// Re-inserting a reference is a no-op, so the set never holds duplicates and
/// iteration follows discovery order.
#[derive(Debug, Clone, Default)]
pub struct ListingSet {
    order: Vec<ListingReference>,
    seen: AHashSet<ListingReference>,
}

impl ListingSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the reference was not already present
    pub fn insert(&mut self, reference: ListingReference) -> bool {
        if self.seen.contains(&reference) {
            return false;
        }
        self.seen.insert(reference.clone());
        self.order.push(reference);
        true
    }

    /// Insert every reference, returning how many were new
    pub fn extend<I>(&mut self, references: I) -> usize
    where
        I: IntoIterator<Item = ListingReference>,
    {
        let mut added = 0;
        for reference in references {
            if self.insert(reference) {
                added += 1;
            }
        }
        added
    }

    #[must_use]
    pub fn contains(&self, reference: &ListingReference) -> bool {
        self.seen.contains(reference)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ListingReference> {
        self.order.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[ListingReference] {
        &self.order
    }

    /// The first `limit` references in discovery order, or all of them
    #[must_use]
    pub fn head(&self, limit: Option<usize>) -> &[ListingReference] {
        match limit {
            Some(n) if n < self.order.len() => &self.order[..n],
            _ => &self.order,
        }
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<ListingReference> {
        self.order
    }
}

impl PartialEq for ListingSet {
    fn eq(&self, other: &Self) -> bool {
        self.order == other.order
    }
}

impl Eq for ListingSet {}

impl FromIterator<ListingReference> for ListingSet {
    fn from_iter<I: IntoIterator<Item = ListingReference>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl<'a> IntoIterator for &'a ListingSet {
    type Item = &'a ListingReference;
    type IntoIter = std::slice::Iter<'a, ListingReference>;

    fn into_iter(self) -> Self::IntoIter {
        self.order.iter()
    }
}

/// Raw content keyed by listing reference, in fetch order
#[derive(Debug, Clone, Default)]
pub struct ContentMap {
    entries: Vec<(ListingReference, RawContent)>,
    index: AHashMap<ListingReference, usize>,
}

impl ContentMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the content for a reference
    pub fn insert(&mut self, reference: ListingReference, content: RawContent) {
        if let Some(&slot) = self.index.get(&reference) {
            self.entries[slot].1 = content;
            return;
        }
        self.index.insert(reference.clone(), self.entries.len());
        self.entries.push((reference, content));
    }

    #[must_use]
    pub fn get(&self, reference: &ListingReference) -> Option<&RawContent> {
        self.index.get(reference).map(|&slot| &self.entries[slot].1)
    }

    #[must_use]
    pub fn contains(&self, reference: &ListingReference) -> bool {
        self.index.contains_key(reference)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ListingReference, &RawContent)> {
        self.entries.iter().map(|(r, c)| (r, c))
    }

    pub fn keys(&self) -> impl Iterator<Item = &ListingReference> {
        self.entries.iter().map(|(r, _)| r)
    }
}
