//! Post-fetch processing of raw listing content
//!
//! The crawl engine hands each region's `ContentMap` to a `ListingPipeline`
//! and accumulates whatever records it returns. `FacilityPipeline` is the
//! built-in pipeline used by the binary.

pub mod address;
pub mod facility;
pub mod json_saver;
pub mod price;

pub use address::{AddressParts, split_address};
pub use facility::{DetailFields, FacilityPipeline, FacilityRecord, parse_detail};
pub use json_saver::save_records;
pub use price::{Price, PricePeriod, parse_prices};

use crate::crawl_engine::crawl_types::ContentMap;
use crate::region::Region;

/// Turns one region's raw content into output records
pub trait ListingPipeline {
    type Record;

    /// A failure here drops this region's records only
    fn process(&mut self, region: Region, contents: &ContentMap) -> anyhow::Result<Vec<Self::Record>>;
}
