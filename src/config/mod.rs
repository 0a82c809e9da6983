//! Configuration module for a crawl run
//!
//! This module provides the `CrawlConfig` struct and its type-safe builder
//! with validation and defaults taken from `utils::constants`.

// Sub-modules
pub mod builder;
pub mod getters;
pub mod types;

// Re-exports for public API
pub use builder::{CrawlConfigBuilder, WithBaseUrl};
pub use types::CrawlConfig;
