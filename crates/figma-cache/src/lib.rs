// crates/figma-cache/src/lib.rs
// ============================================================================
// Module: Figma Cache
// Description: Local cache of design-node metadata and rendered images.
// Purpose: Parse design URL listings and keep per-slug cache directories fresh.
// Dependencies: regex, reqwest, serde, serde_json, thiserror, time, toml
// ============================================================================

//! ## Overview
//! A listing of design links is parsed into [`UrlEntry`] values, each keyed by
//! a deterministic slug. [`CachePipeline::cache_entry`] brings one slug's
//! directory up to date using a version probe so unchanged files are skipped;
//! [`run_batch`] does the same for a whole listing over a bounded worker pool
//! and reports cached, skipped, and failed totals.
//! Invariants:
//! - Slugs are a pure function of label, file key, and node id.
//! - The cache is only ever added to or overwritten, never pruned.
//! - Progress is reported through [`CacheEvents`]; the engine never prints.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod api;
pub mod batch;
pub mod config;
pub mod events;
pub mod figma_url;
pub mod listing;
pub mod pipeline;
pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use api::ApiConfig;
pub use api::ApiError;
pub use api::DesignApi;
pub use api::FigmaClient;
pub use api::FileVersion;
pub use api::ImageUrls;
pub use batch::BatchOptions;
pub use batch::BatchSummary;
pub use batch::EntryOutcome;
pub use batch::run_batch;
pub use config::ConfigError;
pub use config::FigmaCacheConfig;
pub use events::CacheEvent;
pub use events::CacheEvents;
pub use events::JsonLinesEvents;
pub use events::NoopEvents;
pub use events::PipelineStep;
pub use events::RecordingEvents;
pub use events::RefreshReason;
pub use figma_url::FigmaRef;
pub use figma_url::UrlParseError;
pub use figma_url::check_slug;
pub use figma_url::create_slug;
pub use figma_url::parse_figma_url;
pub use listing::InvalidEntry;
pub use listing::ListingError;
pub use listing::ListingItem;
pub use listing::UrlEntry;
pub use listing::UrlListing;
pub use listing::load_urls_file;
pub use listing::parse_urls_file;
pub use pipeline::CacheError;
pub use pipeline::CachePipeline;
pub use pipeline::EntryStatus;
pub use store::CacheRecord;
pub use store::CacheStore;
pub use store::StoreError;
