// crates/figma-cache/src/pipeline.rs
// ============================================================================
// Module: Cache Pipeline
// Description: Per-entry freshness check, metadata capture, and image render.
// Purpose: Bring one slug's cache directory up to date with the remote file.
// Dependencies: crate::{api, events, figma_url, listing, store}, thiserror
// ============================================================================

//! ## Overview
//! [`CachePipeline::cache_entry`] runs these steps for one entry:
//! 1. Unless forced, load the cached record and probe the remote file
//!    version; a match (with the image present) skips the entry.
//! 2. Fetch node metadata and fail with [`CacheError::NodeNotFound`] when the
//!    node is absent.
//! 3. Write `meta.raw.json`.
//! 4. Request the 2x PNG render URL and download it.
//! 5. Write `render@2x.png`, then the curated `meta.json`.
//!
//! A failing probe or an unreadable cached record never fails the entry; it
//! falls through to a full refresh. `meta.json` is written last, so a refresh
//! that fails part way keeps the previous version on record and the next run
//! refreshes again.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::api::ApiError;
use crate::api::DesignApi;
use crate::events::CacheEvent;
use crate::events::CacheEvents;
use crate::events::PipelineStep;
use crate::events::RefreshReason;
use crate::figma_url::UrlParseError;
use crate::listing::UrlEntry;
use crate::store::CacheRecord;
use crate::store::CacheStore;
use crate::store::StoreError;
use crate::store::now_rfc3339;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Outcome of a successful pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryStatus {
    /// Metadata and image were written.
    Cached,
    /// The cache was already fresh.
    Skipped,
}

/// Errors failing one entry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    /// The entry URL is not a design node link.
    #[error(transparent)]
    InvalidUrl(#[from] UrlParseError),
    /// A remote call failed.
    #[error(transparent)]
    Api(#[from] ApiError),
    /// Writing the cache failed.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// The metadata response has no data for the node.
    #[error("node not found: {node_id}")]
    NodeNotFound {
        /// Requested node id.
        node_id: String,
    },
    /// The image response has no URL for the node.
    #[error("no image url returned for node: {node_id}")]
    MissingImageUrl {
        /// Requested node id.
        node_id: String,
    },
    /// The image response reported a render error.
    #[error("image render failed: {message}")]
    ImageApi {
        /// Render error reported by the API.
        message: String,
    },
}

// ============================================================================
// SECTION: Pipeline
// ============================================================================

/// Caches entries against one API and one store.
#[derive(Clone, Copy)]
pub struct CachePipeline<'a> {
    /// Remote API.
    api: &'a dyn DesignApi,
    /// Cache store.
    store: &'a CacheStore,
    /// Event observer.
    events: &'a dyn CacheEvents,
}

impl<'a> CachePipeline<'a> {
    /// Creates a pipeline.
    #[must_use]
    pub const fn new(
        api: &'a dyn DesignApi,
        store: &'a CacheStore,
        events: &'a dyn CacheEvents,
    ) -> Self {
        Self {
            api,
            store,
            events,
        }
    }

    /// Returns the cache store.
    #[must_use]
    pub const fn store(&self) -> &'a CacheStore {
        self.store
    }

    /// Returns the event observer.
    #[must_use]
    pub const fn events(&self) -> &'a dyn CacheEvents {
        self.events
    }

    /// Brings the cache for `entry` up to date.
    ///
    /// With `force`, the freshness probe is bypassed.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] when a required remote call or write fails.
    pub fn cache_entry(&self, entry: &UrlEntry, force: bool) -> Result<EntryStatus, CacheError> {
        self.events.emit(&CacheEvent::EntryStarted {
            slug: entry.slug.clone(),
            label: entry.label.clone(),
        });
        let result = self.run(entry, force);
        match &result {
            Ok(EntryStatus::Cached) => self.events.emit(&CacheEvent::Cached {
                slug: entry.slug.clone(),
            }),
            Ok(EntryStatus::Skipped) => {}
            Err(err) => self.events.emit(&CacheEvent::Failed {
                slug: entry.slug.clone(),
                error: err.to_string(),
            }),
        }
        result
    }

    /// Runs the pipeline steps.
    fn run(&self, entry: &UrlEntry, force: bool) -> Result<EntryStatus, CacheError> {
        if self.is_fresh(entry, force) {
            return Ok(EntryStatus::Skipped);
        }

        self.step(entry, PipelineStep::FetchingMetadata);
        let raw = self.api.node_metadata(&entry.file_key, &entry.node_id)?;
        let record = CacheRecord::from_metadata(entry, &raw, now_rfc3339()).ok_or_else(|| {
            CacheError::NodeNotFound {
                node_id: entry.node_id.clone(),
            }
        })?;
        self.store.write_raw_metadata(&entry.slug, &raw)?;
        self.step(entry, PipelineStep::MetadataSaved);

        self.step(entry, PipelineStep::FetchingImageUrl);
        let images = self.api.image_urls(&entry.file_key, &entry.node_id)?;
        if let Some(message) = images.err.as_deref().filter(|message| !message.is_empty()) {
            return Err(CacheError::ImageApi {
                message: message.to_string(),
            });
        }
        let image_url = images.url_for(&entry.node_id).ok_or_else(|| {
            CacheError::MissingImageUrl {
                node_id: entry.node_id.clone(),
            }
        })?;

        self.step(entry, PipelineStep::DownloadingImage);
        let bytes = self.api.download_image(image_url)?;
        self.store.write_image(&entry.slug, &bytes)?;
        self.step(entry, PipelineStep::ImageSaved);
        self.store.write_record(&record)?;
        self.step(entry, PipelineStep::RecordSaved);
        Ok(EntryStatus::Cached)
    }

    /// Returns true when the cached copy matches the remote version.
    fn is_fresh(&self, entry: &UrlEntry, force: bool) -> bool {
        if force {
            self.refresh(entry, RefreshReason::Forced);
            return false;
        }
        let record = match self.store.read_record(&entry.slug) {
            Ok(Some(record)) => record,
            Ok(None) => {
                self.refresh(entry, RefreshReason::NotCached);
                return false;
            }
            Err(err) => {
                self.probe_failed(entry, err.to_string());
                return false;
            }
        };
        let Some(cached) = record.version else {
            self.refresh(entry, RefreshReason::Unversioned);
            return false;
        };
        if !self.store.has_image(&entry.slug) {
            self.refresh(entry, RefreshReason::ImageMissing);
            return false;
        }

        match self.api.file_version(&entry.file_key) {
            Ok(probe) => match probe.version {
                Some(remote) if remote == cached => {
                    self.events.emit(&CacheEvent::Fresh {
                        slug: entry.slug.clone(),
                        version: remote,
                    });
                    true
                }
                Some(remote) => {
                    self.events.emit(&CacheEvent::Stale {
                        slug: entry.slug.clone(),
                        cached,
                        remote,
                    });
                    false
                }
                None => {
                    self.probe_failed(entry, "file response carries no version".to_string());
                    false
                }
            },
            Err(err) => {
                self.probe_failed(entry, err.to_string());
                false
            }
        }
    }

    /// Emits a refresh event.
    fn refresh(&self, entry: &UrlEntry, reason: RefreshReason) {
        self.events.emit(&CacheEvent::Refresh {
            slug: entry.slug.clone(),
            reason,
        });
    }

    /// Emits a probe failure event.
    fn probe_failed(&self, entry: &UrlEntry, error: String) {
        self.events.emit(&CacheEvent::ProbeFailed {
            slug: entry.slug.clone(),
            error,
        });
    }

    /// Emits a step event.
    fn step(&self, entry: &UrlEntry, step: PipelineStep) {
        self.events.emit(&CacheEvent::Step {
            slug: entry.slug.clone(),
            step,
        });
    }
}
