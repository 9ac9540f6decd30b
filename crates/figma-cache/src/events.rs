// crates/figma-cache/src/events.rs
// ============================================================================
// Module: Cache Events
// Description: Typed progress and warning events emitted by the cache engine.
// Purpose: Keep reporting pluggable so the engine never prints directly.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! The engine reports what it does through a [`CacheEvents`] observer. The
//! CLI renders events as localized text; [`JsonLinesEvents`] writes one JSON
//! object per event for machine consumption; [`RecordingEvents`] keeps them
//! in memory for assertions.
//!
//! ## Invariants
//! - Emitting an event never fails the operation that produced it.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::sync::Mutex;
use std::sync::PoisonError;

use serde::Serialize;

// ============================================================================
// SECTION: Events
// ============================================================================

/// Pipeline step reached for one entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStep {
    /// Requesting node metadata.
    FetchingMetadata,
    /// Raw metadata response written.
    MetadataSaved,
    /// Requesting the rendered image URL.
    FetchingImageUrl,
    /// Downloading the rendered image.
    DownloadingImage,
    /// Image written.
    ImageSaved,
    /// Curated record written.
    RecordSaved,
}

impl PipelineStep {
    /// Stable label for logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FetchingMetadata => "fetching_metadata",
            Self::MetadataSaved => "metadata_saved",
            Self::FetchingImageUrl => "fetching_image_url",
            Self::DownloadingImage => "downloading_image",
            Self::ImageSaved => "image_saved",
            Self::RecordSaved => "record_saved",
        }
    }
}

/// Why an entry is refreshed without comparing versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshReason {
    /// The caller asked for a refresh.
    Forced,
    /// No record exists for the slug.
    NotCached,
    /// The record carries no version.
    Unversioned,
    /// The record exists but the image is missing.
    ImageMissing,
}

/// Events emitted while caching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum CacheEvent {
    /// Processing of an entry began.
    EntryStarted {
        /// Entry slug.
        slug: String,
        /// Entry label.
        label: String,
    },
    /// The cached version matches the remote one.
    Fresh {
        /// Entry slug.
        slug: String,
        /// Matching version.
        version: String,
    },
    /// The remote version differs from the cached one.
    Stale {
        /// Entry slug.
        slug: String,
        /// Cached version.
        cached: String,
        /// Remote version.
        remote: String,
    },
    /// The entry is refreshed without a version comparison.
    Refresh {
        /// Entry slug.
        slug: String,
        /// Reason for the refresh.
        reason: RefreshReason,
    },
    /// The freshness probe failed; a full refresh follows.
    ProbeFailed {
        /// Entry slug.
        slug: String,
        /// Failure description.
        error: String,
    },
    /// A pipeline step was reached.
    Step {
        /// Entry slug.
        slug: String,
        /// Step reached.
        step: PipelineStep,
    },
    /// A request is retried after a transient failure.
    Retry {
        /// Request path.
        path: String,
        /// Attempt about to run (1-based).
        attempt: u32,
        /// Failure description.
        reason: String,
    },
    /// The entry was fully cached.
    Cached {
        /// Entry slug.
        slug: String,
    },
    /// The entry failed.
    Failed {
        /// Entry slug.
        slug: String,
        /// Failure description.
        error: String,
    },
    /// A listing line carried a URL that is not a design node link.
    InvalidUrl {
        /// 1-based listing line.
        line: usize,
        /// Label on that line.
        label: String,
        /// Rejected URL.
        url: String,
    },
    /// Several entries resolve to the same slug.
    DuplicateSlug {
        /// Shared slug.
        slug: String,
        /// Number of entries sharing it.
        count: usize,
    },
    /// A batch run finished.
    Summary {
        /// Entries written.
        cached: usize,
        /// Entries already fresh.
        skipped: usize,
        /// Entries that failed.
        failed: usize,
    },
}

// ============================================================================
// SECTION: Observers
// ============================================================================

/// Receives cache events.
pub trait CacheEvents: Send + Sync {
    /// Handles one event.
    fn emit(&self, event: &CacheEvent);
}

/// Observer that discards events.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEvents;

impl CacheEvents for NoopEvents {
    fn emit(&self, _event: &CacheEvent) {}
}

/// Observer that keeps every event in memory.
#[derive(Debug, Default)]
pub struct RecordingEvents {
    /// Events in emission order.
    events: Mutex<Vec<CacheEvent>>,
}

impl RecordingEvents {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<CacheEvent> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl CacheEvents for RecordingEvents {
    fn emit(&self, event: &CacheEvent) {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).push(event.clone());
    }
}

/// Observer writing one JSON object per event.
pub struct JsonLinesEvents<W: Write + Send> {
    /// Output writer for event records.
    writer: Mutex<W>,
}

impl<W: Write + Send> JsonLinesEvents<W> {
    /// Creates a JSON lines observer over `writer`.
    pub const fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Returns the writer.
    pub fn into_inner(self) -> W {
        self.writer.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<W: Write + Send> CacheEvents for JsonLinesEvents<W> {
    fn emit(&self, event: &CacheEvent) {
        let mut guard = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        if serde_json::to_writer(&mut *guard, event).is_ok() {
            guard.write_all(b"\n").ok();
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
