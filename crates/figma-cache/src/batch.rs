// crates/figma-cache/src/batch.rs
// ============================================================================
// Module: Batch Runner
// Description: Bounded worker pool that caches every listing entry.
// Purpose: Isolate per-entry failures and report cached/skipped/failed totals.
// Dependencies: crate::{events, listing, pipeline}
// ============================================================================

//! ## Overview
//! Entries are grouped by slug in first-appearance order. Each group is
//! claimed by exactly one worker and processed in listing order, so two
//! entries sharing a slug never write the same directory concurrently and the
//! last one in the listing wins. Groups are spread over at most
//! [`MAX_JOBS`] scoped threads.
//!
//! ## Invariants
//! - Every listing item yields exactly one [`EntryOutcome`], in listing order.
//! - `cached + skipped + failed` equals the number of listing items.
//! - One failing entry never prevents the others from running.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::PoisonError;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::thread;
use std::time::Duration;

use crate::events::CacheEvent;
use crate::figma_url::UrlParseError;
use crate::listing::ListingItem;
use crate::listing::UrlEntry;
use crate::listing::UrlListing;
use crate::pipeline::CacheError;
use crate::pipeline::CachePipeline;
use crate::pipeline::EntryStatus;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default worker count.
pub const DEFAULT_JOBS: usize = 4;

/// Upper bound on worker count.
pub const MAX_JOBS: usize = 8;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Options for a batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchOptions {
    /// Requested worker count; clamped to `1..=MAX_JOBS`.
    pub jobs: usize,
    /// Bypass freshness checks.
    pub force: bool,
    /// Pause after each processed entry.
    pub request_delay: Duration,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            jobs: DEFAULT_JOBS,
            force: false,
            request_delay: Duration::ZERO,
        }
    }
}

impl BatchOptions {
    /// Returns the effective worker count.
    #[must_use]
    pub fn effective_jobs(&self) -> usize {
        self.jobs.clamp(1, MAX_JOBS)
    }
}

/// Result for one listing item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryOutcome {
    /// Entry label.
    pub label: String,
    /// Entry URL.
    pub url: String,
    /// Entry slug; `None` for unresolvable URLs.
    pub slug: Option<String>,
    /// Pipeline result.
    pub result: Result<EntryStatus, CacheError>,
}

/// Totals and per-item outcomes of a batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Entries written.
    pub cached: usize,
    /// Entries already fresh.
    pub skipped: usize,
    /// Entries that failed, including unresolvable URLs.
    pub failed: usize,
    /// Per-item outcomes in listing order.
    pub outcomes: Vec<EntryOutcome>,
}

impl BatchSummary {
    /// Returns true when no item failed.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// Adds one outcome to the totals.
    fn record(&mut self, outcome: EntryOutcome) {
        match &outcome.result {
            Ok(EntryStatus::Cached) => self.cached += 1,
            Ok(EntryStatus::Skipped) => self.skipped += 1,
            Err(_) => self.failed += 1,
        }
        self.outcomes.push(outcome);
    }
}

// ============================================================================
// SECTION: Runner
// ============================================================================

/// Caches every item of `listing` and reports a summary.
#[must_use]
pub fn run_batch(
    listing: &UrlListing,
    pipeline: &CachePipeline<'_>,
    options: BatchOptions,
) -> BatchSummary {
    let groups = group_by_slug(listing);
    let slots: Mutex<Vec<Option<EntryOutcome>>> =
        Mutex::new(listing.items.iter().map(invalid_outcome).collect());
    let next_group = AtomicUsize::new(0);
    let workers = options.effective_jobs().min(groups.len()).max(1);

    thread::scope(|scope| {
        for _ in 0 .. workers {
            scope.spawn(|| {
                loop {
                    let claimed = next_group.fetch_add(1, Ordering::Relaxed);
                    let Some(group) = groups.get(claimed) else {
                        break;
                    };
                    for &(index, entry) in group {
                        let result = pipeline.cache_entry(entry, options.force);
                        let outcome = EntryOutcome {
                            label: entry.label.clone(),
                            url: entry.url.clone(),
                            slug: Some(entry.slug.clone()),
                            result,
                        };
                        if let Some(slot) =
                            slots.lock().unwrap_or_else(PoisonError::into_inner).get_mut(index)
                        {
                            *slot = Some(outcome);
                        }
                        if !options.request_delay.is_zero() {
                            thread::sleep(options.request_delay);
                        }
                    }
                }
            });
        }
    });

    let slots = slots.into_inner().unwrap_or_else(PoisonError::into_inner);
    let mut summary = BatchSummary::default();
    for outcome in slots.into_iter().flatten() {
        summary.record(outcome);
    }

    pipeline.events().emit(&CacheEvent::Summary {
        cached: summary.cached,
        skipped: summary.skipped,
        failed: summary.failed,
    });
    summary
}

/// Returns the failed outcome of an unresolvable item.
fn invalid_outcome(item: &ListingItem) -> Option<EntryOutcome> {
    let ListingItem::Invalid(invalid) = item else {
        return None;
    };
    Some(EntryOutcome {
        label: invalid.label.clone(),
        url: invalid.url.clone(),
        slug: None,
        result: Err(CacheError::InvalidUrl(UrlParseError::NotFigmaNode {
            url: invalid.url.clone(),
        })),
    })
}

/// Groups resolved entries by slug, keeping first-appearance order.
fn group_by_slug(listing: &UrlListing) -> Vec<Vec<(usize, &UrlEntry)>> {
    let mut groups: Vec<Vec<(usize, &UrlEntry)>> = Vec::new();
    let mut by_slug: HashMap<&str, usize> = HashMap::new();
    for (index, item) in listing.items.iter().enumerate() {
        let ListingItem::Valid(entry) = item else {
            continue;
        };
        match by_slug.get(entry.slug.as_str()) {
            Some(&group) => {
                if let Some(members) = groups.get_mut(group) {
                    members.push((index, entry));
                }
            }
            None => {
                by_slug.insert(entry.slug.as_str(), groups.len());
                groups.push(vec![(index, entry)]);
            }
        }
    }
    groups
}

// ============================================================================
// SECTION: Tests
// ============================================================================
