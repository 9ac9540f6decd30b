// crates/figma-cache/tests/batch_run.rs
// ============================================================================
// Module: Batch Runner Tests
// Description: Whole-listing runs against a mock design API.
// Purpose: Verify per-entry isolation, ordering, totals, and slug grouping.
// Dependencies: figma-cache, tempfile, tiny_http
// ============================================================================

//! ## Overview
//! Runs listings through [`figma_cache::run_batch`] with one and several
//! workers and checks that failures stay local to their entry.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

mod common;

use std::time::Duration;

use figma_cache::BatchOptions;
use figma_cache::CacheError;
use figma_cache::CacheEvent;
use figma_cache::CachePipeline;
use figma_cache::CacheStore;
use figma_cache::EntryStatus;
use figma_cache::RecordingEvents;
use figma_cache::load_urls_file;
use figma_cache::parse_urls_file;
use figma_cache::run_batch;
use tempfile::TempDir;

use crate::common::MockFigma;
use crate::common::write_listing;

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Options with `jobs` workers and no delay.
fn options(jobs: usize) -> BatchOptions {
    BatchOptions {
        jobs,
        ..BatchOptions::default()
    }
}

/// Starts a mock that knows nodes `1:1` through `1:4`.
fn four_node_mock() -> MockFigma {
    MockFigma::start(&[
        ("1:1", "One", "FRAME"),
        ("1:2", "Two", "FRAME"),
        ("1:3", "Three", "COMPONENT"),
        ("1:4", "Four", "FRAME"),
    ])
}

// ============================================================================
// SECTION: Isolation
// ============================================================================

#[test]
fn invalid_middle_entry_fails_alone() {
    let mock = four_node_mock();
    let dir = TempDir::new().unwrap();
    let listing = parse_urls_file(
        "First: https://www.figma.com/design/K1/F?node-id=1-1\n\
         Second: https://example.com/not-a-design-link\n\
         Third: https://www.figma.com/design/K1/F?node-id=1-3\n",
    );
    let client = mock.client();
    let store = CacheStore::new(dir.path());
    let events = RecordingEvents::new();
    let pipeline = CachePipeline::new(&client, &store, &events);

    let summary = run_batch(&listing, &pipeline, options(1));
    assert_eq!((summary.cached, summary.skipped, summary.failed), (2, 0, 1));
    let labels: Vec<&str> = summary.outcomes.iter().map(|outcome| outcome.label.as_str()).collect();
    assert_eq!(labels, vec!["First", "Second", "Third"]);
    assert_eq!(summary.outcomes[1].slug, None);
    assert!(matches!(summary.outcomes[1].result, Err(CacheError::InvalidUrl(_))));
    assert!(store.has_image("first_K1_1-1"));
    assert!(store.has_image("third_K1_1-3"));
    assert_eq!(
        events.events().last(),
        Some(&CacheEvent::Summary {
            cached: 2,
            skipped: 0,
            failed: 1,
        })
    );
}

#[test]
fn remote_failure_does_not_stop_parallel_workers() {
    let mock = four_node_mock();
    let dir = TempDir::new().unwrap();
    let listing = parse_urls_file(
        "- A: https://www.figma.com/design/K1/F?node-id=1-1\n\
         - Missing: https://www.figma.com/design/K1/F?node-id=9-9\n\
         - C: https://www.figma.com/design/K1/F?node-id=1-3\n\
         - D: https://www.figma.com/design/K2/G?node-id=1-4\n",
    );
    let client = mock.client();
    let store = CacheStore::new(dir.path());
    let events = RecordingEvents::new();
    let pipeline = CachePipeline::new(&client, &store, &events);

    let summary = run_batch(&listing, &pipeline, options(4));
    assert_eq!((summary.cached, summary.skipped, summary.failed), (3, 0, 1));
    assert_eq!(
        summary.outcomes[1].result,
        Err(CacheError::NodeNotFound {
            node_id: "9:9".to_string(),
        })
    );
    for (index, outcome) in summary.outcomes.iter().enumerate() {
        if index != 1 {
            assert_eq!(outcome.result, Ok(EntryStatus::Cached), "{}", outcome.label);
        }
    }
}

#[test]
fn rerun_skips_everything_fresh() {
    let mock = four_node_mock();
    let dir = TempDir::new().unwrap();
    let listing_path = write_listing(
        dir.path(),
        "## Pages\n\
         https://www.figma.com/design/K1/F?node-id=1-1\n\
         https://www.figma.com/design/K1/F?node-id=1-2\n",
    );
    let listing = load_urls_file(&listing_path).unwrap();
    let client = mock.client();
    let store = CacheStore::new(dir.path().join("cache"));
    let events = RecordingEvents::new();
    let pipeline = CachePipeline::new(&client, &store, &events);

    let first = run_batch(&listing, &pipeline, options(2));
    assert_eq!((first.cached, first.skipped, first.failed), (2, 0, 0));
    let second = run_batch(&listing, &pipeline, options(2));
    assert_eq!((second.cached, second.skipped, second.failed), (0, 2, 0));
    assert!(second.is_success());
    let record = store.read_record("entry-2_K1_1-2").unwrap().unwrap();
    assert_eq!(record.section.as_deref(), Some("Pages"));
}

#[test]
fn shared_slug_entries_are_all_processed_in_order() {
    let mock = four_node_mock();
    let dir = TempDir::new().unwrap();
    let listing = parse_urls_file(
        "Hero: https://www.figma.com/design/K1/F?node-id=1-1\n\
         Other: https://www.figma.com/design/K1/F?node-id=1-2\n\
         hero: https://www.figma.com/design/K1/F?node-id=1-1&t=again\n",
    );
    let client = mock.client();
    let store = CacheStore::new(dir.path());
    let events = RecordingEvents::new();
    let pipeline = CachePipeline::new(&client, &store, &events);

    let summary = run_batch(
        &listing,
        &pipeline,
        BatchOptions {
            jobs: 8,
            force: true,
            request_delay: Duration::from_millis(1),
        },
    );
    assert_eq!((summary.cached, summary.failed), (3, 0));
    let record = store.read_record("hero_K1_1-1").unwrap().unwrap();
    assert_eq!(record.label, "hero");
}

#[test]
fn empty_listing_reports_zero_totals() {
    let mock = four_node_mock();
    let dir = TempDir::new().unwrap();
    let client = mock.client();
    let store = CacheStore::new(dir.path());
    let events = RecordingEvents::new();
    let pipeline = CachePipeline::new(&client, &store, &events);

    let summary = run_batch(&parse_urls_file("nothing here\n"), &pipeline, options(4));
    assert_eq!((summary.cached, summary.skipped, summary.failed), (0, 0, 0));
    assert!(summary.outcomes.is_empty());
    assert!(mock.requests_to("/").is_empty());
}
