// crates/questionnaire-core/src/tests.rs
// ============================================================================
// Module: Questionnaire Test Lint Configuration
// Description: Shared test-only lint relaxations for questionnaire unit tests.
// Purpose: Allow panic-based assertions and debug output in tests.
// Dependencies: questionnaire-core
// ============================================================================

//! ## Overview
//! Provides test-only lint relaxations for questionnaire unit tests.

// ============================================================================
// SECTION: Lint Configuration
// ============================================================================

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

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::QuestionnaireStore;
use crate::QuestionnaireUpdate;
use crate::StepNumber;
use crate::store::QuestionnaireError;

// ============================================================================
// SECTION: Store Navigation
// ============================================================================

#[test]
fn set_step_rejects_steps_outside_table() {
    let mut store = QuestionnaireStore::new();
    store.set_step(2).unwrap();
    let err = store.set_step(7).unwrap_err();
    assert_eq!(
        err,
        QuestionnaireError::StepOutOfRange {
            step: 7,
            total: 3
        }
    );
    assert_eq!(store.current_step(), StepNumber::new(2).unwrap());
    assert!(store.set_step(0).is_err());
}

#[test]
fn next_step_path_follows_table() {
    let mut store = QuestionnaireStore::new();
    assert_eq!(store.next_step_path(), Some("/questionnaire/family-status"));
    store.set_step(3).unwrap();
    assert_eq!(store.next_step_path(), None);
    assert_eq!(store.progress(), (3, 3));
}

#[test]
fn can_advance_tracks_current_step() {
    let mut store = QuestionnaireStore::new();
    assert!(!store.can_advance());
    store.update_data(QuestionnaireUpdate::countries(["PT"]));
    assert!(store.can_advance());
    store.set_step(2).unwrap();
    assert!(!store.can_advance());
}

#[test]
fn snapshots_are_detached_from_store() {
    let mut store = QuestionnaireStore::new();
    store.update_data(QuestionnaireUpdate::countries(["CA", "DE"]));
    let mut snapshot = store.data();
    snapshot.preferred_countries.clear();
    snapshot.family_status = "married".to_string();
    assert_eq!(store.data().preferred_countries.len(), 2);
    assert!(store.data().family_status.is_empty());
}
