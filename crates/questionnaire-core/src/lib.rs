// crates/questionnaire-core/src/lib.rs
// ============================================================================
// Module: Questionnaire Core
// Description: State service for the multi-step lead-qualification questionnaire.
// Purpose: Own step data, per-step validation, and the submission lifecycle.
// Dependencies: async-trait, reqwest, serde, thiserror, tokio
// ============================================================================

//! ## Overview
//! This crate is the single source of truth for an in-progress relocation
//! questionnaire. UI step pages hold a [`QuestionnaireStore`], write answers
//! with partial updates, check [`QuestionnaireStore::is_step_valid`] before
//! letting the visitor continue, and finally submit through a pluggable
//! [`Submitter`].
//! Invariants:
//! - Validation never fails loudly; it is a boolean predicate over the answers.
//! - Submission failures are captured and reported, never propagated as panics.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod data;
pub mod state;
pub mod steps;
pub mod store;
pub mod submit;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use data::FAMILY_STATUS_OPTIONS;
pub use data::QuestionnaireData;
pub use data::QuestionnaireUpdate;
pub use state::QuestionnaireAction;
pub use state::QuestionnaireState;
pub use state::reduce;
pub use steps::QUESTIONNAIRE_STEPS;
pub use steps::StepName;
pub use steps::StepNumber;
pub use steps::StepSpec;
pub use steps::TOTAL_STEPS;
pub use store::QuestionnaireError;
pub use store::QuestionnaireStore;
pub use store::SubmitOutcome;
pub use submit::HttpSubmitter;
pub use submit::SimulatedSubmitter;
pub use submit::SubmitError;
pub use submit::Submitter;

#[cfg(test)]
mod tests;
