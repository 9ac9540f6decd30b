// crates/questionnaire-core/src/state.rs
// ============================================================================
// Module: Questionnaire State Machine
// Description: Questionnaire state, actions, reducer, and step validation.
// Purpose: Express every state transition as an explicit, testable action.
// Dependencies: crate::{data, steps}, serde
// ============================================================================

//! ## Overview
//! [`QuestionnaireState`] evolves only through [`reduce`], which applies one
//! [`QuestionnaireAction`] and returns the next state. Step validity is a pure
//! function of the answer data and never looks at the current step.
//!
//! ## Invariants
//! - `current_step` is always a step from the static table.
//! - A failed submission never clears answer data.
//! - [`QuestionnaireState::initial`] is the only reset target.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::data::QuestionnaireData;
use crate::data::QuestionnaireUpdate;
use crate::data::has_partner;
use crate::steps::StepNumber;

// ============================================================================
// SECTION: State
// ============================================================================

/// Snapshot of an in-progress questionnaire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionnaireState {
    /// Step the consumer is currently rendering.
    pub current_step: StepNumber,
    /// Collected answers.
    pub data: QuestionnaireData,
    /// True while a submission is in flight.
    pub is_submitting: bool,
    /// True once a submission succeeded.
    pub is_complete: bool,
    /// Error message from the last failed submission.
    pub error: Option<String>,
}

impl QuestionnaireState {
    /// Returns the documented initial state: step 1, empty data, idle.
    #[must_use]
    pub fn initial() -> Self {
        Self {
            current_step: StepNumber::FIRST,
            data: QuestionnaireData::default(),
            is_submitting: false,
            is_complete: false,
            error: None,
        }
    }
}

impl Default for QuestionnaireState {
    fn default() -> Self {
        Self::initial()
    }
}

// ============================================================================
// SECTION: Actions
// ============================================================================

/// State transitions accepted by [`reduce`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestionnaireAction {
    /// Shallow-merge a partial update into the answer data.
    UpdateData(QuestionnaireUpdate),
    /// Move to another step.
    SetStep(StepNumber),
    /// A submission started.
    SubmitStart,
    /// The in-flight submission succeeded.
    SubmitSuccess,
    /// The in-flight submission failed with a message.
    SubmitFailure(String),
    /// Restore the initial state.
    Reset,
}

/// Applies `action` to `state` and returns the next state.
#[must_use]
pub fn reduce(mut state: QuestionnaireState, action: QuestionnaireAction) -> QuestionnaireState {
    match action {
        QuestionnaireAction::UpdateData(update) => {
            state.data.merge(update);
            state
        }
        QuestionnaireAction::SetStep(step) => {
            state.current_step = step;
            state
        }
        QuestionnaireAction::SubmitStart => {
            state.is_submitting = true;
            state.error = None;
            state
        }
        QuestionnaireAction::SubmitSuccess => {
            state.is_complete = true;
            state.is_submitting = false;
            state
        }
        QuestionnaireAction::SubmitFailure(message) => {
            state.error = Some(message);
            state.is_submitting = false;
            state
        }
        QuestionnaireAction::Reset => QuestionnaireState::initial(),
    }
}

// ============================================================================
// SECTION: Validation
// ============================================================================

/// Returns true when `step` has all of its required answers in `data`.
///
/// Unknown step numbers are never valid.
#[must_use]
pub fn is_step_valid(data: &QuestionnaireData, step: u32) -> bool {
    match step {
        1 => !data.preferred_countries.is_empty(),
        2 => !data.family_status.is_empty(),
        3 => data.required_personal_fields().iter().all(|field| !field.is_empty()),
        _ => false,
    }
}

/// Returns true when the spouse fields should be rendered.
#[must_use]
pub fn show_spouse_fields(data: &QuestionnaireData) -> bool {
    has_partner(&data.family_status)
}

// ============================================================================
// SECTION: Tests
// ============================================================================
