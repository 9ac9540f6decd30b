// crates/questionnaire-core/src/store.rs
// ============================================================================
// Module: Questionnaire Store
// Description: Session-scoped owner of questionnaire state.
// Purpose: Provide the consumer-facing entry points for step pages.
// Dependencies: crate::{data, state, steps, submit}, serde, thiserror
// ============================================================================

//! ## Overview
//! A [`QuestionnaireStore`] is constructed once per session and passed by
//! reference to the step pages that consume it. Every mutation is routed
//! through [`QuestionnaireStore::dispatch`] and the pure reducer; readers get
//! owned snapshots, so mutating a snapshot never touches the store.
//!
//! ## Invariants
//! - `submit` borrows the store mutably, so one store never has two
//!   submissions in flight.
//! - State is in memory only and is lost when the store is dropped.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::data::QuestionnaireData;
use crate::data::QuestionnaireUpdate;
use crate::state::QuestionnaireAction;
use crate::state::QuestionnaireState;
use crate::state::is_step_valid;
use crate::state::reduce;
use crate::state::show_spouse_fields;
use crate::steps::StepNumber;
use crate::steps::TOTAL_STEPS;
use crate::submit::Submitter;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors returned by questionnaire store entry points.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuestionnaireError {
    /// The requested step is not part of the step table.
    #[error("step {step} is outside 1..={total}")]
    StepOutOfRange {
        /// Rejected step number.
        step: u32,
        /// Number of defined steps.
        total: u32,
    },
}

// ============================================================================
// SECTION: Submit Outcome
// ============================================================================

/// Result of a submission attempt as reported to the consumer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitOutcome {
    /// True when the submission succeeded.
    pub success: bool,
    /// Failure message when `success` is false.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SubmitOutcome {
    /// Successful outcome.
    #[must_use]
    pub const fn succeeded() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    /// Failed outcome carrying `message`.
    #[must_use]
    pub const fn failed(message: String) -> Self {
        Self {
            success: false,
            error: Some(message),
        }
    }
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// Session-scoped questionnaire store.
#[derive(Debug, Clone, Default)]
pub struct QuestionnaireStore {
    /// Current questionnaire state.
    state: QuestionnaireState,
}

impl QuestionnaireStore {
    /// Creates a store holding the initial state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: QuestionnaireState::initial(),
        }
    }

    /// Returns a snapshot of the full state.
    #[must_use]
    pub fn state(&self) -> QuestionnaireState {
        self.state.clone()
    }

    /// Returns a snapshot of the answer data.
    #[must_use]
    pub fn data(&self) -> QuestionnaireData {
        self.state.data.clone()
    }

    /// Returns the current step.
    #[must_use]
    pub const fn current_step(&self) -> StepNumber {
        self.state.current_step
    }

    /// Applies one action through the reducer.
    pub fn dispatch(&mut self, action: QuestionnaireAction) {
        let current = std::mem::take(&mut self.state);
        self.state = reduce(current, action);
    }

    /// Shallow-merges `update` into the answers without validating them.
    pub fn update_data(&mut self, update: QuestionnaireUpdate) {
        self.dispatch(QuestionnaireAction::UpdateData(update));
    }

    /// Moves the questionnaire to `step`.
    ///
    /// # Errors
    ///
    /// Returns [`QuestionnaireError::StepOutOfRange`] when `step` is not a
    /// defined step; the state is left unchanged.
    pub fn set_step(&mut self, step: u32) -> Result<(), QuestionnaireError> {
        let number = StepNumber::new(step).ok_or(QuestionnaireError::StepOutOfRange {
            step,
            total: TOTAL_STEPS,
        })?;
        self.dispatch(QuestionnaireAction::SetStep(number));
        Ok(())
    }

    /// Returns true when `step` has all required answers.
    #[must_use]
    pub fn is_step_valid(&self, step: u32) -> bool {
        is_step_valid(&self.state.data, step)
    }

    /// Returns true when the spouse fields should be rendered.
    #[must_use]
    pub fn show_spouse_fields(&self) -> bool {
        show_spouse_fields(&self.state.data)
    }

    /// Returns true when the current step may continue to the next one.
    #[must_use]
    pub fn can_advance(&self) -> bool {
        self.is_step_valid(self.state.current_step.get())
    }

    /// Returns the route path of the step after the current one.
    #[must_use]
    pub fn next_step_path(&self) -> Option<&'static str> {
        self.state.current_step.name().spec().next_spec().map(|spec| spec.path)
    }

    /// Returns `(current, total)` for progress indicators.
    #[must_use]
    pub const fn progress(&self) -> (u32, u32) {
        (self.state.current_step.get(), TOTAL_STEPS)
    }

    /// Submits the answers through `submitter`.
    ///
    /// Failures are captured in the state and in the returned outcome; the
    /// answers are kept so the caller can submit again.
    pub async fn submit<S>(&mut self, submitter: &S) -> SubmitOutcome
    where
        S: Submitter + ?Sized,
    {
        self.dispatch(QuestionnaireAction::SubmitStart);
        let data = self.state.data.clone();
        match submitter.submit(&data).await {
            Ok(()) => {
                self.dispatch(QuestionnaireAction::SubmitSuccess);
                SubmitOutcome::succeeded()
            }
            Err(err) => {
                let message = err.to_string();
                self.dispatch(QuestionnaireAction::SubmitFailure(message.clone()));
                SubmitOutcome::failed(message)
            }
        }
    }

    /// Restores the initial state.
    pub fn reset(&mut self) {
        self.dispatch(QuestionnaireAction::Reset);
    }
}
