// crates/questionnaire-core/src/steps.rs
// ============================================================================
// Module: Questionnaire Step Graph
// Description: Static step table with route paths and next-step pointers.
// Purpose: Provide bounded step numbers and stable step names for consumers.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! The questionnaire is a fixed, three-step graph compiled into the binary.
//! Each step carries a stable name, a 1-based number, the route path the UI
//! renders it under, and an optional pointer to the next step.
//!
//! ## Invariants
//! - [`StepNumber`] values are always within `1..=TOTAL_STEPS`.
//! - [`QUESTIONNAIRE_STEPS`] is ordered by step number.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Step Names
// ============================================================================

/// Named questionnaire steps.
///
/// # Invariants
/// - Variants are stable for serialization and route matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StepName {
    /// Step 1: preferred destination countries.
    Countries,
    /// Step 2: family status.
    FamilyStatus,
    /// Step 3: personal details.
    PersonalDetails,
}

impl StepName {
    /// Returns the stable kebab-case label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Countries => "countries",
            Self::FamilyStatus => "family-status",
            Self::PersonalDetails => "personal-details",
        }
    }

    /// Parses a kebab-case step label.
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        QUESTIONNAIRE_STEPS.iter().map(|spec| spec.name).find(|name| name.as_str() == label)
    }

    /// Returns the static table entry for this step.
    #[must_use]
    pub const fn spec(self) -> &'static StepSpec {
        match self {
            Self::Countries => &QUESTIONNAIRE_STEPS[0],
            Self::FamilyStatus => &QUESTIONNAIRE_STEPS[1],
            Self::PersonalDetails => &QUESTIONNAIRE_STEPS[2],
        }
    }
}

impl fmt::Display for StepName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Step Numbers
// ============================================================================

/// 1-based step number restricted to the static step table.
///
/// # Invariants
/// - Always within `1..=TOTAL_STEPS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct StepNumber(u8);

impl StepNumber {
    /// The first questionnaire step.
    pub const FIRST: Self = Self(1);
    /// The last questionnaire step.
    pub const LAST: Self = Self(3);

    /// Creates a step number when `raw` is a defined step.
    #[must_use]
    pub fn new(raw: u32) -> Option<Self> {
        let value = u8::try_from(raw).ok()?;
        if (1 ..= Self::LAST.0).contains(&value) { Some(Self(value)) } else { None }
    }

    /// Returns the raw step number.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0 as u32
    }

    /// Returns the step name for this number.
    #[must_use]
    pub const fn name(self) -> StepName {
        match self.0 {
            1 => StepName::Countries,
            2 => StepName::FamilyStatus,
            _ => StepName::PersonalDetails,
        }
    }
}

impl TryFrom<u32> for StepNumber {
    type Error = String;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("step {value} is not a questionnaire step"))
    }
}

impl From<StepNumber> for u32 {
    fn from(value: StepNumber) -> Self {
        value.get()
    }
}

impl fmt::Display for StepNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ============================================================================
// SECTION: Step Table
// ============================================================================

/// Static description of one questionnaire step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepSpec {
    /// Stable step name.
    pub name: StepName,
    /// Route path the UI renders this step under.
    pub path: &'static str,
    /// 1-based step number.
    pub number: StepNumber,
    /// Next step, or `None` for the final step.
    pub next: Option<StepName>,
}

impl StepSpec {
    /// Returns the table entry of the next step, if any.
    #[must_use]
    pub fn next_spec(&self) -> Option<&'static Self> {
        self.next.map(StepName::spec)
    }
}

/// The questionnaire step graph, ordered by step number.
pub const QUESTIONNAIRE_STEPS: [StepSpec; 3] = [
    StepSpec {
        name: StepName::Countries,
        path: "/questionnaire/countries",
        number: StepNumber(1),
        next: Some(StepName::FamilyStatus),
    },
    StepSpec {
        name: StepName::FamilyStatus,
        path: "/questionnaire/family-status",
        number: StepNumber(2),
        next: Some(StepName::PersonalDetails),
    },
    StepSpec {
        name: StepName::PersonalDetails,
        path: "/questionnaire/personal-details",
        number: StepNumber(3),
        next: None,
    },
];

/// Number of questionnaire steps.
pub const TOTAL_STEPS: u32 = 3;

// ============================================================================
// SECTION: Tests
// ============================================================================
