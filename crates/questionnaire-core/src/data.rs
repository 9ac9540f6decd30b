// crates/questionnaire-core/src/data.rs
// ============================================================================
// Module: Questionnaire Data
// Description: Lead-qualification answers and partial update records.
// Purpose: Hold the flat answer record collected across questionnaire steps.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! [`QuestionnaireData`] is the flat answer record grouped into three logical
//! steps. [`QuestionnaireUpdate`] is the partial record consumers submit;
//! merging is shallow, so only the fields present in an update overwrite
//! stored values. The optional spouse and citizenship fields can also be
//! cleared: an explicit `null` (`Some(None)`) removes the stored answer.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;

// ============================================================================
// SECTION: Family Status
// ============================================================================

/// Family status value for single applicants.
pub const FAMILY_STATUS_SINGLE: &str = "single";
/// Family status value for married applicants.
pub const FAMILY_STATUS_MARRIED: &str = "married";
/// Family status value for common-law partnerships.
pub const FAMILY_STATUS_COMMON_LAW: &str = "common_law";
/// Family status value for divorced applicants.
pub const FAMILY_STATUS_DIVORCED: &str = "divorced";
/// Family status value for widowed applicants.
pub const FAMILY_STATUS_WIDOWED: &str = "widowed";

/// Known family status options offered by the step 2 dropdown.
pub const FAMILY_STATUS_OPTIONS: &[&str] = &[
    FAMILY_STATUS_SINGLE,
    FAMILY_STATUS_MARRIED,
    FAMILY_STATUS_COMMON_LAW,
    FAMILY_STATUS_DIVORCED,
    FAMILY_STATUS_WIDOWED,
];

/// Returns true when the family status implies a spouse or partner.
#[must_use]
pub fn has_partner(family_status: &str) -> bool {
    family_status == FAMILY_STATUS_MARRIED || family_status == FAMILY_STATUS_COMMON_LAW
}

// ============================================================================
// SECTION: Answer Record
// ============================================================================

/// Flat questionnaire answer record.
///
/// # Invariants
/// - Empty strings and empty sets mean "not answered".
/// - Optional spouse and citizenship fields are never required.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QuestionnaireData {
    /// Step 1: preferred destination country codes.
    pub preferred_countries: BTreeSet<String>,
    /// Step 2: family status label.
    pub family_status: String,
    /// Step 3: applicant full name.
    pub full_name: String,
    /// Step 3: contact email.
    pub email: String,
    /// Step 3: contact phone.
    pub phone: String,
    /// Step 3: birth date as entered.
    pub birth_date: String,
    /// Step 3: current citizenship.
    pub citizenship: String,
    /// Step 3: spouse birth date, shown for partnered applicants.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spouse_birth_date: Option<String>,
    /// Step 3: spouse citizenship, shown for partnered applicants.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spouse_citizenship: Option<String>,
    /// Step 3: additional citizenship.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_citizenship: Option<String>,
    /// Step 3: current country of residence.
    pub residence_country: String,
}

impl QuestionnaireData {
    /// Applies a partial update; fields absent from `update` are untouched.
    pub fn merge(&mut self, update: QuestionnaireUpdate) {
        let QuestionnaireUpdate {
            preferred_countries,
            family_status,
            full_name,
            email,
            phone,
            birth_date,
            citizenship,
            spouse_birth_date,
            spouse_citizenship,
            additional_citizenship,
            residence_country,
        } = update;
        if let Some(value) = preferred_countries {
            self.preferred_countries = value;
        }
        if let Some(value) = family_status {
            self.family_status = value;
        }
        if let Some(value) = full_name {
            self.full_name = value;
        }
        if let Some(value) = email {
            self.email = value;
        }
        if let Some(value) = phone {
            self.phone = value;
        }
        if let Some(value) = birth_date {
            self.birth_date = value;
        }
        if let Some(value) = citizenship {
            self.citizenship = value;
        }
        if let Some(value) = spouse_birth_date {
            self.spouse_birth_date = value;
        }
        if let Some(value) = spouse_citizenship {
            self.spouse_citizenship = value;
        }
        if let Some(value) = additional_citizenship {
            self.additional_citizenship = value;
        }
        if let Some(value) = residence_country {
            self.residence_country = value;
        }
    }

    /// Returns the six step-3 fields that must be non-empty.
    #[must_use]
    pub fn required_personal_fields(&self) -> [&str; 6] {
        [
            self.full_name.as_str(),
            self.email.as_str(),
            self.phone.as_str(),
            self.birth_date.as_str(),
            self.citizenship.as_str(),
            self.residence_country.as_str(),
        ]
    }
}

// ============================================================================
// SECTION: Partial Updates
// ============================================================================

/// Partial questionnaire update.
///
/// # Invariants
/// - `None` leaves the stored field unchanged; `Some` overwrites it.
/// - For the optional fields, `Some(None)` clears the stored answer. In JSON
///   an absent key is `None` and an explicit `null` is `Some(None)`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QuestionnaireUpdate {
    /// Replacement country set.
    pub preferred_countries: Option<BTreeSet<String>>,
    /// Replacement family status.
    pub family_status: Option<String>,
    /// Replacement full name.
    pub full_name: Option<String>,
    /// Replacement email.
    pub email: Option<String>,
    /// Replacement phone.
    pub phone: Option<String>,
    /// Replacement birth date.
    pub birth_date: Option<String>,
    /// Replacement citizenship.
    pub citizenship: Option<String>,
    /// Replacement spouse birth date; `Some(None)` clears it.
    #[serde(deserialize_with = "present_or_null", skip_serializing_if = "Option::is_none")]
    pub spouse_birth_date: Option<Option<String>>,
    /// Replacement spouse citizenship; `Some(None)` clears it.
    #[serde(deserialize_with = "present_or_null", skip_serializing_if = "Option::is_none")]
    pub spouse_citizenship: Option<Option<String>>,
    /// Replacement additional citizenship; `Some(None)` clears it.
    #[serde(deserialize_with = "present_or_null", skip_serializing_if = "Option::is_none")]
    pub additional_citizenship: Option<Option<String>>,
    /// Replacement residence country.
    pub residence_country: Option<String>,
}

impl QuestionnaireUpdate {
    /// Update that replaces the preferred country set.
    #[must_use]
    pub fn countries<I, S>(countries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            preferred_countries: Some(countries.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    /// Update that replaces the family status.
    #[must_use]
    pub fn family_status(status: impl Into<String>) -> Self {
        Self {
            family_status: Some(status.into()),
            ..Self::default()
        }
    }
}

/// Maps a present JSON value, `null` included, to `Some`.
fn present_or_null<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::QuestionnaireData;
    use super::QuestionnaireUpdate;
    use super::has_partner;

    #[test]
    fn merge_only_overwrites_present_fields() {
        let mut data = QuestionnaireData {
            full_name: "Dana Levi".to_string(),
            email: "dana@example.com".to_string(),
            ..QuestionnaireData::default()
        };
        data.merge(QuestionnaireUpdate {
            email: Some("dana.levi@example.com".to_string()),
            spouse_citizenship: Some(Some("IL".to_string())),
            ..QuestionnaireUpdate::default()
        });
        assert_eq!(data.full_name, "Dana Levi");
        assert_eq!(data.email, "dana.levi@example.com");
        assert_eq!(data.spouse_citizenship.as_deref(), Some("IL"));
        assert!(data.preferred_countries.is_empty());
    }

    #[test]
    fn explicit_null_clears_optional_fields() {
        let mut data = QuestionnaireData {
            spouse_birth_date: Some("1990-02-03".to_string()),
            spouse_citizenship: Some("IL".to_string()),
            additional_citizenship: Some("PT".to_string()),
            ..QuestionnaireData::default()
        };
        data.merge(QuestionnaireUpdate {
            spouse_birth_date: Some(None),
            ..QuestionnaireUpdate::default()
        });
        assert_eq!(data.spouse_birth_date, None);
        assert_eq!(data.spouse_citizenship.as_deref(), Some("IL"));

        let update: QuestionnaireUpdate = serde_json::from_str(
            r#"{"spouseCitizenship": null, "additionalCitizenship": "ES"}"#,
        )
        .unwrap_or_default();
        assert_eq!(update.spouse_birth_date, None);
        assert_eq!(update.spouse_citizenship, Some(None));
        data.merge(update);
        assert_eq!(data.spouse_citizenship, None);
        assert_eq!(data.additional_citizenship.as_deref(), Some("ES"));
    }

    #[test]
    fn partner_statuses() {
        assert!(has_partner("married"));
        assert!(has_partner("common_law"));
        assert!(!has_partner("single"));
        assert!(!has_partner("Married"));
        assert!(!has_partner(""));
    }

    #[test]
    fn data_serializes_with_camel_case_keys() {
        let data = QuestionnaireData {
            family_status: "single".to_string(),
            ..QuestionnaireData::default()
        };
        let value = serde_json::to_value(&data).unwrap_or_default();
        assert_eq!(value["familyStatus"], "single");
        assert!(value.get("spouseBirthDate").is_none());
        assert!(value["preferredCountries"].is_array());
    }
}
