// crates/figma-cache-cli/src/tests/i18n.rs
// ============================================================================
// Module: CLI i18n Tests
// Description: Unit tests for catalog parity and locale parsing.
// Purpose: Keep the English and Hebrew catalogs consistent.
// Dependencies: figma-cache-cli i18n module
// ============================================================================

//! ## Overview
//! Verifies the message catalogs stay in sync, locale parsing is tolerant,
//! and localized templates keep the same placeholders as English.

use std::collections::BTreeSet;

use crate::i18n::Locale;
use crate::i18n::MessageArg;
use crate::i18n::SUPPORTED_LOCALES;
use crate::i18n::catalog_entries_for;
use crate::i18n::catalog_for;
use crate::i18n::translate_for;

/// Extracts `{name}` placeholders, rejecting malformed braces.
fn parse_placeholder_names(template: &str) -> Result<BTreeSet<String>, String> {
    let mut placeholders = BTreeSet::new();
    let mut rest = template;
    while let Some(open) = rest.find(['{', '}']) {
        if rest[open ..].starts_with('}') {
            return Err(format!("unmatched '}}' in {template:?}"));
        }
        let after = &rest[open + 1 ..];
        let close = after.find('}').ok_or_else(|| format!("unclosed '{{' in {template:?}"))?;
        let name = &after[.. close];
        if name.is_empty() || name.contains('{') {
            return Err(format!("malformed placeholder in {template:?}"));
        }
        if !name.chars().all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '_') {
            return Err(format!("placeholder '{name}' must use [a-z0-9_]"));
        }
        placeholders.insert(name.to_string());
        rest = &after[close + 1 ..];
    }
    Ok(placeholders)
}

#[test]
fn catalogs_have_matching_keys() {
    let en_keys: BTreeSet<&'static str> = catalog_for(Locale::En).keys().copied().collect();
    for locale in SUPPORTED_LOCALES {
        let locale_keys: BTreeSet<&'static str> = catalog_for(*locale).keys().copied().collect();
        assert_eq!(en_keys, locale_keys, "locale catalogs must stay in parity ({locale:?})");
    }
}

#[test]
fn catalogs_have_unique_keys_per_locale() {
    for locale in SUPPORTED_LOCALES {
        let entries = catalog_entries_for(*locale);
        let unique: BTreeSet<&str> = entries.iter().map(|(key, _)| *key).collect();
        assert_eq!(unique.len(), entries.len(), "duplicate catalog keys ({locale:?})");
    }
}

#[test]
fn catalogs_have_placeholder_parity_with_english() {
    for (key, en_template) in catalog_entries_for(Locale::En) {
        let expected = parse_placeholder_names(en_template)
            .unwrap_or_else(|error| panic!("invalid template for '{key}' in En: {error}"));
        for locale in SUPPORTED_LOCALES {
            let template = catalog_for(*locale)
                .get(key)
                .copied()
                .unwrap_or_else(|| panic!("missing key '{key}' in locale {locale:?}"));
            let actual = parse_placeholder_names(template).unwrap_or_else(|error| {
                panic!("invalid template for '{key}' in locale {locale:?}: {error}")
            });
            assert_eq!(expected, actual, "placeholder mismatch for '{key}' ({locale:?})");
        }
    }
}

#[test]
fn hebrew_differs_for_curated_keys() {
    for key in ["token.missing", "event.summary", "i18n.disclaimer.machine_translated"] {
        let en = catalog_for(Locale::En).get(key).copied().expect("en key exists");
        let he = catalog_for(Locale::He).get(key).copied().expect("he key exists");
        assert_ne!(en, he, "Hebrew must differ from English for '{key}'");
    }
}

#[test]
fn locale_parse_accepts_region_tags_and_case() {
    assert_eq!(Locale::parse("en"), Some(Locale::En));
    assert_eq!(Locale::parse("EN-us"), Some(Locale::En));
    assert_eq!(Locale::parse("he"), Some(Locale::He));
    assert_eq!(Locale::parse("he_IL.UTF-8"), Some(Locale::He));
    assert_eq!(Locale::parse("iw"), Some(Locale::He));
    assert_eq!(Locale::parse("  "), None);
    assert_eq!(Locale::parse("de"), None);
}

#[test]
fn translate_substitutes_placeholders_and_falls_back_to_key() {
    let output = translate_for(
        Locale::En,
        "event.summary",
        vec![
            MessageArg::new("cached", "2"),
            MessageArg::new("skipped", "0"),
            MessageArg::new("failed", "1"),
        ],
    );
    assert_eq!(output, "Summary: 2 cached, 0 skipped (fresh), 1 failed");
    let hebrew = translate_for(Locale::He, "entry.done", vec![MessageArg::new("slug", "a_K_1-2")]);
    assert!(hebrew.contains("a_K_1-2"));
    assert_eq!(translate_for(Locale::He, "no.such.key", Vec::new()), "no.such.key");
}
