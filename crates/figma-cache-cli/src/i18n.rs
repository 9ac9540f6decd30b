// crates/figma-cache-cli/src/i18n.rs
// ============================================================================
// Module: CLI Internationalization Helpers
// Description: Message catalog and translation utilities for the CLI.
// Purpose: Keep every user-facing string of the cache fetcher in one place.
// Dependencies: Standard library collections and formatting utilities.
// ============================================================================

//! ## Overview
//! The `figma-cache` binary prints progress, warnings, and errors through a
//! small translation catalog. All runtime output goes through the
//! [`t!`](crate::t) macro.
//!
//! ## Invariants
//! - The catalog is initialized once and read-only thereafter.
//! - Missing keys fall back to English and then to the key itself.
//! - Placeholder substitutions preserve deterministic order.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Supported CLI locales.
///
/// # Invariants
/// - [`Locale::En`] is the default fallback locale.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Locale {
    /// English (default).
    En,
    /// Hebrew.
    He,
}

impl Locale {
    /// Returns the canonical locale label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::He => "he",
        }
    }

    /// Attempts to parse a locale value (case-insensitive, tolerant of region tags).
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.is_empty() {
            return None;
        }
        let normalized = value.to_ascii_lowercase();
        let lang = normalized.split(['-', '_', '.']).next().unwrap_or("");
        match lang {
            "en" => Some(Self::En),
            "he" | "iw" => Some(Self::He),
            _ => None,
        }
    }
}

/// Ordered list of supported CLI locales.
pub const SUPPORTED_LOCALES: &[Locale] = &[Locale::En, Locale::He];

/// A formatted message argument captured by the [`macro@crate::t`] macro.
///
/// # Invariants
/// - `key` matches a placeholder name without braces (for example, `slug`).
#[derive(Clone)]
pub struct MessageArg {
    /// The placeholder name used in message templates (e.g., `"slug"`).
    pub key: &'static str,
    /// The formatted string value to substitute for this placeholder.
    pub value: String,
}

impl MessageArg {
    /// Constructs a new [`MessageArg`] from a key and displayable value.
    pub fn new(key: &'static str, value: impl Into<String>) -> Self {
        Self {
            key,
            value: value.into(),
        }
    }
}

// ============================================================================
// SECTION: Locale Selection
// ============================================================================

/// Global locale selection for CLI output.
static CURRENT_LOCALE: OnceLock<Locale> = OnceLock::new();

/// Sets the CLI locale. Only the first call wins.
pub fn set_locale(locale: Locale) {
    let _ = CURRENT_LOCALE.set(locale);
}

/// Returns the current CLI locale (defaults to English).
#[must_use]
pub fn current_locale() -> Locale {
    CURRENT_LOCALE.get().copied().unwrap_or(Locale::En)
}

// ============================================================================
// SECTION: Catalog
// ============================================================================

/// English catalog entries.
const CATALOG_EN: &[(&str, &str)] = &[
    ("main.version", "figma-cache {version}"),
    ("output.stream.stdout", "stdout"),
    ("output.stream.stderr", "stderr"),
    ("output.stream.unknown", "output"),
    ("output.write_failed", "Failed to write to {stream}: {error}"),
    ("config.load_failed", "Failed to load config: {error}"),
    ("token.missing", "FIGMA_TOKEN environment variable is required."),
    (
        "token.hint",
        "Create a personal access token under Figma > Settings > Account and export it as \
         FIGMA_TOKEN.",
    ),
    ("client.init_failed", "Failed to initialize the Figma API client: {error}"),
    ("listing.load_failed", "Failed to read URL listing: {error}"),
    ("listing.found", "Found {count} entries in {path}"),
    ("list.header", "Available Figma URLs:"),
    ("list.section", "{section}:"),
    ("list.section.none", "(no section)"),
    ("list.entry", "  [{index}] [{platform}] {label}"),
    ("list.entry.url", "    {url}"),
    ("list.entry.slug", "    slug: {slug}"),
    ("list.platform.none", "-"),
    ("list.total", "Total: {count} URLs"),
    ("entry.not_found", "Entry not found: {identifier}"),
    ("entry.available.header", "Available entries:"),
    ("entry.available.item", "  [{index}] {slug}"),
    ("entry.done", "Done: {slug}"),
    ("entry.failed", "Failed to cache {label}: {error}"),
    ("adhoc.invalid_url", "Cannot cache {url}: {error}"),
    ("event.started", "Caching {label} ({slug})..."),
    ("event.fresh", "  Skipping {slug}: cache is fresh (version {version})"),
    ("event.stale", "  Refreshing {slug} (cached version {cached}, remote version {remote})"),
    ("event.refresh.forced", "  Refreshing {slug}: forced"),
    ("event.refresh.not_cached", "  Caching {slug}: not cached yet"),
    ("event.refresh.unversioned", "  Refreshing {slug}: cached record has no version"),
    ("event.refresh.image_missing", "  Refreshing {slug}: cached image is missing"),
    ("event.probe_failed", "  Freshness check failed for {slug}, refreshing: {error}"),
    ("event.step.fetching_metadata", "  [{slug}] Fetching metadata..."),
    ("event.step.metadata_saved", "  [{slug}] Saved meta.raw.json"),
    ("event.step.fetching_image_url", "  [{slug}] Fetching image URL..."),
    ("event.step.downloading_image", "  [{slug}] Downloading image..."),
    ("event.step.image_saved", "  [{slug}] Saved render@2x.png"),
    ("event.step.record_saved", "  [{slug}] Saved meta.json"),
    ("event.retry", "  Retrying {path} (attempt {attempt}): {reason}"),
    ("event.cached", "  Cached: {slug}"),
    ("event.failed", "  Error caching {slug}: {error}"),
    ("event.invalid_url", "Warning: line {line} ({label}) is not a Figma node URL: {url}"),
    ("event.duplicate_slug", "Warning: {count} entries share slug {slug}; the last one wins."),
    ("event.summary", "Summary: {cached} cached, {skipped} skipped (fresh), {failed} failed"),
    ("i18n.lang.invalid_env", "Invalid value for {env}: {value}. Expected 'en' or 'he'."),
    (
        "i18n.disclaimer.machine_translated",
        "Note: non-English output is machine-translated and may be inaccurate.",
    ),
];

/// Hebrew catalog entries.
const CATALOG_HE: &[(&str, &str)] = &[
    ("main.version", "figma-cache {version}"),
    ("output.stream.stdout", "פלט תקני"),
    ("output.stream.stderr", "פלט שגיאות"),
    ("output.stream.unknown", "פלט"),
    ("output.write_failed", "הכתיבה אל {stream} נכשלה: {error}"),
    ("config.load_failed", "טעינת התצורה נכשלה: {error}"),
    ("token.missing", "נדרש משתנה הסביבה FIGMA_TOKEN."),
    (
        "token.hint",
        "צרו אסימון גישה אישי תחת Figma > Settings > Account וייצאו אותו בשם FIGMA_TOKEN.",
    ),
    ("client.init_failed", "אתחול לקוח ה-API של Figma נכשל: {error}"),
    ("listing.load_failed", "קריאת רשימת הקישורים נכשלה: {error}"),
    ("listing.found", "נמצאו {count} רשומות בקובץ {path}"),
    ("list.header", "קישורי Figma זמינים:"),
    ("list.section", "{section}:"),
    ("list.section.none", "(ללא מקטע)"),
    ("list.entry", "  [{index}] [{platform}] {label}"),
    ("list.entry.url", "    {url}"),
    ("list.entry.slug", "    מזהה: {slug}"),
    ("list.platform.none", "-"),
    ("list.total", "סך הכול: {count} קישורים"),
    ("entry.not_found", "הרשומה לא נמצאה: {identifier}"),
    ("entry.available.header", "רשומות זמינות:"),
    ("entry.available.item", "  [{index}] {slug}"),
    ("entry.done", "הסתיים: {slug}"),
    ("entry.failed", "שמירת {label} במטמון נכשלה: {error}"),
    ("adhoc.invalid_url", "לא ניתן לשמור את {url} במטמון: {error}"),
    ("event.started", "שומר במטמון את {label} ({slug})..."),
    ("event.fresh", "  מדלג על {slug}: המטמון עדכני (גרסה {version})"),
    ("event.stale", "  מרענן את {slug} (גרסה שמורה {cached}, גרסה מרוחקת {remote})"),
    ("event.refresh.forced", "  מרענן את {slug}: רענון מאולץ"),
    ("event.refresh.not_cached", "  שומר את {slug}: עדיין לא במטמון"),
    ("event.refresh.unversioned", "  מרענן את {slug}: לרשומה השמורה אין גרסה"),
    ("event.refresh.image_missing", "  מרענן את {slug}: התמונה השמורה חסרה"),
    ("event.probe_failed", "  בדיקת העדכניות של {slug} נכשלה, מרענן: {error}"),
    ("event.step.fetching_metadata", "  [{slug}] מאחזר מטא-נתונים..."),
    ("event.step.metadata_saved", "  [{slug}] נשמר meta.raw.json"),
    ("event.step.fetching_image_url", "  [{slug}] מאחזר כתובת תמונה..."),
    ("event.step.downloading_image", "  [{slug}] מוריד תמונה..."),
    ("event.step.image_saved", "  [{slug}] נשמר render@2x.png"),
    ("event.step.record_saved", "  [{slug}] נשמר meta.json"),
    ("event.retry", "  מנסה שוב את {path} (ניסיון {attempt}): {reason}"),
    ("event.cached", "  נשמר במטמון: {slug}"),
    ("event.failed", "  שגיאה בשמירת {slug} במטמון: {error}"),
    ("event.invalid_url", "אזהרה: שורה {line} ({label}) אינה קישור לצומת Figma: {url}"),
    ("event.duplicate_slug", "אזהרה: {count} רשומות חולקות את המזהה {slug}; האחרונה קובעת."),
    ("event.summary", "סיכום: {cached} נשמרו, {skipped} דולגו (עדכניים), {failed} נכשלו"),
    (
        "i18n.lang.invalid_env",
        "ערך לא חוקי עבור {env}: {value}. הערכים האפשריים הם 'en' או 'he'.",
    ),
    (
        "i18n.disclaimer.machine_translated",
        "הערה: פלט שאינו באנגלית תורגם אוטומטית ועשוי להיות לא מדויק.",
    ),
];

/// Returns the raw catalog entries for the requested locale.
#[must_use]
pub(crate) const fn catalog_entries_for(locale: Locale) -> &'static [(&'static str, &'static str)] {
    match locale {
        Locale::En => CATALOG_EN,
        Locale::He => CATALOG_HE,
    }
}

/// Returns the message catalog for the requested locale.
pub(crate) fn catalog_for(locale: Locale) -> &'static HashMap<&'static str, &'static str> {
    static CATALOG_EN_MAP: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
    static CATALOG_HE_MAP: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
    let map = match locale {
        Locale::En => &CATALOG_EN_MAP,
        Locale::He => &CATALOG_HE_MAP,
    };
    map.get_or_init(|| catalog_entries_for(locale).iter().copied().collect())
}

// ============================================================================
// SECTION: Translation
// ============================================================================

/// Translates `key` using the selected locale while substituting `args`.
#[must_use]
pub fn translate(key: &str, args: Vec<MessageArg>) -> String {
    translate_for(current_locale(), key, args)
}

/// Translates `key` for an explicit locale.
#[must_use]
pub fn translate_for(locale: Locale, key: &str, args: Vec<MessageArg>) -> String {
    let template = catalog_for(locale)
        .get(key)
        .copied()
        .or_else(|| catalog_for(Locale::En).get(key).copied())
        .unwrap_or(key);
    if args.is_empty() {
        return template.to_string();
    }

    let mut result = template.to_string();
    for arg in args {
        let placeholder = format!("{{{}}}", arg.key);
        result = result.replace(&placeholder, &arg.value);
    }
    result
}

// ============================================================================
// SECTION: Macro
// ============================================================================

/// Formats a localized message from a key and named arguments.
///
/// # Arguments
///
/// - `$key` must match a catalog entry.
/// - Named arguments are substituted into `{placeholder}` positions.
#[macro_export]
macro_rules! t {
    ($key:literal $(, $name:ident = $value:expr )* $(,)?) => {{
        let args = ::std::vec![
            $(
                $crate::i18n::MessageArg::new(stringify!($name), $value.to_string()),
            )*
        ];
        $crate::i18n::translate($key, args)
    }};
}
