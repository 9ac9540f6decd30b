// crates/figma-cache/src/listing.rs
// ============================================================================
// Module: URL Listing Parser
// Description: Parses the line-oriented design URL listing into cache entries.
// Purpose: Turn a human-maintained markdown list into resolvable entries.
// Dependencies: crate::{events, figma_url}, regex, thiserror
// ============================================================================

//! ## Overview
//! The listing is a markdown file. Recognized lines:
//! - `label: url`, `- label: url`, `* label: url`
//! - a bare `url` (labeled `entry-N`, N counting resolved entries so far)
//! - `## Section` and `### Platform` headings, which tag the entries below them
//!
//! Everything else is ignored, as are entry lines marked `(NOT IMPLEMENTED)`.
//! Entries whose URL is not a design node link are kept as
//! [`ListingItem::Invalid`] so a batch run can count them as failures.
//! Duplicate labels are not suppressed; entries sharing a slug write the same
//! cache directory.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::events::CacheEvent;
use crate::events::CacheEvents;
use crate::figma_url::UrlParseError;
use crate::figma_url::check_slug;
use crate::figma_url::create_slug;
use crate::figma_url::parse_figma_url;

// ============================================================================
// SECTION: Patterns
// ============================================================================

/// Matches `label: url` with an optional `-` or `*` bullet.
#[allow(clippy::expect_used, reason = "The pattern is a compile-time literal.")]
static LABELED_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[-*]?\s*([^:]+):\s*(https://\S+)").expect("labeled line pattern compiles")
});

/// Matches a bare url with an optional `-` or `*` bullet.
#[allow(clippy::expect_used, reason = "The pattern is a compile-time literal.")]
static BARE_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-*]?\s*(https://\S+)").expect("bare line pattern compiles"));

/// Marker excluding an entry line from the listing.
const NOT_IMPLEMENTED_MARKER: &str = "(NOT IMPLEMENTED)";

/// Prefix of section headings.
const SECTION_PREFIX: &str = "## ";

/// Prefix of platform headings.
const PLATFORM_PREFIX: &str = "### ";

// ============================================================================
// SECTION: Types
// ============================================================================

/// One resolvable listing entry.
///
/// # Invariants
/// - `slug == create_slug(label, file_key, node_id)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlEntry {
    /// Display label.
    pub label: String,
    /// Source design link.
    pub url: String,
    /// Design file key parsed from `url`.
    pub file_key: String,
    /// API-form node id parsed from `url`.
    pub node_id: String,
    /// Cache key.
    pub slug: String,
    /// Enclosing `##` section heading, if any.
    pub section: Option<String>,
    /// Enclosing `###` platform heading, if any.
    pub platform: Option<String>,
}

impl UrlEntry {
    /// Resolves a labeled URL into an entry.
    ///
    /// # Errors
    ///
    /// Returns [`UrlParseError`] when `url` is not a design node link or the
    /// derived slug would leave the cache root.
    pub fn resolve(
        label: impl Into<String>,
        url: impl Into<String>,
        section: Option<String>,
        platform: Option<String>,
    ) -> Result<Self, UrlParseError> {
        let label = label.into();
        let url = url.into();
        let parsed = parse_figma_url(&url)?;
        let slug = create_slug(&label, &parsed.file_key, &parsed.node_id);
        check_slug(&slug)?;
        Ok(Self {
            label,
            url,
            file_key: parsed.file_key,
            node_id: parsed.node_id,
            slug,
            section,
            platform,
        })
    }
}

/// A listing line whose URL could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidEntry {
    /// 1-based line number in the listing.
    pub line: usize,
    /// Label as written (or generated).
    pub label: String,
    /// Rejected URL.
    pub url: String,
}

/// One recognized entry line, in listing order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingItem {
    /// Resolved entry.
    Valid(UrlEntry),
    /// Entry line whose URL could not be resolved.
    Invalid(InvalidEntry),
}

/// Parsed listing preserving line order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlListing {
    /// Recognized entry lines in order.
    pub items: Vec<ListingItem>,
}

impl UrlListing {
    /// Returns the resolved entries in order.
    pub fn entries(&self) -> impl Iterator<Item = &UrlEntry> {
        self.items.iter().filter_map(|item| match item {
            ListingItem::Valid(entry) => Some(entry),
            ListingItem::Invalid(_) => None,
        })
    }

    /// Returns the unresolvable entry lines in order.
    pub fn invalid(&self) -> impl Iterator<Item = &InvalidEntry> {
        self.items.iter().filter_map(|item| match item {
            ListingItem::Valid(_) => None,
            ListingItem::Invalid(invalid) => Some(invalid),
        })
    }

    /// Number of resolved entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries().count()
    }

    /// Returns true when no entry resolved.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries().next().is_none()
    }

    /// Finds an entry by exact slug, or else by 0-based index among resolved
    /// entries.
    #[must_use]
    pub fn find(&self, identifier: &str) -> Option<&UrlEntry> {
        self.entries().find(|entry| entry.slug == identifier).or_else(|| {
            if identifier.is_empty() || !identifier.bytes().all(|byte| byte.is_ascii_digit()) {
                return None;
            }
            identifier.parse::<usize>().ok().and_then(|index| self.entries().nth(index))
        })
    }

    /// Returns slugs claimed by more than one entry, with their counts.
    #[must_use]
    pub fn duplicate_slugs(&self) -> BTreeMap<&str, usize> {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for entry in self.entries() {
            *counts.entry(entry.slug.as_str()).or_default() += 1;
        }
        counts.retain(|_, count| *count > 1);
        counts
    }

    /// Emits warnings for invalid lines and duplicate slugs.
    pub fn report(&self, events: &dyn CacheEvents) {
        for invalid in self.invalid() {
            events.emit(&CacheEvent::InvalidUrl {
                line: invalid.line,
                label: invalid.label.clone(),
                url: invalid.url.clone(),
            });
        }
        for (slug, count) in self.duplicate_slugs() {
            events.emit(&CacheEvent::DuplicateSlug {
                slug: slug.to_string(),
                count,
            });
        }
    }
}

/// Errors raised while loading a listing file.
#[derive(Debug, Error)]
pub enum ListingError {
    /// The listing file could not be read.
    #[error("failed to read url listing {path}: {source}")]
    Read {
        /// Listing path.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

// ============================================================================
// SECTION: Parsing
// ============================================================================

/// Reads and parses a listing file.
///
/// # Errors
///
/// Returns [`ListingError::Read`] when the file cannot be read.
pub fn load_urls_file(path: &Path) -> Result<UrlListing, ListingError> {
    let content = fs::read_to_string(path).map_err(|source| ListingError::Read {
        path: path.display().to_string(),
        source,
    })?;
    Ok(parse_urls_file(&content))
}

/// Parses listing text into entries.
#[must_use]
pub fn parse_urls_file(content: &str) -> UrlListing {
    let mut items = Vec::new();
    let mut resolved = 0usize;
    let mut section: Option<String> = None;
    let mut platform: Option<String> = None;

    for (index, raw_line) in content.split('\n').enumerate() {
        let line = raw_line.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }
        if let Some(heading) = line.strip_prefix(PLATFORM_PREFIX) {
            platform = non_empty(heading);
            continue;
        }
        if let Some(heading) = line.strip_prefix(SECTION_PREFIX) {
            section = non_empty(heading);
            platform = None;
            continue;
        }
        let Some((label, url)) = match_entry_line(line, resolved) else {
            continue;
        };
        if line.contains(NOT_IMPLEMENTED_MARKER) {
            continue;
        }
        match UrlEntry::resolve(label.clone(), url.clone(), section.clone(), platform.clone()) {
            Ok(entry) => {
                resolved += 1;
                items.push(ListingItem::Valid(entry));
            }
            Err(_) => items.push(ListingItem::Invalid(InvalidEntry {
                line: index + 1,
                label,
                url,
            })),
        }
    }

    UrlListing {
        items,
    }
}

/// Matches one entry line, returning `(label, url)`.
fn match_entry_line(line: &str, resolved: usize) -> Option<(String, String)> {
    if let Some(captures) = LABELED_LINE.captures(line)
        && let (Some(label), Some(url)) = (captures.get(1), captures.get(2))
    {
        return Some((label.as_str().trim().to_string(), url.as_str().trim().to_string()));
    }
    let captures = BARE_LINE.captures(line)?;
    let url = captures.get(1)?;
    Some((format!("entry-{}", resolved + 1), url.as_str().trim().to_string()))
}

/// Trims a heading and drops it when empty.
fn non_empty(heading: &str) -> Option<String> {
    let trimmed = heading.trim();
    if trimmed.is_empty() { None } else { Some(trimmed.to_string()) }
}
