// crates/figma-cache/src/figma_url.rs
// ============================================================================
// Module: Figma URL Decomposition
// Description: Extracts file keys and node ids from design links; builds slugs.
// Purpose: Derive stable cache keys from human-authored design URLs.
// Dependencies: regex, thiserror
// ============================================================================

//! ## Overview
//! Design links look like
//! `https://www.figma.com/design/<fileKey>/<name>?node-id=<nodeId>&...`.
//! [`parse_figma_url`] pulls out the file key and converts the node id from
//! its link form (`123-456`) to the API form (`123:456`). [`create_slug`]
//! combines a label with both identifiers into a filesystem-safe cache key.
//!
//! ## Invariants
//! - Only the FIRST hyphen of a link node id becomes a colon (`1-2-3` is
//!   `1:2-3`), and only the first colon is turned back into a hyphen for slugs.
//! - [`create_slug`] is a pure function of its inputs.
//! - A slug accepted by [`check_slug`] names exactly one directory below the
//!   cache root.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

// ============================================================================
// SECTION: Patterns
// ============================================================================

/// Matches `figma.com/(design|file)/<fileKey>/<name>?...node-id=<nodeId>`.
#[allow(clippy::expect_used, reason = "The pattern is a compile-time literal.")]
static FIGMA_URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"figma\.com/(?:design|file)/([^/]+)/[^?]*\?.*node-id=([^&]+)")
        .expect("figma url pattern compiles")
});

// ============================================================================
// SECTION: Types
// ============================================================================

/// Identifiers addressing one node inside one design file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FigmaRef {
    /// Design file key.
    pub file_key: String,
    /// Node id in API form (`123:456`).
    pub node_id: String,
}

/// Errors produced while decomposing design URLs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UrlParseError {
    /// The URL does not address a node inside a design file.
    #[error("not a figma node url: {url}")]
    NotFigmaNode {
        /// Rejected URL.
        url: String,
    },
    /// The derived slug could escape the cache root.
    #[error("unsafe cache slug: {slug}")]
    UnsafeSlug {
        /// Rejected slug.
        slug: String,
    },
}

// ============================================================================
// SECTION: Parsing
// ============================================================================

/// Extracts the file key and API-form node id from a design URL.
///
/// # Errors
///
/// Returns [`UrlParseError::NotFigmaNode`] when the URL does not match the
/// design link shape.
pub fn parse_figma_url(url: &str) -> Result<FigmaRef, UrlParseError> {
    let captures = FIGMA_URL_PATTERN.captures(url).ok_or_else(|| UrlParseError::NotFigmaNode {
        url: url.to_string(),
    })?;
    let (Some(file_key), Some(node_param)) = (captures.get(1), captures.get(2)) else {
        return Err(UrlParseError::NotFigmaNode {
            url: url.to_string(),
        });
    };
    Ok(FigmaRef {
        file_key: file_key.as_str().to_string(),
        node_id: node_id_from_link(node_param.as_str()),
    })
}

/// Converts a link-form node id to API form by replacing the first hyphen.
#[must_use]
pub fn node_id_from_link(raw: &str) -> String {
    raw.replacen('-', ":", 1)
}

// ============================================================================
// SECTION: Slugs
// ============================================================================

/// Lowercases `label` and collapses every run of non `[a-z0-9]` to one hyphen.
#[must_use]
pub fn sanitize_label(label: &str) -> String {
    let lowered = label.to_lowercase();
    let mut sanitized = String::with_capacity(lowered.len());
    let mut in_separator = false;
    for ch in lowered.chars() {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            sanitized.push(ch);
            in_separator = false;
        } else if !in_separator {
            sanitized.push('-');
            in_separator = true;
        }
    }
    sanitized.trim_matches('-').to_string()
}

/// Builds the cache slug `{label}_{fileKey}_{nodeId}`.
///
/// The node id's first colon is rendered as a hyphen.
#[must_use]
pub fn create_slug(label: &str, file_key: &str, node_id: &str) -> String {
    let sanitized_node_id = node_id.replacen(':', "-", 1);
    format!("{}_{file_key}_{sanitized_node_id}", sanitize_label(label))
}

/// Rejects slugs containing path separators or parent references.
///
/// # Errors
///
/// Returns [`UrlParseError::UnsafeSlug`] when `slug` contains a slash, a
/// backslash, or `..`.
pub fn check_slug(slug: &str) -> Result<(), UrlParseError> {
    if slug.contains(['/', '\\']) || slug.contains("..") {
        return Err(UrlParseError::UnsafeSlug {
            slug: slug.to_string(),
        });
    }
    Ok(())
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::UrlParseError;
    use super::check_slug;
    use super::create_slug;
    use super::node_id_from_link;
    use super::parse_figma_url;
    use super::sanitize_label;

    #[test]
    fn node_ids_replace_only_the_first_hyphen() {
        assert_eq!(node_id_from_link("123-456"), "123:456");
        assert_eq!(node_id_from_link("1-2-3"), "1:2-3");
        assert_eq!(node_id_from_link("42"), "42");
    }

    #[test]
    fn parses_design_and_file_links() {
        let parsed =
            parse_figma_url("https://www.figma.com/design/ABC123/Site?node-id=10-20&t=xyz").ok();
        assert_eq!(parsed.as_ref().map(|r| r.file_key.as_str()), Some("ABC123"));
        assert_eq!(parsed.as_ref().map(|r| r.node_id.as_str()), Some("10:20"));

        let legacy =
            parse_figma_url("https://figma.com/file/KEY9/Old-Name?type=design&node-id=7-8");
        assert_eq!(legacy.map(|r| r.node_id), Ok("7:8".to_string()));
    }

    #[test]
    fn rejects_links_without_node_or_name() {
        assert!(parse_figma_url("https://www.figma.com/design/ABC123/Site").is_err());
        assert!(parse_figma_url("https://www.figma.com/design/ABC123?node-id=1-2").is_err());
        assert!(parse_figma_url("https://example.com/design/ABC/Site?node-id=1-2").is_err());
    }

    #[test]
    fn labels_collapse_separators_and_trim() {
        assert_eq!(sanitize_label("  Homepage -- Hero!! "), "homepage-hero");
        assert_eq!(sanitize_label("mobile HP1"), "mobile-hp1");
        assert_eq!(sanitize_label("---"), "");
    }

    #[test]
    fn slug_uses_first_colon_only() {
        assert_eq!(create_slug("Homepage Hero", "ABC123", "10:20"), "homepage-hero_ABC123_10-20");
        assert_eq!(create_slug("x", "K", "1:2-3"), "x_K_1-2-3");
        assert_eq!(create_slug("x", "K", "1:2:3"), "x_K_1-2:3");
    }

    #[test]
    fn slugs_with_path_components_are_rejected() {
        assert_eq!(check_slug("x_K_1-2"), Ok(()));
        for slug in ["x_K_1-2/../../etc", "x_K_1-2\\evil", "x_.._1-2"] {
            assert_eq!(
                check_slug(slug),
                Err(UrlParseError::UnsafeSlug {
                    slug: slug.to_string(),
                })
            );
        }
    }
}
