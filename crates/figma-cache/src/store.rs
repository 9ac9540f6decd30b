// crates/figma-cache/src/store.rs
// ============================================================================
// Module: Cache Store
// Description: On-disk layout for cached node metadata and renders.
// Purpose: Persist one directory per slug with raw and curated metadata.
// Dependencies: crate::listing, serde, serde_json, thiserror, time
// ============================================================================

//! ## Overview
//! Layout under the cache root:
//!
//! ```text
//! <root>/<slug>/meta.raw.json   verbatim node metadata response
//! <root>/<slug>/meta.json       curated CacheRecord
//! <root>/<slug>/render@2x.png   rendered image
//! ```
//!
//! Files are written to a sibling temporary path and renamed into place so a
//! crash never leaves a half-written file under its final name. The store
//! never deletes entries.
//!
//! `meta.json` carries the version the freshness check compares against, so
//! callers write it only once the image for that version is on disk.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::listing::UrlEntry;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Curated metadata file name.
pub const META_FILE: &str = "meta.json";

/// Raw metadata file name.
pub const RAW_META_FILE: &str = "meta.raw.json";

/// Rendered image file name.
pub const IMAGE_FILE: &str = "render@2x.png";

/// Fallback for absent node names and types.
pub const UNKNOWN: &str = "Unknown";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised by the cache store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// A filesystem operation failed.
    #[error("cache io failed for {path}: {message}")]
    Io {
        /// Affected path.
        path: String,
        /// Failure description.
        message: String,
    },
    /// A metadata file could not be encoded or decoded.
    #[error("cache json invalid for {path}: {message}")]
    Json {
        /// Affected path.
        path: String,
        /// Failure description.
        message: String,
    },
}

impl StoreError {
    /// Builds an I/O error for `path`.
    fn io(path: &Path, err: &std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            message: err.to_string(),
        }
    }

    /// Builds a JSON error for `path`.
    fn json(path: &Path, err: &serde_json::Error) -> Self {
        Self::Json {
            path: path.display().to_string(),
            message: err.to_string(),
        }
    }
}

// ============================================================================
// SECTION: Cache Record
// ============================================================================

/// Curated metadata written to `meta.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheRecord {
    /// Source design link.
    pub url: String,
    /// Design file key.
    pub file_key: String,
    /// API-form node id.
    pub node_id: String,
    /// Entry label.
    pub label: String,
    /// Cache key.
    pub slug: String,
    /// Listing section heading.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    /// Listing platform heading.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    /// Node name, `Unknown` when absent.
    #[serde(default = "unknown")]
    pub node_name: String,
    /// Node type, `Unknown` when absent.
    #[serde(default = "unknown")]
    pub node_type: String,
    /// File modification timestamp reported with the metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,
    /// File version reported with the metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// RFC 3339 UTC time the entry was written.
    pub retrieved_at: String,
}

impl CacheRecord {
    /// Builds the curated record from a node metadata response.
    ///
    /// Returns `None` when the response carries no data for the entry's node.
    #[must_use]
    pub fn from_metadata(entry: &UrlEntry, raw: &Value, retrieved_at: String) -> Option<Self> {
        let node = raw.get("nodes")?.get(&entry.node_id).filter(|node| !node.is_null())?;
        let document = node.get("document");
        let document_field = |field: &str| {
            document
                .and_then(|document| document.get(field))
                .and_then(Value::as_str)
                .filter(|value| !value.is_empty())
                .unwrap_or(UNKNOWN)
                .to_string()
        };
        let top_level = |field: &str| raw.get(field).and_then(Value::as_str).map(str::to_string);
        Some(Self {
            url: entry.url.clone(),
            file_key: entry.file_key.clone(),
            node_id: entry.node_id.clone(),
            label: entry.label.clone(),
            slug: entry.slug.clone(),
            section: entry.section.clone(),
            platform: entry.platform.clone(),
            node_name: document_field("name"),
            node_type: document_field("type"),
            last_modified: top_level("lastModified"),
            version: top_level("version"),
            retrieved_at,
        })
    }
}

/// Serde default for node name and type.
fn unknown() -> String {
    UNKNOWN.to_string()
}

/// Formats the current UTC time as RFC 3339.
#[must_use]
pub fn now_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string())
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// Filesystem cache rooted at one directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStore {
    /// Cache root directory.
    root: PathBuf,
}

impl CacheStore {
    /// Creates a store rooted at `root`; nothing is created until a write.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
        }
    }

    /// Returns the cache root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the directory for `slug`.
    #[must_use]
    pub fn entry_dir(&self, slug: &str) -> PathBuf {
        self.root.join(slug)
    }

    /// Returns the curated metadata path for `slug`.
    #[must_use]
    pub fn meta_path(&self, slug: &str) -> PathBuf {
        self.entry_dir(slug).join(META_FILE)
    }

    /// Returns the raw metadata path for `slug`.
    #[must_use]
    pub fn raw_meta_path(&self, slug: &str) -> PathBuf {
        self.entry_dir(slug).join(RAW_META_FILE)
    }

    /// Returns the image path for `slug`.
    #[must_use]
    pub fn image_path(&self, slug: &str) -> PathBuf {
        self.entry_dir(slug).join(IMAGE_FILE)
    }

    /// Returns true when a rendered image exists for `slug`.
    #[must_use]
    pub fn has_image(&self, slug: &str) -> bool {
        self.image_path(slug).is_file()
    }

    /// Loads the curated record for `slug`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the record exists but cannot be read or
    /// decoded. A missing record is `Ok(None)`.
    pub fn read_record(&self, slug: &str) -> Result<Option<CacheRecord>, StoreError> {
        let path = self.meta_path(slug);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(StoreError::io(&path, &err)),
        };
        serde_json::from_slice(&bytes).map(Some).map_err(|err| StoreError::json(&path, &err))
    }

    /// Writes the verbatim node metadata response for `slug`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when encoding or writing fails.
    pub fn write_raw_metadata(&self, slug: &str, raw: &Value) -> Result<(), StoreError> {
        self.ensure_entry_dir(slug)?;
        let path = self.raw_meta_path(slug);
        let bytes = serde_json::to_vec_pretty(raw).map_err(|err| StoreError::json(&path, &err))?;
        write_replace(&path, &bytes)
    }

    /// Writes the curated record, which marks the entry as cached at
    /// `record.version`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when encoding or writing fails.
    pub fn write_record(&self, record: &CacheRecord) -> Result<(), StoreError> {
        self.ensure_entry_dir(&record.slug)?;
        let path = self.meta_path(&record.slug);
        let bytes =
            serde_json::to_vec_pretty(record).map_err(|err| StoreError::json(&path, &err))?;
        write_replace(&path, &bytes)
    }

    /// Writes the rendered image for `slug`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when writing fails.
    pub fn write_image(&self, slug: &str, bytes: &[u8]) -> Result<(), StoreError> {
        self.ensure_entry_dir(slug)?;
        write_replace(&self.image_path(slug), bytes)
    }

    /// Creates the directory for `slug` when missing.
    fn ensure_entry_dir(&self, slug: &str) -> Result<(), StoreError> {
        let dir = self.entry_dir(slug);
        fs::create_dir_all(&dir).map_err(|err| StoreError::io(&dir, &err))
    }
}

/// Writes `bytes` to a temporary sibling and renames it over `path`.
fn write_replace(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    let mut temp_name = path.file_name().map(|name| name.to_os_string()).unwrap_or_default();
    temp_name.push(".partial");
    let temp_path = path.with_file_name(temp_name);
    fs::write(&temp_path, bytes).map_err(|err| StoreError::io(&temp_path, &err))?;
    fs::rename(&temp_path, path).map_err(|err| StoreError::io(path, &err))
}

// ============================================================================
// SECTION: Tests
// ============================================================================
