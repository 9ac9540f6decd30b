// crates/figma-cache-cli/src/lib.rs
// ============================================================================
// Module: Figma Cache CLI Library
// Description: Shared helpers for the figma-cache command-line binary.
// Purpose: Expose the message catalog to the binary and its tests.
// Dependencies: Standard library.
// ============================================================================

//! ## Overview
//! The binary lives in `main.rs`; this library holds the localized message
//! catalog so it can be unit tested on its own.

pub mod i18n;

#[cfg(test)]
mod tests;
