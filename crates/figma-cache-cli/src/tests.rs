// crates/figma-cache-cli/src/tests.rs
// ============================================================================
// Module: CLI Library Tests
// Description: Test module root for the CLI library.
// Purpose: Group unit tests by library module.
// Dependencies: figma-cache-cli
// ============================================================================

//! ## Overview
//! Unit tests for the message catalog.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    reason = "Test-only assertions use unwrap/expect for clarity."
)]

mod i18n;
