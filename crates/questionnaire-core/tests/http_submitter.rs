// crates/questionnaire-core/tests/http_submitter.rs
// ============================================================================
// Module: HTTP Submitter Tests
// Description: Exercises JSON submission against a local HTTP endpoint.
// Purpose: Ensure successful posts complete and non-2xx answers fail once.
// Dependencies: questionnaire-core, tiny_http, tokio
// ============================================================================

//! ## Overview
//! Runs a one-shot `tiny_http` server, submits answers through
//! [`HttpSubmitter`], and checks the request body and the store outcome.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::io::Read;
use std::thread;

use questionnaire_core::HttpSubmitter;
use questionnaire_core::QuestionnaireStore;
use questionnaire_core::QuestionnaireUpdate;
use questionnaire_core::SubmitError;
use serde_json::Value;
use tiny_http::Response;
use tiny_http::Server;

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Serves one request with `status` and returns the received JSON body.
fn one_shot_server(status: u16) -> (String, thread::JoinHandle<Value>) {
    let server = Server::http("127.0.0.1:0").unwrap();
    let addr = server.server_addr().to_ip().unwrap();
    let handle = thread::spawn(move || {
        let mut request = server.recv().unwrap();
        let mut body = String::new();
        request.as_reader().read_to_string(&mut body).unwrap();
        let _ = request.respond(Response::empty(status));
        serde_json::from_str(&body).unwrap()
    });
    (format!("http://{addr}/api/questionnaire"), handle)
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[tokio::test]
async fn http_submitter_posts_answers_as_json() {
    let (endpoint, handle) = one_shot_server(201);
    let submitter = HttpSubmitter::new(&endpoint).unwrap();
    let mut store = QuestionnaireStore::new();
    store.update_data(QuestionnaireUpdate::countries(["PT", "ES"]));
    store.update_data(QuestionnaireUpdate::family_status("single"));

    let outcome = store.submit(&submitter).await;
    let body = handle.join().unwrap();

    assert!(outcome.success);
    assert_eq!(body["familyStatus"], "single");
    assert_eq!(body["preferredCountries"], serde_json::json!(["ES", "PT"]));
    assert!(store.state().is_complete);
}

#[tokio::test]
async fn http_submitter_reports_rejections() {
    let (endpoint, handle) = one_shot_server(503);
    let submitter = HttpSubmitter::new(&endpoint).unwrap();
    let mut store = QuestionnaireStore::new();

    let outcome = store.submit(&submitter).await;
    let _ = handle.join().unwrap();

    assert!(!outcome.success);
    assert_eq!(outcome.error.as_deref(), Some("submission rejected with status 503"));
    assert!(!store.state().is_complete);
}

#[test]
fn http_submitter_rejects_non_http_endpoints() {
    let err = HttpSubmitter::new("ftp://example.com/intake").unwrap_err();
    assert!(matches!(err, SubmitError::Transport(_)));
    assert!(HttpSubmitter::new("not a url").is_err());
}
