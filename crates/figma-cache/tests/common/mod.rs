// crates/figma-cache/tests/common/mod.rs
// ============================================================================
// Module: Figma Cache Test Support
// Description: In-process mock of the design API and CDN for integration tests.
// Purpose: Serve versions, node metadata, image URLs, and PNG bytes locally.
// Dependencies: figma-cache, reqwest, serde_json, tempfile, tiny_http
// ============================================================================

//! ## Overview
//! [`MockFigma`] binds an ephemeral local port and answers the three API
//! endpoints plus a CDN that optionally redirects before serving bytes. Tests
//! mutate the shared state (current version, injected failures) between runs
//! and inspect the request log.

#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Shared helpers are used by a subset of test binaries."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;
use std::sync::Mutex;
use std::thread;
use std::thread::JoinHandle;

use figma_cache::ApiConfig;
use figma_cache::FigmaClient;
use reqwest::Url;
use serde_json::Map;
use serde_json::Value;
use serde_json::json;
use tiny_http::Header;
use tiny_http::Request;
use tiny_http::Response;
use tiny_http::Server;
use tiny_http::StatusCode;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Token the mock accepts.
pub const TEST_TOKEN: &str = "test-token";

/// Bytes served as the rendered image.
pub const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\nmock-render";

// ============================================================================
// SECTION: Mock State
// ============================================================================

/// Mutable behavior of the mock API.
#[derive(Debug)]
pub struct MockState {
    /// Version reported by file and node responses; `None` omits it.
    pub version: Option<String>,
    /// Known nodes by id, with `(name, type)`.
    pub nodes: BTreeMap<String, (String, String)>,
    /// Render error reported by the images endpoint.
    pub image_err: Option<String>,
    /// Node ids for which the images endpoint returns null.
    pub unrenderable: BTreeSet<String>,
    /// Serve images through a 302 redirect.
    pub redirect_images: bool,
    /// Injected failures: path prefix to remaining status codes.
    pub failures: Vec<(String, u16)>,
    /// Request log as `path?query`.
    pub requests: Vec<String>,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            version: Some("100".to_string()),
            nodes: BTreeMap::new(),
            image_err: None,
            unrenderable: BTreeSet::new(),
            redirect_images: true,
            failures: Vec::new(),
            requests: Vec::new(),
        }
    }
}

// ============================================================================
// SECTION: Mock Server
// ============================================================================

/// Local mock of the design API.
pub struct MockFigma {
    /// Base URL for API and CDN requests.
    pub base_url: String,
    /// Shared mutable state.
    pub state: Arc<Mutex<MockState>>,
    /// Running server.
    server: Arc<Server>,
    /// Request loop thread.
    handle: Option<JoinHandle<()>>,
}

impl MockFigma {
    /// Starts a mock that knows the given `(node_id, name, type)` nodes.
    pub fn start(nodes: &[(&str, &str, &str)]) -> Self {
        let server = Arc::new(Server::http("127.0.0.1:0").expect("bind mock server"));
        let port = server.server_addr().to_ip().expect("ip listener").port();
        let base_url = format!("http://127.0.0.1:{port}");
        let mut initial = MockState::default();
        for (id, name, kind) in nodes {
            initial.nodes.insert((*id).to_string(), ((*name).to_string(), (*kind).to_string()));
        }
        let state = Arc::new(Mutex::new(initial));
        let loop_server = Arc::clone(&server);
        let loop_state = Arc::clone(&state);
        let loop_base = base_url.clone();
        let handle = thread::spawn(move || {
            for request in loop_server.incoming_requests() {
                handle_request(request, &loop_state, &loop_base);
            }
        });
        Self {
            base_url,
            state,
            server,
            handle: Some(handle),
        }
    }

    /// Builds a client pointed at the mock with fast retries.
    pub fn client(&self) -> FigmaClient {
        FigmaClient::new(self.api_config()).expect("build client")
    }

    /// Returns an API configuration pointed at the mock.
    pub fn api_config(&self) -> ApiConfig {
        let mut config = ApiConfig::new(TEST_TOKEN);
        config.base_url.clone_from(&self.base_url);
        config.timeout_ms = 5_000;
        config.retry_backoff_ms = 10;
        config
    }

    /// Sets the version reported by the API.
    pub fn set_version(&self, version: Option<&str>) {
        self.state.lock().unwrap().version = version.map(str::to_string);
    }

    /// Makes the next request under `prefix` fail with `status`.
    pub fn fail_next(&self, prefix: &str, status: u16) {
        self.state.lock().unwrap().failures.push((prefix.to_string(), status));
    }

    /// Returns logged requests whose path starts with `prefix`.
    pub fn requests_to(&self, prefix: &str) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .requests
            .iter()
            .filter(|request| request.starts_with(prefix))
            .cloned()
            .collect()
    }

    /// Clears the request log.
    pub fn clear_requests(&self) {
        self.state.lock().unwrap().requests.clear();
    }
}

impl Drop for MockFigma {
    fn drop(&mut self) {
        self.server.unblock();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

// ============================================================================
// SECTION: Request Handling
// ============================================================================

/// Answers one request from the mock state.
fn handle_request(request: Request, state: &Mutex<MockState>, base_url: &str) {
    let url = Url::parse(&format!("http://mock{}", request.url())).expect("request url");
    let path = url.path().to_string();
    let query: BTreeMap<String, String> = url.query_pairs().into_owned().collect();
    let mut state = state.lock().unwrap();
    state.requests.push(match url.query() {
        Some(raw) => format!("{path}?{raw}"),
        None => path.clone(),
    });

    let injected = state.failures.iter().position(|(prefix, _)| path.starts_with(prefix));
    if let Some(position) = injected {
        let (_, status) = state.failures.remove(position);
        drop(state);
        respond(request, status, b"{\"err\":\"injected\"}".to_vec(), "application/json", None);
        return;
    }

    if path.starts_with("/v1/") {
        let authorized = request.headers().iter().any(|header| {
            header.field.equiv("X-Figma-Token") && header.value.as_str() == TEST_TOKEN
        });
        if !authorized {
            drop(state);
            respond(request, 403, b"{\"status\":403}".to_vec(), "application/json", None);
            return;
        }
    }

    let segments: Vec<&str> = path.trim_start_matches('/').split('/').collect();
    let (status, body, content_type, location) = match segments.as_slice() {
        ["v1", "files", _key] => {
            let mut body = json!({ "name": "Mock File", "lastModified": "2024-05-01T00:00:00Z" });
            if let Some(version) = &state.version {
                body["version"] = json!(version);
            }
            (200, body.to_string().into_bytes(), "application/json", None)
        }
        ["v1", "files", _key, "nodes"] => {
            let id = query.get("ids").cloned().unwrap_or_default();
            let node = state.nodes.get(&id).map_or(Value::Null, |(name, kind)| {
                json!({ "document": { "id": id, "name": name, "type": kind } })
            });
            let mut nodes = Map::new();
            nodes.insert(id, node);
            let mut body = json!({
                "name": "Mock File",
                "lastModified": "2024-05-01T00:00:00Z",
                "nodes": nodes,
            });
            if let Some(version) = &state.version {
                body["version"] = json!(version);
            }
            (200, body.to_string().into_bytes(), "application/json", None)
        }
        ["v1", "images", key] => {
            let id = query.get("ids").cloned().unwrap_or_default();
            let kind = if state.redirect_images { "redirect" } else { "img" };
            let image = if state.unrenderable.contains(&id) {
                Value::Null
            } else {
                json!(format!("{base_url}/cdn/{kind}/{key}/{}.png", id.replace(':', "-")))
            };
            let mut images = Map::new();
            images.insert(id, image);
            let body = json!({ "err": state.image_err, "images": images });
            (200, body.to_string().into_bytes(), "application/json", None)
        }
        ["cdn", "redirect", key, file] => {
            (302, Vec::new(), "text/plain", Some(format!("{base_url}/cdn/img/{key}/{file}")))
        }
        ["cdn", "img", _key, _file] => (200, PNG_BYTES.to_vec(), "image/png", None),
        _ => (404, b"{\"status\":404}".to_vec(), "application/json", None),
    };
    drop(state);
    respond(request, status, body, content_type, location);
}

/// Sends a response with optional redirect location.
fn respond(
    request: Request,
    status: u16,
    body: Vec<u8>,
    content_type: &str,
    location: Option<String>,
) {
    let mut response = Response::from_data(body)
        .with_status_code(StatusCode(status))
        .with_header(Header::from_bytes("Content-Type", content_type).unwrap());
    if let Some(location) = location {
        response.add_header(Header::from_bytes("Location", location.as_bytes()).unwrap());
    }
    let _ = request.respond(response);
}

// ============================================================================
// SECTION: Fixtures
// ============================================================================

/// Writes a listing file into `dir` and returns its path.
pub fn write_listing(dir: &Path, content: &str) -> std::path::PathBuf {
    let path = dir.join("figma_urls.md");
    std::fs::write(&path, content).expect("write listing");
    path
}

/// Reads a JSON file.
pub fn read_json(path: &Path) -> Value {
    serde_json::from_slice(&std::fs::read(path).expect("read json")).expect("parse json")
}
