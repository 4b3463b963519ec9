//! Embedded web front end for glycowise.
//!
//! A small HTTP server (sync, via `tiny_http`) that serves:
//! - the single-page UI on `/`, `/predict`, `/diet`, `/exercise` and the
//!   plan detail routes
//! - JSON endpoints for the catalog, the risk form, predictions and the two
//!   advisory chats
//!
//! Launched via `glycowise serve` (default: `http://127.0.0.1:3000`).

mod api;
mod frontend;

use std::io::Cursor;
use std::sync::Arc;
use std::thread;

use anyhow::{Context, Result};
use tiny_http::{Header, Method, Request, Response, Server, StatusCode};

use crate::catalog::Catalog;
use crate::config::GlycowiseConfig;
use crate::gateway::{Gateway, Topic};

type HttpResponse = Response<Cursor<Vec<u8>>>;

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

/// Immutable state shared by every request thread.
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<Gateway>,
    pub catalog: Arc<Catalog>,
    pub config: Arc<GlycowiseConfig>,
}

impl AppState {
    pub fn new(gateway: Gateway, catalog: Catalog, config: GlycowiseConfig) -> Self {
        Self {
            gateway: Arc::new(gateway),
            catalog: Arc::new(catalog),
            config: Arc::new(config),
        }
    }
}

// ---------------------------------------------------------------------------
// Server entry point
// ---------------------------------------------------------------------------

/// Bind `addr` and serve until the process is stopped.
pub fn serve(addr: &str, state: AppState, open: bool) -> Result<()> {
    let workers = state.config.server.workers;
    let server = Server::http(addr)
        .map_err(|e| anyhow::anyhow!("failed to start HTTP server on {addr}: {e}"))?;

    println!("glycowise running at http://{addr}");
    println!("Press Ctrl+C to stop.\n");

    if open {
        let url = format!("http://{addr}");
        if let Err(e) = open_browser(&url) {
            eprintln!("could not open browser: {e}");
        }
    }

    run(server, state, workers);
    Ok(())
}

/// Accept requests on an already-bound server with a fixed pool of
/// `workers` threads.
///
/// A slow gateway call ties up one worker; once all are busy, further
/// connections queue in the server until one frees up. Returns when the
/// server stops accepting.
pub fn run(server: Server, state: AppState, workers: usize) {
    let server = Arc::new(server);
    let handles: Vec<_> = (0..workers.max(1))
        .map(|id| {
            let server = Arc::clone(&server);
            let state = state.clone();
            thread::Builder::new()
                .name(format!("glycowise-web-{id}"))
                .spawn(move || {
                    loop {
                        match server.recv() {
                            Ok(request) => handle(request, &state),
                            Err(e) => {
                                eprintln!("web worker {id} stopped: {e}");
                                break;
                            }
                        }
                    }
                })
        })
        .filter_map(|spawned| {
            spawned
                .map_err(|e| eprintln!("failed to start web worker: {e}"))
                .ok()
        })
        .collect();

    for worker in handles {
        if worker.join().is_err() {
            eprintln!("web worker panicked");
        }
    }
}

fn handle(mut request: Request, state: &AppState) {
    let method = request.method().clone();
    let url = request.url().to_string();

    let response = match read_body(&mut request) {
        Ok(body) => dispatch(state, &method, &url, body.as_deref()).unwrap_or_else(|e| {
            eprintln!("{method} {url} failed: {e:#}");
            error_response(500, &e.to_string())
        }),
        Err(e) => {
            eprintln!("failed to read request body for {url}: {e}");
            error_response(400, "could not read request body")
        }
    };
    let status = response.status_code().0;

    if let Err(e) = request.respond(response) {
        eprintln!("failed to send response for {url}: {e}");
    }

    println!(
        "{} {} {} {}",
        method,
        url,
        status,
        chrono::Local::now().format("%H:%M:%S")
    );
}

/// Body of a PUT/POST/PATCH as UTF-8 text; `None` for other methods.
fn read_body(request: &mut Request) -> std::io::Result<Option<String>> {
    if !matches!(request.method(), Method::Put | Method::Post | Method::Patch) {
        return Ok(None);
    }
    let mut buf = String::new();
    request.as_reader().read_to_string(&mut buf)?;
    Ok(Some(buf))
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Dispatch an incoming request to the appropriate handler.
fn dispatch(
    state: &AppState,
    method: &Method,
    url: &str,
    body: Option<&str>,
) -> Result<HttpResponse> {
    // Strip query string for path matching
    let path = url.split('?').next().unwrap_or(url);
    let catalog = &state.catalog;

    match (method, path) {
        // Pages
        (&Method::Get, "/" | "/index.html" | "/predict" | "/diet" | "/exercise") => {
            Ok(serve_frontend())
        }
        (&Method::Get, p) if p.starts_with("/diet/") => {
            let id = &p["/diet/".len()..];
            if catalog.diet(id).is_some() {
                Ok(serve_frontend())
            } else {
                redirect("/diet")
            }
        }
        (&Method::Get, p) if p.starts_with("/exercise/") => {
            let id = &p["/exercise/".len()..];
            if catalog.exercise(id).is_some() {
                Ok(serve_frontend())
            } else {
                redirect("/exercise")
            }
        }

        // API: Catalog
        (&Method::Get, "/api/diet") => api::list_diets(catalog, url),
        (&Method::Get, "/api/exercise") => api::list_exercises(catalog, url),
        (&Method::Get, p) if p.starts_with("/api/diet/") => {
            api::get_diet(catalog, &p["/api/diet/".len()..])
        }
        (&Method::Get, p) if p.starts_with("/api/exercise/") => {
            api::get_exercise(catalog, &p["/api/exercise/".len()..])
        }

        // API: Risk assessment
        (&Method::Get, "/api/form") => api::get_form(),
        (&Method::Post, "/api/predict") => api::post_predict(&state.gateway, body.unwrap_or("{}")),

        // API: Advisory chats
        (&Method::Get, "/api/chat/diet") => api::get_chat(Topic::Diet),
        (&Method::Get, "/api/chat/exercise") => api::get_chat(Topic::Exercise),
        (&Method::Post, "/api/chat/diet") => {
            api::post_chat(&state.gateway, Topic::Diet, body.unwrap_or("{}"))
        }
        (&Method::Post, "/api/chat/exercise") => {
            api::post_chat(&state.gateway, Topic::Exercise, body.unwrap_or("{}"))
        }

        // API: Health
        (&Method::Get, "/api/health") => api::get_health(state),

        _ => Ok(not_found()),
    }
}

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

/// Serve the embedded single-page frontend.
fn serve_frontend() -> HttpResponse {
    let html = frontend::INDEX_HTML;
    Response::from_data(html.as_bytes().to_vec())
        .with_header(content_type_html())
        .with_status_code(StatusCode(200))
}

/// 302 to another page of the UI.
fn redirect(location: &str) -> Result<HttpResponse> {
    let header = Header::from_bytes("Location", location)
        .map_err(|()| anyhow::anyhow!("invalid redirect location {location}"))?;
    Ok(Response::from_data(Vec::new())
        .with_header(header)
        .with_status_code(StatusCode(302)))
}

/// 404 response.
fn not_found() -> HttpResponse {
    error_response(404, "not found")
}

/// JSON `{"error": message}` with the given status.
pub(crate) fn error_response(status: u16, message: &str) -> HttpResponse {
    let body = serde_json::json!({ "error": message }).to_string();
    Response::from_data(body.into_bytes())
        .with_header(content_type_json())
        .with_status_code(StatusCode(status))
}

/// JSON content type header.
pub(crate) fn content_type_json() -> Header {
    Header::from_bytes("Content-Type", "application/json; charset=utf-8").unwrap()
}

/// HTML content type header.
fn content_type_html() -> Header {
    Header::from_bytes("Content-Type", "text/html; charset=utf-8").unwrap()
}

/// Attempt to open a URL in the system default browser.
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", url])
            .spawn()
            .context("failed to open browser")?;
    }

    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open")
            .arg(url)
            .spawn()
            .context("failed to open browser")?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open")
            .arg(url)
            .spawn()
            .context("failed to open browser")?;
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::io::Read;

    use super::*;
    use crate::gateway::{CompletionRequest, CompletionTransport, GatewayError};

    struct Fixed;

    impl CompletionTransport for Fixed {
        fn complete(&self, _request: &CompletionRequest<'_>) -> Result<String, GatewayError> {
            Ok("ok".to_string())
        }

        fn model_name(&self) -> &str {
            "fixed"
        }
    }

    fn state() -> AppState {
        AppState::new(
            Gateway::new(Fixed),
            Catalog::builtin().unwrap(),
            GlycowiseConfig::default(),
        )
    }

    fn status(method: Method, url: &str, body: Option<&str>) -> u16 {
        dispatch(&state(), &method, url, body).unwrap().status_code().0
    }

    #[test]
    fn pages_serve_frontend() {
        for page in ["/", "/predict", "/diet", "/exercise", "/diet/keto", "/exercise/yoga"] {
            assert_eq!(status(Method::Get, page, None), 200, "{page}");
        }
    }

    #[test]
    fn unknown_detail_ids_redirect() {
        assert_eq!(status(Method::Get, "/diet/pizza", None), 302);
        assert_eq!(status(Method::Get, "/exercise/couch", None), 302);
    }

    #[test]
    fn api_detail_status() {
        assert_eq!(status(Method::Get, "/api/diet/dash", None), 200);
        assert_eq!(status(Method::Get, "/api/diet/pizza", None), 404);
        assert_eq!(status(Method::Get, "/api/exercise/hiit", None), 200);
        assert_eq!(status(Method::Get, "/api/exercise/couch", None), 404);
    }

    #[test]
    fn chat_rejects_blank_message() {
        assert_eq!(
            status(Method::Post, "/api/chat/diet", Some(r#"{"message": "   "}"#)),
            400
        );
        assert_eq!(
            status(Method::Post, "/api/chat/exercise", Some(r#"{"message": "stretch?"}"#)),
            200
        );
    }

    #[test]
    fn chat_seed_matches_topic_texts() {
        for topic in [Topic::Diet, Topic::Exercise] {
            let url = format!("/api/chat/{topic}");
            let response = dispatch(&state(), &Method::Get, &url, None).unwrap();
            assert_eq!(response.status_code().0, 200);

            let mut raw = String::new();
            response.into_reader().read_to_string(&mut raw).unwrap();
            let seed: serde_json::Value = serde_json::from_str(&raw).unwrap();
            assert_eq!(seed["topic"], topic.as_str());
            assert_eq!(seed["greeting"], topic.greeting());
            assert_eq!(seed["apology"], topic.apology());
        }
    }

    #[test]
    fn unknown_route_is_404() {
        assert_eq!(status(Method::Get, "/nope", None), 404);
        assert_eq!(status(Method::Delete, "/api/diet", None), 404);
    }
}
