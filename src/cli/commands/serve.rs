//! Browser chat UI.
//!
//! Serves a single page plus a small JSON API. All handlers share one
//! session behind an async mutex, so actions run one at a time.

use crate::cli::preflight;
use crate::cli::Output;
use crate::config::Settings;
use crate::error::TubechatError;
use crate::rag::Message;
use crate::session::{Assistant, Session};
use crate::transcript::{parse_links, LinkWarning};
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};
use tracing::error;

const INDEX_HTML: &str = include_str!("index.html");

/// Shared application state.
pub struct AppState {
    assistant: Assistant,
    session: Mutex<Session>,
}

impl AppState {
    pub fn new(assistant: Assistant) -> Self {
        Self {
            assistant,
            session: Mutex::new(Session::new()),
        }
    }
}

/// Build the UI router over `state`.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/api/history", get(history))
        .route("/api/process", post(process))
        .route("/api/ask", post(ask))
        .layer(cors)
        .with_state(state)
}

/// Run the browser UI server.
pub async fn run_serve(host: Option<String>, port: Option<u16>, settings: Settings) -> anyhow::Result<()> {
    if let Err(e) = preflight::check(&settings) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let spinner = Output::spinner("Loading embedding model...");
    let assistant = Assistant::new(&settings);
    spinner.finish_and_clear();

    let state = Arc::new(AppState::new(assistant?));
    let app = router(state);

    let host = host.unwrap_or_else(|| settings.server.host.clone());
    let port = port.unwrap_or(settings.server.port);
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Chat with YouTube videos");
    println!();
    Output::success(&format!("Open http://{} in your browser", addr));
    println!();
    println!("Endpoints:");
    Output::kv("UI", "GET  /");
    Output::kv("History", "GET  /api/history");
    Output::kv("Process videos", "POST /api/process");
    Output::kv("Ask", "POST /api/ask");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}

// === Request/Response Types ===

#[derive(Deserialize)]
struct ProcessRequest {
    /// Video links, one per line
    links: String,
}

#[derive(Serialize)]
struct ProcessResponse {
    videos_ok: usize,
    chunks: usize,
    warnings: Vec<LinkWarning>,
    ready: bool,
    messages: Vec<Message>,
}

#[derive(Deserialize)]
struct AskRequest {
    question: String,
}

#[derive(Serialize)]
struct AskResponse {
    answer: Option<String>,
    messages: Vec<Message>,
}

#[derive(Serialize)]
struct HistoryResponse {
    ready: bool,
    messages: Vec<Message>,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

fn error_response(e: TubechatError) -> Response {
    let status = match e {
        TubechatError::NotReady => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status == StatusCode::INTERNAL_SERVER_ERROR {
        error!("Request failed: {}", e);
    }
    (
        status,
        Json(ErrorResponse {
            error: e.to_string(),
        }),
    )
        .into_response()
}

// === Handlers ===

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn history(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let session = state.session.lock().await;
    Json(HistoryResponse {
        ready: session.is_ready(),
        messages: session.messages().to_vec(),
    })
}

async fn process(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ProcessRequest>,
) -> Response {
    let links = parse_links(&req.links);
    let mut session = state.session.lock().await;

    match state.assistant.process_videos(&mut session, &links).await {
        Ok(report) => Json(ProcessResponse {
            videos_ok: report.videos_ok,
            chunks: report.chunks_indexed,
            warnings: report.warnings,
            ready: session.is_ready(),
            messages: session.messages().to_vec(),
        })
        .into_response(),
        Err(e) => error_response(e),
    }
}

async fn ask(State(state): State<Arc<AppState>>, Json(req): Json<AskRequest>) -> Response {
    let mut session = state.session.lock().await;

    match state.assistant.ask(&mut session, &req.question).await {
        Ok(answer) => Json(AskResponse {
            answer,
            messages: session.messages().to_vec(),
        })
        .into_response(),
        Err(e) => error_response(e),
    }
}
