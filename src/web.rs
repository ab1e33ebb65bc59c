use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use chrono::Utc;
use serde_json::json;
use tokio::sync::Mutex;

use crate::item::{self, Item};
use crate::planner::{self, DEFAULT_SESSION_SIZE, SessionConfig};
use crate::progress::{self, Progress};
use crate::retention;
use crate::wellness::WellnessTimer;

// -- App state --

struct AppState {
    catalog: Vec<Item>,
    progress: Progress,
    progress_path: PathBuf,
}

/// One in-flight study session. The wellness timer lives inside the session
/// entry, so dropping the session cancels it on every exit path.
struct StudySession {
    item_ids: Vec<String>,
    reviewed: usize,
    correct: u32,
    incorrect: u32,
    wellness: WellnessTimer,
}

struct ServerState {
    app: AppState,
    sessions: HashMap<String, StudySession>,
}

type SharedState = Arc<Mutex<ServerState>>;

fn not_found(what: &str) -> axum::response::Response {
    (StatusCode::NOT_FOUND, Json(json!({ "error": what }))).into_response()
}

// -- Route handlers --

#[derive(serde::Deserialize)]
struct SessionRequest {
    target_size: Option<usize>,
    categories: Option<Vec<String>>,
    kinds: Option<Vec<String>>,
}

async fn create_session(
    State(state): State<SharedState>,
    Json(req): Json<SessionRequest>,
) -> axum::response::Response {
    let mut st = state.lock().await;
    let today = Utc::now().date_naive();

    let config = SessionConfig {
        target_size: req.target_size.unwrap_or(DEFAULT_SESSION_SIZE),
        categories: req
            .categories
            .unwrap_or_else(|| item::distinct_categories(&st.app.catalog)),
        kinds: req
            .kinds
            .unwrap_or_else(|| item::distinct_kinds(&st.app.catalog)),
    };

    let (item_ids, items_payload) =
        match planner::plan(&st.app.catalog, &st.app.progress, &config, today) {
            Ok(items) => {
                let ids: Vec<String> = items.iter().map(|i| i.id.clone()).collect();
                (ids, serde_json::to_value(&items).unwrap())
            }
            Err(e) => {
                return (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    Json(json!({ "error": e.to_string() })),
                )
                    .into_response();
            }
        };

    let session_id = uuid::Uuid::new_v4().to_string();
    st.sessions.insert(
        session_id.clone(),
        StudySession {
            item_ids,
            reviewed: 0,
            correct: 0,
            incorrect: 0,
            wellness: WellnessTimer::start(Utc::now()),
        },
    );

    (
        StatusCode::CREATED,
        Json(json!({ "session_id": session_id, "items": items_payload })),
    )
        .into_response()
}

async fn session_status(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let st = state.lock().await;
    let Some(session) = st.sessions.get(&id) else {
        return not_found("unknown session");
    };
    Json(json!({
        "total": session.item_ids.len(),
        "reviewed": session.reviewed,
        "correct": session.correct,
        "incorrect": session.incorrect,
    }))
    .into_response()
}

#[derive(serde::Deserialize)]
struct ReviewRequest {
    item_id: String,
    correct: bool,
}

async fn submit_review(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(req): Json<ReviewRequest>,
) -> axum::response::Response {
    let mut st = state.lock().await;

    let Some(session) = st.sessions.get(&id) else {
        return not_found("unknown session");
    };
    if !session.item_ids.contains(&req.item_id) {
        return not_found("item not in session plan");
    }

    // No prior state just means this is the item's first review.
    let prior = st.app.progress.get(&req.item_id).copied().unwrap_or_default();
    let updated = retention::record_outcome(prior, req.correct, Utc::now().date_naive());
    st.app.progress.insert(req.item_id.clone(), updated);

    if let Err(e) = progress::save_progress(&st.app.progress_path, &st.app.progress) {
        eprintln!("Error saving {}: {e}", st.app.progress_path.display());
    }

    let session = st.sessions.get_mut(&id).unwrap();
    session.reviewed += 1;
    if req.correct {
        session.correct += 1;
    } else {
        session.incorrect += 1;
    }

    Json(json!({ "item_id": req.item_id, "state": updated })).into_response()
}

async fn poll_wellness(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let mut st = state.lock().await;
    let Some(session) = st.sessions.get_mut(&id) else {
        return not_found("unknown session");
    };
    Json(session.wellness.poll(Utc::now())).into_response()
}

async fn end_session(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let mut st = state.lock().await;
    let Some(session) = st.sessions.remove(&id) else {
        return not_found("unknown session");
    };
    Json(json!({
        "total": session.item_ids.len(),
        "reviewed": session.reviewed,
        "correct": session.correct,
        "incorrect": session.incorrect,
    }))
    .into_response()
}

// -- Public entry point --

pub async fn serve(catalog_paths: Vec<String>, progress_path: PathBuf, port: u16) {
    let files = item::discover_files(&catalog_paths);
    if files.is_empty() {
        eprintln!("No CSV files found.");
        std::process::exit(1);
    }

    let mut catalog: Vec<Item> = Vec::new();
    for file in &files {
        match item::load_catalog(file) {
            Ok(items) => catalog.extend(items),
            Err(e) => {
                eprintln!("Warning: {e}");
            }
        }
    }

    let progress = match progress::load_progress(&progress_path) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    println!(
        "Loaded {} items from {} files, {} with review history.",
        catalog.len(),
        files.len(),
        progress.len()
    );

    let state = Arc::new(Mutex::new(ServerState {
        app: AppState {
            catalog,
            progress,
            progress_path,
        },
        sessions: HashMap::new(),
    }));

    let app = Router::new()
        .route("/sessions", post(create_session))
        .route("/sessions/{id}", get(session_status).delete(end_session))
        .route("/sessions/{id}/reviews", post(submit_review))
        .route("/sessions/{id}/wellness", get(poll_wellness))
        .with_state(state);

    let addr = format!("0.0.0.0:{port}");
    println!("Serving at http://localhost:{port}");

    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
