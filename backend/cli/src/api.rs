use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use formbridge_browser::RecordDetail;
use formbridge_core::{DocumentUpload, IntakeError, RecognitionProvider, RecordStore};
use formbridge_session::{FormSession, SessionState};

/// Shared application state for API handlers.
pub struct AppState {
    pub provider: Arc<dyn RecognitionProvider>,
    pub store: Arc<dyn RecordStore>,
}

/// Build the Axum router with all API routes.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/records", get(list_records))
        .route("/api/records/:id", get(record_detail))
        .route("/api/intake", post(intake))
        .route("/api/ws", get(ws_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "formbridge",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// All stored records, most-recent-first.
async fn list_records(State(state): State<Arc<AppState>>) -> Result<Json<Value>, StatusCode> {
    match state.store.list().await {
        Ok(records) => Ok(Json(json!({ "records": records }))),
        Err(e) => {
            tracing::error!(error = %e, "failed to list records");
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Detail view of one record, structured fields parsed for display.
async fn record_detail(
    State(state): State<Arc<AppState>>,
    Path(record_id): Path<Uuid>,
) -> Result<Json<RecordDetail>, StatusCode> {
    let records = state.store.list().await.map_err(|e| {
        tracing::error!(error = %e, "failed to fetch record detail");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;
    records
        .iter()
        .find(|r| r.id == record_id)
        .map(|r| Json(RecordDetail::from_stored(r)))
        .ok_or(StatusCode::NOT_FOUND)
}

#[derive(Deserialize)]
struct IntakeParams {
    file_name: String,
}

/// One-shot intake: recognize the uploaded document and submit the fields as
/// recognized, without interactive edits.
async fn intake(
    State(state): State<Arc<AppState>>,
    Query(params): Query<IntakeParams>,
    body: Bytes,
) -> impl IntoResponse {
    let session = FormSession::new(state.provider.clone(), state.store.clone());
    let upload = DocumentUpload::new(params.file_name, body.to_vec());

    if let Err(e) = session.select_file(upload).await {
        return (StatusCode::CONFLICT, Json(json!({ "message": e.to_string() })));
    }
    if session.state() == SessionState::RecognitionFailed {
        let message = session.error_message().unwrap_or_default();
        return (StatusCode::BAD_GATEWAY, Json(json!({ "message": message })));
    }

    match session.submit().await {
        Ok(stored) => (
            StatusCode::CREATED,
            Json(json!({ "record": stored })),
        ),
        Err(IntakeError::InvalidRecord(message)) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "message": message })),
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "message": e.to_string() })),
        ),
    }
}

/// WebSocket handler relaying live record-set updates.
async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

async fn handle_socket(mut socket: WebSocket, state: Arc<AppState>) {
    let mut feed = match state.store.observe().await {
        Ok(feed) => feed,
        Err(e) => {
            tracing::error!(error = %e, "failed to open record feed for websocket");
            return;
        }
    };

    loop {
        tokio::select! {
            delivery = feed.next() => {
                let Some(records) = delivery else { break };
                let Ok(text) = serde_json::to_string(&json!({ "records": records })) else {
                    continue;
                };
                if socket.send(Message::Text(text)).await.is_err() {
                    break;
                }
            }
            incoming = socket.recv() => {
                // Client went away; drop the feed with the socket.
                match incoming {
                    None | Some(Err(_)) | Some(Ok(Message::Close(_))) => break,
                    Some(Ok(_)) => {}
                }
            }
        }
    }
}
