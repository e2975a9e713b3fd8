//! HTTP relay and hosted-game API.

use crate::chat::ChatSender;
use crate::config::ServerConfig;
use crate::notifier::{ChatNotifier, SendResultRequest};
use crate::phrases;
use crate::session::{ChatId, ControllerFactory, SessionError, SessionManager};
use axum::{
    Json, Router,
    extract::{
        Path, Request, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use bonus_tictactoe::{GameController, GameView, MoveError};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex, PoisonError};
use tower::ServiceBuilder;
use tracing::{debug, error, info, instrument, warn};

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    chat: Arc<dyn ChatSender>,
    sessions: SessionManager,
    rng: Arc<Mutex<StdRng>>,
}

impl AppState {
    /// Creates state with an entropy-seeded phrase picker.
    pub fn new(chat: Arc<dyn ChatSender>, sessions: SessionManager) -> Self {
        Self::with_rng(chat, sessions, StdRng::from_os_rng())
    }

    /// Creates state with a caller-supplied phrase picker.
    pub fn with_rng(chat: Arc<dyn ChatSender>, sessions: SessionManager, rng: StdRng) -> Self {
        Self {
            chat,
            sessions,
            rng: Arc::new(Mutex::new(rng)),
        }
    }

    /// Hosted sessions.
    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }
}

/// Controllers for hosted games: configured policy and delay, outcome sent
/// to the game's own chat.
pub fn controller_factory(config: &ServerConfig, chat: Arc<dyn ChatSender>) -> ControllerFactory {
    let policy = *config.policy();
    let thinking_delay = *config.thinking_delay();
    Arc::new(move |chat_id| {
        let notifier = Arc::new(ChatNotifier::new(Arc::clone(&chat), chat_id));
        GameController::seeded(policy.build(rand::random()), notifier, rand::random())
            .with_thinking_delay(thinking_delay)
    })
}

/// Body of `POST /games/{chat_id}/moves`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MoveRequest {
    /// Cell index, 0-8.
    pub index: usize,
}

/// Error response: `{ ok: false, error }`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "ok": false, "error": self.message }))).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        warn!(error = %rejection.body_text(), "Rejected request body");
        Self::new(StatusCode::BAD_REQUEST, rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        warn!(error = %rejection.body_text(), "Rejected request path");
        Self::new(StatusCode::BAD_REQUEST, rejection.body_text())
    }
}

impl From<SessionError> for ApiError {
    fn from(e: SessionError) -> Self {
        Self::new(StatusCode::NOT_FOUND, e.to_string())
    }
}

impl From<MoveError> for ApiError {
    fn from(e: MoveError) -> Self {
        let status = if e.is_invalid_move() {
            StatusCode::CONFLICT
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        Self::new(status, e.to_string())
    }
}

/// Builds the router. `cors_origin` enables CORS headers for that origin.
pub fn router(state: AppState, cors_origin: Option<&str>) -> Router {
    let cors_origin = cors_origin.and_then(|origin| {
        HeaderValue::from_str(origin)
            .inspect_err(|e| warn!(origin, error = %e, "Ignoring invalid CORS origin"))
            .ok()
    });

    Router::new()
        .route("/send-result", post(send_result).options(preflight))
        .route("/games/{chat_id}", get(get_game).options(preflight))
        .route("/games/{chat_id}/moves", post(post_move).options(preflight))
        .route("/games/{chat_id}/reset", post(post_reset).options(preflight))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .map_request(|req: Request| {
                    info!(method = %req.method(), uri = %req.uri(), "Incoming HTTP request");
                    req
                })
                .map_response(move |mut response: Response| {
                    if let Some(origin) = &cors_origin {
                        let headers = response.headers_mut();
                        headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin.clone());
                        headers.insert(
                            header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
                            HeaderValue::from_static("true"),
                        );
                        headers.insert(
                            header::ACCESS_CONTROL_ALLOW_METHODS,
                            HeaderValue::from_static("GET, POST, OPTIONS"),
                        );
                        headers.insert(
                            header::ACCESS_CONTROL_ALLOW_HEADERS,
                            HeaderValue::from_static("content-type"),
                        );
                    }
                    response
                }),
        )
}

async fn preflight() -> StatusCode {
    StatusCode::NO_CONTENT
}

#[instrument(skip(state))]
async fn send_result(
    State(state): State<AppState>,
    body: Result<Json<SendResultRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(body) = body?;
    let chat_id = body.chat_id.filter(|id| *id != 0).ok_or_else(|| {
        warn!("send-result without chat_id");
        ApiError::new(StatusCode::BAD_REQUEST, "chat_id is required")
    })?;

    let text = {
        let mut rng = state.rng.lock().unwrap_or_else(PoisonError::into_inner);
        phrases::compose(body.result, body.code.as_deref(), &mut *rng)
    };
    debug!(chat_id, %text, "Sending result message");

    match state.chat.send_message(chat_id, &text).await {
        Ok(data) => {
            info!(chat_id, result = %body.result, "Result delivered");
            Ok(Json(json!({ "ok": true, "data": data })))
        }
        Err(e) => {
            error!(chat_id, error = %e, "Failed to deliver result");
            Err(ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
    }
}

#[instrument(skip(state))]
async fn get_game(
    State(state): State<AppState>,
    chat_id: Result<Path<ChatId>, PathRejection>,
) -> Result<Json<GameView>, ApiError> {
    let Path(chat_id) = chat_id?;
    Ok(Json(state.sessions.get_or_create(chat_id).view()))
}

#[instrument(skip(state))]
async fn post_move(
    State(state): State<AppState>,
    chat_id: Result<Path<ChatId>, PathRejection>,
    body: Result<Json<MoveRequest>, JsonRejection>,
) -> Result<Json<GameView>, ApiError> {
    let Path(chat_id) = chat_id?;
    let Json(body) = body?;
    let session = state.sessions.get(chat_id)?;
    Ok(Json(session.human_move(body.index)?))
}

#[instrument(skip(state))]
async fn post_reset(
    State(state): State<AppState>,
    chat_id: Result<Path<ChatId>, PathRejection>,
) -> Result<Json<GameView>, ApiError> {
    let Path(chat_id) = chat_id?;
    Ok(Json(state.sessions.get(chat_id)?.reset()))
}
