//! Session registration, listing, status, eviction and logout handlers.

use axum::Json;
use axum::extract::{Path, State};

use sessiongate_entity::session::{EvictOutcome, LogoutOutcome, RegisterOutcome};

use crate::dto::request::{LogoutRequest, RegisterSessionRequest, StatusQuery};
use crate::dto::response::{
    EvictResponse, MessageResponse, RegisterResponse, SessionResponse, StatusResponse,
};
use crate::error::ApiError;
use crate::extractors::{AuthUser, ValidatedJson, ValidatedQuery};
use crate::state::AppState;

/// POST /api/session/register
pub async fn register(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<RegisterSessionRequest>,
) -> Result<Json<RegisterResponse>, ApiError> {
    let outcome = state.session_service.register(&auth, req.into()).await?;

    let response = match outcome {
        RegisterOutcome::Registered(_) => RegisterResponse::success("Session registered"),
        RegisterOutcome::Refreshed(_) => RegisterResponse::success("Session already registered"),
        RegisterOutcome::LimitReached { active } => RegisterResponse::limit_reached(active),
    };
    Ok(Json(response))
}

/// GET /api/sessions
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<SessionResponse>>, ApiError> {
    let sessions = state.session_service.list_active(&auth).await?;
    Ok(Json(sessions.into_iter().map(SessionResponse::from).collect()))
}

/// GET /api/session/status?session_id=
pub async fn status(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedQuery(query): ValidatedQuery<StatusQuery>,
) -> Result<Json<StatusResponse>, ApiError> {
    let session_id = state.session_service.parse_session_id(&query.session_id)?;
    let status = state.session_service.status(&auth, &session_id).await?;
    Ok(Json(StatusResponse { status }))
}

/// DELETE /api/session/{session_id}
pub async fn evict(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(session_id): Path<String>,
) -> Result<Json<EvictResponse>, ApiError> {
    let session_id = state.session_service.parse_session_id(&session_id)?;
    let outcome = state.eviction_service.evict(&auth, &session_id).await?;

    let (message, notified) = match outcome {
        EvictOutcome::Evicted { notified } => ("Session terminated", notified),
        EvictOutcome::AlreadyAbsent => ("Session already terminated", false),
    };
    Ok(Json(EvictResponse {
        status: "success".to_string(),
        message: message.to_string(),
        notified,
    }))
}

/// POST /api/session/logout
pub async fn logout(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<LogoutRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let session_id = state.session_service.parse_session_id(&req.session_id)?;
    let message = match state.session_service.logout(&auth, &session_id).await? {
        LogoutOutcome::LoggedOut => "Session logged out",
        LogoutOutcome::Unchanged => "No active session to log out",
    };
    Ok(Json(MessageResponse::ok(message)))
}
