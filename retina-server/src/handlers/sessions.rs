//! Session handlers
//!
//! Login and logout for the image board. Login enforces the IP-ban policy:
//! a full ban rejects authentication with 403 and records the hit; a
//! partial ban lets the login proceed untouched; soft-deleted bans are
//! ignored. Every outcome lands in the audit log.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::{bearer_token, client_ip, IpBanCategory, UserEventKind};
use crate::error::ApiError;
use crate::state::AppState;

/// Login request body
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    /// Account name
    pub name: String,
    /// Account password
    pub password: String,
}

/// Successful login response
#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    /// Bearer token for subsequent requests
    pub session_id: String,
    /// The authenticated user
    pub user_id: i64,
    /// The authenticated user's name
    pub name: String,
}

/// POST /session - create a session (log in)
#[utoipa::path(
    post,
    path = "/session",
    tag = "Sessions",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = LoginResponse),
        (status = 401, description = "Unknown name or wrong password"),
        (status = 403, description = "Caller's IP address carries a full ban")
    )
)]
pub async fn create_session_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let ip = client_ip(&headers);

    // Full bans block authentication before credentials are even checked;
    // partial bans allow login and mutate nothing.
    if let Some(ban) = state.ip_bans.find_active(ip) {
        if ban.category == IpBanCategory::Full {
            state.ip_bans.record_hit(ban.id);
            return Err(ApiError::forbidden("This IP address is banned"));
        }
    }

    let Some(user) = state.users.authenticate(&request.name, &request.password) else {
        let known_id = state.users.find_by_name(&request.name).map(|u| u.id);
        state
            .events
            .record(known_id, &request.name, ip, UserEventKind::FailedLogin);
        return Err(ApiError::unauthorized("Incorrect name or password"));
    };

    let session = state.sessions.create(user.id);
    state.users.record_login_ip(user.id, ip);
    state
        .events
        .record(Some(user.id), &user.name, ip, UserEventKind::Login);

    tracing::info!(user = %user.name, ip = %ip, "user logged in");

    Ok(Json(LoginResponse {
        session_id: session.token.to_string(),
        user_id: user.id,
        name: user.name,
    }))
}

/// DELETE /session - destroy the caller's session (log out)
#[utoipa::path(
    delete,
    path = "/session",
    tag = "Sessions",
    responses(
        (status = 204, description = "Session destroyed"),
        (status = 401, description = "No valid session token supplied")
    )
)]
pub async fn delete_session_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    let token = bearer_token(&headers)
        .ok_or_else(|| ApiError::unauthorized("No session token supplied"))?;

    let session = state
        .sessions
        .destroy(token)
        .ok_or_else(|| ApiError::unauthorized("Unknown session token"))?;

    let ip = client_ip(&headers);
    if let Some(user) = state.users.get(session.user_id) {
        state
            .events
            .record(Some(user.id), &user.name, ip, UserEventKind::Logout);
        tracing::info!(user = %user.name, ip = %ip, "user logged out");
    }

    Ok(StatusCode::NO_CONTENT)
}
