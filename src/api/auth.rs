//! Authentication API endpoints
//!
//! Handles HTTP requests for session management:
//! - POST /api/auth/login - Log in with an access code
//! - POST /api/auth/logout - End the current session
//! - GET /api/auth/check - Report whether the request carries a live session

use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::api::middleware::{session_token_from_headers, ApiError, AppState};
use crate::api::responses::SuccessResponse;
use crate::models::Session;
use crate::services::auth::SESSION_EXPIRATION_HOURS;
use crate::services::AuthServiceError;

/// Cookie lifetime in seconds, matching the session expiration
const SESSION_COOKIE_MAX_AGE: i64 = SESSION_EXPIRATION_HOURS * 60 * 60;

/// Request body for login.
///
/// The code is optional at this level so its absence surfaces as a
/// validation error instead of a deserialization failure.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub code: Option<String>,
}

/// User info projected from a session
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub login: String,
    pub perfil: String,
}

impl From<Session> for UserResponse {
    fn from(session: Session) -> Self {
        Self {
            id: session.user_id,
            login: session.login,
            perfil: session.profile_name,
        }
    }
}

/// Response for a successful login
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub user: UserResponse,
}

/// Response for a session check
#[derive(Debug, Serialize)]
pub struct CheckResponse {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserResponse>,
}

/// Build the authentication routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/check", get(check))
}

/// POST /api/auth/login
///
/// Authenticates an access code and opens a session. The token travels back
/// as an HttpOnly cookie; API clients may also present it as a bearer token.
async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let code = body.code.unwrap_or_default();

    let session = state.auth_service.login(&code).await.map_err(|e| match e {
        AuthServiceError::ValidationError(msg) => ApiError::validation_error(msg),
        AuthServiceError::AuthenticationError(msg) => {
            tracing::warn!("Login rejected for unrecognized access code");
            ApiError::unauthorized(msg)
        }
        AuthServiceError::InternalError(e) => {
            tracing::error!("Login failed: {}", e);
            ApiError::internal_error("Internal server error")
        }
    })?;

    let cookie = format!(
        "session={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        session.id, SESSION_COOKIE_MAX_AGE
    );
    let mut headers = HeaderMap::new();
    headers.insert(header::SET_COOKIE, HeaderValue::from_str(&cookie).unwrap());

    Ok((
        headers,
        Json(LoginResponse {
            success: true,
            user: session.into(),
        }),
    ))
}

/// POST /api/auth/logout
///
/// Ends the session named by the request, if any, and clears the cookie.
/// Always answers with success so repeated logouts are harmless.
async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(token) = session_token_from_headers(&headers) {
        state.auth_service.logout(&token).await.map_err(|e| {
            tracing::error!("Logout failed: {}", e);
            ApiError::internal_error("Internal server error")
        })?;
    }

    let mut headers = HeaderMap::new();
    headers.insert(
        header::SET_COOKIE,
        HeaderValue::from_static("session=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0"),
    );

    Ok((headers, Json(SuccessResponse { success: true })))
}

/// GET /api/auth/check
///
/// Reports whether the request carries a live session. Never answers 401;
/// the client uses this on startup to decide which screen to show.
async fn check(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<CheckResponse>, ApiError> {
    let session = match session_token_from_headers(&headers) {
        Some(token) => state
            .auth_service
            .validate_session(&token)
            .await
            .map_err(|e| {
                tracing::error!("Session check failed: {}", e);
                ApiError::internal_error("Internal server error")
            })?,
        None => None,
    };

    Ok(Json(CheckResponse {
        authenticated: session.is_some(),
        user: session.map(UserResponse::from),
    }))
}
