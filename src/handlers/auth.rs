use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use tower_cookies::Cookies;

use crate::{
    error::Result,
    middleware_layer::auth::{is_valid, revoke_request, AuthenticatedIdentity},
    state::AppState,
    validation::identity::validate_username,
};

/// The request payload for login.
///
/// The caller is expected to have authenticated the principal already;
/// this endpoint only opens the session.
#[derive(Deserialize, Debug)]
pub struct LoginRequest {
    pub username: String,
}

/// The response payload for authentication-related requests.
#[derive(Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Serialize)]
pub struct SessionStatus {
    pub authenticated: bool,
}

#[derive(Serialize)]
pub struct WhoAmI {
    pub identity: String,
}

/// Handles login by issuing a fresh session for the user.
#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    cookies: Cookies,
    Json(payload): Json<LoginRequest>,
) -> Result<Response> {
    validate_username(&payload.username)?;
    tracing::info!("🔐 Login attempt for: {}", payload.username);

    let credential = state.sessions.issue(&payload.username)?;
    cookies.add(credential.to_cookie());

    tracing::info!("✅ User logged in: {}", payload.username);

    let response = AuthResponse {
        success: true,
        message: "Login successful".to_string(),
    };

    Ok((StatusCode::OK, Json(response)).into_response())
}

/// Handles logout. Always answers with a clearing cookie, even when the
/// request carried no session.
#[axum::debug_handler]
pub async fn logout(
    State(state): State<AppState>,
    cookies: Cookies,
) -> Result<Response> {
    let clearing = revoke_request(&state.sessions, &cookies);
    cookies.add(clearing.to_cookie());

    let response = AuthResponse {
        success: true,
        message: "Logout successful".to_string(),
    };

    Ok((StatusCode::OK, Json(response)).into_response())
}

/// Reports whether the request carries a valid session.
pub async fn session_status(
    State(state): State<AppState>,
    cookies: Cookies,
) -> Json<SessionStatus> {
    Json(SessionStatus {
        authenticated: is_valid(&state.sessions, &cookies),
    })
}

/// Returns the identity bound to the current session.
pub async fn whoami(Extension(identity): Extension<AuthenticatedIdentity>) -> Json<WhoAmI> {
    Json(WhoAmI {
        identity: identity.0,
    })
}
