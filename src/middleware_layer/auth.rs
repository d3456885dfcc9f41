use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use tower_cookies::Cookies;

use crate::{
    error::AppError,
    models::session::{parse_credential, Credential, SESSION_COOKIE_NAME},
    session::store::SessionStore,
    state::AppState,
};

/// The identity of a request that passed `require_auth`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedIdentity(pub String);

/// Extracts the session credential from the request cookies.
///
/// # Arguments
///
/// * `cookies` - The request cookies.
///
/// # Returns
///
/// An `Option` containing the raw credential value if present.
pub fn extract_credential(cookies: &Cookies) -> Option<String> {
    cookies
        .get(SESSION_COOKIE_NAME)
        .map(|cookie| cookie.value().to_string())
}

/// Whether the request carries a valid session.
pub fn is_valid(store: &SessionStore, cookies: &Cookies) -> bool {
    store.validate(extract_credential(cookies).as_deref())
}

/// Revokes the session named by the request's credential and returns the
/// credential that clears it on the client.
pub fn revoke_request(store: &SessionStore, cookies: &Cookies) -> Credential {
    store.revoke(extract_credential(cookies).as_deref())
}

/// A middleware that requires a valid session to be present.
///
/// # Arguments
///
/// * `state` - The application state.
/// * `cookies` - The request cookies.
/// * `request` - The incoming request.
/// * `next` - The next middleware in the chain.
///
/// # Returns
///
/// A `Response` or `AppError::Unauthenticated`.
pub async fn require_auth(
    State(state): State<AppState>,
    cookies: Cookies,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    tracing::debug!("🔐 Checking authentication...");

    let credential = extract_credential(&cookies).ok_or_else(|| {
        tracing::debug!("❌ No session cookie found");
        AppError::Unauthenticated
    })?;

    if !state.sessions.validate(Some(&credential)) {
        tracing::debug!("❌ Session rejected");
        return Err(AppError::Unauthenticated);
    }

    let identity = parse_credential(&credential)
        .map(|(identity, _)| identity.to_string())
        .ok_or(AppError::Unauthenticated)?;

    tracing::debug!("✅ User authenticated: {}", identity);
    request.extensions_mut().insert(AuthenticatedIdentity(identity));

    Ok(next.run(request).await)
}
