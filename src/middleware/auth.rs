use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;

use crate::auth::Session;
use crate::error::ApiError;
use crate::guards;
use crate::state::AppState;

/// Access rule applied to a group of routes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    /// Any valid session
    Authenticated,
    /// Approved landlords
    Landlord,
    /// Boarders that are not suspended
    Boarder,
    Admin,
}

/// Decide whether `session` satisfies `policy`.
pub fn authorize(policy: Policy, session: &Session) -> Result<(), ApiError> {
    let role = Some(session.role);
    let status = Some(session.status);

    match policy {
        Policy::Authenticated => Ok(()),
        Policy::Landlord => {
            if !guards::is_landlord(role) {
                Err(ApiError::forbidden("Landlord access required"))
            } else if guards::is_pending(status) {
                Err(ApiError::forbidden("Your landlord account is pending approval"))
            } else if guards::is_suspended(status) {
                Err(ApiError::forbidden("Your account is suspended"))
            } else if !guards::can_access_landlord_dashboard(role, status) {
                Err(ApiError::forbidden("Landlord access required"))
            } else {
                Ok(())
            }
        }
        Policy::Boarder => {
            if !guards::is_boarder(role) {
                Err(ApiError::forbidden("Boarder access required"))
            } else if !guards::can_access_boarder_portal(role, status) {
                Err(ApiError::forbidden("Your account is suspended"))
            } else {
                Ok(())
            }
        }
        Policy::Admin => {
            if guards::is_admin(role) {
                Ok(())
            } else {
                Err(ApiError::forbidden("Admin access required"))
            }
        }
    }
}

/// Bearer header first, then the session cookie.
pub fn session_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty());
    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    CookieJar::from_headers(headers)
        .get(cookie_name)
        .map(|cookie| cookie.value().to_string())
        .filter(|token| !token.is_empty())
}

async fn enforce(state: AppState, policy: Policy, mut request: Request, next: Next) -> Result<Response, ApiError> {
    let token = session_token(request.headers(), &state.config.security.session_cookie)
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

    let session = state.auth().authenticate(&token).await?;
    if let Err(e) = authorize(policy, &session) {
        tracing::debug!(subject = %session.subject, ?policy, reason = e.message(), "Request forbidden");
        return Err(e);
    }

    request.extensions_mut().insert(session);
    Ok(next.run(request).await)
}

pub async fn require_session(State(state): State<AppState>, request: Request, next: Next) -> Result<Response, ApiError> {
    enforce(state, Policy::Authenticated, request, next).await
}

pub async fn require_landlord(State(state): State<AppState>, request: Request, next: Next) -> Result<Response, ApiError> {
    enforce(state, Policy::Landlord, request, next).await
}

pub async fn require_boarder(State(state): State<AppState>, request: Request, next: Next) -> Result<Response, ApiError> {
    enforce(state, Policy::Boarder, request, next).await
}

pub async fn require_admin(State(state): State<AppState>, request: Request, next: Next) -> Result<Response, ApiError> {
    enforce(state, Policy::Admin, request, next).await
}

/// Handlers behind one of the `require_*` layers take the session as an
/// argument.
#[axum::async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Session {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))
    }
}
