// handlers/public/auth.rs - session acquisition
//
// POST /auth/register, POST /auth/login, POST /auth/access-code,
// POST /auth/logout, GET /auth/redirect

use axum::extract::{Query, State};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};

use crate::config::SecurityConfig;
use crate::database::models::RegisteredUser;
use crate::error::ApiError;
use crate::guards;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::SessionGrant;
use crate::state::AppState;
use crate::types::{Role, UserStatus};
use crate::validation::inputs::{AccessCodeInput, LoginInput, RegisterInput};
use crate::validation::ValidatedJson;

/// POST /auth/register - create a landlord or boarder account
pub async fn register_post(
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<RegisterInput>,
) -> ApiResult<RegisteredUser> {
    let registered = state.auth().register(input).await?;
    Ok(ApiResponse::created(registered))
}

/// POST /auth/login - email and password
pub async fn login_post(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedJson(input): ValidatedJson<LoginInput>,
) -> Result<(CookieJar, ApiResponse<SessionGrant>), ApiError> {
    let grant = state.auth().login(input).await?;
    let jar = jar.add(session_cookie(&state.config.security, grant.token.clone()));
    Ok((jar, ApiResponse::success(grant)))
}

/// POST /auth/access-code - boarder portal entry
pub async fn access_code_post(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedJson(input): ValidatedJson<AccessCodeInput>,
) -> Result<(CookieJar, ApiResponse<SessionGrant>), ApiError> {
    let grant = state.auth().redeem_access_code(input).await?;
    let jar = jar.add(session_cookie(&state.config.security, grant.token.clone()));
    Ok((jar, ApiResponse::success(grant)))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggedOut {
    pub logged_out: bool,
    pub redirect_to: &'static str,
}

/// POST /auth/logout - clear the session cookie. Tokens are stateless, so a
/// bearer token stays valid until it expires.
pub async fn logout_post(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, ApiResponse<LoggedOut>) {
    let removal = Cookie::build((state.config.security.session_cookie.clone(), "")).path("/");
    (
        jar.remove(removal),
        ApiResponse::success(LoggedOut {
            logged_out: true,
            redirect_to: guards::LOGIN_PATH,
        }),
    )
}

#[derive(Debug, Default, Deserialize)]
pub struct RedirectQuery {
    pub role: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Redirect {
    pub redirect_to: &'static str,
}

/// GET /auth/redirect?role=&status= - unknown values count as absent
pub async fn redirect_get(Query(query): Query<RedirectQuery>) -> ApiResponse<Redirect> {
    let role = Role::parse(query.role.as_deref());
    let status = UserStatus::parse(query.status.as_deref());
    ApiResponse::success(Redirect {
        redirect_to: guards::redirect_url(role, status),
    })
}

pub(crate) fn session_cookie(security: &SecurityConfig, token: String) -> Cookie<'static> {
    Cookie::build((security.session_cookie.clone(), token))
        .path("/")
        .http_only(true)
        .secure(security.require_https)
        .same_site(SameSite::Lax)
        .build()
}
