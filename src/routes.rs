use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};

use crate::config::SecurityConfig;
use crate::handlers::{elevated, protected, public};
use crate::middleware::{require_admin, require_boarder, require_landlord, require_session};
use crate::state::AppState;

/// Build the full application router.
pub fn app(state: AppState) -> Router {
    let api = &state.config.api;
    let security = &state.config.security;

    let mut router = Router::new()
        // Public
        .merge(public_routes())
        // Protected API, one guard per tier
        .merge(session_routes().route_layer(from_fn_with_state(state.clone(), require_session)))
        .merge(landlord_routes().route_layer(from_fn_with_state(state.clone(), require_landlord)))
        .merge(portal_routes().route_layer(from_fn_with_state(state.clone(), require_boarder)))
        .merge(admin_routes().route_layer(from_fn_with_state(state.clone(), require_admin)))
        // Global middleware
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(api.max_request_size_bytes));

    if security.enable_cors {
        router = router.layer(cors_layer(security));
    }
    if api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }

    router.with_state(state)
}

fn public_routes() -> Router<AppState> {
    use public::{auth, health};

    Router::new()
        .route("/", get(health::root_get))
        .route("/health", get(health::health_get))
        .route("/auth/register", post(auth::register_post))
        .route("/auth/login", post(auth::login_post))
        .route("/auth/access-code", post(auth::access_code_post))
        .route("/auth/logout", post(auth::logout_post))
        .route("/auth/redirect", get(auth::redirect_get))
}

fn session_routes() -> Router<AppState> {
    use protected::session;

    Router::new()
        .route("/api/session", get(session::session_get))
        .route("/api/session/password", put(session::password_put))
}

fn landlord_routes() -> Router<AppState> {
    use protected::{boarders, dashboard, payments, rooms, utilities};

    Router::new()
        .route("/api/dashboard", get(dashboard::dashboard_get))
        // Rooms
        .route("/api/rooms", get(rooms::rooms_get).post(rooms::rooms_post))
        .route(
            "/api/rooms/:id",
            get(rooms::room_get).put(rooms::room_put).delete(rooms::room_delete),
        )
        // Boarders
        .route("/api/boarders", get(boarders::boarders_get).post(boarders::boarders_post))
        .route(
            "/api/boarders/:id",
            get(boarders::boarder_get)
                .put(boarders::boarder_put)
                .delete(boarders::boarder_delete),
        )
        .route("/api/boarders/:id/assign", post(boarders::assign_post))
        .route("/api/boarders/:id/unassign", post(boarders::unassign_post))
        .route("/api/boarders/:id/move-out", post(boarders::move_out_post))
        .route("/api/boarders/:id/access-code", post(boarders::access_code_post))
        // Payments
        .route("/api/payments", get(payments::payments_get).post(payments::payments_post))
        .route("/api/payments/summary", get(payments::summary_get))
        .route("/api/payments/overdue", post(payments::overdue_post))
        .route(
            "/api/payments/:id",
            get(payments::payment_get)
                .put(payments::payment_put)
                .delete(payments::payment_delete),
        )
        .route("/api/payments/:id/paid", post(payments::paid_post))
        // Utility readings
        .route("/api/utilities", get(utilities::readings_get).post(utilities::readings_post))
        .route("/api/utilities/summary", get(utilities::summary_get))
        .route(
            "/api/utilities/:id",
            get(utilities::reading_get)
                .put(utilities::reading_put)
                .delete(utilities::reading_delete),
        )
        .route("/api/utilities/:id/bill", post(utilities::bill_post))
}

fn portal_routes() -> Router<AppState> {
    use protected::portal;

    Router::new()
        .route("/api/portal/me", get(portal::me_get))
        .route("/api/portal/payments", get(portal::payments_get))
}

fn admin_routes() -> Router<AppState> {
    use elevated::users;

    Router::new()
        .route("/api/admin/users", get(users::users_get))
        .route("/api/admin/users/:id", get(users::user_get).put(users::user_put))
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}
