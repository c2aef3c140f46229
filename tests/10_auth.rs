mod common;

use anyhow::Result;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use serde_json::json;

use boarding_api::config::AppConfig;
use common::{TestApp, PASSWORD};

#[tokio::test]
async fn health_and_banner_respond() -> Result<()> {
    let app = TestApp::new();

    let res = app.call(Method::GET, "/health", None, None).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["status"], "ok");

    let res = app.call(Method::GET, "/", None, None).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["success"], true);
    assert_eq!(res.data()["name"], "boarding-api");
    Ok(())
}

#[tokio::test]
async fn new_landlord_is_pending_until_approved() -> Result<()> {
    let app = TestApp::new();

    let res = app.register("Owner@Example.com", "LANDLORD").await?;
    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(res.data()["user"]["email"], "owner@example.com");
    assert_eq!(res.data()["user"]["status"], "PENDING");
    assert_eq!(res.data()["profile"]["kind"], "LANDLORD");
    assert!(res.data()["user"].get("passwordHash").is_none());

    let res = app.login("owner@example.com", PASSWORD).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["redirectTo"], "/pending-approval");
    let token = res.data()["token"].as_str().unwrap_or_default().to_string();

    let res = app.get("/api/rooms", &token).await?;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    assert_eq!(res.body["error"]["message"], "Your landlord account is pending approval");
    Ok(())
}

#[tokio::test]
async fn approval_applies_to_existing_sessions() -> Result<()> {
    let app = TestApp::new();
    let res = app.register("owner@example.com", "LANDLORD").await?;
    let user_id = common::id_of(&res.data()["user"]);
    let token = app.token_for("owner@example.com").await?;

    let admin = app.admin_token().await?;
    let res = app
        .put(&format!("/api/admin/users/{}", user_id), &admin, json!({ "status": "APPROVED" }))
        .await?;
    assert_eq!(res.status, StatusCode::OK);

    let res = app.get("/api/rooms", &token).await?;
    assert_eq!(res.status, StatusCode::OK);
    let res = app.get("/api/session", &token).await?;
    assert_eq!(res.data()["redirectTo"], "/landlord/dashboard");
    Ok(())
}

#[tokio::test]
async fn duplicate_registration_conflicts_and_keeps_one_account() -> Result<()> {
    let app = TestApp::new();
    assert_eq!(app.register("dup@example.com", "BOARDER").await?.status, StatusCode::CREATED);

    let res = app.register("DUP@example.com", "LANDLORD").await?;
    assert_eq!(res.status, StatusCode::CONFLICT);
    assert_eq!(res.error_kind(), "CONFLICT");

    let admin = app.admin_token().await?;
    let res = app.get("/api/admin/users?search=dup@", &admin).await?;
    let users = res.data().as_array().cloned().unwrap_or_default();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["role"], "BOARDER");
    Ok(())
}

#[tokio::test]
async fn registration_reports_every_bad_field() -> Result<()> {
    let app = TestApp::new();
    let res = app
        .call(
            Method::POST,
            "/auth/register",
            None,
            Some(json!({
                "email": "nope",
                "password": "short",
                "role": "LANDLORD",
                "firstName": "",
                "lastName": "Cruz",
            })),
        )
        .await?;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.error_kind(), "VALIDATION");
    for field in ["email", "password", "firstName"] {
        assert!(res.field_error(field).is_some(), "missing error for {}", field);
    }
    assert!(res.field_error("lastName").is_none());
    Ok(())
}

#[tokio::test]
async fn registration_shape_errors_name_the_fields() -> Result<()> {
    let app = TestApp::new();
    let res = app
        .call(
            Method::POST,
            "/auth/register",
            None,
            Some(json!({ "email": "a@example.com", "password": PASSWORD, "role": "OWNER" })),
        )
        .await?;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    for field in ["role", "firstName", "lastName"] {
        assert!(res.field_error(field).is_some(), "missing error for {}", field);
    }
    Ok(())
}

#[tokio::test]
async fn admin_cannot_self_register() -> Result<()> {
    let app = TestApp::new();
    let res = app.register("root@example.com", "ADMIN").await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.field_error("role").is_some());
    Ok(())
}

#[tokio::test]
async fn registration_can_be_disabled() -> Result<()> {
    let mut config = AppConfig::development();
    config.api.allow_registration = false;
    let app = TestApp::with_config(config);

    let res = app.register("owner@example.com", "LANDLORD").await?;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn bad_credentials_are_unauthorized() -> Result<()> {
    let app = TestApp::new();
    app.register("owner@example.com", "LANDLORD").await?;

    let wrong = app.login("owner@example.com", "not-the-password").await?;
    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);
    let unknown = app.login("ghost@example.com", PASSWORD).await?;
    assert_eq!(unknown.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong.body["error"]["message"], unknown.body["error"]["message"]);
    Ok(())
}

#[tokio::test]
async fn protected_routes_need_a_valid_token() -> Result<()> {
    let app = TestApp::new();

    let res = app.call(Method::GET, "/api/session", None, None).await?;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    let res = app.get("/api/session", "not-a-jwt").await?;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.error_kind(), "UNAUTHORIZED");
    Ok(())
}

#[tokio::test]
async fn session_cookie_authenticates_and_logout_clears_it() -> Result<()> {
    let app = TestApp::new();
    app.register("owner@example.com", "LANDLORD").await?;
    let res = app.login("owner@example.com", PASSWORD).await?;

    let set_cookie = res
        .headers
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(set_cookie.starts_with("session="));
    assert!(set_cookie.contains("HttpOnly"));
    let pair = set_cookie.split(';').next().unwrap_or_default().to_string();

    let request = Request::builder()
        .uri("/api/session")
        .header(header::COOKIE, pair)
        .body(Body::empty())?;
    let res = app.send(request).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["session"]["email"], "owner@example.com");
    assert_eq!(res.data()["session"]["method"], "password");

    let res = app.call(Method::POST, "/auth/logout", None, None).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["redirectTo"], "/login");
    let cleared = res
        .headers
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    assert!(cleared.starts_with("session="));
    assert!(cleared.contains("Max-Age=0"));
    Ok(())
}

#[tokio::test]
async fn password_change_checks_current_password() -> Result<()> {
    let app = TestApp::new();
    app.register("owner@example.com", "LANDLORD").await?;
    let token = app.token_for("owner@example.com").await?;

    let res = app
        .put(
            "/api/session/password",
            &token,
            json!({ "currentPassword": "wrong-one", "newPassword": "new-password-9" }),
        )
        .await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.field_error("currentPassword").is_some());

    let res = app
        .put(
            "/api/session/password",
            &token,
            json!({ "currentPassword": PASSWORD, "newPassword": "new-password-9" }),
        )
        .await?;
    assert_eq!(res.status, StatusCode::OK);

    assert_eq!(app.login("owner@example.com", PASSWORD).await?.status, StatusCode::UNAUTHORIZED);
    assert_eq!(app.login("owner@example.com", "new-password-9").await?.status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn redirect_follows_role_and_status() -> Result<()> {
    let app = TestApp::new();
    let cases = [
        ("/auth/redirect?role=landlord&status=pending", "/pending-approval"),
        ("/auth/redirect?role=BOARDER&status=SUSPENDED", "/suspended"),
        ("/auth/redirect?role=LANDLORD&status=APPROVED", "/landlord/dashboard"),
        ("/auth/redirect?role=ADMIN", "/admin/dashboard"),
        ("/auth/redirect?status=APPROVED", "/login"),
        ("/auth/redirect?role=janitor", "/login"),
    ];
    for (uri, expected) in cases {
        let res = app.call(Method::GET, uri, None, None).await?;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.data()["redirectTo"], expected, "{}", uri);
    }
    Ok(())
}
