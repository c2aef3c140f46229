#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::body::{to_bytes, Body};
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use boarding_api::config::AppConfig;
use boarding_api::database::{MemoryStore, Store};
use boarding_api::events::RecordingEventBus;
use boarding_api::routes;
use boarding_api::state::AppState;

pub const PASSWORD: &str = "correct-horse-1";

/// Router over the in-memory store with a recording event bus
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub events: Arc<RecordingEventBus>,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    pub fn data(&self) -> &Value {
        &self.body["data"]
    }

    pub fn error_kind(&self) -> &str {
        self.body["error"]["kind"].as_str().unwrap_or_default()
    }

    pub fn field_error(&self, field: &str) -> Option<&Value> {
        self.body["error"]["fieldErrors"].get(field)
    }
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(AppConfig::development())
    }

    pub fn with_config(config: AppConfig) -> Self {
        let events = Arc::new(RecordingEventBus::new());
        let state = AppState::new(Arc::new(MemoryStore::new()), events.clone(), Arc::new(config));
        Self {
            router: routes::app(state.clone()),
            state,
            events,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Result<TestResponse> {
        let response = self.router.clone().oneshot(request).await.context("router failed")?;
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into()))
        };
        Ok(TestResponse { status, headers, body })
    }

    pub async fn call(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Result<TestResponse> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))?,
            None => builder.body(Body::empty())?,
        };
        self.send(request).await
    }

    pub async fn get(&self, uri: &str, token: &str) -> Result<TestResponse> {
        self.call(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> Result<TestResponse> {
        self.call(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: &str, body: Value) -> Result<TestResponse> {
        self.call(Method::PUT, uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> Result<TestResponse> {
        self.call(Method::DELETE, uri, Some(token), None).await
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<TestResponse> {
        self.call(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({ "email": email, "password": password })),
        )
        .await
    }

    pub async fn token_for(&self, email: &str) -> Result<String> {
        let res = self.login(email, PASSWORD).await?;
        anyhow::ensure!(res.status == StatusCode::OK, "login failed: {}", res.body);
        res.data()["token"]
            .as_str()
            .map(str::to_string)
            .context("login response has no token")
    }

    pub async fn register(&self, email: &str, role: &str) -> Result<TestResponse> {
        self.call(
            Method::POST,
            "/auth/register",
            None,
            Some(json!({
                "email": email,
                "password": PASSWORD,
                "role": role,
                "firstName": "Test",
                "lastName": "User",
            })),
        )
        .await
    }

    pub async fn admin_token(&self) -> Result<String> {
        let email = "admin@example.com";
        if self.state.store().find_user_by_email(email).await?.is_none() {
            self.state
                .users()
                .create_admin(email, PASSWORD)
                .await
                .map_err(|e| anyhow::anyhow!("{}", e))?;
        }
        self.token_for(email).await
    }

    /// Register, approve and log in a landlord
    pub async fn landlord_token(&self) -> Result<String> {
        let email = "landlord@example.com";
        let res = self.register(email, "LANDLORD").await?;
        anyhow::ensure!(res.status == StatusCode::CREATED, "register failed: {}", res.body);
        let user_id = res.data()["user"]["id"].as_str().context("no user id")?.to_string();

        let admin = self.admin_token().await?;
        let res = self
            .put(&format!("/api/admin/users/{}", user_id), &admin, json!({ "status": "APPROVED" }))
            .await?;
        anyhow::ensure!(res.status == StatusCode::OK, "approval failed: {}", res.body);

        self.token_for(email).await
    }

    pub async fn create_room(&self, token: &str, room_number: &str, capacity: i32) -> Result<Value> {
        let res = self
            .post(
                "/api/rooms",
                token,
                json!({
                    "roomNumber": room_number,
                    "floor": 1,
                    "capacity": capacity,
                    "monthlyRate": "4500.00",
                }),
            )
            .await?;
        anyhow::ensure!(res.status == StatusCode::CREATED, "create room failed: {}", res.body);
        Ok(res.data().clone())
    }

    pub async fn create_boarder(&self, token: &str, email: &str, room_id: Option<&str>) -> Result<Value> {
        let mut body = json!({
            "firstName": "Ana",
            "lastName": "Reyes",
            "email": email,
            "moveInDate": "2025-01-01",
        });
        if let Some(room_id) = room_id {
            body["roomId"] = json!(room_id);
        }
        let res = self.post("/api/boarders", token, body).await?;
        anyhow::ensure!(res.status == StatusCode::CREATED, "create boarder failed: {}", res.body);
        Ok(res.data().clone())
    }

    pub async fn create_payment(&self, token: &str, boarder_id: &str, amount: &str, due_date: &str) -> Result<Value> {
        let res = self
            .post(
                "/api/payments",
                token,
                json!({
                    "boarderId": boarder_id,
                    "amount": amount,
                    "type": "RENT",
                    "dueDate": due_date,
                }),
            )
            .await?;
        anyhow::ensure!(res.status == StatusCode::CREATED, "create payment failed: {}", res.body);
        Ok(res.data().clone())
    }
}

pub fn id_of(value: &Value) -> String {
    value["id"].as_str().unwrap_or_default().to_string()
}

pub fn decimal(value: &Value) -> rust_decimal::Decimal {
    match value {
        Value::String(s) => s.parse().unwrap_or_default(),
        other => other.to_string().parse().unwrap_or_default(),
    }
}
