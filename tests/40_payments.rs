mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use rust_decimal::Decimal;
use serde_json::json;

use boarding_api::events::{DomainEvent, EventKind};
use common::{decimal, id_of, TestApp};

#[tokio::test]
async fn payment_needs_an_existing_boarder() -> Result<()> {
    let app = TestApp::new();
    let token = app.landlord_token().await?;

    let res = app
        .post(
            "/api/payments",
            &token,
            json!({
                "boarderId": uuid::Uuid::new_v4(),
                "amount": "100",
                "type": "RENT",
                "dueDate": "2025-01-05",
            }),
        )
        .await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn payment_input_is_validated() -> Result<()> {
    let app = TestApp::new();
    let token = app.landlord_token().await?;
    let boarder = id_of(&app.create_boarder(&token, "ana@example.com", None).await?);

    let res = app
        .post(
            "/api/payments",
            &token,
            json!({ "boarderId": boarder, "amount": "0", "type": "TIP", "dueDate": "soon" }),
        )
        .await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.field_error("type").is_some());
    assert!(res.field_error("dueDate").is_some());

    let res = app
        .post(
            "/api/payments",
            &token,
            json!({ "boarderId": boarder, "amount": "0", "type": "rent", "dueDate": "2025-01-05" }),
        )
        .await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.field_error("amount").is_some());

    // Money is stored in cents below ten billion
    for amount in ["0.001", "10000000000", "79228162514264337593543950335"] {
        let res = app
            .post(
                "/api/payments",
                &token,
                json!({ "boarderId": boarder, "amount": amount, "type": "RENT", "dueDate": "2025-01-05" }),
            )
            .await?;
        assert_eq!(res.status, StatusCode::BAD_REQUEST, "{} accepted", amount);
        assert!(res.field_error("amount").is_some());
    }
    let res = app.get("/api/payments", &token).await?;
    assert_eq!(res.data(), &json!([]));
    Ok(())
}

#[tokio::test]
async fn cancelled_payment_can_still_be_marked_paid() -> Result<()> {
    let app = TestApp::new();
    let token = app.landlord_token().await?;
    let boarder = id_of(&app.create_boarder(&token, "ana@example.com", None).await?);
    let id = id_of(&app.create_payment(&token, &boarder, "4500", "2025-01-05").await?);

    let res = app
        .put(&format!("/api/payments/{}", id), &token, json!({ "status": "CANCELLED" }))
        .await?;
    assert_eq!(res.data()["status"], "CANCELLED");

    let res = app
        .post(
            &format!("/api/payments/{}/paid", id),
            &token,
            json!({ "paidDate": "2025-01-04T10:00:00Z" }),
        )
        .await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["status"], "PAID");
    assert!(res.data()["paidDate"].as_str().unwrap_or_default().starts_with("2025-01-04T10:00:00"));

    let previous = app.events.events().await.into_iter().find_map(|event| match event {
        DomainEvent::PaymentPaid { previous_status, .. } => Some(previous_status.to_string()),
        _ => None,
    });
    assert_eq!(previous.as_deref(), Some("CANCELLED"));
    Ok(())
}

#[tokio::test]
async fn marking_paid_without_a_date_uses_now() -> Result<()> {
    let app = TestApp::new();
    let token = app.landlord_token().await?;
    let boarder = id_of(&app.create_boarder(&token, "ana@example.com", None).await?);
    let id = id_of(&app.create_payment(&token, &boarder, "4500", "2025-01-05").await?);

    let res = app
        .call(Method::POST, &format!("/api/payments/{}/paid", id), Some(&token), None)
        .await?;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.data()["paidDate"].is_string());
    Ok(())
}

#[tokio::test]
async fn overdue_sweep_only_touches_past_pending_payments() -> Result<()> {
    let app = TestApp::new();
    let token = app.landlord_token().await?;
    let boarder = id_of(&app.create_boarder(&token, "ana@example.com", None).await?);

    let late = id_of(&app.create_payment(&token, &boarder, "100", "2020-01-01").await?);
    let future = id_of(&app.create_payment(&token, &boarder, "200", "2999-01-01").await?);
    let paid = id_of(&app.create_payment(&token, &boarder, "300", "2020-02-01").await?);
    app.call(Method::POST, &format!("/api/payments/{}/paid", paid), Some(&token), None)
        .await?;

    let res = app.call(Method::POST, "/api/payments/overdue", Some(&token), None).await?;
    assert_eq!(res.status, StatusCode::OK);
    let changed = res.data().as_array().cloned().unwrap_or_default();
    assert_eq!(changed.len(), 1);
    assert_eq!(id_of(&changed[0]), late);

    let res = app.get(&format!("/api/payments/{}", future), &token).await?;
    assert_eq!(res.data()["status"], "PENDING");
    assert!(app.events.kinds().await.contains(&EventKind::PaymentsMarkedOverdue));

    let res = app.call(Method::POST, "/api/payments/overdue", Some(&token), None).await?;
    assert_eq!(res.data().as_array().map(Vec::len), Some(0));
    Ok(())
}

#[tokio::test]
async fn summary_groups_by_status() -> Result<()> {
    let app = TestApp::new();
    let token = app.landlord_token().await?;
    let ana = id_of(&app.create_boarder(&token, "ana@example.com", None).await?);
    let ben = id_of(&app.create_boarder(&token, "ben@example.com", None).await?);

    app.create_payment(&token, &ana, "1000.50", "2025-01-05").await?;
    app.create_payment(&token, &ana, "999.50", "2025-02-05").await?;
    let paid = id_of(&app.create_payment(&token, &ben, "700", "2025-01-05").await?);
    app.call(Method::POST, &format!("/api/payments/{}/paid", paid), Some(&token), None)
        .await?;

    let res = app.get("/api/payments/summary", &token).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["pending"]["count"], 2);
    assert_eq!(decimal(&res.data()["pending"]["total"]), Decimal::new(2000, 0));
    assert_eq!(res.data()["paid"]["count"], 1);

    let res = app.get(&format!("/api/payments/summary?boarderId={}", ben), &token).await?;
    assert_eq!(res.data()["pending"]["count"], 0);
    assert_eq!(res.data()["paid"]["count"], 1);

    let res = app.get("/api/payments?status=PENDING&dueFrom=2025-02-01", &token).await?;
    assert_eq!(res.data().as_array().map(Vec::len), Some(1));

    let res = app.get("/api/dashboard", &token).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["activeBoarders"], 2);
    assert_eq!(decimal(&res.data()["outstanding"]), Decimal::new(2000, 0));
    Ok(())
}

#[tokio::test]
async fn bad_filters_are_validation_errors() -> Result<()> {
    let app = TestApp::new();
    let token = app.landlord_token().await?;
    let res = app.get("/api/payments?status=LATE", &token).await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.error_kind(), "VALIDATION");
    Ok(())
}
