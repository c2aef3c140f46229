mod common;

use anyhow::Result;
use axum::http::StatusCode;
use rust_decimal::Decimal;
use serde_json::{json, Value};

use common::{decimal, id_of, TestApp};

fn reading(room_id: &str, previous: &str, current: &str) -> Value {
    json!({
        "roomId": room_id,
        "type": "ELECTRICITY",
        "previousReading": previous,
        "currentReading": current,
        "ratePerUnit": "12.50",
        "periodStart": "2025-01-01",
        "periodEnd": "2025-01-31",
    })
}

#[tokio::test]
async fn meter_cannot_run_backwards() -> Result<()> {
    let app = TestApp::new();
    let token = app.landlord_token().await?;
    let room_id = id_of(&app.create_room(&token, "101", 2).await?);

    let res = app.post("/api/utilities", &token, reading(&room_id, "500", "450")).await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.field_error("currentReading").is_some());

    let mut body = reading(&room_id, "450", "500");
    body["periodEnd"] = json!("2024-12-01");
    let res = app.post("/api/utilities", &token, body).await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.field_error("periodEnd").is_some());

    let res = app.get("/api/utilities", &token).await?;
    assert_eq!(res.data(), &json!([]));
    Ok(())
}

#[tokio::test]
async fn reading_updates_are_rechecked_against_stored_values() -> Result<()> {
    let app = TestApp::new();
    let token = app.landlord_token().await?;
    let room_id = id_of(&app.create_room(&token, "101", 2).await?);

    let res = app.post("/api/utilities", &token, reading(&room_id, "100", "180")).await?;
    assert_eq!(res.status, StatusCode::CREATED);
    let id = id_of(res.data());

    let res = app
        .put(&format!("/api/utilities/{}", id), &token, json!({ "previousReading": "200" }))
        .await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.field_error("currentReading").is_some());

    let res = app
        .put(&format!("/api/utilities/{}", id), &token, json!({ "currentReading": "220" }))
        .await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(decimal(&res.data()["currentReading"]), Decimal::new(220, 0));

    let res = app.delete(&format!("/api/utilities/{}", id), &token).await?;
    assert_eq!(res.status, StatusCode::OK);
    let res = app.get(&format!("/api/utilities/{}", id), &token).await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn summary_totals_consumption_by_type() -> Result<()> {
    let app = TestApp::new();
    let token = app.landlord_token().await?;
    let room_id = id_of(&app.create_room(&token, "101", 2).await?);

    app.post("/api/utilities", &token, reading(&room_id, "100", "180")).await?;
    let mut water = reading(&room_id, "10", "14");
    water["type"] = json!("water");
    water["ratePerUnit"] = json!("30");
    app.post("/api/utilities", &token, water).await?;

    let res = app.get("/api/utilities/summary", &token).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["lines"].as_array().map(Vec::len), Some(2));
    // 80 units at 12.50 plus 4 units at 30
    assert_eq!(decimal(&res.data()["totalAmount"]), Decimal::new(1120, 0));
    assert_eq!(decimal(&res.data()["byType"]["ELECTRICITY"]["consumption"]), Decimal::new(80, 0));

    let res = app.get("/api/utilities/summary?type=WATER", &token).await?;
    assert_eq!(decimal(&res.data()["totalAmount"]), Decimal::new(120, 0));
    Ok(())
}

#[tokio::test]
async fn billing_splits_across_active_boarders() -> Result<()> {
    let app = TestApp::new();
    let token = app.landlord_token().await?;
    let room_id = id_of(&app.create_room(&token, "101", 3).await?);

    let res = app.post("/api/utilities", &token, reading(&room_id, "0", "80")).await?;
    let reading_id = id_of(res.data());

    let res = app
        .post(&format!("/api/utilities/{}/bill", reading_id), &token, json!({ "dueDate": "2025-02-10" }))
        .await?;
    assert_eq!(res.status, StatusCode::CONFLICT);

    for email in ["a@example.com", "b@example.com", "c@example.com"] {
        app.create_boarder(&token, email, Some(&room_id)).await?;
    }

    let res = app
        .post(&format!("/api/utilities/{}/bill", reading_id), &token, json!({ "dueDate": "2025-02-10" }))
        .await?;
    assert_eq!(res.status, StatusCode::CREATED);
    let payments = res.data().as_array().cloned().unwrap_or_default();
    assert_eq!(payments.len(), 3);

    // 1000.00 over three: 333.33, 333.33, 333.34
    let total: Decimal = payments.iter().map(|p| decimal(&p["amount"])).sum();
    assert_eq!(total, Decimal::new(1000, 0));
    for payment in &payments {
        assert_eq!(payment["type"], "UTILITY");
        assert_eq!(payment["status"], "PENDING");
        assert_eq!(payment["dueDate"], "2025-02-10");
        assert_eq!(
            payment["description"],
            "ELECTRICITY for room 101, 2025-01-01 to 2025-01-31"
        );
    }

    let res = app.get("/api/payments?type=UTILITY", &token).await?;
    assert_eq!(res.data().as_array().map(Vec::len), Some(3));
    Ok(())
}

#[tokio::test]
async fn readings_need_an_existing_room() -> Result<()> {
    let app = TestApp::new();
    let token = app.landlord_token().await?;
    let res = app
        .post("/api/utilities", &token, reading(&uuid::Uuid::new_v4().to_string(), "0", "1"))
        .await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn readings_beyond_column_range_are_rejected() -> Result<()> {
    let app = TestApp::new();
    let token = app.landlord_token().await?;
    let room_id = id_of(&app.create_room(&token, "101", 2).await?);

    let mut body = reading(&room_id, "0", "79228162514264337593543950335");
    body["ratePerUnit"] = json!("2");
    let res = app.post("/api/utilities", &token, body).await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.field_error("currentReading").is_some());

    let mut body = reading(&room_id, "0", "10");
    body["ratePerUnit"] = json!("0.00001");
    let res = app.post("/api/utilities", &token, body).await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.field_error("ratePerUnit").is_some());

    // Largest values the columns hold still total without overflow
    let mut body = reading(&room_id, "0", "99999999999.999");
    body["ratePerUnit"] = json!("99999999.9999");
    let res = app.post("/api/utilities", &token, body).await?;
    assert_eq!(res.status, StatusCode::CREATED);

    let res = app.get("/api/utilities/summary", &token).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["lines"].as_array().map(Vec::len), Some(1));
    Ok(())
}

#[tokio::test]
async fn a_reading_is_billed_once() -> Result<()> {
    let app = TestApp::new();
    let token = app.landlord_token().await?;
    let room_id = id_of(&app.create_room(&token, "101", 2).await?);
    let boarder_id = id_of(&app.create_boarder(&token, "a@example.com", Some(&room_id)).await?);

    let res = app.post("/api/utilities", &token, reading(&room_id, "0", "80")).await?;
    let reading_id = id_of(res.data());
    let bill = format!("/api/utilities/{}/bill", reading_id);

    let res = app.post(&bill, &token, json!({ "dueDate": "2025-02-10" })).await?;
    assert_eq!(res.status, StatusCode::CREATED);
    let res = app.post(&bill, &token, json!({ "dueDate": "2025-02-10" })).await?;
    assert_eq!(res.status, StatusCode::CONFLICT);

    let res = app.get(&format!("/api/payments?boarderId={}", boarder_id), &token).await?;
    assert_eq!(res.data().as_array().map(Vec::len), Some(1));

    let res = app.get(&format!("/api/utilities/{}", reading_id), &token).await?;
    assert!(res.data()["billedAt"].is_string());
    let res = app
        .put(&format!("/api/utilities/{}", reading_id), &token, json!({ "currentReading": "90" }))
        .await?;
    assert_eq!(res.status, StatusCode::CONFLICT);
    Ok(())
}
