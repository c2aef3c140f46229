mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;

use boarding_api::events::EventKind;
use common::{id_of, TestApp};

#[tokio::test]
async fn room_crud_round_trip() -> Result<()> {
    let app = TestApp::new();
    let token = app.landlord_token().await?;

    let room = app.create_room(&token, "101", 2).await?;
    assert_eq!(room["status"], "AVAILABLE");
    assert_eq!(common::decimal(&room["monthlyRate"]), "4500".parse()?);
    let id = id_of(&room);

    let res = app
        .put(&format!("/api/rooms/{}", id), &token, json!({ "monthlyRate": 5000, "description": "Corner" }))
        .await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(common::decimal(&res.data()["monthlyRate"]), "5000".parse()?);
    assert_eq!(res.data()["roomNumber"], "101");

    let res = app.get(&format!("/api/rooms/{}", id), &token).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["description"], "Corner");
    assert_eq!(res.data()["occupants"], json!([]));

    let res = app.delete(&format!("/api/rooms/{}", id), &token).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["deleted"], true);

    let res = app.get(&format!("/api/rooms/{}", id), &token).await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);

    let kinds = app.events.kinds().await;
    assert!(kinds.contains(&EventKind::RoomCreated));
    assert!(kinds.contains(&EventKind::RoomUpdated));
    assert!(kinds.contains(&EventKind::RoomDeleted));
    Ok(())
}

#[tokio::test]
async fn room_numbers_are_unique() -> Result<()> {
    let app = TestApp::new();
    let token = app.landlord_token().await?;
    app.create_room(&token, "201", 1).await?;

    let res = app
        .post(
            "/api/rooms",
            &token,
            json!({ "roomNumber": "201", "floor": 2, "capacity": 1, "monthlyRate": "3000" }),
        )
        .await?;
    assert_eq!(res.status, StatusCode::CONFLICT);
    Ok(())
}

#[tokio::test]
async fn room_input_is_validated() -> Result<()> {
    let app = TestApp::new();
    let token = app.landlord_token().await?;

    let res = app
        .post(
            "/api/rooms",
            &token,
            json!({ "roomNumber": "", "floor": 1, "capacity": 0, "monthlyRate": "-1" }),
        )
        .await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    for field in ["roomNumber", "capacity", "monthlyRate"] {
        assert!(res.field_error(field).is_some(), "missing error for {}", field);
    }

    let res = app.get("/api/rooms/not-a-uuid", &token).await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.field_error("id").is_some());
    Ok(())
}

#[tokio::test]
async fn status_follows_occupancy_and_blocks_deletes() -> Result<()> {
    let app = TestApp::new();
    let token = app.landlord_token().await?;
    let room = app.create_room(&token, "301", 1).await?;
    let room_id = id_of(&room);

    app.create_boarder(&token, "ana@example.com", Some(&room_id)).await?;

    let res = app.get(&format!("/api/rooms/{}", room_id), &token).await?;
    assert_eq!(res.data()["status"], "OCCUPIED");
    assert_eq!(res.data()["occupants"].as_array().map(Vec::len), Some(1));

    let res = app.get("/api/rooms?status=OCCUPIED", &token).await?;
    assert_eq!(res.data().as_array().map(Vec::len), Some(1));

    let res = app.delete(&format!("/api/rooms/{}", room_id), &token).await?;
    assert_eq!(res.status, StatusCode::CONFLICT);

    let res = app
        .put(&format!("/api/rooms/{}", room_id), &token, json!({ "capacity": 3 }))
        .await?;
    assert_eq!(res.data()["status"], "AVAILABLE");
    Ok(())
}

#[tokio::test]
async fn maintenance_rooms_take_no_boarders() -> Result<()> {
    let app = TestApp::new();
    let token = app.landlord_token().await?;
    let room = app.create_room(&token, "401", 2).await?;
    let room_id = id_of(&room);

    let res = app
        .put(&format!("/api/rooms/{}", room_id), &token, json!({ "status": "MAINTENANCE" }))
        .await?;
    assert_eq!(res.data()["status"], "MAINTENANCE");

    let res = app
        .post(
            "/api/boarders",
            &token,
            json!({ "firstName": "Li", "lastName": "Wei", "email": "li@example.com", "roomId": room_id }),
        )
        .await?;
    assert_eq!(res.status, StatusCode::CONFLICT);
    Ok(())
}
