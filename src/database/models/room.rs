use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::types::RoomStatus;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: Uuid,
    pub room_number: String,
    pub floor: i32,
    pub capacity: i32,
    pub monthly_rate: Decimal,
    pub status: RoomStatus,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Room {
    /// Status implied by the number of active occupants. Rooms under
    /// maintenance keep their status until explicitly updated.
    pub fn derived_status(&self, occupants: i64) -> RoomStatus {
        match self.status {
            RoomStatus::Maintenance => RoomStatus::Maintenance,
            _ if occupants >= i64::from(self.capacity) => RoomStatus::Occupied,
            _ => RoomStatus::Available,
        }
    }
}

/// Room plus its current active occupants
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomDetail {
    #[serde(flatten)]
    pub room: Room,
    pub occupants: Vec<super::Boarder>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomFilter {
    pub status: Option<RoomStatus>,
    pub floor: Option<i32>,
    /// Case-insensitive substring of room number or description
    pub search: Option<String>,
}

impl RoomFilter {
    pub fn matches(&self, room: &Room) -> bool {
        self.status.map_or(true, |s| room.status == s)
            && self.floor.map_or(true, |f| room.floor == f)
            && self.search.as_deref().map_or(true, |q| {
                let q = q.to_lowercase();
                room.room_number.to_lowercase().contains(&q)
                    || room
                        .description
                        .as_deref()
                        .is_some_and(|d| d.to_lowercase().contains(&q))
            })
    }
}
