use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Boarder {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub access_code: String,
    pub is_active: bool,
    pub move_in_date: NaiveDate,
    pub move_out_date: Option<NaiveDate>,
    pub room_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Boarder {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoarderFilter {
    pub room_id: Option<Uuid>,
    pub is_active: Option<bool>,
    /// Case-insensitive substring of first name, last name or email
    pub search: Option<String>,
}

impl BoarderFilter {
    pub fn active_in_room(room_id: Uuid) -> Self {
        Self {
            room_id: Some(room_id),
            is_active: Some(true),
            search: None,
        }
    }

    pub fn matches(&self, boarder: &Boarder) -> bool {
        self.room_id.map_or(true, |r| boarder.room_id == Some(r))
            && self.is_active.map_or(true, |a| boarder.is_active == a)
            && self.search.as_deref().map_or(true, |q| {
                let q = q.to_lowercase();
                [&boarder.first_name, &boarder.last_name, &boarder.email]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&q))
            })
    }
}
