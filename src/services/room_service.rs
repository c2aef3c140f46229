use chrono::Utc;
use uuid::Uuid;

use super::{found, ServiceContext};
use crate::database::models::{BoarderFilter, Room, RoomDetail, RoomFilter};
use crate::database::Store;
use crate::error::ApiError;
use crate::events::DomainEvent;
use crate::types::RoomStatus;
use crate::validation::inputs::{CreateRoomInput, UpdateRoomInput};

#[derive(Clone)]
pub struct RoomService {
    ctx: ServiceContext,
}

impl RoomService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    pub async fn list(&self, filter: &RoomFilter) -> Result<Vec<Room>, ApiError> {
        Ok(self.ctx.store.list_rooms(filter).await?)
    }

    pub async fn get(&self, id: Uuid) -> Result<RoomDetail, ApiError> {
        let room = found(self.ctx.store.get_room(id).await?, "Room", id)?;
        let occupants = self.ctx.store.list_boarders(&BoarderFilter::active_in_room(id)).await?;
        Ok(RoomDetail { room, occupants })
    }

    pub async fn create(&self, input: CreateRoomInput) -> Result<Room, ApiError> {
        let now = Utc::now();
        let room = Room {
            id: Uuid::new_v4(),
            room_number: input.room_number,
            floor: input.floor,
            capacity: input.capacity,
            monthly_rate: input.monthly_rate,
            status: input.status.unwrap_or(RoomStatus::Available),
            description: input.description,
            created_at: now,
            updated_at: now,
        };
        self.ctx.store.insert_room(&room).await?;
        tracing::info!(room_id = %room.id, room_number = %room.room_number, "Room created");

        self.ctx
            .publish(DomainEvent::RoomCreated {
                room_id: room.id,
                room_number: room.room_number.clone(),
            })
            .await?;
        Ok(room)
    }

    /// Merge the supplied fields. Outside of maintenance the status always
    /// follows occupancy, so only MAINTENANCE is taken from the input
    /// verbatim.
    pub async fn update(&self, input: UpdateRoomInput) -> Result<Room, ApiError> {
        let mut room = found(self.ctx.store.get_room(input.id).await?, "Room", input.id)?;
        let occupants = active_occupants(self.ctx.store.as_ref(), room.id).await?;

        if let Some(capacity) = input.capacity {
            if i64::from(capacity) < occupants {
                return Err(ApiError::invalid_field(
                    "capacity",
                    format!("Capacity cannot be below the {} current occupants", occupants),
                ));
            }
            room.capacity = capacity;
        }
        if let Some(room_number) = input.room_number {
            room.room_number = room_number;
        }
        if let Some(floor) = input.floor {
            room.floor = floor;
        }
        if let Some(rate) = input.monthly_rate {
            room.monthly_rate = rate;
        }
        if let Some(description) = input.description {
            room.description = Some(description);
        }
        if let Some(status) = input.status {
            room.status = status;
        }
        room.status = room.derived_status(occupants);
        room.updated_at = Utc::now();

        self.ctx.store.update_room(&room).await?;
        self.ctx.publish(DomainEvent::RoomUpdated { room_id: room.id }).await?;
        Ok(room)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), ApiError> {
        let room = found(self.ctx.store.get_room(id).await?, "Room", id)?;
        let occupants = active_occupants(self.ctx.store.as_ref(), id).await?;
        if occupants > 0 {
            return Err(ApiError::conflict(format!(
                "Room {} still has {} active boarder(s)",
                room.room_number, occupants
            )));
        }

        self.ctx.store.delete_room(id).await?;
        tracing::info!(room_id = %id, "Room deleted");
        self.ctx.publish(DomainEvent::RoomDeleted { room_id: id }).await
    }
}

pub(crate) async fn active_occupants(store: &dyn Store, room_id: Uuid) -> Result<i64, ApiError> {
    let boarders = store.list_boarders(&BoarderFilter::active_in_room(room_id)).await?;
    Ok(boarders.len() as i64)
}

/// Re-derive a room's status after its occupancy changed. Returns the room
/// as stored afterwards.
pub(crate) async fn sync_room_status(store: &dyn Store, room_id: Uuid) -> Result<Room, ApiError> {
    let mut room = found(store.get_room(room_id).await?, "Room", room_id)?;
    let occupants = active_occupants(store, room_id).await?;
    let status = room.derived_status(occupants);
    if status != room.status {
        tracing::debug!(room_id = %room_id, from = %room.status, to = %status, "Room status changed");
        room.status = status;
        room.updated_at = Utc::now();
        store.update_room(&room).await?;
    }
    Ok(room)
}
