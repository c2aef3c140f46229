use chrono::Utc;
use uuid::Uuid;

use super::room_service::{active_occupants, sync_room_status};
use super::{found, today, ServiceContext};
use crate::database::models::{Boarder, BoarderFilter, Room};
use crate::database::Store;
use crate::error::ApiError;
use crate::events::DomainEvent;
use crate::types::RoomStatus;
use crate::validation::inputs::{AssignRoomInput, CreateBoarderInput, MoveOutInput, UpdateBoarderInput};

const ACCESS_CODE_LEN: usize = 8;
const ACCESS_CODE_ATTEMPTS: usize = 5;

#[derive(Clone)]
pub struct BoarderService {
    ctx: ServiceContext,
}

impl BoarderService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    pub async fn list(&self, filter: &BoarderFilter) -> Result<Vec<Boarder>, ApiError> {
        Ok(self.ctx.store.list_boarders(filter).await?)
    }

    pub async fn get(&self, id: Uuid) -> Result<Boarder, ApiError> {
        found(self.ctx.store.get_boarder(id).await?, "Boarder", id)
    }

    pub async fn create(&self, input: CreateBoarderInput) -> Result<Boarder, ApiError> {
        if let Some(room_id) = input.room_id {
            let room = found(self.ctx.store.get_room(room_id).await?, "Room", room_id)?;
            ensure_has_space(self.ctx.store.as_ref(), &room).await?;
        }

        let now = Utc::now();
        let boarder = Boarder {
            id: Uuid::new_v4(),
            user_id: None,
            first_name: input.first_name,
            last_name: input.last_name,
            email: input.email.to_lowercase(),
            phone: input.phone,
            access_code: generate_access_code(self.ctx.store.as_ref()).await?,
            is_active: true,
            move_in_date: input.move_in_date.unwrap_or_else(today),
            move_out_date: None,
            room_id: input.room_id,
            created_at: now,
            updated_at: now,
        };
        self.ctx.store.insert_boarder(&boarder).await?;
        if let Some(room_id) = boarder.room_id {
            sync_room_status(self.ctx.store.as_ref(), room_id).await?;
        }
        tracing::info!(boarder_id = %boarder.id, room_id = ?boarder.room_id, "Boarder created");

        self.ctx
            .publish(DomainEvent::BoarderCreated {
                boarder_id: boarder.id,
                room_id: boarder.room_id,
            })
            .await?;
        Ok(boarder)
    }

    pub async fn update(&self, input: UpdateBoarderInput) -> Result<Boarder, ApiError> {
        let mut boarder = self.get(input.id).await?;
        let was_active = boarder.is_active;

        if let Some(first_name) = input.first_name {
            boarder.first_name = first_name;
        }
        if let Some(last_name) = input.last_name {
            boarder.last_name = last_name;
        }
        if let Some(email) = input.email {
            boarder.email = email.to_lowercase();
        }
        if let Some(phone) = input.phone {
            boarder.phone = Some(phone);
        }
        if let Some(date) = input.move_in_date {
            boarder.move_in_date = date;
        }
        if let Some(date) = input.move_out_date {
            boarder.move_out_date = Some(date);
        }
        if let Some(is_active) = input.is_active {
            boarder.is_active = is_active;
        }
        if boarder.move_out_date.is_some_and(|out| out < boarder.move_in_date) {
            return Err(ApiError::invalid_field(
                "moveOutDate",
                "Move-out date cannot be before move-in date",
            ));
        }
        if !was_active && boarder.is_active {
            if let Some(room_id) = boarder.room_id {
                let room = found(self.ctx.store.get_room(room_id).await?, "Room", room_id)?;
                ensure_has_space(self.ctx.store.as_ref(), &room).await?;
            }
        }
        boarder.updated_at = Utc::now();

        self.ctx.store.update_boarder(&boarder).await?;
        if was_active != boarder.is_active {
            if let Some(room_id) = boarder.room_id {
                sync_room_status(self.ctx.store.as_ref(), room_id).await?;
            }
        }

        self.ctx
            .publish(DomainEvent::BoarderUpdated { boarder_id: boarder.id })
            .await?;
        Ok(boarder)
    }

    /// Removes the boarder's payments first, then the boarder.
    pub async fn delete(&self, id: Uuid) -> Result<(), ApiError> {
        let boarder = self.get(id).await?;

        let payments_removed = self.ctx.store.delete_payments_for_boarder(id).await?;
        self.ctx.store.delete_boarder(id).await?;
        if let Some(room_id) = boarder.room_id {
            sync_room_status(self.ctx.store.as_ref(), room_id).await?;
        }
        tracing::info!(boarder_id = %id, payments_removed, "Boarder deleted");

        self.ctx
            .publish(DomainEvent::BoarderDeleted {
                boarder_id: id,
                payments_removed,
            })
            .await
    }

    pub async fn assign_room(&self, input: AssignRoomInput) -> Result<Boarder, ApiError> {
        let mut boarder = self.get(input.id).await?;
        if !boarder.is_active {
            return Err(ApiError::conflict("Inactive boarders cannot be assigned a room"));
        }
        let room = found(self.ctx.store.get_room(input.room_id).await?, "Room", input.room_id)?;
        if boarder.room_id == Some(room.id) {
            return Ok(boarder);
        }
        ensure_has_space(self.ctx.store.as_ref(), &room).await?;

        let previous_room_id = boarder.room_id.replace(room.id);
        boarder.updated_at = Utc::now();
        self.ctx.store.update_boarder(&boarder).await?;

        if let Some(previous) = previous_room_id {
            sync_room_status(self.ctx.store.as_ref(), previous).await?;
        }
        sync_room_status(self.ctx.store.as_ref(), room.id).await?;

        self.ctx
            .publish(DomainEvent::BoarderAssigned {
                boarder_id: boarder.id,
                room_id: room.id,
                previous_room_id,
            })
            .await?;
        Ok(boarder)
    }

    pub async fn unassign_room(&self, id: Uuid) -> Result<Boarder, ApiError> {
        let mut boarder = self.get(id).await?;
        let room_id = boarder
            .room_id
            .take()
            .ok_or_else(|| ApiError::conflict("Boarder has no room assigned"))?;
        boarder.updated_at = Utc::now();

        self.ctx.store.update_boarder(&boarder).await?;
        sync_room_status(self.ctx.store.as_ref(), room_id).await?;

        self.ctx
            .publish(DomainEvent::BoarderUnassigned {
                boarder_id: boarder.id,
                room_id,
            })
            .await?;
        Ok(boarder)
    }

    /// Deactivate the boarder, record the move-out date and free the room.
    pub async fn move_out(&self, input: MoveOutInput) -> Result<Boarder, ApiError> {
        let mut boarder = self.get(input.id).await?;
        if !boarder.is_active {
            return Err(ApiError::conflict("Boarder has already moved out"));
        }
        let move_out_date = input.move_out_date.unwrap_or_else(today);
        if move_out_date < boarder.move_in_date {
            return Err(ApiError::invalid_field(
                "moveOutDate",
                "Move-out date cannot be before move-in date",
            ));
        }

        let room_id = boarder.room_id.take();
        boarder.is_active = false;
        boarder.move_out_date = Some(move_out_date);
        boarder.updated_at = Utc::now();

        self.ctx.store.update_boarder(&boarder).await?;
        if let Some(room_id) = room_id {
            sync_room_status(self.ctx.store.as_ref(), room_id).await?;
        }
        tracing::info!(boarder_id = %boarder.id, %move_out_date, "Boarder moved out");

        self.ctx
            .publish(DomainEvent::BoarderMovedOut {
                boarder_id: boarder.id,
                room_id,
                move_out_date,
            })
            .await?;
        Ok(boarder)
    }

    pub async fn regenerate_access_code(&self, id: Uuid) -> Result<Boarder, ApiError> {
        let mut boarder = self.get(id).await?;
        boarder.access_code = generate_access_code(self.ctx.store.as_ref()).await?;
        boarder.updated_at = Utc::now();

        self.ctx.store.update_boarder(&boarder).await?;
        self.ctx
            .publish(DomainEvent::AccessCodeRegenerated { boarder_id: boarder.id })
            .await?;
        Ok(boarder)
    }
}

/// Rooms under maintenance or at capacity take no new occupants.
async fn ensure_has_space(store: &dyn Store, room: &Room) -> Result<(), ApiError> {
    if room.status == RoomStatus::Maintenance {
        return Err(ApiError::conflict(format!("Room {} is under maintenance", room.room_number)));
    }
    let occupants = active_occupants(store, room.id).await?;
    if occupants >= i64::from(room.capacity) {
        return Err(ApiError::conflict(format!(
            "Room {} is full ({} of {})",
            room.room_number, occupants, room.capacity
        )));
    }
    Ok(())
}

/// Short uppercase code not held by any other boarder.
pub(crate) async fn generate_access_code(store: &dyn Store) -> Result<String, ApiError> {
    for _ in 0..ACCESS_CODE_ATTEMPTS {
        let code = Uuid::new_v4().simple().to_string()[..ACCESS_CODE_LEN].to_uppercase();
        if store.find_boarder_by_access_code(&code).await?.is_none() {
            return Ok(code);
        }
    }
    Err(ApiError::internal("Could not generate a unique access code"))
}
