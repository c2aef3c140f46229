use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::manager::DatabaseError;
use super::models::{
    Boarder, BoarderFilter, LandlordProfile, Payment, PaymentFilter, Profile, RegisteredUser, Room,
    RoomFilter, User, UserFilter, UtilityFilter, UtilityReading,
};
use super::store::{Store, StoreResult};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    landlord_profiles: HashMap<Uuid, LandlordProfile>,
    rooms: HashMap<Uuid, Room>,
    boarders: HashMap<Uuid, Boarder>,
    payments: HashMap<Uuid, Payment>,
    readings: HashMap<Uuid, UtilityReading>,
}

impl Tables {
    fn check_user_unique(&self, user: &User) -> StoreResult<()> {
        let taken = self
            .users
            .values()
            .any(|u| u.id != user.id && u.email.eq_ignore_ascii_case(&user.email));
        if taken {
            return Err(DatabaseError::Conflict(format!("email '{}' is already registered", user.email)));
        }
        Ok(())
    }

    fn check_boarder_unique(&self, boarder: &Boarder) -> StoreResult<()> {
        for other in self.boarders.values().filter(|b| b.id != boarder.id) {
            if other.email.eq_ignore_ascii_case(&boarder.email) {
                return Err(DatabaseError::Conflict(format!(
                    "a boarder with email '{}' already exists",
                    boarder.email
                )));
            }
            if other.access_code == boarder.access_code {
                return Err(DatabaseError::Conflict("access code is already in use".to_string()));
            }
        }
        Ok(())
    }

    fn check_room_unique(&self, room: &Room) -> StoreResult<()> {
        let taken = self
            .rooms
            .values()
            .any(|r| r.id != room.id && r.room_number == room.room_number);
        if taken {
            return Err(DatabaseError::Conflict(format!("room number '{}' already exists", room.room_number)));
        }
        Ok(())
    }

    fn check_room_exists(&self, room_id: Option<Uuid>) -> StoreResult<()> {
        match room_id {
            Some(id) if !self.rooms.contains_key(&id) => Err(DatabaseError::not_found("Room", id)),
            _ => Ok(()),
        }
    }
}

/// In-process store used by tests and `serve --memory`.
///
/// All tables sit behind one lock, so every method is atomic. Foreign keys
/// are checked the way the PostgreSQL schema checks them.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn sorted<T: Clone, K: Ord>(rows: impl Iterator<Item = T>, key: impl Fn(&T) -> K) -> Vec<T> {
    let mut rows: Vec<T> = rows.collect();
    rows.sort_by_key(|row| key(row));
    rows
}

#[async_trait]
impl Store for MemoryStore {
    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn create_user_with_profile(&self, user: User, profile: Profile) -> StoreResult<RegisteredUser> {
        let mut tables = self.tables.write().await;

        // Validate everything before touching any table
        tables.check_user_unique(&user)?;
        match &profile {
            Profile::Landlord(_) => {}
            Profile::Boarder(boarder) => {
                tables.check_boarder_unique(boarder)?;
                tables.check_room_exists(boarder.room_id)?;
            }
        }

        tables.users.insert(user.id, user.clone());
        match &profile {
            Profile::Landlord(landlord) => {
                tables.landlord_profiles.insert(landlord.id, landlord.clone());
            }
            Profile::Boarder(boarder) => {
                tables.boarders.insert(boarder.id, boarder.clone());
            }
        }

        Ok(RegisteredUser { user, profile })
    }

    async fn insert_user(&self, user: &User) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        tables.check_user_unique(user)?;
        tables.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn get_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn list_users(&self, filter: &UserFilter) -> StoreResult<Vec<User>> {
        let tables = self.tables.read().await;
        Ok(sorted(
            tables.users.values().filter(|u| filter.matches(u)).cloned(),
            |u| u.created_at,
        ))
    }

    async fn update_user(&self, user: &User) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&user.id) {
            return Err(DatabaseError::not_found("User", user.id));
        }
        tables.check_user_unique(user)?;
        tables.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn get_landlord_profile(&self, user_id: Uuid) -> StoreResult<Option<LandlordProfile>> {
        let tables = self.tables.read().await;
        Ok(tables
            .landlord_profiles
            .values()
            .find(|p| p.user_id == user_id)
            .cloned())
    }

    async fn insert_room(&self, room: &Room) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        tables.check_room_unique(room)?;
        tables.rooms.insert(room.id, room.clone());
        Ok(())
    }

    async fn get_room(&self, id: Uuid) -> StoreResult<Option<Room>> {
        Ok(self.tables.read().await.rooms.get(&id).cloned())
    }

    async fn list_rooms(&self, filter: &RoomFilter) -> StoreResult<Vec<Room>> {
        let tables = self.tables.read().await;
        Ok(sorted(
            tables.rooms.values().filter(|r| filter.matches(r)).cloned(),
            |r| r.room_number.clone(),
        ))
    }

    async fn update_room(&self, room: &Room) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if !tables.rooms.contains_key(&room.id) {
            return Err(DatabaseError::not_found("Room", room.id));
        }
        tables.check_room_unique(room)?;
        tables.rooms.insert(room.id, room.clone());
        Ok(())
    }

    async fn delete_room(&self, id: Uuid) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        let referenced = tables.boarders.values().any(|b| b.room_id == Some(id))
            || tables.readings.values().any(|r| r.room_id == id);
        if referenced {
            return Err(DatabaseError::Conflict(format!("room {} is still referenced", id)));
        }
        tables
            .rooms
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| DatabaseError::not_found("Room", id))
    }

    async fn insert_boarder(&self, boarder: &Boarder) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        tables.check_boarder_unique(boarder)?;
        tables.check_room_exists(boarder.room_id)?;
        tables.boarders.insert(boarder.id, boarder.clone());
        Ok(())
    }

    async fn get_boarder(&self, id: Uuid) -> StoreResult<Option<Boarder>> {
        Ok(self.tables.read().await.boarders.get(&id).cloned())
    }

    async fn find_boarder_by_user(&self, user_id: Uuid) -> StoreResult<Option<Boarder>> {
        let tables = self.tables.read().await;
        Ok(tables
            .boarders
            .values()
            .find(|b| b.user_id == Some(user_id))
            .cloned())
    }

    async fn find_boarder_by_access_code(&self, code: &str) -> StoreResult<Option<Boarder>> {
        let tables = self.tables.read().await;
        Ok(tables
            .boarders
            .values()
            .find(|b| b.access_code == code)
            .cloned())
    }

    async fn list_boarders(&self, filter: &BoarderFilter) -> StoreResult<Vec<Boarder>> {
        let tables = self.tables.read().await;
        Ok(sorted(
            tables.boarders.values().filter(|b| filter.matches(b)).cloned(),
            |b| (b.last_name.to_lowercase(), b.first_name.to_lowercase()),
        ))
    }

    async fn update_boarder(&self, boarder: &Boarder) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if !tables.boarders.contains_key(&boarder.id) {
            return Err(DatabaseError::not_found("Boarder", boarder.id));
        }
        tables.check_boarder_unique(boarder)?;
        tables.check_room_exists(boarder.room_id)?;
        tables.boarders.insert(boarder.id, boarder.clone());
        Ok(())
    }

    async fn delete_boarder(&self, id: Uuid) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if tables.payments.values().any(|p| p.boarder_id == id) {
            return Err(DatabaseError::Conflict(format!("boarder {} still has payments", id)));
        }
        tables
            .boarders
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| DatabaseError::not_found("Boarder", id))
    }

    async fn insert_payment(&self, payment: &Payment) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if !tables.boarders.contains_key(&payment.boarder_id) {
            return Err(DatabaseError::not_found("Boarder", payment.boarder_id));
        }
        tables.payments.insert(payment.id, payment.clone());
        Ok(())
    }

    async fn get_payment(&self, id: Uuid) -> StoreResult<Option<Payment>> {
        Ok(self.tables.read().await.payments.get(&id).cloned())
    }

    async fn list_payments(&self, filter: &PaymentFilter) -> StoreResult<Vec<Payment>> {
        let tables = self.tables.read().await;
        let mut rows = sorted(
            tables.payments.values().filter(|p| filter.matches(p)).cloned(),
            |p| (p.due_date, p.created_at),
        );
        rows.reverse();
        Ok(rows)
    }

    async fn update_payment(&self, payment: &Payment) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if !tables.payments.contains_key(&payment.id) {
            return Err(DatabaseError::not_found("Payment", payment.id));
        }
        if !tables.boarders.contains_key(&payment.boarder_id) {
            return Err(DatabaseError::not_found("Boarder", payment.boarder_id));
        }
        tables.payments.insert(payment.id, payment.clone());
        Ok(())
    }

    async fn delete_payment(&self, id: Uuid) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        tables
            .payments
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| DatabaseError::not_found("Payment", id))
    }

    async fn delete_payments_for_boarder(&self, boarder_id: Uuid) -> StoreResult<u64> {
        let mut tables = self.tables.write().await;
        let before = tables.payments.len();
        tables.payments.retain(|_, p| p.boarder_id != boarder_id);
        Ok((before - tables.payments.len()) as u64)
    }

    async fn insert_reading(&self, reading: &UtilityReading) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        tables.check_room_exists(Some(reading.room_id))?;
        tables.readings.insert(reading.id, reading.clone());
        Ok(())
    }

    async fn get_reading(&self, id: Uuid) -> StoreResult<Option<UtilityReading>> {
        Ok(self.tables.read().await.readings.get(&id).cloned())
    }

    async fn list_readings(&self, filter: &UtilityFilter) -> StoreResult<Vec<UtilityReading>> {
        let tables = self.tables.read().await;
        let mut rows = sorted(
            tables.readings.values().filter(|r| filter.matches(r)).cloned(),
            |r| (r.reading_date, r.created_at),
        );
        rows.reverse();
        Ok(rows)
    }

    async fn update_reading(&self, reading: &UtilityReading) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if !tables.readings.contains_key(&reading.id) {
            return Err(DatabaseError::not_found("Utility reading", reading.id));
        }
        tables.check_room_exists(Some(reading.room_id))?;
        tables.readings.insert(reading.id, reading.clone());
        Ok(())
    }

    async fn delete_reading(&self, id: Uuid) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        tables
            .readings
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| DatabaseError::not_found("Utility reading", id))
    }

    async fn bill_reading(&self, reading_id: Uuid, billed_at: DateTime<Utc>, payments: &[Payment]) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        match tables.readings.get(&reading_id) {
            None => return Err(DatabaseError::not_found("Utility reading", reading_id)),
            Some(reading) if reading.is_billed() => {
                return Err(DatabaseError::Conflict(format!("utility reading {} is already billed", reading_id)));
            }
            Some(_) => {}
        }
        if let Some(missing) = payments.iter().find(|p| !tables.boarders.contains_key(&p.boarder_id)) {
            return Err(DatabaseError::not_found("Boarder", missing.boarder_id));
        }

        for payment in payments {
            tables.payments.insert(payment.id, payment.clone());
        }
        if let Some(reading) = tables.readings.get_mut(&reading_id) {
            reading.billed_at = Some(billed_at);
            reading.updated_at = billed_at;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PaymentStatus, PaymentType, RoomStatus, UtilityType};
    use rust_decimal::Decimal;

    async fn room_with_reading(store: &MemoryStore) -> UtilityReading {
        let now = Utc::now();
        let room = Room {
            id: Uuid::new_v4(),
            room_number: "12".into(),
            floor: 1,
            capacity: 2,
            monthly_rate: Decimal::new(3000, 0),
            status: RoomStatus::Available,
            description: None,
            created_at: now,
            updated_at: now,
        };
        store.insert_room(&room).await.unwrap();
        let reading = UtilityReading {
            id: Uuid::new_v4(),
            room_id: room.id,
            utility_type: UtilityType::Water,
            previous_reading: Decimal::ZERO,
            current_reading: Decimal::TEN,
            rate_per_unit: Decimal::ONE,
            period_start: now.date_naive(),
            period_end: now.date_naive(),
            reading_date: now.date_naive(),
            billed_at: None,
            created_at: now,
            updated_at: now,
        };
        store.insert_reading(&reading).await.unwrap();
        reading
    }

    fn payment(boarder_id: Uuid) -> Payment {
        let now = Utc::now();
        Payment {
            id: Uuid::new_v4(),
            boarder_id,
            amount: Decimal::TEN,
            payment_type: PaymentType::Utility,
            status: PaymentStatus::Pending,
            due_date: now.date_naive(),
            paid_date: None,
            description: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn failed_bill_writes_nothing() {
        let store = MemoryStore::new();
        let reading = room_with_reading(&store).await;

        let err = store
            .bill_reading(reading.id, Utc::now(), &[payment(Uuid::new_v4())])
            .await
            .unwrap_err();

        assert!(matches!(err, DatabaseError::NotFound(_)));
        assert!(store.list_payments(&PaymentFilter::default()).await.unwrap().is_empty());
        assert!(!store.get_reading(reading.id).await.unwrap().unwrap().is_billed());
    }

    #[tokio::test]
    async fn reading_bills_once() {
        let store = MemoryStore::new();
        let reading = room_with_reading(&store).await;

        store.bill_reading(reading.id, Utc::now(), &[]).await.unwrap();
        let again = store.bill_reading(reading.id, Utc::now(), &[]).await.unwrap_err();

        assert!(matches!(again, DatabaseError::Conflict(_)));
        assert!(store.get_reading(reading.id).await.unwrap().unwrap().is_billed());
    }
}
