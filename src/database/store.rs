use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::manager::DatabaseError;
use super::models::{
    Boarder, BoarderFilter, LandlordProfile, Payment, PaymentFilter, Profile, RegisteredUser, Room,
    RoomFilter, User, UserFilter, UtilityFilter, UtilityReading,
};

pub type StoreResult<T> = Result<T, DatabaseError>;

/// Persistence port used by the services.
///
/// Writes take fully built records; ids and timestamps are assigned by the
/// caller. Unique fields (user email, boarder email, boarder access code,
/// room number) are enforced here and reported as `DatabaseError::Conflict`.
/// Updates and deletes of missing rows report `DatabaseError::NotFound`.
#[async_trait]
pub trait Store: Send + Sync {
    async fn health_check(&self) -> StoreResult<()>;

    // Users

    /// Insert the user and its role profile as one unit: either both rows
    /// exist afterwards or neither does.
    async fn create_user_with_profile(&self, user: User, profile: Profile) -> StoreResult<RegisteredUser>;
    async fn insert_user(&self, user: &User) -> StoreResult<()>;
    async fn get_user(&self, id: Uuid) -> StoreResult<Option<User>>;
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    async fn list_users(&self, filter: &UserFilter) -> StoreResult<Vec<User>>;
    async fn update_user(&self, user: &User) -> StoreResult<()>;
    async fn get_landlord_profile(&self, user_id: Uuid) -> StoreResult<Option<LandlordProfile>>;

    // Rooms
    async fn insert_room(&self, room: &Room) -> StoreResult<()>;
    async fn get_room(&self, id: Uuid) -> StoreResult<Option<Room>>;
    async fn list_rooms(&self, filter: &RoomFilter) -> StoreResult<Vec<Room>>;
    async fn update_room(&self, room: &Room) -> StoreResult<()>;
    async fn delete_room(&self, id: Uuid) -> StoreResult<()>;

    // Boarders
    async fn insert_boarder(&self, boarder: &Boarder) -> StoreResult<()>;
    async fn get_boarder(&self, id: Uuid) -> StoreResult<Option<Boarder>>;
    async fn find_boarder_by_user(&self, user_id: Uuid) -> StoreResult<Option<Boarder>>;
    async fn find_boarder_by_access_code(&self, code: &str) -> StoreResult<Option<Boarder>>;
    async fn list_boarders(&self, filter: &BoarderFilter) -> StoreResult<Vec<Boarder>>;
    async fn update_boarder(&self, boarder: &Boarder) -> StoreResult<()>;
    async fn delete_boarder(&self, id: Uuid) -> StoreResult<()>;

    // Payments
    async fn insert_payment(&self, payment: &Payment) -> StoreResult<()>;
    async fn get_payment(&self, id: Uuid) -> StoreResult<Option<Payment>>;
    async fn list_payments(&self, filter: &PaymentFilter) -> StoreResult<Vec<Payment>>;
    async fn update_payment(&self, payment: &Payment) -> StoreResult<()>;
    async fn delete_payment(&self, id: Uuid) -> StoreResult<()>;
    /// Returns the number of payments removed
    async fn delete_payments_for_boarder(&self, boarder_id: Uuid) -> StoreResult<u64>;

    // Utility readings
    async fn insert_reading(&self, reading: &UtilityReading) -> StoreResult<()>;
    async fn get_reading(&self, id: Uuid) -> StoreResult<Option<UtilityReading>>;
    async fn list_readings(&self, filter: &UtilityFilter) -> StoreResult<Vec<UtilityReading>>;
    async fn update_reading(&self, reading: &UtilityReading) -> StoreResult<()>;
    async fn delete_reading(&self, id: Uuid) -> StoreResult<()>;
    /// Stamp the reading as billed and insert its payments as one unit.
    /// A reading that is already billed reports `DatabaseError::Conflict`
    /// and nothing is written.
    async fn bill_reading(&self, reading_id: Uuid, billed_at: DateTime<Utc>, payments: &[Payment]) -> StoreResult<()>;
}
