use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::manager::{is_unique_violation, DatabaseError};
use super::models::{
    Boarder, BoarderFilter, LandlordProfile, Payment, PaymentFilter, Profile, RegisteredUser, Room,
    RoomFilter, User, UserFilter, UtilityFilter, UtilityReading,
};
use super::store::{Store, StoreResult};

/// PostgreSQL-backed store. Schema lives in `migrations/`.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Map write failures: unique violations become conflicts with the given
/// message, foreign-key violations become generic conflicts.
fn write_error(conflict: impl Into<String>) -> impl FnOnce(sqlx::Error) -> DatabaseError {
    let conflict = conflict.into();
    move |err| {
        if is_unique_violation(&err) {
            return DatabaseError::Conflict(conflict);
        }
        let fk_violation = err
            .as_database_error()
            .and_then(|db| db.code())
            .is_some_and(|code| code == "23503");
        if fk_violation {
            return DatabaseError::Conflict("operation violates a reference between records".to_string());
        }
        DatabaseError::Sqlx(err)
    }
}

fn expect_one(rows_affected: u64, entity: &str, id: Uuid) -> StoreResult<()> {
    if rows_affected == 0 {
        return Err(DatabaseError::not_found(entity, id));
    }
    Ok(())
}

fn like_pattern(search: Option<&str>) -> Option<String> {
    search.map(|q| format!("%{}%", q.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")))
}

const USER_INSERT: &str = r#"
    INSERT INTO users (id, email, password_hash, role, status, created_at, updated_at)
    VALUES ($1, $2, $3, $4, $5, $6, $7)
"#;

const BOARDER_INSERT: &str = r#"
    INSERT INTO boarders (
        id, user_id, first_name, last_name, email, phone, access_code,
        is_active, move_in_date, move_out_date, room_id, created_at, updated_at
    )
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
"#;

const PAYMENT_INSERT: &str = r#"
    INSERT INTO payments (id, boarder_id, amount, payment_type, status, due_date, paid_date, description, created_at, updated_at)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
"#;

async fn insert_user_tx(tx: &mut Transaction<'_, Postgres>, user: &User) -> StoreResult<()> {
    sqlx::query(USER_INSERT)
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role)
        .bind(user.status)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&mut **tx)
        .await
        .map_err(write_error(format!("email '{}' is already registered", user.email)))?;
    Ok(())
}

fn bind_boarder<'q>(
    query: sqlx::query::Query<'q, Postgres, sqlx::postgres::PgArguments>,
    boarder: &'q Boarder,
) -> sqlx::query::Query<'q, Postgres, sqlx::postgres::PgArguments> {
    query
        .bind(boarder.id)
        .bind(boarder.user_id)
        .bind(&boarder.first_name)
        .bind(&boarder.last_name)
        .bind(&boarder.email)
        .bind(&boarder.phone)
        .bind(&boarder.access_code)
        .bind(boarder.is_active)
        .bind(boarder.move_in_date)
        .bind(boarder.move_out_date)
        .bind(boarder.room_id)
        .bind(boarder.created_at)
        .bind(boarder.updated_at)
}

fn bind_payment<'q>(
    query: sqlx::query::Query<'q, Postgres, sqlx::postgres::PgArguments>,
    payment: &'q Payment,
) -> sqlx::query::Query<'q, Postgres, sqlx::postgres::PgArguments> {
    query
        .bind(payment.id)
        .bind(payment.boarder_id)
        .bind(payment.amount)
        .bind(payment.payment_type)
        .bind(payment.status)
        .bind(payment.due_date)
        .bind(payment.paid_date)
        .bind(&payment.description)
        .bind(payment.created_at)
        .bind(payment.updated_at)
}

#[async_trait]
impl Store for PgStore {
    async fn health_check(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn create_user_with_profile(&self, user: User, profile: Profile) -> StoreResult<RegisteredUser> {
        // Dropping the transaction on any early return rolls it back
        let mut tx = self.pool.begin().await?;

        insert_user_tx(&mut tx, &user).await?;

        match &profile {
            Profile::Landlord(landlord) => {
                sqlx::query(
                    r#"
                    INSERT INTO landlord_profiles (id, user_id, first_name, last_name, phone, business_name, created_at)
                    VALUES ($1, $2, $3, $4, $5, $6, $7)
                    "#,
                )
                .bind(landlord.id)
                .bind(landlord.user_id)
                .bind(&landlord.first_name)
                .bind(&landlord.last_name)
                .bind(&landlord.phone)
                .bind(&landlord.business_name)
                .bind(landlord.created_at)
                .execute(&mut *tx)
                .await
                .map_err(write_error("landlord profile already exists"))?;
            }
            Profile::Boarder(boarder) => {
                bind_boarder(sqlx::query(BOARDER_INSERT), boarder)
                    .execute(&mut *tx)
                    .await
                    .map_err(write_error(format!(
                        "a boarder with email '{}' or the same access code already exists",
                        boarder.email
                    )))?;
            }
        }

        tx.commit().await?;
        Ok(RegisteredUser { user, profile })
    }

    async fn insert_user(&self, user: &User) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;
        insert_user_tx(&mut tx, user).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn get_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE lower(email) = lower($1)")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn list_users(&self, filter: &UserFilter) -> StoreResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT * FROM users
            WHERE ($1::user_role IS NULL OR role = $1)
              AND ($2::user_status IS NULL OR status = $2)
              AND ($3::text IS NULL OR email ILIKE $3)
            ORDER BY created_at
            "#,
        )
        .bind(filter.role)
        .bind(filter.status)
        .bind(like_pattern(filter.search.as_deref()))
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    async fn update_user(&self, user: &User) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET email = $2, password_hash = $3, role = $4, status = $5, updated_at = $6
            WHERE id = $1
            "#,
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role)
        .bind(user.status)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(write_error(format!("email '{}' is already registered", user.email)))?;
        expect_one(result.rows_affected(), "User", user.id)
    }

    async fn get_landlord_profile(&self, user_id: Uuid) -> StoreResult<Option<LandlordProfile>> {
        let profile = sqlx::query_as::<_, LandlordProfile>("SELECT * FROM landlord_profiles WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(profile)
    }

    async fn insert_room(&self, room: &Room) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO rooms (id, room_number, floor, capacity, monthly_rate, status, description, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(room.id)
        .bind(&room.room_number)
        .bind(room.floor)
        .bind(room.capacity)
        .bind(room.monthly_rate)
        .bind(room.status)
        .bind(&room.description)
        .bind(room.created_at)
        .bind(room.updated_at)
        .execute(&self.pool)
        .await
        .map_err(write_error(format!("room number '{}' already exists", room.room_number)))?;
        Ok(())
    }

    async fn get_room(&self, id: Uuid) -> StoreResult<Option<Room>> {
        let room = sqlx::query_as::<_, Room>("SELECT * FROM rooms WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(room)
    }

    async fn list_rooms(&self, filter: &RoomFilter) -> StoreResult<Vec<Room>> {
        let rooms = sqlx::query_as::<_, Room>(
            r#"
            SELECT * FROM rooms
            WHERE ($1::room_status IS NULL OR status = $1)
              AND ($2::int4 IS NULL OR floor = $2)
              AND ($3::text IS NULL OR room_number ILIKE $3 OR description ILIKE $3)
            ORDER BY room_number
            "#,
        )
        .bind(filter.status)
        .bind(filter.floor)
        .bind(like_pattern(filter.search.as_deref()))
        .fetch_all(&self.pool)
        .await?;
        Ok(rooms)
    }

    async fn update_room(&self, room: &Room) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE rooms
            SET room_number = $2, floor = $3, capacity = $4, monthly_rate = $5,
                status = $6, description = $7, updated_at = $8
            WHERE id = $1
            "#,
        )
        .bind(room.id)
        .bind(&room.room_number)
        .bind(room.floor)
        .bind(room.capacity)
        .bind(room.monthly_rate)
        .bind(room.status)
        .bind(&room.description)
        .bind(room.updated_at)
        .execute(&self.pool)
        .await
        .map_err(write_error(format!("room number '{}' already exists", room.room_number)))?;
        expect_one(result.rows_affected(), "Room", room.id)
    }

    async fn delete_room(&self, id: Uuid) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM rooms WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(write_error("room is still referenced"))?;
        expect_one(result.rows_affected(), "Room", id)
    }

    async fn insert_boarder(&self, boarder: &Boarder) -> StoreResult<()> {
        bind_boarder(sqlx::query(BOARDER_INSERT), boarder)
            .execute(&self.pool)
            .await
            .map_err(write_error(format!(
                "a boarder with email '{}' or the same access code already exists",
                boarder.email
            )))?;
        Ok(())
    }

    async fn get_boarder(&self, id: Uuid) -> StoreResult<Option<Boarder>> {
        let boarder = sqlx::query_as::<_, Boarder>("SELECT * FROM boarders WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(boarder)
    }

    async fn find_boarder_by_user(&self, user_id: Uuid) -> StoreResult<Option<Boarder>> {
        let boarder = sqlx::query_as::<_, Boarder>("SELECT * FROM boarders WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(boarder)
    }

    async fn find_boarder_by_access_code(&self, code: &str) -> StoreResult<Option<Boarder>> {
        let boarder = sqlx::query_as::<_, Boarder>("SELECT * FROM boarders WHERE access_code = $1")
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;
        Ok(boarder)
    }

    async fn list_boarders(&self, filter: &BoarderFilter) -> StoreResult<Vec<Boarder>> {
        let boarders = sqlx::query_as::<_, Boarder>(
            r#"
            SELECT * FROM boarders
            WHERE ($1::uuid IS NULL OR room_id = $1)
              AND ($2::bool IS NULL OR is_active = $2)
              AND ($3::text IS NULL OR first_name ILIKE $3 OR last_name ILIKE $3 OR email ILIKE $3)
            ORDER BY lower(last_name), lower(first_name)
            "#,
        )
        .bind(filter.room_id)
        .bind(filter.is_active)
        .bind(like_pattern(filter.search.as_deref()))
        .fetch_all(&self.pool)
        .await?;
        Ok(boarders)
    }

    async fn update_boarder(&self, boarder: &Boarder) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE boarders
            SET user_id = $2, first_name = $3, last_name = $4, email = $5, phone = $6,
                access_code = $7, is_active = $8, move_in_date = $9, move_out_date = $10,
                room_id = $11, updated_at = $12
            WHERE id = $1
            "#,
        )
        .bind(boarder.id)
        .bind(boarder.user_id)
        .bind(&boarder.first_name)
        .bind(&boarder.last_name)
        .bind(&boarder.email)
        .bind(&boarder.phone)
        .bind(&boarder.access_code)
        .bind(boarder.is_active)
        .bind(boarder.move_in_date)
        .bind(boarder.move_out_date)
        .bind(boarder.room_id)
        .bind(boarder.updated_at)
        .execute(&self.pool)
        .await
        .map_err(write_error(format!(
            "a boarder with email '{}' or the same access code already exists",
            boarder.email
        )))?;
        expect_one(result.rows_affected(), "Boarder", boarder.id)
    }

    async fn delete_boarder(&self, id: Uuid) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM boarders WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(write_error("boarder is still referenced"))?;
        expect_one(result.rows_affected(), "Boarder", id)
    }

    async fn insert_payment(&self, payment: &Payment) -> StoreResult<()> {
        bind_payment(sqlx::query(PAYMENT_INSERT), payment)
            .execute(&self.pool)
            .await
            .map_err(write_error("payment already exists"))?;
        Ok(())
    }

    async fn get_payment(&self, id: Uuid) -> StoreResult<Option<Payment>> {
        let payment = sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(payment)
    }

    async fn list_payments(&self, filter: &PaymentFilter) -> StoreResult<Vec<Payment>> {
        let payments = sqlx::query_as::<_, Payment>(
            r#"
            SELECT * FROM payments
            WHERE ($1::payment_status IS NULL OR status = $1)
              AND ($2::payment_type IS NULL OR payment_type = $2)
              AND ($3::uuid IS NULL OR boarder_id = $3)
              AND ($4::date IS NULL OR due_date >= $4)
              AND ($5::date IS NULL OR due_date <= $5)
            ORDER BY due_date DESC, created_at DESC
            "#,
        )
        .bind(filter.status)
        .bind(filter.payment_type)
        .bind(filter.boarder_id)
        .bind(filter.due_from)
        .bind(filter.due_to)
        .fetch_all(&self.pool)
        .await?;
        Ok(payments)
    }

    async fn update_payment(&self, payment: &Payment) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE payments
            SET boarder_id = $2, amount = $3, payment_type = $4, status = $5,
                due_date = $6, paid_date = $7, description = $8, updated_at = $9
            WHERE id = $1
            "#,
        )
        .bind(payment.id)
        .bind(payment.boarder_id)
        .bind(payment.amount)
        .bind(payment.payment_type)
        .bind(payment.status)
        .bind(payment.due_date)
        .bind(payment.paid_date)
        .bind(&payment.description)
        .bind(payment.updated_at)
        .execute(&self.pool)
        .await
        .map_err(write_error("payment update conflicts with existing data"))?;
        expect_one(result.rows_affected(), "Payment", payment.id)
    }

    async fn delete_payment(&self, id: Uuid) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM payments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        expect_one(result.rows_affected(), "Payment", id)
    }

    async fn delete_payments_for_boarder(&self, boarder_id: Uuid) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM payments WHERE boarder_id = $1")
            .bind(boarder_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn insert_reading(&self, reading: &UtilityReading) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO utility_readings (
                id, room_id, utility_type, previous_reading, current_reading, rate_per_unit,
                period_start, period_end, reading_date, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(reading.id)
        .bind(reading.room_id)
        .bind(reading.utility_type)
        .bind(reading.previous_reading)
        .bind(reading.current_reading)
        .bind(reading.rate_per_unit)
        .bind(reading.period_start)
        .bind(reading.period_end)
        .bind(reading.reading_date)
        .bind(reading.created_at)
        .bind(reading.updated_at)
        .execute(&self.pool)
        .await
        .map_err(write_error("utility reading already exists"))?;
        Ok(())
    }

    async fn get_reading(&self, id: Uuid) -> StoreResult<Option<UtilityReading>> {
        let reading = sqlx::query_as::<_, UtilityReading>("SELECT * FROM utility_readings WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(reading)
    }

    async fn list_readings(&self, filter: &UtilityFilter) -> StoreResult<Vec<UtilityReading>> {
        let readings = sqlx::query_as::<_, UtilityReading>(
            r#"
            SELECT * FROM utility_readings
            WHERE ($1::uuid IS NULL OR room_id = $1)
              AND ($2::utility_type IS NULL OR utility_type = $2)
              AND ($3::date IS NULL OR period_end >= $3)
              AND ($4::date IS NULL OR period_start <= $4)
            ORDER BY reading_date DESC, created_at DESC
            "#,
        )
        .bind(filter.room_id)
        .bind(filter.utility_type)
        .bind(filter.period_from)
        .bind(filter.period_to)
        .fetch_all(&self.pool)
        .await?;
        Ok(readings)
    }

    async fn update_reading(&self, reading: &UtilityReading) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE utility_readings
            SET room_id = $2, utility_type = $3, previous_reading = $4, current_reading = $5,
                rate_per_unit = $6, period_start = $7, period_end = $8, reading_date = $9, updated_at = $10
            WHERE id = $1
            "#,
        )
        .bind(reading.id)
        .bind(reading.room_id)
        .bind(reading.utility_type)
        .bind(reading.previous_reading)
        .bind(reading.current_reading)
        .bind(reading.rate_per_unit)
        .bind(reading.period_start)
        .bind(reading.period_end)
        .bind(reading.reading_date)
        .bind(reading.updated_at)
        .execute(&self.pool)
        .await
        .map_err(write_error("utility reading update conflicts with existing data"))?;
        expect_one(result.rows_affected(), "Utility reading", reading.id)
    }

    async fn delete_reading(&self, id: Uuid) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM utility_readings WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        expect_one(result.rows_affected(), "Utility reading", id)
    }

    async fn bill_reading(&self, reading_id: Uuid, billed_at: DateTime<Utc>, payments: &[Payment]) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;

        // The row lock taken here serializes concurrent bills of one reading
        let stamped = sqlx::query(
            "UPDATE utility_readings SET billed_at = $2, updated_at = $2 WHERE id = $1 AND billed_at IS NULL",
        )
        .bind(reading_id)
        .bind(billed_at)
        .execute(&mut *tx)
        .await?;
        if stamped.rows_affected() == 0 {
            let exists = sqlx::query("SELECT 1 FROM utility_readings WHERE id = $1")
                .bind(reading_id)
                .fetch_optional(&mut *tx)
                .await?
                .is_some();
            return Err(if exists {
                DatabaseError::Conflict(format!("utility reading {} is already billed", reading_id))
            } else {
                DatabaseError::not_found("Utility reading", reading_id)
            });
        }

        for payment in payments {
            bind_payment(sqlx::query(PAYMENT_INSERT), payment)
                .execute(&mut *tx)
                .await
                .map_err(write_error("payment already exists"))?;
        }

        tx.commit().await?;
        Ok(())
    }
}
