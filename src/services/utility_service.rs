use chrono::Utc;
use rust_decimal::{Decimal, RoundingStrategy};
use uuid::Uuid;

use super::{found, in_range, today, ServiceContext};
use crate::database::models::{BoarderFilter, ConsumptionSummary, Payment, UtilityFilter, UtilityReading};
use crate::error::{ApiError, FieldErrors};
use crate::events::DomainEvent;
use crate::types::{PaymentStatus, PaymentType};
use crate::validation::inputs::{check_reading, BillReadingInput, CreateReadingInput, UpdateReadingInput, MONEY};

#[derive(Clone)]
pub struct UtilityService {
    ctx: ServiceContext,
}

impl UtilityService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    pub async fn list(&self, filter: &UtilityFilter) -> Result<Vec<UtilityReading>, ApiError> {
        Ok(self.ctx.store.list_readings(filter).await?)
    }

    pub async fn get(&self, id: Uuid) -> Result<UtilityReading, ApiError> {
        found(self.ctx.store.get_reading(id).await?, "Utility reading", id)
    }

    pub async fn create(&self, input: CreateReadingInput) -> Result<UtilityReading, ApiError> {
        found(self.ctx.store.get_room(input.room_id).await?, "Room", input.room_id)?;

        let now = Utc::now();
        let reading = UtilityReading {
            id: Uuid::new_v4(),
            room_id: input.room_id,
            utility_type: input.utility_type,
            previous_reading: input.previous_reading,
            current_reading: input.current_reading,
            rate_per_unit: input.rate_per_unit,
            period_start: input.period_start,
            period_end: input.period_end,
            reading_date: input.reading_date.unwrap_or_else(today),
            billed_at: None,
            created_at: now,
            updated_at: now,
        };
        let amount = in_range(reading.amount(), "Reading amount")?;
        self.ctx.store.insert_reading(&reading).await?;
        tracing::info!(reading_id = %reading.id, room_id = %reading.room_id, kind = %reading.utility_type, "Utility reading recorded");

        self.ctx
            .publish(DomainEvent::ReadingCreated {
                reading_id: reading.id,
                room_id: reading.room_id,
                amount,
            })
            .await?;
        Ok(reading)
    }

    /// The meter and period rules are checked again on the merged record,
    /// since an update may supply only one side of a pair. Billed readings
    /// are frozen.
    pub async fn update(&self, input: UpdateReadingInput) -> Result<UtilityReading, ApiError> {
        let mut reading = self.get(input.id).await?;
        if reading.is_billed() {
            return Err(ApiError::conflict(format!(
                "Utility reading {} has been billed and can no longer change",
                reading.id
            )));
        }

        if let Some(utility_type) = input.utility_type {
            reading.utility_type = utility_type;
        }
        if let Some(previous) = input.previous_reading {
            reading.previous_reading = previous;
        }
        if let Some(current) = input.current_reading {
            reading.current_reading = current;
        }
        if let Some(rate) = input.rate_per_unit {
            reading.rate_per_unit = rate;
        }
        if let Some(start) = input.period_start {
            reading.period_start = start;
        }
        if let Some(end) = input.period_end {
            reading.period_end = end;
        }
        if let Some(date) = input.reading_date {
            reading.reading_date = date;
        }

        let mut errors = FieldErrors::new();
        check_reading(
            &mut errors,
            Some(reading.previous_reading),
            Some(reading.current_reading),
            Some(reading.rate_per_unit),
            Some(reading.period_start),
            Some(reading.period_end),
        );
        if !errors.is_empty() {
            return Err(ApiError::validation("Validation failed", errors));
        }
        in_range(reading.amount(), "Reading amount")?;
        reading.updated_at = Utc::now();

        self.ctx.store.update_reading(&reading).await?;
        self.ctx
            .publish(DomainEvent::ReadingUpdated { reading_id: reading.id })
            .await?;
        Ok(reading)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), ApiError> {
        self.ctx.store.delete_reading(id).await?;
        self.ctx.publish(DomainEvent::ReadingDeleted { reading_id: id }).await
    }

    /// Per-reading consumption and amount, with totals per utility type.
    pub async fn summary(&self, filter: &UtilityFilter) -> Result<ConsumptionSummary, ApiError> {
        let readings = self.ctx.store.list_readings(filter).await?;
        in_range(ConsumptionSummary::from_readings(&readings), "Consumption total")
    }

    /// Split the reading's amount across the room's active boarders as
    /// PENDING utility payments. A reading is billed once.
    pub async fn bill(&self, input: BillReadingInput) -> Result<Vec<Payment>, ApiError> {
        let reading = self.get(input.id).await?;
        if reading.is_billed() {
            return Err(ApiError::conflict(format!("Utility reading {} is already billed", reading.id)));
        }
        let room = found(self.ctx.store.get_room(reading.room_id).await?, "Room", reading.room_id)?;
        let boarders = self
            .ctx
            .store
            .list_boarders(&BoarderFilter::active_in_room(room.id))
            .await?;
        if boarders.is_empty() {
            return Err(ApiError::conflict(format!("Room {} has no active boarders to bill", room.room_number)));
        }

        let amount = in_range(reading.amount(), "Reading amount")?;
        let shares = split_amount(amount, boarders.len());
        if shares.iter().any(|share| !MONEY.holds(*share)) {
            return Err(ApiError::conflict(format!(
                "Amount {} exceeds what a single payment can hold",
                amount
            )));
        }
        if shares.iter().any(|share| *share <= Decimal::ZERO) {
            return Err(ApiError::conflict(format!(
                "Amount {} cannot be split across {} boarder(s)",
                amount,
                boarders.len()
            )));
        }

        let description = input.description.unwrap_or_else(|| {
            format!(
                "{} for room {}, {} to {}",
                reading.utility_type, room.room_number, reading.period_start, reading.period_end
            )
        });
        let now = Utc::now();
        let payments: Vec<Payment> = boarders
            .iter()
            .zip(shares)
            .map(|(boarder, share)| Payment {
                id: Uuid::new_v4(),
                boarder_id: boarder.id,
                amount: share,
                payment_type: PaymentType::Utility,
                status: PaymentStatus::Pending,
                due_date: input.due_date,
                paid_date: None,
                description: Some(description.clone()),
                created_at: now,
                updated_at: now,
            })
            .collect();
        self.ctx.store.bill_reading(reading.id, now, &payments).await?;
        tracing::info!(reading_id = %reading.id, %amount, payments = payments.len(), "Utility reading billed");

        self.ctx
            .publish(DomainEvent::ReadingBilled {
                reading_id: reading.id,
                payment_ids: payments.iter().map(|p| p.id).collect(),
            })
            .await?;
        Ok(payments)
    }
}

/// Equal shares rounded down to cents; the remainder lands on the last.
pub fn split_amount(total: Decimal, parts: usize) -> Vec<Decimal> {
    if parts == 0 {
        return Vec::new();
    }
    let share = (total / Decimal::from(parts)).round_dp_with_strategy(2, RoundingStrategy::ToZero);
    let mut shares = vec![share; parts];
    shares[parts - 1] = total - share * Decimal::from(parts - 1);
    shares
}
