use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::types::UtilityType;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UtilityReading {
    pub id: Uuid,
    pub room_id: Uuid,
    #[serde(rename = "type")]
    pub utility_type: UtilityType,
    pub previous_reading: Decimal,
    pub current_reading: Decimal,
    pub rate_per_unit: Decimal,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub reading_date: NaiveDate,
    /// Set once the reading has been split into payments
    pub billed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UtilityReading {
    pub fn consumption(&self) -> Option<Decimal> {
        self.current_reading.checked_sub(self.previous_reading)
    }

    /// Billable amount, rounded to cents. `None` when the product overflows.
    pub fn amount(&self) -> Option<Decimal> {
        self.consumption()?
            .checked_mul(self.rate_per_unit)
            .map(|amount| amount.round_dp(2))
    }

    pub fn is_billed(&self) -> bool {
        self.billed_at.is_some()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UtilityFilter {
    pub room_id: Option<Uuid>,
    #[serde(rename = "type")]
    pub utility_type: Option<UtilityType>,
    /// Readings whose period ends on or after this date
    pub period_from: Option<NaiveDate>,
    /// Readings whose period starts on or before this date
    pub period_to: Option<NaiveDate>,
}

impl UtilityFilter {
    pub fn matches(&self, reading: &UtilityReading) -> bool {
        self.room_id.map_or(true, |r| reading.room_id == r)
            && self.utility_type.map_or(true, |t| reading.utility_type == t)
            && self.period_from.map_or(true, |d| reading.period_end >= d)
            && self.period_to.map_or(true, |d| reading.period_start <= d)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumptionLine {
    pub reading_id: Uuid,
    pub room_id: Uuid,
    #[serde(rename = "type")]
    pub utility_type: UtilityType,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub consumption: Decimal,
    pub rate_per_unit: Decimal,
    pub amount: Decimal,
}

impl ConsumptionLine {
    pub fn new(reading: &UtilityReading) -> Option<Self> {
        Some(Self {
            reading_id: reading.id,
            room_id: reading.room_id,
            utility_type: reading.utility_type,
            period_start: reading.period_start,
            period_end: reading.period_end,
            consumption: reading.consumption()?,
            rate_per_unit: reading.rate_per_unit,
            amount: reading.amount()?,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeTotal {
    pub consumption: Decimal,
    pub amount: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumptionSummary {
    pub lines: Vec<ConsumptionLine>,
    pub by_type: BTreeMap<String, TypeTotal>,
    pub total_amount: Decimal,
}

impl ConsumptionSummary {
    /// `None` when a line or a running total overflows
    pub fn from_readings<'a>(readings: impl IntoIterator<Item = &'a UtilityReading>) -> Option<Self> {
        let mut summary = Self::default();
        for reading in readings {
            let line = ConsumptionLine::new(reading)?;
            let bucket = summary
                .by_type
                .entry(line.utility_type.as_str().to_string())
                .or_default();
            bucket.consumption = bucket.consumption.checked_add(line.consumption)?;
            bucket.amount = bucket.amount.checked_add(line.amount)?;
            summary.total_amount = summary.total_amount.checked_add(line.amount)?;
            summary.lines.push(line);
        }
        Some(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(previous: Decimal, current: Decimal, rate: Decimal) -> UtilityReading {
        let now = Utc::now();
        UtilityReading {
            id: Uuid::new_v4(),
            room_id: Uuid::new_v4(),
            utility_type: UtilityType::Water,
            previous_reading: previous,
            current_reading: current,
            rate_per_unit: rate,
            period_start: now.date_naive(),
            period_end: now.date_naive(),
            reading_date: now.date_naive(),
            billed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn amount_rounds_to_cents() {
        let r = reading(Decimal::new(10, 0), Decimal::new(12_5, 1), Decimal::new(3_3333, 4));
        assert_eq!(r.amount(), Some(Decimal::new(8_33, 2)));
    }

    #[test]
    fn overflowing_amount_is_none() {
        let r = reading(Decimal::ZERO, Decimal::MAX, Decimal::TWO);
        assert_eq!(r.amount(), None);
        assert!(ConsumptionSummary::from_readings([&r]).is_none());
    }
}
