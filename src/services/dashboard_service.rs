use rust_decimal::Decimal;
use serde::Serialize;

use super::{in_range, ServiceContext};
use crate::database::models::{BoarderFilter, PaymentFilter, PaymentSummary, RoomFilter};
use crate::error::ApiError;
use crate::types::RoomStatus;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomCounts {
    pub total: u64,
    pub available: u64,
    pub occupied: u64,
    pub maintenance: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LandlordOverview {
    pub rooms: RoomCounts,
    pub total_capacity: i64,
    pub active_boarders: u64,
    pub payments: PaymentSummary,
    pub outstanding: Decimal,
}

#[derive(Clone)]
pub struct DashboardService {
    ctx: ServiceContext,
}

impl DashboardService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    pub async fn overview(&self) -> Result<LandlordOverview, ApiError> {
        let rooms = self.ctx.store.list_rooms(&RoomFilter::default()).await?;
        let active = self
            .ctx
            .store
            .list_boarders(&BoarderFilter {
                is_active: Some(true),
                ..Default::default()
            })
            .await?;
        let payments = self.ctx.store.list_payments(&PaymentFilter::default()).await?;

        let mut counts = RoomCounts::default();
        for room in &rooms {
            counts.total += 1;
            match room.status {
                RoomStatus::Available => counts.available += 1,
                RoomStatus::Occupied => counts.occupied += 1,
                RoomStatus::Maintenance => counts.maintenance += 1,
            }
        }
        let payments = in_range(PaymentSummary::from_payments(&payments), "Payment total")?;

        Ok(LandlordOverview {
            rooms: counts,
            total_capacity: rooms.iter().map(|r| i64::from(r.capacity)).sum(),
            active_boarders: active.len() as u64,
            outstanding: in_range(payments.outstanding(), "Outstanding total")?,
            payments,
        })
    }
}
