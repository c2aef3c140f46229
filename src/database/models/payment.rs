use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::types::{PaymentStatus, PaymentType};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: Uuid,
    pub boarder_id: Uuid,
    pub amount: Decimal,
    #[serde(rename = "type")]
    pub payment_type: PaymentType,
    pub status: PaymentStatus,
    pub due_date: NaiveDate,
    pub paid_date: Option<DateTime<Utc>>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentFilter {
    pub status: Option<PaymentStatus>,
    #[serde(rename = "type")]
    pub payment_type: Option<PaymentType>,
    pub boarder_id: Option<Uuid>,
    /// Inclusive lower bound on due date
    pub due_from: Option<NaiveDate>,
    /// Inclusive upper bound on due date
    pub due_to: Option<NaiveDate>,
}

impl PaymentFilter {
    pub fn for_boarder(boarder_id: Uuid) -> Self {
        Self {
            boarder_id: Some(boarder_id),
            ..Default::default()
        }
    }

    pub fn matches(&self, payment: &Payment) -> bool {
        self.status.map_or(true, |s| payment.status == s)
            && self.payment_type.map_or(true, |t| payment.payment_type == t)
            && self.boarder_id.map_or(true, |b| payment.boarder_id == b)
            && self.due_from.map_or(true, |d| payment.due_date >= d)
            && self.due_to.map_or(true, |d| payment.due_date <= d)
    }
}

/// Count and total for one payment status
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusTotal {
    pub count: u64,
    pub total: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSummary {
    pub pending: StatusTotal,
    pub paid: StatusTotal,
    pub overdue: StatusTotal,
    pub cancelled: StatusTotal,
}

impl PaymentSummary {
    /// `None` when a status total overflows
    pub fn from_payments<'a>(payments: impl IntoIterator<Item = &'a Payment>) -> Option<Self> {
        let mut summary = Self::default();
        for payment in payments {
            let bucket = match payment.status {
                PaymentStatus::Pending => &mut summary.pending,
                PaymentStatus::Paid => &mut summary.paid,
                PaymentStatus::Overdue => &mut summary.overdue,
                PaymentStatus::Cancelled => &mut summary.cancelled,
            };
            bucket.count += 1;
            bucket.total = bucket.total.checked_add(payment.amount)?;
        }
        Some(summary)
    }

    /// Amount still owed: pending plus overdue
    pub fn outstanding(&self) -> Option<Decimal> {
        self.pending.total.checked_add(self.overdue.total)
    }
}
