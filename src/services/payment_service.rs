use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use super::{found, in_range, ServiceContext};
use crate::database::models::{Payment, PaymentFilter, PaymentSummary};
use crate::error::ApiError;
use crate::events::DomainEvent;
use crate::types::PaymentStatus;
use crate::validation::inputs::{CreatePaymentInput, MarkPaidInput, UpdatePaymentInput};

#[derive(Clone)]
pub struct PaymentService {
    ctx: ServiceContext,
}

impl PaymentService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    pub async fn list(&self, filter: &PaymentFilter) -> Result<Vec<Payment>, ApiError> {
        Ok(self.ctx.store.list_payments(filter).await?)
    }

    pub async fn get(&self, id: Uuid) -> Result<Payment, ApiError> {
        found(self.ctx.store.get_payment(id).await?, "Payment", id)
    }

    pub async fn create(&self, input: CreatePaymentInput) -> Result<Payment, ApiError> {
        found(
            self.ctx.store.get_boarder(input.boarder_id).await?,
            "Boarder",
            input.boarder_id,
        )?;

        let now = Utc::now();
        let status = input.status.unwrap_or(PaymentStatus::Pending);
        let mut payment = Payment {
            id: Uuid::new_v4(),
            boarder_id: input.boarder_id,
            amount: input.amount,
            payment_type: input.payment_type,
            status,
            due_date: input.due_date,
            paid_date: input.paid_date,
            description: input.description,
            created_at: now,
            updated_at: now,
        };
        stamp_paid_date(&mut payment);

        self.ctx.store.insert_payment(&payment).await?;
        tracing::info!(payment_id = %payment.id, boarder_id = %payment.boarder_id, amount = %payment.amount, "Payment created");

        self.ctx
            .publish(DomainEvent::PaymentCreated {
                payment_id: payment.id,
                boarder_id: payment.boarder_id,
                amount: payment.amount,
            })
            .await?;
        Ok(payment)
    }

    /// Any status may be set from any other.
    pub async fn update(&self, input: UpdatePaymentInput) -> Result<Payment, ApiError> {
        let mut payment = self.get(input.id).await?;

        if let Some(amount) = input.amount {
            payment.amount = amount;
        }
        if let Some(payment_type) = input.payment_type {
            payment.payment_type = payment_type;
        }
        if let Some(status) = input.status {
            payment.status = status;
        }
        if let Some(due_date) = input.due_date {
            payment.due_date = due_date;
        }
        if let Some(paid_date) = input.paid_date {
            payment.paid_date = Some(paid_date);
        }
        if let Some(description) = input.description {
            payment.description = Some(description);
        }
        stamp_paid_date(&mut payment);
        payment.updated_at = Utc::now();

        self.ctx.store.update_payment(&payment).await?;
        self.ctx
            .publish(DomainEvent::PaymentUpdated {
                payment_id: payment.id,
                status: payment.status,
            })
            .await?;
        Ok(payment)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), ApiError> {
        self.ctx.store.delete_payment(id).await?;
        self.ctx.publish(DomainEvent::PaymentDeleted { payment_id: id }).await
    }

    /// Set PAID regardless of the current status. The paid date is the
    /// supplied one, or now.
    pub async fn mark_as_paid(&self, input: MarkPaidInput) -> Result<Payment, ApiError> {
        let mut payment = self.get(input.id).await?;
        let previous_status = payment.status;

        payment.status = PaymentStatus::Paid;
        payment.paid_date = Some(input.paid_date.unwrap_or_else(Utc::now));
        payment.updated_at = Utc::now();

        self.ctx.store.update_payment(&payment).await?;
        tracing::info!(payment_id = %payment.id, from = %previous_status, "Payment marked paid");

        self.ctx
            .publish(DomainEvent::PaymentPaid {
                payment_id: payment.id,
                boarder_id: payment.boarder_id,
                previous_status,
            })
            .await?;
        Ok(payment)
    }

    /// Move PENDING payments due before `today` to OVERDUE.
    pub async fn mark_overdue(&self, today: NaiveDate) -> Result<Vec<Payment>, ApiError> {
        let filter = PaymentFilter {
            status: Some(PaymentStatus::Pending),
            due_to: today.pred_opt(),
            ..Default::default()
        };
        let mut changed = Vec::new();
        for mut payment in self.ctx.store.list_payments(&filter).await? {
            payment.status = PaymentStatus::Overdue;
            payment.updated_at = Utc::now();
            self.ctx.store.update_payment(&payment).await?;
            changed.push(payment);
        }

        if !changed.is_empty() {
            tracing::info!(count = changed.len(), %today, "Payments marked overdue");
            self.ctx
                .publish(DomainEvent::PaymentsMarkedOverdue {
                    payment_ids: changed.iter().map(|p| p.id).collect(),
                })
                .await?;
        }
        Ok(changed)
    }

    pub async fn summary(&self, filter: &PaymentFilter) -> Result<PaymentSummary, ApiError> {
        let payments = self.ctx.store.list_payments(filter).await?;
        in_range(PaymentSummary::from_payments(&payments), "Payment total")
    }
}

fn stamp_paid_date(payment: &mut Payment) {
    if payment.status == PaymentStatus::Paid && payment.paid_date.is_none() {
        payment.paid_date = Some(Utc::now());
    }
}
