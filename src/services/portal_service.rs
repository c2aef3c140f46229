use serde::Serialize;

use super::{in_range, ServiceContext};
use crate::auth::Session;
use crate::database::models::{Boarder, Payment, PaymentFilter, PaymentSummary, Room};
use crate::error::ApiError;

/// What a boarder sees about themselves
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortalProfile {
    pub boarder: Boarder,
    pub room: Option<Room>,
    pub payments: PaymentSummary,
}

#[derive(Clone)]
pub struct PortalService {
    ctx: ServiceContext,
}

impl PortalService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    pub async fn me(&self, session: &Session) -> Result<PortalProfile, ApiError> {
        let boarder = self.boarder(session).await?;
        let room = match boarder.room_id {
            Some(room_id) => self.ctx.store.get_room(room_id).await?,
            None => None,
        };
        let payments = self
            .ctx
            .store
            .list_payments(&PaymentFilter::for_boarder(boarder.id))
            .await?;

        Ok(PortalProfile {
            payments: in_range(PaymentSummary::from_payments(&payments), "Payment total")?,
            boarder,
            room,
        })
    }

    pub async fn payments(&self, session: &Session) -> Result<Vec<Payment>, ApiError> {
        let boarder = self.boarder(session).await?;
        Ok(self
            .ctx
            .store
            .list_payments(&PaymentFilter::for_boarder(boarder.id))
            .await?)
    }

    async fn boarder(&self, session: &Session) -> Result<Boarder, ApiError> {
        let boarder_id = session
            .boarder_id
            .ok_or_else(|| ApiError::not_found("No boarder profile is linked to this account"))?;
        self.ctx
            .store
            .get_boarder(boarder_id)
            .await?
            .ok_or_else(|| ApiError::not_found("No boarder profile is linked to this account"))
    }
}
