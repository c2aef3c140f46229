//! Per-entity operations. Each service validates nothing itself beyond
//! invariants that need stored state; request shapes arrive already
//! validated. Writes publish a `DomainEvent` once they have succeeded.

pub mod auth_service;
pub mod boarder_service;
pub mod dashboard_service;
pub mod payment_service;
pub mod portal_service;
pub mod room_service;
pub mod user_service;
pub mod utility_service;

pub use auth_service::{AuthService, SessionGrant, SessionView};
pub use boarder_service::BoarderService;
pub use dashboard_service::{DashboardService, LandlordOverview, RoomCounts};
pub use payment_service::PaymentService;
pub use portal_service::{PortalProfile, PortalService};
pub use room_service::RoomService;
pub use user_service::UserService;
pub use utility_service::UtilityService;

use std::sync::Arc;
use uuid::Uuid;

use crate::database::Store;
use crate::error::ApiError;
use crate::events::{DomainEvent, EventBus};

/// Dependencies every service holds. Cheap to clone.
#[derive(Clone)]
pub struct ServiceContext {
    pub store: Arc<dyn Store>,
    pub events: Arc<dyn EventBus>,
}

impl ServiceContext {
    pub fn new(store: Arc<dyn Store>, events: Arc<dyn EventBus>) -> Self {
        Self { store, events }
    }

    pub(crate) async fn publish(&self, event: DomainEvent) -> Result<(), ApiError> {
        self.events.publish(event).await.map_err(ApiError::from)
    }
}

/// Turn a lookup miss into NOT_FOUND
pub(crate) fn found<T>(value: Option<T>, entity: &str, id: Uuid) -> Result<T, ApiError> {
    value.ok_or_else(|| ApiError::not_found(format!("{} {} not found", entity, id)))
}

/// Turn an arithmetic overflow into INTERNAL
pub(crate) fn in_range<T>(value: Option<T>, what: &str) -> Result<T, ApiError> {
    value.ok_or_else(|| ApiError::internal(format!("{} exceeds the supported numeric range", what)))
}

pub(crate) fn today() -> chrono::NaiveDate {
    chrono::Utc::now().date_naive()
}
