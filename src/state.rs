use std::sync::Arc;

use crate::config::AppConfig;
use crate::database::Store;
use crate::events::EventBus;
use crate::services::{
    AuthService, BoarderService, DashboardService, PaymentService, PortalService, RoomService, ServiceContext,
    UserService, UtilityService,
};

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub services: ServiceContext,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, events: Arc<dyn EventBus>, config: Arc<AppConfig>) -> Self {
        Self {
            services: ServiceContext::new(store, events),
            config,
        }
    }

    pub fn store(&self) -> &dyn Store {
        self.services.store.as_ref()
    }

    pub fn auth(&self) -> AuthService {
        AuthService::new(self.services.clone(), self.config.clone())
    }

    pub fn rooms(&self) -> RoomService {
        RoomService::new(self.services.clone())
    }

    pub fn boarders(&self) -> BoarderService {
        BoarderService::new(self.services.clone())
    }

    pub fn payments(&self) -> PaymentService {
        PaymentService::new(self.services.clone())
    }

    pub fn utilities(&self) -> UtilityService {
        UtilityService::new(self.services.clone())
    }

    pub fn users(&self) -> UserService {
        UserService::new(self.services.clone())
    }

    pub fn dashboard(&self) -> DashboardService {
        DashboardService::new(self.services.clone())
    }

    pub fn portal(&self) -> PortalService {
        PortalService::new(self.services.clone())
    }
}
