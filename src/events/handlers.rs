use async_trait::async_trait;

use super::bus::{EventError, EventHandler};
use super::event::DomainEvent;

/// Writes every event to the `audit` tracing target.
#[derive(Debug, Default, Clone, Copy)]
pub struct AuditLogHandler;

#[async_trait]
impl EventHandler for AuditLogHandler {
    fn name(&self) -> &'static str {
        "audit_log"
    }

    async fn handle(&self, event: &DomainEvent) -> Result<(), EventError> {
        let payload = serde_json::to_string(event)
            .map_err(|e| EventError::handler_failed(self.name(), event.kind(), e.to_string()))?;
        tracing::info!(target: "audit", kind = ?event.kind(), %payload, "domain event");
        Ok(())
    }
}
