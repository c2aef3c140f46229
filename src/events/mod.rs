//! Domain event fan-out.
//!
//! Services publish a [`DomainEvent`] after a write succeeds. The bus is
//! injected through `AppState`, so tests can swap in a
//! [`RecordingEventBus`] and assert on what was published.

pub mod bus;
pub mod event;
pub mod handlers;

pub use bus::{EventBus, EventError, EventHandler, InMemoryEventBus, RecordingEventBus};
pub use event::{DomainEvent, EventKind};
pub use handlers::AuditLogHandler;
