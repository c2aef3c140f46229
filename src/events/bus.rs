use async_trait::async_trait;
use futures::future::join_all;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};

use super::event::{DomainEvent, EventKind};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum EventError {
    #[error("handler '{handler}' failed on {kind:?}: {message}")]
    HandlerFailed {
        handler: &'static str,
        kind: EventKind,
        message: String,
    },
}

impl EventError {
    pub fn handler_failed(handler: &'static str, kind: EventKind, message: impl Into<String>) -> Self {
        EventError::HandlerFailed {
            handler,
            kind,
            message: message.into(),
        }
    }
}

/// Reacts to published events.
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Handler name for logging
    fn name(&self) -> &'static str;

    async fn handle(&self, event: &DomainEvent) -> Result<(), EventError>;
}

/// Publish/subscribe port held by the services.
#[async_trait]
pub trait EventBus: Send + Sync {
    async fn subscribe(&self, kind: EventKind, handler: Arc<dyn EventHandler>);

    /// Deliver `event` to every handler subscribed to its kind and wait for
    /// all of them. Handlers run concurrently and one failing does not stop
    /// the others; the first failure is returned once all have finished.
    async fn publish(&self, event: DomainEvent) -> Result<(), EventError>;
}

/// Process-local bus. Handlers only see events published after they
/// subscribed; nothing is persisted or redelivered.
#[derive(Default)]
pub struct InMemoryEventBus {
    handlers: RwLock<HashMap<EventKind, Vec<Arc<dyn EventHandler>>>>,
}

impl InMemoryEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe one handler to every kind
    pub async fn subscribe_all(&self, handler: Arc<dyn EventHandler>) {
        for &kind in EventKind::ALL {
            self.subscribe(kind, handler.clone()).await;
        }
    }

    pub async fn handler_count(&self, kind: EventKind) -> usize {
        self.handlers.read().await.get(&kind).map_or(0, Vec::len)
    }
}

#[async_trait]
impl EventBus for InMemoryEventBus {
    async fn subscribe(&self, kind: EventKind, handler: Arc<dyn EventHandler>) {
        tracing::debug!(handler = handler.name(), ?kind, "Registered event handler");
        self.handlers.write().await.entry(kind).or_default().push(handler);
    }

    async fn publish(&self, event: DomainEvent) -> Result<(), EventError> {
        let kind = event.kind();
        // Snapshot so handlers can subscribe without deadlocking the bus
        let handlers = match self.handlers.read().await.get(&kind) {
            Some(handlers) => handlers.clone(),
            None => return Ok(()),
        };

        let results = join_all(handlers.iter().map(|handler| handler.handle(&event))).await;

        let mut first_error = None;
        for (handler, result) in handlers.iter().zip(results) {
            if let Err(e) = result {
                tracing::warn!(handler = handler.name(), ?kind, error = %e, "Event handler failed");
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

/// Bus for tests: records every published event, then delivers it through
/// an inner [`InMemoryEventBus`].
#[derive(Default)]
pub struct RecordingEventBus {
    inner: InMemoryEventBus,
    published: Mutex<Vec<DomainEvent>>,
}

impl RecordingEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn events(&self) -> Vec<DomainEvent> {
        self.published.lock().await.clone()
    }

    pub async fn kinds(&self) -> Vec<EventKind> {
        self.published.lock().await.iter().map(DomainEvent::kind).collect()
    }

    pub async fn clear(&self) {
        self.published.lock().await.clear();
    }
}

#[async_trait]
impl EventBus for RecordingEventBus {
    async fn subscribe(&self, kind: EventKind, handler: Arc<dyn EventHandler>) {
        self.inner.subscribe(kind, handler).await;
    }

    async fn publish(&self, event: DomainEvent) -> Result<(), EventError> {
        self.published.lock().await.push(event.clone());
        self.inner.publish(event).await
    }
}
