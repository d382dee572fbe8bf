//! Synchronous in-process event bus
//!
//! Devices publish change events here; use cases subscribe once at
//! registration. `publish` runs every handler before returning, in
//! subscription order, and never holds the handler list lock while a handler
//! runs so handlers may call back into features or the bus.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::device::DeviceRemote;
use crate::error::Result;
use crate::model::{EntityAddress, FeatureAddress, FunctionData, FunctionType};

/// What kind of element changed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventType {
    DeviceChange,
    EntityChange,
    DataChange,
    SubscriptionChange,
}

/// How it changed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementChange {
    Add,
    Update,
    Delete,
    Remove,
}

/// Event delivered to handlers
#[derive(Debug, Clone)]
pub struct EventPayload {
    /// SKI of the remote device the change relates to
    pub ski: String,
    pub event_type: EventType,
    pub change_type: ElementChange,
    pub device: Option<Arc<DeviceRemote>>,
    pub entity: Option<EntityAddress>,
    pub feature: Option<FeatureAddress>,
    pub function: Option<FunctionType>,
    pub data: Option<FunctionData>,
}

impl EventPayload {
    pub fn new(ski: impl Into<String>, event_type: EventType, change_type: ElementChange) -> Self {
        Self {
            ski: ski.into(),
            event_type,
            change_type,
            device: None,
            entity: None,
            feature: None,
            function: None,
            data: None,
        }
    }

    pub fn with_device(mut self, device: Arc<DeviceRemote>) -> Self {
        self.device = Some(device);
        self
    }

    pub fn with_feature(mut self, feature: FeatureAddress) -> Self {
        self.entity = Some(feature.entity_address());
        self.feature = Some(feature);
        self
    }

    pub fn with_data(mut self, function: FunctionType, data: Option<FunctionData>) -> Self {
        self.function = Some(function);
        self.data = data;
        self
    }
}

/// Receiver of bus events
pub trait EventHandler: Send + Sync {
    fn handle_event(&self, payload: &EventPayload) -> Result<()>;
}

pub type HandlerId = u64;

/// Explicitly constructed event bus, shared as `Arc<EventBus>`
#[derive(Default)]
pub struct EventBus {
    handlers: RwLock<Vec<(HandlerId, Arc<dyn EventHandler>)>>,
    next_id: AtomicU64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler; it receives every event published afterwards
    pub fn subscribe(&self, handler: Arc<dyn EventHandler>) -> HandlerId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.handlers.write().push((id, handler));
        debug!("EventBus: handler {} subscribed", id);
        id
    }

    /// Remove a handler, returns false if it was not registered
    pub fn unsubscribe(&self, id: HandlerId) -> bool {
        let mut handlers = self.handlers.write();
        let before = handlers.len();
        handlers.retain(|(handler_id, _)| *handler_id != id);
        before != handlers.len()
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.read().len()
    }

    /// Deliver `payload` to all handlers
    pub fn publish(&self, payload: EventPayload) {
        let handlers: Vec<(HandlerId, Arc<dyn EventHandler>)> = self.handlers.read().clone();

        debug!(
            "EventBus: {:?}/{:?} from {} to {} handlers",
            payload.event_type,
            payload.change_type,
            payload.ski,
            handlers.len()
        );

        for (id, handler) in handlers {
            if let Err(e) = handler.handle_event(&payload) {
                warn!("EventBus: handler {} failed: {}", id, e);
            }
        }
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("handlers", &self.handler_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SpineError;
    use parking_lot::Mutex;

    struct Recorder {
        name: &'static str,
        log: Arc<Mutex<Vec<String>>>,
        fail: bool,
    }

    impl EventHandler for Recorder {
        fn handle_event(&self, payload: &EventPayload) -> Result<()> {
            self.log.lock().push(format!("{}:{}", self.name, payload.ski));
            if self.fail {
                return Err(SpineError::DeviceNotFound(payload.ski.clone()));
            }
            Ok(())
        }
    }

    fn recorder(name: &'static str, log: &Arc<Mutex<Vec<String>>>, fail: bool) -> Arc<Recorder> {
        Arc::new(Recorder {
            name,
            log: log.clone(),
            fail,
        })
    }

    #[test]
    fn test_publish_order_and_failures() {
        let bus = EventBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        bus.subscribe(recorder("a", &log, true));
        bus.subscribe(recorder("b", &log, false));

        bus.publish(EventPayload::new("ski1", EventType::DeviceChange, ElementChange::Add));
        bus.publish(EventPayload::new("ski2", EventType::DataChange, ElementChange::Update));

        assert_eq!(
            *log.lock(),
            vec!["a:ski1", "b:ski1", "a:ski2", "b:ski2"]
        );
    }

    #[test]
    fn test_unsubscribe() {
        let bus = EventBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        let id = bus.subscribe(recorder("a", &log, false));
        assert_eq!(bus.handler_count(), 1);
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));

        bus.publish(EventPayload::new("ski1", EventType::DeviceChange, ElementChange::Add));
        assert!(log.lock().is_empty());
    }

    struct Reentrant {
        bus: Arc<EventBus>,
        seen: Arc<Mutex<usize>>,
    }

    impl EventHandler for Reentrant {
        fn handle_event(&self, payload: &EventPayload) -> Result<()> {
            *self.seen.lock() += 1;
            if payload.change_type == ElementChange::Add {
                self.bus.publish(EventPayload::new(
                    payload.ski.clone(),
                    EventType::DataChange,
                    ElementChange::Update,
                ));
            }
            Ok(())
        }
    }

    #[test]
    fn test_handler_may_publish() {
        let bus = Arc::new(EventBus::new());
        let seen = Arc::new(Mutex::new(0));

        bus.subscribe(Arc::new(Reentrant {
            bus: bus.clone(),
            seen: seen.clone(),
        }));
        bus.publish(EventPayload::new("ski1", EventType::DeviceChange, ElementChange::Add));

        assert_eq!(*seen.lock(), 2);
    }
}
