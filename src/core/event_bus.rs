//! Pub/Sub event bus between the UI layer and the view controllers.
//!
//! - `subscribe::<E>()` registers a callback invoked synchronously by `emit()`
//! - `emit()` also queues the event; `poll()` drains the queue for batch
//!   dispatch in the update loop (see `main_events::handle_carousel_event`)
//!
//! Callbacks for one event type run in subscription order. No ordering is
//! guaranteed across event types.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use log::warn;

/// Queue length at which the oldest half is evicted
const MAX_QUEUE_SIZE: usize = 1000;

/// Marker trait for events.
pub trait Event: Any + Send + Sync + 'static {
    fn as_any(&self) -> &dyn Any;
    fn type_name(&self) -> &'static str;
}

impl<T: Any + Send + Sync + 'static> Event for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

type Callback = Arc<dyn Fn(&dyn Any) + Send + Sync>;
type Subscribers = Arc<RwLock<HashMap<TypeId, Vec<Callback>>>>;
type Queue = Arc<Mutex<Vec<BoxedEvent>>>;

pub type BoxedEvent = Box<dyn Event>;

fn deliver<E: Event + Clone>(subscribers: &Subscribers, queue: &Queue, event: E) {
    if let Some(cbs) = subscribers
        .read()
        .unwrap_or_else(|e| e.into_inner())
        .get(&TypeId::of::<E>())
    {
        for cb in cbs {
            cb(&event);
        }
    }

    let mut queue = queue.lock().unwrap_or_else(|e| e.into_inner());
    if queue.len() >= MAX_QUEUE_SIZE {
        let evict_count = queue.len() / 2;
        warn!("Event queue full ({} events), evicting oldest {}", queue.len(), evict_count);
        queue.drain(0..evict_count);
    }
    queue.push(Box::new(event));
}

#[derive(Clone, Default)]
pub struct EventBus {
    subscribers: Subscribers,
    queue: Queue,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to events of type `E`.
    pub fn subscribe<E, F>(&self, callback: F)
    where
        E: Event,
        F: Fn(&E) + Send + Sync + 'static,
    {
        let wrapped: Callback = Arc::new(move |any: &dyn Any| {
            if let Some(event) = any.downcast_ref::<E>() {
                callback(event);
            }
        });
        self.subscribers
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .entry(TypeId::of::<E>())
            .or_default()
            .push(wrapped);
    }

    /// Invoke subscribers now and queue for `poll()`.
    pub fn emit<E: Event + Clone>(&self, event: E) {
        deliver(&self.subscribers, &self.queue, event);
    }

    /// Drain all events emitted since the last poll.
    pub fn poll(&self) -> Vec<BoxedEvent> {
        std::mem::take(&mut *self.queue.lock().unwrap_or_else(|e| e.into_inner()))
    }

    /// Handle for components that only emit.
    pub fn emitter(&self) -> ViewEmitter {
        ViewEmitter {
            inner: Some((Arc::clone(&self.subscribers), Arc::clone(&self.queue))),
        }
    }

    pub fn unsubscribe_all<E: Event>(&self) {
        self.subscribers
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&TypeId::of::<E>());
    }

    pub fn queue_len(&self) -> usize {
        self.queue.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

/// Emitter handle held by controllers. `ViewEmitter::default()` is a no-op,
/// for controllers built before (or without) an event bus.
#[derive(Clone, Default)]
pub struct ViewEmitter {
    inner: Option<(Subscribers, Queue)>,
}

impl ViewEmitter {
    pub fn emit<E: Event + Clone>(&self, event: E) {
        if let Some((subscribers, queue)) = &self.inner {
            deliver(subscribers, queue, event);
        }
    }

    pub fn is_connected(&self) -> bool {
        self.inner.is_some()
    }
}

impl std::fmt::Debug for ViewEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewEmitter").field("connected", &self.is_connected()).finish()
    }
}

/// Downcast a queued event.
///
/// The explicit `**` deref is required: `Box<dyn Event>` itself satisfies the
/// blanket `Event` impl, and calling `as_any()` on the box would yield the
/// box's `TypeId` instead of the event's.
#[inline]
pub fn downcast_event<E: Event>(event: &BoxedEvent) -> Option<&E> {
    (**event).as_any().downcast_ref::<E>()
}
