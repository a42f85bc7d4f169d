//! Core engine: related-content scoring, carousel/lightbox state machines,
//! and the host collaborators they talk to (timers, scroll lock, key-value
//! storage, event bus).
//!
//! Nothing here renders; the UI layer feeds events in and draws the state.

pub mod carousel;
pub mod carousel_events;
pub mod event_bus;
pub mod keys;
pub mod kv_store;
pub mod lightbox;
pub mod relevance;
pub mod scroll_lock;
pub mod timers;

pub use carousel::{Carousel, CarouselProps, DisplayMode};
pub use event_bus::EventBus;
pub use kv_store::{ContentCache, KvStore, MemoryStore};
pub use lightbox::Lightbox;
pub use relevance::{RelatedCache, RelevanceScorer, RelevanceWeights, ScoredCandidate, select_related};
pub use scroll_lock::{PageScroll, ScrollHost};
pub use timers::{IntervalTimers, TimerHost, TimerId};
