//! FOLIO - portfolio site core
//!
//! Related-content ranking and the image carousel/lightbox state machines,
//! independent of any UI toolkit.

// Core engine (scoring, carousel, lightbox, host collaborators)
pub mod core;

// App modules
pub mod cli;
pub mod config;
pub mod entities;
pub mod main_events;

// Re-export commonly used types from core
pub use crate::core::carousel::{Carousel, CarouselProps, DisplayMode};
pub use crate::core::event_bus::{BoxedEvent, EventBus, ViewEmitter, downcast_event};
pub use crate::core::lightbox::Lightbox;
pub use crate::core::relevance::{RelatedCache, RelevanceScorer, ScoredCandidate, select_related};

// Re-export entities
pub use entities::{ContentItem, ContentPool, MediaItem, MediaSequence};
