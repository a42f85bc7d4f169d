//! Data types shared by the core and the views.

pub mod content;
pub mod media;

pub use content::{ContentItem, ContentPool};
pub use media::{MediaItem, MediaSequence};
