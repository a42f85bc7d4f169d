//! Image references shown by carousels and lightboxes.

use serde::{Deserialize, Serialize};
use std::ops::Index;
use std::sync::Arc;

/// Single image with optional caption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaItem {
    pub src: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

impl MediaItem {
    pub fn new(src: impl Into<String>) -> Self {
        Self { src: src.into(), caption: None }
    }

    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }
}

/// Immutable ordered image list.
///
/// Clones share storage, so a carousel can hand its own images to a lightbox
/// without copying.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaSequence {
    items: Arc<[MediaItem]>,
}

impl MediaSequence {
    pub fn new(items: Vec<MediaItem>) -> Self {
        Self { items: items.into() }
    }

    /// Build from bare image sources (no captions).
    pub fn from_sources<I, S>(sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(sources.into_iter().map(MediaItem::new).collect())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&MediaItem> {
        self.items.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MediaItem> {
        self.items.iter()
    }

    /// Clamp an index into `[0, len-1]`. Returns 0 for an empty sequence.
    pub fn clamp_index(&self, index: usize) -> usize {
        index.min(self.len().saturating_sub(1))
    }
}

impl Index<usize> for MediaSequence {
    type Output = MediaItem;

    fn index(&self, index: usize) -> &MediaItem {
        &self.items[index]
    }
}

impl Default for MediaSequence {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl From<Vec<MediaItem>> for MediaSequence {
    fn from(items: Vec<MediaItem>) -> Self {
        Self::new(items)
    }
}

impl Serialize for MediaSequence {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.items.iter())
    }
}

impl<'de> Deserialize<'de> for MediaSequence {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<MediaItem>::deserialize(deserializer).map(Self::new)
    }
}
