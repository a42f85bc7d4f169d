//! Carousel and lightbox events.

use crate::core::timers::TimerId;
use crate::entities::MediaSequence;

// === Navigation (UI -> carousel) ===

#[derive(Clone, Debug)]
pub struct NextEvent;

#[derive(Clone, Debug)]
pub struct PreviousEvent;

/// Dot click. Out-of-range indices are clamped.
#[derive(Clone, Debug)]
pub struct GotoEvent(pub usize);

#[derive(Clone, Debug)]
pub struct TogglePauseEvent;

/// Hover enter/leave typically maps to `SetPausedEvent(true/false)`
#[derive(Clone, Debug)]
pub struct SetPausedEvent(pub bool);

/// Interval fired on the host
#[derive(Clone, Debug)]
pub struct TimerFiredEvent(pub TimerId);

/// Cross-fade animation finished
#[derive(Clone, Debug)]
pub struct TransitionEndEvent(pub u64);

// === Lightbox (UI -> carousel) ===

/// Open the lightbox. `images: None` reuses the carousel's own images.
#[derive(Clone, Debug)]
pub struct OpenLightboxEvent {
    pub images: Option<MediaSequence>,
    pub start: usize,
}

#[derive(Clone, Debug)]
pub struct CloseLightboxEvent;

/// Key name as reported by the host ("Escape", "ArrowLeft", ...)
#[derive(Clone, Debug)]
pub struct KeyPressedEvent(pub String);

// === State changes (carousel -> UI) ===

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CurrentIndexChangedEvent {
    pub index: usize,
    pub previous: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LightboxChangedEvent {
    pub open: bool,
    pub index: usize,
}
