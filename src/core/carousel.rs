//! Image carousel: cyclic navigation, autoplay and cross-fade layering.
//!
//! # Navigation
//!
//! - `next()`: `(i + 1) % n`
//! - `previous()`: `(i + n - 1) % n`
//! - `goto(i)`: clamped to `[0, n-1]`
//! - autoplay tick: same as `next()`, only while not paused and `n > 1`
//!
//! # Cross-fade
//!
//! Each index change starts a [`Transition`]. In [`DisplayMode::Cover`] the
//! renderer draws `previous_index` opaque underneath and fades `current_index`
//! in on top, so a slow image load never flashes an empty frame. When the
//! fade ends the renderer reports `complete_transition(id)` and
//! `previous_index` catches up to the index the transition moved to. Reports
//! for superseded transitions are ignored.
//!
//! # Autoplay
//!
//! The carousel owns at most one [`IntervalHandle`]. Every restart drops the
//! old handle (clearing it on the host) before scheduling a new one, and a
//! tick carrying any other timer id is ignored. Restarts happen on mount,
//! on interval/autoplay prop changes and on pause toggles.
//!
//! # Lifecycle
//!
//! `on_mount()` / `on_props_changed()` / `on_unmount()` mirror the view's
//! lifecycle. Dropping the carousel releases the timer and any lightbox
//! scroll lock as well, so navigating away without `on_unmount()` leaks
//! nothing.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};

use crate::core::carousel_events::CurrentIndexChangedEvent;
use crate::core::event_bus::ViewEmitter;
use crate::core::lightbox::Lightbox;
use crate::core::scroll_lock::ScrollHost;
use crate::core::timers::{IntervalHandle, TimerHost, TimerId};
use crate::entities::{MediaItem, MediaSequence};

pub const DEFAULT_AUTOPLAY_INTERVAL_MS: u64 = 4000;

/// How slides are composed during a fade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    /// Full-bleed, previous slide kept underneath the fading one
    #[default]
    Cover,
    /// Letterboxed, single image fades in place
    Contain,
}

/// View-supplied configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarouselProps {
    pub autoplay: bool,
    pub interval_ms: u64,
    pub display: DisplayMode,
}

impl Default for CarouselProps {
    fn default() -> Self {
        Self {
            autoplay: true,
            interval_ms: DEFAULT_AUTOPLAY_INTERVAL_MS,
            display: DisplayMode::Cover,
        }
    }
}

impl CarouselProps {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

/// In-flight fade toward `to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub id: u64,
    pub from: usize,
    pub to: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerRole {
    /// Opaque, shows `previous_index`
    Background,
    /// Fades in `current_index`
    Foreground,
    /// Contain mode: the only layer
    Single,
}

/// One image layer to draw, bottom to top.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layer<'a> {
    pub index: usize,
    pub role: LayerRole,
    pub media: &'a MediaItem,
}

pub struct Carousel {
    images: MediaSequence,
    current: usize,
    previous: usize,
    transition: Option<Transition>,
    next_transition_id: u64,
    paused: bool,
    props: CarouselProps,
    mounted: bool,
    timers: Arc<dyn TimerHost>,
    autoplay: Option<IntervalHandle>,
    lightbox: Lightbox,
    emitter: ViewEmitter,
}

impl Carousel {
    /// Create a carousel over `images`.
    ///
    /// Returns `None` for an empty sequence: there is nothing to render and
    /// no meaningful state.
    pub fn new(
        images: MediaSequence,
        props: CarouselProps,
        timers: Arc<dyn TimerHost>,
        scroll: Arc<dyn ScrollHost>,
    ) -> Option<Self> {
        if images.is_empty() {
            debug!("Carousel: empty image list, nothing to render");
            return None;
        }
        debug!("Carousel created: {} image(s), {:?}", images.len(), props);
        Some(Self {
            images,
            current: 0,
            previous: 0,
            transition: None,
            next_transition_id: 0,
            paused: false,
            props,
            mounted: false,
            timers,
            autoplay: None,
            lightbox: Lightbox::new(scroll),
            emitter: ViewEmitter::default(),
        })
    }

    /// Connect to an event bus. Also used by the owned lightbox.
    pub fn set_emitter(&mut self, emitter: ViewEmitter) {
        self.lightbox.set_emitter(emitter.clone());
        self.emitter = emitter;
    }

    // ========== State ==========

    pub fn images(&self) -> &MediaSequence {
        &self.images
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn previous_index(&self) -> usize {
        self.previous
    }

    pub fn current(&self) -> &MediaItem {
        &self.images[self.current]
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn props(&self) -> CarouselProps {
        self.props
    }

    pub fn transition(&self) -> Option<Transition> {
        self.transition
    }

    /// Arrows and dots only make sense with more than one image.
    pub fn show_controls(&self) -> bool {
        self.images.len() > 1
    }

    /// Id of the live autoplay interval, if any.
    pub fn autoplay_timer(&self) -> Option<TimerId> {
        self.autoplay.as_ref().map(IntervalHandle::id)
    }

    pub fn lightbox(&self) -> &Lightbox {
        &self.lightbox
    }

    /// Layers to draw, bottom first.
    pub fn layers(&self) -> Vec<Layer<'_>> {
        match self.props.display {
            DisplayMode::Cover => vec![
                Layer {
                    index: self.previous,
                    role: LayerRole::Background,
                    media: &self.images[self.previous],
                },
                Layer {
                    index: self.current,
                    role: LayerRole::Foreground,
                    media: &self.images[self.current],
                },
            ],
            DisplayMode::Contain => vec![Layer {
                index: self.current,
                role: LayerRole::Single,
                media: &self.images[self.current],
            }],
        }
    }

    // ========== Navigation ==========

    pub fn next(&mut self) {
        let len = self.images.len();
        self.set_current((self.current + 1) % len);
    }

    pub fn previous(&mut self) {
        let len = self.images.len();
        self.set_current((self.current + len - 1) % len);
    }

    /// Jump to `index`. Out-of-range indices are clamped to the last image.
    pub fn goto(&mut self, index: usize) {
        let clamped = self.images.clamp_index(index);
        if clamped != index {
            warn!("Carousel: goto({}) out of range, clamped to {}", index, clamped);
        }
        self.set_current(clamped);
    }

    fn set_current(&mut self, index: usize) {
        if index == self.current {
            return;
        }
        let id = self.next_transition_id;
        self.next_transition_id += 1;
        self.transition = Some(Transition {
            id,
            from: self.current,
            to: index,
        });
        trace!("Carousel: {} -> {} (transition {})", self.current, index, id);
        self.current = index;
        self.emitter.emit(CurrentIndexChangedEvent {
            index,
            previous: self.previous,
        });
    }

    /// Fade `id` finished. Returns false for a stale or unknown transition.
    pub fn complete_transition(&mut self, id: u64) -> bool {
        match self.transition {
            Some(t) if t.id == id => {
                self.previous = t.to;
                self.transition = None;
                true
            }
            _ => {
                trace!("Carousel: ignoring stale transition {}", id);
                false
            }
        }
    }

    // ========== Autoplay ==========

    /// Deliver a host timer tick. Returns true if it advanced the carousel.
    pub fn on_timer(&mut self, id: TimerId) -> bool {
        if self.autoplay_timer() != Some(id) {
            trace!("Carousel: ignoring tick from {}", id);
            return false;
        }
        if self.paused || self.images.len() <= 1 {
            return false;
        }
        self.next();
        true
    }

    pub fn set_paused(&mut self, paused: bool) {
        if self.paused == paused {
            return;
        }
        self.paused = paused;
        debug!("Carousel {}", if paused { "paused" } else { "resumed" });
        self.restart_autoplay();
    }

    pub fn toggle_pause(&mut self) {
        self.set_paused(!self.paused);
    }

    fn wants_autoplay(&self) -> bool {
        self.mounted && self.props.autoplay && !self.paused && self.images.len() > 1
    }

    /// Single-flight restart: clear first, then schedule.
    fn restart_autoplay(&mut self) {
        self.autoplay = None;
        if self.wants_autoplay() {
            self.autoplay = Some(IntervalHandle::start(&self.timers, self.props.interval()));
            trace!("Carousel: autoplay every {}ms", self.props.interval_ms);
        }
    }

    // ========== Lifecycle ==========

    pub fn on_mount(&mut self) {
        self.mounted = true;
        self.restart_autoplay();
    }

    /// Apply new props. The timer is only restarted when something it
    /// depends on changed.
    pub fn on_props_changed(&mut self, props: CarouselProps) {
        let old = std::mem::replace(&mut self.props, props);
        if old.autoplay != props.autoplay || old.interval_ms != props.interval_ms {
            self.restart_autoplay();
        }
    }

    pub fn on_unmount(&mut self) {
        self.mounted = false;
        self.autoplay = None;
        self.lightbox.close();
    }

    // ========== Lightbox ==========

    /// Open the lightbox on an arbitrary gallery.
    pub fn open_lightbox(&mut self, images: MediaSequence, start: usize) -> bool {
        self.lightbox.open(images, start)
    }

    /// Open the lightbox on this carousel's own images at the current slide.
    pub fn open_lightbox_here(&mut self) -> bool {
        self.lightbox.open(self.images.clone(), self.current)
    }

    pub fn close_lightbox(&mut self) -> bool {
        self.lightbox.close()
    }

    pub fn lightbox_next(&mut self) {
        self.lightbox.next();
    }

    pub fn lightbox_previous(&mut self) {
        self.lightbox.previous();
    }

    /// Route a key press to the lightbox bindings.
    pub fn handle_key(&mut self, key: &str) -> bool {
        self.lightbox.handle_key(key)
    }
}

impl std::fmt::Debug for Carousel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Carousel")
            .field("len", &self.images.len())
            .field("current", &self.current)
            .field("previous", &self.previous)
            .field("paused", &self.paused)
            .field("autoplay", &self.autoplay)
            .field("lightbox", &self.lightbox)
            .finish()
    }
}
