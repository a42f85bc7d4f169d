//! Full-screen image viewer with its own index space.
//!
//! While open the lightbox holds three resources: its image list + index,
//! the page scroll lock, and its key bindings. All of them live exactly as
//! long as the open session: `close()` or dropping the lightbox releases
//! them. Navigating the lightbox never touches the parent carousel.
//!
//! Keys while open:
//! - **Escape**: close
//! - **ArrowLeft**: previous (wraps)
//! - **ArrowRight**: next (wraps)

use std::sync::Arc;

use log::{debug, warn};

use crate::core::carousel_events::LightboxChangedEvent;
use crate::core::event_bus::ViewEmitter;
use crate::core::keys::{KeyAction, Keymap};
use crate::core::scroll_lock::{ScrollHost, ScrollLockGuard};
use crate::entities::{MediaItem, MediaSequence};

/// State that exists only while the lightbox is open.
#[derive(Debug)]
struct Session {
    images: MediaSequence,
    index: usize,
    _scroll_lock: ScrollLockGuard,
}

pub struct Lightbox {
    scroll: Arc<dyn ScrollHost>,
    keymap: Keymap,
    session: Option<Session>,
    emitter: ViewEmitter,
}

impl Lightbox {
    pub fn new(scroll: Arc<dyn ScrollHost>) -> Self {
        Self {
            scroll,
            keymap: Keymap::new(),
            session: None,
            emitter: ViewEmitter::default(),
        }
    }

    pub fn set_emitter(&mut self, emitter: ViewEmitter) {
        self.emitter = emitter;
    }

    /// Open on `images` at `start` (clamped). Reopening replaces the current
    /// session. Returns false for an empty image list.
    pub fn open(&mut self, images: MediaSequence, start: usize) -> bool {
        if images.is_empty() {
            warn!("Lightbox: refusing to open with no images");
            return false;
        }

        // Release the previous lock before taking a new one so the saved
        // scroll state is the page's real one
        self.close();

        let index = images.clamp_index(start);
        if index != start {
            warn!("Lightbox: start index {} out of range, clamped to {}", start, index);
        }

        let lock = ScrollLockGuard::acquire(&self.scroll);
        self.keymap.bind_lightbox_keys();
        debug!("Lightbox opened at {}/{}", index, images.len());
        self.session = Some(Session {
            images,
            index,
            _scroll_lock: lock,
        });
        self.emitter.emit(LightboxChangedEvent { open: true, index });
        true
    }

    /// Close and release scroll lock and key bindings. Returns false if
    /// already closed.
    pub fn close(&mut self) -> bool {
        let Some(session) = self.session.take() else {
            return false;
        };
        self.keymap.clear();
        drop(session);
        debug!("Lightbox closed");
        self.emitter.emit(LightboxChangedEvent { open: false, index: 0 });
        true
    }

    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    pub fn index(&self) -> Option<usize> {
        self.session.as_ref().map(|s| s.index)
    }

    pub fn images(&self) -> Option<&MediaSequence> {
        self.session.as_ref().map(|s| &s.images)
    }

    pub fn current(&self) -> Option<&MediaItem> {
        self.session.as_ref().and_then(|s| s.images.get(s.index))
    }

    /// Active key bindings (empty while closed).
    pub fn keymap(&self) -> &Keymap {
        &self.keymap
    }

    /// Whether prev/next arrows should render.
    pub fn show_arrows(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.images.len() > 1)
    }

    pub fn next(&mut self) {
        self.step(true);
    }

    pub fn previous(&mut self) {
        self.step(false);
    }

    fn step(&mut self, forward: bool) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let len = session.images.len();
        session.index = if forward {
            (session.index + 1) % len
        } else {
            (session.index + len - 1) % len
        };
        let index = session.index;
        self.emitter.emit(LightboxChangedEvent { open: true, index });
    }

    /// Dispatch a key press. Returns true if a binding handled it.
    pub fn handle_key(&mut self, key: &str) -> bool {
        let Some(action) = self.keymap.lookup(key) else {
            return false;
        };
        match action {
            KeyAction::Close => {
                self.close();
            }
            KeyAction::Previous => self.previous(),
            KeyAction::Next => self.next(),
        }
        true
    }
}

impl std::fmt::Debug for Lightbox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lightbox")
            .field("open", &self.is_open())
            .field("index", &self.index())
            .field("bindings", &self.keymap.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::scroll_lock::PageScroll;

    fn setup() -> (Arc<PageScroll>, Lightbox) {
        let page = Arc::new(PageScroll::default());
        let lightbox = Lightbox::new(page.clone());
        (page, lightbox)
    }

    #[test]
    fn test_keys_navigate_and_close() {
        let (page, mut lb) = setup();
        assert!(!lb.handle_key("ArrowRight"));

        assert!(lb.open(MediaSequence::from_sources(["a", "b", "c"]), 0));
        assert!(page.is_locked());

        assert!(lb.handle_key("ArrowLeft"));
        assert_eq!(lb.index(), Some(2));
        assert!(lb.handle_key("ArrowRight"));
        assert_eq!(lb.index(), Some(0));
        assert!(!lb.handle_key("Enter"));

        assert!(lb.handle_key("Escape"));
        assert!(!lb.is_open());
        assert!(lb.keymap().is_empty());
        assert!(!page.is_locked());
        // No lingering bindings
        assert!(!lb.handle_key("Escape"));
        assert!(!lb.handle_key("ArrowRight"));
    }

    #[test]
    fn test_single_image_opens_and_closes() {
        let (page, mut lb) = setup();
        assert!(lb.open(MediaSequence::from_sources(["only.jpg"]), 0));
        assert!(!lb.show_arrows());
        lb.next();
        assert_eq!(lb.index(), Some(0));
        assert!(lb.close());
        assert_eq!(page.locks(), 1);
        assert_eq!(page.unlocks(), 1);
    }

    #[test]
    fn test_empty_images_do_not_open() {
        let (page, mut lb) = setup();
        assert!(!lb.open(MediaSequence::default(), 0));
        assert!(!lb.is_open());
        assert_eq!(page.locks(), 0);
    }

    #[test]
    fn test_start_index_clamped() {
        let (_page, mut lb) = setup();
        lb.open(MediaSequence::from_sources(["a", "b"]), 9);
        assert_eq!(lb.index(), Some(1));
    }

    #[test]
    fn test_reopen_releases_previous_lock() {
        let (page, mut lb) = setup();
        lb.open(MediaSequence::from_sources(["a", "b"]), 0);
        lb.open(MediaSequence::from_sources(["x", "y", "z"]), 2);

        assert_eq!(lb.current().map(|m| m.src.as_str()), Some("z"));
        assert_eq!(page.locks(), 2);
        assert_eq!(page.unlocks(), 1);
        assert!(page.is_locked());

        drop(lb);
        assert_eq!(page.unlocks(), 2);
        assert_eq!(page.overflow(), "auto");
    }
}
