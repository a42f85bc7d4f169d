//! Page scroll lock held while a lightbox is open.
//!
//! Locking is an acquire/release pair: [`ScrollLockGuard::acquire`] saves the
//! page's scroll state and locks it; dropping the guard restores exactly the
//! saved state. Every exit path (explicit close, replacing the lightbox,
//! dropping the owning controller) goes through `Drop`.

use std::sync::{Arc, Mutex};

use log::{debug, warn};

/// Scroll state saved on lock, restored verbatim on release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrollState {
    /// CSS-style overflow value of the page body
    pub overflow: String,
}

/// Host environment capable of locking page scroll.
pub trait ScrollHost: Send + Sync {
    /// Lock scrolling and return the state to restore later.
    fn lock_scroll(&self) -> ScrollState;
    fn restore_scroll(&self, prev: ScrollState);
}

/// Held scroll lock. Released on drop.
pub struct ScrollLockGuard {
    host: Arc<dyn ScrollHost>,
    prev: Option<ScrollState>,
}

impl ScrollLockGuard {
    pub fn acquire(host: &Arc<dyn ScrollHost>) -> Self {
        let prev = host.lock_scroll();
        debug!("Scroll locked (saved overflow={:?})", prev.overflow);
        Self {
            host: Arc::clone(host),
            prev: Some(prev),
        }
    }
}

impl Drop for ScrollLockGuard {
    fn drop(&mut self) {
        if let Some(prev) = self.prev.take() {
            debug!("Scroll restored (overflow={:?})", prev.overflow);
            self.host.restore_scroll(prev);
        }
    }
}

impl std::fmt::Debug for ScrollLockGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScrollLockGuard").field("prev", &self.prev).finish()
    }
}

#[derive(Debug)]
struct PageState {
    overflow: String,
    locks: u64,
    unlocks: u64,
}

/// In-memory page body, records lock/unlock counts.
#[derive(Debug)]
pub struct PageScroll {
    state: Mutex<PageState>,
}

impl Default for PageScroll {
    fn default() -> Self {
        Self::new("auto")
    }
}

impl PageScroll {
    pub fn new(overflow: impl Into<String>) -> Self {
        Self {
            state: Mutex::new(PageState {
                overflow: overflow.into(),
                locks: 0,
                unlocks: 0,
            }),
        }
    }

    pub fn overflow(&self) -> String {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).overflow.clone()
    }

    pub fn is_locked(&self) -> bool {
        self.overflow() == "hidden"
    }

    pub fn locks(&self) -> u64 {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).locks
    }

    pub fn unlocks(&self) -> u64 {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).unlocks
    }
}

impl ScrollHost for PageScroll {
    fn lock_scroll(&self) -> ScrollState {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.locks += 1;
        let prev = std::mem::replace(&mut state.overflow, "hidden".to_string());
        ScrollState { overflow: prev }
    }

    fn restore_scroll(&self, prev: ScrollState) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.unlocks += 1;
        if state.unlocks > state.locks {
            warn!("Scroll restore without matching lock ({} > {})", state.unlocks, state.locks);
        }
        state.overflow = prev.overflow;
    }
}
