//! Key bindings for the lightbox overlay.
//!
//! A [`Keymap`] is the listener table of one component: bindings are added
//! when the overlay opens and removed when it closes, so nothing keeps
//! reacting to keys after dismissal.

use std::collections::HashMap;

use log::trace;

pub const KEY_ESCAPE: &str = "Escape";
pub const KEY_ARROW_LEFT: &str = "ArrowLeft";
pub const KEY_ARROW_RIGHT: &str = "ArrowRight";

/// Action a key press maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Close,
    Previous,
    Next,
}

#[derive(Debug, Default)]
pub struct Keymap {
    bindings: HashMap<String, KeyAction>,
}

impl Keymap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register Escape / ArrowLeft / ArrowRight.
    pub fn bind_lightbox_keys(&mut self) {
        self.bind(KEY_ESCAPE, KeyAction::Close);
        self.bind(KEY_ARROW_LEFT, KeyAction::Previous);
        self.bind(KEY_ARROW_RIGHT, KeyAction::Next);
    }

    pub fn bind(&mut self, key: &str, action: KeyAction) {
        trace!("Keymap: bind {} -> {:?}", key, action);
        self.bindings.insert(key.to_string(), action);
    }

    pub fn unbind(&mut self, key: &str) {
        self.bindings.remove(key);
    }

    pub fn clear(&mut self) {
        if !self.bindings.is_empty() {
            trace!("Keymap: cleared {} binding(s)", self.bindings.len());
        }
        self.bindings.clear();
    }

    pub fn lookup(&self, key: &str) -> Option<KeyAction> {
        self.bindings.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
