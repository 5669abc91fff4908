//! Frontend-agnostic input events.
//!
//! The terminal frontend translates crossterm's event stream into this enum
//! so [`crate::app::App`] only handles one event shape.

use crossterm::event::{KeyCode, KeyModifiers};

#[derive(Debug, Clone, PartialEq)]
pub enum FrontendEvent {
    /// Keyboard input
    Key {
        code: KeyCode,
        modifiers: KeyModifiers,
    },
    /// Terminal resize
    Resize { width: u16, height: u16 },
    /// Application quit signal
    Quit,
}

impl FrontendEvent {
    /// Create a key event
    pub fn key(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self::Key { code, modifiers }
    }

    /// Create a resize event
    pub fn resize(width: u16, height: u16) -> Self {
        Self::Resize { width, height }
    }

    /// Create a quit event
    pub fn quit() -> Self {
        Self::Quit
    }
}
