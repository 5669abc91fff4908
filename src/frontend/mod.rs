//! Frontend abstraction layer
//!
//! This module defines the `Frontend` trait the terminal frontend implements.
//! It provides a unified interface for event polling, rendering, and cleanup.

pub mod events;
pub mod tui;

use anyhow::Result;
use std::time::Duration;

use crate::app::App;

pub use events::FrontendEvent;
pub use tui::TuiFrontend;

/// Frontend trait
///
/// Separates terminal concerns from the bar engine. The event loop in
/// `main` only talks to this trait.
pub trait Frontend {
    /// Poll for user input events
    ///
    /// Blocks for at most `timeout` waiting for the first event, then drains
    /// whatever else is already pending.
    ///
    /// # Returns
    /// - `Ok(Vec<FrontendEvent>)` - List of events (empty if none arrived in time)
    /// - `Err(...)` - If event polling failed
    fn poll_events(&mut self, timeout: Duration) -> Result<Vec<FrontendEvent>>;

    /// Draw every bar of `app`
    fn render(&mut self, app: &App) -> Result<()>;

    /// Restore the terminal before exit
    fn cleanup(&mut self) -> Result<()>;

    /// Current terminal size in cells as `(width, height)`
    fn size(&self) -> (u16, u16);
}
