use crate::app::App;
use crate::frontend::tui::time_bar::TimeBar;
use crate::frontend::{Frontend, FrontendEvent};
use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, layout::Rect, Terminal};
use std::io;
use std::time::Duration;

/// TUI Frontend using ratatui
///
/// Renders every bar stacked top to bottom and handles input via crossterm.
pub struct TuiFrontend {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    restored: bool,
}

impl TuiFrontend {
    /// Create a new TUI frontend
    ///
    /// Initializes terminal in raw mode and enters the alternate screen.
    pub fn new() -> Result<Self> {
        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen).context("Failed to setup terminal")?;

        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;
        terminal.hide_cursor()?;

        Ok(Self {
            terminal,
            restored: false,
        })
    }

    /// Convert crossterm event to FrontendEvent
    fn convert_event(event: Event) -> Option<FrontendEvent> {
        match event {
            Event::Key(key_event) => {
                // Only process key press events (ignore repeats and releases)
                if key_event.kind != KeyEventKind::Press {
                    return None;
                }
                Some(FrontendEvent::key(key_event.code, key_event.modifiers))
            }
            Event::Resize(w, h) => Some(FrontendEvent::resize(w, h)),
            _ => None,
        }
    }
}

/// Stack bars of the given heights inside `area`, dropping any that do not fit
pub fn stack_areas(area: Rect, heights: &[u16]) -> Vec<Rect> {
    let mut areas = Vec::with_capacity(heights.len());
    let mut y = area.y;
    let bottom = area.y + area.height;

    for &height in heights {
        if y + height > bottom {
            break;
        }
        areas.push(Rect::new(area.x, y, area.width, height));
        y += height;
    }
    areas
}

impl Frontend for TuiFrontend {
    fn poll_events(&mut self, timeout: Duration) -> Result<Vec<FrontendEvent>> {
        let mut events = Vec::new();

        // Wait for the first event, then drain anything already queued
        let mut wait = timeout;
        while event::poll(wait)? {
            if let Some(frontend_event) = Self::convert_event(event::read()?) {
                events.push(frontend_event);
            }
            wait = Duration::ZERO;
        }

        Ok(events)
    }

    fn render(&mut self, app: &App) -> Result<()> {
        let bars = app.bars();

        self.terminal.draw(|f| {
            let terminal_area = f.area();
            let heights: Vec<u16> = bars.iter().map(|bar| bar.renderer().height()).collect();

            for (bar, area) in bars.iter().zip(stack_areas(terminal_area, &heights)) {
                TimeBar::new(bar.renderer()).render(area, f.buffer_mut());
            }
        })?;

        Ok(())
    }

    fn cleanup(&mut self) -> Result<()> {
        if self.restored {
            return Ok(());
        }
        self.restored = true;

        // Restore terminal
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }

    fn size(&self) -> (u16, u16) {
        let size = self.terminal.size().unwrap_or_default();
        (size.width, size.height)
    }
}

impl Drop for TuiFrontend {
    fn drop(&mut self) {
        // Ensure terminal is restored even if cleanup() wasn't called
        let _ = self.cleanup();
    }
}
