//! Application state for the terminal binary.
//!
//! [`App`] builds one bar per configured entry, owns the [`Scheduler`] that
//! keeps them updated, and keeps finished bars around so they stay on
//! screen. It knows nothing about the terminal beyond its size; drawing
//! lives in `frontend::tui`.

use anyhow::{Context, Result};
use crossterm::event::{KeyCode, KeyModifiers};
use std::time::{Duration, Instant};

use crate::config::{BarConfig, Config, UiConfig};
use crate::core::{Clock, Scheduler, SystemClock, TimeProgress};
use crate::frontend::FrontendEvent;
use crate::widgets::TimeBarState;

pub type Bar = TimeProgress<TimeBarState>;

pub struct App {
    scheduler: Scheduler<TimeBarState>,
    /// Bars that reached their total, kept for display
    finished: Vec<Bar>,
    ui: UiConfig,
    idle_poll: Duration,
    width: u16,
    height: u16,
    running: bool,
}

impl App {
    /// Build every configured bar against the wall clock
    pub fn new(config: &Config, width: u16, height: u16) -> Result<Self> {
        Self::with_clock(config, width, height, SystemClock)
    }

    pub fn with_clock(
        config: &Config,
        width: u16,
        height: u16,
        clock: impl Clock + 'static,
    ) -> Result<Self> {
        let mut app = Self {
            scheduler: Scheduler::new(clock, config.tick_interval()),
            finished: Vec::new(),
            ui: config.ui.clone(),
            idle_poll: config.idle_poll(),
            width,
            height,
            running: true,
        };

        for bar_config in &config.bars {
            app.add_bar(bar_config)?;
        }
        app.collect_finished();
        app.check_exit();

        tracing::info!(
            "App started with {} bars ({} already finished)",
            config.bars.len(),
            app.finished.len()
        );
        Ok(app)
    }

    /// Create a bar from `bar_config`, lay it out and attach it
    pub fn add_bar(&mut self, bar_config: &BarConfig) -> Result<()> {
        let options = bar_config
            .to_options()
            .with_context(|| format!("Invalid bar '{}'", bar_config.title))?;

        let mut state = TimeBarState::new(&bar_config.title);
        state.set_border_config(self.ui.show_border, Some(self.ui.border_style.clone()));
        state.set_colors(
            self.ui.bar_color.clone(),
            self.ui.used_color.clone(),
            self.ui.idle_color.clone(),
            self.ui.text_color.clone(),
        );
        state.layout(self.width);

        let title = bar_config.title.clone();
        let bar = TimeProgress::new(options, state, self.scheduler.clock())?
            .on_update(|bar| {
                tracing::trace!("{} at {}", bar.id(), bar.label());
                Ok(())
            })
            .on_finish(move |bar| {
                tracing::info!("'{}' ({}) finished after {}s", title, bar.id(), bar.total());
                Ok(())
            });

        self.scheduler
            .attach(bar)
            .with_context(|| format!("Failed to start bar '{}'", bar_config.title))?;
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn quit(&mut self) {
        self.running = false;
    }

    pub fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    pub fn scheduler(&self) -> &Scheduler<TimeBarState> {
        &self.scheduler
    }

    pub fn finished(&self) -> &[Bar] {
        &self.finished
    }

    /// Live and finished bars in creation order
    pub fn bars(&self) -> Vec<&Bar> {
        let mut bars: Vec<&Bar> = self.scheduler.instances().chain(self.finished.iter()).collect();
        bars.sort_by_key(|bar| bar.id());
        bars
    }

    pub fn handle_event(&mut self, event: FrontendEvent) -> Result<()> {
        match event {
            FrontendEvent::Quit => self.quit(),
            FrontendEvent::Key { code, modifiers } => match code {
                KeyCode::Char('q') | KeyCode::Esc => self.quit(),
                KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => self.quit(),
                _ => {}
            },
            FrontendEvent::Resize { width, height } => self.resize(width, height)?,
        }
        Ok(())
    }

    /// Re-lay-out every bar for a new terminal size and redraw the live ones
    pub fn resize(&mut self, width: u16, height: u16) -> Result<()> {
        tracing::debug!("Resize to {}x{}", width, height);
        self.width = width;
        self.height = height;

        for bar in self.scheduler.instances_mut() {
            bar.renderer_mut().layout(width);
        }
        // Finished bars are no longer registered, so they miss the resize pass
        for bar in &mut self.finished {
            bar.renderer_mut().layout(width);
            bar.relayout();
        }

        self.scheduler.notify_resize()?;
        self.collect_finished();
        self.check_exit();
        Ok(())
    }

    /// Run a scheduler tick if one is due. Returns whether anything changed.
    pub fn tick(&mut self, now: Instant) -> Result<bool> {
        let fired = self.scheduler.poll(now)?;
        if fired {
            self.collect_finished();
            self.check_exit();
        }
        Ok(fired)
    }

    /// How long the event loop may block waiting for input
    pub fn poll_timeout(&self, now: Instant) -> Duration {
        self.scheduler
            .time_until_tick(now)
            .unwrap_or(self.idle_poll)
    }

    fn collect_finished(&mut self) {
        self.finished.extend(self.scheduler.take_finished());
    }

    fn check_exit(&mut self) {
        if self.ui.exit_on_finish && self.scheduler.is_empty() && !self.finished.is_empty() {
            tracing::info!("All bars finished, exiting");
            self.running = false;
        }
    }
}
