//! Shared timer and registry for every live bar.
//!
//! One [`Scheduler`] drives any number of bars from a single periodic tick
//! and a single resize subscription. Both exist only while at least one bar
//! is registered: the first registration starts them, the last removal
//! stops them.
//!
//! The scheduler does not own a thread. The event loop asks
//! [`Scheduler::time_until_tick`] how long it may block, then calls
//! [`Scheduler::poll`] and forwards terminal resizes to
//! [`Scheduler::notify_resize`].

use std::time::{Duration, Instant};

use anyhow::Result;

use super::clock::{Clock, SystemClock};
use super::renderer::Renderer;
use super::widget::{BarState, InstanceId, TimeProgress, UpdateKind};

pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(250);

/// Handle of the running periodic timer
#[derive(Debug, Clone, Copy)]
struct Ticker {
    period: Duration,
    next_due: Instant,
}

impl Ticker {
    fn start(period: Duration, now: Instant) -> Self {
        Self {
            period,
            next_due: now + period,
        }
    }

    fn is_due(&self, now: Instant) -> bool {
        now >= self.next_due
    }

    /// Move to the next deadline after `now`, dropping missed ticks
    fn advance(&mut self, now: Instant) {
        self.next_due += self.period;
        if self.next_due <= now {
            self.next_due = now + self.period;
        }
    }
}

pub struct Scheduler<R: Renderer> {
    clock: Box<dyn Clock>,
    interval: Duration,
    instances: Vec<TimeProgress<R>>,
    ticker: Option<Ticker>,
    resize_subscribed: bool,
    timers_started: u64,
    finished: Vec<TimeProgress<R>>,
}

impl<R: Renderer> Scheduler<R> {
    pub fn new(clock: impl Clock + 'static, interval: Duration) -> Self {
        Self {
            clock: Box::new(clock),
            interval,
            instances: Vec::new(),
            ticker: None,
            resize_subscribed: false,
            timers_started: 0,
            finished: Vec::new(),
        }
    }

    /// Wall clock, default interval
    pub fn with_system_clock() -> Self {
        Self::new(SystemClock, DEFAULT_TICK_INTERVAL)
    }

    /// Clock shared with every registered bar
    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Add a bar. Starts the timer and resize subscription if this is the
    /// first one. Registering an id that is already present is a no-op.
    pub fn register(&mut self, bar: TimeProgress<R>) -> InstanceId {
        let id = bar.id();
        if self.contains(id) {
            tracing::warn!("{} is already registered", id);
            return id;
        }

        self.instances.push(bar);
        tracing::info!("Registered {} ({} live)", id, self.instances.len());

        if self.ticker.is_none() {
            self.ticker = Some(Ticker::start(self.interval, Instant::now()));
            self.timers_started += 1;
            tracing::debug!("Started shared tick timer every {:?}", self.interval);
        }
        if !self.resize_subscribed {
            self.resize_subscribed = true;
            tracing::debug!("Subscribed to resize notifications");
        }

        id
    }

    /// Register `bar` and run its first layout pass synchronously.
    ///
    /// A bar that is already complete finishes here: it is suspended, its
    /// `on_finish` hook runs once, and it moves to the finished list.
    pub fn attach(&mut self, bar: TimeProgress<R>) -> Result<InstanceId> {
        let id = self.register(bar);
        self.update_one(id, UpdateKind::Resize)?;
        Ok(id)
    }

    /// Remove a bar. Stops the timer and resize subscription when the last
    /// bar leaves. Unknown ids are ignored.
    pub fn suspend(&mut self, id: InstanceId) -> Option<TimeProgress<R>> {
        let index = self.position(id)?;
        let bar = self.instances.remove(index);
        tracing::info!("Suspended {} ({} live)", id, self.instances.len());

        if self.instances.is_empty() {
            if self.ticker.take().is_some() {
                tracing::debug!("Stopped shared tick timer");
            }
            if self.resize_subscribed {
                self.resize_subscribed = false;
                tracing::debug!("Unsubscribed from resize notifications");
            }
        }

        Some(bar)
    }

    /// Update every registered bar in registration order.
    ///
    /// Bars that reach their total are suspended and then finished. A hook
    /// error stops the broadcast and is returned; bars after the failing
    /// one are not updated this round.
    pub fn broadcast(&mut self, kind: UpdateKind) -> Result<()> {
        tracing::trace!("Broadcasting {:?} to {} bars", kind, self.instances.len());

        let mut index = 0;
        while index < self.instances.len() {
            match self.instances[index].update(kind, self.clock.as_ref())? {
                BarState::Active => index += 1,
                // Retiring removes this slot, so the next bar shifts into `index`
                BarState::Finished => self.retire(index)?,
            }
        }
        Ok(())
    }

    /// Fire a tick broadcast if the timer is due at `now`.
    /// Returns whether a tick fired.
    pub fn poll(&mut self, now: Instant) -> Result<bool> {
        let due = match self.ticker.as_mut() {
            Some(ticker) if ticker.is_due(now) => {
                ticker.advance(now);
                true
            }
            _ => false,
        };

        if due {
            self.broadcast(UpdateKind::Tick)?;
        }
        Ok(due)
    }

    /// Forward a layout change to every bar while subscribed
    pub fn notify_resize(&mut self) -> Result<()> {
        if !self.resize_subscribed {
            return Ok(());
        }
        self.broadcast(UpdateKind::Resize)
    }

    /// Time until the next tick, or `None` while the timer is stopped
    pub fn time_until_tick(&self, now: Instant) -> Option<Duration> {
        self.ticker
            .map(|ticker| ticker.next_due.saturating_duration_since(now))
    }

    pub fn is_running(&self) -> bool {
        self.ticker.is_some()
    }

    pub fn is_resize_subscribed(&self) -> bool {
        self.resize_subscribed
    }

    /// How many times the shared timer has been started
    pub fn timers_started(&self) -> u64 {
        self.timers_started
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn contains(&self, id: InstanceId) -> bool {
        self.position(id).is_some()
    }

    pub fn ids(&self) -> Vec<InstanceId> {
        self.instances.iter().map(|bar| bar.id()).collect()
    }

    pub fn get(&self, id: InstanceId) -> Option<&TimeProgress<R>> {
        self.instances.iter().find(|bar| bar.id() == id)
    }

    pub fn get_mut(&mut self, id: InstanceId) -> Option<&mut TimeProgress<R>> {
        self.instances.iter_mut().find(|bar| bar.id() == id)
    }

    pub fn instances(&self) -> impl Iterator<Item = &TimeProgress<R>> {
        self.instances.iter()
    }

    pub fn instances_mut(&mut self) -> impl Iterator<Item = &mut TimeProgress<R>> {
        self.instances.iter_mut()
    }

    /// Drain bars that finished since the last call
    pub fn take_finished(&mut self) -> Vec<TimeProgress<R>> {
        std::mem::take(&mut self.finished)
    }

    fn position(&self, id: InstanceId) -> Option<usize> {
        self.instances.iter().position(|bar| bar.id() == id)
    }

    fn update_one(&mut self, id: InstanceId, kind: UpdateKind) -> Result<()> {
        let Some(index) = self.position(id) else {
            return Ok(());
        };

        if self.instances[index].update(kind, self.clock.as_ref())? == BarState::Finished {
            self.retire(index)?;
        }
        Ok(())
    }

    /// Suspend the bar at `index`, then run its finish hook
    fn retire(&mut self, index: usize) -> Result<()> {
        let id = self.instances[index].id();
        let Some(mut bar) = self.suspend(id) else {
            return Ok(());
        };

        let result = bar.finish();
        self.finished.push(bar);
        result
    }
}
