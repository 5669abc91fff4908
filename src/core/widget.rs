//! The time progress bar itself.
//!
//! A [`TimeProgress`] owns one bar's immutable configuration, the derived
//! values from its last update, and the renderer it drives. It is either
//! `Active` (registered and still running) or `Finished` (terminal). The
//! [`Scheduler`](super::scheduler::Scheduler) calls [`TimeProgress::update`]
//! on every tick and resize.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::{Context, Result};

use super::clock::Clock;
use super::duration::{DurationFormatter, DurationTable};
use super::error::{ProgressError, ProgressResult};
use super::progress::{ProgressCalculator, TimeState};
use super::renderer::{Renderer, SegmentFlag, SegmentMarker, SegmentPart};
use super::segments::SegmentPlan;
use super::template::{format_percentage, ProgressField, ProgressTemplate, SegmentField, SegmentTemplate};

pub const DEFAULT_PROGRESS_LABEL: &str = "__progress__/__total__ (__percentage__%)";
pub const DEFAULT_SEGMENT_LABEL: &str = "__count__";
pub const DEFAULT_THRESHOLD: f64 = 35.0;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique bar identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId(u64);

impl InstanceId {
    fn next() -> Self {
        Self(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bar#{}", self.0)
    }
}

/// What triggered an update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateKind {
    /// Shared periodic timer
    Tick,
    /// Layout change; also recomputes which segments are shown
    Resize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarState {
    Active,
    Finished,
}

/// Construction inputs for a bar
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressOptions {
    pub progress_label_content: String,
    pub label_content: String,
    /// Minimum width per visible segment
    pub threshold: f64,
    pub time: TimeState,
    pub duration: DurationTable,
    /// Multiplier on elapsed wall-clock time
    pub timescale: f64,
}

impl Default for ProgressOptions {
    fn default() -> Self {
        Self {
            progress_label_content: DEFAULT_PROGRESS_LABEL.to_string(),
            label_content: DEFAULT_SEGMENT_LABEL.to_string(),
            threshold: DEFAULT_THRESHOLD,
            time: TimeState::default(),
            duration: DurationTable::default(),
            timescale: 1.0,
        }
    }
}

impl ProgressOptions {
    pub fn with_time(mut self, current: f64, total: f64) -> Self {
        self.time = TimeState::new(current, total);
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_timescale(mut self, timescale: f64) -> Self {
        self.timescale = timescale;
        self
    }

    /// Check everything that does not need parsing
    pub fn validate(&self) -> ProgressResult<()> {
        self.time.validate()?;

        if !self.threshold.is_finite() || self.threshold <= 0.0 {
            return Err(ProgressError::InvalidThreshold(self.threshold));
        }
        if !self.timescale.is_finite() || self.timescale < 0.0 {
            return Err(ProgressError::InvalidTimescale(self.timescale));
        }
        Ok(())
    }
}

/// Optional callback slot, invoked with the bar as receiver
pub type Hook<R> = Box<dyn FnMut(&TimeProgress<R>) -> Result<()>>;

pub struct TimeProgress<R: Renderer> {
    id: InstanceId,
    calculator: ProgressCalculator,
    table: DurationTable,
    plan: SegmentPlan,
    threshold: f64,
    progress_template: ProgressTemplate,
    renderer: R,
    state: BarState,

    // Derived on each update
    progress: f64,
    percentage: f64,
    label: String,
    visible: Vec<usize>,

    on_update: Option<Hook<R>>,
    on_finish: Option<Hook<R>>,
}

impl<R: Renderer> TimeProgress<R> {
    /// Validate `options`, plan segments and mount them on `renderer`.
    ///
    /// The bar starts counting at `clock.now()`. Nothing is drawn until the
    /// first update; use [`Scheduler::attach`](super::scheduler::Scheduler::attach)
    /// to register it and run the initial layout pass.
    pub fn new(options: ProgressOptions, mut renderer: R, clock: &dyn Clock) -> ProgressResult<Self> {
        options.validate()?;
        let progress_template = ProgressTemplate::parse(&options.progress_label_content)?;
        let segment_template = SegmentTemplate::parse(&options.label_content)?;

        let plan = SegmentPlan::new(options.time.total, &options.duration);
        let markers: Vec<SegmentMarker> = plan
            .indices()
            .map(|index| SegmentMarker {
                index,
                offset_percent: plan.offset_percent(index),
                text: segment_template.render(|SegmentField::Count| index.to_string()),
            })
            .collect();
        renderer.mount(&markers);

        let start = clock.now();
        let id = InstanceId::next();
        tracing::debug!(
            "Created {} (total={}s, segments={}, largest_unit={:?})",
            id,
            options.time.total,
            markers.len(),
            plan.largest_unit()
        );

        Ok(Self {
            id,
            calculator: ProgressCalculator::new(start, options.time, options.timescale),
            table: options.duration,
            plan,
            threshold: options.threshold,
            progress_template,
            renderer,
            state: BarState::Active,
            progress: options.time.current.min(options.time.total),
            percentage: 0.0,
            label: String::new(),
            visible: Vec::new(),
            on_update: None,
            on_finish: None,
        })
    }

    pub fn on_update(mut self, hook: impl FnMut(&TimeProgress<R>) -> Result<()> + 'static) -> Self {
        self.on_update = Some(Box::new(hook));
        self
    }

    pub fn on_finish(mut self, hook: impl FnMut(&TimeProgress<R>) -> Result<()> + 'static) -> Self {
        self.on_finish = Some(Box::new(hook));
        self
    }

    pub fn id(&self) -> InstanceId {
        self.id
    }

    pub fn start(&self) -> f64 {
        self.calculator.start
    }

    pub fn total(&self) -> f64 {
        self.calculator.time.total
    }

    pub fn timescale(&self) -> f64 {
        self.calculator.timescale
    }

    /// Progress in seconds as of the last update
    pub fn progress(&self) -> f64 {
        self.progress
    }

    /// Fraction complete as of the last update
    pub fn percentage(&self) -> f64 {
        self.percentage
    }

    /// Progress label text as of the last update
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn state(&self) -> BarState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state == BarState::Finished
    }

    pub fn segment_count(&self) -> f64 {
        self.plan.segment_count()
    }

    pub fn largest_unit(&self) -> Option<u64> {
        self.plan.largest_unit()
    }

    /// Segments chosen by the last resize pass
    pub fn visible_segments(&self) -> &[usize] {
        &self.visible
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    /// Recompute derived values and push them to the renderer.
    ///
    /// Skipped entirely while the renderer reports no width. Returns
    /// `Finished` once progress reaches the total; the caller is expected
    /// to unregister the bar and then call [`finish`](Self::finish).
    pub fn update(&mut self, kind: UpdateKind, clock: &dyn Clock) -> Result<BarState> {
        if self.state == BarState::Finished {
            return Ok(self.state);
        }

        let width = self.renderer.available_width();
        if width.is_nan() || width <= 0.0 {
            tracing::trace!("Skipping {} update: no layout width", self.id);
            return Ok(self.state);
        }

        let now = clock.now();
        self.progress = self.calculator.progress(now);
        self.percentage = self.calculator.percentage(now);

        self.renderer.set_fill(self.percentage);
        self.label = self.render_label();
        self.renderer.set_label(&self.label);

        if kind == UpdateKind::Resize {
            self.apply_visibility(width);
        }
        self.apply_used();

        if let Some(mut hook) = self.on_update.take() {
            let result = hook(self);
            self.on_update = Some(hook);
            result.with_context(|| format!("on_update hook failed for {}", self.id))?;
        }

        // Exact comparison: progress is clamped to the total with min()
        if self.progress == self.calculator.time.total {
            self.state = BarState::Finished;
        }

        Ok(self.state)
    }

    /// Recompute which segments are shown for the renderer's current width.
    ///
    /// Unlike [`update`](Self::update) this also works on a finished bar,
    /// which no longer receives resize passes. Progress, label and used
    /// flags are left as they are.
    pub fn relayout(&mut self) {
        let width = self.renderer.available_width();
        if width.is_nan() || width <= 0.0 {
            return;
        }
        self.apply_visibility(width);
    }

    /// Run the `on_finish` hook for a bar that just reached its total
    pub fn finish(&mut self) -> Result<()> {
        tracing::info!("{} finished after {}s", self.id, self.total());

        if let Some(mut hook) = self.on_finish.take() {
            let result = hook(self);
            self.on_finish = Some(hook);
            result.with_context(|| format!("on_finish hook failed for {}", self.id))?;
        }
        Ok(())
    }

    fn render_label(&self) -> String {
        let formatter = DurationFormatter::anchored(&self.table, self.plan.largest_unit());
        let total = self.total();

        self.progress_template.render(|field| match field {
            ProgressField::Progress => formatter.format(self.progress, true),
            ProgressField::Total => formatter.format(total, false),
            ProgressField::Duration => formatter.format(total - self.progress, false),
            ProgressField::Percentage => format_percentage(self.percentage),
        })
    }

    fn apply_visibility(&mut self, width: f64) {
        self.visible = self.plan.visible(width, self.threshold);

        let mut active = vec![false; self.plan.marker_count()];
        for &index in &self.visible {
            active[index] = true;
        }

        for (index, on) in active.into_iter().enumerate() {
            self.renderer.set_flag(index, SegmentPart::Separator, SegmentFlag::Active, on);
            self.renderer.set_flag(index, SegmentPart::Label, SegmentFlag::Active, on);
        }

        tracing::debug!(
            "{} shows {} of {} segments at width {}",
            self.id,
            self.visible.len(),
            self.plan.marker_count(),
            width
        );
    }

    fn apply_used(&mut self) {
        for index in self.plan.indices() {
            let on = self.plan.is_used(self.percentage, index);
            self.renderer.set_flag(index, SegmentPart::Separator, SegmentFlag::Used, on);
            self.renderer.set_flag(index, SegmentPart::Label, SegmentFlag::Used, on);
        }
    }
}
