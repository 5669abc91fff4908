//! Time progress bar state (rendering-agnostic).

use crate::core::{Renderer, SegmentFlag, SegmentMarker, SegmentPart};

/// Segment as seen by a frontend
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentView {
    /// Left offset as a percentage of the bar width
    pub offset_percent: f64,
    pub text: String,
    pub separator_used: bool,
    pub separator_active: bool,
    pub label_used: bool,
    pub label_active: bool,
}

impl SegmentView {
    fn from_marker(marker: &SegmentMarker) -> Self {
        Self {
            offset_percent: marker.offset_percent,
            text: marker.text.clone(),
            separator_used: false,
            separator_active: false,
            label_used: false,
            label_active: false,
        }
    }

    /// Column of this segment inside a bar `width` cells wide
    pub fn column(&self, width: u16) -> u16 {
        if width == 0 {
            return 0;
        }
        let last = f64::from(width - 1);
        ((self.offset_percent / 100.0) * last).round().clamp(0.0, last) as u16
    }
}

/// Time progress bar state (rendering-agnostic)
///
/// Receives fill, label and segment flags from the engine through
/// [`Renderer`], and the available width from the layout. Rendered by the
/// TUI frontend in `frontend::tui::time_bar`.
#[derive(Debug, Clone)]
pub struct TimeBarState {
    /// Window title
    pub title: String,

    /// Content width in terminal cells (zero until laid out)
    pub width: u16,

    /// Fill fraction (0.0 to 1.0)
    pub fill: f64,

    /// Progress label text
    pub label: String,

    pub segments: Vec<SegmentView>,

    pub show_border: bool,
    pub border_style: Option<String>,

    /// Colors as hex strings ("#RRGGBB")
    pub bar_color: Option<String>,
    pub used_color: Option<String>,
    pub idle_color: Option<String>,
    pub text_color: Option<String>,
}

impl TimeBarState {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            width: 0,
            fill: 0.0,
            label: String::new(),
            segments: Vec::new(),
            show_border: true,
            border_style: None,
            bar_color: None,
            used_color: None,
            idle_color: None,
            text_color: None,
        }
    }

    pub fn set_border_config(&mut self, show_border: bool, border_style: Option<String>) {
        self.show_border = show_border;
        self.border_style = border_style;
    }

    pub fn set_colors(
        &mut self,
        bar_color: Option<String>,
        used_color: Option<String>,
        idle_color: Option<String>,
        text_color: Option<String>,
    ) {
        self.bar_color = bar_color;
        self.used_color = used_color;
        self.idle_color = idle_color;
        self.text_color = text_color;
    }

    /// Rows needed to draw the bar, borders included
    pub fn height(&self) -> u16 {
        if self.show_border {
            4
        } else {
            2
        }
    }

    /// Store the content width for an outer area `area_width` cells wide
    pub fn layout(&mut self, area_width: u16) {
        let border = if self.show_border { 2 } else { 0 };
        self.width = area_width.saturating_sub(border);
    }
}

impl Renderer for TimeBarState {
    fn mount(&mut self, markers: &[SegmentMarker]) {
        self.segments = markers.iter().map(SegmentView::from_marker).collect();
    }

    fn available_width(&self) -> f64 {
        f64::from(self.width)
    }

    fn set_fill(&mut self, percentage: f64) {
        self.fill = percentage.clamp(0.0, 1.0);
    }

    fn set_label(&mut self, text: &str) {
        self.label.clear();
        self.label.push_str(text);
    }

    fn set_flag(&mut self, index: usize, part: SegmentPart, flag: SegmentFlag, on: bool) {
        let Some(segment) = self.segments.get_mut(index) else {
            return;
        };

        let slot = match (part, flag) {
            (SegmentPart::Separator, SegmentFlag::Used) => &mut segment.separator_used,
            (SegmentPart::Separator, SegmentFlag::Active) => &mut segment.separator_active,
            (SegmentPart::Label, SegmentFlag::Used) => &mut segment.label_used,
            (SegmentPart::Label, SegmentFlag::Active) => &mut segment.label_active,
        };
        *slot = on;
    }
}
