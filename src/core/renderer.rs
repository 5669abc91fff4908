//! Presentation collaborator driven by [`TimeProgress`](super::widget::TimeProgress).
//!
//! The engine never draws anything itself. It asks a renderer to build one
//! separator and one label per segment, reports fill and text changes, and
//! flips two flags on each part of a segment.

/// One segment as handed to [`Renderer::mount`]
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentMarker {
    pub index: usize,
    /// Left offset as a percentage of the bar width
    pub offset_percent: f64,
    /// Rendered segment label text
    pub text: String,
}

/// Which element of a segment a flag applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentPart {
    Separator,
    Label,
}

/// Boolean state flags on a segment part
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentFlag {
    /// Progress has passed this segment
    Used,
    /// Segment survived width-driven reduction and should be shown
    Active,
}

pub trait Renderer {
    /// Create the container plus a separator and label for every marker
    fn mount(&mut self, markers: &[SegmentMarker]);

    /// Currently available width, in the same unit as the bar's threshold.
    /// Zero means "not laid out yet".
    fn available_width(&self) -> f64;

    /// Fill fraction in `[0, 1]`
    fn set_fill(&mut self, percentage: f64);

    /// Replace the progress label text
    fn set_label(&mut self, text: &str);

    fn set_flag(&mut self, index: usize, part: SegmentPart, flag: SegmentFlag, on: bool);
}
