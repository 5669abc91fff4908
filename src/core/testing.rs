//! Test doubles shared by the core test modules.

use std::collections::HashMap;

use super::renderer::{Renderer, SegmentFlag, SegmentMarker, SegmentPart};

/// Renderer that records every call
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    pub width: f64,
    pub markers: Vec<SegmentMarker>,
    pub fill: Option<f64>,
    pub label: Option<String>,
    pub flags: HashMap<(usize, SegmentPart, SegmentFlag), bool>,
}

impl RecordingRenderer {
    pub fn with_width(width: f64) -> Self {
        Self {
            width,
            ..Self::default()
        }
    }

    fn indices_with(&self, part: SegmentPart, flag: SegmentFlag) -> Vec<usize> {
        let mut indices: Vec<usize> = self
            .flags
            .iter()
            .filter(|((_, p, f), on)| *p == part && *f == flag && **on)
            .map(|((index, _, _), _)| *index)
            .collect();
        indices.sort_unstable();
        indices
    }

    pub fn active_indices(&self, part: SegmentPart) -> Vec<usize> {
        self.indices_with(part, SegmentFlag::Active)
    }

    pub fn used_indices(&self, part: SegmentPart) -> Vec<usize> {
        self.indices_with(part, SegmentFlag::Used)
    }
}

impl Renderer for RecordingRenderer {
    fn mount(&mut self, markers: &[SegmentMarker]) {
        self.markers = markers.to_vec();
    }

    fn available_width(&self) -> f64 {
        self.width
    }

    fn set_fill(&mut self, percentage: f64) {
        self.fill = Some(percentage);
    }

    fn set_label(&mut self, text: &str) {
        self.label = Some(text.to_string());
    }

    fn set_flag(&mut self, index: usize, part: SegmentPart, flag: SegmentFlag, on: bool) {
        self.flags.insert((index, part, flag), on);
    }
}
