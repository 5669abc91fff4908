//! Segment planning and width-driven density reduction.
//!
//! A bar is split into one segment per largest applicable unit of its
//! total (ten one-minute segments for a ten minute total). When the bar is
//! too narrow to show every segment, the visible set is halved by keeping
//! every other entry of the previously visible list until it fits.

use super::duration::DurationTable;

/// Segment layout for one bar. Positions never change after planning.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentPlan {
    largest_unit: Option<u64>,
    segment_count: f64,
}

impl SegmentPlan {
    pub fn new(total: f64, table: &DurationTable) -> Self {
        let largest_unit = table.largest_unit(total);
        // No unit fits (or the total is under one unit): one implicit segment
        let segment_count = match largest_unit {
            Some(unit) => total / unit as f64,
            None => 1.0,
        };

        Self {
            largest_unit,
            segment_count,
        }
    }

    pub fn largest_unit(&self) -> Option<u64> {
        self.largest_unit
    }

    /// Number of units in the total; may be fractional
    pub fn segment_count(&self) -> f64 {
        self.segment_count
    }

    /// Segment indices `0..=floor(segment_count)`
    pub fn indices(&self) -> std::ops::RangeInclusive<usize> {
        0..=self.segment_count.floor() as usize
    }

    /// Number of planned segments, always at least one
    pub fn marker_count(&self) -> usize {
        self.segment_count.floor() as usize + 1
    }

    /// Left offset of segment `index` as a percentage of the bar width
    pub fn offset_percent(&self, index: usize) -> f64 {
        index as f64 / self.segment_count * 100.0
    }

    /// Whether progress has reached segment `index`
    pub fn is_used(&self, percentage: f64, index: usize) -> bool {
        percentage * self.segment_count >= index as f64
    }

    /// Indices left visible when `width` units are available and every
    /// segment needs at least `threshold` units.
    pub fn visible(&self, width: f64, threshold: f64) -> Vec<usize> {
        let max_fit = (width / threshold).floor() as usize;
        reduce_to_fit(self.indices().collect(), self.segment_count, max_fit)
    }
}

/// Keep only the even positions of `items`.
pub fn halve<T>(items: Vec<T>) -> Vec<T> {
    items
        .into_iter()
        .enumerate()
        .filter(|(position, _)| position % 2 == 0)
        .map(|(_, item)| item)
        .collect()
}

/// Halve `items` until `segment_count`, halved alongside the list, is at
/// most `max_fit`, or a single item is left.
///
/// The count is of intervals, not markers: a bar of ten segments has
/// eleven markers and still fits in a `max_fit` of ten. Each pass works on
/// the previous pass's output, so the first item is always kept.
pub fn reduce_to_fit<T>(mut items: Vec<T>, mut segment_count: f64, max_fit: usize) -> Vec<T> {
    while segment_count > max_fit as f64 && items.len() > 1 {
        segment_count /= 2.0;
        items = halve(items);
    }
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::duration::UnitLabels;

    #[test]
    fn test_plan_for_ten_minutes() {
        let plan = SegmentPlan::new(600.0, &DurationTable::default());
        assert_eq!(plan.largest_unit(), Some(60));
        assert_eq!(plan.segment_count(), 10.0);
        assert_eq!(plan.marker_count(), 11);
        assert_eq!(plan.indices().collect::<Vec<_>>(), (0..=10).collect::<Vec<_>>());
        assert_eq!(plan.offset_percent(5), 50.0);
        assert_eq!(plan.offset_percent(10), 100.0);
    }

    #[test]
    fn test_fractional_segment_count() {
        // 150s -> 2.5 minutes, segments at 0, 1, 2
        let plan = SegmentPlan::new(150.0, &DurationTable::default());
        assert_eq!(plan.segment_count(), 2.5);
        assert_eq!(plan.marker_count(), 3);
        assert_eq!(plan.offset_percent(1), 40.0);
        assert_eq!(plan.offset_percent(2), 80.0);
    }

    #[test]
    fn test_no_applicable_unit_uses_single_segment() {
        let table = DurationTable::new([(60, UnitLabels::new("minute", "minutes"))]).unwrap();
        let plan = SegmentPlan::new(3.0, &table);
        assert_eq!(plan.largest_unit(), None);
        assert_eq!(plan.segment_count(), 1.0);
        assert_eq!(plan.marker_count(), 2);
        assert!(plan.offset_percent(1).is_finite());

        let empty = SegmentPlan::new(0.0, &DurationTable::default());
        assert_eq!(empty.segment_count(), 1.0);
    }

    #[test]
    fn test_reduction_keeps_even_positions_of_previous_pass() {
        let all: Vec<usize> = (0..=10).collect();
        assert_eq!(halve(all.clone()), vec![0, 2, 4, 6, 8, 10]);
        assert_eq!(reduce_to_fit(all, 10.0, 4), vec![0, 4, 8]);
    }

    #[test]
    fn test_reduction_stops_at_one_item() {
        let all: Vec<usize> = (0..=10).collect();
        assert_eq!(reduce_to_fit(all, 10.0, 0), vec![0]);
        assert_eq!(reduce_to_fit(Vec::<usize>::new(), 0.0, 0), Vec::<usize>::new());
    }

    #[test]
    fn test_reduction_noop_when_everything_fits() {
        let all: Vec<usize> = (0..=10).collect();
        assert_eq!(reduce_to_fit(all.clone(), 10.0, 11), all);
    }

    #[test]
    fn test_exact_fit_counts_intervals_not_markers() {
        let all: Vec<usize> = (0..=10).collect();
        // Ten intervals in room for ten: all eleven markers stay
        assert_eq!(reduce_to_fit(all.clone(), 10.0, 10), all);
        assert_eq!(reduce_to_fit(all, 10.0, 9), vec![0, 2, 4, 6, 8, 10]);

        let plan = SegmentPlan::new(600.0, &DurationTable::default());
        assert_eq!(plan.visible(350.0, 35.0).len(), 11);
        assert_eq!(plan.visible(349.0, 35.0).len(), 6);
    }

    #[test]
    fn test_fractional_count_halves_with_list() {
        // 2.5 intervals, 3 markers: 2.5 > 2 halves once to 1.25
        let plan = SegmentPlan::new(150.0, &DurationTable::default());
        assert_eq!(plan.visible(70.0, 35.0), vec![0, 2]);
        assert_eq!(plan.visible(105.0, 35.0), vec![0, 1, 2]);
    }

    #[test]
    fn test_visible_uses_width_and_threshold() {
        let plan = SegmentPlan::new(600.0, &DurationTable::default());
        // 140 / 35 = 4 segments fit
        assert_eq!(plan.visible(140.0, 35.0), vec![0, 4, 8]);
        assert_eq!(plan.visible(1000.0, 35.0).len(), 11);
        assert_eq!(plan.visible(10.0, 35.0), vec![0]);
    }

    #[test]
    fn test_used_flags_follow_percentage() {
        let plan = SegmentPlan::new(600.0, &DurationTable::default());
        assert!(plan.is_used(0.0, 0));
        assert!(!plan.is_used(0.0, 1));
        assert!(plan.is_used(0.35, 3));
        assert!(!plan.is_used(0.35, 4));
        assert!(plan.is_used(1.0, 10));
    }
}
