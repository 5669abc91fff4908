//! Duration units and single-unit duration text.
//!
//! A [`DurationTable`] maps unit lengths in seconds to singular/plural
//! labels. Formatting always picks one unit; there is no "1 minute 30
//! seconds" composite output.

use std::collections::BTreeMap;

use super::error::{ProgressError, ProgressResult};

/// Singular and plural label for one unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitLabels {
    pub singular: String,
    pub plural: String,
}

impl UnitLabels {
    pub fn new(singular: &str, plural: &str) -> Self {
        Self {
            singular: singular.to_string(),
            plural: plural.to_string(),
        }
    }

    fn for_count(&self, count: u64) -> &str {
        if count == 1 {
            &self.singular
        } else {
            &self.plural
        }
    }
}

/// Ordered unit table. Never empty, keys always > 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DurationTable {
    units: BTreeMap<u64, UnitLabels>,
}

impl DurationTable {
    pub fn new<I>(entries: I) -> ProgressResult<Self>
    where
        I: IntoIterator<Item = (u64, UnitLabels)>,
    {
        let mut units = BTreeMap::new();
        for (seconds, labels) in entries {
            if seconds == 0 {
                return Err(ProgressError::NonPositiveUnit { seconds });
            }
            units.insert(seconds, labels);
        }

        if units.is_empty() {
            return Err(ProgressError::EmptyDurationTable);
        }

        Ok(Self { units })
    }

    /// Units from largest to smallest
    pub fn descending(&self) -> impl Iterator<Item = (u64, &UnitLabels)> {
        self.units.iter().rev().map(|(seconds, labels)| (*seconds, labels))
    }

    pub fn smallest(&self) -> Option<(u64, &UnitLabels)> {
        self.units
            .iter()
            .next()
            .map(|(seconds, labels)| (*seconds, labels))
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Largest unit fitting into `total` at least once, if any
    pub fn largest_unit(&self, total: f64) -> Option<u64> {
        self.descending()
            .map(|(seconds, _)| seconds)
            .find(|&seconds| (total / seconds as f64).floor() >= 1.0)
    }
}

impl Default for DurationTable {
    fn default() -> Self {
        Self {
            units: BTreeMap::from([
                (1, UnitLabels::new("second", "seconds")),
                (60, UnitLabels::new("minute", "minutes")),
                (3600, UnitLabels::new("hour", "hours")),
            ]),
        }
    }
}

/// Formats seconds against a table, anchored to the largest unit of a total.
#[derive(Debug, Clone, Copy)]
pub struct DurationFormatter<'a> {
    table: &'a DurationTable,
    largest_unit: Option<u64>,
}

impl<'a> DurationFormatter<'a> {
    pub fn new(table: &'a DurationTable, total: f64) -> Self {
        Self {
            table,
            largest_unit: table.largest_unit(total),
        }
    }

    /// Reuse a largest unit computed earlier for the same total
    pub fn anchored(table: &'a DurationTable, largest_unit: Option<u64>) -> Self {
        Self {
            table,
            largest_unit,
        }
    }

    pub fn largest_unit(&self) -> Option<u64> {
        self.largest_unit
    }

    /// Render `seconds` in the largest unit that fits.
    ///
    /// With `hide_suffix` the label is dropped and units smaller than the
    /// total's largest unit are skipped, so elapsed text stays in the same
    /// unit as the total ("0" rather than "3" when the total is in hours).
    pub fn format(&self, seconds: f64, hide_suffix: bool) -> String {
        let floor = self.largest_unit.unwrap_or(0);

        for (unit, labels) in self.table.descending() {
            if hide_suffix && unit < floor {
                continue;
            }

            let count = (seconds / unit as f64).floor();
            if count >= 1.0 {
                let count = count as u64;
                return if hide_suffix {
                    count.to_string()
                } else {
                    format!("{} {}", count, labels.for_count(count))
                };
            }
        }

        match self.table.smallest() {
            Some((_, labels)) if !hide_suffix => format!("0 {}", labels.plural),
            _ => "0".to_string(),
        }
    }
}
