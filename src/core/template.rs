//! Label templates with `__name__` placeholders.
//!
//! Templates are parsed once when a bar is built. Unknown placeholder
//! names are rejected up front so a typo fails at construction instead of
//! showing up as literal text on every tick.

use std::sync::OnceLock;

use regex::Regex;

use super::error::{ProgressError, ProgressResult};

/// Fields available to the progress label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressField {
    /// Elapsed time, in the total's unit, without suffix
    Progress,
    /// Total duration with suffix
    Total,
    /// Remaining duration with suffix
    Duration,
    /// Percentage complete, one decimal
    Percentage,
}

impl ProgressField {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "progress" => Some(Self::Progress),
            "total" => Some(Self::Total),
            "duration" => Some(Self::Duration),
            "percentage" => Some(Self::Percentage),
            _ => None,
        }
    }
}

/// Field available to segment labels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentField {
    Count,
}

impl SegmentField {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "count" => Some(Self::Count),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece<F> {
    Literal(String),
    Field(F),
}

/// A parsed template over the field set `F`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template<F> {
    source: String,
    pieces: Vec<Piece<F>>,
}

pub type ProgressTemplate = Template<ProgressField>;
pub type SegmentTemplate = Template<SegmentField>;

fn placeholder_regex() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| Regex::new(r"__([A-Za-z]+)__").expect("placeholder pattern is valid"))
}

impl<F: Copy> Template<F> {
    fn parse_with(source: &str, lookup: fn(&str) -> Option<F>) -> ProgressResult<Self> {
        let mut pieces = Vec::new();
        let mut last = 0;

        for caps in placeholder_regex().captures_iter(source) {
            let whole = caps.get(0).map_or(0..0, |m| m.range());
            let name = caps.get(1).map_or("", |m| m.as_str());

            let field = lookup(name).ok_or_else(|| ProgressError::UnknownPlaceholder {
                template: source.to_string(),
                name: name.to_string(),
            })?;

            if whole.start > last {
                pieces.push(Piece::Literal(source[last..whole.start].to_string()));
            }
            pieces.push(Piece::Field(field));
            last = whole.end;
        }

        if last < source.len() {
            pieces.push(Piece::Literal(source[last..].to_string()));
        }

        Ok(Self {
            source: source.to_string(),
            pieces,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Substitute every placeholder using `value`
    pub fn render(&self, mut value: impl FnMut(F) -> String) -> String {
        let mut out = String::with_capacity(self.source.len());
        for piece in &self.pieces {
            match piece {
                Piece::Literal(text) => out.push_str(text),
                Piece::Field(field) => out.push_str(&value(*field)),
            }
        }
        out
    }
}

impl Template<ProgressField> {
    pub fn parse(source: &str) -> ProgressResult<Self> {
        Self::parse_with(source, ProgressField::from_name)
    }
}

impl Template<SegmentField> {
    pub fn parse(source: &str) -> ProgressResult<Self> {
        Self::parse_with(source, SegmentField::from_name)
    }
}

/// `floor(percentage * 1000) / 10`, printed without a trailing `.0`
pub fn format_percentage(percentage: f64) -> String {
    let value = (percentage * 1000.0).floor() / 10.0;
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{:.1}", value)
    }
}
