//! Segmented time bar drawing.
//!
//! Draws a [`TimeBarState`] as an optional bordered block holding two rows:
//! the fill row with separators and the centred progress label, and the row
//! of segment labels underneath.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, BorderType, Borders, Clear, Widget},
};

use crate::widgets::TimeBarState;

const SEPARATOR: char = '│';

pub struct TimeBar<'a> {
    state: &'a TimeBarState,
    bar_color: Color,
    used_color: Color,
    idle_color: Color,
    text_color: Color,
}

impl<'a> TimeBar<'a> {
    pub fn new(state: &'a TimeBarState) -> Self {
        let color = |value: &Option<String>, fallback| {
            value.as_deref().and_then(parse_color).unwrap_or(fallback)
        };

        Self {
            state,
            bar_color: color(&state.bar_color, Color::Green),
            used_color: color(&state.used_color, Color::White),
            idle_color: color(&state.idle_color, Color::DarkGray),
            text_color: color(&state.text_color, Color::White),
        }
    }

    pub fn render(&self, area: Rect, buf: &mut Buffer) {
        if (self.state.show_border && area.width < 3) || area.height < 1 {
            return;
        }

        if !self.state.show_border && area.width == 0 {
            return;
        }

        Clear.render(area, buf);

        let inner_area = if self.state.show_border {
            let border_type = match self.state.border_style.as_deref() {
                Some("double") => BorderType::Double,
                Some("rounded") => BorderType::Rounded,
                Some("thick") => BorderType::Thick,
                _ => BorderType::Plain,
            };
            let block = Block::default()
                .borders(Borders::ALL)
                .border_type(border_type)
                .title(self.state.title.as_str());

            let inner = block.inner(area);
            block.render(area, buf);
            inner
        } else {
            area
        };

        if inner_area.width == 0 || inner_area.height == 0 {
            return;
        }

        self.render_fill_row(inner_area, buf);
        if inner_area.height > 1 {
            self.render_label_row(inner_area, buf);
        }
    }

    fn render_fill_row(&self, area: Rect, buf: &mut Buffer) {
        let width = area.width;
        let y = area.y;
        let split_position = (self.state.fill * f64::from(width)).round() as u16;

        for i in 0..width {
            let cell = &mut buf[(area.x + i, y)];
            cell.set_char(' ');
            if i < split_position {
                cell.set_bg(self.bar_color);
            }
        }

        for segment in self.state.segments.iter().filter(|s| s.separator_active) {
            let column = segment.column(width);
            let fg = if segment.separator_used {
                self.used_color
            } else {
                self.idle_color
            };
            let cell = &mut buf[(area.x + column, y)];
            cell.set_char(SEPARATOR);
            cell.set_fg(fg);
        }

        // Progress label centred on the bar
        let text_width = self.state.label.chars().count() as u16;
        if text_width > 0 && text_width <= width {
            let text_start = (width - text_width) / 2;
            for (i, c) in self.state.label.chars().enumerate() {
                let cell = &mut buf[(area.x + text_start + i as u16, y)];
                cell.set_char(c);
                cell.set_fg(self.text_color);
            }
        }
    }

    fn render_label_row(&self, area: Rect, buf: &mut Buffer) {
        let width = area.width;
        let y = area.y + 1;
        // First free column; labels that would overlap an earlier one are dropped
        let mut free_from: u16 = 0;

        for segment in self.state.segments.iter().filter(|s| s.label_active) {
            let text_width = segment.text.chars().count() as u16;
            if text_width == 0 || text_width > width {
                continue;
            }

            let start = segment.column(width).min(width - text_width);
            if start < free_from {
                continue;
            }

            let style = if segment.label_used {
                Style::default().fg(self.used_color)
            } else {
                Style::default().fg(self.idle_color)
            };
            buf.set_string(area.x + start, y, &segment.text, style);
            free_from = start + text_width + 1;
        }
    }
}

fn parse_color(hex: &str) -> Option<Color> {
    let hex = hex.trim_start_matches('#');
    if hex.len() != 6 {
        return None;
    }

    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;

    Some(Color::Rgb(r, g, b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Renderer, SegmentFlag, SegmentMarker, SegmentPart};

    fn markers(count: usize) -> Vec<SegmentMarker> {
        (0..count)
            .map(|index| SegmentMarker {
                index,
                offset_percent: index as f64 * 100.0 / (count - 1) as f64,
                text: index.to_string(),
            })
            .collect()
    }

    fn row(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width).map(|x| buf[(x, y)].symbol()).collect()
    }

    fn activate(state: &mut TimeBarState, index: usize, used: bool) {
        for part in [SegmentPart::Separator, SegmentPart::Label] {
            state.set_flag(index, part, SegmentFlag::Active, true);
            state.set_flag(index, part, SegmentFlag::Used, used);
        }
    }

    #[test]
    fn test_parse_color() {
        assert_eq!(parse_color("#ff8000"), Some(Color::Rgb(255, 128, 0)));
        assert_eq!(parse_color("00ff00"), Some(Color::Rgb(0, 255, 0)));
        assert_eq!(parse_color("#fff"), None);
        assert_eq!(parse_color("#zzzzzz"), None);
    }

    #[test]
    fn test_fill_and_centered_label() {
        let mut state = TimeBarState::new("Tea");
        state.set_border_config(false, None);
        state.layout(10);
        state.set_fill(0.5);
        state.set_label("ab");

        let area = Rect::new(0, 0, 10, 2);
        let mut buf = Buffer::empty(area);
        TimeBar::new(&state).render(area, &mut buf);

        assert_eq!(row(&buf, 0), "    ab    ");
        assert_eq!(buf[(4, 0)].bg, Color::Green);
        assert_eq!(buf[(5, 0)].bg, Color::Reset);
        assert_eq!(buf[(4, 0)].fg, Color::White);
    }

    #[test]
    fn test_separators_and_segment_labels() {
        let mut state = TimeBarState::new("Tea");
        state.set_border_config(false, None);
        state.set_colors(None, Some("#ffffff".to_string()), Some("#808080".to_string()), None);
        state.layout(11);
        state.mount(&markers(3));
        activate(&mut state, 0, true);
        activate(&mut state, 1, false);
        activate(&mut state, 2, false);

        let area = Rect::new(0, 0, 11, 2);
        let mut buf = Buffer::empty(area);
        TimeBar::new(&state).render(area, &mut buf);

        assert_eq!(row(&buf, 0), "│    │    │");
        assert_eq!(buf[(0, 0)].fg, Color::Rgb(255, 255, 255));
        assert_eq!(buf[(5, 0)].fg, Color::Rgb(128, 128, 128));

        assert_eq!(row(&buf, 1), "0    1    2");
        assert_eq!(buf[(0, 1)].fg, Color::Rgb(255, 255, 255));
        assert_eq!(buf[(10, 1)].fg, Color::Rgb(128, 128, 128));
    }

    #[test]
    fn test_overlapping_labels_skipped() {
        let mut state = TimeBarState::new("Tea");
        state.set_border_config(false, None);
        state.layout(4);
        state.mount(&[
            SegmentMarker {
                index: 0,
                offset_percent: 0.0,
                text: "10".to_string(),
            },
            SegmentMarker {
                index: 1,
                offset_percent: 34.0,
                text: "11".to_string(),
            },
        ]);
        activate(&mut state, 0, false);
        activate(&mut state, 1, false);

        let area = Rect::new(0, 0, 4, 2);
        let mut buf = Buffer::empty(area);
        TimeBar::new(&state).render(area, &mut buf);

        assert_eq!(row(&buf, 1), "10  ");
    }

    #[test]
    fn test_last_label_pulled_inside() {
        let mut state = TimeBarState::new("Tea");
        state.set_border_config(false, None);
        state.layout(6);
        state.mount(&[SegmentMarker {
            index: 0,
            offset_percent: 100.0,
            text: "100".to_string(),
        }]);
        activate(&mut state, 0, true);

        let area = Rect::new(0, 0, 6, 2);
        let mut buf = Buffer::empty(area);
        TimeBar::new(&state).render(area, &mut buf);

        assert_eq!(row(&buf, 0), "     │");
        assert_eq!(row(&buf, 1), "   100");
    }

    #[test]
    fn test_border_and_title() {
        let mut state = TimeBarState::new("Tea");
        state.set_border_config(true, Some("plain".to_string()));
        state.layout(12);

        let area = Rect::new(0, 0, 12, state.height());
        let mut buf = Buffer::empty(area);
        TimeBar::new(&state).render(area, &mut buf);

        assert_eq!(row(&buf, 0), "┌Tea───────┐");
        assert_eq!(row(&buf, 3), "└──────────┘");
    }

    #[test]
    fn test_tiny_area_draws_nothing() {
        let state = TimeBarState::new("Tea");
        let area = Rect::new(0, 0, 2, 4);
        let mut buf = Buffer::empty(area);
        TimeBar::new(&state).render(area, &mut buf);
        assert_eq!(row(&buf, 0), "  ");
    }
}
