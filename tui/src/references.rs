//! Selectable identity references inside rendered text.
//!
//! Views build their content through [`RefLines`]; every ckey placed with
//! [`RefLines::reference`] becomes a selectable target, in reading order.

use ratatui::style::Stylize;
use ratatui::text::Line;
use ratatui::text::Span;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct IdentityRef {
    pub ckey: String,
    /// Line the reference was placed on.
    pub line: usize,
}

pub(crate) struct RefLines {
    lines: Vec<Line<'static>>,
    refs: Vec<IdentityRef>,
    selected: Option<usize>,
}

impl RefLines {
    pub(crate) fn new(selected: Option<usize>) -> Self {
        Self {
            lines: Vec::new(),
            refs: Vec::new(),
            selected,
        }
    }

    pub(crate) fn push(&mut self, line: impl Into<Line<'static>>) {
        self.lines.push(line.into());
    }

    pub(crate) fn blank(&mut self) {
        self.lines.push(Line::default());
    }

    pub(crate) fn heading(&mut self, title: &str) {
        self.lines.push(Line::from(Span::from(title.to_string()).bold().underlined()));
    }

    /// Styled span for `ckey`, registered on the line that will be pushed
    /// next. Empty keys render as "Unknown" and are not selectable.
    pub(crate) fn reference(&mut self, ckey: Option<&str>) -> Span<'static> {
        let Some(ckey) = ckey.filter(|ckey| !ckey.is_empty()) else {
            return "Unknown".dim();
        };
        let index = self.refs.len();
        self.refs.push(IdentityRef {
            ckey: ckey.to_string(),
            line: self.lines.len(),
        });
        let span = Span::from(ckey.to_string()).cyan().underlined();
        if self.selected == Some(index) {
            span.reversed()
        } else {
            span
        }
    }

    pub(crate) fn into_parts(self) -> (Vec<Line<'static>>, Vec<IdentityRef>) {
        (self.lines, self.refs)
    }
}

/// Next selection when cycling through `len` references.
pub(crate) fn cycle(selected: Option<usize>, len: usize, forward: bool) -> Option<usize> {
    if len == 0 {
        return None;
    }
    Some(match (selected, forward) {
        (None, true) => 0,
        (None, false) => len - 1,
        (Some(i), true) => (i + 1) % len,
        (Some(i), false) => (i + len - 1) % len,
    })
}

/// Selection index that is still valid for `len` references.
pub(crate) fn clamp_selection(selected: Option<usize>, len: usize) -> Option<usize> {
    selected.filter(|i| *i < len)
}
