use crossterm::event::KeyCode;
use crossterm::event::KeyEvent;
use crossterm::event::KeyEventKind;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Stylize;
use ratatui::text::Line;
use ratatui::widgets::Paragraph;
use ratatui::widgets::Widget;
use ratatui::widgets::Wrap;

use super::Overlay;
use super::OverlayId;
use super::ViewAction;
use super::render_frame;
use crate::key_hint;
use crate::key_hint::KeyBinding;

pub(crate) struct WhitelistOverlay {
    id: OverlayId,
    ckey: String,
    entries: Vec<String>,
}

impl WhitelistOverlay {
    pub(crate) fn new(ckey: String, entries: Vec<String>) -> Self {
        Self {
            id: OverlayId::next(),
            ckey,
            entries,
        }
    }
}

impl Overlay for WhitelistOverlay {
    fn id(&self) -> OverlayId {
        self.id
    }

    fn handle_key_event(&mut self, key_event: KeyEvent) -> ViewAction {
        if key_event.kind == KeyEventKind::Press && key_event.code == KeyCode::Esc {
            ViewAction::Close
        } else {
            ViewAction::None
        }
    }

    fn key_hints(&self) -> Vec<(KeyBinding, &'static str)> {
        vec![(key_hint::plain(KeyCode::Esc), "close")]
    }

    fn render(&self, area: Rect, buf: &mut Buffer) {
        let inner = render_frame(&format!("Role Whitelists: {}", self.ckey), area, buf);
        let lines: Vec<Line> = if self.entries.is_empty() {
            vec![Line::from("No role whitelists.".dim())]
        } else {
            self.entries
                .iter()
                .map(|entry| Line::from(format!("• {entry}")))
                .collect()
        };
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .render(inner, buf);
    }
}
