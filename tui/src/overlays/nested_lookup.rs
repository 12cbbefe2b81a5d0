use crossterm::event::KeyEvent;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;

use super::Overlay;
use super::OverlayId;
use super::ViewAction;
use super::render_frame;
use crate::key_hint::KeyBinding;
use crate::lookup_pane::LookupPane;

/// A lookup opened from a reference. Owns its own root, so references
/// inside it pivot this dialog and never the lookup underneath.
pub(crate) struct NestedLookupOverlay {
    id: OverlayId,
    pane: LookupPane,
}

impl NestedLookupOverlay {
    pub(crate) fn new(pane: LookupPane) -> Self {
        Self {
            id: OverlayId::next(),
            pane,
        }
    }
}

impl Overlay for NestedLookupOverlay {
    fn id(&self) -> OverlayId {
        self.id
    }

    fn handle_key_event(&mut self, key_event: KeyEvent) -> ViewAction {
        self.pane.handle_key_event(key_event)
    }

    fn lookup_pane_mut(&mut self) -> Option<&mut LookupPane> {
        Some(&mut self.pane)
    }

    fn key_hints(&self) -> Vec<(KeyBinding, &'static str)> {
        self.pane.key_hints()
    }

    fn render(&self, area: Rect, buf: &mut Buffer) {
        let title = match self.pane.root().active_key() {
            Some(key) => format!("Lookup: {key}"),
            None => "Lookup".to_string(),
        };
        let inner = render_frame(&title, area, buf);
        self.pane.render(inner, buf);
    }
}
