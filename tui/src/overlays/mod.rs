//! Dialogs stacked over the main lookup. Each one is an [`Overlay`]; the
//! app routes keys to the topmost overlay and background results to the
//! overlay that started them.

use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use crossterm::event::KeyEvent;
use ratatui::buffer::Buffer;
use ratatui::layout::Constraint;
use ratatui::layout::Flex;
use ratatui::layout::Layout;
use ratatui::layout::Rect;
use ratatui::style::Color;
use ratatui::style::Style;
use ratatui::widgets::Block;
use ratatui::widgets::BorderType;
use ratatui::widgets::Borders;
use ratatui::widgets::Clear;
use ratatui::widgets::Widget;
use warden_core::ChannelSender;
use warden_core::ConnectionQuery;
use warden_core::PlayerKey;

use crate::app_event::OverlayEvent;
use crate::key_hint::KeyBinding;
use crate::lookup_pane::LookupPane;

mod add_note;
mod applied_notes;
mod connections;
mod nested_lookup;
mod whitelist;

pub(crate) use add_note::AddNoteOverlay;
pub(crate) use applied_notes::AppliedNotesOverlay;
pub(crate) use connections::ConnectionsOverlay;
pub(crate) use nested_lookup::NestedLookupOverlay;
pub(crate) use whitelist::WhitelistOverlay;

static NEXT_OVERLAY_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct OverlayId(u64);

impl OverlayId {
    pub(crate) fn next() -> Self {
        OverlayId(NEXT_OVERLAY_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Dialogs a view can ask the app to open. Requests that act on a lookup
/// carry that lookup's channel, so references inside the dialog pivot the
/// root that opened it.
#[derive(Debug)]
pub(crate) enum OverlayRequest {
    Connections {
        query: ConnectionQuery,
        ckey: String,
        channel: ChannelSender,
    },
    AppliedNotes {
        player_id: i64,
        ckey: String,
        channel: ChannelSender,
    },
    AddNote {
        player_id: i64,
        ckey: String,
        channel: ChannelSender,
    },
    Whitelist {
        ckey: String,
        entries: Vec<String>,
    },
    NestedLookup {
        key: PlayerKey,
    },
}

#[derive(Debug)]
pub(crate) enum ViewAction {
    None,
    /// Close the view that produced the action.
    Close,
    Open(OverlayRequest),
    Copy(String),
    Toast(String),
    Exit,
}

pub(crate) trait Overlay: Send {
    fn id(&self) -> OverlayId;

    fn handle_key_event(&mut self, key_event: KeyEvent) -> ViewAction;

    /// Background work for this overlay finished.
    fn on_event(&mut self, _event: OverlayEvent) -> ViewAction {
        ViewAction::None
    }

    /// The lookup root hosted by this overlay, if it has one.
    fn lookup_pane_mut(&mut self) -> Option<&mut LookupPane> {
        None
    }

    fn key_hints(&self) -> Vec<(KeyBinding, &'static str)>;

    fn render(&self, area: Rect, buf: &mut Buffer);
}

/// Centered rect covering `percent` of `area` in both directions.
pub(crate) fn popup_area(area: Rect, percent: u16) -> Rect {
    let [area] = Layout::vertical([Constraint::Percentage(percent)])
        .flex(Flex::Center)
        .areas(area);
    let [area] = Layout::horizontal([Constraint::Percentage(percent)])
        .flex(Flex::Center)
        .areas(area);
    area
}

/// Clear `area`, draw the dialog frame and return the inner rect.
pub(crate) fn render_frame(title: &str, area: Rect, buf: &mut Buffer) -> Rect {
    Clear.render(area, buf);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Double)
        .border_style(Style::default().fg(Color::Yellow))
        .title(format!(" {title} "));
    let inner = block.inner(area);
    block.render(area, buf);
    inner
}
