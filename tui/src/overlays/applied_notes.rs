use std::sync::Arc;

use crossterm::event::KeyCode;
use crossterm::event::KeyEvent;
use crossterm::event::KeyEventKind;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Stylize;
use ratatui::text::Line;
use ratatui::text::Span;
use ratatui::widgets::Paragraph;
use ratatui::widgets::Widget;
use ratatui::widgets::Wrap;
use warden_core::BackendClient;
use warden_core::ChannelSender;
use warden_core::LookupChannel;
use warden_core::PlayerKey;
use warden_core::model::Note;
use warden_core::notes::visible_notes;

use super::Overlay;
use super::OverlayId;
use super::OverlayRequest;
use super::ViewAction;
use super::render_frame;
use crate::app_event::AppEvent;
use crate::app_event::OverlayEvent;
use crate::app_event_sender::AppEventSender;
use crate::key_hint;
use crate::key_hint::KeyBinding;
use crate::record_view::note_lines;
use crate::references::IdentityRef;
use crate::references::RefLines;
use crate::references::clamp_selection;
use crate::references::cycle;

enum NotesState {
    Loading,
    Loaded(Vec<Note>),
    Failed(String),
}

/// Notes an admin has placed on other players.
pub(crate) struct AppliedNotesOverlay {
    id: OverlayId,
    player_id: i64,
    ckey: String,
    channel: ChannelSender,
    client: Arc<dyn BackendClient>,
    app_event_tx: AppEventSender,
    state: NotesState,
    selected: Option<usize>,
    scroll: u16,
}

impl AppliedNotesOverlay {
    pub(crate) fn new(
        player_id: i64,
        ckey: String,
        channel: ChannelSender,
        client: Arc<dyn BackendClient>,
        app_event_tx: AppEventSender,
    ) -> Self {
        let overlay = Self {
            id: OverlayId::next(),
            player_id,
            ckey,
            channel,
            client,
            app_event_tx,
            state: NotesState::Loading,
            selected: None,
            scroll: 0,
        };
        overlay.fetch();
        overlay
    }

    fn fetch(&self) {
        let overlay = self.id;
        let player_id = self.player_id;
        let client = Arc::clone(&self.client);
        let tx = self.app_event_tx.clone();
        tokio::spawn(async move {
            let result = client.applied_notes(player_id).await;
            tx.send(AppEvent::Overlay {
                overlay,
                event: OverlayEvent::AppliedNotesLoaded(result),
            });
        });
    }

    fn build(&self) -> (Vec<Line<'static>>, Vec<IdentityRef>) {
        let mut out = RefLines::new(self.selected);
        match &self.state {
            NotesState::Loading => out.push("Loading…".dim()),
            NotesState::Failed(message) => {
                out.push(Line::from(
                    Span::from(format!("Failed to load notes: {message}")).red(),
                ));
                out.push("Press r to retry.".dim());
            }
            NotesState::Loaded(notes) => {
                let mut any = false;
                for note in visible_notes(notes) {
                    any = true;
                    note_lines(&mut out, note, true);
                }
                if !any {
                    out.push("No notes.".dim());
                }
            }
        }
        out.into_parts()
    }

    fn selected_ckey(&self) -> Option<String> {
        let (_, refs) = self.build();
        clamp_selection(self.selected, refs.len()).map(|i| refs[i].ckey.clone())
    }
}

impl Overlay for AppliedNotesOverlay {
    fn id(&self) -> OverlayId {
        self.id
    }

    fn handle_key_event(&mut self, key_event: KeyEvent) -> ViewAction {
        if !matches!(key_event.kind, KeyEventKind::Press | KeyEventKind::Repeat) {
            return ViewAction::None;
        }
        match key_event.code {
            KeyCode::Esc => ViewAction::Close,
            KeyCode::Char('r') if matches!(self.state, NotesState::Failed(_)) => {
                self.state = NotesState::Loading;
                self.fetch();
                ViewAction::None
            }
            KeyCode::Tab | KeyCode::BackTab => {
                let (_, refs) = self.build();
                self.selected = cycle(self.selected, refs.len(), key_event.code == KeyCode::Tab);
                if let Some(reference) = self.selected.and_then(|i| refs.get(i)) {
                    self.scroll = u16::try_from(reference.line.saturating_sub(2)).unwrap_or(0);
                }
                ViewAction::None
            }
            KeyCode::Enter => match self.selected_ckey() {
                Some(ckey) => {
                    self.channel.pivot(&ckey);
                    ViewAction::Close
                }
                None => ViewAction::None,
            },
            KeyCode::Char('o') => match self.selected_ckey() {
                Some(ckey) => ViewAction::Open(OverlayRequest::NestedLookup {
                    key: PlayerKey::ckey(ckey),
                }),
                None => ViewAction::None,
            },
            KeyCode::Up => {
                self.scroll = self.scroll.saturating_sub(1);
                ViewAction::None
            }
            KeyCode::Down => {
                self.scroll = self.scroll.saturating_add(1);
                ViewAction::None
            }
            _ => ViewAction::None,
        }
    }

    fn on_event(&mut self, event: OverlayEvent) -> ViewAction {
        if let OverlayEvent::AppliedNotesLoaded(result) = event {
            self.selected = None;
            self.state = match result {
                Ok(notes) => NotesState::Loaded(notes),
                Err(err) => {
                    tracing::warn!("applied notes fetch for {} failed: {err}", self.ckey);
                    NotesState::Failed(err.summary())
                }
            };
        }
        ViewAction::None
    }

    fn key_hints(&self) -> Vec<(KeyBinding, &'static str)> {
        vec![
            (key_hint::plain(KeyCode::Tab), "select"),
            (key_hint::plain(KeyCode::Enter), "pivot"),
            (key_hint::char('o'), "open"),
            (key_hint::plain(KeyCode::Esc), "close"),
        ]
    }

    fn render(&self, area: Rect, buf: &mut Buffer) {
        let inner = render_frame(&format!("Notes applied by {}", self.ckey), area, buf);
        let (lines, _) = self.build();
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .scroll((self.scroll, 0))
            .render(inner, buf);
    }
}
