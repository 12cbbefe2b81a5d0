//! One lookup root together with its form, record view and reference
//! selection. The main screen and every nested lookup dialog each own one.

use std::sync::Arc;

use chrono::Utc;
use crossterm::event::KeyCode;
use crossterm::event::KeyEvent;
use crossterm::event::KeyEventKind;
use ratatui::buffer::Buffer;
use ratatui::layout::Constraint;
use ratatui::layout::Layout;
use ratatui::layout::Rect;
use ratatui::style::Stylize;
use ratatui::text::Line;
use ratatui::text::Span;
use ratatui::widgets::Paragraph;
use ratatui::widgets::Widget;
use ratatui::widgets::Wrap;
use warden_core::ChannelSender;
use warden_core::ConnectionQuery;
use warden_core::LookupRequest;
use warden_core::LookupRoot;
use warden_core::LookupState;
use warden_core::PlayerKey;
use warden_core::PlayerRecord;
use warden_core::RootId;
use warden_core::channel::pivot_to;
use warden_core::lookup::ApplyOutcome;
use warden_core::lookup::NOT_FOUND_NOTICE;
use warden_core::lookup::ResolveCompletion;

use crate::key_hint;
use crate::key_hint::KeyBinding;
use crate::overlays::OverlayRequest;
use crate::overlays::ViewAction;
use crate::query_form::FormOutcome;
use crate::query_form::QueryForm;
use crate::record_view::record_lines;
use crate::references::IdentityRef;
use crate::references::RefLines;
use crate::references::clamp_selection;
use crate::references::cycle;

const SCROLL_CONTEXT: usize = 2;

pub(crate) struct LookupPane {
    root: LookupRoot,
    channel: ChannelSender,
    form: QueryForm,
    editing: bool,
    selected: Option<usize>,
    scroll: u16,
    actions_enabled: bool,
}

impl LookupPane {
    pub(crate) fn new(root: LookupRoot, channel: ChannelSender, actions_enabled: bool) -> Self {
        let mut form = QueryForm::default();
        if let Some(key) = root.active_key() {
            form.prefill(key);
        }
        Self {
            root,
            channel,
            form,
            editing: false,
            selected: None,
            scroll: 0,
            actions_enabled,
        }
    }

    pub(crate) fn id(&self) -> RootId {
        self.root.id()
    }

    pub(crate) fn root(&self) -> &LookupRoot {
        &self.root
    }

    pub(crate) fn selected_reference(&self) -> Option<IdentityRef> {
        let refs = self.references();
        clamp_selection(self.selected, refs.len()).map(|i| refs[i].clone())
    }

    pub(crate) fn apply(&mut self, completion: ResolveCompletion) -> ApplyOutcome {
        let outcome = self.root.apply(completion);
        if outcome == ApplyOutcome::Applied {
            self.reset_view();
            if let Some(key) = self.root.active_key() {
                self.form.prefill(key);
            }
        }
        outcome
    }

    pub(crate) fn handle_request(&mut self, request: LookupRequest) {
        if self.root.handle_request(request) {
            self.editing = false;
        }
    }

    fn reset_view(&mut self) {
        self.selected = None;
        self.scroll = 0;
    }

    fn shows_form(&self) -> bool {
        self.editing
            || matches!(
                self.root.state(),
                LookupState::Empty | LookupState::NotFound | LookupState::Failed(_)
            )
    }

    fn record(&self) -> Option<&PlayerRecord> {
        self.root.displayed_record().map(Arc::as_ref)
    }

    fn build(&self) -> Option<(Vec<Line<'static>>, Vec<IdentityRef>)> {
        let record = self.record()?;
        let mut out = RefLines::new(self.selected);
        record_lines(&mut out, record, Utc::now(), self.actions_enabled);
        Some(out.into_parts())
    }

    fn references(&self) -> Vec<IdentityRef> {
        self.build().map(|(_, refs)| refs).unwrap_or_default()
    }

    pub(crate) fn handle_key_event(&mut self, key: KeyEvent) -> ViewAction {
        if !matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat) {
            return ViewAction::None;
        }
        if self.shows_form() {
            return self.handle_form_key(key);
        }
        match key.code {
            KeyCode::Tab | KeyCode::BackTab => {
                let refs = self.references();
                self.selected = cycle(self.selected, refs.len(), key.code == KeyCode::Tab);
                if let Some(reference) = self.selected.and_then(|i| refs.get(i)) {
                    let top = reference.line.saturating_sub(SCROLL_CONTEXT);
                    self.scroll = u16::try_from(top).unwrap_or(u16::MAX);
                }
                ViewAction::None
            }
            KeyCode::Enter => {
                if let Some(reference) = self.selected_reference() {
                    pivot_to(Some(&self.channel), &reference.ckey);
                }
                ViewAction::None
            }
            KeyCode::Esc => {
                if self.selected.take().is_some() {
                    ViewAction::None
                } else {
                    ViewAction::Close
                }
            }
            KeyCode::Up => {
                self.scroll = self.scroll.saturating_sub(1);
                ViewAction::None
            }
            KeyCode::Down => {
                self.scroll = self.scroll.saturating_add(1);
                ViewAction::None
            }
            KeyCode::PageUp => {
                self.scroll = self.scroll.saturating_sub(10);
                ViewAction::None
            }
            KeyCode::PageDown => {
                self.scroll = self.scroll.saturating_add(10);
                ViewAction::None
            }
            KeyCode::Char('/') => {
                self.editing = true;
                ViewAction::None
            }
            KeyCode::Char('r') => {
                self.root.refresh();
                ViewAction::None
            }
            KeyCode::Char('q') => ViewAction::Exit,
            KeyCode::Char('o') => match self.selected_reference() {
                Some(reference) => ViewAction::Open(OverlayRequest::NestedLookup {
                    key: PlayerKey::ckey(reference.ckey),
                }),
                None => ViewAction::None,
            },
            KeyCode::Char(c) => self.record_command(c),
            _ => ViewAction::None,
        }
    }

    fn record_command(&self, c: char) -> ViewAction {
        let Some(record) = self.record() else {
            return ViewAction::None;
        };
        let connections = |query| {
            ViewAction::Open(OverlayRequest::Connections {
                query,
                ckey: record.ckey.clone(),
                channel: self.channel.clone(),
            })
        };
        match c {
            'c' => connections(ConnectionQuery::ByCkeyFull),
            'i' => connections(ConnectionQuery::ByAllCidsFull),
            'p' => connections(ConnectionQuery::ByAllIpsFull),
            'a' => ViewAction::Open(OverlayRequest::AppliedNotes {
                player_id: record.id,
                ckey: record.ckey.clone(),
                channel: self.channel.clone(),
            }),
            'n' => ViewAction::Open(OverlayRequest::AddNote {
                player_id: record.id,
                ckey: record.ckey.clone(),
                channel: self.channel.clone(),
            }),
            'w' => ViewAction::Open(OverlayRequest::Whitelist {
                ckey: record.ckey.clone(),
                entries: record
                    .whitelist_entries()
                    .into_iter()
                    .map(str::to_string)
                    .collect(),
            }),
            'y' => match record.discord_id {
                Some(id) => ViewAction::Copy(id.to_string()),
                None => ViewAction::Toast("No linked Discord account.".to_string()),
            },
            _ => ViewAction::None,
        }
    }

    fn handle_form_key(&mut self, key: KeyEvent) -> ViewAction {
        if key.code == KeyCode::Esc {
            if self.editing && self.record().is_some() {
                self.editing = false;
                return ViewAction::None;
            }
            return ViewAction::Close;
        }
        match self.form.handle_key_event(key) {
            FormOutcome::Submit(key) => {
                self.editing = false;
                self.reset_view();
                self.root.submit(key);
            }
            FormOutcome::Edited | FormOutcome::Ignored => {}
        }
        ViewAction::None
    }

    pub(crate) fn key_hints(&self) -> Vec<(KeyBinding, &'static str)> {
        if self.shows_form() {
            return vec![
                (key_hint::plain(KeyCode::Enter), "search"),
                (key_hint::plain(KeyCode::Tab), "switch key"),
                (key_hint::plain(KeyCode::Esc), "back"),
            ];
        }
        let mut hints = vec![(key_hint::plain(KeyCode::Tab), "select")];
        if self.selected.is_some() {
            hints.push((key_hint::plain(KeyCode::Enter), "pivot"));
            hints.push((key_hint::char('o'), "open"));
        }
        hints.extend([
            (key_hint::char('c'), "connections"),
            (key_hint::char('i'), "by CIDs"),
            (key_hint::char('p'), "by IPs"),
            (key_hint::char('a'), "applied notes"),
            (key_hint::char('n'), "add note"),
            (key_hint::char('w'), "whitelists"),
            (key_hint::char('y'), "copy Discord ID"),
            (key_hint::char('/'), "search"),
            (key_hint::char('q'), "quit"),
        ]);
        hints
    }

    pub(crate) fn render(&self, area: Rect, buf: &mut Buffer) {
        let lines = if self.shows_form() {
            let mut lines = self.form.lines();
            lines.push(Line::default());
            match self.root.state() {
                LookupState::NotFound => lines.push(Line::from(NOT_FOUND_NOTICE.red())),
                LookupState::Failed(message) => {
                    lines.push(Line::from(Span::from(format!("Lookup failed: {message}")).red()));
                    lines.push(Line::from("Press enter to try again.".dim()));
                }
                LookupState::Loading { .. } => lines.push(Line::from("Loading…".dim())),
                LookupState::Empty | LookupState::Found(_) => {}
            }
            lines
        } else if let Some((lines, _)) = self.build() {
            let mut area = area;
            if self.root.is_loading() {
                // Kept out of the scrolled text so reference lines stay put.
                let [banner, rest] =
                    Layout::vertical([Constraint::Length(1), Constraint::Min(0)]).areas(area);
                Line::from("Refreshing…".dim().italic()).render(banner, buf);
                area = rest;
            }
            Paragraph::new(lines)
                .wrap(Wrap { trim: false })
                .scroll((self.scroll, 0))
                .render(area, buf);
            return;
        } else {
            let key = self
                .root
                .active_key()
                .map(ToString::to_string)
                .unwrap_or_default();
            vec![Line::from(Span::from(format!("Loading {key}…")).dim())]
        };

        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .scroll((self.scroll, 0))
            .render(area, buf);
    }
}
