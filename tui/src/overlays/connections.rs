use std::collections::HashSet;
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
use warden_core::ConnectionQuery;
use warden_core::LookupChannel;
use warden_core::PlayerKey;
use warden_core::connections::ConnectionPanel;
use warden_core::connections::SummaryItem;
use warden_core::connections::summary_groups;

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
use crate::references::IdentityRef;
use crate::references::RefLines;
use crate::references::clamp_selection;
use crate::references::cycle;

/// Connection history of one ckey in one of the three query modes.
pub(crate) struct ConnectionsOverlay {
    id: OverlayId,
    query: ConnectionQuery,
    ckey: String,
    channel: ChannelSender,
    client: Arc<dyn BackendClient>,
    app_event_tx: AppEventSender,
    panel: ConnectionPanel,
    /// Labels of the summary groups currently showing their values.
    expanded: HashSet<&'static str>,
    focused_group: usize,
    selected: Option<usize>,
    scroll: u16,
}

impl ConnectionsOverlay {
    pub(crate) fn new(
        query: ConnectionQuery,
        ckey: String,
        channel: ChannelSender,
        client: Arc<dyn BackendClient>,
        app_event_tx: AppEventSender,
    ) -> Self {
        let overlay = Self {
            id: OverlayId::next(),
            query,
            ckey,
            channel,
            client,
            app_event_tx,
            panel: ConnectionPanel::Loading,
            expanded: HashSet::new(),
            focused_group: 0,
            selected: None,
            scroll: 0,
        };
        overlay.fetch();
        overlay
    }

    fn fetch(&self) {
        let overlay = self.id;
        let query = self.query;
        let ckey = self.ckey.clone();
        let client = Arc::clone(&self.client);
        let tx = self.app_event_tx.clone();
        tokio::spawn(async move {
            let result = client.connections(query, &ckey).await;
            tx.send(AppEvent::Overlay {
                overlay,
                event: OverlayEvent::ConnectionsLoaded(result),
            });
        });
    }

    fn retry(&mut self) {
        tracing::info!("retrying {:?} connections for {}", self.query, self.ckey);
        self.panel = ConnectionPanel::Loading;
        self.fetch();
    }

    fn build(&self) -> (Vec<Line<'static>>, Vec<IdentityRef>) {
        let mut out = RefLines::new(self.selected);
        match &self.panel {
            ConnectionPanel::Loading => out.push("Loading…".dim()),
            ConnectionPanel::Failed(message) => {
                out.push(Line::from(
                    Span::from(format!("Failed to load connections: {message}")).red(),
                ));
                out.push("Press r to retry.".dim());
            }
            ConnectionPanel::Loaded(view) => {
                let mut group = 0;
                for item in summary_groups(view) {
                    match item {
                        SummaryItem::Group { label, values } => {
                            let expanded = self.expanded.contains(label);
                            let marker = if expanded { "▾ " } else { "▸ " };
                            let label = if group == self.focused_group {
                                label.bold().cyan()
                            } else {
                                label.bold()
                            };
                            out.push(Line::from(vec![marker.dim(), label]));
                            if expanded {
                                out.push(Line::from(format!("  {values}")));
                            }
                            group += 1;
                        }
                        SummaryItem::Separator => out.push("──".dim()),
                    }
                }
                out.blank();
                let triplets = self.panel.triplets();
                if triplets.is_empty() {
                    out.push("No connections.".dim());
                }
                for triplet in triplets {
                    let ckey = out.reference(Some(triplet.ckey.as_str()));
                    out.push(Line::from(vec![
                        ckey,
                        Span::from(format!(
                            "  CID {}  IP {}  {}",
                            triplet.last_known_cid,
                            triplet.last_known_ip,
                            triplet.login_date.as_deref().unwrap_or_default()
                        )),
                    ]));
                }
            }
        }
        out.into_parts()
    }

    fn group_labels(&self) -> Vec<&'static str> {
        let ConnectionPanel::Loaded(view) = &self.panel else {
            return Vec::new();
        };
        summary_groups(view)
            .into_iter()
            .filter_map(|item| match item {
                SummaryItem::Group { label, .. } => Some(label),
                SummaryItem::Separator => None,
            })
            .collect()
    }

    fn toggle_focused_group(&mut self) {
        let Some(label) = self.group_labels().get(self.focused_group).copied() else {
            return;
        };
        if !self.expanded.remove(label) {
            self.expanded.insert(label);
        }
    }

    fn selected_ckey(&self) -> Option<String> {
        let (_, refs) = self.build();
        clamp_selection(self.selected, refs.len()).map(|i| refs[i].ckey.clone())
    }
}

impl Overlay for ConnectionsOverlay {
    fn id(&self) -> OverlayId {
        self.id
    }

    fn handle_key_event(&mut self, key_event: KeyEvent) -> ViewAction {
        if !matches!(key_event.kind, KeyEventKind::Press | KeyEventKind::Repeat) {
            return ViewAction::None;
        }
        match key_event.code {
            KeyCode::Esc => ViewAction::Close,
            KeyCode::Char('r') if self.panel.can_retry() => {
                self.retry();
                ViewAction::None
            }
            KeyCode::Char('e') => {
                self.toggle_focused_group();
                ViewAction::None
            }
            KeyCode::Char('g') => {
                let groups = self.group_labels().len();
                if groups > 0 {
                    self.focused_group = (self.focused_group + 1) % groups;
                }
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
        if let OverlayEvent::ConnectionsLoaded(result) = event {
            self.panel = ConnectionPanel::from_result(result);
            self.selected = None;
            self.expanded.clear();
            self.focused_group = 0;
        }
        ViewAction::None
    }

    fn key_hints(&self) -> Vec<(KeyBinding, &'static str)> {
        let mut hints = vec![
            (key_hint::plain(KeyCode::Tab), "select"),
            (key_hint::plain(KeyCode::Enter), "pivot"),
            (key_hint::char('o'), "open"),
            (key_hint::char('g'), "next group"),
            (key_hint::char('e'), "expand"),
        ];
        if self.panel.can_retry() {
            hints.push((key_hint::char('r'), "retry"));
        }
        hints.push((key_hint::plain(KeyCode::Esc), "close"));
        hints
    }

    fn render(&self, area: Rect, buf: &mut Buffer) {
        let title = format!("{}: {}", self.query.label(), self.ckey);
        let inner = render_frame(&title, area, buf);
        let (lines, _) = self.build();
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .scroll((self.scroll, 0))
            .render(inner, buf);
    }
}
