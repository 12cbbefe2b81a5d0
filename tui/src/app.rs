use std::sync::Arc;
use std::time::Duration;
use std::time::Instant;

use crossterm::event::Event;
use crossterm::event::EventStream;
use crossterm::event::KeyCode;
use crossterm::event::KeyEvent;
use futures::StreamExt;
use ratatui::buffer::Buffer;
use ratatui::layout::Constraint;
use ratatui::layout::Layout;
use ratatui::layout::Rect;
use ratatui::style::Stylize;
use ratatui::text::Line;
use ratatui::text::Span;
use ratatui::widgets::Block;
use ratatui::widgets::Borders;
use ratatui::widgets::Paragraph;
use ratatui::widgets::Widget;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::mpsc::unbounded_channel;
use warden_core::BackendClient;
use warden_core::ChannelSender;
use warden_core::ConsoleConfig;
use warden_core::LookupRequest;
use warden_core::LookupRoot;
use warden_core::PlayerKey;
use warden_core::RootId;
use warden_core::lookup::ResolveLoader;
use warden_core::lookup::spawn_resolver;

use crate::app_event::AppEvent;
use crate::app_event_sender::AppEventSender;
use crate::key_hint;
use crate::key_hint::KeyBinding;
use crate::lookup_pane::LookupPane;
use crate::overlays::AddNoteOverlay;
use crate::overlays::AppliedNotesOverlay;
use crate::overlays::ConnectionsOverlay;
use crate::overlays::NestedLookupOverlay;
use crate::overlays::Overlay;
use crate::overlays::OverlayId;
use crate::overlays::OverlayRequest;
use crate::overlays::ViewAction;
use crate::overlays::WhitelistOverlay;
use crate::overlays::popup_area;
use crate::toast::ToastStack;
use crate::tui::Tui;

const TOAST_TICK: Duration = Duration::from_millis(250);
const POPUP_PERCENT: u16 = 80;
const QUIT: KeyBinding = key_hint::ctrl(KeyCode::Char('c'));

/// Everything needed to create a lookup root wired into this app.
struct PaneFactory {
    resolver: ResolveLoader,
    app_event_tx: AppEventSender,
    lookup_tx: UnboundedSender<(RootId, LookupRequest)>,
    actions_enabled: bool,
}

impl PaneFactory {
    /// Closable panes live in a dialog; an empty resolution asks the app to
    /// close that dialog.
    fn pane(&self, key: Option<PlayerKey>, closable: bool) -> LookupPane {
        let id = RootId::next();
        let mut root = LookupRoot::new(
            id,
            Arc::clone(&self.resolver),
            Arc::new(self.app_event_tx.clone()),
        );
        if closable {
            let tx = self.app_event_tx.clone();
            root = root.with_close_handler(Box::new(move || tx.send(AppEvent::CloseRoot(id))));
        }
        let root = root.with_initial_key(key);
        LookupPane::new(
            root,
            ChannelSender::new(id, self.lookup_tx.clone()),
            self.actions_enabled,
        )
    }
}

pub(crate) struct App {
    client: Arc<dyn BackendClient>,
    app_event_tx: AppEventSender,
    app_event_rx: UnboundedReceiver<AppEvent>,
    lookup_rx: UnboundedReceiver<(RootId, LookupRequest)>,
    panes: PaneFactory,
    main: LookupPane,
    overlays: Vec<Box<dyn Overlay>>,
    toasts: ToastStack,
    exit: bool,
}

impl App {
    pub(crate) fn new(
        config: &ConsoleConfig,
        client: Arc<dyn BackendClient>,
        initial_key: Option<PlayerKey>,
    ) -> Self {
        let (app_tx, app_event_rx) = unbounded_channel();
        let app_event_tx = AppEventSender::new(app_tx);
        let (lookup_tx, lookup_rx) = unbounded_channel();

        let completions = app_event_tx.clone();
        let resolver = spawn_resolver(Arc::clone(&client), move |completion| {
            completions.send(AppEvent::Resolved(completion));
        });
        let panes = PaneFactory {
            resolver,
            app_event_tx: app_event_tx.clone(),
            lookup_tx,
            actions_enabled: config.actions_enabled,
        };
        let main = panes.pane(initial_key, false);

        Self {
            client,
            app_event_tx,
            app_event_rx,
            lookup_rx,
            panes,
            main,
            overlays: Vec::new(),
            toasts: ToastStack::new(Duration::from_millis(config.toast_ttl_ms)),
            exit: false,
        }
    }

    pub(crate) async fn run(&mut self, tui: &mut Tui) -> color_eyre::Result<()> {
        let mut events = EventStream::new();
        let mut tick = tokio::time::interval(TOAST_TICK);
        while !self.exit {
            tui.draw(|frame| self.render(frame.area(), frame.buffer_mut()))?;
            tokio::select! {
                Some(event) = events.next() => {
                    self.handle_app_event(AppEvent::Terminal(event?));
                }
                Some(event) = self.app_event_rx.recv() => self.handle_app_event(event),
                Some((root, request)) = self.lookup_rx.recv() => {
                    self.route_lookup_request(root, request);
                }
                _ = tick.tick() => {
                    self.toasts.prune(Instant::now());
                }
            }
        }
        Ok(())
    }

    fn pane_mut(&mut self, root: RootId) -> Option<&mut LookupPane> {
        if self.main.id() == root {
            return Some(&mut self.main);
        }
        self.overlays
            .iter_mut()
            .find_map(|overlay| overlay.lookup_pane_mut().filter(|pane| pane.id() == root))
    }

    fn route_lookup_request(&mut self, root: RootId, request: LookupRequest) {
        match self.pane_mut(root) {
            Some(pane) => pane.handle_request(request),
            None => tracing::debug!("dropping {request:?} for closed {root}"),
        }
    }

    fn handle_app_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Terminal(Event::Key(key_event)) => self.handle_key_event(key_event),
            AppEvent::Terminal(_) => {}
            AppEvent::Resolved(completion) => {
                let root = completion.root;
                match self.pane_mut(root) {
                    Some(pane) => {
                        pane.apply(completion);
                    }
                    None => tracing::debug!("dropping resolution for closed {root}"),
                }
            }
            AppEvent::Overlay { overlay, event } => {
                let Some(target) = self.overlays.iter_mut().find(|o| o.id() == overlay) else {
                    tracing::debug!("dropping {event:?} for closed overlay");
                    return;
                };
                let action = target.on_event(event);
                self.apply_action(Some(overlay), action);
            }
            AppEvent::CloseRoot(root) => {
                self.overlays.retain_mut(|overlay| {
                    overlay
                        .lookup_pane_mut()
                        .is_none_or(|pane| pane.id() != root)
                });
            }
            AppEvent::Toast(message) => self.toasts.push(message, Instant::now()),
            AppEvent::Exit => self.exit = true,
        }
    }

    fn handle_key_event(&mut self, key_event: KeyEvent) {
        if QUIT.is_press(key_event) {
            self.app_event_tx.send(AppEvent::Exit);
            return;
        }
        let (source, action) = match self.overlays.last_mut() {
            Some(overlay) => (Some(overlay.id()), overlay.handle_key_event(key_event)),
            None => (None, self.main.handle_key_event(key_event)),
        };
        self.apply_action(source, action);
    }

    /// `source` is the overlay that produced `action`, or `None` for the
    /// main lookup.
    fn apply_action(&mut self, source: Option<OverlayId>, action: ViewAction) {
        match action {
            ViewAction::None => {}
            ViewAction::Close => {
                if let Some(id) = source {
                    self.overlays.retain(|overlay| overlay.id() != id);
                }
            }
            ViewAction::Open(request) => self.open_overlay(request),
            ViewAction::Copy(text) => self.copy_to_clipboard(text),
            ViewAction::Toast(message) => self.toasts.push(message, Instant::now()),
            ViewAction::Exit => self.exit = true,
        }
    }

    fn open_overlay(&mut self, request: OverlayRequest) {
        let client = Arc::clone(&self.client);
        let tx = self.app_event_tx.clone();
        let overlay: Box<dyn Overlay> = match request {
            OverlayRequest::Connections {
                query,
                ckey,
                channel,
            } => Box::new(ConnectionsOverlay::new(query, ckey, channel, client, tx)),
            OverlayRequest::AppliedNotes {
                player_id,
                ckey,
                channel,
            } => Box::new(AppliedNotesOverlay::new(player_id, ckey, channel, client, tx)),
            OverlayRequest::AddNote {
                player_id,
                ckey,
                channel,
            } => Box::new(AddNoteOverlay::new(player_id, ckey, channel, client, tx)),
            OverlayRequest::Whitelist { ckey, entries } => {
                Box::new(WhitelistOverlay::new(ckey, entries))
            }
            OverlayRequest::NestedLookup { key } => {
                Box::new(NestedLookupOverlay::new(self.panes.pane(Some(key), true)))
            }
        };
        self.overlays.push(overlay);
    }

    fn copy_to_clipboard(&mut self, text: String) {
        let copied = arboard::Clipboard::new().and_then(|mut clipboard| clipboard.set_text(text));
        let message = match copied {
            Ok(()) => "Copied to clipboard.",
            Err(err) => {
                tracing::warn!("clipboard unavailable: {err}");
                "Failed to copy to clipboard."
            }
        };
        self.toasts.push(message, Instant::now());
    }

    fn key_hints(&self) -> Vec<(KeyBinding, &'static str)> {
        match self.overlays.last() {
            Some(overlay) => overlay.key_hints(),
            None => self.main.key_hints(),
        }
    }

    fn render(&self, area: Rect, buf: &mut Buffer) {
        let [body, footer] =
            Layout::vertical([Constraint::Min(1), Constraint::Length(2)]).areas(area);

        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Player Lookup ".bold());
        let inner = block.inner(body);
        block.render(body, buf);
        self.main.render(inner, buf);

        let popup = popup_area(body, POPUP_PERCENT);
        for overlay in &self.overlays {
            overlay.render(popup, buf);
        }

        let toast = match self.toasts.latest() {
            Some(message) if self.toasts.len() > 1 => Line::from(vec![
                Span::from(message.to_string()).yellow(),
                Span::from(format!(" (+{})", self.toasts.len() - 1)).dim(),
            ]),
            Some(message) => Line::from(Span::from(message.to_string()).yellow()),
            None => Line::default(),
        };
        let hints = key_hint::hint_line(&self.key_hints());
        Paragraph::new(vec![toast, hints]).render(footer, buf);
    }
}
