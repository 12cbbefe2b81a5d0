use std::sync::Arc;

use crossterm::event::KeyCode;
use crossterm::event::KeyEvent;
use crossterm::event::KeyEventKind;
use crossterm::event::KeyModifiers;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Color;
use ratatui::style::Style;
use ratatui::style::Stylize;
use ratatui::text::Line;
use ratatui::text::Span;
use ratatui::widgets::Paragraph;
use ratatui::widgets::Widget;
use ratatui::widgets::Wrap;
use warden_core::BackendClient;
use warden_core::ChannelSender;
use warden_core::LookupChannel;
use warden_core::notes::ComposerPhase;
use warden_core::notes::NoteComposer;
use warden_core::notes::NoteSubmission;
use warden_core::notes::SubmitStep;

use super::Overlay;
use super::OverlayId;
use super::ViewAction;
use super::render_frame;
use crate::app_event::AppEvent;
use crate::app_event::OverlayEvent;
use crate::app_event_sender::AppEventSender;
use crate::key_hint;
use crate::key_hint::KeyBinding;

const TOGGLE_CONFIDENTIAL: KeyBinding = key_hint::ctrl(KeyCode::Char('t'));

/// Composes an admin note. Enter arms, a second Enter sends.
pub(crate) struct AddNoteOverlay {
    id: OverlayId,
    composer: NoteComposer,
    channel: ChannelSender,
    client: Arc<dyn BackendClient>,
    app_event_tx: AppEventSender,
}

impl AddNoteOverlay {
    pub(crate) fn new(
        player_id: i64,
        ckey: String,
        channel: ChannelSender,
        client: Arc<dyn BackendClient>,
        app_event_tx: AppEventSender,
    ) -> Self {
        Self {
            id: OverlayId::next(),
            composer: NoteComposer::new(player_id, ckey),
            channel,
            client,
            app_event_tx,
        }
    }

    fn send(&self, submission: NoteSubmission) {
        let overlay = self.id;
        let player_id = self.composer.player_id();
        let client = Arc::clone(&self.client);
        let tx = self.app_event_tx.clone();
        tracing::info!("submitting note for {}", self.composer.ckey());
        tokio::spawn(async move {
            let outcome = client.submit_note(player_id, &submission).await;
            tx.send(AppEvent::Overlay {
                overlay,
                event: OverlayEvent::NoteSubmitted(outcome),
            });
        });
    }
}

impl Overlay for AddNoteOverlay {
    fn id(&self) -> OverlayId {
        self.id
    }

    fn handle_key_event(&mut self, key_event: KeyEvent) -> ViewAction {
        if !matches!(key_event.kind, KeyEventKind::Press | KeyEventKind::Repeat) {
            return ViewAction::None;
        }
        if TOGGLE_CONFIDENTIAL.is_press(key_event) {
            self.composer.toggle_confidential();
            return ViewAction::None;
        }
        match key_event.code {
            KeyCode::Esc => {
                if self.composer.phase() == ComposerPhase::Sending {
                    return ViewAction::None;
                }
                self.composer.cancel();
                ViewAction::Close
            }
            KeyCode::Enter => {
                if let SubmitStep::Send(submission) = self.composer.press_submit() {
                    self.send(submission);
                }
                ViewAction::None
            }
            KeyCode::Backspace => {
                self.composer.pop_char();
                ViewAction::None
            }
            KeyCode::Char(c) if !key_event.modifiers.contains(KeyModifiers::CONTROL) => {
                self.composer.push_char(c);
                ViewAction::None
            }
            _ => ViewAction::None,
        }
    }

    fn on_event(&mut self, event: OverlayEvent) -> ViewAction {
        let OverlayEvent::NoteSubmitted(outcome) = event else {
            return ViewAction::None;
        };
        if let Err(err) = &outcome {
            tracing::warn!("note submission for {} failed: {err}", self.composer.ckey());
        }
        let notice = self.composer.finish(&outcome);
        self.channel.reload(self.composer.ckey());
        self.app_event_tx.toast(notice);
        ViewAction::Close
    }

    fn key_hints(&self) -> Vec<(KeyBinding, &'static str)> {
        let submit = match self.composer.phase() {
            ComposerPhase::Armed => "confirm",
            ComposerPhase::Editing | ComposerPhase::Sending | ComposerPhase::Closed => "submit",
        };
        vec![
            (key_hint::plain(KeyCode::Enter), submit),
            (TOGGLE_CONFIDENTIAL, "confidential"),
            (key_hint::plain(KeyCode::Esc), "cancel"),
        ]
    }

    fn render(&self, area: Rect, buf: &mut Buffer) {
        let inner = render_frame(&format!("Add note to {}", self.composer.ckey()), area, buf);
        let checkbox = if self.composer.confidential() { "[x]" } else { "[ ]" };
        let status = match self.composer.phase() {
            ComposerPhase::Editing => Line::from("Press enter to submit.".dim()),
            ComposerPhase::Armed => Line::from(Span::styled(
                "Press enter again to confirm.",
                Style::default().fg(Color::Yellow).bold(),
            )),
            ComposerPhase::Sending => Line::from("Sending…".dim()),
            ComposerPhase::Closed => Line::default(),
        };
        let lines = vec![
            Line::from("Message:".cyan().bold()),
            Line::from(vec![
                Span::from(self.composer.message().to_string()),
                "_".dim(),
            ]),
            Line::default(),
            Line::from(format!("{checkbox} Confidential")),
            Line::default(),
            status,
        ];
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .render(inner, buf);
    }
}
