//! Lookup form shown while a root has nothing to display.

use crossterm::event::KeyCode;
use crossterm::event::KeyEvent;
use crossterm::event::KeyEventKind;
use crossterm::event::KeyModifiers;
use ratatui::style::Stylize;
use ratatui::text::Line;
use ratatui::text::Span;
use warden_core::PlayerKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum KeyKind {
    #[default]
    Ckey,
    DiscordId,
}

impl KeyKind {
    fn label(self) -> &'static str {
        match self {
            KeyKind::Ckey => "CKEY",
            KeyKind::DiscordId => "Discord ID",
        }
    }

    fn toggled(self) -> Self {
        match self {
            KeyKind::Ckey => KeyKind::DiscordId,
            KeyKind::DiscordId => KeyKind::Ckey,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum FormOutcome {
    Submit(PlayerKey),
    Edited,
    Ignored,
}

#[derive(Debug, Default)]
pub(crate) struct QueryForm {
    kind: KeyKind,
    input: String,
    error: Option<String>,
}

impl QueryForm {
    pub(crate) fn handle_key_event(&mut self, key: KeyEvent) -> FormOutcome {
        if !matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat)
            || key.modifiers.contains(KeyModifiers::CONTROL)
        {
            return FormOutcome::Ignored;
        }
        match key.code {
            KeyCode::Char(c) => {
                self.input.push(c);
                self.error = None;
                FormOutcome::Edited
            }
            KeyCode::Backspace => {
                self.input.pop();
                self.error = None;
                FormOutcome::Edited
            }
            KeyCode::Tab | KeyCode::BackTab => {
                self.kind = self.kind.toggled();
                self.error = None;
                FormOutcome::Edited
            }
            KeyCode::Enter => match self.parse() {
                Ok(key) => FormOutcome::Submit(key),
                Err(error) => {
                    self.error = Some(error);
                    FormOutcome::Edited
                }
            },
            _ => FormOutcome::Ignored,
        }
    }

    fn parse(&self) -> Result<PlayerKey, String> {
        let input = self.input.trim();
        if input.is_empty() {
            return Err(format!("Enter a {}.", self.kind.label()));
        }
        match self.kind {
            KeyKind::Ckey => Ok(PlayerKey::ckey(input)),
            KeyKind::DiscordId => input
                .parse()
                .map(PlayerKey::DiscordId)
                .map_err(|_| "Discord ID must be numeric.".to_string()),
        }
    }

    /// Prefill from the key a root is currently showing.
    pub(crate) fn prefill(&mut self, key: &PlayerKey) {
        let (kind, input) = match key {
            PlayerKey::Ckey(ckey) => (KeyKind::Ckey, ckey.clone()),
            PlayerKey::DiscordId(id) => (KeyKind::DiscordId, id.to_string()),
        };
        self.kind = kind;
        self.input = input;
        self.error = None;
    }

    pub(crate) fn lines(&self) -> Vec<Line<'static>> {
        let mut lines = vec![
            Line::from(vec![
                "Look up by ".dim(),
                Span::from(self.kind.label()).cyan().bold(),
                " (tab to switch)".dim(),
            ]),
            Line::from(vec!["> ".cyan(), Span::from(self.input.clone()), "_".dim()]),
        ];
        if let Some(error) = &self.error {
            lines.push(Line::from(Span::from(error.clone()).red()));
        }
        lines
    }
}
