//! Note ledger: tag selection, visibility filtering and the two-step note
//! composer.

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;

use crate::error::LookupResult;
use crate::model::Note;

const NOTE_ADMIN: i64 = 1;
const NOTE_MERIT: i64 = 2;
const NOTE_WHITELIST: i64 = 3;

/// Category a note was filed under. Travels as an integer code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NoteCategory {
    #[default]
    Admin,
    Merit,
    Whitelist,
    /// A code this console does not know about yet.
    Other(i64),
}

impl NoteCategory {
    pub fn from_code(code: i64) -> Self {
        match code {
            NOTE_ADMIN => NoteCategory::Admin,
            NOTE_MERIT => NoteCategory::Merit,
            NOTE_WHITELIST => NoteCategory::Whitelist,
            other => NoteCategory::Other(other),
        }
    }

    pub fn code(self) -> i64 {
        match self {
            NoteCategory::Admin => NOTE_ADMIN,
            NoteCategory::Merit => NOTE_MERIT,
            NoteCategory::Whitelist => NOTE_WHITELIST,
            NoteCategory::Other(code) => code,
        }
    }
}

impl Serialize for NoteCategory {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.code())
    }
}

impl<'de> Deserialize<'de> for NoteCategory {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        i64::deserialize(deserializer).map(NoteCategory::from_code)
    }
}

/// Label rendered in front of a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteTag {
    Ban,
    Merit,
    Whitelist,
    Admin,
}

impl NoteTag {
    pub fn label(self) -> &'static str {
        match self {
            NoteTag::Ban => "[BAN]",
            NoteTag::Merit => "[MERIT]",
            NoteTag::Whitelist => "[WHITELIST]",
            NoteTag::Admin => "[ADMIN]",
        }
    }
}

/// Ban-linked notes are always tagged `[BAN]`, whatever their category.
pub fn note_tag(note: &Note) -> NoteTag {
    if note.is_ban {
        return NoteTag::Ban;
    }
    match note.note_category.unwrap_or_default() {
        NoteCategory::Merit => NoteTag::Merit,
        NoteCategory::Whitelist => NoteTag::Whitelist,
        NoteCategory::Admin | NoteCategory::Other(_) => NoteTag::Admin,
    }
}

/// Notes that should be displayed, in the order the backend sent them.
pub fn visible_notes(notes: &[Note]) -> impl Iterator<Item = &Note> {
    notes.iter().filter(|note| note.has_text())
}

/// Body of `POST /User/{id}/Note`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteSubmission {
    pub message: String,
    pub category: NoteCategory,
    pub confidential: bool,
}

impl NoteSubmission {
    pub fn form_fields(&self) -> [(&'static str, String); 3] {
        [
            ("Message", self.message.clone()),
            ("Category", self.category.code().to_string()),
            (
                "Confidential",
                if self.confidential { "true" } else { "false" }.to_string(),
            ),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComposerPhase {
    Editing,
    /// First submit press happened; the next one sends.
    Armed,
    Sending,
    Closed,
}

/// What a submit key press resulted in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitStep {
    Armed,
    Send(NoteSubmission),
    /// Empty message, or the composer is not accepting input.
    Ignored,
}

/// Compose state for adding a note to one player.
#[derive(Debug, Clone)]
pub struct NoteComposer {
    player_id: i64,
    ckey: String,
    message: String,
    confidential: bool,
    phase: ComposerPhase,
}

impl NoteComposer {
    pub fn new(player_id: i64, ckey: impl Into<String>) -> Self {
        Self {
            player_id,
            ckey: ckey.into(),
            message: String::new(),
            confidential: false,
            phase: ComposerPhase::Editing,
        }
    }

    pub fn player_id(&self) -> i64 {
        self.player_id
    }

    pub fn ckey(&self) -> &str {
        &self.ckey
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn confidential(&self) -> bool {
        self.confidential
    }

    pub fn phase(&self) -> ComposerPhase {
        self.phase
    }

    fn accepts_input(&self) -> bool {
        matches!(self.phase, ComposerPhase::Editing | ComposerPhase::Armed)
    }

    pub fn push_char(&mut self, c: char) {
        if self.accepts_input() {
            self.message.push(c);
        }
    }

    pub fn pop_char(&mut self) {
        if self.accepts_input() {
            self.message.pop();
        }
    }

    pub fn toggle_confidential(&mut self) {
        if self.accepts_input() {
            self.confidential = !self.confidential;
        }
    }

    pub fn press_submit(&mut self) -> SubmitStep {
        if self.message.trim().is_empty() {
            return SubmitStep::Ignored;
        }
        match self.phase {
            ComposerPhase::Editing => {
                self.phase = ComposerPhase::Armed;
                SubmitStep::Armed
            }
            ComposerPhase::Armed => {
                self.phase = ComposerPhase::Sending;
                SubmitStep::Send(NoteSubmission {
                    message: self.message.clone(),
                    category: NoteCategory::Admin,
                    confidential: self.confidential,
                })
            }
            ComposerPhase::Sending | ComposerPhase::Closed => SubmitStep::Ignored,
        }
    }

    /// Close the composer after the backend answered. Always closes; the
    /// returned text is the notification to show.
    pub fn finish(&mut self, outcome: &LookupResult<bool>) -> String {
        self.phase = ComposerPhase::Closed;
        submission_notice(&self.ckey, outcome)
    }

    pub fn cancel(&mut self) {
        self.phase = ComposerPhase::Closed;
    }

    pub fn is_closed(&self) -> bool {
        self.phase == ComposerPhase::Closed
    }
}

pub fn submission_notice(ckey: &str, outcome: &LookupResult<bool>) -> String {
    match outcome {
        Ok(true) => format!("Added note to {ckey}."),
        Ok(false) | Err(_) => "Failed to add note.".to_string(),
    }
}
