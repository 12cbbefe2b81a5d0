use crossterm::event::Event as TerminalEvent;
use warden_core::LookupResult;
use warden_core::RootId;
use warden_core::lookup::ResolveCompletion;
use warden_core::model::ConnectionView;
use warden_core::model::Note;

use crate::overlays::OverlayId;

#[derive(Debug)]
pub(crate) enum AppEvent {
    Terminal(TerminalEvent),

    /// A lookup root's resolution finished.
    Resolved(ResolveCompletion),

    /// Result of background work started by an overlay.
    Overlay {
        overlay: OverlayId,
        event: OverlayEvent,
    },

    /// A nested lookup asked its host dialog to close.
    CloseRoot(RootId),

    Toast(String),

    Exit,
}

#[derive(Debug)]
pub(crate) enum OverlayEvent {
    ConnectionsLoaded(LookupResult<ConnectionView>),
    AppliedNotesLoaded(LookupResult<Vec<Note>>),
    NoteSubmitted(LookupResult<bool>),
}
