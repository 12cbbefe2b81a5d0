//! Fakes and render helpers shared by the unit tests in this crate.

#![allow(clippy::unwrap_used)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use ratatui::Terminal;
use ratatui::backend::TestBackend;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::mpsc::unbounded_channel;
use warden_core::BackendClient;
use warden_core::ChannelSender;
use warden_core::ConnectionQuery;
use warden_core::LookupRequest;
use warden_core::LookupResult;
use warden_core::LookupRoot;
use warden_core::PlayerKey;
use warden_core::PlayerRecord;
use warden_core::Resolution;
use warden_core::RootId;
use warden_core::lookup::ResolveCompletion;
use warden_core::lookup::ResolveRequest;
use warden_core::model::ConnectionView;
use warden_core::model::Note;
use warden_core::notes::NoteSubmission;

use crate::lookup_pane::LookupPane;

/// In-memory backend. Unknown keys resolve to `NotFound`; every call is
/// recorded.
#[derive(Default)]
pub(crate) struct FakeBackend {
    players: Mutex<HashMap<PlayerKey, PlayerRecord>>,
    applied_notes: Mutex<Vec<Note>>,
    resolve_calls: Mutex<Vec<PlayerKey>>,
    connection_calls: Mutex<Vec<(ConnectionQuery, String)>>,
    applied_notes_calls: Mutex<Vec<i64>>,
    submissions: Mutex<Vec<(i64, NoteSubmission)>>,
}

impl FakeBackend {
    pub(crate) fn with_player(self, record: PlayerRecord) -> Self {
        self.players.lock().unwrap().insert(record.key(), record);
        self
    }

    pub(crate) fn set_applied_notes(&self, notes: Vec<Note>) {
        *self.applied_notes.lock().unwrap() = notes;
    }

    pub(crate) fn resolve_calls(&self) -> Vec<PlayerKey> {
        self.resolve_calls.lock().unwrap().clone()
    }

    pub(crate) fn connection_calls(&self) -> Vec<(ConnectionQuery, String)> {
        self.connection_calls.lock().unwrap().clone()
    }

    pub(crate) fn applied_notes_calls(&self) -> Vec<i64> {
        self.applied_notes_calls.lock().unwrap().clone()
    }

    pub(crate) fn submissions(&self) -> Vec<(i64, NoteSubmission)> {
        self.submissions.lock().unwrap().clone()
    }
}

#[async_trait]
impl BackendClient for FakeBackend {
    async fn resolve(&self, key: &PlayerKey) -> LookupResult<Resolution> {
        self.resolve_calls.lock().unwrap().push(key.clone());
        Ok(match self.players.lock().unwrap().get(key) {
            Some(record) => Resolution::Found(Box::new(record.clone())),
            None => Resolution::NotFound,
        })
    }

    async fn connections(
        &self,
        query: ConnectionQuery,
        ckey: &str,
    ) -> LookupResult<ConnectionView> {
        self.connection_calls
            .lock()
            .unwrap()
            .push((query, ckey.to_string()));
        Ok(ConnectionView::default())
    }

    async fn applied_notes(&self, player_id: i64) -> LookupResult<Vec<Note>> {
        self.applied_notes_calls.lock().unwrap().push(player_id);
        Ok(self.applied_notes.lock().unwrap().clone())
    }

    async fn submit_note(
        &self,
        player_id: i64,
        submission: &NoteSubmission,
    ) -> LookupResult<bool> {
        self.submissions
            .lock()
            .unwrap()
            .push((player_id, submission.clone()));
        Ok(true)
    }
}

/// Render into a fresh buffer and return its rows, right-trimmed and joined
/// with newlines.
pub(crate) fn buffer_text(
    width: u16,
    height: u16,
    draw: impl FnOnce(Rect, &mut Buffer),
) -> String {
    let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
    terminal
        .draw(|f| {
            let area = f.area();
            draw(area, f.buffer_mut());
        })
        .unwrap();

    let buffer = terminal.backend().buffer();
    let mut rows = Vec::new();
    for y in 0..height {
        let mut row = String::new();
        for x in 0..width {
            row.push_str(buffer[(x, y)].symbol());
        }
        rows.push(row.trim_end().to_string());
    }
    rows.join("\n")
}

pub(crate) type RecordedLoads = Arc<Mutex<Vec<ResolveRequest>>>;

/// A pane whose loader only records requests, for driving completions by
/// hand.
pub(crate) fn recording_pane(
    initial: Option<PlayerKey>,
) -> (
    LookupPane,
    RecordedLoads,
    UnboundedReceiver<(RootId, LookupRequest)>,
) {
    let loads: RecordedLoads = Arc::default();
    let recorded = Arc::clone(&loads);
    let (lookup_tx, lookup_rx) = unbounded_channel();
    let id = RootId::next();
    let root = LookupRoot::new(
        id,
        Arc::new(move |request: ResolveRequest| recorded.lock().unwrap().push(request)),
        Arc::new(|_: &str| {}),
    )
    .with_initial_key(initial);
    let pane = LookupPane::new(root, ChannelSender::new(id, lookup_tx), true);
    (pane, loads, lookup_rx)
}

/// Drive `pane` to show `record` as if the backend had just returned it.
pub(crate) fn found(pane: &mut LookupPane, record: PlayerRecord) {
    let key = record.key();
    pane.handle_request(LookupRequest::Reload(key.clone()));
    let generation = pane.root().generation().unwrap();
    pane.apply(ResolveCompletion {
        root: pane.id(),
        generation,
        key,
        result: Ok(Resolution::Found(Box::new(record))),
    });
}
