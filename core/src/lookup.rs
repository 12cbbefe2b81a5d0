//! Lookup root: owns the active identity of one lookup and drives its
//! resolution state machine.
//!
//! ```text
//! Empty --submit--> Loading --found--> Found --pivot/reload--> Loading ...
//!                          \--not found--> NotFound (close handler, if any)
//!                          \--error------> Failed
//! ```
//!
//! Resolutions are dispatched through a [`ResolveLoader`] and come back as
//! [`ResolveCompletion`]s. Every resolution gets a fresh generation; only the
//! completion for the newest pending generation is applied, so a slow answer
//! for a key the operator already pivoted away from can never overwrite the
//! record on screen.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::channel::LookupRequest;
use crate::channel::RootId;
use crate::client::BackendClient;
use crate::client::Resolution;
use crate::error::LookupResult;
use crate::model::PlayerKey;
use crate::model::PlayerRecord;

pub const NOT_FOUND_NOTICE: &str = "Failed to find user.";

/// Starts the work for one resolution. Implementations must eventually feed
/// a [`ResolveCompletion`] back to the owning root unless the request's
/// token is cancelled.
pub type ResolveLoader = Arc<dyn Fn(ResolveRequest) + Send + Sync>;

/// Invoked when a resolution comes back empty, so the host (e.g. a dialog)
/// can close itself.
pub type CloseHandler = Box<dyn FnMut() + Send>;

/// Sink for transient operator notifications.
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str);
}

impl<F> Notifier for F
where
    F: Fn(&str) + Send + Sync,
{
    fn notify(&self, message: &str) {
        self(message)
    }
}

#[derive(Debug, Clone)]
pub struct ResolveRequest {
    pub root: RootId,
    pub generation: u64,
    pub key: PlayerKey,
    pub cancel: CancellationToken,
}

#[derive(Debug)]
pub struct ResolveCompletion {
    pub root: RootId,
    pub generation: u64,
    pub key: PlayerKey,
    pub result: LookupResult<Resolution>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LookupState {
    /// No key yet; the query form is shown.
    Empty,
    /// A resolution is in flight. `previous` keeps the last record on screen
    /// while a pivot or reload is pending.
    Loading {
        previous: Option<Arc<PlayerRecord>>,
    },
    Found(Arc<PlayerRecord>),
    NotFound,
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied,
    /// The completion belonged to another root or a superseded generation.
    Stale,
}

struct PendingResolve {
    generation: u64,
    key: PlayerKey,
    cancel: CancellationToken,
}

pub struct LookupRoot {
    id: RootId,
    state: LookupState,
    active_key: Option<PlayerKey>,
    pending: Option<PendingResolve>,
    next_generation: u64,
    loader: ResolveLoader,
    notifier: Arc<dyn Notifier>,
    on_close: Option<CloseHandler>,
    cancel: CancellationToken,
}

impl LookupRoot {
    pub fn new(id: RootId, loader: ResolveLoader, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            id,
            state: LookupState::Empty,
            active_key: None,
            pending: None,
            next_generation: 0,
            loader,
            notifier,
            on_close: None,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_close_handler(mut self, on_close: CloseHandler) -> Self {
        self.on_close = Some(on_close);
        self
    }

    /// Start loading immediately when constructed with a key; stay `Empty`
    /// otherwise.
    pub fn with_initial_key(mut self, key: Option<PlayerKey>) -> Self {
        if let Some(key) = key {
            self.begin(key, false);
        }
        self
    }

    pub fn id(&self) -> RootId {
        self.id
    }

    pub fn state(&self) -> &LookupState {
        &self.state
    }

    pub fn active_key(&self) -> Option<&PlayerKey> {
        self.active_key.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    /// Generation of the most recently started resolution.
    pub fn generation(&self) -> Option<u64> {
        self.next_generation.checked_sub(1)
    }

    /// Record to render: the resolved one, or the previous one while a
    /// reload is in flight.
    pub fn displayed_record(&self) -> Option<&Arc<PlayerRecord>> {
        match &self.state {
            LookupState::Found(record) => Some(record),
            LookupState::Loading { previous } => previous.as_ref(),
            LookupState::Empty | LookupState::NotFound | LookupState::Failed(_) => None,
        }
    }

    /// Query form submission. Returns whether a resolution was started.
    pub fn submit(&mut self, key: PlayerKey) -> bool {
        self.begin(key, false)
    }

    /// Redirect this root to another identity.
    pub fn pivot(&mut self, key: PlayerKey) -> bool {
        self.begin(key, false)
    }

    /// Re-resolve `key` even if an identical resolution is pending.
    pub fn reload(&mut self, key: PlayerKey) -> bool {
        self.begin(key, true)
    }

    /// Re-resolve the active key, if there is one.
    pub fn refresh(&mut self) -> bool {
        match self.active_key.clone() {
            Some(key) => self.begin(key, true),
            None => false,
        }
    }

    pub fn handle_request(&mut self, request: LookupRequest) -> bool {
        match request {
            LookupRequest::Pivot(key) => self.pivot(key),
            LookupRequest::Reload(key) => self.reload(key),
        }
    }

    fn begin(&mut self, key: PlayerKey, force: bool) -> bool {
        if !force
            && let Some(pending) = &self.pending
            && pending.key == key
        {
            tracing::debug!("{} already resolving {key}; ignoring", self.id);
            return false;
        }

        if let Some(superseded) = self.pending.take() {
            superseded.cancel.cancel();
        }

        let generation = self.next_generation;
        self.next_generation = self.next_generation.wrapping_add(1);
        let cancel = self.cancel.child_token();

        let previous = self.displayed_record().cloned();
        self.state = LookupState::Loading { previous };
        self.active_key = Some(key.clone());
        self.pending = Some(PendingResolve {
            generation,
            key: key.clone(),
            cancel: cancel.clone(),
        });

        tracing::info!("{} resolving {key} (generation {generation})", self.id);
        (self.loader)(ResolveRequest {
            root: self.id,
            generation,
            key,
            cancel,
        });
        true
    }

    pub fn apply(&mut self, completion: ResolveCompletion) -> ApplyOutcome {
        if completion.root != self.id {
            return ApplyOutcome::Stale;
        }
        let is_current = self
            .pending
            .as_ref()
            .is_some_and(|pending| pending.generation == completion.generation);
        if !is_current {
            tracing::debug!(
                "{} discarding stale resolution of {} (generation {})",
                self.id,
                completion.key,
                completion.generation
            );
            return ApplyOutcome::Stale;
        }
        self.pending = None;

        match completion.result {
            Ok(Resolution::Found(record)) => {
                self.state = LookupState::Found(Arc::from(record));
            }
            Ok(Resolution::NotFound) => {
                self.state = LookupState::NotFound;
                self.notifier.notify(NOT_FOUND_NOTICE);
                if let Some(on_close) = self.on_close.as_mut() {
                    on_close();
                }
            }
            Err(err) => {
                tracing::warn!("{} failed to resolve {}: {err}", self.id, completion.key);
                let summary = err.summary();
                self.notifier.notify(&format!("Lookup failed: {summary}"));
                self.state = LookupState::Failed(summary);
            }
        }
        ApplyOutcome::Applied
    }
}

impl Drop for LookupRoot {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Loader that resolves on the tokio runtime and hands each completion to
/// `on_complete`. Cancelled requests report nothing.
pub fn spawn_resolver<F>(client: Arc<dyn BackendClient>, on_complete: F) -> ResolveLoader
where
    F: Fn(ResolveCompletion) + Send + Sync + 'static,
{
    let on_complete = Arc::new(on_complete);
    Arc::new(move |request: ResolveRequest| {
        let client = Arc::clone(&client);
        let on_complete = Arc::clone(&on_complete);
        tokio::spawn(async move {
            let ResolveRequest {
                root,
                generation,
                key,
                cancel,
            } = request;
            let result = tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::debug!("{root} resolution of {key} cancelled");
                    return;
                }
                result = client.resolve(&key) => result,
            };
            on_complete(ResolveCompletion {
                root,
                generation,
                key,
                result,
            });
        });
    })
}
