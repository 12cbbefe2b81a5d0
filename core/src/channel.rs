//! Per-root request channel used by identity references to redirect the
//! lookup that encloses them.
//!
//! Every [`crate::lookup::LookupRoot`] gets its own [`RootId`]. Code that
//! renders an identity reference receives the channel of the nearest root by
//! reference and calls [`LookupChannel::pivot`]; it never fetches anything
//! itself. A nested root (a lookup opened inside a dialog) owns a different
//! id, so its requests can never reach the parent.

use std::fmt;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use tokio::sync::mpsc::UnboundedSender;

use crate::model::PlayerKey;

static NEXT_ROOT_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RootId(u64);

impl RootId {
    pub fn next() -> Self {
        RootId(NEXT_ROOT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for RootId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "root#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupRequest {
    /// Redirect the root to another identity.
    Pivot(PlayerKey),
    /// Re-resolve even if the same key is already loading.
    Reload(PlayerKey),
}

pub trait LookupChannel: Send + Sync {
    fn root(&self) -> RootId;

    fn send(&self, request: LookupRequest);

    fn pivot(&self, ckey: &str) {
        self.send(LookupRequest::Pivot(PlayerKey::ckey(ckey)));
    }

    fn reload(&self, ckey: &str) {
        self.send(LookupRequest::Reload(PlayerKey::ckey(ckey)));
    }
}

/// Pivot through `channel` if there is one. References rendered outside any
/// lookup root have nothing to redirect, so this is a no-op for `None`.
pub fn pivot_to(channel: Option<&dyn LookupChannel>, ckey: &str) {
    match channel {
        Some(channel) => channel.pivot(ckey),
        None => tracing::debug!("ignoring pivot to {ckey}: no enclosing lookup"),
    }
}

/// Channel backed by a tokio unbounded sender. Requests are tagged with the
/// root id so a single receiver can serve several roots.
#[derive(Debug, Clone)]
pub struct ChannelSender {
    root: RootId,
    tx: UnboundedSender<(RootId, LookupRequest)>,
}

impl ChannelSender {
    pub fn new(root: RootId, tx: UnboundedSender<(RootId, LookupRequest)>) -> Self {
        Self { root, tx }
    }
}

impl LookupChannel for ChannelSender {
    fn root(&self) -> RootId {
        self.root
    }

    fn send(&self, request: LookupRequest) {
        if let Err(e) = self.tx.send((self.root, request)) {
            tracing::error!("failed to send lookup request for {}: {e}", self.root);
        }
    }
}
