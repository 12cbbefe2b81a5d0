//! Root of the `warden-core` library.
//!
//! Everything the console needs to resolve a player and compose the record
//! view lives here; the terminal frontend only renders and routes events.

// Prevent accidental direct writes to stdout/stderr in library code. All
// user-visible output must go through the TUI or the tracing stack.
#![deny(clippy::print_stdout, clippy::print_stderr)]

pub mod actions;
pub mod ban_state;
pub mod channel;
pub mod client;
pub mod config;
pub mod connections;
pub mod error;
pub mod lookup;
pub mod model;
pub mod notes;

pub use ban_state::BanDisplayState;
pub use channel::ChannelSender;
pub use channel::LookupChannel;
pub use channel::LookupRequest;
pub use channel::RootId;
pub use client::BackendClient;
pub use client::HttpBackend;
pub use client::Resolution;
pub use config::ConsoleConfig;
pub use connections::ConnectionQuery;
pub use error::LookupError;
pub use error::LookupResult;
pub use lookup::LookupRoot;
pub use lookup::LookupState;
pub use model::PlayerKey;
pub use model::PlayerRecord;
