// Aggregates all former standalone integration tests as modules.
mod connections;
mod lookup;
mod notes;
mod resolve;
