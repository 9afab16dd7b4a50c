//! Flutter-facing bindings for TaskDeck core.

pub mod api;
