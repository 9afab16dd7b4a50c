//! In-memory list state.
//!
//! # Responsibility
//! - Own the ordered item sequence for one session.
//! - Publish immutable snapshots to the presentation layer.
//!
//! # Invariants
//! - Store operations never fail; unknown ids and blank text are no-ops.
//! - State is transient and never persisted.

pub mod list_store;
