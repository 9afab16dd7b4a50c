//! Domain model for list entries.
//!
//! # Responsibility
//! - Define the item record rendered by every list view.
//! - Keep text validation and date display helpers next to the record.
//!
//! # Invariants
//! - Every item is identified by a stable, never-reused `ItemId`.
//! - Item text is non-blank and immutable after creation.

pub mod item;
