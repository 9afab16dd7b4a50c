//! Item domain model.
//!
//! # Responsibility
//! - Define the canonical list entry shared by store and UI projections.
//! - Provide text validation used before an item is created.
//!
//! # Invariants
//! - `id` is never nil and never reused for another item.
//! - `text` is non-blank; only `completed` changes after creation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

/// Stable identifier for one list item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(Uuid);

impl ItemId {
    /// Generates a fresh random (v4) identifier.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wraps an existing UUID. Used by id sources and import paths.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }
}

impl Display for ItemId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for ItemId {
    type Err = uuid::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(value.trim()).map(Self)
    }
}

/// One list entry.
///
/// Fields are read-only outside the crate; the store is the only writer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ItemWire")]
pub struct Item {
    id: ItemId,
    text: String,
    completed: bool,
    /// Unix epoch milliseconds at creation.
    created_at_ms: i64,
}

impl Item {
    /// Creates an open (not completed) item with the current timestamp.
    ///
    /// `text` is stored trimmed.
    ///
    /// # Errors
    /// - `NilId` when `id` is the nil UUID.
    /// - `BlankText` when `text` is empty after trimming.
    pub fn new(id: ItemId, text: &str) -> Result<Self, ItemValidationError> {
        Self::with_created_at(id, text, Utc::now().timestamp_millis())
    }

    /// Creates an open item with a caller-provided creation timestamp.
    pub fn with_created_at(
        id: ItemId,
        text: &str,
        created_at_ms: i64,
    ) -> Result<Self, ItemValidationError> {
        let item = Self {
            id,
            text: text.trim().to_string(),
            completed: false,
            created_at_ms,
        };
        item.validate()?;
        Ok(item)
    }

    /// Checks record-level invariants.
    pub fn validate(&self) -> Result<(), ItemValidationError> {
        if self.id.is_nil() {
            return Err(ItemValidationError::NilId);
        }
        if !validate_item_text(Some(self.text.as_str())) {
            return Err(ItemValidationError::BlankText);
        }
        Ok(())
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn completed(&self) -> bool {
        self.completed
    }

    pub fn created_at_ms(&self) -> i64 {
        self.created_at_ms
    }

    /// Returns this item with `completed` inverted.
    pub(crate) fn toggled(&self) -> Self {
        Self {
            completed: !self.completed,
            ..self.clone()
        }
    }
}

/// Returns whether raw input is acceptable item text.
///
/// `None` models a missing value from the UI layer and is rejected, as is
/// any string that is empty after trimming.
pub fn validate_item_text(text: Option<&str>) -> bool {
    matches!(text, Some(value) if !value.trim().is_empty())
}

/// Formats epoch milliseconds as `M/D/YYYY` (UTC).
///
/// Returns `None` when the timestamp is outside the representable range.
pub fn format_date(epoch_ms: i64) -> Option<String> {
    DateTime::<Utc>::from_timestamp_millis(epoch_ms)
        .map(|moment| moment.format("%-m/%-d/%Y").to_string())
}

/// Item invariant violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemValidationError {
    NilId,
    BlankText,
}

impl Display for ItemValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilId => write!(f, "item id must not be nil"),
            Self::BlankText => write!(f, "item text must not be blank"),
        }
    }
}

impl Error for ItemValidationError {}

#[derive(Deserialize)]
struct ItemWire {
    id: ItemId,
    text: String,
    completed: bool,
    created_at_ms: i64,
}

impl TryFrom<ItemWire> for Item {
    type Error = ItemValidationError;

    fn try_from(wire: ItemWire) -> Result<Self, Self::Error> {
        // Decoded text is kept as sent; only validity is checked.
        let item = Self {
            id: wire.id,
            text: wire.text,
            completed: wire.completed,
            created_at_ms: wire.created_at_ms,
        };
        item.validate()?;
        Ok(item)
    }
}
