//! Runtime tier delivery.
//!
//! # Responsibility
//! - Track whether the runtime tier has arrived (`Unresolved` → `Resolved`).
//! - Accept the runtime mapping at most once and only when well formed.
//! - Define the provider seam that replaces ambient global lookups.
//!
//! # Invariants
//! - Malformed deliveries are treated as absent; nothing partial is kept.
//! - Once resolved, the tier never changes for the process lifetime.
//! - Staying `Unresolved` forever is valid.

use crate::config::tier::ConfigTier;
use log::{info, warn};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Runtime tier availability.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RuntimeTier {
    /// No delivery has been accepted yet.
    #[default]
    Unresolved,
    /// Runtime mapping delivered by the external signal.
    Resolved(ConfigTier),
}

impl RuntimeTier {
    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }

    /// Returns the delivered tier, if any.
    pub fn tier(&self) -> Option<&ConfigTier> {
        match self {
            Self::Unresolved => None,
            Self::Resolved(tier) => Some(tier),
        }
    }

    /// Accepts the runtime delivery.
    ///
    /// # Errors
    /// - `AlreadyResolved` when a delivery was accepted before; state is kept.
    /// - `NotAnObject` when `value` is not a JSON object; state stays
    ///   `Unresolved`.
    pub fn deliver(&mut self, value: Value) -> Result<(), RuntimeTierError> {
        if self.is_resolved() {
            warn!("event=runtime_config_delivery module=config status=rejected reason=already_resolved");
            return Err(RuntimeTierError::AlreadyResolved);
        }

        let kind = json_kind(&value);
        let Some(tier) = ConfigTier::from_json_object(value) else {
            warn!(
                "event=runtime_config_delivery module=config status=rejected reason=not_an_object kind={kind}"
            );
            return Err(RuntimeTierError::NotAnObject(kind));
        };

        info!(
            "event=runtime_config_delivery module=config status=ok keys={}",
            tier.len()
        );
        *self = Self::Resolved(tier);
        Ok(())
    }

    /// Parses `text` as JSON and delivers it.
    ///
    /// # Errors
    /// - `Malformed` when `text` is not valid JSON.
    /// - Any error from [`RuntimeTier::deliver`].
    pub fn deliver_json(&mut self, text: &str) -> Result<(), RuntimeTierError> {
        if self.is_resolved() {
            return Err(RuntimeTierError::AlreadyResolved);
        }
        let value = serde_json::from_str::<Value>(text).map_err(|err| {
            warn!("event=runtime_config_delivery module=config status=rejected reason=malformed");
            RuntimeTierError::Malformed(err.to_string())
        })?;
        self.deliver(value)
    }
}

/// External source of the runtime tier.
///
/// Stands in for globally injected configuration so resolution can be tested
/// without touching the environment.
pub trait RuntimeConfigProvider {
    /// Returns the raw runtime object, or `None` when nothing is available yet.
    fn runtime_config(&self) -> Option<Value>;
}

/// Provider that never has a runtime tier (development/test sessions).
#[derive(Debug, Default, Clone, Copy)]
pub struct NoRuntimeProvider;

impl RuntimeConfigProvider for NoRuntimeProvider {
    fn runtime_config(&self) -> Option<Value> {
        None
    }
}

/// Provider returning one fixed value.
#[derive(Debug, Clone)]
pub struct StaticProvider {
    value: Value,
}

impl StaticProvider {
    pub fn new(value: Value) -> Self {
        Self { value }
    }
}

impl RuntimeConfigProvider for StaticProvider {
    fn runtime_config(&self) -> Option<Value> {
        Some(self.value.clone())
    }
}

/// Runtime delivery rejections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeTierError {
    /// A runtime tier was already accepted.
    AlreadyResolved,
    /// Delivered JSON is valid but not an object; carries the JSON kind.
    NotAnObject(&'static str),
    /// Delivered text is not valid JSON.
    Malformed(String),
}

impl Display for RuntimeTierError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AlreadyResolved => write!(f, "runtime config already delivered"),
            Self::NotAnObject(kind) => {
                write!(f, "runtime config must be a JSON object, got {kind}")
            }
            Self::Malformed(message) => write!(f, "runtime config is not valid JSON: {message}"),
        }
    }
}

impl Error for RuntimeTierError {}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
