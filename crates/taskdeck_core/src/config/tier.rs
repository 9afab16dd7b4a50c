//! Static configuration tiers.
//!
//! # Responsibility
//! - Provide the key/value container shared by all tiers.
//! - Materialize the build tier from compile-time values and the deploy tier
//!   from the process environment.
//!
//! # Invariants
//! - An absent key means "undefined"; JSON `null` is a present value.
//! - Tier contents never change after construction.
//! - Keys use one camelCase convention in every tier (`apiUrl`,
//!   `repoSecret`), so the same setting collides across tiers.

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

/// Prefix for deploy-time variables read from the process environment.
pub const DEPLOY_ENV_PREFIX: &str = "TASKDECK_DEPLOY_";

/// Configuration provenance, ordered from lowest to highest precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TierKind {
    /// Fixed when the binary was compiled.
    Build,
    /// Fixed when the process was deployed/started.
    Deploy,
    /// Delivered after start by an external provider.
    Runtime,
}

impl TierKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Build => "build",
            Self::Deploy => "deploy",
            Self::Runtime => "runtime",
        }
    }
}

impl Display for TierKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One tier's key/value mapping.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ConfigTier {
    values: BTreeMap<String, Value>,
}

impl ConfigTier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns this tier with `key` set to `value`.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Returns this tier with `key` set only when `value` is defined.
    pub fn with_opt(self, key: impl Into<String>, value: Option<impl Into<Value>>) -> Self {
        match value {
            Some(value) => self.with(key, value),
            None => self,
        }
    }

    /// Builds a tier from a JSON object. Non-object values yield `None`.
    pub fn from_json_object(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self::from(map)),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Iterates entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl From<Map<String, Value>> for ConfigTier {
    fn from(map: Map<String, Value>) -> Self {
        Self {
            values: map.into_iter().collect(),
        }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for ConfigTier {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

/// Returns the tier baked in at compile time.
///
/// Each key is present only when its variable was set for the build.
pub fn build_tier() -> ConfigTier {
    ConfigTier::new()
        .with_opt("environment", option_env!("TASKDECK_ENVIRONMENT"))
        .with_opt("repoSecret", option_env!("TASKDECK_REPO_SECRET"))
        .with_opt("repoVariable", option_env!("TASKDECK_REPO_VARIABLE"))
        .with_opt("version", option_env!("TASKDECK_VERSION"))
        .with_opt("publicUrl", option_env!("TASKDECK_PUBLIC_URL"))
}

/// Builds a deploy tier from `(name, value)` pairs.
///
/// Only names starting with `prefix` are kept; the key is the remainder
/// converted to camelCase (`API_URL` -> `apiUrl`). Names with no usable
/// remainder are ignored.
pub fn deploy_tier_from_vars<I, K, V>(prefix: &str, vars: I) -> ConfigTier
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Into<String>,
{
    vars.into_iter()
        .filter_map(|(name, value)| {
            let suffix = name.as_ref().strip_prefix(prefix)?;
            let key = env_suffix_to_key(suffix)?;
            Some((key, Value::String(value.into())))
        })
        .collect()
}

/// Converts a `SCREAMING_SNAKE` name segment into a camelCase key.
///
/// Returns `None` when no word remains after splitting on `_`.
pub fn env_suffix_to_key(suffix: &str) -> Option<String> {
    let mut words = suffix.split('_').filter(|word| !word.is_empty());
    let mut key = words.next()?.to_ascii_lowercase();
    for word in words {
        let lowered = word.to_ascii_lowercase();
        let mut chars = lowered.chars();
        if let Some(first) = chars.next() {
            key.push(first.to_ascii_uppercase());
            key.push_str(chars.as_str());
        }
    }
    Some(key)
}

/// Reads the deploy tier from the current process environment.
pub fn deploy_tier_from_env() -> ConfigTier {
    deploy_tier_from_vars(DEPLOY_ENV_PREFIX, std::env::vars())
}
