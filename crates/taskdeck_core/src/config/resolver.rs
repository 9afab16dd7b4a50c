//! Tier merging and effective configuration.
//!
//! # Responsibility
//! - Merge build/deploy/runtime tiers per key with fixed precedence.
//! - Expose runtime availability (`Pending` vs `Resolved`) next to values.
//! - Keep the winning tier of every key for diagnostics.
//!
//! # Invariants
//! - `resolve` is pure: same inputs, same output, inputs untouched.
//! - Keys absent from every tier are absent from the result.
//! - `ConfigResolver` recomputes the whole result on every tier change.

use crate::config::runtime::{RuntimeConfigProvider, RuntimeTier, RuntimeTierError};
use crate::config::tier::{build_tier, deploy_tier_from_env, ConfigTier, TierKind};
use log::{debug, info, warn};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt::Write as _;

const REDACTED: &str = "<redacted>";
const SENSITIVE_KEY_MARKERS: &[&str] = &["secret", "token", "password"];

/// Whether the runtime tier has been delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeStatus {
    /// Runtime tier not delivered; values come from static tiers only and
    /// may still be overridden.
    Pending,
    /// Runtime tier delivered (possibly empty); values are final.
    Resolved,
}

/// One resolved key.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedEntry {
    pub value: Value,
    /// Tier that supplied `value`.
    pub source: TierKind,
}

/// Result of merging all tiers.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectiveConfig {
    entries: BTreeMap<String, ResolvedEntry>,
    runtime_status: RuntimeStatus,
}

impl EffectiveConfig {
    pub fn runtime_status(&self) -> RuntimeStatus {
        self.runtime_status
    }

    /// True while the runtime tier has not arrived.
    pub fn is_pending(&self) -> bool {
        self.runtime_status == RuntimeStatus::Pending
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key).map(|entry| &entry.value)
    }

    /// Returns the tier whose value won for `key`.
    pub fn provenance(&self, key: &str) -> Option<TierKind> {
        self.entries.get(key).map(|entry| entry.source)
    }

    pub fn entry(&self, key: &str) -> Option<&ResolvedEntry> {
        self.entries.get(key)
    }

    /// Iterates resolved entries in key order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &ResolvedEntry)> {
        self.entries.iter().map(|(key, entry)| (key.as_str(), entry))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Winning values as a plain JSON object.
    pub fn to_json(&self) -> Value {
        let map: Map<String, Value> = self
            .entries
            .iter()
            .map(|(key, entry)| (key.clone(), entry.value.clone()))
            .collect();
        Value::Object(map)
    }
}

/// Merges the three tiers; later tiers override earlier ones per key.
pub fn resolve(
    build: &ConfigTier,
    deploy: &ConfigTier,
    runtime: &RuntimeTier,
) -> EffectiveConfig {
    let mut entries = BTreeMap::<String, ResolvedEntry>::new();
    let layers = [
        (TierKind::Build, Some(build)),
        (TierKind::Deploy, Some(deploy)),
        (TierKind::Runtime, runtime.tier()),
    ];

    for (source, tier) in layers {
        let Some(tier) = tier else {
            continue;
        };
        for (key, value) in tier.iter() {
            entries.insert(
                key.to_string(),
                ResolvedEntry {
                    value: value.clone(),
                    source,
                },
            );
        }
    }

    let runtime_status = if runtime.is_resolved() {
        RuntimeStatus::Resolved
    } else {
        RuntimeStatus::Pending
    };

    EffectiveConfig {
        entries,
        runtime_status,
    }
}

/// Session holder for the three tiers and the current effective result.
#[derive(Debug, Clone)]
pub struct ConfigResolver {
    build: ConfigTier,
    deploy: ConfigTier,
    runtime: RuntimeTier,
    effective: EffectiveConfig,
}

impl ConfigResolver {
    /// Creates a resolver with static tiers and no runtime tier yet.
    pub fn new(build: ConfigTier, deploy: ConfigTier) -> Self {
        let runtime = RuntimeTier::Unresolved;
        let effective = resolve(&build, &deploy, &runtime);
        Self {
            build,
            deploy,
            runtime,
            effective,
        }
    }

    /// Creates a resolver from compile-time values and the process environment.
    pub fn from_environment() -> Self {
        Self::new(build_tier(), deploy_tier_from_env())
    }

    /// Polls `provider` once for the runtime tier.
    ///
    /// A provider with nothing to offer leaves the result pending. Rejected
    /// deliveries are logged and also leave it pending.
    pub fn initialize(&mut self, provider: &dyn RuntimeConfigProvider) -> &EffectiveConfig {
        if self.runtime.is_resolved() {
            return &self.effective;
        }
        match provider.runtime_config() {
            Some(value) => {
                if let Err(err) = self.on_runtime_delivered(value) {
                    warn!("event=config_init module=config status=degraded error={err}");
                }
            }
            None => {
                info!("event=config_init module=config status=pending reason=no_runtime_config");
            }
        }
        &self.effective
    }

    /// Applies an externally delivered runtime object.
    pub fn on_runtime_delivered(
        &mut self,
        value: Value,
    ) -> Result<&EffectiveConfig, RuntimeTierError> {
        self.runtime.deliver(value)?;
        self.recompute();
        Ok(&self.effective)
    }

    /// Applies an externally delivered runtime object in JSON text form.
    pub fn on_runtime_json(&mut self, text: &str) -> Result<&EffectiveConfig, RuntimeTierError> {
        self.runtime.deliver_json(text)?;
        self.recompute();
        Ok(&self.effective)
    }

    pub fn effective(&self) -> &EffectiveConfig {
        &self.effective
    }

    pub fn build_tier(&self) -> &ConfigTier {
        &self.build
    }

    pub fn deploy_tier(&self) -> &ConfigTier {
        &self.deploy
    }

    pub fn runtime_tier(&self) -> &RuntimeTier {
        &self.runtime
    }

    /// Renders every tier and the resolved table, with sensitive values redacted.
    pub fn diagnostic_report(&self) -> String {
        let mut out = String::new();
        write_tier(&mut out, TierKind::Build, Some(&self.build));
        write_tier(&mut out, TierKind::Deploy, Some(&self.deploy));
        write_tier(&mut out, TierKind::Runtime, self.runtime.tier());

        let status = match self.effective.runtime_status() {
            RuntimeStatus::Pending => "pending",
            RuntimeStatus::Resolved => "resolved",
        };
        let _ = writeln!(out, "[resolved] runtime={status}");
        for (key, entry) in self.effective.entries() {
            let _ = writeln!(
                out,
                "  {key} = {} ({})",
                display_value(key, &entry.value),
                entry.source
            );
        }
        out
    }

    /// Logs the diagnostic snapshot.
    pub fn log_snapshot(&self) {
        info!(
            "event=config_resolved module=config status={} keys={}",
            if self.effective.is_pending() {
                "pending"
            } else {
                "resolved"
            },
            self.effective.len()
        );
        debug!("config snapshot:\n{}", self.diagnostic_report());
    }

    fn recompute(&mut self) {
        self.effective = resolve(&self.build, &self.deploy, &self.runtime);
    }
}

/// Returns whether values under `key` must not be printed.
///
/// Matches `secret`, `token` or `password` anywhere, and `key` only as a
/// trailing word (`apiKey`, `api_key`, `API-KEY`, `key`).
pub fn is_sensitive_key(key: &str) -> bool {
    let lowered = key.to_ascii_lowercase();
    if SENSITIVE_KEY_MARKERS
        .iter()
        .any(|marker| lowered.contains(marker))
    {
        return true;
    }
    lowered == "key"
        || lowered.ends_with("_key")
        || lowered.ends_with("-key")
        || key.ends_with("Key")
}

fn display_value(key: &str, value: &Value) -> String {
    if is_sensitive_key(key) {
        REDACTED.to_string()
    } else {
        value.to_string()
    }
}

fn write_tier(out: &mut String, kind: TierKind, tier: Option<&ConfigTier>) {
    let Some(tier) = tier else {
        let _ = writeln!(out, "[{kind}] <not delivered>");
        return;
    };
    let _ = writeln!(out, "[{kind}] {} key(s)", tier.len());
    for (key, value) in tier.iter() {
        let _ = writeln!(out, "  {key} = {}", display_value(key, value));
    }
}

#[cfg(test)]
mod tests {
    use super::{is_sensitive_key, ConfigResolver};
    use crate::config::tier::ConfigTier;
    use serde_json::json;

    #[test]
    fn sensitive_keys_are_detected() {
        assert!(is_sensitive_key("repoSecret"));
        assert!(is_sensitive_key("apiKey"));
        assert!(is_sensitive_key("AUTH_TOKEN"));
        assert!(is_sensitive_key("api_key"));
        assert!(is_sensitive_key("DEPLOY-KEY"));
        assert!(is_sensitive_key("key"));
        assert!(!is_sensitive_key("apiUrl"));
        assert!(!is_sensitive_key("monkey"));
        assert!(!is_sensitive_key("hotkey"));
        assert!(!is_sensitive_key("keyboardLayout"));
        assert!(!is_sensitive_key("version"));
    }

    #[test]
    fn report_redacts_secrets_and_marks_pending_runtime() {
        let resolver = ConfigResolver::new(
            ConfigTier::new()
                .with("repoSecret", "hunter2")
                .with("version", "1.0.0"),
            ConfigTier::new(),
        );
        let report = resolver.diagnostic_report();
        assert!(!report.contains("hunter2"));
        assert!(report.contains("repoSecret = <redacted>"));
        assert!(report.contains("[runtime] <not delivered>"));
        assert!(report.contains("[resolved] runtime=pending"));
        assert!(report.contains("version = \"1.0.0\" (build)"));
    }

    #[test]
    fn report_shows_runtime_provenance_after_delivery() {
        let mut resolver = ConfigResolver::new(
            ConfigTier::new().with("environment", "development"),
            ConfigTier::new(),
        );
        resolver
            .on_runtime_delivered(json!({ "environment": "production" }))
            .unwrap();
        let report = resolver.diagnostic_report();
        assert!(report.contains("[resolved] runtime=resolved"));
        assert!(report.contains("environment = \"production\" (runtime)"));
    }
}
