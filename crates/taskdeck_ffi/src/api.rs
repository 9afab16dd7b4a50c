//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose list actions and configuration state to Dart via FRB.
//! - Hold the single list store and config resolver of the process.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Every list call returns the full current item sequence for re-render.
//! - Sensitive configuration values never cross the boundary in clear text.

use log::warn;
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};
use taskdeck_core::{
    core_version as core_version_inner, format_date, init_logging as init_logging_inner,
    is_sensitive_key, ping as ping_inner, ConfigResolver, EffectiveConfig, Item, ItemId,
    ListSnapshot, ListStore, NoRuntimeProvider,
};

const REDACTED: &str = "<redacted>";

static LIST_STORE: OnceLock<Mutex<ListStore>> = OnceLock::new();
static CONFIG_RESOLVER: OnceLock<Mutex<ConfigResolver>> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// One rendered list row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemView {
    /// Stable item ID in string form.
    pub id: String,
    pub text: String,
    pub completed: bool,
    /// Creation date as `M/D/YYYY`, empty when not representable.
    pub created_label: String,
}

/// List state envelope returned by every list call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListResponse {
    /// Whether the call changed the list.
    pub changed: bool,
    /// Full item sequence in display order.
    pub items: Vec<ItemView>,
    /// Count of items not yet completed.
    pub remaining: u32,
    /// Human-readable outcome for diagnostics/UI.
    pub message: String,
}

/// Returns the current list without changing it.
#[flutter_rust_bridge::frb(sync)]
pub fn list_items() -> ListResponse {
    let store = lock(list_store());
    to_list_response(&store.snapshot(), false, "OK.")
}

/// Adds an item from the text field; blank input is ignored.
#[flutter_rust_bridge::frb(sync)]
pub fn list_add(text: String) -> ListResponse {
    let mut store = lock(list_store());
    let before = store.len();
    let snapshot = store.add(text.as_str());
    if snapshot.len() == before {
        return to_list_response(&snapshot, false, "Nothing to add.");
    }
    to_list_response(&snapshot, true, "Item added.")
}

/// Flips completion of the item with `id`.
///
/// Unknown or malformed ids leave the list unchanged.
#[flutter_rust_bridge::frb(sync)]
pub fn list_toggle(id: String) -> ListResponse {
    let mut store = lock(list_store());
    let Some(item_id) = find_id(&store, id.as_str()) else {
        return to_list_response(&store.snapshot(), false, "No matching item.");
    };
    let snapshot = store.toggle(item_id);
    to_list_response(&snapshot, true, "Item toggled.")
}

/// Removes the item with `id`.
///
/// Unknown or malformed ids leave the list unchanged.
#[flutter_rust_bridge::frb(sync)]
pub fn list_delete(id: String) -> ListResponse {
    let mut store = lock(list_store());
    let Some(item_id) = find_id(&store, id.as_str()) else {
        return to_list_response(&store.snapshot(), false, "No matching item.");
    };
    let snapshot = store.delete(item_id);
    to_list_response(&snapshot, true, "Item deleted.")
}

/// One resolved configuration key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigEntryView {
    pub key: String,
    /// JSON-encoded value, or `<redacted>` for sensitive keys.
    pub value: String,
    /// Winning tier (`build|deploy|runtime`).
    pub source: String,
}

/// Effective configuration envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigResponse {
    /// Whether the last call was accepted.
    pub ok: bool,
    pub entries: Vec<ConfigEntryView>,
    /// True until the runtime tier has been delivered.
    pub runtime_pending: bool,
    pub message: String,
}

/// Returns the current effective configuration.
#[flutter_rust_bridge::frb(sync)]
pub fn config_snapshot() -> ConfigResponse {
    let resolver = lock(config_resolver());
    to_config_response(resolver.effective(), true, pending_message(resolver.effective()))
}

/// Delivers the runtime tier as JSON object text.
///
/// # FFI contract
/// - Accepted at most once per process.
/// - Malformed or non-object input is rejected and the runtime tier stays
///   pending.
#[flutter_rust_bridge::frb(sync)]
pub fn config_deliver_runtime(json: String) -> ConfigResponse {
    let mut resolver = lock(config_resolver());
    let outcome = resolver.on_runtime_json(json.as_str()).map(|_| ());
    match outcome {
        Ok(()) => {
            resolver.log_snapshot();
            to_config_response(resolver.effective(), true, "Runtime config applied.".into())
        }
        Err(err) => {
            warn!("event=ffi_config_deliver module=ffi status=rejected error={err}");
            to_config_response(
                resolver.effective(),
                false,
                format!("config_deliver_runtime rejected: {err}"),
            )
        }
    }
}

/// Returns the redacted multi-line config report.
#[flutter_rust_bridge::frb(sync)]
pub fn config_diagnostics() -> String {
    lock(config_resolver()).diagnostic_report()
}

fn list_store() -> &'static Mutex<ListStore> {
    LIST_STORE.get_or_init(|| Mutex::new(ListStore::new()))
}

fn config_resolver() -> &'static Mutex<ConfigResolver> {
    CONFIG_RESOLVER.get_or_init(|| {
        let mut resolver = ConfigResolver::from_environment();
        resolver.initialize(&NoRuntimeProvider);
        resolver.log_snapshot();
        Mutex::new(resolver)
    })
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // Mutations publish whole snapshots, so a poisoned guard is still consistent.
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn find_id(store: &ListStore, raw: &str) -> Option<ItemId> {
    let id = raw.parse::<ItemId>().ok()?;
    store.get(id).map(Item::id)
}

fn to_list_response(snapshot: &ListSnapshot, changed: bool, message: &str) -> ListResponse {
    let items = snapshot
        .iter()
        .map(|item| to_item_view(item))
        .collect::<Vec<_>>();
    let remaining = items.iter().filter(|item| !item.completed).count();
    ListResponse {
        changed,
        items,
        remaining: u32::try_from(remaining).unwrap_or(u32::MAX),
        message: message.to_string(),
    }
}

fn to_item_view(item: &Item) -> ItemView {
    ItemView {
        id: item.id().to_string(),
        text: item.text().to_string(),
        completed: item.completed(),
        created_label: format_date(item.created_at_ms()).unwrap_or_default(),
    }
}

fn to_config_response(effective: &EffectiveConfig, ok: bool, message: String) -> ConfigResponse {
    let entries = effective
        .entries()
        .map(|(key, entry)| ConfigEntryView {
            key: key.to_string(),
            value: if is_sensitive_key(key) {
                REDACTED.to_string()
            } else {
                entry.value.to_string()
            },
            source: entry.source.to_string(),
        })
        .collect();
    ConfigResponse {
        ok,
        entries,
        runtime_pending: effective.is_pending(),
        message,
    }
}

fn pending_message(effective: &EffectiveConfig) -> String {
    if effective.is_pending() {
        "No runtime config available yet.".to_string()
    } else {
        format!("Resolved {} key(s).", effective.len())
    }
}

#[cfg(test)]
mod tests {
    use super::{
        config_deliver_runtime, config_diagnostics, config_snapshot, core_version, init_logging,
        list_add, list_delete, list_items, list_toggle, ping,
    };

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_empty_log_dir() {
        let error = init_logging("info".to_string(), String::new());
        assert!(!error.is_empty());
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        let error = init_logging("verbose".to_string(), "tmp/logs".to_string());
        assert!(error.contains("unsupported log level"));
    }

    #[test]
    fn list_add_toggle_delete_roundtrip() {
        let token = unique_token("ffi-list");
        let added = list_add(format!("  {token}  "));
        assert!(added.changed, "{}", added.message);
        let view = added
            .items
            .iter()
            .find(|item| item.text == token)
            .cloned()
            .expect("added item should be listed trimmed");
        assert!(!view.completed);
        assert!(!view.created_label.is_empty());

        let toggled = list_toggle(view.id.clone());
        assert!(toggled.changed);
        assert!(toggled
            .items
            .iter()
            .any(|item| item.id == view.id && item.completed));

        let deleted = list_delete(view.id.clone());
        assert!(deleted.changed);
        assert!(list_items().items.iter().all(|item| item.id != view.id));
    }

    #[test]
    fn list_add_ignores_blank_text() {
        let response = list_add("   ".to_string());
        assert!(!response.changed);
        assert_eq!(response.message, "Nothing to add.");
    }

    #[test]
    fn list_actions_ignore_unknown_and_malformed_ids() {
        for id in ["not-a-uuid", "", "11111111-2222-4333-8444-555555555555"] {
            let toggled = list_toggle(id.to_string());
            assert!(!toggled.changed);
            let deleted = list_delete(id.to_string());
            assert!(!deleted.changed);
            assert_eq!(deleted.message, "No matching item.");
        }
    }

    #[test]
    fn config_runtime_delivery_fails_closed_then_applies_once() {
        let rejected = config_deliver_runtime("[\"apiUrl\"]".to_string());
        assert!(!rejected.ok);
        assert!(rejected.runtime_pending);

        let malformed = config_deliver_runtime("window.APP_CONFIG = {}".to_string());
        assert!(!malformed.ok);
        assert!(malformed.message.contains("not valid JSON"));

        let applied = config_deliver_runtime(
            r#"{ "apiUrl": "https://api.myapp.com", "apiKey": "s3cr3t" }"#.to_string(),
        );
        assert!(applied.ok, "{}", applied.message);
        assert!(!applied.runtime_pending);
        let api_url = applied
            .entries
            .iter()
            .find(|entry| entry.key == "apiUrl")
            .expect("apiUrl resolved");
        assert_eq!(api_url.value, "\"https://api.myapp.com\"");
        assert_eq!(api_url.source, "runtime");
        let api_key = applied
            .entries
            .iter()
            .find(|entry| entry.key == "apiKey")
            .expect("apiKey resolved");
        assert_eq!(api_key.value, "<redacted>");

        let again = config_deliver_runtime(r#"{ "apiUrl": "other" }"#.to_string());
        assert!(!again.ok);
        assert!(again.message.contains("already delivered"));

        let snapshot = config_snapshot();
        assert!(!snapshot.runtime_pending);
        assert!(!config_diagnostics().contains("s3cr3t"));
    }

    fn unique_token(prefix: &str) -> String {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time went backwards")
            .as_nanos();
        format!("{prefix}-{nanos}")
    }
}
