//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `taskdeck_core` linkage.
//! - Walk one scripted list session and print the resolved configuration.
//!
//! Environment:
//! - `TASKDECK_LOG_DIR` / `TASKDECK_LOG_LEVEL`: enable file logging.
//! - `TASKDECK_RUNTIME_CONFIG`: JSON object used as the runtime tier.
//! - `TASKDECK_DEPLOY_*`: deploy tier entries.

use log::warn;
use serde_json::Value;
use taskdeck_core::{
    default_log_level, init_logging, ConfigResolver, ListSnapshot, ListStore,
    RuntimeConfigProvider,
};

const LOG_DIR_ENV: &str = "TASKDECK_LOG_DIR";
const LOG_LEVEL_ENV: &str = "TASKDECK_LOG_LEVEL";
const RUNTIME_CONFIG_ENV: &str = "TASKDECK_RUNTIME_CONFIG";

/// Runtime tier read from one environment variable holding JSON text.
struct EnvJsonProvider {
    var: &'static str,
}

impl RuntimeConfigProvider for EnvJsonProvider {
    fn runtime_config(&self) -> Option<Value> {
        let raw = std::env::var(self.var).ok()?;
        match serde_json::from_str(raw.trim()) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(
                    "event=runtime_config_read module=cli status=rejected var={} error={err}",
                    self.var
                );
                None
            }
        }
    }
}

fn main() {
    // Why: exercise store and resolver wiring without the Flutter/FFI host.
    println!("taskdeck_core ping={}", taskdeck_core::ping());
    println!("taskdeck_core version={}", taskdeck_core::core_version());

    if let Ok(log_dir) = std::env::var(LOG_DIR_ENV) {
        let level =
            std::env::var(LOG_LEVEL_ENV).unwrap_or_else(|_| default_log_level().to_string());
        if let Err(err) = init_logging(&level, &log_dir) {
            eprintln!("logging disabled: {err}");
        }
    }

    let mut store = ListStore::new();
    // Why: render through the subscription, the same path a UI host uses.
    store.subscribe(print_list);
    let first = store.add("Buy milk")[0].id();
    store.toggle(first);
    store.add("Walk dog");
    store.delete(first);
    println!("remaining={}", store.remaining_count());

    let mut resolver = ConfigResolver::from_environment();
    resolver.initialize(&EnvJsonProvider {
        var: RUNTIME_CONFIG_ENV,
    });
    resolver.log_snapshot();
    print!("{}", resolver.diagnostic_report());
}

fn print_list(snapshot: &ListSnapshot) {
    let rendered = snapshot
        .iter()
        .map(|item| {
            let mark = if item.completed() { 'x' } else { ' ' };
            format!("[{mark}] {}", item.text())
        })
        .collect::<Vec<_>>();
    println!("list: {}", rendered.join(" | "));
}
