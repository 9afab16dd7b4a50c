//! Core domain logic for TaskDeck.
//! This crate owns the list state machine and configuration resolution;
//! hosts only render what it returns.

pub mod config;
pub mod logging;
pub mod model;
pub mod store;

pub use config::resolver::{
    is_sensitive_key, resolve, ConfigResolver, EffectiveConfig, ResolvedEntry, RuntimeStatus,
};
pub use config::runtime::{
    NoRuntimeProvider, RuntimeConfigProvider, RuntimeTier, RuntimeTierError, StaticProvider,
};
pub use config::tier::{
    build_tier, deploy_tier_from_env, deploy_tier_from_vars, env_suffix_to_key, ConfigTier,
    TierKind, DEPLOY_ENV_PREFIX,
};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::item::{format_date, validate_item_text, Item, ItemId, ItemValidationError};
pub use store::list_store::{
    ItemIdSource, ListSnapshot, ListStore, RandomIdSource, SnapshotListener, SubscriptionId,
};

/// Minimal health-check API for host integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
