//! Layered configuration resolution.
//!
//! # Responsibility
//! - Model the build, deploy and runtime configuration tiers.
//! - Merge tiers per key into one effective configuration.
//! - Report which tier won each key for diagnostics.
//!
//! # Invariants
//! - Resolution is pure and never mutates its inputs.
//! - Precedence is runtime > deploy > build.
//! - A missing runtime tier is a pending state, never an error.

pub mod resolver;
pub mod runtime;
pub mod tier;
