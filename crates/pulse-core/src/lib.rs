//! pulse-core — configuration and service definitions for pulsewatch.
//!
//! Parses the `pulsewatch.toml` configuration file into typed service
//! specs and resolves per-service threshold overrides against the
//! process-wide defaults. All durations are written as strings in the
//! `5s` / `500ms` / `2m` format.

pub mod config;
pub mod duration;

pub use config::{
    CheckDefaults, CheckPolicy, Config, ConfigError, ProbeKind, ServiceSpec, StatusPageConfig,
};
pub use duration::parse_duration;
