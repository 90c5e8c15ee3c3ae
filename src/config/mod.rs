// src/config/mod.rs

//! Plan-file loading and validation for the `taskweave` binary.
//!
//! - [`model`] is the TOML-backed data model.
//! - [`loader`] reads a plan file from disk.
//! - [`validate`] checks task references and rule settings.
//! - [`build`] turns a validated plan into a [`Scheduler`](crate::scheduler::Scheduler).

pub mod build;
pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path};
pub use model::{
    ConfigFile, DependencyRuleConfig, RawConfigFile, RuleConfig, RuleSettingsConfig,
    SortRuleConfig, TaskConfig,
};
pub use validate::validate_raw_config;
