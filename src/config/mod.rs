// src/config/mod.rs

//! Configuration loading for arkforge.
//!
//! Responsibilities:
//! - Define the YAML-backed data model (`model.rs`).
//! - Load `forge.yaml`, falling back to legacy settings (`loader.rs`,
//!   `legacy.rs`).
//! - Normalise and validate values (`validate.rs`).

pub mod legacy;
pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load, load_from_path, load_with_legacy, persist};
pub use model::{BuildConfig, Config, FleetDevice, RawConfig, ThemeConfig};
pub use validate::validate_config;
