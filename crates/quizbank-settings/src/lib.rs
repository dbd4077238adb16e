//! # quizbank-settings
//!
//! Layered configuration for the `quizbank` app.
//!
//! Settings are loaded from three layers (in priority order):
//! 1. **Compiled defaults**: [`QuizbankSettings::default()`]
//! 2. **User file**: `~/.quizbank/settings.json`, deep-merged over defaults
//! 3. **Environment variables**: `QUIZBANK_*` overrides (highest priority)
//!
//! The binary loads once at startup with [`load_settings`] and passes the
//! result to whatever needs it.

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{deep_merge, load_settings, load_settings_from_path, quizbank_dir, settings_path};
pub use types::*;
