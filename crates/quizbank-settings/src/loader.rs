//! Settings loading with deep merge and environment variable overrides.
//!
//! Loading flow:
//! 1. Start with compiled [`QuizbankSettings::default()`]
//! 2. If `~/.quizbank/settings.json` exists, deep-merge its values over the defaults
//! 3. Apply `QUIZBANK_*` environment variable overrides (highest priority)
//! 4. Reject values that parse but make no sense

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::{Result, SettingsError};
use crate::types::{LogLevel, QuizbankSettings};

/// Application directory (`~/.quizbank`).
pub fn quizbank_dir() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".quizbank")
}

/// Resolve the path to the settings file (`~/.quizbank/settings.json`).
pub fn settings_path() -> PathBuf {
    quizbank_dir().join("settings.json")
}

/// Load settings from the default path with env var overrides.
pub fn load_settings() -> Result<QuizbankSettings> {
    load_settings_from_path(&settings_path())
}

/// Load settings from a specific path with env var overrides.
///
/// A missing file yields defaults. Invalid JSON or out-of-range values are
/// errors.
pub fn load_settings_from_path(path: &Path) -> Result<QuizbankSettings> {
    let defaults = serde_json::to_value(QuizbankSettings::default())?;

    let merged = if path.exists() {
        debug!(?path, "loading settings from file");
        let content = std::fs::read_to_string(path)?;
        let user: Value = serde_json::from_str(&content)?;
        deep_merge(defaults, user)
    } else {
        debug!(?path, "settings file not found, using defaults");
        defaults
    };

    let mut settings: QuizbankSettings = serde_json::from_value(merged)?;
    apply_env_overrides(&mut settings);
    validate(&settings)?;
    Ok(settings)
}

/// Recursive deep merge of two JSON values.
///
/// - Objects are merged recursively (source overrides target per key)
/// - Arrays and primitives are replaced by source
/// - Null values in source are skipped
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut target_map), Value::Object(source_map)) => {
            for (key, source_val) in source_map {
                if source_val.is_null() {
                    continue;
                }
                let merged = match target_map.remove(&key) {
                    Some(target_val) => deep_merge(target_val, source_val),
                    None => source_val,
                };
                let _ = target_map.insert(key, merged);
            }
            Value::Object(target_map)
        }
        (_, source) => source,
    }
}

/// Apply environment variable overrides to loaded settings.
///
/// Invalid values are logged and ignored.
pub fn apply_env_overrides(settings: &mut QuizbankSettings) {
    if let Some(v) = read_env_string("QUIZBANK_DB_PATH") {
        settings.database.path = Some(PathBuf::from(v));
    }
    if let Some(v) = read_env_u32("QUIZBANK_BUSY_TIMEOUT_MS", 0, 600_000) {
        settings.database.busy_timeout_ms = v;
    }
    if let Some(v) = read_env_string("QUIZBANK_LOG_LEVEL") {
        match LogLevel::parse(&v) {
            Some(level) => settings.logging.level = level,
            None => warn!(key = "QUIZBANK_LOG_LEVEL", value = %v, "invalid log level env var, ignoring"),
        }
    }
    if let Some(v) = read_env_bool("QUIZBANK_LOG_JSON") {
        settings.logging.json = v;
    }
    if let Some(v) = read_env_u32("QUIZBANK_QUESTION_AMOUNT", 1, 1000) {
        settings.quiz.default_question_amount = v;
    }
    if let Some(v) = read_env_string("QUIZBANK_THEME_COLOR") {
        settings.quiz.default_theme_color = v;
    }
}

fn validate(settings: &QuizbankSettings) -> Result<()> {
    if settings.quiz.default_question_amount == 0 {
        return Err(SettingsError::InvalidValue(
            "quiz.defaultQuestionAmount must be at least 1".into(),
        ));
    }
    if settings.quiz.default_theme_color.trim().is_empty() {
        return Err(SettingsError::InvalidValue(
            "quiz.defaultThemeColor must not be empty".into(),
        ));
    }
    Ok(())
}

// ── Pure parsing functions (testable without env vars) ──────────────────────

/// Parse a string as a boolean.
///
/// Accepts (case-insensitive): `true`/`1`/`yes`/`on` or `false`/`0`/`no`/`off`.
pub fn parse_bool(val: &str) -> Option<bool> {
    match val.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parse a string as a `u32` within an inclusive range.
pub fn parse_u32_range(val: &str, min: u32, max: u32) -> Option<u32> {
    let n: u32 = val.trim().parse().ok()?;
    (min..=max).contains(&n).then_some(n)
}

// ── Env var readers ─────────────────────────────────────────────────────────

fn read_env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn read_env_bool(name: &str) -> Option<bool> {
    let val = std::env::var(name).ok()?;
    let result = parse_bool(&val);
    if result.is_none() {
        warn!(key = name, value = %val, "invalid boolean env var, ignoring");
    }
    result
}

fn read_env_u32(name: &str, min: u32, max: u32) -> Option<u32> {
    let val = std::env::var(name).ok()?;
    let result = parse_u32_range(&val, min, max);
    if result.is_none() {
        warn!(key = name, value = %val, "invalid u32 env var, ignoring");
    }
    result
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ── deep_merge ──────────────────────────────────────────────────

    #[test]
    fn merge_nested_override() {
        let target = serde_json::json!({"database": {"path": null, "busyTimeoutMs": 5000}});
        let source = serde_json::json!({"database": {"busyTimeoutMs": 100}});
        let merged = deep_merge(target, source);
        assert_eq!(merged["database"]["busyTimeoutMs"], 100);
        assert!(merged["database"]["path"].is_null());
    }

    #[test]
    fn merge_skips_null_source() {
        let target = serde_json::json!({"quiz": {"defaultThemeColor": "#111111"}});
        let source = serde_json::json!({"quiz": {"defaultThemeColor": null}});
        let merged = deep_merge(target, source);
        assert_eq!(merged["quiz"]["defaultThemeColor"], "#111111");
    }

    #[test]
    fn merge_replaces_primitives_and_adds_keys() {
        let merged = deep_merge(serde_json::json!({"a": 1}), serde_json::json!({"a": [1, 2], "b": true}));
        assert_eq!(merged["a"], serde_json::json!([1, 2]));
        assert_eq!(merged["b"], true);
    }

    // ── load_settings_from_path ─────────────────────────────────────

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = load_settings_from_path(&dir.path().join("absent.json")).unwrap();
        assert_eq!(settings.quiz, QuizbankSettings::default().quiz);
    }

    #[test]
    fn file_values_merge_over_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(
            &path,
            r#"{"database": {"path": "/srv/quiz.db"}, "logging": {"json": true}}"#,
        )
        .unwrap();

        let settings = load_settings_from_path(&path).unwrap();
        assert_eq!(settings.database.path, Some(PathBuf::from("/srv/quiz.db")));
        assert_eq!(settings.database.busy_timeout_ms, 5000);
        assert!(settings.logging.json);
        assert_eq!(settings.quiz.default_question_amount, 10);
    }

    #[test]
    fn invalid_json_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(load_settings_from_path(&path), Err(SettingsError::Json(_))));
    }

    #[test]
    fn zero_question_amount_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"quiz": {"defaultQuestionAmount": 0}}"#).unwrap();
        assert!(matches!(
            load_settings_from_path(&path),
            Err(SettingsError::InvalidValue(_))
        ));
    }

    // ── parsing ─────────────────────────────────────────────────────

    #[test]
    fn parse_bool_variants() {
        for v in ["true", "1", "YES", "on"] {
            assert_eq!(parse_bool(v), Some(true), "{v}");
        }
        for v in ["false", "0", "no", "Off"] {
            assert_eq!(parse_bool(v), Some(false), "{v}");
        }
        assert_eq!(parse_bool("maybe"), None);
    }

    #[test]
    fn parse_u32_range_bounds() {
        assert_eq!(parse_u32_range("5", 1, 10), Some(5));
        assert_eq!(parse_u32_range(" 10 ", 1, 10), Some(10));
        assert_eq!(parse_u32_range("0", 1, 10), None);
        assert_eq!(parse_u32_range("11", 1, 10), None);
        assert_eq!(parse_u32_range("-1", 0, 10), None);
        assert_eq!(parse_u32_range("abc", 0, 10), None);
    }

    #[test]
    fn settings_path_under_quizbank_dir() {
        let path = settings_path();
        assert!(path.ends_with(".quizbank/settings.json"));
        assert_eq!(path.parent(), Some(quizbank_dir().as_path()));
    }
}
