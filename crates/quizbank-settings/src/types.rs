//! Settings type definitions.
//!
//! Field names are camelCase in JSON. Every struct is `#[serde(default)]`,
//! so a settings file only needs the keys it changes.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root settings for the `quizbank` app.
///
/// ```json
/// {
///   "database": { "path": "/data/quiz.db" },
///   "quiz": { "defaultQuestionAmount": 5 }
/// }
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QuizbankSettings {
    /// Settings schema version.
    pub version: String,
    /// Database location and connection tuning.
    pub database: DatabaseSettings,
    /// Log output.
    pub logging: LoggingSettings,
    /// Quiz defaults.
    pub quiz: QuizSettings,
}

impl Default for QuizbankSettings {
    fn default() -> Self {
        Self {
            version: "0.1.0".to_string(),
            database: DatabaseSettings::default(),
            logging: LoggingSettings::default(),
            quiz: QuizSettings::default(),
        }
    }
}

/// Database settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DatabaseSettings {
    /// Database file. `None` means `~/.quizbank/quiz.db`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    /// How long a locked database is retried before failing.
    pub busy_timeout_ms: u32,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            path: None,
            busy_timeout_ms: 5000,
        }
    }
}

/// Log level threshold.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Most verbose.
    Trace,
    /// Debug-level.
    Debug,
    /// Info-level.
    Info,
    /// Warning-level (default; keeps interactive output clean).
    #[default]
    Warn,
    /// Errors only.
    Error,
}

impl LogLevel {
    /// Convert to a tracing filter string.
    pub fn as_filter_str(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    /// Parse a level name, ignoring case.
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "trace" => Some(Self::Trace),
            "debug" => Some(Self::Debug),
            "info" => Some(Self::Info),
            "warn" | "warning" => Some(Self::Warn),
            "error" => Some(Self::Error),
            _ => None,
        }
    }
}

/// Logging settings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// Minimum level, unless `RUST_LOG` says otherwise.
    pub level: LogLevel,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

/// Quiz defaults.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QuizSettings {
    /// Questions per quiz when `--amount` is not given.
    pub default_question_amount: u32,
    /// Color for themes added without `--color`.
    pub default_theme_color: String,
}

impl Default for QuizSettings {
    fn default() -> Self {
        Self {
            default_question_amount: 10,
            default_theme_color: "#7C4DFF".to_string(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let s = QuizbankSettings::default();
        assert_eq!(s.database.path, None);
        assert_eq!(s.database.busy_timeout_ms, 5000);
        assert_eq!(s.logging.level, LogLevel::Warn);
        assert!(!s.logging.json);
        assert_eq!(s.quiz.default_question_amount, 10);
        assert_eq!(s.quiz.default_theme_color, "#7C4DFF");
    }

    #[test]
    fn partial_json_fills_defaults() {
        let s: QuizbankSettings =
            serde_json::from_str(r#"{"quiz": {"defaultQuestionAmount": 3}}"#).unwrap();
        assert_eq!(s.quiz.default_question_amount, 3);
        assert_eq!(s.quiz.default_theme_color, "#7C4DFF");
        assert_eq!(s.database.busy_timeout_ms, 5000);
    }

    #[test]
    fn serializes_camel_case() {
        let json = serde_json::to_value(QuizbankSettings::default()).unwrap();
        assert_eq!(json["database"]["busyTimeoutMs"], 5000);
        assert_eq!(json["logging"]["level"], "warn");
        assert!(json["database"].get("path").is_none());
    }

    #[test]
    fn log_level_parse() {
        assert_eq!(LogLevel::parse("DEBUG"), Some(LogLevel::Debug));
        assert_eq!(LogLevel::parse("warning"), Some(LogLevel::Warn));
        assert_eq!(LogLevel::parse("loud"), None);
        assert_eq!(LogLevel::Info.as_filter_str(), "info");
    }
}
