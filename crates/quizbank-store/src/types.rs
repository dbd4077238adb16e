//! Public entity and input types.
//!
//! Entities mirror the persisted rows; input types (`New*`, `*Update`)
//! describe what callers submit. Field names serialize as camelCase.

use serde::{Deserialize, Serialize};

/// Color assigned to a theme created without one.
pub const DEFAULT_THEME_COLOR: &str = "#7C4DFF";

/// Every question has exactly this many alternatives.
pub const ALTERNATIVES_PER_QUESTION: usize = 4;

/// Theme row id.
pub type ThemeId = i64;
/// Question row id.
pub type QuestionId = i64;
/// Alternative row id.
pub type AlternativeId = i64;

/// A named category grouping questions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Theme {
    /// Theme ID.
    pub id: ThemeId,
    /// Display name, unique ignoring case.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Color tag (e.g. `#7C4DFF`).
    pub color: String,
    /// Creation timestamp (`YYYY-MM-DD HH:MM:SS`, UTC).
    pub created_at: String,
    /// Number of questions currently owned by the theme.
    pub question_count: i64,
}

/// Input for creating a theme.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTheme {
    /// Theme name. Trimmed before storage.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Color tag; [`DEFAULT_THEME_COLOR`] when absent or blank.
    pub color: Option<String>,
}

impl NewTheme {
    /// Theme with just a name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the color tag.
    #[must_use]
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }
}

/// Partial theme update. `None` leaves a field untouched.
///
/// `description` is doubly optional: `Some(None)` clears it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ThemeUpdate {
    /// New name.
    pub name: Option<String>,
    /// New description, or `Some(None)` to clear.
    pub description: Option<Option<String>>,
    /// New color tag.
    pub color: Option<String>,
}

impl ThemeUpdate {
    /// Whether no field was supplied.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.color.is_none()
    }
}

/// A question row without its alternatives.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    /// Question ID.
    pub id: QuestionId,
    /// Owning theme.
    pub theme_id: ThemeId,
    /// Question text.
    pub statement: String,
    /// Optional explanation shown after answering.
    pub explanation: Option<String>,
    /// Creation timestamp (`YYYY-MM-DD HH:MM:SS`, UTC).
    pub created_at: String,
}

/// One candidate answer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alternative {
    /// Alternative ID.
    pub id: AlternativeId,
    /// Owning question.
    pub question_id: QuestionId,
    /// Answer text.
    pub text: String,
    /// Whether this is the correct answer.
    pub is_correct: bool,
}

/// A question hydrated with its alternatives in insertion order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionWithAlternatives {
    /// The question row.
    #[serde(flatten)]
    pub question: Question,
    /// Its alternatives, ordered by id.
    pub alternatives: Vec<Alternative>,
}

impl QuestionWithAlternatives {
    /// Question ID shortcut.
    pub fn id(&self) -> QuestionId {
        self.question.id
    }

    /// The alternative flagged as correct.
    pub fn correct_alternative(&self) -> Option<&Alternative> {
        self.alternatives.iter().find(|a| a.is_correct)
    }

    /// Look up one of this question's alternatives.
    pub fn alternative(&self, id: AlternativeId) -> Option<&Alternative> {
        self.alternatives.iter().find(|a| a.id == id)
    }
}

/// Input for one alternative.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAlternative {
    /// Answer text. Trimmed before storage.
    pub text: String,
    /// Whether this is the correct answer.
    pub is_correct: bool,
}

impl NewAlternative {
    /// Alternative with an explicit flag.
    pub fn new(text: impl Into<String>, is_correct: bool) -> Self {
        Self {
            text: text.into(),
            is_correct,
        }
    }

    /// Build four alternatives from texts, marking `correct_index` as correct.
    ///
    /// No validation happens here; an out-of-range index simply yields no
    /// correct alternative and is rejected on write.
    pub fn from_texts<S: Into<String>>(
        texts: impl IntoIterator<Item = S>,
        correct_index: usize,
    ) -> Vec<Self> {
        texts
            .into_iter()
            .enumerate()
            .map(|(i, text)| Self::new(text, i == correct_index))
            .collect()
    }
}

/// Input for creating a question.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewQuestion {
    /// Owning theme.
    pub theme_id: ThemeId,
    /// Question text. Trimmed before storage.
    pub statement: String,
    /// Optional explanation.
    pub explanation: Option<String>,
    /// Exactly four alternatives, exactly one correct.
    pub alternatives: Vec<NewAlternative>,
}

/// Partial question update. `None` leaves a field untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QuestionUpdate {
    /// New statement.
    pub statement: Option<String>,
    /// New explanation, or `Some(None)` to clear.
    pub explanation: Option<Option<String>>,
    /// Replacement alternative set (replaces all existing alternatives).
    pub alternatives: Option<Vec<NewAlternative>>,
}

impl QuestionUpdate {
    /// Whether no field was supplied.
    pub fn is_empty(&self) -> bool {
        self.statement.is_none() && self.explanation.is_none() && self.alternatives.is_none()
    }
}

/// Trim optional free text, mapping blank values to `None`.
pub(crate) fn normalize_optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToString::to_string)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_texts_marks_one_correct() {
        let alts = NewAlternative::from_texts(["3", "4", "5", "6"], 1);
        assert_eq!(alts.len(), 4);
        assert!(alts[1].is_correct);
        assert_eq!(alts.iter().filter(|a| a.is_correct).count(), 1);
    }

    #[test]
    fn from_texts_out_of_range_marks_none() {
        let alts = NewAlternative::from_texts(["a", "b", "c", "d"], 7);
        assert!(alts.iter().all(|a| !a.is_correct));
    }

    #[test]
    fn updates_report_emptiness() {
        assert!(ThemeUpdate::default().is_empty());
        assert!(QuestionUpdate::default().is_empty());
        let update = ThemeUpdate {
            description: Some(None),
            ..ThemeUpdate::default()
        };
        assert!(!update.is_empty());
    }

    #[test]
    fn normalize_optional_blank_is_none() {
        assert_eq!(normalize_optional(None), None);
        assert_eq!(normalize_optional(Some("   ")), None);
        assert_eq!(normalize_optional(Some("  why  ")), Some("why".into()));
    }

    #[test]
    fn question_serializes_flat_camel_case() {
        let q = QuestionWithAlternatives {
            question: Question {
                id: 1,
                theme_id: 2,
                statement: "2+2?".into(),
                explanation: None,
                created_at: "2025-01-01 00:00:00".into(),
            },
            alternatives: vec![Alternative {
                id: 10,
                question_id: 1,
                text: "4".into(),
                is_correct: true,
            }],
        };
        let json = serde_json::to_value(&q).unwrap();
        assert_eq!(json["themeId"], 2);
        assert_eq!(json["statement"], "2+2?");
        assert_eq!(json["alternatives"][0]["isCorrect"], true);
    }

    #[test]
    fn lookup_helpers() {
        let q = QuestionWithAlternatives {
            question: Question {
                id: 1,
                theme_id: 1,
                statement: "s".into(),
                explanation: None,
                created_at: String::new(),
            },
            alternatives: vec![
                Alternative {
                    id: 5,
                    question_id: 1,
                    text: "a".into(),
                    is_correct: false,
                },
                Alternative {
                    id: 6,
                    question_id: 1,
                    text: "b".into(),
                    is_correct: true,
                },
            ],
        };
        assert_eq!(q.id(), 1);
        assert_eq!(q.correct_alternative().map(|a| a.id), Some(6));
        assert_eq!(q.alternative(5).map(|a| a.text.as_str()), Some("a"));
        assert!(q.alternative(42).is_none());
    }
}
