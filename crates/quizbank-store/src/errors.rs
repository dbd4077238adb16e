//! Error types for the quiz data layer.
//!
//! [`StoreError`] is returned by every storage operation. Domain conditions
//! (duplicate theme names, broken question invariants) get their own
//! variants; everything else the database reports is passed through as
//! [`StoreError::Sqlite`]. Lookups that find nothing return `Ok(None)`
//! rather than an error.

use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A theme with the same (case-insensitive) name already exists.
    #[error("theme name already exists: {name}")]
    NameConflict {
        /// The rejected theme name, as submitted after trimming.
        name: String,
    },

    /// Input violated a domain invariant. Raised before any statement runs.
    #[error("validation error: {0}")]
    Validation(String),

    /// `SQLite` error not otherwise classified.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Schema migration failed.
    #[error("migration error: {message}")]
    Migration {
        /// Describes which migration failed and why.
        message: String,
    },

    /// Filesystem error while preparing the database location.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal error (e.g. the initialization task panicked).
    #[error("internal error: {0}")]
    Internal(String),
}

impl StoreError {
    /// Whether this error is a theme name collision.
    pub fn is_name_conflict(&self) -> bool {
        matches!(self, Self::NameConflict { .. })
    }

    /// Whether this error was raised by input validation.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Translate a write error on the `themes` table, mapping unique
    /// constraint violations to [`StoreError::NameConflict`].
    pub(crate) fn from_theme_write(err: rusqlite::Error, name: &str) -> Self {
        if is_unique_violation(&err) {
            Self::NameConflict {
                name: name.to_string(),
            }
        } else {
            Self::Sqlite(err)
        }
    }
}

/// Whether a `rusqlite` error is a `UNIQUE` constraint failure.
pub(crate) fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

/// Convenience type alias for store results.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors raised by an in-memory [`QuizSession`](crate::QuizSession).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuizError {
    /// A session needs at least one question.
    #[error("quiz has no questions")]
    Empty,

    /// The current question was already answered; answers are final.
    #[error("question {question_id} already answered")]
    AlreadyAnswered {
        /// The locked question.
        question_id: i64,
    },

    /// The alternative does not belong to the current question.
    #[error("alternative {alternative_id} does not belong to question {question_id}")]
    UnknownAlternative {
        /// The current question.
        question_id: i64,
        /// The rejected alternative.
        alternative_id: i64,
    },

    /// Tried to move on before answering the current question.
    #[error("question {question_id} has not been answered")]
    NotAnswered {
        /// The unanswered question.
        question_id: i64,
    },

    /// Every question has already been answered and passed.
    #[error("quiz is already finished")]
    Finished,
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
