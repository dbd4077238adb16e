//! Question repository: questions and their four alternatives.
//!
//! Every write that touches alternatives validates the set first (exactly
//! [`ALTERNATIVES_PER_QUESTION`] entries, exactly one correct, no blank
//! text) and then runs as one transaction. Updates replace the alternative
//! set wholesale, so alternative ids change on every edit that supplies one.

use std::collections::HashMap;

use rusqlite::{Connection, OptionalExtension, params, params_from_iter};
use tracing::debug;

use crate::errors::{Result, StoreError};
use crate::sqlite::connection::in_transaction;
use crate::types::{
    ALTERNATIVES_PER_QUESTION, Alternative, NewAlternative, NewQuestion, Question, QuestionId,
    QuestionUpdate, QuestionWithAlternatives, ThemeId, normalize_optional,
};

const QUESTION_COLUMNS: &str = "id, theme_id, statement, explanation, created_at";

/// Question ids bound per alternative lookup. Stays well under SQLite's
/// bound-parameter limit.
const LOOKUP_CHUNK: usize = 500;

/// Stateless; every method takes `&Connection`.
pub struct QuestionRepo;

impl QuestionRepo {
    /// Check an alternative set without touching storage.
    ///
    /// # Errors
    ///
    /// [`StoreError::Validation`] unless there are exactly four alternatives,
    /// exactly one is correct and none has blank text.
    pub fn validate_alternatives(alternatives: &[NewAlternative]) -> Result<()> {
        if alternatives.len() != ALTERNATIVES_PER_QUESTION {
            return Err(StoreError::Validation(format!(
                "a question needs exactly {ALTERNATIVES_PER_QUESTION} alternatives, got {}",
                alternatives.len()
            )));
        }
        let correct = alternatives.iter().filter(|a| a.is_correct).count();
        if correct != 1 {
            return Err(StoreError::Validation(format!(
                "exactly one alternative must be correct, got {correct}"
            )));
        }
        if let Some(index) = alternatives.iter().position(|a| a.text.trim().is_empty()) {
            return Err(StoreError::Validation(format!(
                "alternative {} has empty text",
                index + 1
            )));
        }
        Ok(())
    }

    /// Questions of a theme, newest first, each with its alternatives.
    pub fn list_by_theme(conn: &Connection, theme_id: ThemeId) -> Result<Vec<QuestionWithAlternatives>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {QUESTION_COLUMNS} FROM questions
             WHERE theme_id = ?1
             ORDER BY created_at DESC, id DESC"
        ))?;
        let questions = stmt
            .query_map(params![theme_id], Self::map_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Self::attach_alternatives(conn, questions)
    }

    /// Insert a question and its alternatives atomically.
    ///
    /// # Errors
    ///
    /// [`StoreError::Validation`] for a blank statement, a broken alternative
    /// set or an unknown theme. Nothing is written in any error case.
    pub fn create(conn: &Connection, question: &NewQuestion) -> Result<QuestionWithAlternatives> {
        let statement = required_statement(&question.statement)?;
        Self::validate_alternatives(&question.alternatives)?;
        let explanation = normalize_optional(question.explanation.as_deref());

        in_transaction(conn, |tx| {
            let theme_exists = tx
                .query_row("SELECT 1 FROM themes WHERE id = ?1", params![question.theme_id], |_| Ok(()))
                .optional()?
                .is_some();
            if !theme_exists {
                return Err(StoreError::Validation(format!(
                    "theme {} does not exist",
                    question.theme_id
                )));
            }

            let _ = tx.execute(
                "INSERT INTO questions (theme_id, statement, explanation) VALUES (?1, ?2, ?3)",
                params![question.theme_id, statement, explanation],
            )?;
            let id = tx.last_insert_rowid();
            Self::insert_alternatives(tx, id, &question.alternatives)?;
            debug!(question_id = id, theme_id = question.theme_id, "question created");

            Self::get_with_alternatives(tx, id)?
                .ok_or_else(|| StoreError::Internal(format!("question {id} missing after insert")))
        })
    }

    /// Apply a partial update. Supplied alternatives replace the existing
    /// set. Returns the refreshed question, or `None` if no question has
    /// this id.
    ///
    /// # Errors
    ///
    /// [`StoreError::Validation`] for a blank statement or a broken
    /// alternative set; the stored question is left untouched.
    pub fn update(
        conn: &Connection,
        id: QuestionId,
        update: &QuestionUpdate,
    ) -> Result<Option<QuestionWithAlternatives>> {
        let statement = update.statement.as_deref().map(required_statement).transpose()?;
        if let Some(alternatives) = &update.alternatives {
            Self::validate_alternatives(alternatives)?;
        }

        in_transaction(conn, |tx| {
            let exists = tx
                .query_row("SELECT 1 FROM questions WHERE id = ?1", params![id], |_| Ok(()))
                .optional()?
                .is_some();
            if !exists {
                return Ok(None);
            }

            if let Some(statement) = &statement {
                let _ = tx.execute(
                    "UPDATE questions SET statement = ?1 WHERE id = ?2",
                    params![statement, id],
                )?;
            }
            if let Some(explanation) = &update.explanation {
                let _ = tx.execute(
                    "UPDATE questions SET explanation = ?1 WHERE id = ?2",
                    params![normalize_optional(explanation.as_deref()), id],
                )?;
            }
            if let Some(alternatives) = &update.alternatives {
                let removed = tx.execute("DELETE FROM alternatives WHERE question_id = ?1", params![id])?;
                Self::insert_alternatives(tx, id, alternatives)?;
                debug!(question_id = id, removed, "alternatives replaced");
            }

            Self::get_with_alternatives(tx, id)
        })
    }

    /// Delete a question and its alternatives. Returns whether it existed.
    pub fn delete(conn: &Connection, id: QuestionId) -> Result<bool> {
        let changed = conn.execute("DELETE FROM questions WHERE id = ?1", params![id])?;
        if changed > 0 {
            debug!(question_id = id, "question deleted");
        }
        Ok(changed > 0)
    }

    /// A question with its alternatives, or `None`.
    pub fn get_with_alternatives(conn: &Connection, id: QuestionId) -> Result<Option<QuestionWithAlternatives>> {
        let question = conn
            .query_row(
                &format!("SELECT {QUESTION_COLUMNS} FROM questions WHERE id = ?1"),
                params![id],
                Self::map_row,
            )
            .optional()?;
        let Some(question) = question else {
            return Ok(None);
        };
        Ok(Self::attach_alternatives(conn, vec![question])?.pop())
    }

    /// Hydrate questions with their alternatives, keeping the input order of
    /// questions and the id order of alternatives. Ids are looked up in
    /// chunks of [`LOOKUP_CHUNK`].
    pub(crate) fn attach_alternatives(
        conn: &Connection,
        questions: Vec<Question>,
    ) -> Result<Vec<QuestionWithAlternatives>> {
        if questions.is_empty() {
            return Ok(Vec::new());
        }

        let mut rows = Vec::with_capacity(questions.len() * ALTERNATIVES_PER_QUESTION);
        for chunk in questions.chunks(LOOKUP_CHUNK) {
            let placeholders = vec!["?"; chunk.len()].join(", ");
            let mut stmt = conn.prepare_cached(&format!(
                "SELECT id, question_id, text, is_correct FROM alternatives
                 WHERE question_id IN ({placeholders})
                 ORDER BY question_id, id"
            ))?;
            let found = stmt
                .query_map(params_from_iter(chunk.iter().map(|q| q.id)), Self::map_alternative)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            rows.extend(found);
        }

        let mut by_question: HashMap<QuestionId, Vec<Alternative>> = HashMap::new();
        for alternative in rows {
            by_question.entry(alternative.question_id).or_default().push(alternative);
        }

        Ok(questions
            .into_iter()
            .map(|question| {
                let alternatives = by_question.remove(&question.id).unwrap_or_default();
                QuestionWithAlternatives {
                    question,
                    alternatives,
                }
            })
            .collect())
    }

    fn insert_alternatives(conn: &Connection, question_id: QuestionId, alternatives: &[NewAlternative]) -> Result<()> {
        let mut stmt = conn.prepare_cached(
            "INSERT INTO alternatives (question_id, text, is_correct) VALUES (?1, ?2, ?3)",
        )?;
        for alternative in alternatives {
            let _ = stmt.execute(params![question_id, alternative.text.trim(), alternative.is_correct])?;
        }
        Ok(())
    }

    /// Map a rusqlite row to [`Question`].
    pub(crate) fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Question> {
        Ok(Question {
            id: row.get(0)?,
            theme_id: row.get(1)?,
            statement: row.get(2)?,
            explanation: row.get(3)?,
            created_at: row.get(4)?,
        })
    }

    fn map_alternative(row: &rusqlite::Row<'_>) -> rusqlite::Result<Alternative> {
        Ok(Alternative {
            id: row.get(0)?,
            question_id: row.get(1)?,
            text: row.get(2)?,
            is_correct: row.get::<_, i64>(3)? != 0,
        })
    }
}

fn required_statement(statement: &str) -> Result<String> {
    let statement = statement.trim();
    if statement.is_empty() {
        return Err(StoreError::Validation("question statement must not be empty".into()));
    }
    Ok(statement.to_string())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
#[allow(unused_results)]
mod tests {
    use super::*;
    use crate::sqlite::migrations::run_migrations;
    use crate::sqlite::repositories::ThemeRepo;
    use crate::types::NewTheme;

    fn setup() -> (Connection, ThemeId) {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        let theme = ThemeRepo::create(&conn, &NewTheme::new("Math")).unwrap();
        (conn, theme.id)
    }

    fn sample(theme_id: ThemeId, statement: &str) -> NewQuestion {
        NewQuestion {
            theme_id,
            statement: statement.into(),
            explanation: None,
            alternatives: NewAlternative::from_texts(["3", "4", "5", "6"], 1),
        }
    }

    fn row_counts(conn: &Connection) -> (i64, i64) {
        let questions = conn
            .query_row("SELECT COUNT(*) FROM questions", [], |r| r.get(0))
            .unwrap();
        let alternatives = conn
            .query_row("SELECT COUNT(*) FROM alternatives", [], |r| r.get(0))
            .unwrap();
        (questions, alternatives)
    }

    #[test]
    fn validate_accepts_four_with_one_correct() {
        let alts = NewAlternative::from_texts(["a", "b", "c", "d"], 3);
        QuestionRepo::validate_alternatives(&alts).unwrap();
    }

    #[test]
    fn validate_rejects_wrong_counts() {
        let three = NewAlternative::from_texts(["a", "b", "c"], 0);
        let five = NewAlternative::from_texts(["a", "b", "c", "d", "e"], 0);
        let none_correct = NewAlternative::from_texts(["a", "b", "c", "d"], 9);
        let two_correct = vec![
            NewAlternative::new("a", true),
            NewAlternative::new("b", true),
            NewAlternative::new("c", false),
            NewAlternative::new("d", false),
        ];
        for alts in [three, five, none_correct, two_correct] {
            assert!(QuestionRepo::validate_alternatives(&alts).unwrap_err().is_validation());
        }
    }

    #[test]
    fn validate_rejects_blank_text() {
        let alts = NewAlternative::from_texts(["a", "  ", "c", "d"], 0);
        let err = QuestionRepo::validate_alternatives(&alts).unwrap_err();
        assert!(err.to_string().contains("alternative 2"));
    }

    #[test]
    fn create_returns_hydrated_question() {
        let (conn, theme_id) = setup();
        let mut input = sample(theme_id, "  2+2?  ");
        input.explanation = Some("Basic addition".into());
        let created = QuestionRepo::create(&conn, &input).unwrap();

        assert_eq!(created.question.statement, "2+2?");
        assert_eq!(created.question.theme_id, theme_id);
        assert_eq!(created.question.explanation.as_deref(), Some("Basic addition"));
        let texts: Vec<_> = created.alternatives.iter().map(|a| a.text.as_str()).collect();
        assert_eq!(texts, ["3", "4", "5", "6"]);
        let flags: Vec<_> = created.alternatives.iter().map(|a| a.is_correct).collect();
        assert_eq!(flags, [false, true, false, false]);
        assert!(created.alternatives.iter().all(|a| a.question_id == created.id()));
    }

    #[test]
    fn create_invalid_writes_nothing() {
        let (conn, theme_id) = setup();
        let mut input = sample(theme_id, "2+2?");
        input.alternatives.pop();
        assert!(QuestionRepo::create(&conn, &input).unwrap_err().is_validation());

        let blank = sample(theme_id, "   ");
        assert!(QuestionRepo::create(&conn, &blank).unwrap_err().is_validation());
        assert_eq!(row_counts(&conn), (0, 0));
    }

    #[test]
    fn create_unknown_theme_is_validation_error() {
        let (conn, _) = setup();
        let err = QuestionRepo::create(&conn, &sample(999, "2+2?")).unwrap_err();
        assert!(err.is_validation());
        assert_eq!(row_counts(&conn), (0, 0));
    }

    #[test]
    fn create_rolls_back_when_an_alternative_insert_fails() {
        let (conn, theme_id) = setup();
        conn.execute_batch(
            "CREATE TRIGGER reject_boom BEFORE INSERT ON alternatives
             WHEN NEW.text = 'boom'
             BEGIN SELECT RAISE(ABORT, 'boom rejected'); END;",
        )
        .unwrap();

        let mut input = sample(theme_id, "2+2?");
        input.alternatives = NewAlternative::from_texts(["3", "4", "5", "boom"], 1);
        let err = QuestionRepo::create(&conn, &input).unwrap_err();
        assert!(matches!(err, StoreError::Sqlite(_)));
        assert_eq!(row_counts(&conn), (0, 0));
    }

    #[test]
    fn list_by_theme_newest_first() {
        let (conn, theme_id) = setup();
        let first = QuestionRepo::create(&conn, &sample(theme_id, "first")).unwrap();
        let second = QuestionRepo::create(&conn, &sample(theme_id, "second")).unwrap();

        let listed = QuestionRepo::list_by_theme(&conn, theme_id).unwrap();
        let ids: Vec<_> = listed.iter().map(QuestionWithAlternatives::id).collect();
        assert_eq!(ids, [second.id(), first.id()]);
        assert!(listed.iter().all(|q| q.alternatives.len() == 4));
    }

    #[test]
    fn list_by_theme_empty_and_isolated() {
        let (conn, theme_id) = setup();
        let other = ThemeRepo::create(&conn, &NewTheme::new("Other")).unwrap();
        QuestionRepo::create(&conn, &sample(other.id, "elsewhere")).unwrap();
        assert!(QuestionRepo::list_by_theme(&conn, theme_id).unwrap().is_empty());
        assert!(QuestionRepo::list_by_theme(&conn, 12345).unwrap().is_empty());
    }

    #[test]
    fn update_text_fields_only() {
        let (conn, theme_id) = setup();
        let created = QuestionRepo::create(&conn, &sample(theme_id, "2+2?")).unwrap();
        let updated = QuestionRepo::update(
            &conn,
            created.id(),
            &QuestionUpdate {
                statement: Some("Two plus two?".into()),
                explanation: Some(Some("It is four".into())),
                ..QuestionUpdate::default()
            },
        )
        .unwrap()
        .unwrap();
        assert_eq!(updated.question.statement, "Two plus two?");
        assert_eq!(updated.question.explanation.as_deref(), Some("It is four"));
        assert_eq!(updated.alternatives, created.alternatives);
    }

    #[test]
    fn update_replaces_alternatives() {
        let (conn, theme_id) = setup();
        let created = QuestionRepo::create(&conn, &sample(theme_id, "2+2?")).unwrap();
        let updated = QuestionRepo::update(
            &conn,
            created.id(),
            &QuestionUpdate {
                alternatives: Some(NewAlternative::from_texts(["four", "five", "six", "seven"], 0)),
                ..QuestionUpdate::default()
            },
        )
        .unwrap()
        .unwrap();

        assert_eq!(updated.correct_alternative().map(|a| a.text.as_str()), Some("four"));
        let old_ids: Vec<_> = created.alternatives.iter().map(|a| a.id).collect();
        assert!(updated.alternatives.iter().all(|a| !old_ids.contains(&a.id)));
        assert_eq!(row_counts(&conn), (1, 4));
    }

    #[test]
    fn update_with_invalid_alternatives_keeps_original() {
        let (conn, theme_id) = setup();
        let created = QuestionRepo::create(&conn, &sample(theme_id, "2+2?")).unwrap();
        let err = QuestionRepo::update(
            &conn,
            created.id(),
            &QuestionUpdate {
                statement: Some("changed".into()),
                alternatives: Some(NewAlternative::from_texts(["a", "b", "c"], 0)),
                ..QuestionUpdate::default()
            },
        )
        .unwrap_err();
        assert!(err.is_validation());

        let stored = QuestionRepo::get_with_alternatives(&conn, created.id()).unwrap().unwrap();
        assert_eq!(stored, created);
    }

    #[test]
    fn update_rolls_back_when_an_alternative_insert_fails() {
        let (conn, theme_id) = setup();
        let created = QuestionRepo::create(&conn, &sample(theme_id, "2+2?")).unwrap();
        conn.execute_batch(
            "CREATE TRIGGER reject_boom BEFORE INSERT ON alternatives
             WHEN NEW.text = 'boom'
             BEGIN SELECT RAISE(ABORT, 'boom rejected'); END;",
        )
        .unwrap();

        let err = QuestionRepo::update(
            &conn,
            created.id(),
            &QuestionUpdate {
                statement: Some("changed".into()),
                alternatives: Some(NewAlternative::from_texts(["a", "b", "c", "boom"], 0)),
                ..QuestionUpdate::default()
            },
        )
        .unwrap_err();
        assert!(matches!(err, StoreError::Sqlite(_)));

        let stored = QuestionRepo::get_with_alternatives(&conn, created.id()).unwrap().unwrap();
        assert_eq!(stored.question.statement, "2+2?");
        let ids: Vec<_> = stored.alternatives.iter().map(|a| a.id).collect();
        let original: Vec<_> = created.alternatives.iter().map(|a| a.id).collect();
        assert_eq!(ids, original);
        assert_eq!(row_counts(&conn), (1, 4));
    }

    #[test]
    fn list_by_theme_spans_several_lookup_chunks() {
        let (conn, theme_id) = setup();
        let total = LOOKUP_CHUNK * 2 + 3;
        for i in 0..total {
            QuestionRepo::create(&conn, &sample(theme_id, &format!("q{i}"))).unwrap();
        }

        let listed = QuestionRepo::list_by_theme(&conn, theme_id).unwrap();
        assert_eq!(listed.len(), total);
        assert!(listed.iter().all(|q| q.alternatives.len() == 4));
        assert!(listed.iter().all(|q| q.alternatives.iter().all(|a| a.question_id == q.id())));
    }

    #[test]
    fn update_missing_question_returns_none() {
        let (conn, _) = setup();
        let update = QuestionUpdate {
            alternatives: Some(NewAlternative::from_texts(["a", "b", "c", "d"], 0)),
            ..QuestionUpdate::default()
        };
        assert!(QuestionRepo::update(&conn, 77, &update).unwrap().is_none());
        assert_eq!(row_counts(&conn), (0, 0));
    }

    #[test]
    fn delete_cascades_to_alternatives() {
        let (conn, theme_id) = setup();
        let created = QuestionRepo::create(&conn, &sample(theme_id, "2+2?")).unwrap();
        assert!(QuestionRepo::delete(&conn, created.id()).unwrap());
        assert!(!QuestionRepo::delete(&conn, created.id()).unwrap());
        assert_eq!(row_counts(&conn), (0, 0));
        assert!(QuestionRepo::get_with_alternatives(&conn, created.id()).unwrap().is_none());
    }
}
