//! Quiz repository: read-only counting and sampling.

use rusqlite::{Connection, params};

use crate::errors::Result;
use crate::sqlite::repositories::question::QuestionRepo;
use crate::types::{QuestionWithAlternatives, ThemeId};

/// Read-only quiz queries.
pub struct QuizRepo;

impl QuizRepo {
    /// Number of questions in a theme (0 for unknown themes).
    pub fn count_by_theme(conn: &Connection, theme_id: ThemeId) -> Result<i64> {
        let count = conn.query_row(
            "SELECT COUNT(*) FROM questions WHERE theme_id = ?1",
            params![theme_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Up to `amount` distinct questions of a theme in random order, each
    /// with its alternatives. Returns everything available on a shortfall.
    pub fn pick_random(
        conn: &Connection,
        theme_id: ThemeId,
        amount: u32,
    ) -> Result<Vec<QuestionWithAlternatives>> {
        if amount == 0 {
            return Ok(Vec::new());
        }
        let mut stmt = conn.prepare(
            "SELECT id, theme_id, statement, explanation, created_at
             FROM questions
             WHERE theme_id = ?1
             ORDER BY RANDOM()
             LIMIT ?2",
        )?;
        let questions = stmt
            .query_map(params![theme_id, amount], QuestionRepo::map_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        QuestionRepo::attach_alternatives(conn, questions)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use proptest::prelude::*;

    use super::*;
    use crate::sqlite::migrations::run_migrations;
    use crate::sqlite::repositories::ThemeRepo;
    use crate::types::{NewAlternative, NewQuestion, NewTheme};

    fn setup_with_questions(count: usize) -> (Connection, ThemeId) {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        let theme = ThemeRepo::create(&conn, &NewTheme::new("Math")).unwrap();
        for i in 0..count {
            let _ = QuestionRepo::create(
                &conn,
                &NewQuestion {
                    theme_id: theme.id,
                    statement: format!("question {i}"),
                    explanation: None,
                    alternatives: NewAlternative::from_texts(["a", "b", "c", "d"], i % 4),
                },
            )
            .unwrap();
        }
        (conn, theme.id)
    }

    #[test]
    fn count_by_theme() {
        let (conn, theme_id) = setup_with_questions(3);
        assert_eq!(QuizRepo::count_by_theme(&conn, theme_id).unwrap(), 3);
        assert_eq!(QuizRepo::count_by_theme(&conn, theme_id + 1).unwrap(), 0);
    }

    #[test]
    fn pick_random_hydrates_alternatives() {
        let (conn, theme_id) = setup_with_questions(5);
        let picked = QuizRepo::pick_random(&conn, theme_id, 2).unwrap();
        assert_eq!(picked.len(), 2);
        for question in &picked {
            assert_eq!(question.question.theme_id, theme_id);
            assert_eq!(question.alternatives.len(), 4);
            assert!(question.correct_alternative().is_some());
        }
    }

    #[test]
    fn pick_random_shortfall_returns_all() {
        let (conn, theme_id) = setup_with_questions(3);
        let picked = QuizRepo::pick_random(&conn, theme_id, 10).unwrap();
        assert_eq!(picked.len(), 3);
    }

    #[test]
    fn pick_random_zero_or_unknown_theme() {
        let (conn, theme_id) = setup_with_questions(3);
        assert!(QuizRepo::pick_random(&conn, theme_id, 0).unwrap().is_empty());
        assert!(QuizRepo::pick_random(&conn, 999, 5).unwrap().is_empty());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn pick_random_returns_min_of_amount_and_available(available in 0usize..12, amount in 0u32..16) {
            let (conn, theme_id) = setup_with_questions(available);
            let picked = QuizRepo::pick_random(&conn, theme_id, amount).unwrap();
            let expected = available.min(amount as usize);
            prop_assert_eq!(picked.len(), expected);

            let distinct: HashSet<_> = picked.iter().map(QuestionWithAlternatives::id).collect();
            prop_assert_eq!(distinct.len(), expected);
        }
    }
}
