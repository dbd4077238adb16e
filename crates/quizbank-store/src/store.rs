//! High-level `QuizStore` API.
//!
//! The entry point callers use. Every method acquires the migrated database
//! through the [`ConnectionManager`] (opening it on first use) and delegates
//! to a repository. Multi-statement writes are transactional inside the
//! repositories, so callers never observe a question without its four
//! alternatives.

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::errors::{Result, StoreError};
use crate::session::QuizSession;
use crate::sqlite::connection::{Database, StoreConfig};
use crate::sqlite::manager::ConnectionManager;
use crate::sqlite::migrations::current_version;
use crate::sqlite::repositories::{QuestionRepo, QuizRepo, ThemeRepo};
use crate::types::{
    NewQuestion, NewTheme, QuestionId, QuestionUpdate, QuestionWithAlternatives, Theme, ThemeId,
    ThemeUpdate,
};

/// Quiz data layer over a lazily opened `SQLite` database.
///
/// Cheap to clone; clones share one [`ConnectionManager`].
#[derive(Clone, Debug)]
pub struct QuizStore {
    manager: Arc<ConnectionManager>,
}

impl QuizStore {
    /// Create a store. The database is opened on the first call that needs it.
    pub fn new(config: StoreConfig) -> Self {
        Self::from_manager(Arc::new(ConnectionManager::new(config)))
    }

    /// Create a store over an existing manager.
    pub fn from_manager(manager: Arc<ConnectionManager>) -> Self {
        Self { manager }
    }

    /// The underlying connection manager.
    pub fn manager(&self) -> &Arc<ConnectionManager> {
        &self.manager
    }

    async fn db(&self) -> Result<Database> {
        self.manager.acquire().await
    }

    /// Open the database and apply pending migrations now rather than on
    /// first use. Returns the resulting schema version.
    #[instrument(skip(self))]
    pub async fn initialize_database(&self) -> Result<u32> {
        let version = self.db().await?.with_conn(current_version)?;
        debug!(version, "database initialized");
        Ok(version)
    }

    // ── Themes ──────────────────────────────────────────────────────────

    /// All themes, ordered by name ignoring case.
    #[instrument(skip(self))]
    pub async fn list_themes(&self) -> Result<Vec<Theme>> {
        self.db().await?.with_conn(ThemeRepo::list)
    }

    /// Create a theme.
    #[instrument(skip(self, theme), fields(name = %theme.name))]
    pub async fn create_theme(&self, theme: &NewTheme) -> Result<Theme> {
        self.db().await?.with_conn(|conn| ThemeRepo::create(conn, theme))
    }

    /// Partially update a theme. `None` when the theme does not exist.
    #[instrument(skip(self, update))]
    pub async fn update_theme(&self, id: ThemeId, update: &ThemeUpdate) -> Result<Option<Theme>> {
        self.db().await?.with_conn(|conn| ThemeRepo::update(conn, id, update))
    }

    /// Delete a theme with all of its questions.
    #[instrument(skip(self))]
    pub async fn delete_theme(&self, id: ThemeId) -> Result<bool> {
        self.db().await?.with_conn(|conn| ThemeRepo::delete(conn, id))
    }

    /// Get a theme by ID.
    #[instrument(skip(self))]
    pub async fn get_theme(&self, id: ThemeId) -> Result<Option<Theme>> {
        self.db().await?.with_conn(|conn| ThemeRepo::get(conn, id))
    }

    // ── Questions ───────────────────────────────────────────────────────

    /// Questions of a theme, newest first.
    #[instrument(skip(self))]
    pub async fn list_questions_by_theme(&self, theme_id: ThemeId) -> Result<Vec<QuestionWithAlternatives>> {
        self.db()
            .await?
            .with_conn(|conn| QuestionRepo::list_by_theme(conn, theme_id))
    }

    /// Create a question with its four alternatives.
    #[instrument(skip(self, question), fields(theme_id = question.theme_id))]
    pub async fn create_question(&self, question: &NewQuestion) -> Result<QuestionWithAlternatives> {
        self.db().await?.with_conn(|conn| QuestionRepo::create(conn, question))
    }

    /// Partially update a question. `None` when the question does not exist.
    #[instrument(skip(self, update))]
    pub async fn update_question(
        &self,
        id: QuestionId,
        update: &QuestionUpdate,
    ) -> Result<Option<QuestionWithAlternatives>> {
        self.db()
            .await?
            .with_conn(|conn| QuestionRepo::update(conn, id, update))
    }

    /// Delete a question and its alternatives.
    #[instrument(skip(self))]
    pub async fn delete_question(&self, id: QuestionId) -> Result<bool> {
        self.db().await?.with_conn(|conn| QuestionRepo::delete(conn, id))
    }

    /// A question with its alternatives.
    #[instrument(skip(self))]
    pub async fn get_question_with_alternatives(&self, id: QuestionId) -> Result<Option<QuestionWithAlternatives>> {
        self.db()
            .await?
            .with_conn(|conn| QuestionRepo::get_with_alternatives(conn, id))
    }

    // ── Quiz ────────────────────────────────────────────────────────────

    /// Number of questions in a theme.
    #[instrument(skip(self))]
    pub async fn get_question_count_by_theme(&self, theme_id: ThemeId) -> Result<i64> {
        self.db()
            .await?
            .with_conn(|conn| QuizRepo::count_by_theme(conn, theme_id))
    }

    /// Up to `amount` random questions of a theme. Never errors on a
    /// shortfall; see [`start_quiz`](Self::start_quiz) for the strict form.
    #[instrument(skip(self))]
    pub async fn pick_random_questions(
        &self,
        theme_id: ThemeId,
        amount: u32,
    ) -> Result<Vec<QuestionWithAlternatives>> {
        self.db()
            .await?
            .with_conn(|conn| QuizRepo::pick_random(conn, theme_id, amount))
    }

    /// Sample exactly `amount` questions and start a [`QuizSession`].
    ///
    /// # Errors
    ///
    /// [`StoreError::Validation`] when the theme does not exist, `amount` is
    /// zero, or the theme has fewer than `amount` questions.
    #[instrument(skip(self))]
    pub async fn start_quiz(&self, theme_id: ThemeId, amount: u32) -> Result<QuizSession> {
        if amount == 0 {
            return Err(StoreError::Validation("a quiz needs at least one question".into()));
        }
        let db = self.db().await?;
        let (theme, questions) = db.with_conn(|conn| {
            let theme = ThemeRepo::get(conn, theme_id)?
                .ok_or_else(|| StoreError::Validation(format!("theme {theme_id} does not exist")))?;
            let questions = QuizRepo::pick_random(conn, theme_id, amount)?;
            Ok((theme, questions))
        })?;

        if questions.len() < amount as usize {
            return Err(StoreError::Validation(format!(
                "theme '{}' has {} questions, {amount} requested",
                theme.name,
                questions.len()
            )));
        }
        debug!(theme_id, amount, "quiz started");
        QuizSession::new(theme, questions).map_err(|e| StoreError::Internal(e.to_string()))
    }

    /// Release the database handle. The next call reopens it.
    #[instrument(skip(self))]
    pub fn close(&self) -> Result<()> {
        self.manager.release()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
