//! In-memory quiz attempt.
//!
//! A [`QuizSession`] walks a fixed list of sampled questions one at a time.
//! Each question locks after its first answer, the session only advances
//! past answered questions, and it finishes after the last one. Nothing
//! here touches storage.

use serde::Serialize;

use crate::errors::QuizError;
use crate::types::{AlternativeId, QuestionWithAlternatives, Theme};

/// The outcome of one answered question.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestionResult {
    /// The question as it was asked.
    pub question: QuestionWithAlternatives,
    /// The alternative the player picked.
    pub selected_alternative_id: AlternativeId,
    /// Whether the pick was the correct alternative.
    pub is_correct: bool,
}

/// Scored results of an attempt.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizSummary {
    /// Theme the questions came from.
    pub theme: Theme,
    /// Number of answered questions.
    pub total_questions: u32,
    /// Number of correct answers.
    pub correct_answers: u32,
    /// `correct_answers / total_questions` as a rounded percentage, 0 when
    /// nothing was answered.
    pub percentage: u32,
    /// Per-question results in the order they were asked.
    pub results: Vec<QuizQuestionResult>,
}

/// One quiz attempt over a fixed set of questions.
#[derive(Clone, Debug)]
pub struct QuizSession {
    theme: Theme,
    questions: Vec<QuestionWithAlternatives>,
    index: usize,
    results: Vec<QuizQuestionResult>,
}

impl QuizSession {
    /// Start an attempt.
    ///
    /// # Errors
    ///
    /// [`QuizError::Empty`] when `questions` is empty.
    pub fn new(theme: Theme, questions: Vec<QuestionWithAlternatives>) -> Result<Self, QuizError> {
        if questions.is_empty() {
            return Err(QuizError::Empty);
        }
        Ok(Self {
            theme,
            questions,
            index: 0,
            results: Vec::new(),
        })
    }

    /// Theme being played.
    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    /// Number of questions in the attempt.
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Always false; kept alongside `len`.
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Zero-based position of the current question.
    pub fn position(&self) -> usize {
        self.index
    }

    /// The question being asked, or `None` once finished.
    pub fn current(&self) -> Option<&QuestionWithAlternatives> {
        self.questions.get(self.index)
    }

    /// The recorded answer for the current question, if any.
    pub fn current_result(&self) -> Option<&QuizQuestionResult> {
        let current = self.current()?;
        self.results.iter().find(|r| r.question.id() == current.id())
    }

    /// Answer the current question. The first answer is final.
    ///
    /// # Errors
    ///
    /// [`QuizError::Finished`] after the last question,
    /// [`QuizError::AlreadyAnswered`] on a second answer,
    /// [`QuizError::UnknownAlternative`] if the id belongs to another question.
    pub fn answer(&mut self, alternative_id: AlternativeId) -> Result<&QuizQuestionResult, QuizError> {
        let question = self.current().ok_or(QuizError::Finished)?;
        let question_id = question.id();
        if self.current_result().is_some() {
            return Err(QuizError::AlreadyAnswered { question_id });
        }
        let alternative = question
            .alternative(alternative_id)
            .ok_or(QuizError::UnknownAlternative {
                question_id,
                alternative_id,
            })?;

        let result = QuizQuestionResult {
            is_correct: alternative.is_correct,
            selected_alternative_id: alternative_id,
            question: question.clone(),
        };
        let index = self.results.len();
        self.results.push(result);
        Ok(&self.results[index])
    }

    /// Move to the next question. Returns `false` when that finishes the
    /// attempt.
    ///
    /// # Errors
    ///
    /// [`QuizError::NotAnswered`] if the current question has no answer yet,
    /// [`QuizError::Finished`] if the attempt is already over.
    pub fn advance(&mut self) -> Result<bool, QuizError> {
        let question_id = self.current().ok_or(QuizError::Finished)?.id();
        if self.current_result().is_none() {
            return Err(QuizError::NotAnswered { question_id });
        }
        self.index += 1;
        Ok(!self.is_finished())
    }

    /// Whether every question has been answered and passed.
    pub fn is_finished(&self) -> bool {
        self.index >= self.questions.len()
    }

    /// Score the answers recorded so far.
    pub fn summary(&self) -> QuizSummary {
        let total = u32::try_from(self.results.len()).unwrap_or(u32::MAX);
        let correct = u32::try_from(self.results.iter().filter(|r| r.is_correct).count()).unwrap_or(u32::MAX);
        QuizSummary {
            theme: self.theme.clone(),
            total_questions: total,
            correct_answers: correct,
            percentage: rounded_percentage(correct, total),
            results: self.results.clone(),
        }
    }

    /// Consume the session, producing its summary.
    pub fn finish(self) -> QuizSummary {
        self.summary()
    }
}

/// `part / whole` as a percentage rounded half up.
fn rounded_percentage(part: u32, whole: u32) -> u32 {
    if whole == 0 {
        return 0;
    }
    let (part, whole) = (u64::from(part), u64::from(whole));
    u32::try_from((part * 200 + whole) / (whole * 2)).unwrap_or(100)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
