//! Command handlers.
//!
//! Each handler talks to the [`QuizStore`] and writes to `out`. Input for
//! interactive play comes from `input`, so handlers run the same against a
//! terminal or a buffer. In JSON mode every command prints one JSON value
//! on `out`; the interactive part of `play` goes to stderr instead.

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result, bail};
use quizbank_settings::QuizbankSettings;
use quizbank_store::{
    NewAlternative, NewQuestion, NewTheme, QuestionWithAlternatives, QuizSession, QuizStore,
    QuizSummary, Theme, ThemeUpdate,
};
use serde::Serialize;
use serde_json::json;
use tracing::info;

use crate::cli::{AddQuestion, Command, EditTheme, QuestionCommand, ThemeCommand};

/// Output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    /// Human-readable lines.
    Text,
    /// Pretty-printed JSON.
    Json,
}

/// Everything a handler needs.
pub struct Env<'a, R, W> {
    /// Data layer.
    pub store: &'a QuizStore,
    /// Loaded settings.
    pub settings: &'a QuizbankSettings,
    /// Output format for non-interactive commands.
    pub format: Format,
    /// Interactive input.
    pub input: R,
    /// Command output.
    pub out: W,
}

/// Dispatch a parsed command.
pub async fn run<R: BufRead, W: Write>(command: Command, ctx: &mut Env<'_, R, W>) -> Result<()> {
    match command {
        Command::Init => {
            let version = ctx.store.initialize_database().await?;
            if ctx.format == Format::Json {
                return print_json(&mut ctx.out, &json!({ "schemaVersion": version }));
            }
            writeln!(ctx.out, "database ready (schema version {version})")?;
        }
        Command::Themes(cmd) => run_theme(cmd, ctx).await?,
        Command::Questions(cmd) => run_question(cmd, ctx).await?,
        Command::Play { theme_id, amount } => {
            let amount = amount.unwrap_or(ctx.settings.quiz.default_question_amount);
            play(theme_id, amount, ctx).await?;
        }
    }
    Ok(())
}

async fn run_theme<R: BufRead, W: Write>(cmd: ThemeCommand, ctx: &mut Env<'_, R, W>) -> Result<()> {
    match cmd {
        ThemeCommand::List => {
            let themes = ctx.store.list_themes().await?;
            if ctx.format == Format::Json {
                return print_json(&mut ctx.out, &themes);
            }
            if themes.is_empty() {
                writeln!(ctx.out, "no themes yet")?;
            }
            for theme in &themes {
                write_theme_line(&mut ctx.out, theme)?;
            }
        }
        ThemeCommand::Add {
            name,
            description,
            color,
        } => {
            let theme = NewTheme {
                name,
                description,
                color: Some(color.unwrap_or_else(|| ctx.settings.quiz.default_theme_color.clone())),
            };
            let created = ctx.store.create_theme(&theme).await?;
            info!(theme_id = created.id, "theme added");
            show_theme(ctx, &created)?;
        }
        ThemeCommand::Edit(edit) => {
            let id = edit.id;
            let update = theme_update(edit);
            let updated = ctx
                .store
                .update_theme(id, &update)
                .await?
                .with_context(|| format!("theme {id} not found"))?;
            show_theme(ctx, &updated)?;
        }
        ThemeCommand::Show { id } => {
            let theme = ctx
                .store
                .get_theme(id)
                .await?
                .with_context(|| format!("theme {id} not found"))?;
            show_theme(ctx, &theme)?;
        }
        ThemeCommand::Remove { id } => {
            if !ctx.store.delete_theme(id).await? {
                bail!("theme {id} not found");
            }
            write_removed(ctx, "theme", id)?;
        }
    }
    Ok(())
}

fn theme_update(edit: EditTheme) -> ThemeUpdate {
    let description = if edit.clear_description {
        Some(None)
    } else {
        edit.description.map(Some)
    };
    ThemeUpdate {
        name: edit.name,
        description,
        color: edit.color,
    }
}

async fn run_question<R: BufRead, W: Write>(cmd: QuestionCommand, ctx: &mut Env<'_, R, W>) -> Result<()> {
    match cmd {
        QuestionCommand::List { theme_id } => {
            let questions = ctx.store.list_questions_by_theme(theme_id).await?;
            if ctx.format == Format::Json {
                return print_json(&mut ctx.out, &questions);
            }
            if questions.is_empty() {
                writeln!(ctx.out, "no questions in theme {theme_id}")?;
            }
            for question in &questions {
                write_question(&mut ctx.out, question)?;
            }
        }
        QuestionCommand::Add(add) => {
            let created = ctx.store.create_question(&new_question(add)?).await?;
            info!(question_id = created.id(), "question added");
            show_question(ctx, &created)?;
        }
        QuestionCommand::Show { id } => {
            let question = ctx
                .store
                .get_question_with_alternatives(id)
                .await?
                .with_context(|| format!("question {id} not found"))?;
            show_question(ctx, &question)?;
        }
        QuestionCommand::Remove { id } => {
            if !ctx.store.delete_question(id).await? {
                bail!("question {id} not found");
            }
            write_removed(ctx, "question", id)?;
        }
    }
    Ok(())
}

/// Convert CLI arguments; `--correct` is 1-based.
fn new_question(add: AddQuestion) -> Result<NewQuestion> {
    let Some(correct_index) = add.correct.checked_sub(1) else {
        bail!("--correct counts from 1");
    };
    Ok(NewQuestion {
        theme_id: add.theme_id,
        statement: add.statement,
        explanation: add.explanation,
        alternatives: NewAlternative::from_texts(add.alternatives, correct_index),
    })
}

async fn play<R: BufRead, W: Write>(theme_id: i64, amount: u32, ctx: &mut Env<'_, R, W>) -> Result<()> {
    let session = ctx.store.start_quiz(theme_id, amount).await?;
    match ctx.format {
        Format::Text => {
            let summary = play_session(session, &mut ctx.input, &mut ctx.out)?;
            write_summary(&mut ctx.out, &summary)
        }
        Format::Json => {
            let summary = play_session(session, &mut ctx.input, &mut io::stderr())?;
            print_json(&mut ctx.out, &summary)
        }
    }
}

/// Ask every question of `session`, writing prompts and feedback to `out`.
fn play_session<R: BufRead, W: Write>(mut session: QuizSession, input: &mut R, out: &mut W) -> Result<QuizSummary> {
    writeln!(out, "{}: {} question(s)\n", session.theme().name, session.len())?;

    while let Some(question) = session.current().cloned() {
        writeln!(out, "[{}/{}] {}", session.position() + 1, session.len(), question.question.statement)?;
        for (n, alternative) in question.alternatives.iter().enumerate() {
            writeln!(out, "  {}) {}", n + 1, alternative.text)?;
        }

        let choice = read_choice(input, out, question.alternatives.len())?;
        let selected = question.alternatives[choice].id;
        let result = session.answer(selected)?;
        if result.is_correct {
            writeln!(out, "Correct!")?;
        } else {
            let correct = question
                .correct_alternative()
                .map_or("?", |a| a.text.as_str());
            writeln!(out, "Wrong. The answer is: {correct}")?;
        }
        if let Some(explanation) = &question.question.explanation {
            writeln!(out, "  {explanation}")?;
        }
        writeln!(out)?;
        let _ = session.advance()?;
    }

    Ok(session.finish())
}

/// Prompt until a number in `1..=count` is entered. Returns a 0-based index.
fn read_choice<R: BufRead, W: Write>(input: &mut R, out: &mut W, count: usize) -> Result<usize> {
    let mut line = String::new();
    loop {
        write!(out, "your answer (1-{count}): ")?;
        out.flush()?;
        line.clear();
        if input.read_line(&mut line)? == 0 {
            bail!("input closed before the quiz finished");
        }
        match line.trim().parse::<usize>() {
            Ok(n) if (1..=count).contains(&n) => return Ok(n - 1),
            _ => writeln!(out, "please enter a number between 1 and {count}")?,
        }
    }
}

fn write_summary<W: Write>(out: &mut W, summary: &QuizSummary) -> Result<()> {
    writeln!(
        out,
        "{}: {}/{} correct ({}%)",
        summary.theme.name, summary.correct_answers, summary.total_questions, summary.percentage
    )?;
    for (n, result) in summary.results.iter().enumerate() {
        let mark = if result.is_correct { "+" } else { "-" };
        writeln!(out, "  {mark} {}. {}", n + 1, result.question.question.statement)?;
    }
    Ok(())
}

fn write_removed<R, W: Write>(ctx: &mut Env<'_, R, W>, kind: &str, id: i64) -> Result<()> {
    if ctx.format == Format::Json {
        return print_json(&mut ctx.out, &json!({ "removed": kind, "id": id }));
    }
    writeln!(ctx.out, "removed {kind} {id}")?;
    Ok(())
}

fn show_theme<R, W: Write>(ctx: &mut Env<'_, R, W>, theme: &Theme) -> Result<()> {
    if ctx.format == Format::Json {
        return print_json(&mut ctx.out, theme);
    }
    write_theme_line(&mut ctx.out, theme)?;
    if let Some(description) = &theme.description {
        writeln!(ctx.out, "    {description}")?;
    }
    Ok(())
}

fn write_theme_line<W: Write>(out: &mut W, theme: &Theme) -> Result<()> {
    writeln!(
        out,
        "{:>4}  {:<24} {}  {} question(s)",
        theme.id, theme.name, theme.color, theme.question_count
    )?;
    Ok(())
}

fn show_question<R, W: Write>(ctx: &mut Env<'_, R, W>, question: &QuestionWithAlternatives) -> Result<()> {
    if ctx.format == Format::Json {
        return print_json(&mut ctx.out, question);
    }
    write_question(&mut ctx.out, question)
}

fn write_question<W: Write>(out: &mut W, question: &QuestionWithAlternatives) -> Result<()> {
    writeln!(out, "{:>4}  {}", question.id(), question.question.statement)?;
    for (n, alternative) in question.alternatives.iter().enumerate() {
        let mark = if alternative.is_correct { "*" } else { " " };
        writeln!(out, "     {mark} {}) {}", n + 1, alternative.text)?;
    }
    if let Some(explanation) = &question.question.explanation {
        writeln!(out, "       {explanation}")?;
    }
    Ok(())
}

fn print_json<W: Write, T: Serialize + ?Sized>(out: &mut W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
