//! Command-line definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Author themed question banks and take quizzes from them.
#[derive(Parser, Debug)]
#[command(name = "quizbank", version, about)]
pub struct Cli {
    /// Path to the `SQLite` database (overrides settings).
    #[arg(long, global = true)]
    pub db_path: Option<PathBuf>,

    /// Print results as JSON instead of text.
    #[arg(long, global = true)]
    pub json: bool,

    /// What to do.
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the database and apply migrations.
    Init,
    /// Manage themes.
    #[command(subcommand)]
    Themes(ThemeCommand),
    /// Manage questions.
    #[command(subcommand)]
    Questions(QuestionCommand),
    /// Take a quiz on a theme.
    Play {
        /// Theme to draw questions from.
        theme_id: i64,
        /// Number of questions (defaults to the configured amount).
        #[arg(long, short = 'n')]
        amount: Option<u32>,
    },
}

/// Theme subcommands.
#[derive(Subcommand, Debug)]
pub enum ThemeCommand {
    /// List themes with their question counts.
    List,
    /// Add a theme.
    Add {
        /// Theme name (unique, ignoring case).
        name: String,
        /// Optional description.
        #[arg(long)]
        description: Option<String>,
        /// Color tag, e.g. `#FF5722`.
        #[arg(long)]
        color: Option<String>,
    },
    /// Change a theme's name, description or color.
    Edit(EditTheme),
    /// Show one theme.
    Show {
        /// Theme id.
        id: i64,
    },
    /// Delete a theme and all of its questions.
    Remove {
        /// Theme id.
        id: i64,
    },
}

/// Arguments for `themes edit`.
#[derive(Args, Debug)]
pub struct EditTheme {
    /// Theme id.
    pub id: i64,
    /// New name.
    #[arg(long)]
    pub name: Option<String>,
    /// New description.
    #[arg(long, conflicts_with = "clear_description")]
    pub description: Option<String>,
    /// Remove the description.
    #[arg(long)]
    pub clear_description: bool,
    /// New color tag.
    #[arg(long)]
    pub color: Option<String>,
}

/// Question subcommands.
#[derive(Subcommand, Debug)]
pub enum QuestionCommand {
    /// List a theme's questions, newest first.
    List {
        /// Theme id.
        theme_id: i64,
    },
    /// Add a question with four alternatives.
    Add(AddQuestion),
    /// Show one question with its alternatives.
    Show {
        /// Question id.
        id: i64,
    },
    /// Delete a question.
    Remove {
        /// Question id.
        id: i64,
    },
}

/// Arguments for `questions add`.
#[derive(Args, Debug)]
pub struct AddQuestion {
    /// Theme the question belongs to.
    pub theme_id: i64,
    /// Question text.
    pub statement: String,
    /// An alternative; pass exactly four times.
    #[arg(long = "alt", required = true)]
    pub alternatives: Vec<String>,
    /// Which alternative is correct (1-4).
    #[arg(long)]
    pub correct: usize,
    /// Explanation shown after answering.
    #[arg(long)]
    pub explanation: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
