//! # quizbank
//!
//! Command-line front end for the quiz data layer: manage themes and
//! questions, then play randomized quizzes in the terminal.

#![deny(unsafe_code)]

mod cli;
mod commands;
mod logging;

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use quizbank_settings::{QuizbankSettings, load_settings, settings_path};
use quizbank_store::{QuizStore, StoreConfig};

use crate::cli::Cli;
use crate::commands::{Env, Format};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = load_settings()
        .with_context(|| format!("failed to load settings from {}", settings_path().display()))?;
    logging::init(&settings.logging);

    let config = store_config(cli.db_path.clone(), &settings);
    tracing::debug!(location = ?config.location, "using database");
    let store = QuizStore::new(config);

    let mut env = Env {
        store: &store,
        settings: &settings,
        format: if cli.json { Format::Json } else { Format::Text },
        input: io::stdin().lock(),
        out: io::stdout().lock(),
    };
    let outcome = commands::run(cli.command, &mut env).await;

    store.close().context("failed to close the database")?;
    outcome
}

/// `--db-path` beats the settings file, which beats `~/.quizbank/quiz.db`.
fn store_config(cli_path: Option<PathBuf>, settings: &QuizbankSettings) -> StoreConfig {
    let path = cli_path
        .or_else(|| settings.database.path.clone())
        .unwrap_or_else(StoreConfig::default_path);
    StoreConfig {
        busy_timeout_ms: settings.database.busy_timeout_ms,
        ..StoreConfig::file(path)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use quizbank_store::Location;

    use super::*;

    #[test]
    fn cli_path_overrides_settings() {
        let mut settings = QuizbankSettings::default();
        settings.database.path = Some(PathBuf::from("/from/settings.db"));
        settings.database.busy_timeout_ms = 250;

        let config = store_config(Some(PathBuf::from("/from/cli.db")), &settings);
        assert_eq!(config.location, Location::File(PathBuf::from("/from/cli.db")));
        assert_eq!(config.busy_timeout_ms, 250);

        let config = store_config(None, &settings);
        assert_eq!(config.location, Location::File(PathBuf::from("/from/settings.db")));
    }

    #[test]
    fn falls_back_to_default_path() {
        let config = store_config(None, &QuizbankSettings::default());
        assert_eq!(config.location, Location::File(StoreConfig::default_path()));
    }
}
