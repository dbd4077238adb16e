//! # quizbank-store
//!
//! `SQLite` data layer for themed quiz question banks.
//!
//! - **Themes**: named categories with a color tag, unique by case-insensitive name
//! - **Questions**: a statement with exactly four alternatives, exactly one correct
//! - **Quiz sampling**: random draws of hydrated questions from a theme
//! - **Quiz sessions**: in-memory answer tracking and scoring for one attempt
//! - **Connection manager**: one lazily opened, migrated connection shared by all callers
//!
//! [`QuizStore`] is the entry point. It owns a [`ConnectionManager`] and
//! exposes every repository operation as an async method.

#![deny(unsafe_code)]

pub mod errors;
pub mod session;
pub mod sqlite;
pub mod store;
pub mod types;

pub use errors::{QuizError, Result, StoreError};
pub use session::{QuizQuestionResult, QuizSession, QuizSummary};
pub use sqlite::{ConnectionManager, Database, Location, StoreConfig};
pub use store::QuizStore;
pub use types::*;
