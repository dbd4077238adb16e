//! `SQLite` backend for the quiz store.
//!
//! # Architecture
//!
//! - **[`connection`]**: [`Database`] handle around a single connection, with
//!   foreign keys and busy timeout applied on open, plus the
//!   [`in_transaction`] helper for multi-statement writes.
//! - **[`manager`]**: [`ConnectionManager`], the lazy once-only opener that
//!   every caller goes through.
//! - **[`migrations`]**: Version-tracked, idempotent schema statements.
//! - **[`repositories`]**: Stateless repository structs; each method takes
//!   `&Connection` and executes SQL.

pub mod connection;
pub mod manager;
pub mod migrations;
pub mod repositories;

pub use connection::{Database, Location, PragmaState, StoreConfig, in_transaction, verify_pragmas};
pub use manager::ConnectionManager;
pub use migrations::{current_version, latest_version, run_migrations};
