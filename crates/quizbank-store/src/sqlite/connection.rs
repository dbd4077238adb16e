//! Single-connection `SQLite` handle.
//!
//! The quiz store talks to one connection for the whole process. It is
//! guarded by a `parking_lot::Mutex` so the handle can be cloned and shared
//! across tasks; every clone points at the same connection.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use rusqlite::Connection;
use tracing::{info, warn};

use crate::errors::Result;

/// Where the database lives.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Location {
    /// On-disk database file. The parent directory is created if missing.
    File(PathBuf),
    /// Private in-memory database (tests, dry runs).
    Memory,
}

/// Configuration for opening the store.
#[derive(Clone, Debug)]
pub struct StoreConfig {
    /// Database location.
    pub location: Location,
    /// Busy timeout in milliseconds (default: 5000).
    pub busy_timeout_ms: u32,
}

impl StoreConfig {
    /// File-backed configuration with default pragmas.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            location: Location::File(path.into()),
            ..Self::default()
        }
    }

    /// In-memory configuration with default pragmas.
    pub fn memory() -> Self {
        Self {
            location: Location::Memory,
            ..Self::default()
        }
    }

    /// Default on-disk location: `~/.quizbank/quiz.db`.
    pub fn default_path() -> PathBuf {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
        PathBuf::from(home).join(".quizbank").join("quiz.db")
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            location: Location::File(Self::default_path()),
            busy_timeout_ms: 5000,
        }
    }
}

/// Shared handle to the single store connection.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
    location: Location,
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("location", &self.location)
            .finish_non_exhaustive()
    }
}

impl Database {
    /// Open (creating if needed) the database described by `config` and
    /// apply connection pragmas. Does not run migrations.
    pub fn open(config: &StoreConfig) -> Result<Self> {
        let conn = match &config.location {
            Location::File(path) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    std::fs::create_dir_all(parent)?;
                }
                let conn = Connection::open(path)?;
                conn.execute_batch("PRAGMA journal_mode = WAL;")?;
                conn
            }
            Location::Memory => Connection::open_in_memory()?,
        };

        conn.execute_batch(&format!(
            "PRAGMA foreign_keys = ON;\
             PRAGMA busy_timeout = {};",
            config.busy_timeout_ms
        ))?;

        info!(location = ?config.location, "database opened");

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            location: config.location.clone(),
        })
    }

    /// Open a private in-memory database.
    pub fn in_memory() -> Result<Self> {
        Self::open(&StoreConfig::memory())
    }

    /// Execute a closure with the locked connection.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self.conn.lock();
        f(&conn)
    }

    /// Where this database lives.
    pub fn location(&self) -> &Location {
        &self.location
    }

    /// File path, if file-backed.
    pub fn path(&self) -> Option<&Path> {
        match &self.location {
            Location::File(path) => Some(path),
            Location::Memory => None,
        }
    }

    /// Whether two handles share the same underlying connection.
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.conn, &b.conn)
    }

    /// Close the connection if this is the last handle.
    ///
    /// Returns `Ok(false)` without closing when other clones are still alive;
    /// the connection then closes when the last clone drops.
    pub fn close(self) -> Result<bool> {
        match Arc::try_unwrap(self.conn) {
            Ok(mutex) => {
                mutex.into_inner().close().map_err(|(_, e)| e)?;
                info!(location = ?self.location, "database closed");
                Ok(true)
            }
            Err(_) => Ok(false),
        }
    }
}

/// Run `f` inside a transaction on `conn`.
///
/// Commits when `f` returns `Ok`. On `Err` the transaction is rolled back
/// and the original error is returned unchanged.
pub fn in_transaction<T, F>(conn: &Connection, f: F) -> Result<T>
where
    F: FnOnce(&Connection) -> Result<T>,
{
    let tx = conn.unchecked_transaction()?;
    match f(&tx) {
        Ok(value) => {
            tx.commit()?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback() {
                warn!(error = %err, %rollback_err, "rollback failed");
            } else {
                warn!(error = %err, "transaction rolled back");
            }
            Err(err)
        }
    }
}

/// Read back the pragmas that matter to the store.
pub fn verify_pragmas(conn: &Connection) -> Result<PragmaState> {
    let journal_mode: String = conn.query_row("PRAGMA journal_mode", [], |row| row.get(0))?;
    let foreign_keys: i32 = conn.query_row("PRAGMA foreign_keys", [], |row| row.get(0))?;
    Ok(PragmaState {
        journal_mode,
        foreign_keys_enabled: foreign_keys == 1,
    })
}

/// Pragma state for verification.
#[derive(Debug)]
pub struct PragmaState {
    /// Journal mode ("wal" for files, "memory" in memory).
    pub journal_mode: String,
    /// Whether foreign keys are enforced.
    pub foreign_keys_enabled: bool,
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
