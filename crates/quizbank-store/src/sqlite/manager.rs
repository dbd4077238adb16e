//! Lazy, once-only database initialization.
//!
//! [`ConnectionManager::acquire`] opens the database and runs migrations the
//! first time it is called. Callers that arrive while that first call is
//! still in flight wait on the same initialization instead of opening a
//! second connection. [`ConnectionManager::release`] drops the handle so the
//! next `acquire` starts over.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::errors::{Result, StoreError};
use crate::sqlite::connection::{Database, StoreConfig};
use crate::sqlite::migrations::run_migrations;

/// Owns the single [`Database`] handle for a store.
#[derive(Debug)]
pub struct ConnectionManager {
    config: StoreConfig,
    cell: Mutex<Arc<OnceCell<Database>>>,
}

impl ConnectionManager {
    /// Create a manager. Nothing is opened until the first [`acquire`](Self::acquire).
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config,
            cell: Mutex::new(Arc::new(OnceCell::new())),
        }
    }

    /// The configuration used to open the database.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Return the migrated database handle, opening it on first use.
    ///
    /// # Errors
    ///
    /// Propagates open and migration failures. A failed initialization is
    /// not cached; the next call tries again.
    pub async fn acquire(&self) -> Result<Database> {
        let cell = self.cell.lock().clone();
        let db = cell
            .get_or_try_init(|| async {
                let config = self.config.clone();
                tokio::task::spawn_blocking(move || open_and_migrate(&config))
                    .await
                    .map_err(|e| StoreError::Internal(format!("database initialization task failed: {e}")))?
            })
            .await?;
        Ok(db.clone())
    }

    /// Whether a database handle is currently held.
    pub fn is_initialized(&self) -> bool {
        self.cell.lock().initialized()
    }

    /// Drop the held handle and reset, so the next [`acquire`](Self::acquire)
    /// reopens and re-checks migrations.
    ///
    /// The connection closes immediately unless callers still hold clones of
    /// the handle, in which case it closes when the last one drops.
    pub fn release(&self) -> Result<()> {
        let previous = std::mem::replace(&mut *self.cell.lock(), Arc::new(OnceCell::new()));
        let Some(db) = Arc::try_unwrap(previous).ok().and_then(OnceCell::into_inner) else {
            debug!("no exclusive database handle to release");
            return Ok(());
        };
        if !db.close()? {
            debug!("database handle still shared, close deferred");
        }
        Ok(())
    }
}

fn open_and_migrate(config: &StoreConfig) -> Result<Database> {
    let db = Database::open(config)?;
    let applied = db.with_conn(run_migrations)?;
    info!(applied, location = ?config.location, "database ready");
    Ok(db)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
