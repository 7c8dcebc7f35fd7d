use crate::error::{LedgerResult, StoreError};
use crate::registry::Registry;
use crate::store::{check_provisioned, RegistryStore, RegistryTx};
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard};

const REGISTRY_COLUMNS: &str = "id, label, user_id, amount, created_at";

const INSERT_REGISTRY: &str = "INSERT INTO registries (id, label, user_id, amount, created_at)
     VALUES (?1, ?2, ?3, ?4, ?5)";

pub fn setup_database(conn: &Connection) -> LedgerResult<()> {
    // Enable WAL mode for crash recovery (in-memory databases report "memory")
    let journal_mode: String =
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
    tracing::debug!(%journal_mode, "registry database journal mode");

    // ==========================================================================
    // Registries Table
    // seq is the creation order; amounts are exact decimals stored as TEXT
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS registries (
            seq INTEGER PRIMARY KEY AUTOINCREMENT,
            id TEXT UNIQUE NOT NULL,
            label TEXT NOT NULL,
            user_id TEXT NOT NULL,
            amount TEXT NOT NULL,
            created_at TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_registries_user ON registries(user_id, seq)",
        [],
    )?;

    Ok(())
}

fn row_to_registry(row: &Row<'_>) -> rusqlite::Result<Registry> {
    let amount_str: String = row.get(3)?;
    let created_at_str: String = row.get(4)?;

    let amount = Decimal::from_str(&amount_str)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(e)))?;
    let created_at = DateTime::parse_from_rfc3339(&created_at_str)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e)))?
        .with_timezone(&Utc);

    Ok(Registry {
        id: row.get(0)?,
        label: row.get(1)?,
        user_id: row.get(2)?,
        amount,
        created_at,
    })
}

// ============================================================================
// SQLITE STORE
// ============================================================================

/// Registry store backed by a single SQLite connection.
///
/// The connection sits behind a mutex and every unit of work is a
/// `BEGIN IMMEDIATE` transaction, so read-then-write sequences are serialized.
pub struct SqliteRegistryStore {
    conn: Mutex<Connection>,
}

impl SqliteRegistryStore {
    pub fn open(path: &Path) -> LedgerResult<Self> {
        let conn = Connection::open(path)?;
        tracing::debug!(path = %path.display(), "opened registry database");
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> LedgerResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    pub fn from_connection(conn: Connection) -> LedgerResult<Self> {
        setup_database(&conn)?;
        Ok(SqliteRegistryStore {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::LockPoisoned)
    }

    /// Number of stored registries
    pub fn count(&self) -> LedgerResult<i64> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM registries", [], |row| row.get(0))?;
        Ok(count)
    }
}

impl RegistryStore for SqliteRegistryStore {
    fn transaction<T, F>(&self, work: F) -> LedgerResult<T>
    where
        F: FnOnce(&mut dyn RegistryTx) -> LedgerResult<T>,
    {
        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        // Dropping `tx` on the error path rolls back
        let outcome = {
            let mut unit = SqliteTx { conn: &tx };
            work(&mut unit)?
        };

        tx.commit()?;
        Ok(outcome)
    }

    fn insert_all(&self, registries: &[Registry]) -> LedgerResult<usize> {
        for registry in registries {
            check_provisioned(registry)?;
        }

        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        {
            let mut stmt = tx.prepare(INSERT_REGISTRY)?;
            for registry in registries {
                stmt.execute(params![
                    registry.id,
                    registry.label,
                    registry.user_id,
                    registry.amount.to_string(),
                    registry.created_at.to_rfc3339(),
                ])?;
            }
        }
        tx.commit()?;

        tracing::debug!(count = registries.len(), "registries provisioned");
        Ok(registries.len())
    }
}

struct SqliteTx<'c> {
    conn: &'c Connection,
}

impl RegistryTx for SqliteTx<'_> {
    fn find_by_user_id(&self, user_id: &str) -> LedgerResult<Vec<Registry>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM registries WHERE user_id = ?1 ORDER BY seq",
            REGISTRY_COLUMNS
        ))?;

        let registries = stmt
            .query_map([user_id], row_to_registry)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(registries)
    }

    fn find_by_id_and_user(&self, id: &str, user_id: &str) -> LedgerResult<Option<Registry>> {
        let registry = self
            .conn
            .query_row(
                &format!(
                    "SELECT {} FROM registries WHERE id = ?1 AND user_id = ?2",
                    REGISTRY_COLUMNS
                ),
                params![id, user_id],
                row_to_registry,
            )
            .optional()?;

        Ok(registry)
    }

    fn save_atomic(&mut self, registries: &[Registry]) -> LedgerResult<()> {
        let mut stmt = self
            .conn
            .prepare("UPDATE registries SET amount = ?1 WHERE id = ?2 AND user_id = ?3")?;

        for registry in registries {
            let changed = stmt.execute(params![
                registry.amount.to_string(),
                registry.id,
                registry.user_id,
            ])?;

            if changed == 0 {
                return Err(StoreError::UnknownRegistry {
                    id: registry.id.clone(),
                }
                .into());
            }
        }

        tracing::debug!(count = registries.len(), "registry balances saved");
        Ok(())
    }
}
