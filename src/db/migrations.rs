//! Versioned schema migrations.
//!
//! Applied migrations are recorded in a `migrations` table. On open, every
//! registered migration with a higher version than the recorded maximum runs
//! in one transaction, so a failure leaves the schema where it was.

use crate::libs::messages::Message;
use crate::{msg_debug, msg_error, msg_info};
use anyhow::Result;
use rusqlite::{params, Connection, Transaction};

const MIGRATIONS_TABLE: &str = "
CREATE TABLE IF NOT EXISTS migrations (
    id INTEGER PRIMARY KEY,
    version INTEGER NOT NULL UNIQUE,
    name TEXT NOT NULL,
    applied_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
)";

#[derive(Debug, Clone)]
struct Migration {
    version: u32,
    name: &'static str,
    up: fn(&Transaction) -> Result<()>,
}

pub struct MigrationManager {
    migrations: Vec<Migration>,
}

impl MigrationManager {
    pub fn new() -> Self {
        let mut manager = Self { migrations: Vec::new() };
        manager.register_migrations();
        manager
    }

    /// Versions must be registered in ascending order.
    fn register_migrations(&mut self) {
        self.add_migration(1, "create_tasks", |tx| {
            tx.execute(
                "CREATE TABLE IF NOT EXISTS tasks (
                    id TEXT NOT NULL PRIMARY KEY,
                    title TEXT NOT NULL,
                    description TEXT,
                    completed BOOLEAN NOT NULL DEFAULT FALSE,
                    priority TEXT NOT NULL DEFAULT 'medium' CHECK (priority IN ('high', 'medium', 'low')),
                    category TEXT NOT NULL DEFAULT 'personal'
                        CHECK (category IN ('work', 'personal', 'health', 'shopping', 'learning')),
                    due_date DATE,
                    order_index INTEGER NOT NULL DEFAULT 0,
                    created_at TEXT NOT NULL,
                    updated_at TEXT NOT NULL
                )",
                [],
            )?;
            tx.execute("CREATE INDEX IF NOT EXISTS idx_tasks_created_at ON tasks(created_at)", [])?;
            tx.execute("CREATE INDEX IF NOT EXISTS idx_tasks_due_date ON tasks(due_date)", [])?;
            tx.execute("CREATE INDEX IF NOT EXISTS idx_tasks_order_index ON tasks(order_index)", [])?;
            Ok(())
        });
    }

    fn add_migration(&mut self, version: u32, name: &'static str, up: fn(&Transaction) -> Result<()>) {
        self.migrations.push(Migration { version, name, up });
    }

    pub fn run_migrations(&self, conn: &mut Connection) -> Result<()> {
        conn.execute(MIGRATIONS_TABLE, [])?;

        let current_version = self.get_current_version(conn)?;
        let pending: Vec<&Migration> = self.migrations.iter().filter(|m| m.version > current_version).collect();

        if pending.is_empty() {
            msg_debug!(Message::DatabaseVersion(current_version));
            return Ok(());
        }

        msg_debug!(Message::MigrationsFound(pending.len()));

        let tx = conn.transaction()?;
        for migration in pending {
            msg_debug!(Message::RunningMigration(migration.version, migration.name.to_string()));
            if let Err(e) = (migration.up)(&tx) {
                msg_error!(Message::MigrationFailed(migration.version, e.to_string()));
                return Err(e);
            }
            tx.execute(
                "INSERT INTO migrations (version, name) VALUES (?1, ?2)",
                params![migration.version, migration.name],
            )?;
            msg_debug!(Message::MigrationCompleted(migration.version));
        }
        tx.commit()?;

        msg_info!(Message::AllMigrationsCompleted);
        Ok(())
    }

    fn get_current_version(&self, conn: &Connection) -> Result<u32> {
        let version: Option<u32> = conn.query_row("SELECT MAX(version) FROM migrations", [], |row| row.get(0))?;
        Ok(version.unwrap_or(0))
    }

    fn latest_version(&self) -> u32 {
        self.migrations.last().map(|m| m.version).unwrap_or(0)
    }
}

impl Default for MigrationManager {
    fn default() -> Self {
        Self::new()
    }
}

pub fn init_with_migrations(conn: &mut Connection) -> Result<()> {
    MigrationManager::new().run_migrations(conn)
}

pub fn get_db_version(conn: &Connection) -> Result<u32> {
    MigrationManager::new().get_current_version(conn)
}

pub fn needs_migration(conn: &Connection) -> Result<bool> {
    let manager = MigrationManager::new();
    Ok(manager.get_current_version(conn)? < manager.latest_version())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_database_is_migrated_once() {
        let mut conn = Connection::open_in_memory().unwrap();
        conn.execute(MIGRATIONS_TABLE, []).unwrap();
        assert!(needs_migration(&conn).unwrap());

        init_with_migrations(&mut conn).unwrap();
        assert_eq!(get_db_version(&conn).unwrap(), 1);
        assert!(!needs_migration(&conn).unwrap());

        // A second run is a no-op.
        init_with_migrations(&mut conn).unwrap();
        let applied: i64 = conn.query_row("SELECT COUNT(*) FROM migrations", [], |r| r.get(0)).unwrap();
        assert_eq!(applied, 1);
    }

    #[test]
    fn test_schema_rejects_unknown_priority() {
        let mut conn = Connection::open_in_memory().unwrap();
        init_with_migrations(&mut conn).unwrap();

        let result = conn.execute(
            "INSERT INTO tasks (id, title, priority, created_at, updated_at) VALUES ('x', 't', 'urgent', '', '')",
            [],
        );
        assert!(result.is_err());
    }
}
