use super::migrations::init_with_migrations;
use crate::libs::data_storage::DataStorage;
use anyhow::Result;
use rusqlite::Connection;
use std::path::Path;

pub const DB_FILE_NAME: &str = "taskpad.db";

/// An open, fully migrated SQLite connection.
pub struct Db {
    pub conn: Connection,
}

impl Db {
    /// Opens `taskpad.db` in the data directory.
    pub fn new() -> Result<Db> {
        let path = DataStorage::new().get_path(DB_FILE_NAME)?;
        Self::open(&path)
    }

    pub fn open(path: &Path) -> Result<Db> {
        Self::prepare(Connection::open(path)?)
    }

    /// Private in-memory database, used by tests.
    pub fn in_memory() -> Result<Db> {
        Self::prepare(Connection::open_in_memory()?)
    }

    fn prepare(mut conn: Connection) -> Result<Db> {
        init_with_migrations(&mut conn)?;
        Ok(Db { conn })
    }
}
