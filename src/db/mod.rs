pub mod migrations;

use std::sync::{Arc, Mutex};

use anyhow::Context;
use rusqlite::Connection;

use crate::services::store::sqlite::SqliteStore;

pub fn init_db(path: &str) -> anyhow::Result<Connection> {
    let conn = Connection::open(path)
        .with_context(|| format!("failed to open database at {path}"))?;

    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA busy_timeout=5000;")
        .context("failed to set database pragmas")?;

    migrations::run_migrations(&conn)?;

    Ok(conn)
}

/// Opens (and migrates) the database as the embedded record store.
pub fn open_store(path: &str) -> anyhow::Result<SqliteStore> {
    let conn = init_db(path)?;
    Ok(SqliteStore::new(Arc::new(Mutex::new(conn))))
}
