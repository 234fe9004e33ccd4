use anyhow::{Context, Result};
use rusqlite::Connection;
use std::time::Duration;

use super::schema;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Owns the SQLite connection appointments are read from and written to.
pub struct Database {
    conn: Connection,
    path: String,
}

impl Database {
    /// Open the schedule database at `path`, creating the file if needed.
    /// `":memory:"` gives a private in-memory database.
    ///
    /// # Examples
    /// ```
    /// use visit_scheduler::services::database::Database;
    /// let db = Database::new(":memory:").unwrap();
    /// db.initialize_schema().unwrap();
    /// ```
    pub fn new(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open schedule database at {}", path))?;

        // Another process (a sync job, a second window) may hold the write lock.
        conn.busy_timeout(BUSY_TIMEOUT)
            .context("Failed to set busy timeout")?;

        log::debug!("Opened schedule database at {}", path);
        Ok(Self {
            conn,
            path: path.to_string(),
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Create the appointments table and apply column migrations.
    pub fn initialize_schema(&self) -> Result<()> {
        schema::initialize_schema(self.connection())
    }
}
