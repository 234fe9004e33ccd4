use anyhow::{Context, Result};
use rusqlite::Connection;

use super::migrations::{self, AddColumn};

const APPOINTMENT_MIGRATIONS: &[AddColumn] = &[
    // Work orders were linked after the first release.
    AddColumn {
        table: "appointments",
        column: "work_order_id",
        definition: "TEXT",
    },
];

pub fn initialize_schema(conn: &Connection) -> Result<()> {
    create_appointments_table(conn)?;
    migrations::apply(conn, APPOINTMENT_MIGRATIONS)?;
    create_indexes(conn)?;
    Ok(())
}

fn create_appointments_table(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS appointments (
            id TEXT PRIMARY KEY NOT NULL,
            start_datetime TEXT NOT NULL,
            end_datetime TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'scheduled',
            technician_id TEXT,
            client_name TEXT,
            equipment TEXT,
            address TEXT,
            cost REAL,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )
    .context("Failed to create appointments table")?;

    Ok(())
}

fn create_indexes(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_appointments_start
         ON appointments (start_datetime)",
        [],
    )
    .context("Failed to create start index")?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_appointments_technician_start
         ON appointments (technician_id, start_datetime)",
        [],
    )
    .context("Failed to create technician index")?;

    Ok(())
}
