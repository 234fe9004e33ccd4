use anyhow::{Context, Result};
use rusqlite::{params, Connection};

/// A column added to an existing table after its first release.
#[derive(Debug, Clone, Copy)]
pub struct AddColumn {
    pub table: &'static str,
    pub column: &'static str,
    /// Column definition as it appears after `ADD COLUMN <name>`.
    pub definition: &'static str,
}

pub fn has_column(conn: &Connection, table: &str, column: &str) -> Result<bool> {
    let found: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM pragma_table_info(?1) WHERE name = ?2",
            params![table, column],
            |row| row.get(0),
        )
        .with_context(|| format!("Failed to read columns of {}", table))?;

    Ok(found > 0)
}

/// Apply each migration whose column is missing. Returns how many ran.
pub fn apply(conn: &Connection, migrations: &[AddColumn]) -> Result<usize> {
    let mut applied = 0;
    for migration in migrations {
        if has_column(conn, migration.table, migration.column)? {
            continue;
        }

        log::info!(
            "Adding column {}.{}",
            migration.table,
            migration.column
        );
        let sql = format!(
            "ALTER TABLE {} ADD COLUMN {} {}",
            migration.table, migration.column, migration.definition
        );
        conn.execute(&sql, [])
            .with_context(|| format!("Failed to add {}.{}", migration.table, migration.column))?;
        applied += 1;
    }
    Ok(applied)
}
