// src/duck/mod.rs

use crate::error::{EtlError, Result};
use crate::transform::{CountryGdp, BILLIONS_COLUMN, COUNTRY_COLUMN};
use duckdb::{params, Connection};
use std::path::Path;
use tracing::info;

/// Open a DuckDB database on disk at `path`, creating the file if it doesn't exist.
pub fn open_disk_db(path: impl AsRef<Path>) -> Result<Connection> {
    let path = path.as_ref();
    Connection::open(path).map_err(|e| EtlError::store(format!("opening {}", path.display()), e))
}

/// Open a DuckDB in‐memory database
pub fn open_mem_db() -> Result<Connection> {
    Connection::open_in_memory().map_err(|e| EtlError::store("opening in-memory db", e))
}

/// Drop and recreate `table` as (Country, GDP_USD_billions).
pub fn replace_table(conn: &Connection, table: &str) -> Result<()> {
    let ddl = format!(
        r#"CREATE OR REPLACE TABLE "{table}" ("{COUNTRY_COLUMN}" VARCHAR, "{BILLIONS_COLUMN}" DOUBLE);"#
    );
    conn.execute_batch(&ddl)
        .map_err(|e| EtlError::store(format!("recreating {}", table), e))
}

/// Replace the contents of `table` with `rows`, bulk-inserted through an appender.
#[tracing::instrument(level = "info", skip(conn, rows), fields(rows = rows.len()))]
pub fn write_table(conn: &Connection, table: &str, rows: &[CountryGdp]) -> Result<()> {
    replace_table(conn, table)?;

    let append = |e| EtlError::store(format!("appending to {}", table), e);
    let mut appender = conn.appender(table).map_err(append)?;
    for row in rows {
        appender
            .append_row(params![row.country, row.gdp_usd_billions])
            .map_err(append)?;
    }
    appender.flush().map_err(append)?;

    info!(table, rows = rows.len(), "table replaced");
    Ok(())
}

/// Close explicitly so shutdown errors surface instead of vanishing in `Drop`.
pub fn close(conn: Connection) -> Result<()> {
    conn.close()
        .map_err(|(_conn, e)| EtlError::store("closing connection", e))
}
