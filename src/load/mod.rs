pub mod csv_file;

pub use csv_file::{read_csv, write_csv};

use crate::duck;
use crate::error::Result;
use crate::transform::CountryGdp;
use duckdb::Connection;
use std::path::Path;

/// Write the dataset to the CSV file, then to the table.
/// The two writes are independent: a failed table write leaves the CSV in place.
pub fn load(rows: &[CountryGdp], csv_path: &Path, conn: &Connection, table: &str) -> Result<()> {
    write_csv(csv_path, rows)?;
    duck::write_table(conn, table, rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use tempfile::tempdir;

    #[test]
    fn load_writes_both_artifacts() -> Result<()> {
        let dir = tempdir()?;
        let csv_path = dir.path().join("gdp.csv");
        let conn = duck::open_mem_db()?;
        let rows = vec![CountryGdp {
            country: "Testland".into(),
            gdp_usd_billions: 1.5,
        }];

        load(&rows, &csv_path, &conn, "Countries_by_GDP")?;

        assert_eq!(read_csv(&csv_path)?, rows);
        let n: i64 = conn.query_row("SELECT COUNT(*) FROM Countries_by_GDP", [], |r| r.get(0))?;
        assert_eq!(n, 1);
        Ok(())
    }

    #[test]
    fn bad_table_name_fails_after_csv_written() -> Result<()> {
        let dir = tempdir()?;
        let csv_path = dir.path().join("gdp.csv");
        let conn = duck::open_mem_db()?;
        let rows = vec![CountryGdp {
            country: "Testland".into(),
            gdp_usd_billions: 1.5,
        }];

        assert!(load(&rows, &csv_path, &conn, "bad\"name").is_err());
        assert!(csv_path.exists());
        Ok(())
    }
}
