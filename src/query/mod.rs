use crate::error::{EtlError, Result};
use crate::transform::{CountryGdp, BILLIONS_COLUMN, COUNTRY_COLUMN};
use duckdb::Connection;
use serde::Serialize;
use std::fmt;
use tracing::info;

/// Threshold (billions USD) of the filtered read-back query.
pub const LARGE_ECONOMY_BILLIONS: f64 = 100.0;

pub fn select_all_sql(table: &str) -> String {
    format!("SELECT * FROM {table}")
}

pub fn select_larger_than_sql(table: &str, billions: f64) -> String {
    format!("SELECT * FROM {table} WHERE {BILLIONS_COLUMN} > {billions}")
}

/// The two read-back queries issued after every load.
pub fn fixed_queries(table: &str) -> [String; 2] {
    [
        select_all_sql(table),
        select_larger_than_sql(table, LARGE_ECONOMY_BILLIONS),
    ]
}

/// Rows returned by a query over the GDP table, in result order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QueryResult {
    pub rows: Vec<CountryGdp>,
}

impl QueryResult {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Single-line JSON form, used for log lines.
    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.rows).unwrap_or_else(|e| format!("<unserializable: {e}>"))
    }
}

/// Index-prefixed, right-aligned text table.
impl fmt::Display for QueryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.rows.is_empty() {
            return write!(
                f,
                "Empty result\nColumns: [{COUNTRY_COLUMN}, {BILLIONS_COLUMN}]"
            );
        }

        let values: Vec<String> = self
            .rows
            .iter()
            .map(|r| format!("{:.2}", r.gdp_usd_billions))
            .collect();
        let idx_w = (self.rows.len() - 1).to_string().len();
        let country_w = self
            .rows
            .iter()
            .map(|r| r.country.chars().count())
            .chain([COUNTRY_COLUMN.len()])
            .max()
            .unwrap_or_default();
        let value_w = values
            .iter()
            .map(String::len)
            .chain([BILLIONS_COLUMN.len()])
            .max()
            .unwrap_or_default();

        write!(
            f,
            "{:idx_w$}  {:>country_w$}  {:>value_w$}",
            "", COUNTRY_COLUMN, BILLIONS_COLUMN
        )?;
        for (i, (row, value)) in self.rows.iter().zip(&values).enumerate() {
            write!(
                f,
                "\n{:<idx_w$}  {:>country_w$}  {:>value_w$}",
                i, row.country, value
            )?;
        }
        Ok(())
    }
}

/// Execute `sql` and map each row by position onto (Country, GDP_USD_billions).
/// Queries of any other shape (e.g. `SELECT COUNT(*)`) fail with a query error.
#[tracing::instrument(level = "info", skip(conn))]
pub fn run_query(conn: &Connection, sql: &str) -> Result<QueryResult> {
    let query_err = |source| EtlError::Query {
        sql: sql.to_string(),
        source,
    };

    let mut stmt = conn.prepare(sql).map_err(query_err)?;
    let rows = stmt
        .query_map([], |row| {
            Ok(CountryGdp {
                country: row.get(0)?,
                gdp_usd_billions: row.get(1)?,
            })
        })
        .map_err(query_err)?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(query_err)?;

    info!(rows = rows.len(), "query done");
    Ok(QueryResult { rows })
}
