use anyhow::{Context, Result};
use gdpscraper::{config::TABLE_NAME, duck, query};
use std::{env, process::exit};

fn main() {
    // Expect a database path and an optional query; defaults to the full table.
    // The query must return (Country, GDP_USD_billions) rows, e.g. a filter on the table.
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 || args.len() > 3 {
        eprintln!("Usage: {} <DB_FILE> [SQL]", args[0]);
        eprintln!("  SQL must select (Country, GDP_USD_billions), e.g. SELECT * FROM {} WHERE ...", TABLE_NAME);
        exit(1);
    }
    let sql = args
        .get(2)
        .cloned()
        .unwrap_or_else(|| query::select_all_sql(TABLE_NAME));

    if let Err(e) = inspect(&args[1], &sql) {
        eprintln!("Error: {:?}", e);
        exit(1);
    }
}

/// Run `sql` against the database at `path` and print the rows as a table.
fn inspect(path: &str, sql: &str) -> Result<()> {
    let conn = duck::open_disk_db(path).with_context(|| format!("opening {}", path))?;
    let result = query::run_query(&conn, sql)
        .context("query must return (Country, GDP_USD_billions) columns")?;

    println!("=== {} ===", sql);
    println!("{}", result);
    println!("({} rows)", result.len());

    duck::close(conn)?;
    Ok(())
}
