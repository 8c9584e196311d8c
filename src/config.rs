use crate::error::{EtlError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::PathBuf;
use url::Url;

/// Archived snapshot of the nominal GDP list; the live page has drifted.
pub const SOURCE_URL: &str = "https://web.archive.org/web/20230902185326/https://en.wikipedia.org/wiki/List_of_countries_by_GDP_%28nominal%29";
pub const CSV_PATH: &str = "Countries_by_GDP.csv";
pub const DB_PATH: &str = "World_Economies.db";
pub const TABLE_NAME: &str = "Countries_by_GDP";
pub const LOG_PATH: &str = "gdp_logs.txt";

/// The IMF table is the third `tbody` on the archived page.
pub const GDP_TBODY_INDEX: usize = 2;
pub const HEADER_ROWS: usize = 2;
pub const COUNTRY_COLUMN: usize = 0;
pub const ESTIMATE_COLUMN: usize = 2;

static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier regex should parse"));

/// How the GDP table body is found in the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableLocator {
    /// n-th `tbody` in document order (zero-based).
    Position(usize),
    /// First `tbody` whose header rows mention this text.
    HeaderContains(String),
}

impl Default for TableLocator {
    fn default() -> Self {
        Self::Position(GDP_TBODY_INDEX)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractOptions {
    pub locator: TableLocator,
    pub header_rows: usize,
    pub country_column: usize,
    pub estimate_column: usize,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            locator: TableLocator::default(),
            header_rows: HEADER_ROWS,
            country_column: COUNTRY_COLUMN,
            estimate_column: ESTIMATE_COLUMN,
        }
    }
}

/// Row order of the extracted dataset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RowOrder {
    #[default]
    Document,
    /// Last row first, matching artifacts produced by the older scraper.
    Reversed,
}

/// Everything a run needs; `Default` is the compiled-in setup the binary uses.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub url: String,
    pub csv_path: PathBuf,
    pub db_path: PathBuf,
    pub table_name: String,
    pub log_path: PathBuf,
    pub extract: ExtractOptions,
    pub order: RowOrder,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            url: SOURCE_URL.to_string(),
            csv_path: PathBuf::from(CSV_PATH),
            db_path: PathBuf::from(DB_PATH),
            table_name: TABLE_NAME.to_string(),
            log_path: PathBuf::from(LOG_PATH),
            extract: ExtractOptions::default(),
            order: RowOrder::default(),
        }
    }
}

impl Config {
    /// Reject settings that would break the fetch or end up inside SQL text.
    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.url)
            .map_err(|e| EtlError::Config(format!("source url {:?}: {}", self.url, e)))?;

        if !IDENTIFIER.is_match(&self.table_name) {
            return Err(EtlError::Config(format!(
                "table name {:?} is not a plain identifier",
                self.table_name
            )));
        }

        let ex = &self.extract;
        if ex.country_column == ex.estimate_column {
            return Err(EtlError::Config(
                "country and estimate columns must differ".into(),
            ));
        }
        if let TableLocator::HeaderContains(needle) = &ex.locator {
            if needle.trim().is_empty() {
                return Err(EtlError::Config("header locator text is empty".into()));
            }
        }
        Ok(())
    }
}
