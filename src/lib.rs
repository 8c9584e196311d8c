//! Scrapes the nominal GDP table from an archived Wikipedia page, converts
//! the IMF estimates from millions to billions of USD, and loads them into a
//! CSV file and a DuckDB table, logging each stage to an append-only file.

pub mod config;
pub mod duck;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod load;
pub mod pipeline;
pub mod progress;
pub mod query;
pub mod transform;

pub use config::{Config, RowOrder, TableLocator};
pub use error::{EtlError, FailureKind};
pub use extract::Record;
pub use pipeline::{Pipeline, RunReport};
pub use query::QueryResult;
pub use transform::CountryGdp;
