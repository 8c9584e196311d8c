use crate::{
    config::Config,
    duck,
    error::{FailureKind, Policy, Result},
    extract::{self, Record},
    fetch, load,
    progress::{self, ProgressLog},
    query::{self, QueryResult},
    transform::{self, CountryGdp},
};
use duckdb::Connection;
use reqwest::blocking::Client;
use tracing::{info, warn};

/// What a finished run produced.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub rows: Vec<CountryGdp>,
    /// `(sql, result)` for each read-back query, in the order issued.
    pub queries: Vec<(String, QueryResult)>,
}

/// One extract → transform → load run. Owns the store connection, so it is
/// released when the pipeline is dropped, whichever stage failed.
pub struct Pipeline {
    config: Config,
    progress: ProgressLog,
    conn: Connection,
}

impl Pipeline {
    /// Validate the config and open the on-disk database.
    pub fn open(config: Config) -> Result<Self> {
        config.validate()?;
        let conn = duck::open_disk_db(&config.db_path)?;
        Ok(Self::with_connection(config, conn))
    }

    pub fn with_connection(config: Config, conn: Connection) -> Self {
        let progress = ProgressLog::new(config.log_path.clone());
        Self {
            config,
            progress,
            conn,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Full run against the configured URL.
    pub fn run(&self, client: &Client) -> Result<RunReport> {
        let outcome = self.begin().and_then(|()| {
            let html = fetch::fetch_html(client, &self.config.url)?;
            self.run_from_extract(&html)
        });
        self.settle(outcome)
    }

    /// Same as [`Pipeline::run`] but with the page already in hand.
    pub fn run_html(&self, html: &str) -> Result<RunReport> {
        let outcome = self.begin().and_then(|()| self.run_from_extract(html));
        self.settle(outcome)
    }

    fn begin(&self) -> Result<()> {
        self.progress.log(progress::ETL_STARTED)?;
        self.progress.log(progress::EXTRACT_STARTED)
    }

    /// Apply the failure policy; an aborted run gets a closing log line
    /// naming the kind of failure, unless the log itself is what failed.
    fn settle(&self, outcome: Result<RunReport>) -> Result<RunReport> {
        let err = match outcome {
            Ok(report) => return Ok(report),
            Err(err) => err,
        };

        let kind = err.kind();
        match kind.policy() {
            Policy::Abort => {
                warn!(?kind, error = %err, "run aborted");
                if kind != FailureKind::Log {
                    let line = format!("{} ({:?} failure)", progress::ETL_ABORTED, kind);
                    if let Err(log_err) = self.progress.log(&line) {
                        warn!(error = %log_err, "could not record abort");
                    }
                }
                Err(err)
            }
        }
    }

    fn run_from_extract(&self, html: &str) -> Result<RunReport> {
        let records = self.extract(html)?;
        self.progress.log(progress::EXTRACT_FINISHED)?;

        self.progress.log(progress::TRANSFORM_STARTED)?;
        let rows = transform::normalize(&records)?;
        self.progress.log(progress::TRANSFORM_FINISHED)?;

        self.progress.log(progress::LOAD_STARTED)?;
        load::load(
            &rows,
            &self.config.csv_path,
            &self.conn,
            &self.config.table_name,
        )?;
        self.progress.log(progress::LOAD_FINISHED)?;

        let mut queries = Vec::with_capacity(2);
        for (n, sql) in query::fixed_queries(&self.config.table_name)
            .into_iter()
            .enumerate()
        {
            self.progress.log(&format!("Run query {}", sql))?;
            let result = query::run_query(&self.conn, &sql)?;
            self.progress
                .log(&format!("Result{} {}", n + 1, result.to_json()))?;
            queries.push((sql, result));
        }

        self.progress.log(progress::ETL_FINISHED)?;
        info!(rows = rows.len(), "run complete");
        Ok(RunReport { rows, queries })
    }

    fn extract(&self, html: &str) -> Result<Vec<Record>> {
        let records = extract::extract_records(html, &self.config.extract)?;
        Ok(extract::order_records(records, self.config.order))
    }

    /// Close the store connection, surfacing any error from the shutdown.
    pub fn close(self) -> Result<()> {
        duck::close(self.conn)
    }
}
