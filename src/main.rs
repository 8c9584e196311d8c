use anyhow::{Context, Result};
use gdpscraper::{fetch, Config, Pipeline};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

fn main() {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();
    info!("startup");

    if let Err(e) = run() {
        error!("{:#}", e);
        eprintln!("Error: {:?}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    // ─── 2) compiled-in configuration ────────────────────────────────
    let config = Config::default();
    info!(url = %config.url, db = %config.db_path.display(), "configured");

    // ─── 3) open the store for the whole run ─────────────────────────
    let client = fetch::client().context("building HTTP client")?;
    let pipeline = Pipeline::open(config).context("opening pipeline")?;

    // ─── 4) extract → transform → load → read back ───────────────────
    let report = pipeline
        .run(&client)
        .with_context(|| format!("ETL run against {}", pipeline.config().url))?;
    for (sql, result) in &report.queries {
        info!(%sql, rows = result.len(), "read back");
    }

    // ─── 5) release the connection ───────────────────────────────────
    pipeline.close().context("closing database")?;
    info!(rows = report.rows.len(), "all done");
    Ok(())
}
