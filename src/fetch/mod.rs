// src/fetch/mod.rs

use crate::error::{EtlError, Result};
use reqwest::blocking::Client;
use tracing::info;
use url::Url;

/// Blocking client with transport defaults; no retry, no timeout override.
pub fn client() -> Result<Client> {
    Client::builder().build().map_err(EtlError::HttpClient)
}

/// Single GET of `url`, returning the body as text.
/// Non-2xx statuses are errors.
#[tracing::instrument(level = "info", skip(client))]
pub fn fetch_html(client: &Client, url: &str) -> Result<String> {
    let parsed =
        Url::parse(url).map_err(|e| EtlError::Config(format!("source url {:?}: {}", url, e)))?;

    let network = |source| EtlError::Network {
        url: url.to_string(),
        source,
    };
    let html = client
        .get(parsed)
        .send()
        .map_err(network)?
        .error_for_status()
        .map_err(network)?
        .text()
        .map_err(network)?;

    info!(bytes = html.len(), "fetched page");
    Ok(html)
}
