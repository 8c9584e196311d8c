use crate::error::{EtlError, Result};
use crate::extract::Record;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

/// Column label of the value as scraped.
pub const MILLIONS_COLUMN: &str = "GDP_USD_millions";
/// Column label of the value after normalization.
pub const BILLIONS_COLUMN: &str = "GDP_USD_billions";
pub const COUNTRY_COLUMN: &str = "Country";

static DECIMAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-?\d+(\.\d+)?$").expect("decimal regex should parse"));

/// A country with its GDP in billions of US dollars.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountryGdp {
    #[serde(rename = "Country")]
    pub country: String,
    #[serde(rename = "GDP_USD_billions")]
    pub gdp_usd_billions: f64,
}

/// Convert every record from millions to billions.
#[tracing::instrument(level = "info", skip_all, fields(rows = records.len()))]
pub fn normalize(records: &[Record]) -> Result<Vec<CountryGdp>> {
    records
        .iter()
        .map(|r| {
            Ok(CountryGdp {
                country: r.country.clone(),
                gdp_usd_billions: millions_to_billions(&r.country, &r.gdp_raw)?,
            })
        })
        .collect()
}

/// `"25,462,700"` → `25462.7`. Rounds half away from zero at two decimals.
pub fn millions_to_billions(country: &str, raw: &str) -> Result<f64> {
    let millions = parse_grouped(raw).ok_or_else(|| EtlError::Numeric {
        country: country.to_string(),
        value: raw.to_string(),
    })?;
    // x/1000 at 2dp == round(x/10)/100; x/10 is exact for whole millions
    Ok((millions / 10.0).round() / 100.0)
}

/// Strip thousands separators and parse; `None` for anything but a plain decimal.
fn parse_grouped(raw: &str) -> Option<f64> {
    let cleaned = raw.trim().replace(',', "");
    if !DECIMAL.is_match(&cleaned) {
        return None;
    }
    cleaned.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;

    fn rec(country: &str, raw: &str) -> Record {
        Record {
            country: country.into(),
            gdp_raw: raw.into(),
        }
    }

    #[test]
    fn converts_and_rounds() {
        assert_eq!(millions_to_billions("a", "12,345").unwrap(), 12.35);
        assert_eq!(millions_to_billions("a", "1,000,000").unwrap(), 1000.0);
        assert_eq!(millions_to_billions("a", "1,500").unwrap(), 1.5);
        assert_eq!(millions_to_billions("a", "25,462,700").unwrap(), 25462.7);
        assert_eq!(millions_to_billions("a", "64").unwrap(), 0.06);
        assert_eq!(millions_to_billions("a", "65").unwrap(), 0.07);
    }

    #[test]
    fn normalize_keeps_order_and_names() {
        let out = normalize(&[rec("B", "2,000"), rec("A", "3,210")]).unwrap();
        assert_eq!(
            out,
            vec![
                CountryGdp {
                    country: "B".into(),
                    gdp_usd_billions: 2.0
                },
                CountryGdp {
                    country: "A".into(),
                    gdp_usd_billions: 3.21
                },
            ]
        );
    }

    #[test]
    fn malformed_values_are_numeric_failures() {
        for bad in ["", "n/a", "inf", "NaN", "1,2x3", "—"] {
            let err = normalize(&[rec("Testland", bad)]).unwrap_err();
            assert_eq!(err.kind(), FailureKind::Numeric, "value {:?}", bad);
        }
    }

    #[test]
    fn serializes_with_billions_label() {
        let json = serde_json::to_string(&CountryGdp {
            country: "Testland".into(),
            gdp_usd_billions: 1.5,
        })
        .unwrap();
        assert_eq!(json, r#"{"Country":"Testland","GDP_USD_billions":1.5}"#);
        assert!(!json.contains(MILLIONS_COLUMN));
    }
}
