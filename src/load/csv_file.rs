use crate::error::{EtlError, Result};
use crate::transform::{CountryGdp, BILLIONS_COLUMN, COUNTRY_COLUMN};
use csv::{ReaderBuilder, WriterBuilder};
use std::path::Path;

/// Overwrite `path` with an indexed CSV: `,Country,GDP_USD_billions` then
/// `<i>,<country>,<gdp>` starting at 0.
#[tracing::instrument(level = "info", skip_all, fields(path = %path.display(), rows = rows.len()))]
pub fn write_csv(path: &Path, rows: &[CountryGdp]) -> Result<()> {
    let csv_err = |source| EtlError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut wtr = WriterBuilder::new().from_path(path).map_err(csv_err)?;

    wtr.write_record(["", COUNTRY_COLUMN, BILLIONS_COLUMN])
        .map_err(csv_err)?;
    for (i, row) in rows.iter().enumerate() {
        wtr.write_record([
            i.to_string(),
            row.country.clone(),
            format_value(row.gdp_usd_billions),
        ])
        .map_err(csv_err)?;
    }

    wtr.flush().map_err(|source| EtlError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Read a file produced by [`write_csv`], dropping the index column.
pub fn read_csv(path: &Path) -> Result<Vec<CountryGdp>> {
    let csv_err = |source| EtlError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(csv_err)?;

    let mut out = Vec::new();
    for (idx, result) in rdr.records().enumerate() {
        let record = result.map_err(csv_err)?;
        let (Some(country), Some(value)) = (record.get(1), record.get(2)) else {
            return Err(EtlError::Structure(format!(
                "{} record {} has {} fields",
                path.display(),
                idx,
                record.len()
            )));
        };
        let gdp_usd_billions = value.parse().map_err(|_| EtlError::Numeric {
            country: country.to_string(),
            value: value.to_string(),
        })?;
        out.push(CountryGdp {
            country: country.to_string(),
            gdp_usd_billions,
        });
    }
    Ok(out)
}

/// Whole numbers keep a trailing `.0` so the column always reads as float.
fn format_value(v: f64) -> String {
    if v.is_finite() && v.fract() == 0.0 {
        format!("{:.1}", v)
    } else {
        v.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::fs;
    use tempfile::tempdir;

    fn sample() -> Vec<CountryGdp> {
        vec![
            CountryGdp {
                country: "United States".into(),
                gdp_usd_billions: 25462.7,
            },
            CountryGdp {
                country: "Korea, South".into(),
                gdp_usd_billions: 1000.0,
            },
            CountryGdp {
                country: "Tuvalu".into(),
                gdp_usd_billions: 0.06,
            },
        ]
    }

    #[test]
    fn writes_index_header_and_rows() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("Countries_by_GDP.csv");
        write_csv(&path, &sample())?;

        let text = fs::read_to_string(&path)?;
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                ",Country,GDP_USD_billions",
                "0,United States,25462.7",
                "1,\"Korea, South\",1000.0",
                "2,Tuvalu,0.06",
            ]
        );
        Ok(())
    }

    #[test]
    fn round_trip_reproduces_pairs() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("out.csv");
        let rows = sample();
        write_csv(&path, &rows)?;
        assert_eq!(read_csv(&path)?, rows);
        Ok(())
    }

    #[test]
    fn rewrite_overwrites_previous_content() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("out.csv");
        write_csv(&path, &sample())?;
        write_csv(&path, &sample()[..1])?;
        assert_eq!(read_csv(&path)?.len(), 1);
        Ok(())
    }
}
