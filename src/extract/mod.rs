use crate::config::{ExtractOptions, RowOrder, TableLocator};
use crate::error::{EtlError, Result};
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

/// Estimate cell placeholder for "no data".
pub const NO_DATA: &str = "—";
/// Aggregate row that is not a country.
pub const WORLD: &str = "World";

static TBODY: Lazy<Selector> = Lazy::new(|| Selector::parse("tbody").expect("selector should parse"));
static TD: Lazy<Selector> = Lazy::new(|| Selector::parse("td").expect("selector should parse"));

/// One kept table row, value still as printed on the page (USD millions).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub country: String,
    pub gdp_raw: String,
}

/// Parse `html` and pull the GDP rows out of the located table body.
#[tracing::instrument(level = "info", skip(html), fields(bytes = html.len()))]
pub fn extract_records(html: &str, opts: &ExtractOptions) -> Result<Vec<Record>> {
    let document = Html::parse_document(html);
    let tbody = locate_table(&document, opts)?;

    let mut records = Vec::new();
    for (i, row) in rows(tbody).skip(opts.header_rows).enumerate() {
        let cells: Vec<String> = row.select(&TD).map(cell_text).collect();
        let needed = opts.country_column.max(opts.estimate_column) + 1;
        if cells.len() < needed {
            return Err(EtlError::Structure(format!(
                "data row {} has {} cells, expected at least {}",
                i,
                cells.len(),
                needed
            )));
        }

        let country = &cells[opts.country_column];
        let estimate = &cells[opts.estimate_column];
        if estimate == NO_DATA || country == WORLD {
            continue;
        }

        debug!(%country, %estimate, "row");
        records.push(Record {
            country: country.clone(),
            gdp_raw: estimate.clone(),
        });
    }

    Ok(records)
}

/// Apply the configured ordering to an extracted dataset.
pub fn order_records(mut records: Vec<Record>, order: RowOrder) -> Vec<Record> {
    if order == RowOrder::Reversed {
        records.reverse();
    }
    records
}

fn locate_table<'a>(document: &'a Html, opts: &ExtractOptions) -> Result<ElementRef<'a>> {
    match &opts.locator {
        TableLocator::Position(index) => {
            let bodies: Vec<ElementRef<'a>> = document.select(&TBODY).collect();
            bodies.get(*index).copied().ok_or_else(|| {
                EtlError::Structure(format!(
                    "found {} table bodies, need at least {}",
                    bodies.len(),
                    index + 1
                ))
            })
        }
        TableLocator::HeaderContains(needle) => document
            .select(&TBODY)
            .find(|tbody| {
                rows(*tbody)
                    .take(opts.header_rows)
                    .any(|row| row.text().collect::<String>().contains(needle.as_str()))
            })
            .ok_or_else(|| {
                EtlError::Structure(format!("no table body with a header mentioning {:?}", needle))
            }),
    }
}

/// Direct `tr` children only, so nested tables don't leak rows in.
fn rows(tbody: ElementRef<'_>) -> impl Iterator<Item = ElementRef<'_>> {
    tbody
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|el| el.value().name() == "tr")
}

/// Every text node trimmed, then joined with nothing in between.
fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text().map(str::trim).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;

    fn page(gdp_rows: &str) -> String {
        format!(
            r#"<html><body>
<table><tbody><tr><td>nav</td></tr></tbody></table>
<table><tbody><tr><td>legend</td></tr></tbody></table>
<table class="wikitable">
<tbody>
<tr><th>Country/Territory</th><th>UN region</th><th>IMF</th><th>World Bank</th></tr>
<tr><th></th><th></th><th>Estimate</th><th>Year</th></tr>
{gdp_rows}
</tbody>
</table>
</body></html>"#
        )
    }

    #[test]
    fn skips_sentinel_and_world_rows() {
        let html = page(
            r#"
<tr><td>World</td><td>—</td><td>100,562,011</td><td>2023</td></tr>
<tr><td><span> </span><a href="/wiki/US">United States</a></td><td>Americas</td><td>26,854,599</td><td>2023</td></tr>
<tr><td>Afghanistan</td><td>Asia</td><td>—</td><td>—</td></tr>
<tr><td><a>Japan</a><sup>[n 1]</sup></td><td>Asia</td><td> 4,409,738 </td><td>2023</td></tr>
"#,
        );
        let records = extract_records(&html, &ExtractOptions::default()).unwrap();
        assert_eq!(
            records,
            vec![
                Record {
                    country: "United States".into(),
                    gdp_raw: "26,854,599".into()
                },
                Record {
                    country: "Japan[n 1]".into(),
                    gdp_raw: "4,409,738".into()
                },
            ]
        );
        assert!(records
            .iter()
            .all(|r| r.gdp_raw != NO_DATA && r.country != WORLD));
    }

    #[test]
    fn reversed_order_puts_last_row_first() {
        let html = page(
            r#"
<tr><td>A</td><td>x</td><td>1</td></tr>
<tr><td>B</td><td>x</td><td>2</td></tr>
"#,
        );
        let records = extract_records(&html, &ExtractOptions::default()).unwrap();
        let reversed = order_records(records.clone(), RowOrder::Reversed);
        assert_eq!(reversed[0].country, "B");
        assert_eq!(order_records(records, RowOrder::Document)[0].country, "A");
    }

    #[test]
    fn too_few_table_bodies_is_structural() {
        let html = "<table><tbody><tr><td>a</td></tr></tbody></table>";
        let err = extract_records(html, &ExtractOptions::default()).unwrap_err();
        assert_eq!(err.kind(), FailureKind::Structure);
    }

    #[test]
    fn short_row_is_structural() {
        let html = page("<tr><td>Testland</td><td>Nowhere</td></tr>");
        let err = extract_records(&html, &ExtractOptions::default()).unwrap_err();
        assert_eq!(err.kind(), FailureKind::Structure);
    }

    #[test]
    fn header_locator_finds_table_regardless_of_position() {
        let html = format!(
            "<table><tbody><tr><td>extra banner</td></tr></tbody></table>{}",
            page("<tr><td>Testland</td><td>x</td><td>1,500</td></tr>")
        );
        let opts = ExtractOptions {
            locator: TableLocator::HeaderContains("IMF".into()),
            ..ExtractOptions::default()
        };
        let records = extract_records(&html, &opts).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].country, "Testland");

        // positional lookup now lands on the legend table instead
        let positional = extract_records(&html, &ExtractOptions::default());
        assert!(positional.is_err() || positional.unwrap().is_empty());
    }

    #[test]
    fn header_locator_without_match_is_structural() {
        let opts = ExtractOptions {
            locator: TableLocator::HeaderContains("Nominal per capita".into()),
            ..ExtractOptions::default()
        };
        let err = extract_records(&page(""), &opts).unwrap_err();
        assert_eq!(err.kind(), FailureKind::Structure);
    }
}
