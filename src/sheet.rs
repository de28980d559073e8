//! Remote attribute sheet (published CSV)

use csv::{ReaderBuilder, Trim};
use tracing::{info, warn};

use crate::error::LoadError;
use crate::models::AttributeRow;
use crate::store::DataSource;

pub async fn fetch_attribute_rows(
    source: &DataSource,
    client: &reqwest::Client,
    id_field: &str,
) -> Result<Vec<AttributeRow>, LoadError> {
    let text = source.read_to_string(client).await?;
    let rows = parse_attribute_rows(&text, id_field)?;
    info!("Parsed {} sheet rows from {}", rows.len(), source);
    Ok(rows)
}

/// Parse a CSV with a header row. Blank rows are dropped and malformed rows
/// skipped; a header without `id_field` fails the whole sheet.
pub fn parse_attribute_rows(text: &str, id_field: &str) -> Result<Vec<AttributeRow>, LoadError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::Headers)
        .from_reader(text.as_bytes());

    let headers = reader.headers()?.clone();
    if !headers.iter().any(|h| h == id_field) {
        return Err(LoadError::MissingHeader(id_field.to_string()));
    }

    let mut rows = Vec::new();
    let mut error_count = 0;

    for (i, record) in reader.records().enumerate() {
        match record {
            Ok(record) => {
                let row = AttributeRow::from_pairs(headers.iter().zip(record.iter()));
                if !row.is_blank() {
                    rows.push(row);
                }
            }
            Err(e) => {
                if error_count < 5 {
                    warn!("Failed to parse sheet row {}: {}", i + 1, e);
                }
                error_count += 1;
            }
        }
    }

    if error_count > 0 {
        warn!("Skipped {} malformed sheet rows", error_count);
    }

    Ok(rows)
}
