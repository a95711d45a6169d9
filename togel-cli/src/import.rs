use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use csv::StringRecord;

use togel_engine::models::{CSV_COLUMNS, RawRow};

struct ColumnIndices {
    user: usize,
    inv: usize,
    bet: usize,
    x: usize,
    bayar: usize,
    tebak: usize,
}

fn find_required_columns(headers: &StringRecord) -> Result<ColumnIndices> {
    let find = |name: &str| -> Result<usize> {
        headers
            .iter()
            .position(|h| h.trim_start_matches('\u{feff}') == name)
            .ok_or_else(|| anyhow!("Required column '{}' not found (expected {})", name, CSV_COLUMNS.join(", ")))
    };

    Ok(ColumnIndices {
        user: find("User")?,
        inv: find("Inv")?,
        bet: find("Bet")?,
        x: find("x")?,
        bayar: find("Bayar")?,
        tebak: find("Tebak")?,
    })
}

fn parse_record(record: &StringRecord, cols: &ColumnIndices) -> RawRow {
    let get = |idx: usize| record.get(idx).unwrap_or_default().to_string();
    RawRow {
        user: get(cols.user),
        inv: get(cols.inv),
        bet: get(cols.bet),
        x: get(cols.x),
        bayar: get(cols.bayar),
        tebak: get(cols.tebak),
    }
}

#[derive(Debug, Default)]
pub struct ImportSummary {
    pub total_records: u32,
    pub accepted: u32,
    pub unreadable: u32,
}

pub fn read_rows<R: Read>(input: R) -> Result<(Vec<RawRow>, ImportSummary)> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(input);

    let headers = reader.headers().context("Cannot read CSV header")?.clone();
    let mut summary = ImportSummary::default();
    if headers.is_empty() {
        return Ok((Vec::new(), summary));
    }
    let cols = find_required_columns(&headers)?;

    let mut rows = Vec::new();
    for record_result in reader.records() {
        summary.total_records += 1;
        match record_result {
            Ok(record) => {
                rows.push(parse_record(&record, &cols));
                summary.accepted += 1;
            }
            Err(e) => {
                log::warn!("Skipping unreadable line {}: {}", summary.total_records, e);
                summary.unreadable += 1;
            }
        }
    }

    Ok((rows, summary))
}

pub fn import_csv(path: &Path) -> Result<(Vec<RawRow>, ImportSummary)> {
    let file = std::fs::File::open(path).with_context(|| format!("Cannot open {:?}", path))?;
    read_rows(file).with_context(|| format!("Error processing CSV file {:?}", path))
}
