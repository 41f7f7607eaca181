//! CSV decoding for the sample metadata table.
//!
//! # Invariants
//! - The first record is the header; column order is preserved.
//! - Blank headers become `Unnamed: <index>`; repeated headers get `.1`, `.2`
//!   suffixes so every column key is unique.
//! - Short rows are padded with nulls; long rows are rejected.
//! - Cells are typed one by one: missing markers -> null, then integer,
//!   float, boolean, and string as the fallback.

use crate::model::sections::{SampleRow, SampleTable};
use crate::service::error::{ServiceError, ServiceResult};
use csv::{ReaderBuilder, Trim};
use serde_json::{Number, Value};
use std::collections::HashSet;
use std::io::Read;

const MISSING_MARKERS: &[&str] = &["", "NA", "N/A", "n/a", "NaN", "nan", "null", "NULL", "None"];

/// Parses a CSV stream with a header row into a sample table.
pub fn parse_samples_csv<R: Read>(reader: R) -> ServiceResult<SampleTable> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    if headers.is_empty() {
        return Err(ServiceError::InvalidCsv("missing header row".to_string()));
    }
    let columns = unique_columns(headers.iter());

    let mut rows = Vec::new();
    for (index, record) in csv_reader.records().enumerate() {
        let record = record?;
        if record.len() > columns.len() {
            return Err(ServiceError::InvalidCsv(format!(
                "row {} has {} fields, header has {}",
                index + 1,
                record.len(),
                columns.len()
            )));
        }

        let mut row = SampleRow::new();
        for (position, column) in columns.iter().enumerate() {
            let value = record.get(position).map_or(Value::Null, infer_cell);
            row.insert(column.clone(), value);
        }
        rows.push(row);
    }

    Ok(SampleTable {
        columns,
        rows,
        source_name: None,
        imported_at: None,
    })
}

fn unique_columns<'a>(headers: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut columns = Vec::new();
    for (index, header) in headers.enumerate() {
        let base = if header.is_empty() {
            format!("Unnamed: {index}")
        } else {
            header.to_string()
        };

        let mut candidate = base.clone();
        let mut suffix = 1;
        while !seen.insert(candidate.clone()) {
            candidate = format!("{base}.{suffix}");
            suffix += 1;
        }
        columns.push(candidate);
    }
    columns
}

/// Infers a typed JSON value for one trimmed CSV cell.
pub fn infer_cell(raw: &str) -> Value {
    if MISSING_MARKERS.contains(&raw) {
        return Value::Null;
    }
    if let Ok(integer) = raw.parse::<i64>() {
        return Value::Number(integer.into());
    }
    if let Ok(float) = raw.parse::<f64>() {
        if let Some(number) = Number::from_f64(float) {
            return Value::Number(number);
        }
    }
    if raw.eq_ignore_ascii_case("true") {
        return Value::Bool(true);
    }
    if raw.eq_ignore_ascii_case("false") {
        return Value::Bool(false);
    }
    Value::String(raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::{infer_cell, parse_samples_csv};
    use crate::service::error::ServiceError;
    use serde_json::{json, Value};

    #[test]
    fn infers_cell_types() {
        assert_eq!(infer_cell(""), Value::Null);
        assert_eq!(infer_cell("NA"), Value::Null);
        assert_eq!(infer_cell("42"), json!(42));
        assert_eq!(infer_cell("-1.5"), json!(-1.5));
        assert_eq!(infer_cell("TRUE"), json!(true));
        assert_eq!(infer_cell("liver"), json!("liver"));
        assert_eq!(infer_cell("inf"), json!("inf"));
    }

    #[test]
    fn parses_rows_in_header_order() {
        let csv = "sample_id,tissue,age\nS1, liver ,34\nS2,kidney,\n";
        let table = parse_samples_csv(csv.as_bytes()).expect("csv should parse");
        assert_eq!(table.columns, vec!["sample_id", "tissue", "age"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0]["tissue"], json!("liver"));
        assert_eq!(table.rows[0]["age"], json!(34));
        assert_eq!(table.rows[1]["age"], Value::Null);
    }

    #[test]
    fn pads_short_rows_and_renames_duplicate_headers() {
        let csv = "id,id,\nA\n";
        let table = parse_samples_csv(csv.as_bytes()).expect("csv should parse");
        assert_eq!(table.columns, vec!["id", "id.1", "Unnamed: 2"]);
        assert_eq!(table.rows[0]["id"], json!("A"));
        assert_eq!(table.rows[0]["id.1"], Value::Null);
    }

    #[test]
    fn header_only_csv_yields_empty_table() {
        let table = parse_samples_csv("a,b\n".as_bytes()).expect("csv should parse");
        assert_eq!(table.columns.len(), 2);
        assert!(table.is_empty());
    }

    #[test]
    fn rejects_long_rows_and_empty_input() {
        let err = parse_samples_csv("a,b\n1,2,3\n".as_bytes()).expect_err("long row must fail");
        assert!(matches!(err, ServiceError::InvalidCsv(message) if message.contains("row 1")));

        let err = parse_samples_csv("".as_bytes()).expect_err("empty input must fail");
        assert!(matches!(err, ServiceError::InvalidCsv(_)));
    }
}
