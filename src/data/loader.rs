use std::path::Path;
use std::sync::OnceLock;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde_json::Value as JsonValue;

use super::DataError;
use super::model::{Dataset, Record, Value};

/// Fixed-path dataset loaded at startup; File → Open… can replace it.
pub const DEFAULT_DATA_PATH: &str = "echallan_daily_data.csv";

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load a challan dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`  – header row plus one record per line (primary format)
/// * `.json` – records-oriented array `[{ "date": ..., ... }, ...]`
///
/// Column names are normalized (trimmed, spaces → underscores, lowercased)
/// and every cell is type-guessed. A file with zero data rows is an error;
/// callers must halt instead of working with an empty table.
pub fn load_file(path: &Path) -> Result<Dataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let dataset = match ext.as_str() {
        "csv" => load_csv(path)?,
        "json" => load_json(path)?,
        other => return Err(DataError::UnsupportedExtension(other.to_string()).into()),
    };

    if dataset.is_empty() {
        return Err(DataError::EmptyDataset(path.to_path_buf()).into());
    }
    Ok(dataset)
}

/// Process-lifetime cache of the default dataset: loaded once, then served
/// from memory for every later call. Invalidated only by restart. Re-running
/// the load is idempotent, so the race between `get` and `get_or_init` is
/// harmless.
pub fn cached_default() -> Result<&'static Dataset> {
    static CACHE: OnceLock<Dataset> = OnceLock::new();

    if let Some(ds) = CACHE.get() {
        return Ok(ds);
    }
    let dataset = load_file(Path::new(DEFAULT_DATA_PATH))
        .with_context(|| format!("loading {DEFAULT_DATA_PATH}"))?;
    Ok(CACHE.get_or_init(|| dataset))
}

// ---------------------------------------------------------------------------
// Column / cell normalization
// ---------------------------------------------------------------------------

/// Normalize a header: strip surrounding whitespace, replace internal spaces
/// with underscores, lowercase. `" Violation Type "` → `"violation_type"`.
pub fn normalize_column(raw: &str) -> String {
    raw.trim().replace(' ', "_").to_ascii_lowercase()
}

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%d-%m-%Y", "%d/%m/%Y"];

fn parse_date(s: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

/// Guess the type of a raw CSV cell. Dates are tried before numbers so that
/// `2024-01-01` never decays to a string of digits.
fn guess_value(s: &str) -> Value {
    let s = s.trim();
    if s.is_empty() {
        return Value::Null;
    }
    if let Some(d) = parse_date(s) {
        return Value::Date(d);
    }
    if let Ok(i) = s.parse::<i64>() {
        return Value::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return Value::Float(f);
    }
    Value::String(s.to_string())
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<Dataset> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(normalize_column)
        .collect();

    let mut records = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let row = result.with_context(|| format!("CSV row {row_no}"))?;
        let fields = headers
            .iter()
            .zip(row.iter())
            .map(|(col, cell)| (col.clone(), guess_value(cell)))
            .collect();
        records.push(Record { fields });
    }

    Ok(Dataset::from_records(records, headers))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "Date": "2024-01-01", "Violation Type": "Speeding", "Challan Count": 10 },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<Dataset> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let rows = root.as_array().context("Expected top-level JSON array")?;

    // Column order follows the first record.
    let mut column_names: Vec<String> = Vec::new();
    let mut records = Vec::with_capacity(rows.len());

    for (i, row) in rows.iter().enumerate() {
        let obj = row
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;

        let mut fields = std::collections::BTreeMap::new();
        for (key, val) in obj {
            let col = normalize_column(key);
            if !column_names.contains(&col) {
                column_names.push(col.clone());
            }
            fields.insert(col, json_to_value(val));
        }
        records.push(Record { fields });
    }

    Ok(Dataset::from_records(records, column_names))
}

fn json_to_value(val: &JsonValue) -> Value {
    match val {
        JsonValue::String(s) => match parse_date(s) {
            Some(d) => Value::Date(d),
            None => Value::String(s.clone()),
        },
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Integer(i)
            } else if let Some(f) = n.as_f64() {
                Value::Float(f)
            } else {
                Value::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => Value::String(b.to_string()),
        JsonValue::Null => Value::Null,
        other => Value::String(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::path::PathBuf;

    use super::*;
    use crate::data::testutil::date;

    fn temp_file(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("challan-board-{}-{name}", std::process::id()));
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn normalizes_headers() {
        assert_eq!(normalize_column("  Violation Type "), "violation_type");
        assert_eq!(normalize_column("Date"), "date");
        assert_eq!(normalize_column("Total Amount"), "total_amount");
    }

    #[test]
    fn loads_csv_with_typed_cells() {
        let path = temp_file(
            "typed.csv",
            "Date,Violation Type,Challan Count,Total Amount\n\
             2024-01-01,Speeding,10,5000.5\n\
             2024-01-02,Signal,5,2000\n",
        );
        let ds = load_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(ds.len(), 2);
        assert_eq!(
            ds.column_names,
            vec!["date", "violation_type", "challan_count", "total_amount"]
        );
        let first = &ds.records[0];
        assert_eq!(first.date("date"), Some(date(2024, 1, 1)));
        assert_eq!(first.get("challan_count"), Some(&Value::Integer(10)));
        assert_eq!(first.get("total_amount"), Some(&Value::Float(5000.5)));
        // 2000 has no decimal point, so it loads as an integer; the numeric
        // accessors still see it as 2000.0.
        assert_eq!(ds.records[1].number("total_amount"), Some(2000.0));
    }

    #[test]
    fn empty_file_is_an_error() {
        let path = temp_file("empty.csv", "Date,Violation Type\n");
        let err = load_file(&path).unwrap_err();
        std::fs::remove_file(&path).ok();
        assert!(matches!(
            err.downcast_ref::<DataError>(),
            Some(DataError::EmptyDataset(_))
        ));
    }

    #[test]
    fn unknown_extension_is_an_error() {
        let err = load_file(Path::new("data.parquet")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DataError>(),
            Some(DataError::UnsupportedExtension(_))
        ));
    }

    #[test]
    fn loads_records_oriented_json() {
        let path = temp_file(
            "rows.json",
            r#"[{"Date": "2024-01-01", "Violation Type": "Speeding", "Challan Count": 10}]"#,
        );
        let ds = load_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(ds.len(), 1);
        assert_eq!(ds.records[0].date("date"), Some(date(2024, 1, 1)));
        assert_eq!(
            ds.records[0].get("violation_type"),
            Some(&Value::String("Speeding".into()))
        );
    }

    #[test]
    fn malformed_dates_stay_text() {
        let path = temp_file(
            "baddate.csv",
            "Date,Challan Count\nnot-a-date,3\n2024-01-05,4\n",
        );
        let ds = load_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(ds.records[0].date("date"), None);
        assert_eq!(ds.records[1].date("date"), Some(date(2024, 1, 5)));
    }
}
