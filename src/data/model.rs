use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::NaiveDate;

// ---------------------------------------------------------------------------
// Value – a single cell of the challan table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring the dtypes the source CSVs carry.
/// Using `BTreeMap` / `BTreeSet` downstream so `Value` must be `Ord`.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Date(NaiveDate),
    Integer(i64),
    Float(f64),
    String(String),
    Null,
}

// -- Manual Eq/Ord so we can put Value in BTreeSet --

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use Value::*;
        fn discriminant(v: &Value) -> u8 {
            match v {
                Null => 0,
                Date(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                String(_) => 4,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Date(a), Date(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (String(a), String(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl std::hash::Hash for Value {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Date(d) => d.hash(state),
            Value::Integer(i) => i.hash(state),
            Value::Float(f) => f.to_bits().hash(state),
            Value::String(s) => s.hash(state),
            Value::Null => {}
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v:.2}"),
            Value::String(s) => write!(f, "{s}"),
            Value::Null => write!(f, "<null>"),
        }
    }
}

impl Value {
    /// Numeric view of the value, used by the aggregator and KPI calculator.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Value::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// Exact textual form for CSV export: dates ISO-8601, floats in Rust's
    /// shortest round-trip form, nulls as empty fields.
    pub fn csv_field(&self) -> String {
        match self {
            Value::Date(d) => d.format("%Y-%m-%d").to_string(),
            Value::Integer(i) => i.to_string(),
            // Keep a decimal point on whole floats so a re-load does not
            // reinterpret them as integers.
            Value::Float(v) if v.fract() == 0.0 && v.is_finite() => format!("{v:.1}"),
            Value::Float(v) => v.to_string(),
            Value::String(s) => s.clone(),
            Value::Null => String::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Record – one row of the table
// ---------------------------------------------------------------------------

/// A single challan row: normalized column name → typed cell value.
#[derive(Debug, Clone, Default)]
pub struct Record {
    pub fields: BTreeMap<String, Value>,
}

impl Record {
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.fields.get(column)
    }

    pub fn date(&self, column: &str) -> Option<NaiveDate> {
        self.fields.get(column).and_then(Value::as_date)
    }

    pub fn number(&self, column: &str) -> Option<f64> {
        self.fields.get(column).and_then(Value::as_f64)
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full parsed table with pre-computed column indices.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// All rows.
    pub records: Vec<Record>,
    /// Column names in source-file order (already normalized).
    pub column_names: Vec<String>,
    /// For each column the sorted set of unique values.
    pub unique_values: BTreeMap<String, BTreeSet<Value>>,
}

impl Dataset {
    /// Build column indices from the loaded rows. `column_names` preserves the
    /// header order of the source file so exports keep the original layout.
    pub fn from_records(records: Vec<Record>, column_names: Vec<String>) -> Self {
        let mut unique_values: BTreeMap<String, BTreeSet<Value>> = BTreeMap::new();
        for rec in &records {
            for (col, val) in &rec.fields {
                unique_values
                    .entry(col.clone())
                    .or_default()
                    .insert(val.clone());
            }
        }
        Dataset {
            records,
            column_names,
            unique_values,
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.column_names.iter().any(|c| c == column)
    }

    /// Derive a new dataset from the rows at the given indices. Filtering
    /// never mutates; each stage works on a fresh view.
    pub fn select(&self, indices: &[usize]) -> Dataset {
        let records = indices
            .iter()
            .filter_map(|&i| self.records.get(i).cloned())
            .collect();
        Dataset::from_records(records, self.column_names.clone())
    }

    /// Unique string labels of a column, used for category filter widgets.
    pub fn labels(&self, column: &str) -> Vec<String> {
        self.unique_values
            .get(column)
            .map(|vals| vals.iter().map(Value::to_string).collect())
            .unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Schema – which well-known columns the dataset actually carries
// ---------------------------------------------------------------------------

/// Column capabilities resolved once per load. Every downstream stage checks
/// this instead of probing the dataset ad hoc; an absent column means the
/// dependent computation is skipped and its zero/empty default is returned.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    /// Date column, if present.
    pub date: Option<String>,
    /// Category column: `violation_type` when present, otherwise the first
    /// text-valued column.
    pub category: Option<String>,
    /// All numeric columns, in source order.
    pub numeric: Vec<String>,
}

pub const DATE_COLUMN: &str = "date";
pub const CATEGORY_COLUMN: &str = "violation_type";
pub const COUNT_COLUMN: &str = "challan_count";
pub const AMOUNT_COLUMN: &str = "total_amount";

impl Schema {
    pub fn resolve(dataset: &Dataset) -> Self {
        let date = dataset
            .has_column(DATE_COLUMN)
            .then(|| DATE_COLUMN.to_string());

        let numeric: Vec<String> = dataset
            .column_names
            .iter()
            .filter(|col| {
                dataset.unique_values.get(*col).is_some_and(|vals| {
                    vals.iter()
                        .any(|v| matches!(v, Value::Integer(_) | Value::Float(_)))
                })
            })
            .cloned()
            .collect();

        let category = if dataset.has_column(CATEGORY_COLUMN) {
            Some(CATEGORY_COLUMN.to_string())
        } else {
            // Generic fallback: first column holding text values.
            dataset
                .column_names
                .iter()
                .find(|col| {
                    dataset
                        .unique_values
                        .get(*col)
                        .is_some_and(|vals| vals.iter().any(|v| matches!(v, Value::String(_))))
                })
                .cloned()
        };

        Schema {
            date,
            category,
            numeric,
        }
    }

    /// Default measure column for KPIs and charts: `challan_count` when
    /// present, otherwise the first numeric column.
    pub fn default_measure(&self) -> Option<String> {
        if self.numeric.iter().any(|c| c == COUNT_COLUMN) {
            return Some(COUNT_COLUMN.to_string());
        }
        self.numeric.first().cloned()
    }
}
