//! Data layer: core types, loading, filtering, aggregation, KPIs, export.
//!
//! Pipeline:
//! ```text
//!  .csv / .json
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  parse file → Dataset (normalized columns, typed cells)
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  filter   │  date range + category allow-list → row indices
//!   └──────────┘
//!        │
//!        ├────────────────┬──────────────┐
//!        ▼                ▼              ▼
//!   ┌──────────┐    ┌──────────┐   ┌──────────┐
//!   │ aggregate │    │   kpi     │   │  export   │
//!   └──────────┘    └──────────┘   └──────────┘
//! ```

use std::path::PathBuf;

use thiserror::Error;

pub mod aggregate;
pub mod export;
pub mod filter;
pub mod kpi;
pub mod loader;
pub mod model;

/// Hard failures of the data layer. Anything column-related is deliberately
/// absent: a missing column downgrades to a zero/empty result instead.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("dataset has no rows: {0}")]
    EmptyDataset(PathBuf),
    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),
}

#[cfg(test)]
pub(crate) mod testutil {
    use chrono::NaiveDate;

    use super::model::{Dataset, Record, Value};

    pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// Build a dataset from `(column, value)` rows, keeping the column order
    /// of the first row.
    pub fn dataset(rows: &[&[(&str, Value)]]) -> Dataset {
        let column_names: Vec<String> = rows
            .first()
            .map(|row| row.iter().map(|(c, _)| c.to_string()).collect())
            .unwrap_or_default();
        let records = rows
            .iter()
            .map(|row| Record {
                fields: row
                    .iter()
                    .map(|(c, v)| (c.to_string(), v.clone()))
                    .collect(),
            })
            .collect();
        Dataset::from_records(records, column_names)
    }

    /// The two-row scenario table used across the data-layer tests.
    pub fn sample_dataset() -> Dataset {
        dataset(&[
            &[
                ("date", Value::Date(date(2024, 1, 1))),
                ("violation_type", Value::String("Speeding".into())),
                ("challan_count", Value::Integer(10)),
                ("total_amount", Value::Float(5000.0)),
            ],
            &[
                ("date", Value::Date(date(2024, 1, 2))),
                ("violation_type", Value::String("Signal".into())),
                ("challan_count", Value::Integer(5)),
                ("total_amount", Value::Float(2000.0)),
            ],
        ])
    }
}
