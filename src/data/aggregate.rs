use std::collections::HashMap;

use chrono::NaiveDate;

use super::model::{Dataset, Schema, Value};

// ---------------------------------------------------------------------------
// Group-by over the filtered view
// ---------------------------------------------------------------------------

/// How the measure column is folded per group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregate {
    Sum,
    Mean,
}

/// One aggregated group: display label of the grouping value plus the folded
/// measure.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub label: String,
    pub value: f64,
}

/// Result of a group-by: groups sorted descending by value, ties keeping
/// first-encounter order.
#[derive(Debug, Clone, Default)]
pub struct AggregationResult {
    pub groups: Vec<Group>,
}

impl AggregationResult {
    /// Keep only the N highest-valued groups (fewer if fewer exist).
    pub fn top_n(mut self, n: usize) -> Self {
        self.groups.truncate(n);
        self
    }
}

/// Group the selected rows by `group_col`, fold `measure_col` per group, and
/// sort groups descending by the folded value. Rows where the measure is
/// missing or non-numeric are skipped. If either column is absent from the
/// dataset, the result is empty rather than an error.
pub fn group_measure(
    dataset: &Dataset,
    indices: &[usize],
    group_col: &str,
    measure_col: &str,
    agg: Aggregate,
) -> AggregationResult {
    if !dataset.has_column(group_col) || !dataset.has_column(measure_col) {
        return AggregationResult::default();
    }

    // Accumulate in encounter order so the later stable sort keeps ties in
    // the order groups first appeared.
    let mut order: Vec<(String, f64, usize)> = Vec::new();
    let mut by_label: HashMap<String, usize> = HashMap::new();

    for &i in indices {
        let Some(rec) = dataset.records.get(i) else {
            continue;
        };
        let Some(measure) = rec.number(measure_col) else {
            continue;
        };
        let label = rec.get(group_col).map(Value::to_string).unwrap_or_default();

        match by_label.get(&label) {
            Some(&slot) => {
                order[slot].1 += measure;
                order[slot].2 += 1;
            }
            None => {
                by_label.insert(label.clone(), order.len());
                order.push((label, measure, 1));
            }
        }
    }

    let mut groups: Vec<Group> = order
        .into_iter()
        .map(|(label, sum, count)| Group {
            label,
            value: match agg {
                Aggregate::Sum => sum,
                Aggregate::Mean => sum / count as f64,
            },
        })
        .collect();

    // Vec::sort_by is stable.
    groups.sort_by(|a, b| b.value.total_cmp(&a.value));

    AggregationResult { groups }
}

// ---------------------------------------------------------------------------
// Chronological series
// ---------------------------------------------------------------------------

/// Per-date sums of a measure over the selected rows, sorted chronologically.
/// Shared by the KPI growth computation and the line/area charts. Rows with
/// unparseable dates are excluded; an unresolved date column yields an empty
/// series.
pub fn series_by_date(
    dataset: &Dataset,
    indices: &[usize],
    schema: &Schema,
    measure_col: &str,
) -> Vec<(NaiveDate, f64)> {
    let Some(date_col) = schema.date.as_deref() else {
        return Vec::new();
    };
    if !dataset.has_column(measure_col) {
        return Vec::new();
    }

    let mut by_date: std::collections::BTreeMap<NaiveDate, f64> = std::collections::BTreeMap::new();
    for &i in indices {
        let Some(rec) = dataset.records.get(i) else {
            continue;
        };
        let (Some(d), Some(v)) = (rec.date(date_col), rec.number(measure_col)) else {
            continue;
        };
        *by_date.entry(d).or_insert(0.0) += v;
    }
    by_date.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::testutil::{dataset, date, sample_dataset};

    fn all(ds: &Dataset) -> Vec<usize> {
        (0..ds.len()).collect()
    }

    #[test]
    fn sums_per_group_sorted_descending() {
        let ds = dataset(&[
            &[
                ("violation_type", Value::String("Signal".into())),
                ("challan_count", Value::Integer(2)),
            ],
            &[
                ("violation_type", Value::String("Speeding".into())),
                ("challan_count", Value::Integer(9)),
            ],
            &[
                ("violation_type", Value::String("Signal".into())),
                ("challan_count", Value::Integer(3)),
            ],
        ]);
        let result = group_measure(&ds, &all(&ds), "violation_type", "challan_count", Aggregate::Sum);
        let labels: Vec<&str> = result.groups.iter().map(|g| g.label.as_str()).collect();
        assert_eq!(labels, vec!["Speeding", "Signal"]);
        assert_eq!(result.groups[1].value, 5.0);
    }

    #[test]
    fn top_n_truncates_and_scenario_holds() {
        let ds = sample_dataset();
        let result = group_measure(&ds, &all(&ds), "violation_type", "challan_count", Aggregate::Sum)
            .top_n(1);
        assert_eq!(result.groups.len(), 1);
        assert_eq!(result.groups[0].label, "Speeding");
        assert_eq!(result.groups[0].value, 10.0);
    }

    #[test]
    fn returned_sums_never_exceed_column_total() {
        let ds = sample_dataset();
        let result = group_measure(&ds, &all(&ds), "violation_type", "challan_count", Aggregate::Sum)
            .top_n(1);
        let returned: f64 = result.groups.iter().map(|g| g.value).sum();
        assert!(returned <= 15.0);
    }

    #[test]
    fn ties_keep_encounter_order() {
        let ds = dataset(&[
            &[
                ("violation_type", Value::String("Zebra".into())),
                ("challan_count", Value::Integer(4)),
            ],
            &[
                ("violation_type", Value::String("Alpha".into())),
                ("challan_count", Value::Integer(4)),
            ],
        ]);
        let result = group_measure(&ds, &all(&ds), "violation_type", "challan_count", Aggregate::Sum);
        let labels: Vec<&str> = result.groups.iter().map(|g| g.label.as_str()).collect();
        assert_eq!(labels, vec!["Zebra", "Alpha"]);
    }

    #[test]
    fn mean_divides_by_group_size() {
        let ds = dataset(&[
            &[
                ("violation_type", Value::String("Signal".into())),
                ("total_amount", Value::Float(100.0)),
            ],
            &[
                ("violation_type", Value::String("Signal".into())),
                ("total_amount", Value::Float(300.0)),
            ],
        ]);
        let result = group_measure(&ds, &all(&ds), "violation_type", "total_amount", Aggregate::Mean);
        assert_eq!(result.groups[0].value, 200.0);
    }

    #[test]
    fn missing_column_yields_empty_result() {
        let ds = sample_dataset();
        let result = group_measure(&ds, &all(&ds), "no_such", "challan_count", Aggregate::Sum);
        assert!(result.groups.is_empty());
        let result = group_measure(&ds, &all(&ds), "violation_type", "no_such", Aggregate::Sum);
        assert!(result.groups.is_empty());
    }

    #[test]
    fn date_series_is_chronological() {
        let ds = sample_dataset();
        let schema = crate::data::model::Schema::resolve(&ds);
        let series = series_by_date(&ds, &all(&ds), &schema, "total_amount");
        assert_eq!(
            series,
            vec![(date(2024, 1, 1), 5000.0), (date(2024, 1, 2), 2000.0)]
        );
    }
}
