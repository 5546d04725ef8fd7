use super::aggregate::series_by_date;
use super::model::{Dataset, Schema};

// ---------------------------------------------------------------------------
// KPI summary over the filtered view
// ---------------------------------------------------------------------------

/// Headline figures for one numeric column. Total, average, and maximum are
/// zero when the column is absent or no rows are selected; this is never an
/// error. Growth is `None` when undefined.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KpiSet {
    pub total: f64,
    pub average: f64,
    pub maximum: f64,
    /// First-to-last percentage change of the per-date sums. `None` when
    /// fewer than two distinct date groups exist, or when the first value is
    /// exactly zero (the percentage is undefined in that case).
    pub growth_pct: Option<f64>,
}

impl KpiSet {
    /// Growth as the dashboards render it: undefined reads as zero.
    pub fn growth_or_zero(&self) -> f64 {
        self.growth_pct.unwrap_or(0.0)
    }
}

/// Compute the KPI set for `column` over the selected rows.
///
/// Growth groups the rows by date, sums the measure per date, sorts
/// chronologically, and takes `(last - first) / first * 100`.
pub fn compute(dataset: &Dataset, indices: &[usize], schema: &Schema, column: &str) -> KpiSet {
    if !dataset.has_column(column) {
        return KpiSet::default();
    }

    let values: Vec<f64> = indices
        .iter()
        .filter_map(|&i| dataset.records.get(i))
        .filter_map(|rec| rec.number(column))
        .collect();

    if values.is_empty() {
        return KpiSet::default();
    }

    let total: f64 = values.iter().sum();
    let average = total / values.len() as f64;
    let maximum = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let series = series_by_date(dataset, indices, schema, column);
    let growth_pct = match (series.first(), series.last()) {
        (Some(&(_, first)), Some(&(_, last))) if series.len() >= 2 && first != 0.0 => {
            Some((last - first) / first * 100.0)
        }
        _ => None,
    };

    KpiSet {
        total,
        average,
        maximum,
        growth_pct,
    }
}
