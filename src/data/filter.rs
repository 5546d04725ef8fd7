use std::collections::BTreeSet;

use chrono::NaiveDate;

use super::model::{Dataset, Schema, Value};

// ---------------------------------------------------------------------------
// FilterCriteria – conjunctive predicates over the loaded table
// ---------------------------------------------------------------------------

/// Sidebar filter state: an inclusive date window plus a category allow-list.
/// All supplied predicates must hold for a row to pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterCriteria {
    /// Inclusive lower date bound. `None` when the dataset has no date column
    /// or no parseable dates.
    pub start_date: Option<NaiveDate>,
    /// Inclusive upper date bound.
    pub end_date: Option<NaiveDate>,
    /// Selected category labels. Selecting every observed label is a no-op;
    /// selecting none hides everything.
    pub categories: BTreeSet<String>,
}

/// Initialise criteria against a freshly loaded dataset: date bounds default
/// to the observed min/max, and every observed category is selected.
pub fn init_criteria(dataset: &Dataset, schema: &Schema) -> FilterCriteria {
    let (start_date, end_date) = schema
        .date
        .as_deref()
        .map(|col| observed_date_bounds(dataset, col))
        .unwrap_or((None, None));

    let categories = schema
        .category
        .as_deref()
        .map(|col| dataset.labels(col).into_iter().collect())
        .unwrap_or_default();

    FilterCriteria {
        start_date,
        end_date,
        categories,
    }
}

/// Min and max parseable dates in a column, ignoring unparseable cells.
pub fn observed_date_bounds(
    dataset: &Dataset,
    column: &str,
) -> (Option<NaiveDate>, Option<NaiveDate>) {
    let mut dates = dataset
        .unique_values
        .get(column)
        .into_iter()
        .flatten()
        .filter_map(Value::as_date);
    let first = dates.next();
    let last = dates.last().or(first); // unique_values is sorted
    (first, last)
}

/// Return indices of rows that pass all active filters.
///
/// * The date predicate applies only when the schema resolved a date column
///   and both bounds are set; rows whose date is missing or unparseable are
///   dropped silently.
/// * The category predicate applies only when the schema resolved a category
///   column; an allow-list covering every observed label is skipped entirely.
pub fn filtered_indices(
    dataset: &Dataset,
    schema: &Schema,
    criteria: &FilterCriteria,
) -> Vec<usize> {
    let date_window = match (&schema.date, criteria.start_date, criteria.end_date) {
        (Some(col), Some(start), Some(end)) => Some((col.as_str(), start, end)),
        _ => None,
    };

    let category_filter = schema.category.as_deref().and_then(|col| {
        let observed = dataset.unique_values.get(col).map_or(0, |v| v.len());
        if !criteria.categories.is_empty() && criteria.categories.len() == observed {
            None // everything selected, no filtering needed
        } else {
            Some(col)
        }
    });

    dataset
        .records
        .iter()
        .enumerate()
        .filter(|(_, rec)| {
            if let Some((col, start, end)) = date_window {
                match rec.date(col) {
                    Some(d) => {
                        if d < start || d > end {
                            return false;
                        }
                    }
                    None => return false,
                }
            }
            if let Some(col) = category_filter {
                let label = rec.get(col).map(Value::to_string).unwrap_or_default();
                if !criteria.categories.contains(&label) {
                    return false;
                }
            }
            true
        })
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{Record, Value};
    use crate::data::testutil::{dataset, date, sample_dataset};

    #[test]
    fn identity_when_no_date_or_category_column() {
        let ds = dataset(&[
            &[("challan_count", Value::Integer(3))],
            &[("challan_count", Value::Integer(7))],
        ]);
        let schema = Schema {
            date: None,
            category: None,
            numeric: vec!["challan_count".into()],
        };
        let criteria = init_criteria(&ds, &schema);
        assert_eq!(filtered_indices(&ds, &schema, &criteria), vec![0, 1]);
    }

    #[test]
    fn default_criteria_pass_every_row() {
        let ds = sample_dataset();
        let schema = Schema::resolve(&ds);
        let criteria = init_criteria(&ds, &schema);
        assert_eq!(criteria.start_date, Some(date(2024, 1, 1)));
        assert_eq!(criteria.end_date, Some(date(2024, 1, 2)));
        assert_eq!(filtered_indices(&ds, &schema, &criteria), vec![0, 1]);
    }

    #[test]
    fn date_window_is_inclusive() {
        let ds = sample_dataset();
        let schema = Schema::resolve(&ds);
        let mut criteria = init_criteria(&ds, &schema);
        criteria.end_date = Some(date(2024, 1, 1));
        assert_eq!(filtered_indices(&ds, &schema, &criteria), vec![0]);

        criteria.start_date = Some(date(2024, 1, 1));
        assert_eq!(filtered_indices(&ds, &schema, &criteria), vec![0]);
    }

    #[test]
    fn unparseable_dates_are_dropped() {
        let mut ds = sample_dataset();
        let mut bad = Record::default();
        bad.fields
            .insert("date".into(), Value::String("not-a-date".into()));
        bad.fields
            .insert("violation_type".into(), Value::String("Speeding".into()));
        bad.fields.insert("challan_count".into(), Value::Integer(1));
        bad.fields
            .insert("total_amount".into(), Value::Float(100.0));
        ds.records.push(bad);
        let ds = Dataset::from_records(ds.records, ds.column_names);

        let schema = Schema::resolve(&ds);
        let criteria = init_criteria(&ds, &schema);
        assert_eq!(filtered_indices(&ds, &schema, &criteria), vec![0, 1]);
    }

    #[test]
    fn full_allow_list_is_a_no_op() {
        let ds = sample_dataset();
        let schema = Schema::resolve(&ds);
        let criteria = init_criteria(&ds, &schema);
        assert_eq!(criteria.categories.len(), 2);
        assert_eq!(filtered_indices(&ds, &schema, &criteria).len(), ds.len());
    }

    #[test]
    fn category_allow_list_restricts_rows() {
        let ds = sample_dataset();
        let schema = Schema::resolve(&ds);
        let mut criteria = init_criteria(&ds, &schema);
        criteria.categories = ["Signal".to_string()].into();
        assert_eq!(filtered_indices(&ds, &schema, &criteria), vec![1]);
    }

    #[test]
    fn empty_allow_list_hides_everything() {
        let ds = sample_dataset();
        let schema = Schema::resolve(&ds);
        let mut criteria = init_criteria(&ds, &schema);
        criteria.categories.clear();
        assert!(filtered_indices(&ds, &schema, &criteria).is_empty());
    }
}
