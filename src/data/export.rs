use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use super::model::{Dataset, Value};

// ---------------------------------------------------------------------------
// CSV re-export of the filtered view
// ---------------------------------------------------------------------------

/// Write the rows at `indices` as UTF-8 CSV. Headers are the dataset's
/// normalized column names in source order; values are formatted so that
/// re-loading the file reproduces the same cells.
pub fn write_csv<W: Write>(dataset: &Dataset, indices: &[usize], writer: W) -> Result<()> {
    let mut out = csv::Writer::from_writer(writer);

    out.write_record(&dataset.column_names)
        .context("writing CSV header")?;

    for &i in indices {
        let Some(rec) = dataset.records.get(i) else {
            continue;
        };
        let row: Vec<String> = dataset
            .column_names
            .iter()
            .map(|col| rec.get(col).unwrap_or(&Value::Null).csv_field())
            .collect();
        out.write_record(&row).context("writing CSV row")?;
    }

    out.flush().context("flushing CSV output")?;
    Ok(())
}

/// Export to a file path (the File → Export… dialog target).
pub fn write_csv_file(dataset: &Dataset, indices: &[usize], path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    write_csv(dataset, indices, file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::load_file;
    use crate::data::testutil::sample_dataset;

    #[test]
    fn export_then_reload_round_trips() {
        let ds = sample_dataset();
        let indices: Vec<usize> = (0..ds.len()).collect();

        let path = std::env::temp_dir().join(format!(
            "challan-board-roundtrip-{}.csv",
            std::process::id()
        ));
        write_csv_file(&ds, &indices, &path).unwrap();
        let reloaded = load_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(reloaded.len(), ds.len());
        assert_eq!(reloaded.column_names, ds.column_names);
        for (a, b) in ds.records.iter().zip(reloaded.records.iter()) {
            for col in &ds.column_names {
                assert_eq!(a.get(col), b.get(col), "column {col}");
            }
        }
    }

    #[test]
    fn exports_only_selected_rows() {
        let ds = sample_dataset();
        let mut buf = Vec::new();
        write_csv(&ds, &[1], &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("date,violation_type,challan_count,total_amount")
        );
        assert_eq!(lines.next(), Some("2024-01-02,Signal,5,2000.0"));
        assert_eq!(lines.next(), None);
    }
}
