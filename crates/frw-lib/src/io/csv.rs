use anyhow::{Context, Result};
use csv::ReaderBuilder;
use std::fs::File;
use std::path::Path;

/// Read one named numeric column from a headered CSV file.
///
/// The reference dataset is a single `flowrate` column of samples with no time
/// axis (time is implicit, uniform over one cycle). Column lookup is
/// case-insensitive; a cell that fails to parse is an error with its row
/// number, never silently skipped.
pub fn read_flowrate_csv(path: &Path, column: &str) -> Result<Vec<f64>> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let mut reader = ReaderBuilder::new().has_headers(true).from_reader(file);
    let headers = reader.headers().context("reading header")?.clone();
    let col_idx = locate_column(&headers, column)?;

    let mut samples = Vec::new();
    for (row, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("reading row {}", row + 2))?;
        let cell = record
            .get(col_idx)
            .ok_or_else(|| anyhow::anyhow!("row {} has no {} cell", row + 2, column))?;
        let value: f64 = cell
            .trim()
            .parse()
            .with_context(|| format!("row {}: {:?} is not f64", row + 2, cell))?;
        samples.push(value);
    }
    if samples.is_empty() {
        anyhow::bail!("{} contains no samples", path.display());
    }
    Ok(samples)
}

fn locate_column(headers: &csv::StringRecord, requested: &str) -> Result<usize> {
    headers
        .iter()
        .position(|name| name.trim().eq_ignore_ascii_case(requested))
        .ok_or_else(|| anyhow::anyhow!("missing column {:?} (found {:?})", requested, headers))
}

#[cfg(feature = "polars")]
pub mod polars_io {
    use anyhow::Result;
    use polars::prelude::*;

    /// Load a single-column CSV as f64 vector. Assumes header with column name.
    pub fn load_column(path: &str, col: &str) -> Result<Vec<f64>> {
        let df = CsvReadOptions::default()
            .try_into_reader_with_file_path(Some(path.into()))?
            .finish()?;
        let s = df.column(col)?;
        Ok(s.f64()?.into_no_null_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;

    #[test]
    fn reads_reference_dataset() {
        let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .parent()
            .and_then(|p| p.parent())
            .expect("workspace root")
            .join("test_data/frw_baseline.csv");
        let samples = read_flowrate_csv(&path, "flowrate").unwrap();
        assert_eq!(samples.len(), 99);
        assert!(samples.iter().all(|v| *v > 0.0));
    }

    fn write_csv(dir: &tempfile::TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        write!(file, "{}", contents).unwrap();
        path
    }

    #[test]
    fn column_lookup_is_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&dir, "case.csv", "FlowRate\n1.0\n2.0\n");
        let samples = read_flowrate_csv(&path, "flowrate").unwrap();
        assert_eq!(samples, vec![1.0, 2.0]);
    }

    #[test]
    fn rejects_missing_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&dir, "missing.csv", "pressure\n1.0\n");
        assert!(read_flowrate_csv(&path, "flowrate").is_err());
    }

    #[test]
    fn rejects_non_numeric_cell() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&dir, "nan.csv", "flowrate\n1.0\nnot-a-number\n");
        assert!(read_flowrate_csv(&path, "flowrate").is_err());
    }
}
