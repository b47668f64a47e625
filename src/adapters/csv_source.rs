use crate::core::{DataTable, Record, TableSource};
use crate::utils::error::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Loads one table per CSV file. The header row names the columns and the
/// file stem names the table.
#[derive(Debug, Clone)]
pub struct CsvTableSource {
    paths: Vec<PathBuf>,
}

impl CsvTableSource {
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self { paths }
    }

    /// Relative entries are taken from `base_dir`, absolute ones as given.
    pub fn with_base_dir(base_dir: &Path, files: &[String]) -> Self {
        let paths = files.iter().map(|f| base_dir.join(f)).collect();
        Self { paths }
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    fn table_name(path: &Path) -> String {
        path.file_stem()
            .and_then(|s| s.to_str())
            .map(str::to_string)
            .unwrap_or_else(|| path.display().to_string())
    }
}

/// Integers, finite floats and booleans keep their type, blank cells are null.
pub fn parse_cell(raw: &str) -> Value {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Value::Null;
    }
    if let Ok(i) = trimmed.parse::<i64>() {
        return Value::Number(i.into());
    }
    if let Some(n) = trimmed
        .parse::<f64>()
        .ok()
        .and_then(serde_json::Number::from_f64)
    {
        return Value::Number(n);
    }
    match trimmed {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => Value::String(raw.to_string()),
    }
}

pub fn parse_csv(name: &str, data: &[u8]) -> Result<DataTable> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_reader(data);

    let headers = reader.headers()?.clone();
    let mut records = Vec::new();

    for row in reader.records() {
        let row = row?;
        let data: HashMap<String, Value> = headers
            .iter()
            .zip(row.iter())
            .map(|(header, cell)| (header.to_string(), parse_cell(cell)))
            .collect();
        records.push(Record::new(data));
    }

    Ok(DataTable::new(name, records))
}

#[async_trait]
impl TableSource for CsvTableSource {
    async fn load_tables(&self) -> Result<Vec<DataTable>> {
        let mut tables = Vec::with_capacity(self.paths.len());

        for path in &self.paths {
            tracing::debug!("Reading model data from {}", path.display());
            let data = tokio::fs::read(path).await?;
            let table = parse_csv(&Self::table_name(path), &data)?;
            tracing::debug!("Loaded table '{}' ({} records)", table.name, table.len());
            tables.push(table);
        }

        Ok(tables)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::ModelError;
    use serde_json::json;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_parse_cell_types() {
        assert_eq!(parse_cell("42"), json!(42));
        assert_eq!(parse_cell("0.25"), json!(0.25));
        assert_eq!(parse_cell("true"), json!(true));
        assert_eq!(parse_cell("  "), Value::Null);
        assert_eq!(parse_cell("NaN"), json!("NaN"));
        assert_eq!(parse_cell("DE"), json!("DE"));
    }

    #[test]
    fn test_parse_csv_rows() {
        let csv = b"region, year ,value\nDE,2023,1.5\nFR,2024,\n";
        let table = parse_csv("prices", csv).unwrap();

        assert_eq!(table.name, "prices");
        assert_eq!(table.len(), 2);
        assert_eq!(table.columns(), vec!["region", "value", "year"]);
        assert_eq!(table.records[0].get("year"), Some(&json!(2023)));
        assert_eq!(table.records[1].get("value"), Some(&Value::Null));
    }

    #[test]
    fn test_parse_csv_rejects_ragged_rows() {
        let csv = b"a,b\n1,2\n3\n";
        assert!(matches!(parse_csv("bad", csv), Err(ModelError::CsvError(_))));
    }

    #[tokio::test]
    async fn test_load_tables_from_files() {
        let dir = TempDir::new().unwrap();
        let mut file = std::fs::File::create(dir.path().join("capacity.csv")).unwrap();
        file.write_all(b"plant,mw\nA,120\nB,80\n").unwrap();

        let source = CsvTableSource::with_base_dir(dir.path(), &["capacity.csv".to_string()]);
        let tables = source.load_tables().await.unwrap();

        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].name, "capacity");
        assert_eq!(tables[0].numeric_column("mw"), vec![120.0, 80.0]);
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let source = CsvTableSource::with_base_dir(dir.path(), &["missing.csv".to_string()]);
        let err = source.load_tables().await.unwrap_err();
        assert!(matches!(err, ModelError::IoError(_)));
    }
}
