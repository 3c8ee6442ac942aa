//! The ordered column list the classifier was trained on.

use crate::error::ArtifactError;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

#[derive(Debug, Clone, PartialEq)]
pub struct ModelSchema {
    columns: Vec<String>,
    index: HashMap<String, usize>,
}

#[derive(Deserialize)]
struct ColumnRow {
    column: String,
}

impl ModelSchema {
    pub fn new(columns: Vec<String>) -> Result<Self, ArtifactError> {
        if columns.is_empty() {
            return Err(ArtifactError::EmptySchema);
        }

        let mut index = HashMap::with_capacity(columns.len());
        for (position, column) in columns.iter().enumerate() {
            if index.insert(column.clone(), position).is_some() {
                return Err(ArtifactError::DuplicateColumn(column.clone()));
            }
        }

        Ok(Self { columns, index })
    }

    /// Reads a JSON array of column names, or a CSV file with a single
    /// `column` header when the path ends in `.csv`.
    pub fn load(path: &Path) -> Result<Self, ArtifactError> {
        let is_csv = path
            .extension()
            .map_or(false, |ext| ext.eq_ignore_ascii_case("csv"));

        let columns = if is_csv {
            Self::read_csv(path)?
        } else {
            let file = File::open(path).map_err(|source| ArtifactError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            serde_json::from_reader(BufReader::new(file)).map_err(|source| ArtifactError::Json {
                path: path.to_path_buf(),
                source,
            })?
        };

        Self::new(columns)
    }

    fn read_csv(path: &Path) -> Result<Vec<String>, ArtifactError> {
        let csv_error = |source| ArtifactError::Csv {
            path: path.to_path_buf(),
            source,
        };

        let mut rdr = csv::Reader::from_path(path).map_err(csv_error)?;
        let mut columns = Vec::new();
        for result in rdr.deserialize() {
            let row: ColumnRow = result.map_err(csv_error)?;
            columns.push(row.column);
        }
        Ok(columns)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.index.contains_key(column)
    }

    pub fn position(&self, column: &str) -> Option<usize> {
        self.index.get(column).copied()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn columns(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_positions_follow_order() {
        let schema = ModelSchema::new(columns(&["GDP", "Gender_Male", "Gender_Female"])).unwrap();
        assert_eq!(schema.len(), 3);
        assert_eq!(schema.position("Gender_Male"), Some(1));
        assert!(schema.contains("GDP"));
        assert!(!schema.contains("Gender_Other"));
    }

    #[test]
    fn test_rejects_empty_and_duplicates() {
        assert!(matches!(ModelSchema::new(Vec::new()), Err(ArtifactError::EmptySchema)));
        let err = ModelSchema::new(columns(&["GDP", "GDP"])).unwrap_err();
        assert!(matches!(err, ArtifactError::DuplicateColumn(c) if c == "GDP"));
    }

    #[test]
    fn test_load_json() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"["Admission_grade", "Nacionality_Other"]"#).unwrap();

        let schema = ModelSchema::load(file.path()).unwrap();
        assert_eq!(schema.columns(), &["Admission_grade", "Nacionality_Other"]);
    }

    #[test]
    fn test_load_csv() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "column").unwrap();
        writeln!(file, "Admission_grade").unwrap();
        writeln!(file, "\"Marital status_Single\"").unwrap();

        let schema = ModelSchema::load(file.path()).unwrap();
        assert_eq!(schema.position("Marital status_Single"), Some(1));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = ModelSchema::load(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, ArtifactError::Io { .. }));
    }

    #[test]
    fn test_load_corrupt_json() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, "{{not a list").unwrap();
        let err = ModelSchema::load(file.path()).unwrap_err();
        assert!(matches!(err, ArtifactError::Json { .. }));
    }
}
