use serde::{Deserialize, Serialize};
use crate::core::{Result, Row, Schema, Value};
use crate::cursor::ResultCursor;

/// An owned, tabular result set: column names plus rows of values.
///
/// This is the data a `ResultCursor` walks over.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl QueryResult {
    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Self {
        Self { columns, rows }
    }

    /// Builds a result set whose rows are checked against `schema`.
    pub fn with_schema(schema: &Schema, rows: Vec<Row>) -> Result<Self> {
        for row in &rows {
            schema.validate_row(row)?;
        }
        Ok(Self::new(schema.column_names(), rows))
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|col| col == name)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Value of `column` in row `row`, if both exist.
    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.column_index(column)?;
        self.rows.get(row).and_then(|r| r.get(idx))
    }

    pub fn into_cursor(self) -> ResultCursor {
        ResultCursor::new(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Column, DataType};

    #[test]
    fn test_with_schema_validates_rows() {
        let schema = Schema::new(vec![
            Column::new("_id", DataType::Integer),
            Column::new("name", DataType::Text),
        ]);

        let ok = QueryResult::with_schema(&schema, vec![vec![Value::Integer(1), "Ann".into()]]).unwrap();
        assert_eq!(ok.row_count(), 1);
        assert_eq!(ok.value(0, "name"), Some(&Value::Text("Ann".into())));
        assert_eq!(ok.value(0, "age"), None);

        let bad = QueryResult::with_schema(&schema, vec![vec!["one".into(), Value::Null]]);
        assert!(bad.is_err());
    }

    #[test]
    fn test_json_shape() {
        let result: QueryResult =
            serde_json::from_str(r#"{"columns":["name","age"],"rows":[["Ann",30],[null,null]]}"#).unwrap();
        assert_eq!(result.columns(), &["name".to_string(), "age".to_string()]);
        assert_eq!(result.row_count(), 2);
        assert!(result.rows()[1][0].is_null());
    }
}
