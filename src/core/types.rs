use serde::{Deserialize, Serialize};
use super::{DataType, ModelError, Result, Value};

pub type Row = Vec<Value>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    #[serde(with = "data_type_name")]
    pub data_type: DataType,
    pub nullable: bool,
}

impl Column {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            nullable: true,
        }
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn validate(&self, value: &Value) -> Result<()> {
        if value.is_null() {
            if !self.nullable {
                return Err(ModelError::TypeMismatch(format!(
                    "Column '{}' cannot be NULL",
                    self.name
                )));
            }
            return Ok(());
        }

        if !self.data_type.is_compatible(value) {
            return Err(ModelError::TypeMismatch(format!(
                "Column '{}' expects type {}, got {}",
                self.name,
                self.data_type,
                value.type_name()
            )));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    columns: Vec<Column>,
}

impl Schema {
    pub fn new(columns: Vec<Column>) -> Self {
        Self { columns }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|col| col.name.clone()).collect()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Returns a copy of the schema with every column renamed to
    /// `<prefix><name>`, as a joined query would expose it.
    pub fn prefixed(&self, prefix: &str) -> Self {
        Self {
            columns: self
                .columns
                .iter()
                .map(|col| Column {
                    name: format!("{}{}", prefix, col.name),
                    ..col.clone()
                })
                .collect(),
        }
    }

    /// Validates a row against the schema, column by column.
    pub fn validate_row(&self, row: &[Value]) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(ModelError::TypeMismatch(format!(
                "Row has {} value(s), schema has {} column(s)",
                row.len(),
                self.columns.len()
            )));
        }

        self.columns
            .iter()
            .zip(row)
            .try_for_each(|(col, value)| col.validate(value))
    }
}

mod data_type_name {
    use serde::{Deserialize, Deserializer, Serializer};
    use crate::core::DataType;

    pub fn serialize<S: Serializer>(data_type: &DataType, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&data_type.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DataType, D::Error> {
        let name = String::deserialize(deserializer)?;
        match name.to_ascii_uppercase().as_str() {
            "INTEGER" => Ok(DataType::Integer),
            "FLOAT" => Ok(DataType::Float),
            "TEXT" => Ok(DataType::Text),
            "BOOLEAN" => Ok(DataType::Boolean),
            other => Err(serde::de::Error::custom(format!("unknown data type '{}'", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> Schema {
        Schema::new(vec![
            Column::new("_id", DataType::Integer).not_null(),
            Column::new("name", DataType::Text),
        ])
    }

    #[test]
    fn test_column_names() {
        let schema = schema();
        assert_eq!(schema.column_names(), vec!["_id", "name"]);
        assert_eq!(schema.column_count(), 2);
    }

    #[test]
    fn test_prefixed_schema() {
        let prefixed = schema().prefixed("person_");
        assert_eq!(prefixed.column_names(), vec!["person__id", "person_name"]);
        assert!(!prefixed.columns()[0].nullable);
    }

    #[test]
    fn test_validate_row() {
        let schema = schema();
        assert!(schema.validate_row(&[Value::Integer(1), Value::Null]).is_ok());
        assert!(schema.validate_row(&[Value::Null, Value::Null]).is_err());
        assert!(schema.validate_row(&[Value::Integer(1)]).is_err());
        assert!(schema.validate_row(&[Value::Text("x".into()), Value::Null]).is_err());
    }
}
