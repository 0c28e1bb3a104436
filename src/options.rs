use std::collections::HashSet;
use crate::schema::PersonTable;

/// How a record is read out of a row.
///
/// Similar to a connection config: built with chained setters.
///
/// ```
/// use contentmodel::RowReadOptions;
///
/// let options = RowReadOptions::new()
///     .prepend_table_name(true)
///     .fields(["person_name", "person_age"]);
///
/// assert_eq!(options.column_name("name"), "person_name");
/// assert!(options.allows("person_age"));
/// assert!(!options.allows("person_alive"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowReadOptions {
    /// Read `<table>_<column>` instead of `<column>` (joined queries)
    pub prepend_table_name: bool,

    /// Only read columns whose (possibly prefixed) name is in this set
    pub fields: Option<HashSet<String>>,
}

impl RowReadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read prefixed column names
    pub fn prepend_table_name(mut self, prepend: bool) -> Self {
        self.prepend_table_name = prepend;
        self
    }

    /// Restrict reading to the given column names
    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Restrict reading to an optional, already built set
    pub fn field_set(mut self, fields: Option<HashSet<String>>) -> Self {
        self.fields = fields;
        self
    }

    pub fn prefix(&self) -> String {
        if self.prepend_table_name {
            PersonTable::column_prefix()
        } else {
            String::new()
        }
    }

    /// The name a column is looked up under in the row.
    pub fn column_name(&self, column: &str) -> String {
        format!("{}{}", self.prefix(), column)
    }

    /// Whether the restriction set (if any) lets `name` through.
    pub fn allows(&self, name: &str) -> bool {
        self.fields.as_ref().is_none_or(|fields| fields.contains(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_allows_everything() {
        let options = RowReadOptions::new();
        assert_eq!(options.prefix(), "");
        assert_eq!(options.column_name("age"), "age");
        assert!(options.allows("anything"));
    }

    #[test]
    fn test_empty_field_set_allows_nothing() {
        let options = RowReadOptions::new().fields(Vec::<String>::new());
        assert!(!options.allows("name"));
    }

    #[test]
    fn test_field_set_replaces() {
        let options = RowReadOptions::new().fields(["name"]).field_set(None);
        assert!(options.allows("age"));
    }
}
