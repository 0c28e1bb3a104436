//! Schema name provider for the `person` table.
//!
//! Column names here are the keys used everywhere else: cursor lookups,
//! persistence map entries and the restriction sets callers pass in.

use crate::core::{Column, DataType, Schema};

/// Column and table names of the `person` table.
pub struct PersonTable;

impl PersonTable {
    /// Quoted table name, as it appears in generated SQL.
    pub const TABLE_NAME: &'static str = "`person`";

    pub const _ID: &'static str = "_id";
    pub const NAME: &'static str = "name";
    pub const AGE: &'static str = "age";
    pub const ALIVE: &'static str = "alive";
    pub const BODY_FAT: &'static str = "body_fat";
    pub const ID_PLACE: &'static str = "id_place";

    /// All columns, in transport buffer order.
    pub const ALL_COLUMNS: [&'static str; 6] = [
        Self::_ID,
        Self::NAME,
        Self::AGE,
        Self::ALIVE,
        Self::BODY_FAT,
        Self::ID_PLACE,
    ];

    /// Table name with identifier quoting removed.
    pub fn bare_table_name() -> String {
        Self::TABLE_NAME.replace('`', "")
    }

    /// Prefix joined queries put in front of each column: `person_`.
    pub fn column_prefix() -> String {
        format!("{}_", Self::bare_table_name())
    }

    pub fn prefixed(column: &str) -> String {
        format!("{}{}", Self::column_prefix(), column)
    }

    pub fn schema() -> Schema {
        Schema::new(vec![
            Column::new(Self::_ID, DataType::Integer).not_null(),
            Column::new(Self::NAME, DataType::Text),
            Column::new(Self::AGE, DataType::Integer),
            Column::new(Self::ALIVE, DataType::Boolean),
            Column::new(Self::BODY_FAT, DataType::Float),
            Column::new(Self::ID_PLACE, DataType::Integer),
        ])
    }
}
