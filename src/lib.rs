// ============================================================================
// contentmodel Library
// ============================================================================

pub mod core;
pub mod schema;
pub mod result;
pub mod cursor;
pub mod values;
pub mod parcel;
pub mod model;
mod options;

// Re-export main types for convenience
pub use crate::core::{DataType, ModelError, Result, Value};
pub use cursor::{ResultCursor, RowReader};
pub use model::{Person, PersonFields};
pub use options::RowReadOptions;
pub use parcel::{Parcel, ParcelReader, ParcelWriter, Parcelable};
pub use result::QueryResult;
pub use schema::PersonTable;
pub use values::ContentValues;

/// Reads every row of `result` into a `Person`.
///
/// Shorthand for wrapping the result in a cursor and calling
/// `Person::list_from_rows_with`.
///
/// # Examples
///
/// ```
/// use contentmodel::{QueryResult, RowReadOptions, Value, persons_from_result};
///
/// # fn main() -> contentmodel::Result<()> {
/// let result = QueryResult::new(
///     vec!["name".into(), "age".into()],
///     vec![vec![Value::from("Ann"), Value::from(30)]],
/// );
///
/// let persons = persons_from_result(result, &RowReadOptions::new())?;
/// assert_eq!(persons[0].name(), Some("Ann"));
/// assert_eq!(persons[0].age(), 30);
/// # Ok(())
/// # }
/// ```
pub fn persons_from_result(result: QueryResult, options: &RowReadOptions) -> Result<Vec<Person>> {
    let mut cursor = result.into_cursor();
    Person::list_from_rows_with(Some(&mut cursor), options)
}

/// Flattens a `Person` into raw parcel bytes.
pub fn marshall_person(person: &Person) -> Result<Vec<u8>> {
    Ok(Parcel::from_parcelable(person, 0)?.marshall())
}

/// Rebuilds a `Person` from raw parcel bytes.
pub fn unmarshall_person(bytes: &[u8]) -> Result<Person> {
    let mut parcel = Parcel::unmarshall(bytes);
    Person::create_from_parcel(&mut parcel)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marshall_round_trip() {
        let mut person = Person::new();
        person.set_row_id(12);
        person.set_name("Bo");

        let bytes = marshall_person(&person).unwrap();
        let back = unmarshall_person(&bytes).unwrap();
        assert_eq!(back.row_id(), 12);
        assert_eq!(back.name(), Some("Bo"));
    }

    #[test]
    fn test_unmarshall_truncated() {
        let bytes = marshall_person(&Person::new()).unwrap();
        let err = unmarshall_person(&bytes[..bytes.len() - 1]).unwrap_err();
        assert!(matches!(err, ModelError::BufferUnderflow { .. }));
    }
}
