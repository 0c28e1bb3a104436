//! Row readers.
//!
//! `RowReader` is the narrow interface records are built from: column lookup
//! by name, a null check, typed getters and forward iteration. `ResultCursor`
//! implements it over an owned `QueryResult`.

use crate::core::{ModelError, Result, Row, Value};
use crate::result::QueryResult;

/// A positioned reader over tabular rows.
pub trait RowReader {
    /// Index of the column called `name`, or `None` if the row has no such column.
    fn column_index(&self, name: &str) -> Result<Option<usize>>;

    fn is_null(&self, index: usize) -> Result<bool>;

    fn get_i64(&self, index: usize) -> Result<i64>;

    fn get_i32(&self, index: usize) -> Result<i32>;

    fn get_f64(&self, index: usize) -> Result<f64>;

    fn get_string(&self, index: usize) -> Result<String>;

    /// Moves to the first row. Returns `false` if there are no rows.
    fn move_to_first(&mut self) -> Result<bool>;

    /// Moves to the next row. Returns `false` once past the last row.
    fn move_to_next(&mut self) -> Result<bool>;
}

impl<R: RowReader + ?Sized> RowReader for &mut R {
    fn column_index(&self, name: &str) -> Result<Option<usize>> {
        (**self).column_index(name)
    }

    fn is_null(&self, index: usize) -> Result<bool> {
        (**self).is_null(index)
    }

    fn get_i64(&self, index: usize) -> Result<i64> {
        (**self).get_i64(index)
    }

    fn get_i32(&self, index: usize) -> Result<i32> {
        (**self).get_i32(index)
    }

    fn get_f64(&self, index: usize) -> Result<f64> {
        (**self).get_f64(index)
    }

    fn get_string(&self, index: usize) -> Result<String> {
        (**self).get_string(index)
    }

    fn move_to_first(&mut self) -> Result<bool> {
        (**self).move_to_first()
    }

    fn move_to_next(&mut self) -> Result<bool> {
        (**self).move_to_next()
    }
}

/// Cursor over a `QueryResult`.
///
/// Starts before the first row (position -1). Getters read the current row
/// and coerce between numeric storage classes the way an SQLite cursor does.
#[derive(Debug)]
pub struct ResultCursor {
    result: Option<QueryResult>,
    position: isize,
}

impl ResultCursor {
    pub fn new(result: QueryResult) -> Self {
        Self {
            result: Some(result),
            position: -1,
        }
    }

    pub fn position(&self) -> isize {
        self.position
    }

    pub fn count(&self) -> Result<usize> {
        Ok(self.result()?.row_count())
    }

    pub fn column_names(&self) -> Result<&[String]> {
        Ok(self.result()?.columns())
    }

    /// Moves to an absolute row. Positions outside `0..count` park the
    /// cursor before-first or after-last and return `false`.
    pub fn move_to_position(&mut self, position: isize) -> Result<bool> {
        let count = self.count()? as isize;
        if position < 0 {
            self.position = -1;
            return Ok(false);
        }
        if position >= count {
            self.position = count;
            return Ok(false);
        }
        self.position = position;
        Ok(true)
    }

    pub fn is_closed(&self) -> bool {
        self.result.is_none()
    }

    /// Releases the rows. Every later call fails with `CursorClosed`.
    pub fn close(&mut self) {
        self.result = None;
    }

    fn result(&self) -> Result<&QueryResult> {
        self.result.as_ref().ok_or(ModelError::CursorClosed)
    }

    fn current_row(&self) -> Result<&Row> {
        let result = self.result()?;
        if self.position < 0 {
            return Err(ModelError::CursorOutOfBounds(self.position));
        }
        result
            .rows()
            .get(self.position as usize)
            .ok_or(ModelError::CursorOutOfBounds(self.position))
    }

    fn value(&self, index: usize) -> Result<&Value> {
        let row = self.current_row()?;
        row.get(index).ok_or(ModelError::ColumnOutOfRange {
            index,
            count: row.len(),
        })
    }
}

impl RowReader for ResultCursor {
    fn column_index(&self, name: &str) -> Result<Option<usize>> {
        Ok(self.result()?.column_index(name))
    }

    fn is_null(&self, index: usize) -> Result<bool> {
        Ok(self.value(index)?.is_null())
    }

    fn get_i64(&self, index: usize) -> Result<i64> {
        self.value(index)?.coerce_i64()
    }

    fn get_i32(&self, index: usize) -> Result<i32> {
        let wide = self.get_i64(index)?;
        i32::try_from(wide).map_err(|_| {
            ModelError::TypeMismatch(format!("Value {} in column {} does not fit in INT", wide, index))
        })
    }

    fn get_f64(&self, index: usize) -> Result<f64> {
        self.value(index)?.coerce_f64()
    }

    fn get_string(&self, index: usize) -> Result<String> {
        self.value(index)?.coerce_string()
    }

    fn move_to_first(&mut self) -> Result<bool> {
        self.move_to_position(0)
    }

    fn move_to_next(&mut self) -> Result<bool> {
        let next = self.position + 1;
        self.move_to_position(next)
    }
}

impl From<QueryResult> for ResultCursor {
    fn from(result: QueryResult) -> Self {
        Self::new(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cursor() -> ResultCursor {
        QueryResult::new(
            vec!["_id".into(), "name".into(), "age".into()],
            vec![
                vec![Value::Integer(1), "Ann".into(), Value::Integer(30)],
                vec![Value::Integer(2), Value::Null, Value::Float(41.7)],
            ],
        )
        .into_cursor()
    }

    #[test]
    fn test_starts_before_first() {
        let cursor = cursor();
        assert_eq!(cursor.position(), -1);
        assert_eq!(cursor.get_i64(0), Err(ModelError::CursorOutOfBounds(-1)));
    }

    #[test]
    fn test_iterates_rows() {
        let mut cursor = cursor();
        assert!(cursor.move_to_first().unwrap());
        assert_eq!(cursor.get_string(1).unwrap(), "Ann");
        assert!(cursor.move_to_next().unwrap());
        assert!(cursor.is_null(1).unwrap());
        assert_eq!(cursor.get_i32(2).unwrap(), 41);
        assert!(!cursor.move_to_next().unwrap());
        assert_eq!(cursor.position(), 2);
        assert!(!cursor.move_to_next().unwrap());
    }

    #[test]
    fn test_empty_result_has_no_first_row() {
        let mut cursor = QueryResult::new(vec!["_id".into()], vec![]).into_cursor();
        assert!(!cursor.move_to_first().unwrap());
    }

    #[test]
    fn test_column_lookup() {
        let cursor = cursor();
        assert_eq!(cursor.column_index("age"), Ok(Some(2)));
        assert_eq!(cursor.column_index("alive"), Ok(None));
    }

    #[test]
    fn test_column_out_of_range() {
        let mut cursor = cursor();
        cursor.move_to_first().unwrap();
        assert_eq!(
            cursor.get_i64(9),
            Err(ModelError::ColumnOutOfRange { index: 9, count: 3 })
        );
    }

    #[test]
    fn test_int_overflow_is_mismatch() {
        let mut cursor = QueryResult::new(vec!["age".into()], vec![vec![Value::Integer(i64::MAX)]]).into_cursor();
        cursor.move_to_first().unwrap();
        assert!(matches!(cursor.get_i32(0), Err(ModelError::TypeMismatch(_))));
        assert_eq!(cursor.get_i64(0).unwrap(), i64::MAX);
    }

    #[test]
    fn test_closed_cursor_fails() {
        let mut cursor = cursor();
        cursor.close();
        assert!(cursor.is_closed());
        assert_eq!(cursor.move_to_first(), Err(ModelError::CursorClosed));
        assert_eq!(cursor.column_index("name"), Err(ModelError::CursorClosed));
        assert_eq!(cursor.is_null(0), Err(ModelError::CursorClosed));
    }
}
