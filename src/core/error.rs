use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("Type mismatch: {0}")]
    TypeMismatch(String),

    #[error("Column index {index} out of range for {count} column(s)")]
    ColumnOutOfRange { index: usize, count: usize },

    #[error("Cursor is not positioned on a row (position {0})")]
    CursorOutOfBounds(isize),

    #[error("Cursor is closed")]
    CursorClosed,

    #[error("Buffer underflow: needed {needed} byte(s), {available} available")]
    BufferUnderflow { needed: usize, available: usize },

    #[error("Invalid encoding: {0}")]
    InvalidEncoding(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;

impl From<serde_json::Error> for ModelError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
