use thiserror::Error;

#[derive(Error, Debug)]
pub enum SwipeError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Parse error on line {line}: column '{column}' has non-numeric value '{value}'")]
    Parse {
        line: u64,
        column: String,
        value: String,
    },

    #[error("Row shape mismatch on line {line}: expected {expected} columns, found {found}")]
    RowShape {
        line: u64,
        expected: usize,
        found: usize,
    },

    #[error("Missing column: {0}")]
    MissingColumn(String),

    #[error("Malformed input: {0}")]
    Malformed(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Session is not awaiting feedback")]
    SessionClosed,
}
