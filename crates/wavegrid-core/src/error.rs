use thiserror::Error;

#[derive(Error, Debug)]
pub enum GridError {
    #[error("Invalid grid dimensions: {rows}x{cols}")]
    InvalidDimensions { rows: usize, cols: usize },

    #[error("Sample count mismatch: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("Non-finite sample at ({row}, {col})")]
    NonFinite { row: usize, col: usize },

    #[error("Operation cancelled")]
    Cancelled,

    #[error("SVD decomposition failed to produce U or V^T matrices")]
    SvdFailed,
}

pub type Result<T> = std::result::Result<T, GridError>;
