use std::collections::TryReserveError;

/// Operation completed.
pub const CTE_SUCCESS: i32 = 0;
/// Output would pass its size ceiling.
pub const CTE_ERROR_BUFFER_OVERFLOW: i32 = -1;
/// Caller-supplied value violates the field schema.
pub const CTE_ERROR_INVALID_ARGUMENT: i32 = -2;
/// Encoded bytes violate the field schema.
pub const CTE_ERROR_INVALID_FORMAT: i32 = -3;
/// Header promises more bytes than remain.
pub const CTE_ERROR_INSUFFICIENT_DATA: i32 = -4;
/// Session already finalized, exhausted or failed.
pub const CTE_ERROR_INVALID_STATE: i32 = -5;
/// Buffer growth could not allocate.
pub const CTE_ERROR_ALLOCATION_FAILED: i32 = -6;
/// No bytes remain at a field boundary.
pub const CTE_ERROR_END_OF_BUFFER: i32 = -7;
/// Stream helpers only; the in-memory sessions never produce it.
pub const CTE_ERROR_IO: i32 = -8;

/// Errors that can occur while encoding or decoding CTE fields.
#[derive(Debug, thiserror::Error)]
pub enum CteError {
    /// A write would push the output past its size ceiling.
    #[error("write of {needed} bytes would overflow buffer ({available} bytes available)")]
    BufferOverflow { needed: usize, available: usize },

    /// A caller-supplied value violates the field schema.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Encoded bytes violate the field schema.
    #[error("invalid format: {0}")]
    InvalidFormat(String),

    /// A header promises more bytes than remain in the input.
    #[error("insufficient data ({needed} bytes needed, {remaining} remaining)")]
    InsufficientData { needed: usize, remaining: usize },

    /// The session has already finished.
    #[error("invalid state: {0}")]
    InvalidState(&'static str),

    /// The output buffer could not grow.
    #[error("allocation failed: {0}")]
    AllocationFailed(#[from] TryReserveError),

    /// No bytes remain at a field boundary.
    #[error("end of buffer")]
    EndOfBuffer,

    /// An I/O error occurred while reading or writing a field stream.
    #[error("field I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CteError {
    /// Numeric code used by host bindings.
    pub fn code(&self) -> i32 {
        match self {
            CteError::BufferOverflow { .. } => CTE_ERROR_BUFFER_OVERFLOW,
            CteError::InvalidArgument(_) => CTE_ERROR_INVALID_ARGUMENT,
            CteError::InvalidFormat(_) => CTE_ERROR_INVALID_FORMAT,
            CteError::InsufficientData { .. } => CTE_ERROR_INSUFFICIENT_DATA,
            CteError::InvalidState(_) => CTE_ERROR_INVALID_STATE,
            CteError::AllocationFailed(_) => CTE_ERROR_ALLOCATION_FAILED,
            CteError::EndOfBuffer => CTE_ERROR_END_OF_BUFFER,
            CteError::Io(_) => CTE_ERROR_IO,
        }
    }

    /// True for the end-of-input signal, which is not a real failure.
    pub fn is_end_of_buffer(&self) -> bool {
        matches!(self, CteError::EndOfBuffer)
    }
}

pub type Result<T> = std::result::Result<T, CteError>;
