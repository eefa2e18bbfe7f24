use thiserror::Error;

/// Rejection from the checked range API
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TextError {
    #[error("invalid range {from}..{to}: start is after end")]
    InvertedRange { from: usize, to: usize },

    #[error("range {from}..{to} is out of bounds for text of length {len}")]
    OutOfBounds { from: usize, to: usize, len: usize },

    #[error("position {pos} falls inside a surrogate pair")]
    SplitsSurrogatePair { pos: usize },
}

pub type Result<T> = std::result::Result<T, TextError>;
