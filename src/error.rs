use thiserror::Error;

/// Raised by [`crate::compile`] when a pattern cannot be parsed.
///
/// `position` is the byte offset in `pattern` where parsing stopped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    #[error("unsupported regex syntax in `{pattern}` at byte {position}")]
    UnsupportedSyntax { pattern: String, position: usize },

    #[error("invalid repetition bounds in `{pattern}` at byte {position}")]
    InvalidRepetition { pattern: String, position: usize },
}

impl CompileError {
    pub fn position(&self) -> usize {
        match self {
            CompileError::UnsupportedSyntax { position, .. }
            | CompileError::InvalidRepetition { position, .. } => *position,
        }
    }
}

/// The search ran out of budget before it could decide whether the
/// pattern matches.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchError {
    #[error("search exhausted: more than {limit} steps")]
    StepLimitExceeded { limit: u64 },

    #[error("search exhausted: more than {limit} pending backtrack entries")]
    DepthLimitExceeded { limit: usize },
}
