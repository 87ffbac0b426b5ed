use thiserror::Error;

/// Errors raised while building frames and arrays or while iterating a view.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OcularError {
    /// A frame or array is already registered under this key.
    #[error("key '{0}' is already registered")]
    DuplicateKey(String),
    /// No frame is registered under this key.
    #[error("unknown frame '{0}'")]
    UnknownFrame(String),
    /// No array is registered under this key.
    #[error("unknown array '{0}'")]
    UnknownArray(String),
    /// The key is empty or holds a character other than a letter, digit, `_` or `-`.
    #[error("invalid key '{0}': keys must be non-empty and use only letters, digits, '_' and '-'")]
    InvalidKey(String),
    /// An array's length does not match the cell count of its viewpoint frame.
    #[error("array '{key}' has {actual} values but its viewpoint has {expected} cells")]
    CardinalityMismatch {
        key: String,
        expected: usize,
        actual: usize,
    },
    /// A relative cell resolved to no ranges at all.
    #[error("cell {cell} of frame '{key}' is empty or out of range")]
    EmptyCell { key: String, cell: usize },
    /// A resolved cell overlaps itself or an earlier cell of the same frame.
    #[error("cell {cell} of frame '{key}' overlaps an earlier range")]
    OverlappingCells { key: String, cell: usize },
    /// A singular join met a cell that did not hold exactly one value.
    #[error("singular join over frame '{frame}' produced {count} values for cell {cell}")]
    SingularityViolation {
        frame: String,
        cell: usize,
        count: usize,
    },
    /// A scope expression could not be parsed.
    #[error("bad scope expression '{expr}': {reason}")]
    ScopeSyntax { expr: String, reason: String },
    /// A frame's parent chain does not reach a base frame.
    #[error("frame '{0}' does not descend from a base frame")]
    CyclicFrame(String),
    /// Two frames in one chain live in different base coordinate spaces.
    #[error("frames '{outer}' and '{inner}' do not share a base sequence")]
    UnrelatedFrames { outer: String, inner: String },
}

impl OcularError {
    pub(crate) fn syntax(expr: &str, reason: impl Into<String>) -> Self {
        OcularError::ScopeSyntax {
            expr: expr.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, OcularError>;
