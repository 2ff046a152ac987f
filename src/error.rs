//! Error variants for SSZ.

use alloc::string::String;
use thiserror::Error;

/// Coarse classification of an [`SSZError`].
///
/// Callers that only need to reject malformed input usually match on the kind rather than the
/// concrete variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Buffer length inconsistent with a fixed-size requirement.
    InvalidLength,
    /// Offsets not monotonic or pointing outside the buffer.
    InvalidOffset,
    /// More elements or chunks than the type's declared capacity.
    LimitExceeded,
    /// Encoding too large to be addressed by a 4-byte offset.
    TotalLengthOverflow,
    /// Path segment names a field the container does not have.
    FieldNotFound,
    /// Numeric or length segment used against a non-enumerable type.
    NotEnumerable,
    /// Value and schema disagree about the shape of the data.
    UnsupportedType,
    /// Bytes of the right length that are not a canonical encoding.
    InvalidValue,
    /// Malformed object path.
    InvalidPath,
    /// Merkle proof or generalized index that does not check out.
    InvalidProof,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SSZError {
    #[error("Invalid length: expected {expected}, got {got}")]
    InvalidLength { expected: usize, got: usize },

    #[error("Invalid byte for boolean deserialization: {0:#04x}")]
    InvalidBooleanByte(u8),

    #[error("Offset {offset} out of bounds for data length {len}")]
    OffsetOutOfBounds { offset: usize, len: usize },

    #[error("Invalid offset range: start {start} is greater than end {end}")]
    InvalidOffsetRange { start: usize, end: usize },

    #[error("First offset {offset} does not match the fixed region length {expected}")]
    UnexpectedFirstOffset { offset: usize, expected: usize },

    #[error("First offset {offset} does not describe a whole number of offsets")]
    InvalidFirstOffset { offset: usize },

    #[error("Limit exceeded: limit {limit}, got {got}")]
    LimitExceeded { limit: usize, got: usize },

    #[error("Invalid Chunk Count: limit {limit}, got {count}")]
    ChunkCountExceedsLimit { count: usize, limit: usize },

    #[error("Encoded length {len} cannot be addressed by a 4-byte offset")]
    TotalLengthOverflow { len: u64 },

    #[error("Invalid bitvector: bits set beyond length {len}")]
    InvalidBitvector { len: usize },

    #[error("Field `{field}` not found in container `{container}`")]
    FieldNotFound { field: String, container: String },

    #[error("Type `{0}` is not enumerable")]
    NotEnumerable(String),

    #[error("Type `{0}` has no length node")]
    NoLengthNode(String),

    #[error("Index {index} out of bounds for bound {bound}")]
    IndexOutOfBounds { index: usize, bound: usize },

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Generalized index overflowed while resolving the path")]
    GeneralizedIndexOverflow,

    #[error("Invalid generalized index {0}")]
    InvalidGeneralizedIndex(u64),

    #[error("Merkle proof does not verify against the given root")]
    InvalidProof,

    #[error("Type mismatch: expected {expected}, got {got}")]
    TypeMismatch { expected: String, got: String },

    #[error("Unsupported type: {0}")]
    UnsupportedType(String),
}

impl SSZError {
    /// Returns the [`ErrorKind`] this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            SSZError::InvalidLength { .. } => ErrorKind::InvalidLength,
            SSZError::OffsetOutOfBounds { .. }
            | SSZError::InvalidOffsetRange { .. }
            | SSZError::UnexpectedFirstOffset { .. }
            | SSZError::InvalidFirstOffset { .. } => ErrorKind::InvalidOffset,
            SSZError::LimitExceeded { .. } | SSZError::ChunkCountExceedsLimit { .. } => {
                ErrorKind::LimitExceeded
            }
            SSZError::TotalLengthOverflow { .. } => ErrorKind::TotalLengthOverflow,
            SSZError::FieldNotFound { .. } => ErrorKind::FieldNotFound,
            SSZError::NotEnumerable(_) | SSZError::NoLengthNode(_) => ErrorKind::NotEnumerable,
            SSZError::TypeMismatch { .. } | SSZError::UnsupportedType(_) => {
                ErrorKind::UnsupportedType
            }
            SSZError::InvalidBooleanByte(_) | SSZError::InvalidBitvector { .. } => {
                ErrorKind::InvalidValue
            }
            SSZError::IndexOutOfBounds { .. }
            | SSZError::InvalidPath(_)
            | SSZError::GeneralizedIndexOverflow => ErrorKind::InvalidPath,
            SSZError::InvalidGeneralizedIndex(_) | SSZError::InvalidProof => {
                ErrorKind::InvalidProof
            }
        }
    }
}
