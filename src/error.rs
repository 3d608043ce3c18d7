//! Error types for the RTP codec.

use std::fmt;

/// Errors raised while building, mutating, encoding or decoding RTP data.
///
/// Variants map to the kind of invariant that was violated:
///
/// - [`Range`](Self::Range): a numeric field outside its
///   protocol bound (version, payload-type code).
/// - [`Length`](Self::Length): a structural count or length
///   invariant (CSRC count, extension alignment, truncated input).
/// - [`Index`](Self::Index): a bad position in a
///   [`CsrcList`](crate::CsrcList).
///
/// A failed call never leaves the receiver partially modified.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RtpError {
    /// A numeric field is outside the range RFC 3550/3551 allows.
    #[error("{field} out of range: {value}")]
    Range { field: &'static str, value: u64 },

    /// A length or count invariant is violated.
    #[error("length error: {kind}")]
    Length { kind: LengthErrorKind },

    /// CSRC list position is invalid for insertion or assignment.
    #[error("CSRC index {index} invalid for list of length {len}")]
    Index { index: usize, len: usize },
}

/// Specific kind of length failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LengthErrorKind {
    /// The CSRC list would hold more than 15 entries.
    TooManyCsrcs { len: usize },
    /// Extension start bits must be exactly 2 bytes.
    StartBits { len: usize },
    /// Extension body is not a multiple of 4 bytes.
    Unaligned { len: usize },
    /// Extension body holds more than 65535 32-bit words.
    TooLong { words: usize },
    /// The extension's length field disagrees with the bytes present.
    LengthFieldMismatch { declared: u16, actual: usize },
    /// The buffer ends before a declared structure does.
    Truncated { needed: usize, available: usize },
}

impl fmt::Display for LengthErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooManyCsrcs { len } => {
                write!(f, "CSRC list length {} exceeds maximum of 15", len)
            }
            Self::StartBits { len } => {
                write!(f, "extension start bits must be 2 bytes, got {}", len)
            }
            Self::Unaligned { len } => {
                write!(f, "extension body of {} bytes is not 32-bit aligned", len)
            }
            Self::TooLong { words } => {
                write!(f, "extension body of {} words exceeds 65535", words)
            }
            Self::LengthFieldMismatch { declared, actual } => write!(
                f,
                "extension length field says {} words, buffer holds {} bytes",
                declared, actual
            ),
            Self::Truncated { needed, available } => {
                write!(f, "buffer truncated: need {} bytes, have {}", needed, available)
            }
        }
    }
}

impl RtpError {
    pub(crate) fn length(kind: LengthErrorKind) -> Self {
        RtpError::Length { kind }
    }
}

/// Convenience alias for `Result<T, RtpError>`.
pub type Result<T> = std::result::Result<T, RtpError>;
