use thiserror::Error;

/// Errors returned while classifying and decoding a log record.
///
/// Every variant is a per-record condition: a caller scanning many records
/// can report it and move on to the next window.
///
/// # Examples
/// ```
/// use ibf_core::DecodeError;
///
/// let err = DecodeError::UnknownRecordKind { value: 9 };
/// assert!(err.to_string().contains("unknown log record type"));
/// assert_eq!(err.id(), "IBF-UNKNOWN-RECORD-KIND");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("insufficient data: need at least {needed} bytes, got {actual}")]
    InsufficientData { needed: usize, actual: usize },
    #[error("unknown log record type: {value}")]
    UnknownRecordKind { value: u8 },
    #[error("unknown history log record type: {value}")]
    UnknownHistoryKind { value: u32 },
    #[error("record truncated at offset {offset}: need {needed} bytes, {remaining} remaining")]
    Truncated {
        offset: usize,
        needed: usize,
        remaining: usize,
    },
    #[error("record size mismatch: header declares {declared} bytes, decoded {consumed}")]
    RecordSizeMismatch { declared: u16, consumed: usize },
}

impl DecodeError {
    /// Stable identifier used in reports and CLI listings.
    pub fn id(&self) -> &'static str {
        match self {
            DecodeError::InsufficientData { .. } => "IBF-INSUFFICIENT-DATA",
            DecodeError::UnknownRecordKind { .. } => "IBF-UNKNOWN-RECORD-KIND",
            DecodeError::UnknownHistoryKind { .. } => "IBF-UNKNOWN-HISTORY-KIND",
            DecodeError::Truncated { .. } => "IBF-TRUNCATED",
            DecodeError::RecordSizeMismatch { .. } => "IBF-RECORD-SIZE-MISMATCH",
        }
    }
}
