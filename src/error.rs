use std::string::FromUtf8Error;

use thiserror::Error;

pub type TxLogResult<T, E = TxLogError> = Result<T, E>;

#[derive(Debug, Error)]
pub enum TxLogError {
    #[error("Read past end of log channel")]
    ReadPastEnd,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unknown command type[{0}]")]
    UnknownCommandType(u8),

    #[error("Illegal in use flag: {0}")]
    IllegalInUseFlag(u8),

    #[error("Unknown value type {0}")]
    UnknownValueType(u8),

    #[error("Unknown property type for type {0}")]
    UnknownPropertyType(u8),

    #[error("Invalid dynamic record: {0}")]
    InvalidDynamicRecord(String),

    #[error("Invalid property block: {0}")]
    InvalidPropertyBlock(String),

    #[error("Invalid string: {0}")]
    InvalidString(#[from] FromUtf8Error),

    #[error("Malformed schema rule: {0}")]
    MalformedSchemaRule(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl TxLogError {
    /// True when the channel ran dry mid-entry, i.e. the entry is a truncated tail.
    pub fn is_read_past_end(&self) -> bool {
        matches!(self, TxLogError::ReadPastEnd)
    }

    /// True for format violations in the log bytes themselves. Retrying will not help.
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            TxLogError::UnknownCommandType(_)
                | TxLogError::IllegalInUseFlag(_)
                | TxLogError::UnknownValueType(_)
                | TxLogError::UnknownPropertyType(_)
                | TxLogError::InvalidDynamicRecord(_)
                | TxLogError::InvalidPropertyBlock(_)
                | TxLogError::InvalidString(_)
                | TxLogError::Internal(_)
        )
    }
}
