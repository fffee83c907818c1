use std::error::Error;
use std::fmt;

/// How a failure should be treated by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The buffer does not have the shape the operation needs. Fatal.
    Structural,
    /// A single per-slot field could not be decoded. Recovered by the parser.
    FieldDecode,
    /// The request itself is invalid. Raised before any buffer is produced.
    PolicyViolation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreErrorCode {
    InsufficientLength,
    LengthMismatch,
    IndexOutOfRange,
    InactiveSource,
    BufferTooShort,
    FieldDecode,
    Io,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreError {
    pub kind: ErrorKind,
    pub code: CoreErrorCode,
    pub message: String,
    pub offset: Option<usize>,
    pub slot: Option<usize>,
}

impl CoreError {
    pub fn new(kind: ErrorKind, code: CoreErrorCode, message: impl Into<String>) -> Self {
        Self {
            kind,
            code,
            message: message.into(),
            offset: None,
            slot: None,
        }
    }

    pub fn structural(code: CoreErrorCode, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Structural, code, message)
    }

    pub fn policy(code: CoreErrorCode, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::PolicyViolation, code, message)
    }

    pub fn field_decode(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::FieldDecode, CoreErrorCode::FieldDecode, message)
    }

    pub fn at_offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn in_slot(mut self, slot: usize) -> Self {
        self.slot = Some(slot);
        self
    }
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)?;
        if let Some(slot) = self.slot {
            write!(f, " (slot {slot})")?;
        }
        if let Some(offset) = self.offset {
            write!(f, " (offset 0x{offset:X})")?;
        }
        Ok(())
    }
}

impl Error for CoreError {}
