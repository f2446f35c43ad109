/// Errors that can occur while decoding wire records.
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    /// The record block contains bytes that are not valid text.
    #[error("record is not valid text: {0}")]
    NotText(#[from] std::str::Utf8Error),

    /// A required field is missing from the record.
    #[error("missing {field} field in record")]
    MissingField { field: &'static str },

    /// The address field is not 16 hex digits.
    #[error("bad address field {field:?}")]
    BadAddress { field: String },

    /// The command field is not a known token.
    #[error("unknown command token {token:?}")]
    UnknownCommand { token: String },

    /// The cycle field is not a decimal integer.
    #[error("bad cycle field {field:?}")]
    BadCycle { field: String },
}

pub type Result<T> = std::result::Result<T, WireError>;
