use thiserror::Error;

use crate::core::PropertyKind;

/// Hard failures of the vCard library.
///
/// Malformed input data never produces one of these; it degrades to a
/// [`Warning`](crate::core::Warning) instead. Errors are reserved for I/O
/// failures and misuse of the API.
#[derive(Error, Debug)]
pub enum VCardError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML error: {0}")]
    Xml(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Type mismatch: scribe for {expected} was given a {found} property")]
    TypeMismatch {
        expected: PropertyKind,
        found: PropertyKind,
    },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error(transparent)]
    Core(#[from] tessera_core::error::CoreError),
}

impl From<quick_xml::Error> for VCardError {
    fn from(e: quick_xml::Error) -> Self {
        Self::Xml(e.to_string())
    }
}

impl From<quick_xml::encoding::EncodingError> for VCardError {
    fn from(e: quick_xml::encoding::EncodingError) -> Self {
        Self::Xml(e.to_string())
    }
}

impl From<quick_xml::escape::EscapeError> for VCardError {
    fn from(e: quick_xml::escape::EscapeError) -> Self {
        Self::Xml(e.to_string())
    }
}

impl From<std::str::Utf8Error> for VCardError {
    fn from(e: std::str::Utf8Error) -> Self {
        Self::Xml(format!("invalid UTF-8: {e}"))
    }
}

pub type VCardResult<T> = std::result::Result<T, VCardError>;
