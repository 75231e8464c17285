//! Error type shared by the format compiler and the pack/unpack engines.

/// Errors raised while compiling a format string or packing/unpacking with it.
///
/// `Format`, `Size`, and `Argument` carry the 1-based index of the offending
/// field; `Range` carries the requested bounds as given by the caller.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// Malformed format grammar, unknown type/endianness token, or an invalid
    /// size/endianness combination (including misuse of `all`/`rest`).
    #[error("wrong format: field {field}: {detail}")]
    Format { field: usize, detail: String },
    /// Zero size, size beyond the word width, or not enough input/data.
    #[error("size error: field {field}: {detail}")]
    Size { field: usize, detail: String },
    /// Invalid sub-range selection in an unpack call.
    #[error("invalid range: start position {start}, end position {end}")]
    Range { start: i64, end: i64 },
    /// Value accessor contract violation: missing value or wrong value kind.
    #[error("bad argument: field {field}: {detail}")]
    Argument { field: usize, detail: String },
}

impl Error {
    pub(crate) fn format(field: usize, detail: impl Into<String>) -> Self {
        Error::Format { field, detail: detail.into() }
    }

    pub(crate) fn size(field: usize, detail: impl Into<String>) -> Self {
        Error::Size { field, detail: detail.into() }
    }

    pub(crate) fn argument(field: usize, detail: impl Into<String>) -> Self {
        Error::Argument { field, detail: detail.into() }
    }

    /// 1-based index of the field the error refers to, if any.
    pub fn field(&self) -> Option<usize> {
        match self {
            Error::Format { field, .. }
            | Error::Size { field, .. }
            | Error::Argument { field, .. } => Some(*field),
            Error::Range { .. } => None,
        }
    }
}
