//! Contains the Error and Result type used by the reader, writer and schema
//! flattener.

/// Various errors that can occur while decoding, encoding or flattening.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    msg: String,
    kind: ErrorKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Any other errors. Users should not match on this variant and should
    /// instead use a wildcard `_`. Errors in this category may be moved to new
    /// variants.
    Other,

    /// A tag byte outside of the 13 defined tags, or an `End` tag where a
    /// payload was expected.
    UnknownTag(u8),

    /// The input ran out part way through some NBT value.
    UnexpectedEof,

    /// Expected unicode data but was not valid. Contains the offending bytes.
    Nonunicode(Vec<u8>),

    /// A list whose items disagree with its declared element tag, or a list of
    /// `End` that is not empty.
    InvalidList,

    /// A value does not have the shape its schema requires.
    SchemaMismatch,

    /// A missing value where the schema requires one and it cannot simply be
    /// left out, eg an element of a list.
    UnrepresentableValue,

    /// A length or depth limit was exceeded, either one from [`DeOpts`] or
    /// one of the format's own length fields.
    ///
    /// [`DeOpts`]: crate::DeOpts
    LimitExceeded,
}

/// Convenience type for Result.
pub type Result<T> = std::result::Result<T, Error>;

impl std::error::Error for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.msg)
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        match e.kind() {
            std::io::ErrorKind::UnexpectedEof => Error::unexpected_eof(),
            _ => Error::bespoke(format!("io error: {}", e)),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::bespoke(format!("json error: {}", e))
    }
}

impl Error {
    /// Get the kind of error.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn is_eof(&self) -> bool {
        matches!(self.kind, ErrorKind::UnexpectedEof)
    }

    pub fn is_schema_mismatch(&self) -> bool {
        matches!(self.kind, ErrorKind::SchemaMismatch)
    }

    pub(crate) fn invalid_tag(tag: u8) -> Error {
        Error {
            msg: format!("invalid nbt tag value: {}", tag),
            kind: ErrorKind::UnknownTag(tag),
        }
    }

    pub(crate) fn unexpected_end() -> Error {
        Error {
            msg: "unexpected end tag, was expecting payload of a value".to_owned(),
            kind: ErrorKind::UnknownTag(0),
        }
    }

    pub(crate) fn no_root_compound() -> Error {
        Error::bespoke("invalid nbt: no root compound".to_owned())
    }

    pub(crate) fn nonunicode_string(data: &[u8]) -> Error {
        Error {
            msg: format!(
                "invalid nbt string: nonunicode: {}",
                String::from_utf8_lossy(data)
            ),
            kind: ErrorKind::Nonunicode(data.to_vec()),
        }
    }

    pub(crate) fn unexpected_eof() -> Error {
        Error {
            msg: "eof: unexpectedly ran out of input".to_owned(),
            kind: ErrorKind::UnexpectedEof,
        }
    }

    pub(crate) fn invalid_list(msg: impl Into<String>) -> Error {
        Error {
            msg: msg.into(),
            kind: ErrorKind::InvalidList,
        }
    }

    pub(crate) fn limit(msg: impl Into<String>) -> Error {
        Error {
            msg: msg.into(),
            kind: ErrorKind::LimitExceeded,
        }
    }

    pub(crate) fn schema_mismatch(path: &str, msg: impl std::fmt::Display) -> Error {
        Error {
            msg: format!("schema mismatch at {}: {}", display_path(path), msg),
            kind: ErrorKind::SchemaMismatch,
        }
    }

    pub(crate) fn unrepresentable(path: &str) -> Error {
        Error {
            msg: format!(
                "unrepresentable value at {}: null or missing where a value is required",
                display_path(path)
            ),
            kind: ErrorKind::UnrepresentableValue,
        }
    }

    pub(crate) fn bespoke(msg: String) -> Error {
        Error {
            msg,
            kind: ErrorKind::Other,
        }
    }
}

fn display_path(path: &str) -> &str {
    if path.is_empty() {
        "<root>"
    } else {
        path
    }
}
