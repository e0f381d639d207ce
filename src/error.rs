//! Error types shared by every stage of the geometry pipeline.
//!
//! Every failure is terminal for the call that produced it: nothing in this
//! crate retries, and no stage ever hands back a partial result.

/// Errors produced while fetching, parsing, analyzing or encoding a route.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[cfg_attr(feature = "ffi", derive(uniffi::Error))]
#[cfg_attr(feature = "ffi", uniffi(flat_error))]
pub enum GeometryError {
    /// Network failure, timeout or non-success HTTP status while fetching a GPX document.
    #[error("fetch failed: {0}")]
    Fetch(String),

    /// The document is not UTF-8 or not well-formed XML.
    #[error("GPX parse error: {0}")]
    Parse(String),

    /// The document parsed but contains no track or route points.
    #[error("no track or route points found in GPX document")]
    NoData,

    /// Structurally invalid input handed to the polyline codec.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Fieldless classification of a [`GeometryError`], for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "ffi", derive(uniffi::Enum))]
pub enum ErrorKind {
    Fetch,
    Parse,
    NoData,
    InvalidInput,
}

impl GeometryError {
    /// The kind of failure, without its diagnostic payload.
    pub fn kind(&self) -> ErrorKind {
        match self {
            GeometryError::Fetch(_) => ErrorKind::Fetch,
            GeometryError::Parse(_) => ErrorKind::Parse,
            GeometryError::NoData => ErrorKind::NoData,
            GeometryError::InvalidInput(_) => ErrorKind::InvalidInput,
        }
    }
}

pub type Result<T> = std::result::Result<T, GeometryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_matches_variant() {
        assert_eq!(GeometryError::Fetch("timeout".into()).kind(), ErrorKind::Fetch);
        assert_eq!(GeometryError::Parse("eof".into()).kind(), ErrorKind::Parse);
        assert_eq!(GeometryError::NoData.kind(), ErrorKind::NoData);
        assert_eq!(
            GeometryError::InvalidInput("bad".into()).kind(),
            ErrorKind::InvalidInput
        );
    }

    #[test]
    fn test_display_carries_diagnostic() {
        let err = GeometryError::Parse("unexpected end of document at byte 42".into());
        assert_eq!(err.to_string(), "GPX parse error: unexpected end of document at byte 42");
    }
}
