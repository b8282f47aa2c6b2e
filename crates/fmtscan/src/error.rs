//! The error surface of the crate.
//!
//! Errors are plain values: every fallible operation in the pipeline returns
//! [`Expected`], and the user-facing entry points fold the error into a
//! [`ScanResult`](crate::ScanResult) together with the unconsumed tail of the
//! input.

use thiserror::Error;

/// The closed set of failure categories a scan can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The source ran out of characters.
    EndOfRange,
    /// The format string itself is malformed, or references an argument that
    /// does not exist. Not recoverable: the source was never touched in a
    /// meaningful way.
    InvalidFormatString,
    /// The characters at the cursor do not form a valid value of the
    /// requested type. The source is rolled back to where the value started.
    InvalidScannedValue,
    /// The scanned value is syntactically valid but does not fit the target
    /// type.
    ValueOutOfRange,
    /// An argument cannot be scanned from this kind of source (for example,
    /// a borrowed view from a non-contiguous source).
    InvalidArgument,
    /// The underlying source failed in a way that may succeed on retry.
    SourceError,
    /// The underlying source failed and cannot be read any further.
    UnrecoverableSourceError,
}

/// An error value: a kind plus a static diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{msg}")]
pub struct Error {
    kind: ErrorKind,
    msg: &'static str,
}

impl Error {
    pub(crate) const fn new(kind: ErrorKind, msg: &'static str) -> Self {
        Self { kind, msg }
    }

    pub(crate) const fn end_of_range(msg: &'static str) -> Self {
        Self::new(ErrorKind::EndOfRange, msg)
    }

    pub(crate) const fn invalid_format_string(msg: &'static str) -> Self {
        Self::new(ErrorKind::InvalidFormatString, msg)
    }

    pub(crate) const fn invalid_scanned_value(msg: &'static str) -> Self {
        Self::new(ErrorKind::InvalidScannedValue, msg)
    }

    pub(crate) const fn value_out_of_range(msg: &'static str) -> Self {
        Self::new(ErrorKind::ValueOutOfRange, msg)
    }

    pub(crate) const fn invalid_argument(msg: &'static str) -> Self {
        Self::new(ErrorKind::InvalidArgument, msg)
    }

    #[cfg(feature = "std")]
    pub(crate) const fn source(msg: &'static str) -> Self {
        Self::new(ErrorKind::SourceError, msg)
    }

    #[cfg(feature = "std")]
    pub(crate) const fn unrecoverable(msg: &'static str) -> Self {
        Self::new(ErrorKind::UnrecoverableSourceError, msg)
    }

    /// The category of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The static diagnostic attached at the failure site.
    #[must_use]
    pub const fn msg(&self) -> &'static str {
        self.msg
    }

    /// Whether the source was rolled back to a usable position when this
    /// error surfaced.
    ///
    /// Format-string errors and unrecoverable source errors are the two
    /// categories after which scanning must stop; everything else leaves the
    /// source positioned at the start of the failed value.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        !matches!(
            self.kind,
            ErrorKind::InvalidFormatString | ErrorKind::UnrecoverableSourceError
        )
    }
}

/// The internal fallible-operation type.
pub type Expected<T> = Result<T, Error>;
