//! The result of a scan call: residual range plus error.
//!
//! The residual type follows the input category, so chained calls keep the
//! same static shape: scanning a `&str` leaves a `&str`, scanning a borrowed
//! erased source leaves that borrow, and scanning an owned erased source
//! moves it into the result. A failed result still exposes the residual,
//! positioned at the start of the failed token's input, so callers can
//! recover.

use crate::error::{Error, Expected};

/// Residual range plus error for one scan call.
#[must_use = "a ScanResult carries the error and the unconsumed input"]
#[derive(Debug)]
pub struct ScanResult<R> {
    range: R,
    error: Option<Error>,
}

impl<R> ScanResult<R> {
    pub(crate) fn new(range: R, error: Option<Error>) -> Self {
        Self { range, error }
    }

    /// Whether every placeholder scanned successfully.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// The error, when the call failed.
    #[must_use]
    pub fn error(&self) -> Option<Error> {
        self.error
    }

    /// The residual range, by reference.
    #[must_use]
    pub fn range(&self) -> &R {
        &self.range
    }

    /// The residual range, mutably. Needed to continue scanning an erased
    /// residual in place.
    pub fn range_mut(&mut self) -> &mut R {
        &mut self.range
    }

    /// Consumes the result, returning the residual range.
    pub fn into_range(self) -> R {
        self.range
    }

    /// The residual range, copied out. Convenient for view residuals.
    #[must_use]
    pub fn rest(&self) -> R
    where
        R: Copy,
    {
        self.range
    }

    /// Converts into a `Result`, dropping the residual on failure.
    pub fn into_result(self) -> Expected<R> {
        match self.error {
            None => Ok(self.range),
            Some(e) => Err(e),
        }
    }
}
