//! Source preparation: picking the cheapest view for each input shape.
//!
//! [`ScanSource`] is the dispatch that decides how an input is wrapped and
//! what the residual range of a scan over it looks like. String-shaped
//! inputs go down the direct contiguous path and leave a sub-view of
//! themselves; erased sources are scanned in place (borrowed) or moved into
//! the result (owned); everything else is erased first through [`erase`] or
//! the [`ErasedSource`] constructors. Preparing never copies string-like
//! content, it only borrows.
//!
//! The residual category is idempotent: scanning a residual yields a
//! residual of the same type, so chains of calls keep their static shape.

pub(crate) mod erased;
#[cfg(feature = "std")]
pub(crate) mod file;
#[cfg(feature = "mmap")]
pub(crate) mod mapped;
#[cfg(feature = "std")]
pub(crate) mod stdin;

use alloc::string::String;
use alloc::vec::Vec;

use crate::{
    chars::ScanChar,
    context::{run_scan, ScanRequest},
    cursor::{Cursor, ErasedCursor, SliceCursor},
    error::Expected,
    result::ScanResult,
};

pub use erased::{ErasedSource, SourceIter};
#[cfg(feature = "std")]
pub use file::{Buffering, FileSource, ReadSeek};
#[cfg(feature = "mmap")]
pub use mapped::MappedFile;
#[cfg(feature = "std")]
pub use stdin::{vscan_stdin, vscan_stdin_default, vscan_wstdin};

/// An input a scan call can consume.
///
/// `Char` is the unit width of the source; `Range` is the residual type a
/// scan over it returns. Implementations exist for string-shaped slices, for
/// erased sources by `&mut` and by value, for reader and mapped-file
/// sources, and for any user type that wants to define its own view.
pub trait ScanSource<'s>: Sized {
    /// The source unit width.
    type Char: ScanChar;
    /// The residual range type.
    type Range;

    #[doc(hidden)]
    fn scan_impl(self, req: ScanRequest<'_, '_, 's, Self::Char>) -> ScanResult<Self::Range>;
}

/// Clamps a byte offset forward to the next character boundary. A scan that
/// consumed a raw unit out of the middle of a scalar (a `u8` target on text)
/// leaves the torn scalar's remaining bytes behind.
fn str_tail(s: &str, mut i: usize) -> &str {
    while i < s.len() && !s.is_char_boundary(i) {
        i += 1;
    }
    &s[i..]
}

impl<'s> ScanSource<'s> for &'s str {
    type Char = u8;
    type Range = &'s str;

    fn scan_impl(self, req: ScanRequest<'_, '_, 's, u8>) -> ScanResult<&'s str> {
        let mut cursor = SliceCursor::new(self.as_bytes());
        let err = run_scan(&mut cursor, req);
        ScanResult::new(str_tail(self, cursor.consumed()), err)
    }
}

impl<'s> ScanSource<'s> for &'s String {
    type Char = u8;
    type Range = &'s str;

    fn scan_impl(self, req: ScanRequest<'_, '_, 's, u8>) -> ScanResult<&'s str> {
        self.as_str().scan_impl(req)
    }
}

impl<'s, C: ScanChar> ScanSource<'s> for &'s [C] {
    type Char = C;
    type Range = &'s [C];

    fn scan_impl(self, req: ScanRequest<'_, '_, 's, C>) -> ScanResult<&'s [C]> {
        let mut cursor = SliceCursor::new(self);
        let err = run_scan(&mut cursor, req);
        ScanResult::new(&self[cursor.consumed()..], err)
    }
}

impl<'s, C: ScanChar> ScanSource<'s> for &'s Vec<C> {
    type Char = C;
    type Range = &'s [C];

    fn scan_impl(self, req: ScanRequest<'_, '_, 's, C>) -> ScanResult<&'s [C]> {
        self.as_slice().scan_impl(req)
    }
}

impl<'s, C: ScanChar, const N: usize> ScanSource<'s> for &'s [C; N] {
    type Char = C;
    type Range = &'s [C];

    fn scan_impl(self, req: ScanRequest<'_, '_, 's, C>) -> ScanResult<&'s [C]> {
        self.as_slice().scan_impl(req)
    }
}

#[cfg(feature = "mmap")]
impl<'s> ScanSource<'s> for &'s MappedFile {
    type Char = u8;
    type Range = &'s [u8];

    fn scan_impl(self, req: ScanRequest<'_, '_, 's, u8>) -> ScanResult<&'s [u8]> {
        self.bytes().scan_impl(req)
    }
}

impl<'s, 'c, 'r, C: ScanChar> ScanSource<'s> for &'c mut ErasedSource<'r, C> {
    type Char = C;
    type Range = &'c mut ErasedSource<'r, C>;

    fn scan_impl(self, req: ScanRequest<'_, '_, 's, C>) -> ScanResult<Self::Range> {
        let (err, consumed) = {
            let mut cursor = ErasedCursor::new(&mut *self);
            let err = run_scan(&mut cursor, req);
            (err, cursor.consumed())
        };
        self.commit(consumed);
        ScanResult::new(self, err)
    }
}

impl<'s, 'r, C: ScanChar> ScanSource<'s> for ErasedSource<'r, C> {
    type Char = C;
    type Range = ErasedSource<'r, C>;

    fn scan_impl(mut self, req: ScanRequest<'_, '_, 's, C>) -> ScanResult<Self::Range> {
        let (err, consumed) = {
            let mut cursor = ErasedCursor::new(&mut self);
            let err = run_scan(&mut cursor, req);
            (err, cursor.consumed())
        };
        self.commit(consumed);
        ScanResult::new(self, err)
    }
}

#[cfg(feature = "std")]
impl<'s, 'r, C: ScanChar> ScanSource<'s> for FileSource<'r, C> {
    type Char = C;
    type Range = ErasedSource<'r, C>;

    fn scan_impl(self, req: ScanRequest<'_, '_, 's, C>) -> ScanResult<Self::Range> {
        ErasedSource::from_file_source(self).scan_impl(req)
    }
}

/// Erases any unit iterator into a scannable source.
pub fn erase<'r, C, I>(iter: I) -> ErasedSource<'r, C>
where
    C: ScanChar,
    I: Iterator<Item = C> + 'r,
{
    ErasedSource::from_iter(iter)
}

/// Erases a fallible unit iterator into a scannable source.
pub fn erase_expected<'r, C, I>(iter: I) -> ErasedSource<'r, C>
where
    C: ScanChar,
    I: Iterator<Item = Expected<C>> + 'r,
{
    ErasedSource::from_try_iter(iter)
}
