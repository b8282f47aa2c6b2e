//! The type-erased, buffered character source.
//!
//! [`ErasedSource`] unifies categorically different character producers
//! behind one observable contract: a logical, zero-indexed sequence of units
//! with random access to everything already realised, demand-driven pulling
//! from the backing, EOF observation, and rollback support for the cursor
//! layer.
//!
//! Internally it is a realised buffer (`Vec<C>`) plus a [`Backing`]: a tagged
//! variant per producer category instead of an inheritance chain. Producers
//! that expose contiguous memory are bulk-copied; single-pass producers are
//! pulled one unit at a time.
//!
//! Invariants
//! - Every unit with logical index `< base + buffer.len()` is addressable at
//!   `buffer[i - base]`.
//! - The backing cursor always sits at logical index `base + buffer.len()`.
//! - Once EOF has been observed, the backing is never pulled again.
//! - Units below the committed prefix (`begin`) may be reclaimed; everything
//!   at or above `begin` survives, so rollback points taken during one scan
//!   call stay valid.

use alloc::{boxed::Box, vec::Vec};
use core::fmt;

use crate::{
    chars::ScanChar,
    error::{Error, ErrorKind, Expected},
};

#[cfg(feature = "std")]
use crate::source::file::FileSource;

/// Bulk-copy floor for contiguous backings, so that repeated single-unit
/// `get_at` misses do not degenerate into unit-sized copies.
const MIN_BULK: usize = 64;

/// Reclaim the consumed prefix only once it dominates the buffer.
const RECLAIM_THRESHOLD: usize = 4096;

/// The producer behind an [`ErasedSource`].
enum Backing<'r, C: ScanChar> {
    /// Borrowed contiguous memory.
    Slice { data: &'r [C], next: usize },
    /// Owned contiguous memory (an rvalue input moved into the source).
    Owned { data: Vec<C>, next: usize },
    /// A single-pass unit producer. Not restartable.
    Iter {
        iter: Box<dyn Iterator<Item = Expected<C>> + 'r>,
        done: bool,
    },
    /// A buffered reader with a block-sized pull strategy.
    #[cfg(feature = "std")]
    Reader(FileSource<'r, C>),
}

impl<C: ScanChar> Backing<'_, C> {
    /// Appends up to `want` units (at least one unless exhausted) to `out`.
    ///
    /// `Ok(0)` means the backing is exhausted. Errors leave already-appended
    /// units in place.
    fn fill(&mut self, out: &mut Vec<C>, want: usize) -> Expected<usize> {
        match self {
            Backing::Slice { data, next } => Ok(copy_from(data, next, out, want)),
            Backing::Owned { data, next } => Ok(copy_from(data, next, out, want)),
            Backing::Iter { iter, done } => {
                if *done {
                    return Ok(0);
                }
                let mut appended = 0;
                while appended < want {
                    match iter.next() {
                        Some(Ok(c)) => {
                            out.push(c);
                            appended += 1;
                        }
                        Some(Err(e)) if e.kind() == ErrorKind::EndOfRange => {
                            *done = true;
                            break;
                        }
                        Some(Err(e)) => return Err(e),
                        None => {
                            *done = true;
                            break;
                        }
                    }
                }
                Ok(appended)
            }
            #[cfg(feature = "std")]
            Backing::Reader(file) => file.fill(out, want),
        }
    }

    /// Whether the backing can produce no further unit.
    fn exhausted(&self) -> bool {
        match self {
            Backing::Slice { data, next } => *next >= data.len(),
            Backing::Owned { data, next } => *next >= data.len(),
            Backing::Iter { done, .. } => *done,
            #[cfg(feature = "std")]
            Backing::Reader(file) => file.exhausted(),
        }
    }
}

fn copy_from<C: ScanChar>(data: &[C], next: &mut usize, out: &mut Vec<C>, want: usize) -> usize {
    let rest = data.len() - *next;
    let n = want.max(MIN_BULK).min(rest);
    out.extend_from_slice(&data[*next..*next + n]);
    *next += n;
    n
}

/// A type-erased, buffered view over any character producer.
///
/// Construct one with [`erase`](crate::erase) or the `from_*` constructors,
/// then scan it through `&mut` (or by value, moving it into the result):
///
/// ```
/// use fmtscan::{scan, ErasedSource};
///
/// let mut src = ErasedSource::from_try_iter("42 ok".bytes().map(Ok));
/// let mut n = 0i32;
/// let mut word = String::new();
/// let result = scan!(&mut src, "{} {}", n, word);
/// assert!(result.is_ok());
/// assert_eq!((n, word.as_str()), (42, "ok"));
/// ```
pub struct ErasedSource<'r, C: ScanChar> {
    buffer: Vec<C>,
    /// Units reclaimed off the front of the logical sequence.
    base: usize,
    /// Read cursor: one past the highest logical index observed valid.
    read: usize,
    /// First logical index not yet consumed by a committed scan.
    begin: usize,
    /// EOF observed: a pull has failed for good.
    eof: bool,
    backing: Backing<'r, C>,
}

impl<'r, C: ScanChar> ErasedSource<'r, C> {
    fn with_backing(backing: Backing<'r, C>) -> Self {
        Self {
            buffer: Vec::new(),
            base: 0,
            read: 0,
            begin: 0,
            eof: false,
            backing,
        }
    }

    /// Erases a borrowed contiguous slice.
    pub fn from_slice(data: &'r [C]) -> Self {
        Self::with_backing(Backing::Slice { data, next: 0 })
    }

    /// Erases owned contiguous units.
    #[must_use]
    pub fn from_units(data: Vec<C>) -> Self {
        Self::with_backing(Backing::Owned { data, next: 0 })
    }

    /// Erases an infallible unit iterator.
    pub fn from_iter<I>(iter: I) -> Self
    where
        I: Iterator<Item = C> + 'r,
    {
        Self::from_try_iter(iter.map(Ok))
    }

    /// Erases a fallible unit iterator.
    ///
    /// An `Err` with kind [`ErrorKind::EndOfRange`] counts as exhaustion;
    /// any other error is surfaced to the caller of the read that pulled it.
    pub fn from_try_iter<I>(iter: I) -> Self
    where
        I: Iterator<Item = Expected<C>> + 'r,
    {
        Self::with_backing(Backing::Iter {
            iter: Box::new(iter),
            done: false,
        })
    }

    /// Wraps a buffered reader. See [`FileSource`] for the pull strategies.
    #[cfg(feature = "std")]
    pub fn from_file_source(file: FileSource<'r, C>) -> Self {
        Self::with_backing(Backing::Reader(file))
    }

    /// The unit at logical index `i`, pulling from the backing as needed.
    ///
    /// Fails with [`ErrorKind::EndOfRange`] when the backing ends before
    /// index `i` is reached.
    pub fn get_at(&mut self, i: usize) -> Expected<C> {
        if i < self.base {
            debug_assert!(false, "index below reclaimed prefix");
            return Err(Error::invalid_argument("position already reclaimed"));
        }
        if i >= self.base + self.buffer.len() {
            self.fill_to(i)?;
        }
        if self.read < i + 1 {
            self.read = i + 1;
        }
        Ok(self.buffer[i - self.base])
    }

    /// The already-realised units starting at logical index `i`. Never pulls.
    pub fn avail_starting_at(&self, i: usize) -> &[C] {
        if i < self.base || i >= self.base + self.buffer.len() {
            return &[];
        }
        &self.buffer[i - self.base..]
    }

    /// One past the highest logical index observed so far.
    #[must_use]
    pub fn current_index(&self) -> usize {
        self.read
    }

    /// Whether logical index `i` is at the end of the sequence.
    ///
    /// True only once the backing is exhausted, everything realised has been
    /// observed, and `i` is not below the read cursor. A source that has not
    /// yet failed a pull never reports the end; spotting it costs a read.
    #[must_use]
    pub fn is_index_at_end(&self, i: usize) -> bool {
        if i < self.read {
            return false;
        }
        self.backing.exhausted() && self.read == self.base + self.buffer.len()
    }

    /// Materialises `n` further units past the current end of the realised
    /// buffer, skipping the cursor of the backing forward.
    pub fn advance_current(&mut self, n: usize) -> Expected<()> {
        if n == 0 {
            return Ok(());
        }
        self.fill_to(self.base + self.buffer.len() + n - 1)
    }

    fn fill_to(&mut self, i: usize) -> Expected<()> {
        while self.base + self.buffer.len() <= i {
            if self.eof {
                return Err(Error::end_of_range("EOF"));
            }
            let want = i + 1 - self.base - self.buffer.len();
            match self.backing.fill(&mut self.buffer, want) {
                Ok(0) => {
                    self.eof = true;
                    return Err(Error::end_of_range("EOF"));
                }
                Ok(_) => {}
                Err(e) => {
                    if matches!(
                        e.kind(),
                        ErrorKind::EndOfRange | ErrorKind::UnrecoverableSourceError
                    ) {
                        self.eof = true;
                    }
                    return Err(e);
                }
            }
        }
        Ok(())
    }

    /// Logical index where the next scan starts.
    pub(crate) fn begin_index(&self) -> usize {
        self.begin
    }

    /// Marks indexes up to `i` as observed without materialising them one by
    /// one. Used by bulk reads over already-realised units.
    pub(crate) fn observe(&mut self, i: usize) {
        let cap = self.base + self.buffer.len();
        if self.read < i.min(cap) {
            self.read = i.min(cap);
        }
    }

    /// Commits `n` consumed units after a scan call and reclaims the prefix
    /// once it dominates the buffer.
    pub(crate) fn commit(&mut self, n: usize) {
        self.begin += n;
        debug_assert!(self.begin <= self.base + self.buffer.len());
        let consumed = self.begin - self.base;
        if consumed > RECLAIM_THRESHOLD && consumed > self.buffer.len() / 2 {
            self.buffer.drain(..consumed);
            self.base = self.begin;
        }
    }

    /// Iterates the unconsumed tail, pulling on demand.
    ///
    /// The iterator ends when the source does; a non-EOF source failure is
    /// yielded as an `Err` item.
    pub fn iter(&mut self) -> SourceIter<'_, 'r, C> {
        let index = self.begin;
        SourceIter {
            source: self,
            index,
        }
    }

    /// Discards unread buffered content and, when the reader supports
    /// seeking, repositions it to what has actually been consumed.
    ///
    /// Only meaningful for reader-backed sources. For narrow sources on a
    /// seekable reader the handle ends up exactly where scanning stopped;
    /// for wide sources the byte width of the discarded units is no longer
    /// known and the discard alone is performed.
    #[cfg(feature = "std")]
    pub fn sync(&mut self) -> Expected<()> {
        let unread_units = self.base + self.buffer.len() - self.begin;
        let Backing::Reader(file) = &mut self.backing else {
            return Err(Error::invalid_argument(
                "sync requires a reader-backed source",
            ));
        };
        let pending = file.take_pending_len();
        if let Some(width) = fixed_width::<C>() {
            let back = (unread_units * width + pending) as u64;
            if back > 0 && file.rewind(back)? {
                self.eof = false;
            }
        }
        self.buffer.truncate(self.begin - self.base);
        self.read = self.begin;
        Ok(())
    }
}

/// Byte width of one unit when it is fixed; `None` for variable-width units.
#[cfg(feature = "std")]
fn fixed_width<C: ScanChar>() -> Option<usize> {
    (core::mem::size_of::<C>() == 1).then_some(1)
}

impl<C: ScanChar> fmt::Debug for ErasedSource<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErasedSource")
            .field("realised", &self.buffer.len())
            .field("base", &self.base)
            .field("read", &self.read)
            .field("begin", &self.begin)
            .field("eof", &self.eof)
            .finish_non_exhaustive()
    }
}

/// Iterator over the unconsumed tail of an [`ErasedSource`].
pub struct SourceIter<'a, 'r, C: ScanChar> {
    source: &'a mut ErasedSource<'r, C>,
    index: usize,
}

impl<C: ScanChar> Iterator for SourceIter<'_, '_, C> {
    type Item = Expected<C>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.source.get_at(self.index) {
            Ok(c) => {
                self.index += 1;
                Some(Ok(c))
            }
            Err(e) if e.kind() == ErrorKind::EndOfRange => None,
            Err(e) => Some(Err(e)),
        }
    }
}
