//! Cursors: the uniform read surface scanners are written against.
//!
//! A cursor layers position tracking and rollback bookkeeping on top of one
//! concrete source shape. Scanners only ever see `dyn Cursor`, so a value
//! scanner is written once and runs against every source category. Two
//! implementations exist: the direct one over contiguous memory and the
//! general one over an [`ErasedSource`].
//!
//! Rollback is an explicit checkpoint, not a transaction: the visitor saves
//! the position before invoking a scanner and restores it when the scanner
//! fails recoverably. Checkpoints are only valid within one scan call.

use crate::{
    chars::ScanChar,
    error::{Error, Expected},
    source::erased::ErasedSource,
};

/// The primitives scanners consume characters through.
///
/// Positions handed to [`advance_to`](Cursor::advance_to) and reported by
/// [`consumed`](Cursor::consumed) are unit offsets from the start of the
/// current scan call.
pub trait Cursor<'s, C: ScanChar> {
    /// The unit at the cursor. Pulls from the backing when needed; fails
    /// with `EndOfRange` at the end of the source.
    fn peek(&mut self) -> Expected<C>;

    /// Moves the cursor forward over `n` already-observed units.
    fn advance(&mut self, n: usize);

    /// Moves the cursor to an absolute offset previously derived from
    /// [`consumed`](Cursor::consumed).
    fn advance_to(&mut self, pos: usize);

    /// Units consumed since the start of the scan call.
    fn consumed(&self) -> usize;

    /// Whether the cursor sits at the observed end of the source. A source
    /// that has not yet failed a pull does not report the end.
    fn at_end(&self) -> bool;

    /// Up to `max` already-realised units at the cursor, without advancing.
    /// Never pulls; an empty slice does not imply the end of the source.
    fn realised(&self, max: usize) -> &[C];

    /// Up to `max` already-realised units at the cursor, advancing over
    /// everything returned. Callers use this for copy-free bulk reads.
    fn take_buffer(&mut self, max: usize) -> &[C];

    /// Remembers the current position.
    fn set_rollback_point(&mut self);

    /// Restores the last remembered position.
    fn reset_to_rollback_point(&mut self);

    /// The unconsumed remainder of the original input, when the source is
    /// direct contiguous memory. Borrowed views into the input are only
    /// possible on this path.
    fn rest_direct(&self) -> Option<&'s [C]>;
}

/// The direct cursor over contiguous memory. The fast path: every primitive
/// is O(1) and nothing is ever copied.
#[derive(Debug)]
pub struct SliceCursor<'s, C: ScanChar> {
    data: &'s [C],
    pos: usize,
    rollback: usize,
}

impl<'s, C: ScanChar> SliceCursor<'s, C> {
    pub(crate) fn new(data: &'s [C]) -> Self {
        Self {
            data,
            pos: 0,
            rollback: 0,
        }
    }
}

impl<'s, C: ScanChar> Cursor<'s, C> for SliceCursor<'s, C> {
    fn peek(&mut self) -> Expected<C> {
        self.data
            .get(self.pos)
            .copied()
            .ok_or(Error::end_of_range("EOF"))
    }

    fn advance(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.data.len());
    }

    fn advance_to(&mut self, pos: usize) {
        debug_assert!(pos <= self.data.len());
        self.pos = pos.min(self.data.len());
    }

    fn consumed(&self) -> usize {
        self.pos
    }

    fn at_end(&self) -> bool {
        self.pos >= self.data.len()
    }

    fn realised(&self, max: usize) -> &[C] {
        let end = self.pos.saturating_add(max).min(self.data.len());
        &self.data[self.pos..end]
    }

    fn take_buffer(&mut self, max: usize) -> &[C] {
        let end = self.pos.saturating_add(max).min(self.data.len());
        let out = &self.data[self.pos..end];
        self.pos = end;
        out
    }

    fn set_rollback_point(&mut self) {
        self.rollback = self.pos;
    }

    fn reset_to_rollback_point(&mut self) {
        self.pos = self.rollback;
    }

    fn rest_direct(&self) -> Option<&'s [C]> {
        Some(&self.data[self.pos..])
    }
}

/// The general cursor over an erased source.
#[derive(Debug)]
pub struct ErasedCursor<'c, 'r, C: ScanChar> {
    source: &'c mut ErasedSource<'r, C>,
    /// Absolute logical index into the source.
    index: usize,
    /// Logical index where this scan call began.
    start: usize,
    rollback: usize,
}

impl<'c, 'r, C: ScanChar> ErasedCursor<'c, 'r, C> {
    pub(crate) fn new(source: &'c mut ErasedSource<'r, C>) -> Self {
        let start = source.begin_index();
        Self {
            source,
            index: start,
            start,
            rollback: start,
        }
    }
}

impl<'s, C: ScanChar> Cursor<'s, C> for ErasedCursor<'_, '_, C> {
    fn peek(&mut self) -> Expected<C> {
        self.source.get_at(self.index)
    }

    fn advance(&mut self, n: usize) {
        self.index += n;
        self.source.observe(self.index);
    }

    fn advance_to(&mut self, pos: usize) {
        self.index = self.start + pos;
        self.source.observe(self.index);
    }

    fn consumed(&self) -> usize {
        self.index - self.start
    }

    fn at_end(&self) -> bool {
        self.source.is_index_at_end(self.index)
    }

    fn realised(&self, max: usize) -> &[C] {
        let avail = self.source.avail_starting_at(self.index);
        &avail[..max.min(avail.len())]
    }

    fn take_buffer(&mut self, max: usize) -> &[C] {
        let start = self.index;
        let len = self.source.avail_starting_at(start).len().min(max);
        self.index += len;
        self.source.observe(self.index);
        &self.source.avail_starting_at(start)[..len]
    }

    fn set_rollback_point(&mut self) {
        self.rollback = self.index;
    }

    fn reset_to_rollback_point(&mut self) {
        self.index = self.rollback;
    }

    fn rest_direct(&self) -> Option<&'s [C]> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn slice_cursor_roundtrip() {
        let mut cur = SliceCursor::new(b"abc def");
        assert_eq!(cur.peek(), Ok(b'a'));
        cur.advance(4);
        cur.set_rollback_point();
        assert_eq!(cur.take_buffer(usize::MAX), b"def");
        assert!(cur.at_end());
        assert_eq!(cur.peek().map_err(|e| e.kind()), Err(ErrorKind::EndOfRange));
        cur.reset_to_rollback_point();
        assert_eq!(cur.peek(), Ok(b'd'));
        assert_eq!(cur.consumed(), 4);
        assert_eq!(cur.rest_direct(), Some(&b"def"[..]));
    }

    #[test]
    fn erased_cursor_rollback_reobserves_same_units() {
        let mut src = ErasedSource::from_iter("12x".bytes());
        let mut cur = ErasedCursor::new(&mut src);
        cur.set_rollback_point();
        assert_eq!(cur.peek(), Ok(b'1'));
        cur.advance(1);
        assert_eq!(cur.peek(), Ok(b'2'));
        cur.advance(1);
        cur.reset_to_rollback_point();
        assert_eq!(cur.peek(), Ok(b'1'));
        assert_eq!(cur.consumed(), 0);
    }

    #[test]
    fn erased_cursor_take_buffer_is_bounded_by_realised() {
        let mut src = ErasedSource::from_slice(b"hello world");
        let mut cur = ErasedCursor::new(&mut src);
        // nothing realised yet
        assert!(cur.realised(usize::MAX).is_empty());
        cur.peek().unwrap();
        let taken = cur.take_buffer(5).to_vec();
        assert_eq!(taken, b"hello");
        assert_eq!(cur.consumed(), 5);
    }

    #[test]
    fn erased_cursor_resumes_at_committed_begin() {
        let mut src = ErasedSource::from_slice(b"ab cd");
        {
            let mut cur = ErasedCursor::new(&mut src);
            cur.peek().unwrap();
            cur.advance(3);
        }
        src.commit(3);
        let mut cur = ErasedCursor::new(&mut src);
        assert_eq!(cur.peek(), Ok(b'c'));
        assert_eq!(cur.consumed(), 0);
    }
}
