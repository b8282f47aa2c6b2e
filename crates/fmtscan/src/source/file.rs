//! The buffered reader backing.
//!
//! [`FileSource`] adapts any [`std::io::Read`] into a unit producer for
//! [`ErasedSource`](crate::ErasedSource). It owns a block-sized scratch
//! buffer and one of four pull strategies; wide sources decode UTF-8
//! incrementally at pull time, so the width of the source is fixed at
//! construction and never converted afterwards.
//!
//! The adapter does not open or close anything: dropping the boxed reader
//! releases whatever the reader owns, and nothing more.

use std::boxed::Box;
use std::io::{IsTerminal, Read, Seek, SeekFrom};
use std::vec;
use std::vec::Vec;

use core::fmt;
use core::marker::PhantomData;

use crate::{
    chars::{Decode, ScanChar},
    error::{Error, Expected},
};

/// Block size for [`Buffering::Full`] pulls.
const BLOCK: usize = 8 * 1024;

/// How a [`FileSource`] pulls from its reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Buffering {
    /// Read a block at a time.
    Full,
    /// Read unit by unit until a line feed.
    Line,
    /// Read exactly one unit per pull.
    None,
    /// Resolve at construction: a terminal reads unbuffered, everything
    /// else reads full blocks.
    #[default]
    Detect,
}

impl Buffering {
    fn resolve(self, is_terminal: bool) -> Self {
        match self {
            Buffering::Detect => {
                if is_terminal {
                    Buffering::None
                } else {
                    Buffering::Full
                }
            }
            other => other,
        }
    }
}

/// A reader that can also reposition itself, for [`ErasedSource::sync`]
/// (see [`crate::ErasedSource::sync`]).
pub trait ReadSeek: Read + Seek {}
impl<T: Read + Seek> ReadSeek for T {}

enum ReaderKind<'r> {
    Plain(Box<dyn Read + Send + 'r>),
    Seekable(Box<dyn ReadSeek + Send + 'r>),
}

impl Read for ReaderKind<'_> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match self {
            ReaderKind::Plain(r) => r.read(buf),
            ReaderKind::Seekable(r) => r.read(buf),
        }
    }
}

/// A buffered, strategy-driven reader backing.
pub struct FileSource<'r, C: ScanChar> {
    reader: ReaderKind<'r>,
    strategy: Buffering,
    /// Scratch for block reads.
    block: Vec<u8>,
    /// Raw bytes read but not yet decoded into units.
    pending: Vec<u8>,
    eof: bool,
    _unit: PhantomData<C>,
}

impl<'r, C: ScanChar> FileSource<'r, C> {
    /// Wraps a plain reader.
    ///
    /// [`Buffering::Detect`] resolves to [`Buffering::Full`] here: a bare
    /// reader exposes no terminal-ness. Use [`FileSource::from_file`] (or
    /// the stdin entry points) to get real detection.
    pub fn new<R>(reader: R, buffering: Buffering) -> Self
    where
        R: Read + Send + 'r,
    {
        Self::build(ReaderKind::Plain(Box::new(reader)), buffering, false)
    }

    /// Wraps a seekable reader, enabling handle re-synchronisation in
    /// [`crate::ErasedSource::sync`].
    pub fn from_seekable<R>(reader: R, buffering: Buffering) -> Self
    where
        R: Read + Seek + Send + 'r,
    {
        Self::build(ReaderKind::Seekable(Box::new(reader)), buffering, false)
    }

    /// Wraps an opened file. Seekable, with real terminal detection.
    #[must_use]
    pub fn from_file(file: std::fs::File, buffering: Buffering) -> FileSource<'static, C> {
        let tty = file.is_terminal();
        FileSource::build(ReaderKind::Seekable(Box::new(file)), buffering, tty)
    }

    pub(crate) fn detected<R>(reader: R, is_terminal: bool) -> Self
    where
        R: Read + Send + 'r,
    {
        Self::build(
            ReaderKind::Plain(Box::new(reader)),
            Buffering::Detect,
            is_terminal,
        )
    }

    fn build(reader: ReaderKind<'r>, buffering: Buffering, is_terminal: bool) -> Self {
        Self {
            reader,
            strategy: buffering.resolve(is_terminal),
            block: vec![0; BLOCK],
            pending: Vec::new(),
            eof: false,
            _unit: PhantomData,
        }
    }

    /// The resolved pull strategy.
    #[must_use]
    pub fn buffering(&self) -> Buffering {
        self.strategy
    }

    /// Appends units to `out` according to the pull strategy.
    ///
    /// `Ok(0)` means end of stream. A transient I/O failure surfaces as
    /// [`ErrorKind::SourceError`](crate::ErrorKind::SourceError) and leaves
    /// the stream usable; a later pull retries.
    pub(crate) fn fill(&mut self, out: &mut Vec<C>, _want: usize) -> Expected<usize> {
        if self.eof {
            return Ok(0);
        }
        match self.strategy {
            Buffering::Full | Buffering::Detect => self.fill_block(out),
            Buffering::Line => self.fill_line(out),
            Buffering::None => Ok(match self.next_unit()? {
                Some(c) => {
                    out.push(c);
                    1
                }
                None => 0,
            }),
        }
    }

    pub(crate) fn exhausted(&self) -> bool {
        self.eof
    }

    fn fill_block(&mut self, out: &mut Vec<C>) -> Expected<usize> {
        loop {
            let decoded = self.drain_pending(out)?;
            if decoded > 0 {
                return Ok(decoded);
            }
            let got = self.read_some()?;
            if got == 0 {
                self.eof = true;
                if !self.pending.is_empty() {
                    self.pending.clear();
                    return Err(Error::unrecoverable("truncated character at end of stream"));
                }
                return Ok(0);
            }
        }
    }

    fn fill_line(&mut self, out: &mut Vec<C>) -> Expected<usize> {
        let nl = C::from_ascii(b'\n');
        let mut appended = 0;
        loop {
            match self.next_unit()? {
                Some(c) => {
                    out.push(c);
                    appended += 1;
                    if c == nl {
                        break;
                    }
                }
                None => break,
            }
        }
        Ok(appended)
    }

    /// Decodes every complete unit sitting in `pending`.
    fn drain_pending(&mut self, out: &mut Vec<C>) -> Expected<usize> {
        let mut offset = 0;
        let mut decoded = 0;
        loop {
            match C::decode(&self.pending[offset..]) {
                Decode::Unit(c, n) => {
                    out.push(c);
                    offset += n;
                    decoded += 1;
                }
                Decode::Incomplete => break,
                Decode::Invalid => {
                    self.eof = true;
                    self.pending.clear();
                    return Err(Error::unrecoverable("invalid UTF-8 in source"));
                }
            }
        }
        self.pending.drain(..offset);
        Ok(decoded)
    }

    /// Reads one unit, pulling bytes one at a time.
    fn next_unit(&mut self) -> Expected<Option<C>> {
        loop {
            match C::decode(&self.pending) {
                Decode::Unit(c, n) => {
                    self.pending.drain(..n);
                    return Ok(Some(c));
                }
                Decode::Invalid => {
                    self.eof = true;
                    self.pending.clear();
                    return Err(Error::unrecoverable("invalid UTF-8 in source"));
                }
                Decode::Incomplete => {
                    let mut byte = [0u8; 1];
                    let got = read_retrying(&mut self.reader, &mut byte)?;
                    if got == 0 {
                        self.eof = true;
                        if self.pending.is_empty() {
                            return Ok(None);
                        }
                        self.pending.clear();
                        return Err(Error::unrecoverable("truncated character at end of stream"));
                    }
                    self.pending.push(byte[0]);
                }
            }
        }
    }

    fn read_some(&mut self) -> Expected<usize> {
        let got = read_retrying(&mut self.reader, &mut self.block)?;
        self.pending.extend_from_slice(&self.block[..got]);
        Ok(got)
    }

    /// Drops raw undecoded bytes, reporting how many there were.
    pub(crate) fn take_pending_len(&mut self) -> usize {
        let n = self.pending.len();
        self.pending.clear();
        n
    }

    /// Seeks the reader back by `bytes`. `Ok(false)` when the reader cannot
    /// seek; a successful rewind clears the EOF observation.
    pub(crate) fn rewind(&mut self, bytes: u64) -> Expected<bool> {
        let ReaderKind::Seekable(reader) = &mut self.reader else {
            return Ok(false);
        };
        let back = i64::try_from(bytes)
            .map_err(|_| Error::invalid_argument("rewind distance out of range"))?;
        reader
            .seek(SeekFrom::Current(-back))
            .map_err(|_| Error::source("seek failed"))?;
        self.eof = false;
        Ok(true)
    }
}

fn read_retrying(reader: &mut impl Read, buf: &mut [u8]) -> Expected<usize> {
    loop {
        match reader.read(buf) {
            Ok(n) => return Ok(n),
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
            Err(_) => return Err(Error::source("read from source failed")),
        }
    }
}

impl<C: ScanChar> fmt::Debug for FileSource<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileSource")
            .field("strategy", &self.strategy)
            .field("pending", &self.pending.len())
            .field("eof", &self.eof)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::String;

    #[test]
    fn detect_resolution() {
        assert_eq!(Buffering::Detect.resolve(true), Buffering::None);
        assert_eq!(Buffering::Detect.resolve(false), Buffering::Full);
        assert_eq!(Buffering::Line.resolve(true), Buffering::Line);
    }

    #[test]
    fn unbuffered_pulls_exactly_one_unit() {
        let mut src = FileSource::<u8>::new(&b"xyz"[..], Buffering::None);
        let mut out = Vec::new();
        assert_eq!(src.fill(&mut out, 8), Ok(1));
        assert_eq!(out, b"x");
    }

    #[test]
    fn line_buffering_stops_after_newline() {
        let mut src = FileSource::<u8>::new(&b"one\ntwo\n"[..], Buffering::Line);
        let mut out = Vec::new();
        assert_eq!(src.fill(&mut out, 1), Ok(4));
        assert_eq!(out, b"one\n");
        assert_eq!(src.fill(&mut out, 1), Ok(4));
        assert_eq!(out, b"one\ntwo\n");
        assert_eq!(src.fill(&mut out, 1), Ok(0));
        assert!(src.exhausted());
    }

    #[test]
    fn full_buffering_reads_everything_small() {
        let mut src = FileSource::<u8>::new(&b"123 word another"[..], Buffering::Full);
        let mut out = Vec::new();
        assert_eq!(src.fill(&mut out, 1), Ok(16));
        assert_eq!(src.fill(&mut out, 1), Ok(0));
    }

    #[test]
    fn wide_source_decodes_utf8_at_pull_time() {
        let text = "r\u{00e4}ksm\u{00f6}rg\u{00e5}s";
        let mut src = FileSource::<char>::new(text.as_bytes(), Buffering::Full);
        let mut out = Vec::new();
        src.fill(&mut out, 1).unwrap();
        assert_eq!(out.iter().collect::<String>(), text);
    }

    #[test]
    fn truncated_sequence_is_unrecoverable() {
        let bytes = &"\u{2603}".as_bytes()[..2];
        let mut src = FileSource::<char>::new(bytes, Buffering::Full);
        let mut out = Vec::new();
        let err = src.fill(&mut out, 1).unwrap_err();
        assert_eq!(
            err.kind(),
            crate::ErrorKind::UnrecoverableSourceError
        );
        assert!(src.exhausted());
    }
}
