//! The process-wide standard-input sources.
//!
//! One narrow and one wide source exist per process, lazily initialised on
//! first use and never destroyed, so buffered look-ahead survives across
//! calls the way it has to for interleaved reads to make sense. Rust statics
//! force a mutex around them; calls serialise on the lock rather than
//! interleave, and scanning stdin from multiple threads remains unsupported
//! in spirit: the lock keeps it memory-safe, not sensible.

use std::io::{self, IsTerminal};
use std::sync::{Mutex, OnceLock, PoisonError};

use crate::{
    args::ArgStore,
    chars::ScanChar,
    context::{vscan, vscan_default},
    result::ScanResult,
    source::erased::ErasedSource,
    source::file::FileSource,
};

/// The stdin backing is always `io::Stdin`, which is `Send`; the borrowed
/// lifetime is `'static` and no iterator backing can ever be stored here.
struct StdinSource<C: ScanChar>(ErasedSource<'static, C>);

unsafe impl<C: ScanChar> Send for StdinSource<C> {}

static NARROW: OnceLock<Mutex<StdinSource<u8>>> = OnceLock::new();
static WIDE: OnceLock<Mutex<StdinSource<char>>> = OnceLock::new();

fn new_stdin_source<C: ScanChar>() -> StdinSource<C> {
    let stdin = io::stdin();
    let tty = stdin.is_terminal();
    StdinSource(ErasedSource::from_file_source(FileSource::detected(
        stdin, tty,
    )))
}

fn narrow() -> &'static Mutex<StdinSource<u8>> {
    NARROW.get_or_init(|| Mutex::new(new_stdin_source()))
}

fn wide() -> &'static Mutex<StdinSource<char>> {
    WIDE.get_or_init(|| Mutex::new(new_stdin_source()))
}

/// Scans from the process narrow stdin source.
///
/// The core the [`input!`](crate::input) and [`prompt!`](crate::prompt)
/// macros expand to. The residual stays inside the global source, so the
/// result carries no range.
pub fn vscan_stdin<'s>(fmt: &str, args: &ArgStore<'_, 's, u8>) -> ScanResult<()> {
    let mut guard = narrow().lock().unwrap_or_else(PoisonError::into_inner);
    let res = vscan(&mut guard.0, fmt, args);
    ScanResult::new((), res.error())
}

/// Scans from the narrow stdin source with the default format.
pub fn vscan_stdin_default<'s>(args: &ArgStore<'_, 's, u8>) -> ScanResult<()> {
    let mut guard = narrow().lock().unwrap_or_else(PoisonError::into_inner);
    let res = vscan_default(&mut guard.0, args);
    ScanResult::new((), res.error())
}

/// Scans from the process wide stdin source, which decodes UTF-8 into
/// scalar values at pull time.
pub fn vscan_wstdin<'s>(fmt: &str, args: &ArgStore<'_, 's, char>) -> ScanResult<()> {
    let mut guard = wide().lock().unwrap_or_else(PoisonError::into_inner);
    let res = vscan(&mut guard.0, fmt, args);
    ScanResult::new((), res.error())
}
