//! Formatted input scanning over heterogeneous character sources.
//!
//! `fmtscan` parses typed values out of a source of characters, directed by
//! a compact format string, and reports the unconsumed tail. One interface
//! covers contiguous memory (`&str`, slices), memory-mapped files, buffered
//! readers, and arbitrary character iterators; the non-contiguous shapes are
//! unified behind a buffered, type-erased source with look-ahead and
//! rollback.
//!
//! # Examples
//!
//! Scanning a string slice:
//!
//! ```
//! use fmtscan::scan;
//!
//! let mut n = 0i32;
//! let mut word = String::new();
//! let result = scan!("42 hello", "{} {}", n, word);
//! assert!(result.is_ok());
//! assert_eq!((n, word.as_str()), (42, "hello"));
//! assert_eq!(*result.range(), "");
//! ```
//!
//! Successive calls on one buffered source pick up where the previous call
//! stopped:
//!
//! ```
//! use fmtscan::{scan_default, Buffering, ErasedSource, FileSource};
//!
//! let reader = &b"123 word"[..];
//! let mut src: ErasedSource<'_, u8> = ErasedSource::from_file_source(FileSource::new(reader, Buffering::Full));
//! let mut n = 0u32;
//! let mut s = String::new();
//! assert!(scan_default!(&mut src, n).is_ok());
//! assert!(scan_default!(&mut src, s).is_ok());
//! assert_eq!((n, s.as_str()), (123, "word"));
//! ```
//!
//! A failed placeholder rolls the source back to where its input started and
//! leaves the target value untouched:
//!
//! ```
//! use fmtscan::{scan, ErrorKind};
//!
//! let mut flag = false;
//! let result = scan!("2", "{}", flag);
//! assert_eq!(result.error().map(|e| e.kind()), Some(ErrorKind::InvalidScannedValue));
//! assert_eq!(*result.range(), "2");
//! ```

#![no_std]

extern crate alloc;

#[cfg(any(test, feature = "std"))]
extern crate std;

mod args;
mod chars;
mod context;
mod cursor;
mod error;
mod format;
mod locale;
mod macros;
mod result;
mod scanners;
mod source;

pub use args::{ArgStore, ScanArg, Tag, MAX_PACKED};
pub use chars::{Decode, ScanChar};
pub use context::{
    getline, getline_with, make_result, vscan, vscan_default, vscan_localized, vscan_usertype,
    ScanContext,
};
#[doc(hidden)]
pub use context::ScanRequest;
pub use cursor::{Cursor, ErasedCursor, SliceCursor};
pub use error::{Error, ErrorKind, Expected};
pub use locale::Locale;
pub use result::ScanResult;
pub use scanners::{CharBuffer, Scannable};
pub use source::{erase, erase_expected, ErasedSource, ScanSource, SourceIter};

#[cfg(feature = "std")]
pub use source::{vscan_stdin, vscan_stdin_default, vscan_wstdin, Buffering, FileSource, ReadSeek};

#[cfg(feature = "mmap")]
pub use source::MappedFile;
