//! Memory-mapped file sources.
//!
//! A [`MappedFile`] maps a named file read-only and presents its bytes as a
//! contiguous narrow source, so scanning one goes down the same fast path as
//! scanning a string slice. The mapping is released when the value is
//! dropped. Content is assumed well-formed; no encoding validation happens
//! at map time.

use std::fs::File;
use std::path::Path;

use memmap2::Mmap;

use crate::error::{Error, Expected};

/// A read-only memory mapping of a file.
///
/// ```no_run
/// use fmtscan::{scan, MappedFile};
///
/// let map = MappedFile::open("numbers.txt")?;
/// let mut first = 0u64;
/// let result = scan!(&map, "{}", first);
/// # Ok::<(), fmtscan::Error>(())
/// ```
#[derive(Debug)]
pub struct MappedFile {
    map: Mmap,
}

impl MappedFile {
    /// Maps `path` read-only.
    pub fn open<P: AsRef<Path>>(path: P) -> Expected<Self> {
        let file =
            File::open(path).map_err(|_| Error::source("could not open file for mapping"))?;
        Self::from_handle(&file)
    }

    /// Maps an already-opened file read-only. The handle itself is not
    /// retained; the mapping keeps the content alive on its own.
    pub fn from_handle(file: &File) -> Expected<Self> {
        // Safety contract of the mapping: the file must not be truncated
        // while the map is alive. That is the caller's bargain, same as the
        // original interface this mirrors.
        let map = unsafe { Mmap::map(file) }.map_err(|_| Error::source("mmap failed"))?;
        Ok(Self { map })
    }

    /// The mapped bytes.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.map
    }

    /// Number of mapped bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Whether the mapping is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
