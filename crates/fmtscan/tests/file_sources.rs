use std::io::{Read, Seek, SeekFrom, Write};

use fmtscan::{
    getline, scan, scan_default, Buffering, ErasedSource, ErrorKind, FileSource, MappedFile,
};

fn temp_path(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("fmtscan-{}-{}", std::process::id(), name))
}

#[test]
fn successive_scans_share_the_reader_buffer() {
    let reader = &b"123 word another"[..];
    let mut src: ErasedSource<'_, u8> = ErasedSource::from_file_source(FileSource::new(reader, Buffering::Full));

    let mut n = 0u32;
    let mut w1 = String::new();
    let mut w2 = String::new();
    assert!(scan_default!(&mut src, n).is_ok());
    assert!(scan_default!(&mut src, w1).is_ok());
    assert!(scan_default!(&mut src, w2).is_ok());
    assert_eq!((n, w1.as_str(), w2.as_str()), (123, "word", "another"));

    let mut w3 = String::new();
    let result = scan_default!(&mut src, w3);
    assert_eq!(result.error().map(|e| e.kind()), Some(ErrorKind::EndOfRange));
    assert!(w3.is_empty());
}

#[test]
fn value_ending_at_eof_parses_and_eof_surfaces_on_the_next_call() {
    let mut src: ErasedSource<'_, u8> = ErasedSource::from_file_source(FileSource::new(&b"12"[..], Buffering::Full));
    let mut n = 0u32;
    assert!(scan_default!(&mut src, n).is_ok());
    assert_eq!(n, 12);
    let mut m = 0u32;
    let result = scan_default!(&mut src, m);
    assert_eq!(result.error().map(|e| e.kind()), Some(ErrorKind::EndOfRange));
}

#[test]
fn partial_value_at_eof_is_invalid() {
    let mut src: ErasedSource<'_, u8> = ErasedSource::from_file_source(FileSource::new(&b"-"[..], Buffering::Full));
    let mut n = 0i32;
    let result = scan_default!(&mut src, n);
    assert_eq!(
        result.error().map(|e| e.kind()),
        Some(ErrorKind::InvalidScannedValue)
    );
}

#[test]
fn line_buffered_reader_scans_across_lines() {
    let reader = &b"10 20\n30\n"[..];
    let mut src: ErasedSource<'_, u8> = ErasedSource::from_file_source(FileSource::new(reader, Buffering::Line));
    let mut a = 0u32;
    let mut b = 0u32;
    let mut c = 0u32;
    assert!(scan_default!(&mut src, a, b).is_ok());
    assert!(scan_default!(&mut src, c).is_ok());
    assert_eq!((a, b, c), (10, 20, 30));
}

#[test]
fn unbuffered_reader_scans_unit_by_unit() {
    let reader = &b"7 ok"[..];
    let mut src: ErasedSource<'_, u8> = ErasedSource::from_file_source(FileSource::new(reader, Buffering::None));
    let mut n = 0u32;
    let mut s = String::new();
    assert!(scan_default!(&mut src, n, s).is_ok());
    assert_eq!((n, s.as_str()), (7, "ok"));
}

#[test]
fn wide_reader_decodes_utf8() {
    let text = "sm\u{00f6}rg\u{00e5}s 5";
    let mut src: ErasedSource<'_, char> =
        ErasedSource::from_file_source(FileSource::new(text.as_bytes(), Buffering::Full));
    let mut word = String::new();
    let mut n = 0u32;
    assert!(scan_default!(&mut src, word, n).is_ok());
    assert_eq!(word, "sm\u{00f6}rg\u{00e5}s");
    assert_eq!(n, 5);
}

#[test]
fn getline_on_a_reader_source() {
    let reader = &b"first line\nsecond line\n"[..];
    let mut src: ErasedSource<'_, u8> = ErasedSource::from_file_source(FileSource::new(reader, Buffering::Full));
    let mut line = String::new();
    assert!(getline(&mut src, &mut line).is_ok());
    assert_eq!(line, "first line");
    assert!(getline(&mut src, &mut line).is_ok());
    assert_eq!(line, "second line");
    let result = getline(&mut src, &mut line);
    assert_eq!(result.error().map(|e| e.kind()), Some(ErrorKind::EndOfRange));
}

#[test]
fn sync_repositions_a_seekable_reader() {
    let path = temp_path("sync.txt");
    {
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(b"42 rest of the file").unwrap();
    }

    let file = std::fs::File::open(&path).unwrap();
    let mut src: ErasedSource<'_, u8> =
        ErasedSource::from_file_source(FileSource::from_file(file, Buffering::Full));
    let mut n = 0u32;
    assert!(scan_default!(&mut src, n).is_ok());
    assert_eq!(n, 42);

    // the full-buffered pull read the whole file; sync gives back what was
    // not consumed
    assert!(src.sync().is_ok());

    // reopen the handle position through a fresh read of the same file via
    // the source's reader: scanning continues right after "42"
    let mut word = String::new();
    assert!(scan_default!(&mut src, word).is_ok());
    assert_eq!(word, "rest");

    std::fs::remove_file(&path).ok();
}

#[test]
fn sync_on_a_plain_reader_discards_lookahead() {
    let reader = &b"1 2 3"[..];
    let mut src: ErasedSource<'_, u8> = ErasedSource::from_file_source(FileSource::new(reader, Buffering::Full));
    let mut n = 0u32;
    assert!(scan_default!(&mut src, n).is_ok());
    assert!(src.sync().is_ok());
    // look-ahead is gone for good on a non-seekable reader
    let mut m = 0u32;
    let result = scan_default!(&mut src, m);
    assert_eq!(result.error().map(|e| e.kind()), Some(ErrorKind::EndOfRange));
}

#[test]
fn sync_requires_a_reader_backing() {
    let mut src = ErasedSource::from_slice(b"abc");
    assert_eq!(
        src.sync().map_err(|e| e.kind()),
        Err(ErrorKind::InvalidArgument)
    );
}

#[test]
fn mapped_file_scans_like_contiguous_memory() {
    let path = temp_path("mapped.txt");
    {
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(b"123\nword another").unwrap();
    }

    let map = MappedFile::open(&path).unwrap();
    let mut n = 0u32;
    let first = scan_default!(&map, n);
    assert!(first.is_ok());
    assert_eq!(n, 123);

    let mut w1 = String::new();
    let second = scan_default!(first.rest(), w1);
    assert!(second.is_ok());
    assert_eq!(w1, "word");

    let mut w2 = String::new();
    let third = scan_default!(second.rest(), w2);
    assert!(third.is_ok());
    assert_eq!(w2, "another");

    let mut w3 = String::new();
    let fourth = scan_default!(third.rest(), w3);
    assert_eq!(fourth.error().map(|e| e.kind()), Some(ErrorKind::EndOfRange));

    std::fs::remove_file(&path).ok();
}

#[test]
fn file_source_by_value_moves_into_the_result() {
    let reader = &b"alpha beta"[..];
    let mut w = String::new();
    let result = scan!(FileSource::<u8>::new(reader, Buffering::Full), "{}", w);
    assert!(result.is_ok());
    assert_eq!(w, "alpha");

    let mut src = result.into_range();
    let mut w2 = String::new();
    assert!(scan_default!(&mut src, w2).is_ok());
    assert_eq!(w2, "beta");
}

#[test]
fn seekable_reader_type_checks() {
    // a cursor over bytes is Read + Seek; exercise the seekable constructor
    let mut cur = std::io::Cursor::new(b"9 tail".to_vec());
    cur.seek(SeekFrom::Start(0)).unwrap();
    let mut src: ErasedSource<'_, u8> =
        ErasedSource::from_file_source(FileSource::from_seekable(cur, Buffering::Full));
    let mut n = 0u32;
    assert!(scan_default!(&mut src, n).is_ok());
    assert_eq!(n, 9);
    assert!(src.sync().is_ok());
}

#[test]
fn plain_readers_still_read() {
    struct Chunked<'a>(&'a [u8]);
    impl Read for Chunked<'_> {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            // hand out at most two bytes per call
            let n = self.0.len().min(2).min(buf.len());
            buf[..n].copy_from_slice(&self.0[..n]);
            self.0 = &self.0[n..];
            Ok(n)
        }
    }

    let mut src: ErasedSource<'_, u8> =
        ErasedSource::from_file_source(FileSource::new(Chunked(b"456 end"), Buffering::Full));
    let mut n = 0u32;
    let mut w = String::new();
    assert!(scan_default!(&mut src, n, w).is_ok());
    assert_eq!((n, w.as_str()), (456, "end"));
}
