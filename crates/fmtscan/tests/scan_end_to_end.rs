use fmtscan::{
    erase, getline, getline_with, make_result, scan, scan_default, scan_localized, vscan_usertype,
    ArgStore, CharBuffer, ErasedSource, ErrorKind, Expected, Locale, ScanArg, ScanChar,
    ScanContext, Scannable,
};

#[test]
fn int_and_word_from_str() {
    let mut i = 0i32;
    let mut s = String::new();
    let result = scan!("42 hello", "{} {}", i, s);
    assert!(result.is_ok());
    assert_eq!(i, 42);
    assert_eq!(s, "hello");
    assert_eq!(*result.range(), "");
}

#[test]
fn bool_words() {
    let mut b = false;
    let result = scan!("true", "{}", b);
    assert!(result.is_ok());
    assert!(b);
    assert_eq!(*result.range(), "");

    let mut b = true;
    let result = scan!("false rest", "{}", b);
    assert!(result.is_ok());
    assert!(!b);
    assert_eq!(*result.range(), " rest");
}

#[test]
fn bad_bool_rolls_back_and_leaves_value() {
    let mut b = false;
    let result = scan!("2", "{}", b);
    assert_eq!(
        result.error().map(|e| e.kind()),
        Some(ErrorKind::InvalidScannedValue)
    );
    assert!(!b);
    assert_eq!(*result.range(), "2");
}

#[test]
fn erased_source_iteration_to_the_end() {
    let mut src = erase("abc".bytes());
    let collected: Vec<_> = src.iter().collect();
    assert_eq!(collected, vec![Ok(b'a'), Ok(b'b'), Ok(b'c')]);
    assert_eq!(
        src.get_at(3).map_err(|e| e.kind()),
        Err(ErrorKind::EndOfRange)
    );
    assert!(src.is_index_at_end(3));
}

#[test]
fn empty_source_is_end_of_range() {
    let mut n = 7i32;
    let result = scan!("", "{}", n);
    assert_eq!(result.error().map(|e| e.kind()), Some(ErrorKind::EndOfRange));
    assert_eq!(n, 7);
    assert_eq!(*result.range(), "");
}

#[test]
fn empty_format_leaves_source_untouched() {
    let mut result = scan!("unchanged", "");
    assert!(result.is_ok());
    assert_eq!(*result.range(), "unchanged");

    result = make_result("unchanged");
    assert!(result.is_ok());
    assert_eq!(*result.range(), "unchanged");
}

#[test]
fn residual_chains_with_the_same_shape() {
    let mut a = 0u32;
    let first = scan!("1 2 tail", "{}", a);
    assert!(first.is_ok());
    let mut b = 0u32;
    let second = scan!(first.rest(), " {}", b);
    assert!(second.is_ok());
    assert_eq!((a, b), (1, 2));
    assert_eq!(*second.range(), " tail");

    // two chained scans equal one scan with the concatenated format
    let mut c = 0u32;
    let mut d = 0u32;
    let combined = scan!("1 2 tail", "{} {}", c, d);
    assert_eq!((c, d), (a, b));
    assert_eq!(*combined.range(), " tail");
}

#[test]
fn consumed_plus_residual_is_the_input() {
    let input = "  -17 rest of it";
    let mut n = 0i64;
    let result = scan!(input, "{}", n);
    assert!(result.is_ok());
    let residual = *result.range();
    assert!(input.ends_with(residual));
    assert_eq!(&input[..input.len() - residual.len()], "  -17");
}

#[test]
fn literal_matching_is_exact_and_whitespace_is_elastic() {
    let mut n = 0u32;
    let result = scan!("value:   10", "value: {}", n);
    assert!(result.is_ok());
    assert_eq!(n, 10);

    let mut n = 0u32;
    let result = scan!("a=1", "b={}", n);
    assert_eq!(
        result.error().map(|e| e.kind()),
        Some(ErrorKind::InvalidScannedValue)
    );
    assert_eq!(*result.range(), "a=1");
}

#[test]
fn positional_placeholders() {
    let mut a = 0u32;
    let mut b = 0u32;
    let result = scan!("10 20", "{1} {0}", a, b);
    assert!(result.is_ok());
    assert_eq!((a, b), (20, 10));
}

#[test]
fn mixing_placeholder_modes_is_a_format_error() {
    let mut a = 0u32;
    let mut b = 0u32;
    let result = scan!("1 2", "{} {0}", a, b);
    assert_eq!(
        result.error().map(|e| e.kind()),
        Some(ErrorKind::InvalidFormatString)
    );
}

#[test]
fn out_of_range_index_is_a_format_error() {
    let mut a = 0u32;
    let result = scan!("1", "{5}", a);
    assert_eq!(
        result.error().map(|e| e.kind()),
        Some(ErrorKind::InvalidFormatString)
    );
}

#[test]
fn integer_bases_and_prefixes() {
    let mut n = 0u32;
    assert!(scan!("ff", "{:x}", n).is_ok());
    assert_eq!(n, 255);
    assert!(scan!("0xff", "{:x}", n).is_ok());
    assert_eq!(n, 255);
    assert!(scan!("0o17", "{:o}", n).is_ok());
    assert_eq!(n, 15);
    assert!(scan!("0b101", "{:b}", n).is_ok());
    assert_eq!(n, 5);
    assert!(scan!("0x1A", "{:i}", n).is_ok());
    assert_eq!(n, 26);
    assert!(scan!("777", "{:i}", n).is_ok());
    assert_eq!(n, 777);

    // a bare "0x" scans the zero and leaves the x
    let result = scan!("0x", "{:x}", n);
    assert!(result.is_ok());
    assert_eq!(n, 0);
    assert_eq!(*result.range(), "x");
}

#[test]
fn integer_overflow_is_out_of_range_and_rolled_back() {
    let mut n = 0i32;
    let result = scan!("99999999999999999999", "{}", n);
    assert_eq!(
        result.error().map(|e| e.kind()),
        Some(ErrorKind::ValueOutOfRange)
    );
    assert_eq!(n, 0);
    assert_eq!(*result.range(), "99999999999999999999");
}

#[test]
fn negative_into_unsigned_fails() {
    let mut n = 0u16;
    let result = scan!("-3", "{}", n);
    assert_eq!(
        result.error().map(|e| e.kind()),
        Some(ErrorKind::InvalidScannedValue)
    );
    assert_eq!(*result.range(), "-3");
}

#[test]
fn floats() {
    let mut x = 0.0f64;
    let mut y = 0.0f32;
    let result = scan!("3.25 -2e3", "{} {}", x, y);
    assert!(result.is_ok());
    assert_eq!(x, 3.25);
    assert_eq!(y, -2000.0);

    let mut inf = 0.0f64;
    assert!(scan!("inf", "{}", inf).is_ok());
    assert!(inf.is_infinite());

    let mut nan = 0.0f64;
    assert!(scan!("NaN", "{}", nan).is_ok());
    assert!(nan.is_nan());

    // a dangling exponent marker stays in the residual
    let mut z = 0.0f64;
    let result = scan!("10e rest", "{}", z);
    assert!(result.is_ok());
    assert_eq!(z, 10.0);
    assert_eq!(*result.range(), "e rest");
}

#[test]
fn float_overflow_is_out_of_range() {
    let mut x = 0.0f32;
    let result = scan!("1e999", "{}", x);
    assert_eq!(
        result.error().map(|e| e.kind()),
        Some(ErrorKind::ValueOutOfRange)
    );
}

#[test]
fn localized_decimal_point_and_grouping() {
    let mut price = 0.0f64;
    let result = scan_localized!("1,5 x", Locale::new(',', '.'), "{}", price);
    assert!(result.is_ok());
    assert_eq!(price, 1.5);

    let mut n = 0u64;
    let result = scan_localized!("1,234,567", Locale::default(), "{:n}", n);
    assert!(result.is_ok());
    assert_eq!(n, 1_234_567);
}

#[test]
fn code_points_and_raw_units() {
    let mut c = '\0';
    let mut rest = String::new();
    let result = scan!("\u{00e9}tude", "{}{}", c, rest);
    assert!(result.is_ok());
    assert_eq!(c, '\u{00e9}');
    assert_eq!(rest, "tude");

    let mut b1 = 0u8;
    let mut b2 = 0u8;
    let result = scan!("xy", "{}{}", b1, b2);
    assert!(result.is_ok());
    assert_eq!((b1, b2), (b'x', b'y'));
}

#[test]
fn borrowed_views_from_direct_sources() {
    let mut word: &str = "";
    let mut bytes: &[u8] = &[];
    let result = scan!("alpha beta", "{} {}", word, bytes);
    assert!(result.is_ok());
    assert_eq!(word, "alpha");
    assert_eq!(bytes, b"beta");
}

#[test]
fn borrowed_views_need_a_direct_source() {
    let mut word: &str = "";
    let mut src = erase("alpha".bytes());
    let result = scan!(&mut src, "{}", word);
    assert_eq!(
        result.error().map(|e| e.kind()),
        Some(ErrorKind::InvalidArgument)
    );
}

#[test]
fn char_buffer_fills_completely_or_not_at_all() {
    let mut buf = [0u8; 3];
    let mut target = CharBuffer(&mut buf);
    let result = scan!("abcdef", "{}", target);
    assert!(result.is_ok());
    assert_eq!(*result.range(), "def");
    assert_eq!(&buf, b"abc");

    let mut buf = [0u8; 8];
    let mut target = CharBuffer(&mut buf);
    let result = scan!("abc", "{}", target);
    assert_eq!(result.error().map(|e| e.kind()), Some(ErrorKind::EndOfRange));
    assert_eq!(*result.range(), "abc");
    assert_eq!(&buf, &[0u8; 8]);
}

#[test]
fn wide_sources_scan_the_same_values() {
    let units: Vec<char> = "42 hello".chars().collect();
    let mut n = 0i32;
    let mut s = String::new();
    let result = scan_default!(&units, n, s);
    assert!(result.is_ok());
    assert_eq!((n, s.as_str()), (42, "hello"));
    assert!(result.range().is_empty());
}

#[test]
fn erased_sources_scan_across_calls() {
    let mut src = erase("123 word another".bytes());
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
}

#[test]
fn owned_erased_source_moves_into_the_result() {
    let src = ErasedSource::from_units("10 20".bytes().collect());
    let mut a = 0u32;
    let result = scan_default!(src, a);
    assert!(result.is_ok());
    assert_eq!(a, 10);

    let owned = result.into_range();
    let mut b = 0u32;
    let result = scan_default!(owned, b);
    assert!(result.is_ok());
    assert_eq!(b, 20);
}

#[test]
fn getline_takes_the_delimiter_but_not_into_the_string() {
    let mut line = String::new();
    let result = getline("first line\nsecond", &mut line);
    assert!(result.is_ok());
    assert_eq!(line, "first line");
    assert_eq!(*result.range(), "second");

    let mut line = String::new();
    let result = getline_with("a;b;c", &mut line, ';');
    assert!(result.is_ok());
    assert_eq!(line, "a");
    assert_eq!(*result.range(), "b;c");

    // end of input without a delimiter still yields the collected text
    let mut line = String::new();
    let result = getline("no newline", &mut line);
    assert!(result.is_ok());
    assert_eq!(line, "no newline");

    let mut line = String::new();
    let result = getline("", &mut line);
    assert_eq!(result.error().map(|e| e.kind()), Some(ErrorKind::EndOfRange));
}

#[derive(Debug, Default, PartialEq)]
struct Point {
    x: i32,
    y: i32,
}

impl<'s, C: ScanChar> Scannable<'s, C> for Point {
    fn scan(&mut self, _options: &str, ctx: &mut ScanContext<'_, 's, C>) -> Expected<()> {
        let mut x = 0i32;
        let mut y = 0i32;
        let store = ArgStore::build([ScanArg::new(&mut x), ScanArg::new(&mut y)]);
        vscan_usertype(ctx, "({}, {})", &store)?;
        *self = Point { x, y };
        Ok(())
    }
}

#[test]
fn custom_types_scan_through_nested_formats() {
    let mut p = Point::default();
    let mut label = String::new();
    let result = scan!("(4, -7) origin", "{} {}", p, label);
    assert!(result.is_ok());
    assert_eq!(p, Point { x: 4, y: -7 });
    assert_eq!(label, "origin");
}

#[test]
fn custom_type_failure_rolls_back_the_whole_value() {
    let mut p = Point { x: 1, y: 2 };
    let result = scan!("(4; 7)", "{}", p);
    assert_eq!(
        result.error().map(|e| e.kind()),
        Some(ErrorKind::InvalidScannedValue)
    );
    assert_eq!(p, Point { x: 1, y: 2 });
    assert_eq!(*result.range(), "(4; 7)");
}

#[test]
fn more_arguments_than_fit_in_the_packed_word() {
    let mut vals = [0u32; 14];
    let input = "0 1 2 3 4 5 6 7 8 9 10 11 12 13";
    let mut it = vals.iter_mut();
    let args: [ScanArg<'_, '_, u8>; 14] =
        std::array::from_fn(|_| ScanArg::new(it.next().unwrap()));
    let store = ArgStore::build(args);
    let result = fmtscan::vscan_default(input, &store);
    assert!(result.is_ok());
    for (i, v) in vals.iter().enumerate() {
        assert_eq!(*v, i as u32);
    }
}

#[test]
fn brace_escapes_match_literal_braces() {
    let mut n = 0u32;
    let result = scan!("{7}", "{{{}}}", n);
    assert!(result.is_ok());
    assert_eq!(n, 7);
}
