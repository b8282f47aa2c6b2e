//! Per-type value scanners and the tag dispatch.
//!
//! [`Scannable`] is the per-type scanner interface: implementing it for a
//! type makes that type a valid scan target, found by trait lookup and
//! invoked through the function pointer stored in its argument descriptor.
//! The built-in implementations override their [`Tag`] so the argument store
//! can pack them; everything else defaults to [`Tag::Custom`].
//!
//! Options substrings (`{:…}`) reach the scanner verbatim. The built-ins
//! reject options they do not understand as format errors.
//!
//! Token-to-value conversion goes through `from_str`-family parsing on an
//! accumulated ASCII token; the conversion routines themselves are not this
//! crate's business.

use alloc::string::String;
use alloc::vec::Vec;

use crate::{
    args::{ErasedValue, Tag},
    chars::ScanChar,
    context::ScanContext,
    error::{Error, ErrorKind, Expected},
};

/// A type that can be scanned out of a character source.
///
/// `'s` is the lifetime of the source; only borrowing implementations
/// (`&'s [C]`, `&'s str`) make use of it.
///
/// Custom implementations usually parse their `options` substring first and
/// then consume characters through `ctx`, possibly via
/// [`vscan_usertype`](crate::vscan_usertype) for nested formats. On failure,
/// return the error and leave `self` alone: the visitor restores the source
/// to where the value started.
pub trait Scannable<'s, C: ScanChar> {
    /// The argument-store tag. Leave at the default for custom types.
    #[doc(hidden)]
    const TAG: Tag = Tag::Custom;

    /// Parses one value from the context into `self`.
    fn scan(&mut self, options: &str, ctx: &mut ScanContext<'_, 's, C>) -> Expected<()>;
}

/// Invokes the scanner selected by `tag` against the erased value pointer.
///
/// # Safety
///
/// `value` must have been produced by `ScanArg::new` for exactly this `tag`
/// and `'s`, and the borrow it erased must still be live. The argument store
/// guarantees both for descriptors it hands out.
pub(crate) unsafe fn dispatch<'s, C: ScanChar>(
    tag: Tag,
    value: ErasedValue<'s, C>,
    options: &str,
    ctx: &mut ScanContext<'_, 's, C>,
) -> Expected<()> {
    let p = value.ptr;
    unsafe {
        match tag {
            Tag::None => Err(Error::invalid_format_string("argument index out of range")),
            Tag::I16 => (&mut *p.cast::<i16>()).scan(options, ctx),
            Tag::I32 => (&mut *p.cast::<i32>()).scan(options, ctx),
            Tag::I64 => (&mut *p.cast::<i64>()).scan(options, ctx),
            Tag::I128 => (&mut *p.cast::<i128>()).scan(options, ctx),
            Tag::Isize => (&mut *p.cast::<isize>()).scan(options, ctx),
            Tag::U16 => (&mut *p.cast::<u16>()).scan(options, ctx),
            Tag::U32 => (&mut *p.cast::<u32>()).scan(options, ctx),
            Tag::U64 => (&mut *p.cast::<u64>()).scan(options, ctx),
            Tag::U128 => (&mut *p.cast::<u128>()).scan(options, ctx),
            Tag::Usize => (&mut *p.cast::<usize>()).scan(options, ctx),
            Tag::F32 => (&mut *p.cast::<f32>()).scan(options, ctx),
            Tag::F64 => (&mut *p.cast::<f64>()).scan(options, ctx),
            Tag::Bool => (&mut *p.cast::<bool>()).scan(options, ctx),
            Tag::Unit => {
                let c = scan_unit(ctx)?;
                *p.cast::<C>() = c;
                Ok(())
            }
            Tag::CodePoint => (&mut *p.cast::<char>()).scan(options, ctx),
            Tag::Str => (&mut *p.cast::<String>()).scan(options, ctx),
            Tag::SliceView => (&mut *p.cast::<&'s [C]>()).scan(options, ctx),
            Tag::StrView => (&mut *p.cast::<&'s str>()).scan(options, ctx),
            Tag::CharBuf => (&mut *p.cast::<CharBuffer<C>>()).scan(options, ctx),
            Tag::Custom => match value.custom {
                Some(scan) => scan(p, options, ctx),
                None => Err(Error::invalid_argument("malformed custom argument")),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// token helpers
// ---------------------------------------------------------------------------

fn peek_ascii<C: ScanChar>(ctx: &mut ScanContext<'_, '_, C>) -> Option<u8> {
    ctx.peek().ok().and_then(ScanChar::to_ascii)
}

fn peek_digit<C: ScanChar>(ctx: &mut ScanContext<'_, '_, C>, base: u32) -> Option<char> {
    let c = peek_ascii(ctx)? as char;
    c.is_digit(base).then_some(c)
}

fn scan_unit<C: ScanChar>(ctx: &mut ScanContext<'_, '_, C>) -> Expected<C> {
    let c = ctx.peek()?;
    ctx.advance(1);
    Ok(c)
}

/// Collects one whitespace-delimited word.
fn scan_word_units<C: ScanChar>(ctx: &mut ScanContext<'_, '_, C>) -> Expected<Vec<C>> {
    ctx.skip_whitespace()?;
    let mut units = Vec::new();
    loop {
        let chunk = ctx.realised(usize::MAX);
        if !chunk.is_empty() {
            match chunk.iter().position(|c| c.is_space()) {
                Some(0) => break,
                Some(n) => {
                    units.extend_from_slice(&chunk[..n]);
                    ctx.advance(n);
                    break;
                }
                None => {
                    let n = chunk.len();
                    units.extend_from_slice(chunk);
                    ctx.advance(n);
                    continue;
                }
            }
        }
        match ctx.peek() {
            Ok(c) if c.is_space() => break,
            Ok(c) => {
                units.push(c);
                ctx.advance(1);
            }
            Err(e) if e.kind() == ErrorKind::EndOfRange => {
                if units.is_empty() {
                    return Err(e);
                }
                break;
            }
            Err(e) => return Err(e),
        }
    }
    if units.is_empty() {
        return Err(Error::invalid_scanned_value("expected a word"));
    }
    Ok(units)
}

/// Borrows one whitespace-delimited word from a direct contiguous source.
fn scan_view_slice<'s, C: ScanChar>(ctx: &mut ScanContext<'_, 's, C>) -> Expected<&'s [C]> {
    ctx.skip_whitespace()?;
    let rest = ctx.rest_direct().ok_or(Error::invalid_argument(
        "borrowed views need a direct contiguous source",
    ))?;
    if rest.is_empty() {
        return Err(Error::end_of_range("EOF"));
    }
    let n = rest
        .iter()
        .position(|c| c.is_space())
        .unwrap_or(rest.len());
    ctx.advance(n);
    Ok(&rest[..n])
}

// ---------------------------------------------------------------------------
// integers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
struct IntFormat {
    base: u32,
    /// `0x`/`0o`/`0b` prefixes accepted for the fixed base.
    prefix: bool,
    /// Base detected from the prefix, decimal otherwise.
    detect: bool,
    /// Digit-group separators from the locale accepted inside the digits.
    grouped: bool,
}

impl IntFormat {
    fn parse(options: &str) -> Expected<Self> {
        let mut fmt = Self {
            base: 10,
            prefix: false,
            detect: false,
            grouped: false,
        };
        for opt in options.chars() {
            match opt {
                'd' => fmt.base = 10,
                'x' => {
                    fmt.base = 16;
                    fmt.prefix = true;
                }
                'o' => {
                    fmt.base = 8;
                    fmt.prefix = true;
                }
                'b' => {
                    fmt.base = 2;
                    fmt.prefix = true;
                }
                'i' => fmt.detect = true,
                'n' => fmt.grouped = true,
                _ => {
                    return Err(Error::invalid_format_string(
                        "unrecognized integer format options",
                    ))
                }
            }
        }
        Ok(fmt)
    }
}

/// Reads sign, optional base prefix, and digits. Returns the token ready for
/// `from_str_radix` plus the resolved base.
fn collect_int_token<C: ScanChar>(
    ctx: &mut ScanContext<'_, '_, C>,
    signed: bool,
    fmt: IntFormat,
) -> Expected<(String, u32)> {
    ctx.skip_whitespace()?;
    let mut s = String::new();

    let first = ctx.peek()?;
    if let Some(a @ (b'+' | b'-')) = first.to_ascii() {
        if a == b'-' && !signed {
            return Err(Error::invalid_scanned_value("sign on an unsigned value"));
        }
        s.push(a as char);
        ctx.advance(1);
    }

    let mut base = fmt.base;
    if (fmt.detect || fmt.prefix) && peek_ascii(ctx) == Some(b'0') {
        ctx.advance(1);
        let after_zero = ctx.consumed();
        let selected = match peek_ascii(ctx) {
            Some(b'x' | b'X') if fmt.detect || base == 16 => Some(16),
            Some(b'o' | b'O') if fmt.detect || base == 8 => Some(8),
            Some(b'b' | b'B') if fmt.detect || base == 2 => Some(2),
            _ => None,
        };
        let mut prefixed = false;
        if let Some(nb) = selected {
            ctx.advance(1);
            if peek_digit(ctx, nb).is_some() {
                base = nb;
                prefixed = true;
            } else {
                // a bare "0x": the zero alone is the value
                ctx.advance_to(after_zero);
            }
        }
        if !prefixed {
            s.push('0');
        }
    }

    let sep = ctx.locale().thousands_sep();
    let mut any = s.ends_with('0');
    loop {
        if let Some(d) = peek_digit(ctx, base) {
            s.push(d);
            any = true;
            ctx.advance(1);
            continue;
        }
        if fmt.grouped && any {
            let mark = ctx.consumed();
            let mut sbuf = [C::from_ascii(0); 4];
            let sep_units = C::encode_char(sep, &mut sbuf);
            if eat_units(ctx, sep_units) && peek_digit(ctx, base).is_some() {
                continue;
            }
            ctx.advance_to(mark);
        }
        break;
    }
    if !any {
        return Err(Error::invalid_scanned_value("expected an integer"));
    }
    Ok((s, base))
}

/// Consumes `units` when they match at the cursor.
fn eat_units<C: ScanChar>(ctx: &mut ScanContext<'_, '_, C>, units: &[C]) -> bool {
    let mark = ctx.consumed();
    for &u in units {
        match ctx.peek() {
            Ok(c) if c == u => ctx.advance(1),
            _ => {
                ctx.advance_to(mark);
                return false;
            }
        }
    }
    true
}

fn int_error(e: &core::num::ParseIntError) -> Error {
    use core::num::IntErrorKind;
    match e.kind() {
        IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => {
            Error::value_out_of_range("integer does not fit the target type")
        }
        _ => Error::invalid_scanned_value("invalid integer"),
    }
}

macro_rules! impl_scan_int {
    ($($ty:ty => $tag:ident, $signed:expr;)+) => {$(
        impl<'s, C: ScanChar> Scannable<'s, C> for $ty {
            const TAG: Tag = Tag::$tag;

            fn scan(&mut self, options: &str, ctx: &mut ScanContext<'_, 's, C>) -> Expected<()> {
                let fmt = IntFormat::parse(options)?;
                let (token, base) = collect_int_token(ctx, $signed, fmt)?;
                *self = <$ty>::from_str_radix(&token, base).map_err(|e| int_error(&e))?;
                Ok(())
            }
        }
    )+};
}

impl_scan_int! {
    i16 => I16, true;
    i32 => I32, true;
    i64 => I64, true;
    i128 => I128, true;
    isize => Isize, true;
    u16 => U16, false;
    u32 => U32, false;
    u64 => U64, false;
    u128 => U128, false;
    usize => Usize, false;
}

// ---------------------------------------------------------------------------
// floats
// ---------------------------------------------------------------------------

fn check_float_options(options: &str) -> Expected<()> {
    if options.chars().all(|c| matches!(c, 'a' | 'e' | 'f' | 'g')) {
        Ok(())
    } else {
        Err(Error::invalid_format_string(
            "unrecognized float format options",
        ))
    }
}

/// Collects a floating-point token: sign, digits with at most one decimal
/// point, an optional exponent, or one of the `inf`/`nan` words.
fn collect_float_token<C: ScanChar>(ctx: &mut ScanContext<'_, '_, C>) -> Expected<(String, bool)> {
    ctx.skip_whitespace()?;
    let decimal_point = ctx.locale().decimal_point();
    let mut s = String::new();

    let first = ctx.peek()?;
    if let Some(a @ (b'+' | b'-')) = first.to_ascii() {
        s.push(a as char);
        ctx.advance(1);
    }

    if matches!(peek_ascii(ctx), Some(b'i' | b'I' | b'n' | b'N')) {
        let mut word = false;
        while let Some(a) = peek_ascii(ctx) {
            if a.is_ascii_alphabetic() {
                s.push(a as char);
                word = true;
                ctx.advance(1);
            } else {
                break;
            }
        }
        debug_assert!(word);
        return Ok((s, true));
    }

    let mut any = false;
    while let Some(d) = peek_digit(ctx, 10) {
        s.push(d);
        any = true;
        ctx.advance(1);
    }
    let mut pbuf = [C::from_ascii(0); 4];
    let point_units = C::encode_char(decimal_point, &mut pbuf);
    {
        let mark = ctx.consumed();
        if eat_units(ctx, point_units) {
            if any || peek_digit(ctx, 10).is_some() {
                s.push('.');
                while let Some(d) = peek_digit(ctx, 10) {
                    s.push(d);
                    any = true;
                    ctx.advance(1);
                }
            } else {
                ctx.advance_to(mark);
            }
        }
    }
    if !any {
        return Err(Error::invalid_scanned_value("expected a number"));
    }

    if matches!(peek_ascii(ctx), Some(b'e' | b'E')) {
        let mark = ctx.consumed();
        let len = s.len();
        s.push('e');
        ctx.advance(1);
        if let Some(a @ (b'+' | b'-')) = peek_ascii(ctx) {
            s.push(a as char);
            ctx.advance(1);
        }
        let mut exp = false;
        while let Some(d) = peek_digit(ctx, 10) {
            s.push(d);
            exp = true;
            ctx.advance(1);
        }
        if !exp {
            s.truncate(len);
            ctx.advance_to(mark);
        }
    }
    Ok((s, false))
}

macro_rules! impl_scan_float {
    ($($ty:ty => $tag:ident;)+) => {$(
        impl<'s, C: ScanChar> Scannable<'s, C> for $ty {
            const TAG: Tag = Tag::$tag;

            fn scan(&mut self, options: &str, ctx: &mut ScanContext<'_, 's, C>) -> Expected<()> {
                check_float_options(options)?;
                let (token, worded) = collect_float_token(ctx)?;
                let parsed: $ty = token
                    .parse()
                    .map_err(|_| Error::invalid_scanned_value("invalid number"))?;
                if parsed.is_infinite() && !worded {
                    return Err(Error::value_out_of_range(
                        "number does not fit the target type",
                    ));
                }
                *self = parsed;
                Ok(())
            }
        }
    )+};
}

impl_scan_float! {
    f32 => F32;
    f64 => F64;
}

// ---------------------------------------------------------------------------
// bool, units, code points
// ---------------------------------------------------------------------------

impl<'s, C: ScanChar> Scannable<'s, C> for bool {
    const TAG: Tag = Tag::Bool;

    fn scan(&mut self, options: &str, ctx: &mut ScanContext<'_, 's, C>) -> Expected<()> {
        let mut alpha = true;
        let mut numeric = true;
        match options {
            "" => {}
            "a" => numeric = false,
            "n" => alpha = false,
            _ => {
                return Err(Error::invalid_format_string(
                    "unrecognized boolean format options",
                ))
            }
        }
        ctx.skip_whitespace()?;
        let first = ctx.peek()?;
        match first.to_ascii() {
            Some(b't') if alpha => {
                expect_keyword(ctx, "true")?;
                *self = true;
            }
            Some(b'f') if alpha => {
                expect_keyword(ctx, "false")?;
                *self = false;
            }
            Some(b'0') if numeric => {
                ctx.advance(1);
                *self = false;
            }
            Some(b'1') if numeric => {
                ctx.advance(1);
                *self = true;
            }
            _ => return Err(Error::invalid_scanned_value("invalid boolean")),
        }
        Ok(())
    }
}

fn expect_keyword<C: ScanChar>(ctx: &mut ScanContext<'_, '_, C>, word: &str) -> Expected<()> {
    for b in word.bytes() {
        let got = ctx.peek()?;
        if got.to_ascii() != Some(b) {
            return Err(Error::invalid_scanned_value("invalid boolean"));
        }
        ctx.advance(1);
    }
    Ok(())
}

impl<'s> Scannable<'s, u8> for u8 {
    const TAG: Tag = Tag::Unit;

    fn scan(&mut self, _options: &str, ctx: &mut ScanContext<'_, 's, u8>) -> Expected<()> {
        *self = scan_unit(ctx)?;
        Ok(())
    }
}

impl<'s, C: ScanChar> Scannable<'s, C> for char {
    const TAG: Tag = Tag::CodePoint;

    fn scan(&mut self, _options: &str, ctx: &mut ScanContext<'_, 's, C>) -> Expected<()> {
        let first = ctx.peek()?;
        let n = C::scalar_len(first)
            .ok_or(Error::invalid_scanned_value("invalid character in source"))?;
        let mut units = [first; 4];
        for unit in units.iter_mut().take(n) {
            *unit = ctx.peek()?;
            ctx.advance(1);
        }
        *self = C::scalar_from_units(&units[..n])
            .ok_or(Error::invalid_scanned_value("invalid character in source"))?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// strings, views, buffers
// ---------------------------------------------------------------------------

impl<'s, C: ScanChar> Scannable<'s, C> for String {
    const TAG: Tag = Tag::Str;

    fn scan(&mut self, options: &str, ctx: &mut ScanContext<'_, 's, C>) -> Expected<()> {
        if !matches!(options, "" | "s") {
            return Err(Error::invalid_format_string(
                "unrecognized string format options",
            ));
        }
        *self = C::units_into_string(scan_word_units(ctx)?)?;
        Ok(())
    }
}

impl<'s, C: ScanChar> Scannable<'s, C> for &'s [C] {
    const TAG: Tag = Tag::SliceView;

    fn scan(&mut self, options: &str, ctx: &mut ScanContext<'_, 's, C>) -> Expected<()> {
        if !matches!(options, "" | "s") {
            return Err(Error::invalid_format_string(
                "unrecognized string format options",
            ));
        }
        *self = scan_view_slice(ctx)?;
        Ok(())
    }
}

impl<'s, C: ScanChar> Scannable<'s, C> for &'s str {
    const TAG: Tag = Tag::StrView;

    fn scan(&mut self, options: &str, ctx: &mut ScanContext<'_, 's, C>) -> Expected<()> {
        if !matches!(options, "" | "s") {
            return Err(Error::invalid_format_string(
                "unrecognized string format options",
            ));
        }
        let units = scan_view_slice(ctx)?;
        *self = C::units_as_str(units).ok_or(Error::invalid_argument(
            "string views need a narrow UTF-8 source",
        ))?;
        Ok(())
    }
}

/// A fixed-size buffer argument: the scan fills the wrapped slice
/// completely, or fails without touching it.
pub struct CharBuffer<'b, C: ScanChar>(pub &'b mut [C]);

impl<'s, C: ScanChar> Scannable<'s, C> for CharBuffer<'_, C> {
    const TAG: Tag = Tag::CharBuf;

    fn scan(&mut self, _options: &str, ctx: &mut ScanContext<'_, 's, C>) -> Expected<()> {
        let mut tmp = Vec::with_capacity(self.0.len());
        for _ in 0..self.0.len() {
            tmp.push(scan_unit(ctx)?);
        }
        self.0.copy_from_slice(&tmp);
        Ok(())
    }
}
