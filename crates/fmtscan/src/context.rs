//! The scan context and the format-directed visitor.
//!
//! One scan call builds a [`ScanContext`] (cursor plus locale), walks the
//! format through a [`ParseContext`], and for each placeholder resolves the
//! argument descriptor and dispatches on its type tag. A checkpoint is set
//! before every token; recoverable failures roll the source back to it, so a
//! failed result leaves the residual at the start of the failed token's
//! input and the target value untouched.

use alloc::string::String;
use alloc::vec::Vec;

use crate::{
    args::{ArgStore, ScanArg},
    chars::ScanChar,
    cursor::Cursor,
    error::{Error, ErrorKind, Expected},
    format::{FormatSpec, ParseContext, Token},
    locale::Locale,
    result::ScanResult,
    scanners::{dispatch, Scannable},
    source::ScanSource,
};

/// Everything a per-type scanner reads through: the wrapped source plus the
/// locale of the call.
pub struct ScanContext<'a, 's, C: ScanChar> {
    cursor: &'a mut (dyn Cursor<'s, C> + 'a),
    locale: Locale,
}

impl<'a, 's, C: ScanChar> ScanContext<'a, 's, C> {
    /// The unit at the cursor, pulling from the source as needed.
    pub fn peek(&mut self) -> Expected<C> {
        self.cursor.peek()
    }

    /// Consumes `n` observed units.
    pub fn advance(&mut self, n: usize) {
        self.cursor.advance(n);
    }

    /// Moves back (or forward) to an offset previously obtained from
    /// [`consumed`](Self::consumed). Scanner-local backtracking.
    pub fn advance_to(&mut self, pos: usize) {
        self.cursor.advance_to(pos);
    }

    /// Units consumed since the start of the scan call.
    #[must_use]
    pub fn consumed(&self) -> usize {
        self.cursor.consumed()
    }

    /// Whether the cursor sits at the observed end of the source.
    #[must_use]
    pub fn at_end(&self) -> bool {
        self.cursor.at_end()
    }

    /// Up to `max` already-realised units, without consuming. Never pulls.
    pub fn realised(&self, max: usize) -> &[C] {
        self.cursor.realised(max)
    }

    /// Up to `max` already-realised units, consuming what is returned.
    pub fn take_buffer(&mut self, max: usize) -> &[C] {
        self.cursor.take_buffer(max)
    }

    /// The unconsumed rest of the input when it is direct contiguous
    /// memory. The only way to borrow scanned data instead of copying it.
    #[must_use]
    pub fn rest_direct(&self) -> Option<&'s [C]> {
        self.cursor.rest_direct()
    }

    /// Consumes any run of whitespace. Reaching the end of the source here
    /// is not an error; the next read reports it.
    pub fn skip_whitespace(&mut self) -> Expected<()> {
        loop {
            match self.peek() {
                Ok(c) if self.locale.is_space(c) => self.advance(1),
                Ok(_) => return Ok(()),
                Err(e) if e.kind() == ErrorKind::EndOfRange => return Ok(()),
                Err(e) => return Err(e),
            }
        }
    }

    /// The locale of this call.
    #[must_use]
    pub fn locale(&self) -> &Locale {
        &self.locale
    }
}

/// One prepared scan call: format, arguments, locale.
///
/// Opaque; [`ScanSource`] implementations outside the crate receive one and
/// hand it to an inner view's `scan_impl`.
#[doc(hidden)]
pub struct ScanRequest<'f, 'a, 's, C: ScanChar> {
    pub(crate) format: FormatSpec<'f>,
    pub(crate) args: &'a ArgStore<'a, 's, C>,
    pub(crate) locale: Locale,
}

/// Runs one scan call against a wrapped source. Returns the error, if any;
/// the cursor is left at the residual position either way.
pub(crate) fn run_scan<'s, C: ScanChar>(
    cursor: &mut (dyn Cursor<'s, C> + '_),
    req: ScanRequest<'_, '_, 's, C>,
) -> Option<Error> {
    let mut pctx = ParseContext::from_spec(req.format);
    let mut ctx = ScanContext {
        cursor,
        locale: req.locale,
    };
    visit(&mut ctx, &mut pctx, req.args).err()
}

fn visit<'s, C: ScanChar>(
    ctx: &mut ScanContext<'_, 's, C>,
    pctx: &mut ParseContext<'_>,
    args: &ArgStore<'_, 's, C>,
) -> Expected<()> {
    loop {
        // A frame-local checkpoint, so nested formats run by custom
        // scanners restore their own positions without clobbering ours.
        let checkpoint = ctx.consumed();
        match pctx.next_token()? {
            Token::End => return Ok(()),
            Token::Whitespace => {
                if let Err(e) = ctx.skip_whitespace() {
                    if e.is_recoverable() {
                        ctx.advance_to(checkpoint);
                    }
                    return Err(e);
                }
            }
            Token::Literal(c) => {
                if let Err(e) = match_literal(ctx, c) {
                    if e.is_recoverable() {
                        ctx.advance_to(checkpoint);
                    }
                    return Err(e);
                }
            }
            Token::Placeholder { index, options } => {
                let id = pctx.resolve_id(index)?;
                let Some((tag, value)) = args.get(id) else {
                    return Err(Error::invalid_format_string("argument index out of range"));
                };
                // Safety: the descriptor was built by `ScanArg::new` from a
                // `&mut` borrow that the store keeps alive, its tag matches
                // the pointee type, and `'s` is the same lifetime the store
                // was built with.
                let scanned = unsafe { dispatch(tag, value, options, ctx) };
                if let Err(e) = scanned {
                    if e.is_recoverable() {
                        ctx.advance_to(checkpoint);
                    }
                    return Err(e);
                }
            }
        }
    }
}

fn match_literal<C: ScanChar>(ctx: &mut ScanContext<'_, '_, C>, c: char) -> Expected<()> {
    let mut buf = [C::from_ascii(0); 4];
    for &unit in C::encode_char(c, &mut buf) {
        let got = ctx.peek()?;
        if got != unit {
            return Err(Error::invalid_scanned_value(
                "input does not match format literal",
            ));
        }
        ctx.advance(1);
    }
    Ok(())
}

/// Scans `source` with an explicit format string.
///
/// The non-variadic core the [`scan!`](crate::scan) macro expands to.
pub fn vscan<'s, S: ScanSource<'s>>(
    source: S,
    fmt: &str,
    args: &ArgStore<'_, 's, S::Char>,
) -> ScanResult<S::Range> {
    source.scan_impl(ScanRequest {
        format: FormatSpec::Str(fmt),
        args,
        locale: Locale::default(),
    })
}

/// Scans `source` with the default format: one placeholder per argument,
/// separated by whitespace.
pub fn vscan_default<'s, S: ScanSource<'s>>(
    source: S,
    args: &ArgStore<'_, 's, S::Char>,
) -> ScanResult<S::Range> {
    source.scan_impl(ScanRequest {
        format: FormatSpec::Default(args.count()),
        args,
        locale: Locale::default(),
    })
}

/// Scans `source` with an explicit format string and locale.
pub fn vscan_localized<'s, S: ScanSource<'s>>(
    source: S,
    locale: Locale,
    fmt: &str,
    args: &ArgStore<'_, 's, S::Char>,
) -> ScanResult<S::Range> {
    source.scan_impl(ScanRequest {
        format: FormatSpec::Str(fmt),
        args,
        locale,
    })
}

/// Constructs an all-OK result for `source` without consuming anything,
/// for starting a chain of scans.
pub fn make_result<'s, S: ScanSource<'s>>(source: S) -> ScanResult<S::Range> {
    source.scan_impl(ScanRequest {
        format: FormatSpec::Default(0),
        args: &ArgStore::build([]),
        locale: Locale::default(),
    })
}

/// Runs a nested format against the same scan context.
///
/// For custom scanners that are themselves made of placeholders: the source
/// adapter is reused as-is, with no re-preparation, and positions compose
/// with the outer call.
pub fn vscan_usertype<'s, C: ScanChar>(
    ctx: &mut ScanContext<'_, 's, C>,
    fmt: &str,
    args: &ArgStore<'_, 's, C>,
) -> Expected<()> {
    let mut pctx = ParseContext::from_format(fmt);
    visit(ctx, &mut pctx, args)
}

struct LineSink<'o> {
    out: &'o mut String,
    delim: char,
}

impl<'s, C: ScanChar> Scannable<'s, C> for LineSink<'_> {
    fn scan(&mut self, _options: &str, ctx: &mut ScanContext<'_, 's, C>) -> Expected<()> {
        let mut dbuf = [C::from_ascii(0); 4];
        let delim_units = C::encode_char(self.delim, &mut dbuf);
        let mut units: Vec<C> = Vec::new();
        let mut got_any = false;
        loop {
            match ctx.peek() {
                Ok(c) => {
                    got_any = true;
                    ctx.advance(1);
                    units.push(c);
                    if units.ends_with(delim_units) {
                        units.truncate(units.len() - delim_units.len());
                        break;
                    }
                }
                Err(e) if e.kind() == ErrorKind::EndOfRange => {
                    if !got_any {
                        return Err(e);
                    }
                    break;
                }
                Err(e) => return Err(e),
            }
        }
        *self.out = C::units_into_string(units)?;
        Ok(())
    }
}

/// Reads up to and including the next line feed, depositing everything
/// before it into `out`.
pub fn getline<'s, S: ScanSource<'s>>(source: S, out: &mut String) -> ScanResult<S::Range> {
    getline_with(source, out, '\n')
}

/// [`getline`] with an explicit delimiter.
pub fn getline_with<'s, S: ScanSource<'s>>(
    source: S,
    out: &mut String,
    delim: char,
) -> ScanResult<S::Range> {
    let mut sink = LineSink { out, delim };
    let store = ArgStore::build([ScanArg::new(&mut sink)]);
    vscan(source, "{}", &store)
}
