//! The format-string walker.
//!
//! A format string is literal text plus `{…}` placeholders. `{{` and `}}`
//! escape the braces. A placeholder is an optional argument index followed by
//! optional `:options`; the options substring is opaque here and handed to
//! the per-type scanner untouched. Runs of literal whitespace collapse into
//! one token that skips any amount of source whitespace.
//!
//! Placeholders are either all indexed (positional) or all bare
//! (sequential); the first concrete choice fixes the mode and mixing is a
//! format error.

use crate::error::{Error, Expected};

/// How a scan call describes its placeholders.
#[derive(Debug, Clone, Copy)]
pub(crate) enum FormatSpec<'f> {
    /// An explicit format string.
    Str(&'f str),
    /// The default format for `n` arguments: `{} {} … {}`.
    Default(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Unknown,
    Sequential,
    Positional,
}

#[derive(Debug)]
enum Kind<'f> {
    Str { fmt: &'f str, pos: usize },
    Default { total: usize, emitted: usize, pending_ws: bool },
}

/// One token out of the format string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Token<'f> {
    /// A literal character the source must match verbatim.
    Literal(char),
    /// A run of literal whitespace: skip any whitespace in the source.
    Whitespace,
    /// One scan directive.
    Placeholder {
        index: Option<usize>,
        options: &'f str,
    },
    End,
}

/// Cursor over the format string plus the implicit-argument counter.
#[derive(Debug)]
pub(crate) struct ParseContext<'f> {
    kind: Kind<'f>,
    next_arg: usize,
    mode: Mode,
}

impl<'f> ParseContext<'f> {
    pub(crate) fn from_format(fmt: &'f str) -> Self {
        Self {
            kind: Kind::Str { fmt, pos: 0 },
            next_arg: 0,
            mode: Mode::Unknown,
        }
    }

    pub(crate) fn for_defaults(total: usize) -> Self {
        Self {
            kind: Kind::Default {
                total,
                emitted: 0,
                pending_ws: false,
            },
            next_arg: 0,
            mode: Mode::Unknown,
        }
    }

    pub(crate) fn from_spec(spec: FormatSpec<'f>) -> Self {
        match spec {
            FormatSpec::Str(fmt) => Self::from_format(fmt),
            FormatSpec::Default(n) => Self::for_defaults(n),
        }
    }

    pub(crate) fn next_token(&mut self) -> Expected<Token<'f>> {
        match &mut self.kind {
            Kind::Default {
                total,
                emitted,
                pending_ws,
            } => {
                if *emitted == *total {
                    return Ok(Token::End);
                }
                if *pending_ws {
                    *pending_ws = false;
                    return Ok(Token::Whitespace);
                }
                *emitted += 1;
                *pending_ws = true;
                Ok(Token::Placeholder {
                    index: None,
                    options: "",
                })
            }
            Kind::Str { fmt, pos } => next_str_token(fmt, pos),
        }
    }

    /// Resolves a placeholder's argument id, enforcing mode exclusivity.
    pub(crate) fn resolve_id(&mut self, index: Option<usize>) -> Expected<usize> {
        match index {
            None => {
                if self.mode == Mode::Positional {
                    return Err(Error::invalid_format_string(
                        "cannot mix indexed and bare placeholders",
                    ));
                }
                self.mode = Mode::Sequential;
                let id = self.next_arg;
                self.next_arg += 1;
                Ok(id)
            }
            Some(id) => {
                if self.mode == Mode::Sequential {
                    return Err(Error::invalid_format_string(
                        "cannot mix indexed and bare placeholders",
                    ));
                }
                self.mode = Mode::Positional;
                Ok(id)
            }
        }
    }
}

fn next_str_token<'f>(fmt: &'f str, pos: &mut usize) -> Expected<Token<'f>> {
    let rest = &fmt[*pos..];
    let Some(c) = rest.chars().next() else {
        return Ok(Token::End);
    };

    if c == '{' {
        if rest.starts_with("{{") {
            *pos += 2;
            return Ok(Token::Literal('{'));
        }
        let Some(close) = rest.find('}') else {
            return Err(Error::invalid_format_string("unterminated placeholder"));
        };
        let body = &rest[1..close];
        let (index_str, options) = match body.split_once(':') {
            Some((i, o)) => (i, o),
            None => (body, ""),
        };
        let index = if index_str.is_empty() {
            None
        } else if index_str.bytes().all(|b| b.is_ascii_digit()) {
            Some(
                index_str
                    .parse::<usize>()
                    .map_err(|_| Error::invalid_format_string("placeholder index too large"))?,
            )
        } else {
            return Err(Error::invalid_format_string(
                "placeholder index must be an unsigned integer",
            ));
        };
        *pos += close + 1;
        return Ok(Token::Placeholder { index, options });
    }

    if c == '}' {
        if rest.starts_with("}}") {
            *pos += 2;
            return Ok(Token::Literal('}'));
        }
        return Err(Error::invalid_format_string("unmatched '}' in format string"));
    }

    if c.is_whitespace() {
        let run = rest
            .char_indices()
            .find(|(_, c)| !c.is_whitespace())
            .map_or(rest.len(), |(i, _)| i);
        *pos += run;
        return Ok(Token::Whitespace);
    }

    *pos += c.len_utf8();
    Ok(Token::Literal(c))
}
