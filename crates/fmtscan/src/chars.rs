//! The source-unit abstraction.
//!
//! Every component of the pipeline is parameterised by [`ScanChar`], the type
//! of one source unit. Exactly two units exist: `u8` for narrow, byte-oriented
//! sources (`&str`, `&[u8]`, byte readers, mapped files) and `char` for wide
//! sources that carry whole Unicode scalars. The width is chosen when a source
//! is constructed and never converted afterwards.

use alloc::{string::String, vec::Vec};

use crate::error::{Error, Expected};

mod sealed {
    pub trait Sealed {}
    impl Sealed for u8 {}
    impl Sealed for char {}
}

/// Outcome of decoding one unit out of a raw byte stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decode<C> {
    /// One unit was produced from the given number of bytes.
    Unit(C, usize),
    /// More bytes are needed to finish the unit.
    Incomplete,
    /// The bytes cannot begin a valid unit.
    Invalid,
}

/// One source unit: `u8` (narrow) or `char` (wide).
///
/// The trait is sealed; the two widths are the whole design space.
pub trait ScanChar:
    Copy + Eq + Ord + core::fmt::Debug + core::hash::Hash + sealed::Sealed + Send + 'static
{
    /// Widens an ASCII byte into a unit.
    fn from_ascii(b: u8) -> Self;

    /// The ASCII value of this unit, when it has one.
    fn to_ascii(self) -> Option<u8>;

    /// Whitespace classification in the default locale.
    fn is_space(self) -> bool;

    /// Encodes one format-string character as source units.
    ///
    /// Narrow units encode to the character's UTF-8 bytes, wide units to the
    /// character itself.
    fn encode_char(c: char, buf: &mut [Self; 4]) -> &[Self];

    /// Decodes one unit from the front of a raw byte stream.
    fn decode(bytes: &[u8]) -> Decode<Self>;

    /// How many units make up the Unicode scalar that starts with `first`,
    /// or `None` when `first` cannot start one.
    fn scalar_len(first: Self) -> Option<usize>;

    /// Assembles a Unicode scalar out of `scalar_len` units.
    fn scalar_from_units(units: &[Self]) -> Option<char>;

    /// Materialises accumulated units as an owned string.
    fn units_into_string(units: Vec<Self>) -> Expected<String>;

    /// Reinterprets a unit slice as `&str` when the width allows it:
    /// narrow UTF-8 units only.
    fn units_as_str(units: &[Self]) -> Option<&str>;
}

impl ScanChar for u8 {
    #[inline]
    fn from_ascii(b: u8) -> Self {
        b
    }

    #[inline]
    fn to_ascii(self) -> Option<u8> {
        (self < 0x80).then_some(self)
    }

    #[inline]
    fn is_space(self) -> bool {
        self.is_ascii_whitespace()
    }

    fn encode_char(c: char, buf: &mut [Self; 4]) -> &[Self] {
        let n = c.encode_utf8(buf).len();
        &buf[..n]
    }

    #[inline]
    fn decode(bytes: &[u8]) -> Decode<Self> {
        match bytes.first() {
            Some(&b) => Decode::Unit(b, 1),
            None => Decode::Incomplete,
        }
    }

    #[inline]
    fn scalar_len(first: Self) -> Option<usize> {
        utf8_len(first)
    }

    fn scalar_from_units(units: &[Self]) -> Option<char> {
        core::str::from_utf8(units).ok()?.chars().next()
    }

    fn units_into_string(units: Vec<Self>) -> Expected<String> {
        String::from_utf8(units)
            .map_err(|_| Error::invalid_scanned_value("scanned bytes are not valid UTF-8"))
    }

    fn units_as_str(units: &[Self]) -> Option<&str> {
        core::str::from_utf8(units).ok()
    }
}

impl ScanChar for char {
    #[inline]
    fn from_ascii(b: u8) -> Self {
        b as char
    }

    #[inline]
    fn to_ascii(self) -> Option<u8> {
        u8::try_from(u32::from(self)).ok().filter(|b| *b < 0x80)
    }

    #[inline]
    fn is_space(self) -> bool {
        self.is_whitespace()
    }

    fn encode_char(c: char, buf: &mut [Self; 4]) -> &[Self] {
        buf[0] = c;
        &buf[..1]
    }

    fn decode(bytes: &[u8]) -> Decode<Self> {
        let Some(&lead) = bytes.first() else {
            return Decode::Incomplete;
        };
        let Some(len) = utf8_len(lead) else {
            return Decode::Invalid;
        };
        if bytes.len() < len {
            return Decode::Incomplete;
        }
        match core::str::from_utf8(&bytes[..len]) {
            Ok(s) => match s.chars().next() {
                Some(c) => Decode::Unit(c, len),
                None => Decode::Invalid,
            },
            Err(_) => Decode::Invalid,
        }
    }

    #[inline]
    fn scalar_len(_first: Self) -> Option<usize> {
        Some(1)
    }

    fn scalar_from_units(units: &[Self]) -> Option<char> {
        units.first().copied()
    }

    fn units_into_string(units: Vec<Self>) -> Expected<String> {
        Ok(units.into_iter().collect())
    }

    fn units_as_str(_units: &[Self]) -> Option<&str> {
        None
    }
}

/// UTF-8 sequence length implied by a lead byte.
#[inline]
const fn utf8_len(lead: u8) -> Option<usize> {
    match lead {
        0x00..=0x7f => Some(1),
        0xc2..=0xdf => Some(2),
        0xe0..=0xef => Some(3),
        0xf0..=0xf4 => Some(4),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;

    #[test]
    fn narrow_decode_is_byte_for_byte() {
        assert_eq!(u8::decode(b"ab"), Decode::Unit(b'a', 1));
        assert_eq!(u8::decode(b""), Decode::Incomplete);
    }

    #[test]
    fn wide_decode_handles_partial_sequences() {
        let snowman = "\u{2603}".as_bytes();
        assert_eq!(char::decode(snowman), Decode::Unit('\u{2603}', 3));
        assert_eq!(char::decode(&snowman[..2]), Decode::Incomplete);
        assert_eq!(char::decode(&[0xff]), Decode::Invalid);
    }

    #[test]
    fn encode_char_widths() {
        let mut nbuf = [0u8; 4];
        assert_eq!(u8::encode_char('A', &mut nbuf), b"A");
        assert_eq!(u8::encode_char('\u{2603}', &mut nbuf).len(), 3);

        let mut wbuf = ['\0'; 4];
        assert_eq!(char::encode_char('\u{2603}', &mut wbuf), &['\u{2603}']);
    }

    #[test]
    fn narrow_scalar_assembly() {
        let units = "\u{00e5}".as_bytes();
        assert_eq!(u8::scalar_len(units[0]), Some(2));
        assert_eq!(u8::scalar_from_units(units), Some('\u{00e5}'));
    }

    #[test]
    fn string_materialisation_checks_utf8() {
        assert_eq!(
            u8::units_into_string(b"hello".to_vec()).as_deref(),
            Ok("hello")
        );
        assert!(u8::units_into_string(vec![0xff, 0xfe]).is_err());
        assert_eq!(
            char::units_into_string(vec!['h', 'i']).as_deref(),
            Ok("hi")
        );
    }
}
