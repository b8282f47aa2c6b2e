//! The packed, type-tagged argument store.
//!
//! Each argument to a scan call is described by a [`ScanArg`]: a 5-bit type
//! tag plus a non-owning pointer to the caller's value. For small arities the
//! tags of the whole argument list are bit-packed into a single machine word
//! and only bare value pointers are stored; past the packed limit the store
//! degrades to an array of full descriptors and sets the high bit of the
//! word. Argument lookup during scanning is a shift and a mask either way.
//!
//! Custom types ride the same mechanism: their descriptor carries a function
//! pointer to a monomorphised scan shim, so adding scannable types never
//! touches the dispatch core.
//!
//! The store borrows the caller's values; it never owns them. The `scan!`
//! macros construct it inline so the borrows end with the call expression.

use alloc::vec::Vec;
use core::marker::PhantomData;

use crate::{
    chars::ScanChar,
    context::ScanContext,
    error::Expected,
    scanners::Scannable,
};

/// Bits per argument type tag.
const TAG_BITS: usize = 5;
const TAG_MASK: usize = (1 << TAG_BITS) - 1;

/// Maximum arity stored in packed form. One bit of the word is reserved to
/// signal an unpacked store.
pub const MAX_PACKED: usize = (usize::BITS as usize - 1) / TAG_BITS;

const UNPACKED_BIT: usize = 1 << (usize::BITS as usize - 1);

/// The argument type tags. Five bits each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Tag {
    None = 0,
    I16,
    I32,
    I64,
    I128,
    Isize,
    U16,
    U32,
    U64,
    U128,
    Usize,
    F32,
    F64,
    Bool,
    /// One source unit, verbatim.
    Unit,
    /// One decoded Unicode scalar.
    CodePoint,
    /// An owned string.
    Str,
    /// A borrowed view of source units. Direct sources only.
    SliceView,
    /// A borrowed `&str`. Direct narrow sources only.
    StrView,
    /// A fixed-size unit buffer to fill completely.
    CharBuf,
    Custom,
}

impl Tag {
    fn from_bits(bits: usize) -> Tag {
        match bits {
            1 => Tag::I16,
            2 => Tag::I32,
            3 => Tag::I64,
            4 => Tag::I128,
            5 => Tag::Isize,
            6 => Tag::U16,
            7 => Tag::U32,
            8 => Tag::U64,
            9 => Tag::U128,
            10 => Tag::Usize,
            11 => Tag::F32,
            12 => Tag::F64,
            13 => Tag::Bool,
            14 => Tag::Unit,
            15 => Tag::CodePoint,
            16 => Tag::Str,
            17 => Tag::SliceView,
            18 => Tag::StrView,
            19 => Tag::CharBuf,
            20 => Tag::Custom,
            _ => Tag::None,
        }
    }
}

/// Entry point of a custom scanner, stored inside the descriptor.
pub(crate) type CustomFn<'s, C> =
    unsafe fn(*mut (), &str, &mut ScanContext<'_, 's, C>) -> Expected<()>;

/// A type-erased, non-owning pointer to one argument value.
pub(crate) struct ErasedValue<'s, C: ScanChar> {
    pub(crate) ptr: *mut (),
    pub(crate) custom: Option<CustomFn<'s, C>>,
}

impl<'s, C: ScanChar> ErasedValue<'s, C> {
    const fn null() -> Self {
        Self {
            ptr: core::ptr::null_mut(),
            custom: None,
        }
    }
}

impl<C: ScanChar> Clone for ErasedValue<'_, C> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<C: ScanChar> Copy for ErasedValue<'_, C> {}

/// One argument descriptor: tag plus erased value pointer.
///
/// Built by the `scan!` macros through [`ScanArg::new`]; the borrow of the
/// target value lives in `'a`, the borrow of the source (for view
/// arguments) in `'s`.
pub struct ScanArg<'a, 's, C: ScanChar> {
    tag: Tag,
    value: ErasedValue<'s, C>,
    _borrow: PhantomData<&'a mut ()>,
}

impl<C: ScanChar> Clone for ScanArg<'_, '_, C> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<C: ScanChar> Copy for ScanArg<'_, '_, C> {}

impl<'a, 's, C: ScanChar> ScanArg<'a, 's, C> {
    /// Describes `value` as a scan argument.
    pub fn new<T: Scannable<'s, C>>(value: &'a mut T) -> Self {
        let ptr = core::ptr::from_mut(value).cast::<()>();
        let custom = if T::TAG == Tag::Custom {
            Some(custom_shim::<C, T> as CustomFn<'s, C>)
        } else {
            None
        };
        Self {
            tag: T::TAG,
            value: ErasedValue { ptr, custom },
            _borrow: PhantomData,
        }
    }
}

unsafe fn custom_shim<'s, C: ScanChar, T: Scannable<'s, C>>(
    ptr: *mut (),
    options: &str,
    ctx: &mut ScanContext<'_, 's, C>,
) -> Expected<()> {
    // The pointer was produced from `&'a mut T` in `ScanArg::new` and the
    // store keeps that borrow alive in `'a`.
    unsafe { &mut *ptr.cast::<T>() }.scan(options, ctx)
}

/// The argument store for one scan call.
pub struct ArgStore<'a, 's, C: ScanChar> {
    /// Packed: 5-bit tags, high bit clear. Unpacked: high bit set, count in
    /// the low bits.
    types: usize,
    len: usize,
    packed: [ErasedValue<'s, C>; MAX_PACKED],
    unpacked: Vec<ScanArg<'a, 's, C>>,
}

impl<'a, 's, C: ScanChar> ArgStore<'a, 's, C> {
    /// Builds the store from a descriptor list.
    #[must_use]
    pub fn build<const N: usize>(args: [ScanArg<'a, 's, C>; N]) -> Self {
        let mut packed = [ErasedValue::null(); MAX_PACKED];
        if N <= MAX_PACKED {
            let mut types = 0usize;
            for (i, arg) in args.iter().enumerate() {
                types |= (arg.tag as usize) << (i * TAG_BITS);
                packed[i] = arg.value;
            }
            Self {
                types,
                len: N,
                packed,
                unpacked: Vec::new(),
            }
        } else {
            Self {
                types: UNPACKED_BIT | N,
                len: N,
                packed,
                unpacked: args.into_iter().collect(),
            }
        }
    }

    fn is_packed(&self) -> bool {
        self.types & UNPACKED_BIT == 0
    }

    fn packed_tag(&self, i: usize) -> Tag {
        Tag::from_bits((self.types >> (i * TAG_BITS)) & TAG_MASK)
    }

    /// The descriptor at index `i`, or `None` past the stored arguments.
    pub(crate) fn get(&self, i: usize) -> Option<(Tag, ErasedValue<'s, C>)> {
        if self.is_packed() {
            if i >= MAX_PACKED {
                return None;
            }
            let tag = self.packed_tag(i);
            (tag != Tag::None).then(|| (tag, self.packed[i]))
        } else {
            self.unpacked.get(i).map(|arg| (arg.tag, arg.value))
        }
    }

    /// Whether a value exists at index `i`.
    #[must_use]
    pub fn check_id(&self, i: usize) -> bool {
        if self.is_packed() {
            i < MAX_PACKED && self.packed_tag(i) != Tag::None
        } else {
            i < (self.types & !UNPACKED_BIT)
        }
    }

    /// Highest addressable index bound: the packed limit, or the stored
    /// count when unpacked.
    #[must_use]
    pub fn max_size(&self) -> usize {
        if self.is_packed() {
            MAX_PACKED
        } else {
            self.types & !UNPACKED_BIT
        }
    }

    /// Number of arguments actually stored.
    #[must_use]
    pub fn count(&self) -> usize {
        self.len
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_arity_packs_into_one_word() {
        let mut a = 0i32;
        let mut b = 0u64;
        let store: ArgStore<'_, '_, u8> =
            ArgStore::build([ScanArg::new(&mut a), ScanArg::new(&mut b)]);
        assert!(store.is_packed());
        assert_eq!(store.count(), 2);
        assert_eq!(store.max_size(), MAX_PACKED);
        assert_eq!(store.get(0).map(|(t, _)| t), Some(Tag::I32));
        assert_eq!(store.get(1).map(|(t, _)| t), Some(Tag::U64));
        assert!(store.get(2).is_none());
        assert!(store.check_id(1));
        assert!(!store.check_id(2));
    }

    #[test]
    fn large_arity_degrades_to_descriptors() {
        let mut vals = [0i32; MAX_PACKED + 1];
        let mut iter = vals.iter_mut();
        let args: [ScanArg<'_, '_, u8>; MAX_PACKED + 1] =
            core::array::from_fn(|_| ScanArg::new(iter.next().unwrap()));
        let store = ArgStore::build(args);
        assert!(!store.is_packed());
        assert_eq!(store.max_size(), MAX_PACKED + 1);
        assert_eq!(store.get(MAX_PACKED).map(|(t, _)| t), Some(Tag::I32));
        assert!(store.check_id(MAX_PACKED));
        assert!(!store.check_id(MAX_PACKED + 1));
    }

    #[test]
    fn tag_bits_roundtrip() {
        for bits in 0..=20 {
            let tag = Tag::from_bits(bits);
            assert_eq!(tag as usize, bits);
        }
        assert_eq!(Tag::from_bits(31), Tag::None);
    }
}
