//! The variadic entry points.
//!
//! Rust has no variadic functions, so the `scan(source, fmt, a, b, …)`
//! surface is a family of macros that build the argument store inline —
//! the borrows of the target values end with the call expression — and hand
//! off to the `vscan` cores.

/// Scans `source` with a format string.
///
/// ```
/// use fmtscan::scan;
///
/// let mut key = String::new();
/// let mut value = 0i64;
/// let result = scan!("timeout = 250", "{} = {}", key, value);
/// assert!(result.is_ok());
/// assert_eq!((key.as_str(), value), ("timeout", 250));
/// ```
#[macro_export]
macro_rules! scan {
    ($source:expr, $fmt:expr $(, $arg:expr)* $(,)?) => {{
        let store = $crate::ArgStore::build([$($crate::ScanArg::new(&mut $arg)),*]);
        $crate::vscan($source, $fmt, &store)
    }};
}

/// Scans `source` with the default format: one whitespace-separated
/// placeholder per argument.
///
/// ```
/// use fmtscan::scan_default;
///
/// let mut a = 0u32;
/// let mut b = 0u32;
/// let result = scan_default!("10 20", a, b);
/// assert!(result.is_ok());
/// assert_eq!((a, b), (10, 20));
/// ```
#[macro_export]
macro_rules! scan_default {
    ($source:expr $(, $arg:expr)* $(,)?) => {{
        let store = $crate::ArgStore::build([$($crate::ScanArg::new(&mut $arg)),*]);
        $crate::vscan_default($source, &store)
    }};
}

/// Scans `source` with an explicit locale.
///
/// ```
/// use fmtscan::{scan_localized, Locale};
///
/// let mut price = 0.0f64;
/// let result = scan_localized!("3,50", Locale::new(',', '.'), "{}", price);
/// assert!(result.is_ok());
/// assert_eq!(price, 3.5);
/// ```
#[macro_export]
macro_rules! scan_localized {
    ($source:expr, $locale:expr, $fmt:expr $(, $arg:expr)* $(,)?) => {{
        let store = $crate::ArgStore::build([$($crate::ScanArg::new(&mut $arg)),*]);
        $crate::vscan_localized($source, $locale, $fmt, &store)
    }};
}

/// Scans from the process standard input.
#[cfg(feature = "std")]
#[macro_export]
macro_rules! input {
    ($fmt:expr $(, $arg:expr)* $(,)?) => {{
        let store = $crate::ArgStore::build([$($crate::ScanArg::new(&mut $arg)),*]);
        $crate::vscan_stdin($fmt, &store)
    }};
}

/// Prints a prompt to standard output, then scans from standard input.
#[cfg(feature = "std")]
#[macro_export]
macro_rules! prompt {
    ($prompt:expr, $fmt:expr $(, $arg:expr)* $(,)?) => {{
        {
            use ::std::io::Write as _;
            ::std::print!("{}", $prompt);
            let _ = ::std::io::stdout().flush();
        }
        let store = $crate::ArgStore::build([$($crate::ScanArg::new(&mut $arg)),*]);
        $crate::vscan_stdin($fmt, &store)
    }};
}
