//! User-facing diagnostics. These go to standard error and respect the
//! configured color mode; developer diagnostics go through `tracing`.

use std::fmt;

use crate::color::{self, MaybePaint};

pub const DEFAULT_EXIT_CODE: i32 = 1;

pub(crate) fn fmt_error<S: fmt::Display>(f: &mut fmt::Formatter<'_>, text: S) -> fmt::Result {
    write!(
        f,
        "{} {}",
        color::ERROR_INDICATOR.maybe_paint("error:"),
        color::ERROR_TEXT.maybe_paint(text.to_string())
    )
}

pub(crate) fn fmt_warn<S: fmt::Display>(f: &mut fmt::Formatter<'_>, text: S) -> fmt::Result {
    write!(
        f,
        "{} {}",
        color::WARNING_INDICATOR.maybe_paint("warning:"),
        color::WARNING_TEXT.maybe_paint(text.to_string())
    )
}

struct Error<'a>(&'a str);

impl fmt::Display for Error<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_error(f, self.0)
    }
}

struct Warning<'a>(&'a str);

impl fmt::Display for Warning<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_warn(f, self.0)
    }
}

pub(crate) fn error_internal(text: &str) {
    eprintln!("{}", Error(text));
}

pub(crate) fn warn_internal(text: &str) {
    eprintln!("{}", Warning(text));
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => ({
        let formatted = format!($($arg)*);
        $crate::utils::errors::warn_internal(&formatted);
    })
}

#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => ({
        let formatted = format!($($arg)*);
        $crate::utils::errors::error_internal(&formatted);
    })
}

#[macro_export]
macro_rules! die {
    ($($arg:tt)*) => ({
        let formatted = format!($($arg)*);
        $crate::utils::errors::error_internal(&formatted);
        ::std::process::exit($crate::utils::errors::DEFAULT_EXIT_CODE);
    })
}
