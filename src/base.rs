//! base.rs
//!
//! The `--base` fallback value: a write-once context the date parser
//! consults when a matched string is missing its date or time half. Set
//! once by the CLI at startup and never changed after, so `OnceLock` fits
//! in place of a `Lazy<Mutex<_>>`.

use std::sync::OnceLock;

use crate::calendar::Sandwich;

static BASE: OnceLock<Sandwich> = OnceLock::new();

/// Sets the fallback base value. Called at most once, from the driver
/// during startup; a second call is a programming error and is ignored
/// rather than panicking, since the value it lost was by definition
/// identical in every invocation that matters (there is exactly one
/// `--base` flag on the command line).
pub fn set_base(value: Sandwich) {
    let _ = BASE.set(value);
}

/// The fallback base value, if one was set.
pub fn base() -> Option<&'static Sandwich> {
    BASE.get()
}
