//! dround: round embedded or standalone date/time values to the boundary
//! of one or more rounding durations.
//!
//! The library is organized leaves-first, matching the component budget:
//! calendar and duration values at the bottom, the rounders built on top of
//! them, and the driver (argument handling, scanning, formatting) as the
//! thin outer layer that ties them to stdin/stdout.

pub mod base;
pub mod calendar;
pub mod cli;
pub mod driver;
pub mod duration;
pub mod duration_parse;
pub mod error;
pub mod format;
pub mod round;
pub mod scan;
