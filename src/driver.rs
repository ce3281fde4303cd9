//! driver.rs
//!
//! Point-mode / stream-mode dispatch, modeled directly on
//! `dround.c::main`/`proc_line`: decide which mode applies by whether the
//! first positional argument parses as a date, build the duration list
//! once, then either round a single value or scan stdin line by line. This
//! is also where the mode-dependent error-severity mapping lives, see the
//! note on [`DroundError`] in `error.rs` for why it isn't on the error type
//! itself.

use std::io::{self, BufRead, Write};

use log::warn;

use crate::base;
use crate::calendar::{iso_weeks, ultimo, CalendarValue, Sandwich, Time};
use crate::cli::Cli;
use crate::duration::Duration;
use crate::duration_parse::parse_duration_extended;
use crate::error::DroundError;
use crate::format::{render, unescape_backslashes};
use crate::round::round_list;
use crate::scan::find_needle;

/// Parses a single date/time-or-date string into a [`Sandwich`]. This is
/// the minimal concrete stand-in for the "external parser" the core treats
/// as out of scope: it recognizes the same handful of encodings
/// `scan.rs`'s needle regex looks for (`ymd`, `ymd` + time, ISO week date,
/// bare time), matching the calendars this crate names as the recognized
/// vocabulary. Anything else is reported as [`DroundError::ParseDate`].
///
/// A string missing its date or time half is completed from [`base::base`]
/// if one was configured with `--base`, mirroring the original's use of a
/// base date/time to fill in an underspecified input.
pub fn parse_value(s: &str) -> Result<Sandwich, DroundError> {
    let err = || DroundError::ParseDate(s.to_string());

    if let Some((date_part, time_part)) = split_date_time(s) {
        let (date, date_fix) = parse_date_part(date_part).ok_or_else(err)?;
        let (time, time_fix) = parse_time_part(time_part).ok_or_else(err)?;
        return Ok(Sandwich {
            date,
            time,
            has_date: true,
            has_time: true,
            fix_flag: date_fix || time_fix,
            zone_offset_minutes: None,
        });
    }

    if let Some((date, fix_flag)) = parse_date_part(s) {
        let mut v = fill_time_from_base(Sandwich::date_only(date));
        v.fix_flag = v.fix_flag || fix_flag;
        return Ok(v);
    }

    if let Some((time, fix_flag)) = parse_time_part(s) {
        let mut v = fill_date_from_base(Sandwich::time_only(time));
        v.fix_flag = v.fix_flag || fix_flag;
        return Ok(v);
    }

    Err(err())
}

/// Fills in a time-only value's date half from the `--base` fallback, if one
/// was set. Without a base, the value stays time-only.
fn fill_date_from_base(mut v: Sandwich) -> Sandwich {
    if let Some(b) = base::base() {
        if b.has_date {
            v.date = b.date;
            v.has_date = true;
        }
    }
    v
}

/// Fills in a date-only value's time half from the `--base` fallback, if one
/// was set. Without a base, the value stays date-only.
fn fill_time_from_base(mut v: Sandwich) -> Sandwich {
    if let Some(b) = base::base() {
        if b.has_time {
            v.time = b.time;
            v.has_time = true;
        }
    }
    v
}

fn split_date_time(s: &str) -> Option<(&str, &str)> {
    let idx = s.find('T').or_else(|| {
        // space-separated "ymd hms" only counts as a composite if both
        // halves look like a date and a time, not just any line with a space
        s.find(' ').filter(|&i| {
            s[..i].contains('-') && s[i + 1..].contains(':')
        })
    })?;
    Some((&s[..idx], &s[idx + 1..]))
}

/// Parses the date half. A day out of range for its month, or an ISO week
/// number out of range for its year, is clamped to the last valid value and
/// reported back via the bool rather than rejected outright; a month or
/// weekday out of range has no sensible clamp and fails the parse.
fn parse_date_part(s: &str) -> Option<(CalendarValue, bool)> {
    if !s.starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }
    if let Some(v) = iso_week_date(s) {
        return Some(v);
    }

    let bytes = s.as_bytes();
    if bytes.len() < 10 || bytes[4] != b'-' || bytes[7] != b'-' {
        return None;
    }
    let y: u16 = s[0..4].parse().ok()?;
    let m: u8 = s[5..7].parse().ok()?;
    let d: u8 = s[8..10].parse().ok()?;
    if !(1..=12).contains(&m) {
        return None;
    }
    let last = ultimo(y, m);
    let (d, fix_flag) = if d >= 1 && d <= last {
        (d, false)
    } else if d > last {
        (last, true)
    } else {
        return None;
    };
    Some((CalendarValue::Ymd { y, m, d }, fix_flag))
}

fn iso_week_date(s: &str) -> Option<(CalendarValue, bool)> {
    // "YYYY-Www-d"
    let bytes = s.as_bytes();
    if bytes.len() < 10 || &s[4..6] != "-W" {
        return None;
    }
    let y: u16 = s[0..4].parse().ok()?;
    let c: u8 = s[6..8].parse().ok()?;
    let w: u8 = s[9..10].parse().ok()?;
    if !(1..=7).contains(&w) {
        return None;
    }
    let weeks = iso_weeks(y);
    let (c, fix_flag) = if c >= 1 && c <= weeks {
        (c, false)
    } else if c > weeks {
        (weeks, true)
    } else {
        return None;
    };
    Some((CalendarValue::Ywd { y, c, w }, fix_flag))
}

/// Parses the time half. Any of `h`/`m`/`s` out of range is clamped to its
/// maximum (23/59/59) independently and reported back via the bool.
fn parse_time_part(s: &str) -> Option<(Time, bool)> {
    let mut parts = s.splitn(2, '.');
    let hms = parts.next()?;
    let ns: u32 = match parts.next() {
        Some(frac) => {
            let mut digits = frac.to_string();
            while digits.len() < 9 {
                digits.push('0');
            }
            digits.truncate(9);
            digits.parse().ok()?
        }
        None => 0,
    };
    let mut f = hms.splitn(3, ':');
    let h: u8 = f.next()?.parse().ok()?;
    let m: u8 = f.next()?.parse().ok()?;
    let s: u8 = f.next()?.parse().ok()?;

    let mut fix_flag = false;
    let h = if h > 23 {
        fix_flag = true;
        23
    } else {
        h
    };
    let m = if m > 59 {
        fix_flag = true;
        59
    } else {
        m
    };
    let s = if s > 59 {
        fix_flag = true;
        59
    } else {
        s
    };
    Some((Time { h, m, s, ns }, fix_flag))
}

/// A duration list is "only D" when every entry is a plain day-of-month
/// target, matching `dround.c`'s `durs_only_d_p`. The driver forgets
/// (flattens) an attached source zone precisely when this holds and a
/// `--from-zone` was given, mirroring the original's `hackz`/`dtz_forgetz`
/// dance in `main`.
fn durs_only_d(durs: &[Duration]) -> bool {
    durs.iter().all(|d| matches!(d, Duration::DurD(_)))
}

/// Parses a `+HH:MM`, `-HHMM`, or `Z` style zone offset into minutes east of
/// UTC.
fn parse_zone_offset(s: &str) -> Option<i32> {
    if s.eq_ignore_ascii_case("z") {
        return Some(0);
    }
    let (sign, rest) = match s.as_bytes().first()? {
        b'+' => (1, &s[1..]),
        b'-' => (-1, &s[1..]),
        _ => return None,
    };
    let rest = rest.replace(':', "");
    if rest.len() != 4 {
        return None;
    }
    let h: i32 = rest[0..2].parse().ok()?;
    let m: i32 = rest[2..4].parse().ok()?;
    Some(sign * (h * 60 + m))
}

/// Runs the whole CLI invocation and returns the process exit code: 0 for
/// success, 1 for a fatal error, 2 for a recoverable condition (a clamped
/// field or, in non-quiet stream mode, an unmatched line). All diagnostics
/// this function can't avoid printing are written to `stderr`, gated on
/// `cli.quiet`.
pub fn run(cli: Cli) -> i32 {
    if let Some(base_str) = &cli.base {
        match parse_value(base_str) {
            Ok(v) => base::set_base(v),
            Err(e) => return fatal(&cli, &e),
        }
    }

    let from_zone = match &cli.from_zone {
        Some(z) => match parse_zone_offset(z) {
            Some(m) => Some(m),
            None => return fatal(&cli, &DroundError::ParseDate(z.clone())),
        },
        None => None,
    };

    let fmt = if cli.backslash_escapes {
        cli.format.as_deref().map(unescape_backslashes)
    } else {
        cli.format.clone()
    };

    let (maybe_point, dur_strs): (Option<&str>, &[String]) = match cli.args.split_first() {
        Some((first, rest)) if parse_value(first).is_ok() => (Some(first.as_str()), rest),
        _ => (None, &cli.args[..]),
    };

    let durs = match parse_durations(dur_strs) {
        Ok(d) => d,
        Err(e) => return fatal(&cli, &e),
    };
    let keep_zone = !durs_only_d(&durs);

    match maybe_point {
        Some(point) => run_point_mode(&cli, point, &durs, fmt.as_deref(), from_zone, keep_zone),
        None => run_stream_mode(&cli, &durs, fmt.as_deref(), from_zone, keep_zone),
    }
}

fn parse_durations(strs: &[String]) -> Result<Vec<Duration>, DroundError> {
    if strs.is_empty() {
        return Err(DroundError::EmptyDurationList);
    }
    strs.iter().map(|s| parse_duration_extended(s)).collect()
}

fn fatal(cli: &Cli, e: &DroundError) -> i32 {
    if !cli.quiet {
        eprintln!("dround: {e}");
    }
    1
}

/// Attaches `from_zone` to `v` and, once rounded, forgets it again unless
/// `keep_zone` says the duration list was zone-sensitive.
fn apply_zone(mut v: Sandwich, durs: &[Duration], nextp: bool, from_zone: Option<i32>, keep_zone: bool) -> Sandwich {
    if from_zone.is_some() {
        v.zone_offset_minutes = from_zone;
    }
    let mut rounded = round_list(v, durs, nextp);
    if !keep_zone && from_zone.is_some() {
        rounded.zone_offset_minutes = None;
    }
    rounded
}

fn run_point_mode(
    cli: &Cli,
    point: &str,
    durs: &[Duration],
    fmt: Option<&str>,
    from_zone: Option<i32>,
    keep_zone: bool,
) -> i32 {
    let value = match parse_value(point) {
        Ok(v) => v,
        Err(e) => return fatal(cli, &e),
    };
    let rounded = apply_zone(value, durs, cli.next, from_zone, keep_zone);
    println!("{}", render(&rounded, fmt));

    if rounded.fix_flag && !cli.quiet {
        warn!("value required a fixed-up field");
    }
    if rounded.fix_flag {
        2
    } else {
        0
    }
}

fn run_stream_mode(
    cli: &Cli,
    durs: &[Duration],
    fmt: Option<&str>,
    from_zone: Option<i32>,
    keep_zone: bool,
) -> i32 {
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut exit_code = 0;

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => return fatal(cli, &DroundError::IoOpen(e)),
        };
        exit_code = exit_code.max(process_line(cli, &line, durs, fmt, from_zone, keep_zone, &mut out));
    }
    exit_code
}

/// Rounds every date/time token found in `line`, mirroring
/// `dround.c::proc_line`'s loop: in sed mode, each match is replaced in
/// place and scanning resumes on the unconsumed tail so every date on the
/// line gets rounded; in non-sed mode only the first match is rounded and
/// the rest of the line is discarded, while an unmatched line produces no
/// stdout output at all (only a warning to stderr).
fn process_line(
    cli: &Cli,
    line: &str,
    durs: &[Duration],
    fmt: Option<&str>,
    from_zone: Option<i32>,
    keep_zone: bool,
    out: &mut impl Write,
) -> i32 {
    if cli.sed_mode {
        let mut code = 0;
        let mut rest = line;
        loop {
            let Some(needle) = find_needle(rest) else {
                let _ = writeln!(out, "{rest}");
                break;
            };
            let matched = &rest[needle.start..needle.end];
            let rewritten = round_and_render(cli, matched, durs, fmt, from_zone, keep_zone, &mut code);
            let _ = write!(out, "{}{}", &rest[..needle.start], rewritten);
            rest = &rest[needle.end..];
        }
        return code;
    }

    let Some(needle) = find_needle(line) else {
        // an unmatched line only biases the exit code in non-quiet mode,
        // unlike `fix_flag`, which biases it regardless of `-q`; nothing is
        // written to stdout either way
        if !cli.quiet {
            warn!("could not find a date/time in line: {line}");
        }
        return if cli.quiet { 0 } else { 2 };
    };

    let matched = &line[needle.start..needle.end];
    let mut code = 0;
    let rewritten = round_and_render(cli, matched, durs, fmt, from_zone, keep_zone, &mut code);
    let _ = writeln!(out, "{rewritten}");
    code
}

fn round_and_render(
    cli: &Cli,
    matched: &str,
    durs: &[Duration],
    fmt: Option<&str>,
    from_zone: Option<i32>,
    keep_zone: bool,
    code: &mut i32,
) -> String {
    match parse_value(matched) {
        Ok(v) => {
            let rounded = apply_zone(v, durs, cli.next, from_zone, keep_zone);
            if rounded.fix_flag {
                *code = 2;
                if !cli.quiet {
                    warn!("value required a fixed-up field: {matched}");
                }
            }
            render(&rounded, fmt)
        }
        Err(e) => {
            *code = 2;
            if !cli.quiet {
                warn!("{e}");
            }
            matched.to_string()
        }
    }
}
