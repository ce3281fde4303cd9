//! format.rs
//!
//! Minimal output formatting: renders a rounded [`Sandwich`] back to text,
//! either via a strftime-like format string or (the default) by mirroring
//! the tag of the value that was matched, plus `--backslash-escapes`
//! unescaping of `\n`/`\t`/… sequences embedded in a `-f`/`-i` format
//! string. Stands in for `dround.c`'s `dt_io_write`/`dt_io_unescape`
//! interface.

use crate::calendar::{CalendarValue, Sandwich};

/// Renders `s` using `fmt` if given, otherwise a representation matching
/// the value's own tag (`Ymd` as `YYYY-MM-DD`, a bare time as `HH:MM:SS`,
/// and so on); `Unk` renders as an empty string.
pub fn render(s: &Sandwich, fmt: Option<&str>) -> String {
    if let Some(fmt) = fmt {
        return render_strftime(s, fmt);
    }
    let mut out = String::new();
    if s.has_date {
        out.push_str(&render_date_default(&s.date));
    }
    if s.has_time {
        if s.has_date {
            out.push('T');
        }
        out.push_str(&format!(
            "{:02}:{:02}:{:02}",
            s.time.h, s.time.m, s.time.s
        ));
        if s.time.ns != 0 {
            out.push_str(&format!(".{:09}", s.time.ns));
        }
    }
    out
}

fn render_date_default(v: &CalendarValue) -> String {
    match *v {
        CalendarValue::Ymd { y, m, d } => format!("{y:04}-{m:02}-{d:02}"),
        CalendarValue::Ymcw { y, m, c, w } => format!("{y:04}-{m:02}-{c}-{w}"),
        CalendarValue::Bizda { y, m, bd } => format!("{y:04}-{m:02}b{bd:02}"),
        CalendarValue::Ywd { y, c, w } => format!("{y:04}-W{c:02}-{w}"),
        CalendarValue::Daisy { serial } => format!("{serial}"),
        CalendarValue::Md { m, d } => format!("{m:02}-{d:02}"),
        CalendarValue::Unk => String::new(),
    }
}

/// A small strftime-like subset: `%Y %m %d %H %M %S` plus a literal `%%`.
/// Anything else passes through unchanged.
fn render_strftime(s: &Sandwich, fmt: &str) -> String {
    let (y, m, d) = match s.date {
        CalendarValue::Ymd { y, m, d } => (y, m, d),
        _ => (0, 0, 0),
    };
    let mut out = String::with_capacity(fmt.len());
    let mut chars = fmt.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('Y') => out.push_str(&format!("{y:04}")),
            Some('m') => out.push_str(&format!("{m:02}")),
            Some('d') => out.push_str(&format!("{d:02}")),
            Some('H') => out.push_str(&format!("{:02}", s.time.h)),
            Some('M') => out.push_str(&format!("{:02}", s.time.m)),
            Some('S') => out.push_str(&format!("{:02}", s.time.s)),
            Some('%') => out.push('%'),
            Some(other) => {
                out.push('%');
                out.push(other);
            }
            None => out.push('%'),
        }
    }
    out
}

/// Turns literal `\n`, `\t`, `\r`, `\\` sequences in a format string into
/// their real characters, gated behind `--backslash-escapes` since a raw
/// format string is taken literally otherwise.
pub fn unescape_backslashes(fmt: &str) -> String {
    let mut out = String::with_capacity(fmt.len());
    let mut chars = fmt.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::Time;

    #[test]
    fn default_render_mirrors_ymd() {
        let s = Sandwich::date_only(CalendarValue::Ymd { y: 2012, m: 3, d: 1 });
        assert_eq!(render(&s, None), "2012-03-01");
    }

    #[test]
    fn default_render_combines_date_and_time() {
        let s = Sandwich {
            date: CalendarValue::Ymd { y: 2012, m: 3, d: 2 },
            time: Time { h: 0, m: 0, s: 0, ns: 0 },
            has_date: true,
            has_time: true,
            fix_flag: false,
            zone_offset_minutes: None,
        };
        assert_eq!(render(&s, None), "2012-03-02T00:00:00");
    }

    #[test]
    fn strftime_format_applies() {
        let s = Sandwich::date_only(CalendarValue::Ymd { y: 2012, m: 3, d: 1 });
        assert_eq!(render(&s, Some("%Y/%m/%d")), "2012/03/01");
    }

    #[test]
    fn unescape_handles_newline_and_tab() {
        assert_eq!(unescape_backslashes(r"%Y\t%m\n"), "%Y\t%m\n");
    }

    #[test]
    fn unescape_passes_unknown_escapes_through() {
        assert_eq!(unescape_backslashes(r"\q"), r"\q");
    }
}
