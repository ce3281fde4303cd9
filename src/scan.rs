//! scan.rs
//!
//! Stream-mode needle scanning: finds embedded date/time-like tokens in a
//! line of free text for the driver to round. A compiled `regex::Regex`,
//! built once and reused across lines, the way `dround.c::proc_line`'s
//! needle table is built once and reused.

use once_cell::sync::Lazy;
use regex::Regex;

/// A match of a candidate date/time token within a line, as byte offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Needle {
    pub start: usize,
    pub end: usize,
}

/// Recognizes the core's input vocabulary: full `ymd` dates
/// (`2012-03-01`, optionally `Thh:mm:ss`), ISO week dates (`2012-W09-4`),
/// and bare clock times (`12:17:33`). Deliberately narrower than a general
/// date-text recognizer; it exists only to locate a plausible token for the
/// parser to attempt.
static NEEDLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?x)
        \d{4}-\d{2}-\d{2}(?:[T ]\d{2}:\d{2}:\d{2}(?:\.\d+)?)?   # ymd, optional time
        | \d{4}-W\d{2}-\d                                        # iso week date
        | \d{2}:\d{2}:\d{2}(?:\.\d+)?                            # bare time
        ",
    )
    .expect("static needle regex is valid")
});

/// Finds the first embedded date/time-like token in `line`, if any.
pub fn find_needle(line: &str) -> Option<Needle> {
    NEEDLE_RE
        .find(line)
        .map(|m| Needle { start: m.start(), end: m.end() })
}

/// Finds every embedded date/time-like token in `line`, left to right and
/// non-overlapping, used by sed mode to rewrite every match on a line.
pub fn find_all_needles(line: &str) -> Vec<Needle> {
    NEEDLE_RE
        .find_iter(line)
        .map(|m| Needle { start: m.start(), end: m.end() })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_ymd_date() {
        let n = find_needle("ship it on 2012-03-01 please").unwrap();
        assert_eq!(&"ship it on 2012-03-01 please"[n.start..n.end], "2012-03-01");
    }

    #[test]
    fn finds_ymd_with_time() {
        let n = find_needle("at 2012-03-01T23:58:00 exactly").unwrap();
        assert_eq!(
            &"at 2012-03-01T23:58:00 exactly"[n.start..n.end],
            "2012-03-01T23:58:00"
        );
    }

    #[test]
    fn finds_bare_time() {
        let n = find_needle("meet at 12:17:33 sharp").unwrap();
        assert_eq!(&"meet at 12:17:33 sharp"[n.start..n.end], "12:17:33");
    }

    #[test]
    fn no_match_returns_none() {
        assert!(find_needle("nothing to see here").is_none());
    }

    #[test]
    fn finds_all_matches_left_to_right() {
        let line = "from 2012-03-01 to 2012-04-01";
        let all = find_all_needles(line);
        assert_eq!(all.len(), 2);
        assert!(all[0].start < all[1].start);
    }
}
