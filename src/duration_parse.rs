//! duration_parse.rs
//!
//! Extended duration grammar: falls back from the standard `+d31`/`15m`
//! shapes to bare weekday and month names (`Sun`, `sunday`, `Dec`,
//! `december`, case-insensitive), mirroring the source parser's fallback
//! order: standard grammar, then sign-strip and retry, then weekday token,
//! then month token. A weekday token yields `DURYMCW`; a month token yields
//! `DURYMD`.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::duration::{parse_duration, Duration};
use crate::error::DroundError;

static WEEKDAY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(mon|tue|wed|thu|fri|sat|sun)").expect("static weekday regex is valid")
});

static MONTH_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)")
        .expect("static month regex is valid")
});

fn weekday_index(tok: &str) -> Option<u8> {
    const NAMES: [&str; 7] = ["mon", "tue", "wed", "thu", "fri", "sat", "sun"];
    let lower = tok.to_ascii_lowercase();
    NAMES.iter().position(|n| *n == lower).map(|i| i as u8 + 1)
}

fn month_index(tok: &str) -> Option<u8> {
    const NAMES: [&str; 12] = [
        "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
    ];
    let lower = tok.to_ascii_lowercase();
    NAMES.iter().position(|n| *n == lower).map(|i| i as u8 + 1)
}

/// Parses a duration string using the full fallback chain: the standard
/// grammar first, then (after stripping a leading sign) a weekday name,
/// then a month name. The sign recovered during the strip becomes the
/// `neg` bit of the resulting `DURYMCW`/`DURYMD`; unsigned defaults to
/// forward, matching [`parse_duration`]'s own convention.
pub fn parse_duration_extended(s: &str) -> Result<Duration, DroundError> {
    if let Ok(d) = parse_duration(s) {
        return Ok(d);
    }

    let neg = s.starts_with('-');
    let rest = if s.starts_with('+') || s.starts_with('-') {
        &s[1..]
    } else {
        s
    };

    if let Some(m) = WEEKDAY_RE.find(rest) {
        if let Some(w) = weekday_index(m.as_str()) {
            return Ok(Duration::DurYmcw { weekday: w, neg });
        }
    }

    if let Some(m) = MONTH_RE.find(rest) {
        if let Some(mo) = month_index(m.as_str()) {
            return Ok(Duration::DurYmd { month: mo, neg });
        }
    }

    Err(DroundError::ParseDuration(s.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_to_weekday_name() {
        assert_eq!(
            parse_duration_extended("Sun").unwrap(),
            Duration::DurYmcw { weekday: 7, neg: false }
        );
        assert_eq!(
            parse_duration_extended("sunday").unwrap(),
            Duration::DurYmcw { weekday: 7, neg: false }
        );
    }

    #[test]
    fn falls_back_to_month_name() {
        assert_eq!(
            parse_duration_extended("Dec").unwrap(),
            Duration::DurYmd { month: 12, neg: false }
        );
    }

    #[test]
    fn honors_leading_sign_on_fallback_tokens() {
        assert_eq!(
            parse_duration_extended("-Mon").unwrap(),
            Duration::DurYmcw { weekday: 1, neg: true }
        );
    }

    #[test]
    fn still_prefers_standard_grammar_first() {
        assert_eq!(parse_duration_extended("+d31").unwrap(), Duration::DurD(31));
    }

    #[test]
    fn rejects_unrecognized_token() {
        assert!(parse_duration_extended("zzz").is_err());
    }
}
