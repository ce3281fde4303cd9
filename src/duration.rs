//! duration.rs
//!
//! The tagged rounding-duration value consumed by the rounder, plus the
//! "standard" duration grammar (`+3d`, `-2bd`, `/15m`, `5H`, `10s`, `250ns`,
//! …). The weekday/month fallback grammar (`Mon`, `Dec`, …) lives in
//! `duration_parse.rs` since it needs its own name tables.

use crate::error::DroundError;

/// A single rounding duration.
///
/// `DURD`/`DURBD`/`DURWK` encode direction in the sign of their scalar;
/// `DURYMD`/`DURYMCW` carry a separate `neg` bit alongside a structured
/// target, matching the source's data model. [`Duration::direction`] is the
/// uniform accessor the design notes ask for in place of branching on the
/// sign convention at every call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Duration {
    /// Day-of-month target; sign is direction.
    DurD(i32),
    /// Business-day-of-month target; sign is direction.
    DurBd(i32),
    /// ISO week-number target; sign is direction.
    DurWk(i32),
    /// Month-of-year target.
    DurYmd { month: u8, neg: bool },
    /// Weekday-of-week target (1=Mon..7=Sun).
    DurYmcw { weekday: u8, neg: bool },
    /// Hour grain for time rounding.
    DurH(i32),
    /// Minute grain for time rounding.
    DurM(i32),
    /// Second grain for time rounding.
    DurS(i32),
    /// Nanosecond grain for time rounding.
    DurNano(i64),
    /// Unrecognized; the parser never returns this, a no-op rounder result
    /// returns it when handed a type it cannot dispatch on.
    DurUnk,
}

impl Duration {
    /// `+1` for a forward/advancing duration, `-1` for a backward one.
    /// Meaningless (and unused) for the time-grain variants, whose sign
    /// instead flips between rounding-down and always-advancing in
    /// [`crate::round::round_time`].
    pub fn direction(&self) -> i32 {
        match *self {
            Duration::DurD(v) | Duration::DurBd(v) | Duration::DurWk(v) => v.signum(),
            Duration::DurYmd { neg, .. } | Duration::DurYmcw { neg, .. } => {
                if neg {
                    -1
                } else {
                    1
                }
            }
            Duration::DurH(v) | Duration::DurM(v) | Duration::DurS(v) => v.signum(),
            Duration::DurNano(v) => v.signum() as i32,
            Duration::DurUnk => 0,
        }
    }

    pub fn is_time_duration(&self) -> bool {
        matches!(
            self,
            Duration::DurH(_) | Duration::DurM(_) | Duration::DurS(_) | Duration::DurNano(_)
        )
    }
}

/// Parses the "standard" duration grammar. Two shapes exist, matching the
/// two families of rounding target:
///
/// - date-field targets: a letter tag followed by the magnitude, `d31`,
///   `bd5`, `wk3`. An optional leading `+`/`-` sets the direction
///   (`DURD`/`DURBD`/`DURWK`'s sign convention); unsigned defaults to
///   forward.
/// - time grains: the magnitude followed by the letter tag, `15m`, `5H`,
///   `30s`, `250ns`. A leading `/` is accepted as a synonym for `+`
///   (`/15m`, round to the next quarter hour).
pub fn parse_duration(s: &str) -> Result<Duration, DroundError> {
    let orig = s;
    let neg = s.starts_with('-');
    let rest = if s.starts_with('+') || s.starts_with('-') || s.starts_with('/') {
        &s[1..]
    } else {
        s
    };

    const DATE_TARGETS: &[(&str, fn(i32) -> Duration)] = &[
        ("bd", Duration::DurBd as fn(i32) -> Duration),
        ("wk", Duration::DurWk as fn(i32) -> Duration),
        ("w", Duration::DurWk as fn(i32) -> Duration),
        ("d", Duration::DurD as fn(i32) -> Duration),
    ];
    for (prefix, ctor) in DATE_TARGETS {
        if let Some(num) = rest.strip_prefix(prefix) {
            if !num.is_empty() && num.bytes().all(|b| b.is_ascii_digit()) {
                let mag: i32 = num.parse().map_err(|_| DroundError::ParseDuration(orig.to_string()))?;
                return Ok(ctor(if neg { -mag } else { mag }));
            }
        }
    }

    let digits_end = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
    if digits_end == 0 {
        return Err(DroundError::ParseDuration(orig.to_string()));
    }
    let (num, unit) = rest.split_at(digits_end);
    let mag: i64 = num.parse().map_err(|_| DroundError::ParseDuration(orig.to_string()))?;
    let signed = |v: i64| -> i32 {
        if neg {
            -(v as i32)
        } else {
            v as i32
        }
    };

    let dur = match unit {
        "H" | "h" => Duration::DurH(signed(mag)),
        "m" | "min" => Duration::DurM(signed(mag)),
        "s" | "sec" => Duration::DurS(signed(mag)),
        "ns" => Duration::DurNano(if neg { -mag } else { mag }),
        _ => return Err(DroundError::ParseDuration(orig.to_string())),
    };
    Ok(dur)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_signed_day_target() {
        assert_eq!(parse_duration("+d31").unwrap(), Duration::DurD(31));
        assert_eq!(parse_duration("-d31").unwrap(), Duration::DurD(-31));
        assert_eq!(parse_duration("d31").unwrap(), Duration::DurD(31));
        assert_eq!(parse_duration("bd5").unwrap(), Duration::DurBd(5));
        assert_eq!(parse_duration("wk3").unwrap(), Duration::DurWk(3));
    }

    #[test]
    fn parses_time_grains() {
        assert_eq!(parse_duration("15m").unwrap(), Duration::DurM(15));
        assert_eq!(parse_duration("/15m").unwrap(), Duration::DurM(15));
        assert_eq!(parse_duration("5H").unwrap(), Duration::DurH(5));
    }

    #[test]
    fn direction_is_uniform_across_sign_conventions() {
        assert_eq!(Duration::DurD(31).direction(), 1);
        assert_eq!(Duration::DurD(-31).direction(), -1);
        assert_eq!(Duration::DurYmcw { weekday: 1, neg: false }.direction(), 1);
        assert_eq!(Duration::DurYmcw { weekday: 1, neg: true }.direction(), -1);
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_duration("bogus").is_err());
        assert!(parse_duration("").is_err());
    }
}
