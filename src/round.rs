//! round.rs
//!
//! The rounding engine proper: `round_time` snaps a time-of-day to a grain,
//! `round_date` snaps a calendar value to a date-field target, `round`
//! sequences the two over a [`Sandwich`] and folds carry into the date side,
//! and `round_list` left-folds a whole duration list. Every function here is
//! total: handed a (value, duration) pair it cannot act on, it returns the
//! value unchanged rather than erroring. See `error.rs` for where errors
//! actually originate (parsing, not rounding).

use crate::calendar::{bdays, iso_weeks, ultimo, CalendarValue, Sandwich, Time};
use crate::duration::Duration;

const SECS_PER_DAY: i64 = 86_400;

/// Snaps `t` to the nearest multiple of the grain `dur` encodes, biased
/// forward when `nextp` is set. Returns the rounded time and a carry of
/// `-1`, `0`, or `+1` days, returned as a value rather than smuggled into
/// a sign bit of the result (the source reuses the time's `neg` flag for
/// this purpose).
///
/// A non-time-grain duration is a no-op: `(t, 0)` unchanged.
pub fn round_time(t: Time, dur: Duration, nextp: bool) -> (Time, i32) {
    let sdur: i64 = match dur {
        Duration::DurH(h) => (h as i64 % 24) * 3600,
        Duration::DurM(m) => (m as i64 % 1440) * 60,
        Duration::DurS(s) => s as i64 % SECS_PER_DAY,
        Duration::DurNano(_) => {
            // Nanosecond grain follows the same pattern scaled into the
            // sub-second field; whole-second rounding here is a no-op on
            // `tunp` and only `ns` moves, handled separately below.
            return round_time_nanos(t, dur, nextp);
        }
        _ => return (t, 0),
    };
    if sdur == 0 {
        return (t, 0);
    }

    let tunp = t.h as i64 * 3600 + t.m as i64 * 60 + t.s as i64;
    let diff = tunp.rem_euclid(sdur.abs());

    if sdur > 0 && diff == 0 && t.ns == 0 && !nextp {
        return (t, 0);
    }

    let mut tunp2 = tunp - diff;
    if sdur > 0 || nextp {
        tunp2 += sdur;
    }

    let carry;
    if tunp2 < 0 {
        tunp2 += SECS_PER_DAY;
        carry = -1;
    } else if tunp2 >= SECS_PER_DAY {
        tunp2 -= SECS_PER_DAY;
        carry = 1;
    } else {
        carry = 0;
    }

    let s = (tunp2 % 60) as u8;
    let rest = tunp2 / 60;
    let m = (rest % 60) as u8;
    let h = (rest / 60) as u8;
    (Time { h, m, s, ns: 0 }, carry)
}

fn round_time_nanos(t: Time, dur: Duration, nextp: bool) -> (Time, i32) {
    let Duration::DurNano(ns_dur) = dur else {
        return (t, 0);
    };
    let day_ns: i64 = SECS_PER_DAY * 1_000_000_000;
    let sdur = ns_dur % day_ns;
    if sdur == 0 {
        return (t, 0);
    }
    let tunp = (t.h as i64 * 3600 + t.m as i64 * 60 + t.s as i64) * 1_000_000_000 + t.ns as i64;
    let diff = tunp.rem_euclid(sdur.abs());

    if sdur > 0 && diff == 0 && !nextp {
        return (t, 0);
    }

    let mut tunp2 = tunp - diff;
    if sdur > 0 || nextp {
        tunp2 += sdur;
    }

    let carry;
    if tunp2 < 0 {
        tunp2 += day_ns;
        carry = -1;
    } else if tunp2 >= day_ns {
        tunp2 -= day_ns;
        carry = 1;
    } else {
        carry = 0;
    }

    let ns = (tunp2 % 1_000_000_000) as u32;
    let secs_total = tunp2 / 1_000_000_000;
    let s = (secs_total % 60) as u8;
    let rest = secs_total / 60;
    let m = (rest % 60) as u8;
    let h = (rest / 60) as u8;
    (Time { h, m, s, ns }, carry)
}

/// Snaps a calendar value to the date-field target `dur` describes,
/// dispatching on `dur`'s tag and then on `v`'s representation. Combinations
/// the duration doesn't address (e.g. a `DurD` target applied to a `Ywd`
/// value) are a deliberate no-op: the engine never re-represents a value to
/// satisfy a duration it wasn't given in that value's own vocabulary.
pub fn round_date(v: CalendarValue, dur: Duration, nextp: bool) -> CalendarValue {
    match dur {
        Duration::DurD(dv) => round_day_of_month(v, dv, nextp),
        Duration::DurBd(dv) => round_bizda(v, dv, nextp),
        Duration::DurWk(dv) => round_iso_week(v, dv, nextp),
        Duration::DurYmd { month, neg } => round_month_of_year(v, month, neg, nextp),
        Duration::DurYmcw { weekday, neg } => round_weekday_of_week(v, weekday, neg, nextp),
        _ => v,
    }
}

/// Shared control flow for the three "advance/retreat the month, clamp the
/// target field" roundings (`DurD`, `DurBd`, `DurWk`'s year variant below
/// duplicates this shape with a year step instead of a month step).
fn step(forw: bool, cur: i64, tgt: i64, on_target_no_move: bool) -> Option<bool> {
    if (forw && cur < tgt) || (!forw && cur > tgt) {
        Some(false) // no month/year change
    } else if cur == tgt && on_target_no_move {
        None // already there, nextp=false: no-op entirely
    } else {
        Some(true) // advance/retreat one step
    }
}

fn round_day_of_month(v: CalendarValue, dv: i32, nextp: bool) -> CalendarValue {
    if dv == 0 {
        return v;
    }
    let (tgt, forw) = (dv.unsigned_abs(), dv > 0);
    let CalendarValue::Ymd { y, m, d } = v else {
        return v;
    };
    let mut y = y;
    let mut m = m;
    match step(forw, d as i64, tgt as i64, !nextp) {
        None => return v,
        Some(false) => {}
        Some(true) => {
            if forw {
                if m < 12 {
                    m += 1;
                } else {
                    m = 1;
                    y += 1;
                }
            } else if m > 1 {
                m -= 1;
            } else {
                m = 12;
                y -= 1;
            }
        }
    }
    let d = (tgt as u8).min(ultimo(y, m));
    CalendarValue::Ymd { y, m, d }
}

fn round_bizda(v: CalendarValue, dv: i32, nextp: bool) -> CalendarValue {
    if dv == 0 {
        return v;
    }
    let (tgt, forw) = (dv.unsigned_abs(), dv > 0);
    let CalendarValue::Bizda { y, m, bd } = v else {
        return v;
    };
    let mut y = y;
    let mut m = m;
    match step(forw, bd as i64, tgt as i64, !nextp) {
        None => return v,
        Some(false) => {}
        Some(true) => {
            if forw {
                if m < 12 {
                    m += 1;
                } else {
                    m = 1;
                    y += 1;
                }
            } else if m > 1 {
                m -= 1;
            } else {
                m = 12;
                y -= 1;
            }
        }
    }
    let bd = (tgt as u8).min(bdays(y, m));
    CalendarValue::Bizda { y, m, bd }
}

fn round_iso_week(v: CalendarValue, dv: i32, nextp: bool) -> CalendarValue {
    if dv == 0 {
        return v;
    }
    let (tgt, forw) = (dv.unsigned_abs(), dv > 0);
    let CalendarValue::Ywd { y, c, w } = v else {
        return v;
    };
    let mut y = y;
    match step(forw, c as i64, tgt as i64, !nextp) {
        None => return v,
        Some(false) => {}
        Some(true) => {
            if forw {
                y += 1;
            } else {
                y -= 1;
            }
        }
    }
    let c = (tgt as u8).min(iso_weeks(y));
    CalendarValue::Ywd { y, c, w }
}

fn round_month_of_year(v: CalendarValue, tgt: u8, neg: bool, nextp: bool) -> CalendarValue {
    let forw = !neg;
    let CalendarValue::Ymd { y, m, d } = v else {
        return v;
    };
    let mut y = y;
    match step(forw, m as i64, tgt as i64, !nextp) {
        None => return v,
        Some(false) => {}
        Some(true) => {
            if forw {
                y += 1;
            } else {
                y -= 1;
            }
        }
    }
    let d = d.min(ultimo(y, tgt));
    CalendarValue::Ymd { y, m: tgt, d }
}

fn round_weekday_of_week(v: CalendarValue, tgt: u8, neg: bool, nextp: bool) -> CalendarValue {
    let forw = !neg;
    let Some(serial) = v.to_daisy() else {
        return v;
    };
    // ISO weekday of `serial`, read off an Ymcw round-trip regardless of
    // `v`'s own tag.
    let CalendarValue::Ymcw { w: wday, .. } =
        CalendarValue::Ymcw { y: 0, m: 0, c: 0, w: 0 }.from_daisy_as(serial)
    else {
        return v;
    };

    let mut diff: i32 = tgt as i32 - wday as i32;
    match step(forw, wday as i64, tgt as i64, !nextp) {
        None => return v,
        Some(false) => {}
        Some(true) => {
            if forw {
                diff += 7;
            } else {
                diff -= 7;
            }
        }
    }
    v.from_daisy_as(serial + diff)
}

/// Applies a single duration to a composite value: time rounding first
/// (with any carry folded into the date via a one-day step), then date
/// rounding. `has_date`/`has_time`/`fix_flag`/the zone offset are preserved
/// verbatim; date rounding is naturally a no-op for a pure time duration
/// since [`round_date`] returns its input unchanged for unrecognized tags.
pub fn round(s: Sandwich, dur: Duration, nextp: bool) -> Sandwich {
    let mut s = s;
    if dur.is_time_duration() {
        let (t, carry) = round_time(s.time, dur, nextp);
        s.time = t;
        if carry != 0 {
            s.date = add_days(s.date, carry);
        }
    }
    s.date = round_date(s.date, dur, nextp);
    s
}

/// Left-folds [`round`] over an ordered list of durations. Order is
/// caller-significant: rounding to the next Monday and then the next
/// quarter-hour is not the same as the reverse.
pub fn round_list(s: Sandwich, durs: &[Duration], nextp: bool) -> Sandwich {
    durs.iter().fold(s, |acc, &d| round(acc, d, nextp))
}

/// Adds a signed day offset to a calendar value via its DAISY
/// representation, used only to fold the time-rounder's carry into the
/// date side of a sandwich.
fn add_days(v: CalendarValue, days: i32) -> CalendarValue {
    match v.to_daisy() {
        Some(serial) => v.from_daisy_as(serial + days),
        None => v,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::CalendarValue::*;

    fn t(h: u8, m: u8, s: u8) -> Time {
        Time { h, m, s, ns: 0 }
    }

    #[test]
    fn scenario_advance_day_of_month_forward() {
        let v = Ymd { y: 2012, m: 3, d: 1 };
        let got = round_date(v, Duration::DurD(31), false);
        assert_eq!(got, Ymd { y: 2012, m: 3, d: 31 });
    }

    #[test]
    fn scenario_retreat_day_of_month_clamps_to_leap_february() {
        let v = Ymd { y: 2012, m: 3, d: 1 };
        let got = round_date(v, Duration::DurD(-31), false);
        assert_eq!(got, Ymd { y: 2012, m: 2, d: 29 });
    }

    #[test]
    fn scenario_next_sunday_wraps_week() {
        // 2012-03-01 is a Thursday; ISO weekday Sunday = 7.
        let v = Ymd { y: 2012, m: 3, d: 1 };
        let got = round_weekday_of_week(v, 7, false, false);
        assert_eq!(got, Ymd { y: 2012, m: 3, d: 4 });
    }

    #[test]
    fn scenario_next_flag_advances_from_already_on_boundary() {
        // 2012-03-04 is already a Sunday; --next forces the following one.
        let v = Ymd { y: 2012, m: 3, d: 4 };
        let got = round_weekday_of_week(v, 7, false, true);
        assert_eq!(got, Ymd { y: 2012, m: 3, d: 11 });
    }

    #[test]
    fn scenario_quarter_hour_grain() {
        let (got, carry) = round_time(t(12, 17, 33), Duration::DurM(15), false);
        assert_eq!(got, t(12, 30, 0));
        assert_eq!(carry, 0);
    }

    #[test]
    fn scenario_time_carry_into_date() {
        let s = Sandwich {
            date: Ymd { y: 2012, m: 3, d: 1 },
            time: t(23, 58, 0),
            has_date: true,
            has_time: true,
            fix_flag: false,
            zone_offset_minutes: None,
        };
        let rounded = round(s, Duration::DurM(5), false);
        assert_eq!(rounded.time, t(0, 0, 0));
        assert_eq!(rounded.date, Ymd { y: 2012, m: 3, d: 2 });
    }

    #[test]
    fn idempotence_on_boundary() {
        let v = Ymd { y: 2012, m: 3, d: 31 };
        assert_eq!(round_date(v, Duration::DurD(31), false), v);
    }

    #[test]
    fn progress_when_next_is_forced() {
        let v = Ymd { y: 2012, m: 3, d: 31 };
        assert_ne!(round_date(v, Duration::DurD(31), true), v);
    }

    #[test]
    fn direction_forward_never_retreats() {
        let v = Ymd { y: 2012, m: 3, d: 1 };
        let got = round_date(v, Duration::DurD(15), false);
        let before = v.to_daisy().unwrap();
        let after = got.to_daisy().unwrap();
        assert!(after >= before);
    }

    #[test]
    fn direction_backward_never_advances() {
        let v = Ymd { y: 2012, m: 3, d: 20 };
        let got = round_date(v, Duration::DurD(-15), false);
        let before = v.to_daisy().unwrap();
        let after = got.to_daisy().unwrap();
        assert!(after <= before);
    }

    #[test]
    fn representation_stability() {
        let v = Ywd { y: 2012, c: 9, w: 3 };
        let got = round_date(v, Duration::DurWk(20), false);
        assert_eq!(got.tag(), v.tag());
    }

    #[test]
    fn month_ultimo_clamp() {
        let v = Ymd { y: 2012, m: 1, d: 31 };
        let got = round_date(
            v,
            Duration::DurYmd { month: 2, neg: false },
            false,
        );
        assert_eq!(got, Ymd { y: 2012, m: 2, d: 29 });
    }

    #[test]
    fn negative_grain_without_next_rounds_down_in_place() {
        // A non-positive grain with nextp=false truncates toward the
        // previous boundary within the same day; it never needs a carry,
        // since the truncated result can't go below 0.
        let (rounded, carry) = round_time(t(0, 1, 0), Duration::DurM(-15), false);
        assert_eq!(carry, 0);
        assert_eq!(rounded, t(0, 0, 0));
    }

    #[test]
    fn negative_grain_with_next_forces_advance_and_can_carry_back_a_day() {
        // nextp forces the `tunp' += sdur` branch even for a non-positive
        // grain, and a negative `sdur` can push the result below 0.
        let (rounded, carry) = round_time(t(0, 1, 0), Duration::DurM(-15), true);
        assert_eq!(carry, -1);
        assert_eq!(rounded, t(23, 45, 0));
    }

    #[test]
    fn fold_matches_single_application() {
        let v = Sandwich::date_only(Ymd { y: 2012, m: 3, d: 1 });
        let single = round(v, Duration::DurD(31), false);
        let folded = round_list(v, &[Duration::DurD(31)], false);
        assert_eq!(single, folded);
    }

    #[test]
    fn fold_respects_order() {
        let v = Sandwich {
            date: Ymd { y: 2012, m: 3, d: 4 },
            time: t(0, 0, 0),
            has_date: true,
            has_time: true,
            fix_flag: false,
            zone_offset_minutes: None,
        };
        let forward = round_list(
            v,
            &[Duration::DurYmcw { weekday: 7, neg: false }, Duration::DurM(15)],
            true,
        );
        let backward = round_list(
            v,
            &[Duration::DurM(15), Duration::DurYmcw { weekday: 7, neg: false }],
            true,
        );
        assert_ne!(forward, backward);
    }
}
