//! calendar.rs
//!
//! The tagged calendar value at the center of the rounding engine, plus the
//! handful of Gregorian/ISO calendar primitives the rounder needs: the last
//! day of a month, the count of business days in a month, the number of ISO
//! weeks in a year, and conversion to and from the dense linear "DAISY" day
//! count used as the universal intermediate representation.
//!
//! Everything here is a pure function of its inputs; there is no caching and
//! no global state (contrast `directorium.rs` in the source this crate grew
//! out of, which leans on `Lazy<Mutex<_>>` caches for data that genuinely is
//! expensive to reload).

use chrono::{Datelike, NaiveDate, Weekday};

/// Which of the seven representations a [`CalendarValue`] carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    Ymd,
    Ymcw,
    Bizda,
    Ywd,
    Daisy,
    Md,
    Unk,
}

/// A dated value in one of the calendar's recognized representations.
///
/// Each variant carries only the fields the representation needs; there is
/// no shared "extra" payload left unused by a given tag, per the source
/// spec's data model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalendarValue {
    /// Gregorian year/month/day.
    Ymd { y: u16, m: u8, d: u8 },
    /// The `c`-th occurrence of weekday `w` in month `m` of year `y`.
    Ymcw { y: u16, m: u8, c: u8, w: u8 },
    /// The `bd`-th business day (Mon-Fri) of month `m` of year `y`.
    Bizda { y: u16, m: u8, bd: u8 },
    /// ISO year-week-day: week `c` (1..=53), weekday `w` (1=Mon..7=Sun).
    Ywd { y: u16, c: u8, w: u8 },
    /// Days since the proleptic-Gregorian epoch (chrono's day 1 = 0001-01-01).
    Daisy { serial: i32 },
    /// Month/day with no year attached.
    Md { m: u8, d: u8 },
    /// Unrecognized or absent.
    Unk,
}

impl CalendarValue {
    pub fn tag(&self) -> Tag {
        match self {
            CalendarValue::Ymd { .. } => Tag::Ymd,
            CalendarValue::Ymcw { .. } => Tag::Ymcw,
            CalendarValue::Bizda { .. } => Tag::Bizda,
            CalendarValue::Ywd { .. } => Tag::Ywd,
            CalendarValue::Daisy { .. } => Tag::Daisy,
            CalendarValue::Md { .. } => Tag::Md,
            CalendarValue::Unk => Tag::Unk,
        }
    }

    /// Converts to the dense linear day count, or `None` if the
    /// representation has no well-defined position on that order (`Unk`
    /// and `Md`, which carries no year).
    pub fn to_daisy(&self) -> Option<i32> {
        let date = match *self {
            CalendarValue::Ymd { y, m, d } => NaiveDate::from_ymd_opt(y as i32, m as u32, d as u32)?,
            CalendarValue::Ymcw { y, m, c, w } => ymcw_to_date(y, m, c, w)?,
            CalendarValue::Bizda { y, m, bd } => bizda_to_date(y, m, bd)?,
            CalendarValue::Ywd { y, c, w } => {
                NaiveDate::from_isoywd_opt(y as i32, c as u32, weekday_from_iso(w)?)?
            }
            CalendarValue::Daisy { serial } => return Some(serial),
            CalendarValue::Md { .. } | CalendarValue::Unk => return None,
        };
        Some(date.num_days_from_ce())
    }

    /// Rebuilds a value of `self`'s own tag from a DAISY serial. Used by the
    /// weekday-of-week date rounder (`DURYMCW`), which always round-trips
    /// through the linear order regardless of the original representation.
    pub fn from_daisy_as(&self, serial: i32) -> CalendarValue {
        let tag = self.tag();
        let Some(date) = NaiveDate::from_num_days_from_ce_opt(serial) else {
            return *self;
        };
        match tag {
            Tag::Ymd => CalendarValue::Ymd {
                y: date.year() as u16,
                m: date.month() as u8,
                d: date.day() as u8,
            },
            Tag::Ymcw => date_to_ymcw(date),
            Tag::Bizda => date_to_bizda(date),
            Tag::Ywd => {
                let iw = date.iso_week();
                CalendarValue::Ywd {
                    y: iw.year() as u16,
                    c: iw.week() as u8,
                    w: date.weekday().number_from_monday() as u8,
                }
            }
            Tag::Daisy => CalendarValue::Daisy { serial },
            Tag::Md | Tag::Unk => *self,
        }
    }
}

/// Is `year` a leap year under the Gregorian rules.
pub fn leap_year(year: i32) -> bool {
    (year % 4 == 0) && (year % 100 != 0 || year % 400 == 0)
}

/// The last valid day of `month` in `year`.
pub fn ultimo(year: u16, month: u8) -> u8 {
    const DAYS: [u8; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];
    if month == 2 && leap_year(year as i32) {
        29
    } else {
        DAYS[(month - 1) as usize]
    }
}

/// Count of weekdays (Mon-Fri) in `month` of `year`.
pub fn bdays(year: u16, month: u8) -> u8 {
    let last = ultimo(year, month);
    (1..=last)
        .filter(|&d| {
            NaiveDate::from_ymd_opt(year as i32, month as u32, d as u32)
                .map(|date| !matches!(date.weekday(), Weekday::Sat | Weekday::Sun))
                .unwrap_or(false)
        })
        .count() as u8
}

/// Number of ISO weeks (52 or 53) in `year`. December 28 always falls in
/// the year's last ISO week, by definition of the ISO week-numbering year.
pub fn iso_weeks(year: u16) -> u8 {
    NaiveDate::from_ymd_opt(year as i32, 12, 28)
        .map(|d| d.iso_week().week() as u8)
        .unwrap_or(52)
}

fn weekday_from_iso(w: u8) -> Option<Weekday> {
    match w {
        1 => Some(Weekday::Mon),
        2 => Some(Weekday::Tue),
        3 => Some(Weekday::Wed),
        4 => Some(Weekday::Thu),
        5 => Some(Weekday::Fri),
        6 => Some(Weekday::Sat),
        7 => Some(Weekday::Sun),
        _ => None,
    }
}

/// `w` is 1=Monday..7=Sunday; `c` is the 1-based occurrence within the
/// month. Clamps to the last occurrence if `c` would overflow the month, per
/// the data-model invariant on `Ymcw`.
fn ymcw_to_date(y: u16, m: u8, c: u8, w: u8) -> Option<NaiveDate> {
    let wanted = weekday_from_iso(w)?;
    let first = NaiveDate::from_ymd_opt(y as i32, m as u32, 1)?;
    let first_wday = first.weekday().number_from_monday();
    let offset = (7 + wanted.number_from_monday() as i32 - first_wday as i32) % 7;
    let mut day = 1 + offset + (c as i32 - 1) * 7;
    let last = ultimo(y, m) as i32;
    if day > last {
        // clamp to the last occurrence of `wanted` in the month
        day -= 7;
    }
    NaiveDate::from_ymd_opt(y as i32, m as u32, day as u32)
}

fn date_to_ymcw(date: NaiveDate) -> CalendarValue {
    let c = (date.day() - 1) / 7 + 1;
    CalendarValue::Ymcw {
        y: date.year() as u16,
        m: date.month() as u8,
        c: c as u8,
        w: date.weekday().number_from_monday() as u8,
    }
}

/// `bd` is the 1-based index of a business day (Mon-Fri) within the month.
fn bizda_to_date(y: u16, m: u8, bd: u8) -> Option<NaiveDate> {
    let last = ultimo(y, m);
    let mut seen = 0u8;
    for d in 1..=last {
        let date = NaiveDate::from_ymd_opt(y as i32, m as u32, d as u32)?;
        if !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            seen += 1;
            if seen == bd {
                return Some(date);
            }
        }
    }
    None
}

fn date_to_bizda(date: NaiveDate) -> CalendarValue {
    let y = date.year() as u16;
    let m = date.month() as u8;
    let mut bd = 0u8;
    for d in 1..=date.day() {
        if let Some(day) = NaiveDate::from_ymd_opt(y as i32, m as u32, d) {
            if !matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
                bd += 1;
            }
        }
    }
    CalendarValue::Bizda { y, m, bd }
}

/// Time-of-day, nanosecond resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Time {
    pub h: u8,
    pub m: u8,
    pub s: u8,
    pub ns: u32,
}

/// A composite date+time value. Either side may be absent; `fix_flag`
/// records that the upstream parser had to clamp an out-of-range field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sandwich {
    pub date: CalendarValue,
    pub time: Time,
    pub has_date: bool,
    pub has_time: bool,
    pub fix_flag: bool,
    pub zone_offset_minutes: Option<i32>,
}

impl Sandwich {
    pub fn date_only(date: CalendarValue) -> Self {
        Sandwich {
            date,
            time: Time::default(),
            has_date: true,
            has_time: false,
            fix_flag: false,
            zone_offset_minutes: None,
        }
    }

    pub fn time_only(time: Time) -> Self {
        Sandwich {
            date: CalendarValue::Unk,
            time,
            has_date: false,
            has_time: true,
            fix_flag: false,
            zone_offset_minutes: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ultimo_handles_leap_february() {
        assert_eq!(ultimo(2012, 2), 29);
        assert_eq!(ultimo(2011, 2), 28);
        assert_eq!(ultimo(2000, 2), 29);
        assert_eq!(ultimo(1900, 2), 28);
    }

    #[test]
    fn bdays_march_2012() {
        // March 2012: 31 days, starts on a Thursday, ends on a Saturday.
        assert_eq!(bdays(2012, 3), 22);
    }

    #[test]
    fn iso_weeks_matches_known_53_week_years() {
        assert_eq!(iso_weeks(2020), 53);
        assert_eq!(iso_weeks(2015), 53);
        assert_eq!(iso_weeks(2019), 52);
    }

    #[test]
    fn daisy_round_trip_is_exact_for_every_tag() {
        let samples = [
            CalendarValue::Ymd { y: 2012, m: 3, d: 1 },
            CalendarValue::Ymcw { y: 2012, m: 3, c: 1, w: 4 },
            CalendarValue::Bizda { y: 2012, m: 3, bd: 5 },
            CalendarValue::Ywd { y: 2012, c: 9, w: 4 },
        ];
        for v in samples {
            let serial = v.to_daisy().expect("representable");
            let back = v.from_daisy_as(serial);
            assert_eq!(back, v, "DAISY round-trip lost information for {v:?}");
        }
    }

    #[test]
    fn ymcw_clamps_to_last_occurrence() {
        // February 2021 has only 4 Mondays; asking for the 5th clamps to the 4th.
        let d = ymcw_to_date(2021, 2, 5, 1).unwrap();
        assert_eq!(d, ymcw_to_date(2021, 2, 4, 1).unwrap());
    }
}
