use chrono::{Datelike, Duration, Local, NaiveDate, NaiveDateTime};

use crate::grid::Day;

/// Formats a date the way it is stored in cells: `dd.mm`.
pub fn short_date(date: NaiveDate) -> String {
    date.format("%d.%m").to_string()
}

/// Date of the next occurrence of `day`, counting from `base`. A day
/// earlier in the week than `base` lands on next week; `base`'s own
/// weekday lands on `base` itself.
pub fn date_for_weekday(day: Day, base: NaiveDate) -> NaiveDate {
    let target = i64::from(day.weekday().num_days_from_monday());
    let current = i64::from(base.weekday().num_days_from_monday());

    let mut days_ahead = target - current;
    if days_ahead < 0 {
        days_ahead += 7;
    }
    base + Duration::days(days_ahead)
}

/// `dd.mm` of the next occurrence of `day` from today, local time.
pub fn upcoming_date_for_day(day: Day) -> String {
    short_date(date_for_weekday(day, Local::now().date_naive()))
}

/// Whether a `dd.mm` booking date has passed, counting to the end of its
/// day. Unparseable dates count as expired so broken records get pruned.
pub fn is_date_expired(date_str: &str) -> bool {
    is_date_expired_at(date_str, Local::now().naive_local())
}

/// Testable core of [`is_date_expired`]. The stored format has no year,
/// so around the December/January boundary the date is pinned to the
/// adjacent year instead of the current one.
pub fn is_date_expired_at(date_str: &str, now: NaiveDateTime) -> bool {
    let Some((day, month)) = parse_short_date(date_str) else {
        return true;
    };

    let mut year = now.year();
    if now.month() == 1 && month == 12 {
        year -= 1;
    } else if now.month() == 12 && month == 1 {
        year += 1;
    }

    let Some(end_of_day) = NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(23, 59, 0))
    else {
        return true;
    };

    end_of_day < now
}

fn parse_short_date(date_str: &str) -> Option<(u32, u32)> {
    let (day, month) = date_str.trim().split_once('.')?;
    Some((day.parse().ok()?, month.parse().ok()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_date_for_weekday_same_day_stays() {
        // 2024-05-20 is a Monday
        let base = NaiveDate::from_ymd_opt(2024, 5, 20).unwrap();
        assert_eq!(date_for_weekday(Day::Mon, base), base);
    }

    #[test]
    fn test_date_for_weekday_later_this_week() {
        let base = NaiveDate::from_ymd_opt(2024, 5, 20).unwrap();
        assert_eq!(
            date_for_weekday(Day::Thu, base),
            NaiveDate::from_ymd_opt(2024, 5, 23).unwrap()
        );
    }

    #[test]
    fn test_date_for_weekday_wraps_to_next_week() {
        // 2024-05-22 is a Wednesday; Monday falls on next week
        let base = NaiveDate::from_ymd_opt(2024, 5, 22).unwrap();
        assert_eq!(
            date_for_weekday(Day::Mon, base),
            NaiveDate::from_ymd_opt(2024, 5, 27).unwrap()
        );
    }

    #[test]
    fn test_short_date_zero_pads() {
        assert_eq!(
            short_date(NaiveDate::from_ymd_opt(2024, 1, 5).unwrap()),
            "05.01"
        );
    }

    #[test]
    fn test_expired_yesterday() {
        assert!(is_date_expired_at("19.05", at(2024, 5, 20, 10)));
    }

    #[test]
    fn test_not_expired_today_until_end_of_day() {
        assert!(!is_date_expired_at("20.05", at(2024, 5, 20, 23)));
    }

    #[test]
    fn test_not_expired_tomorrow() {
        assert!(!is_date_expired_at("21.05", at(2024, 5, 20, 10)));
    }

    #[test]
    fn test_january_booking_seen_from_december_is_next_year() {
        assert!(!is_date_expired_at("02.01", at(2024, 12, 30, 12)));
    }

    #[test]
    fn test_december_booking_seen_from_january_is_last_year() {
        assert!(is_date_expired_at("30.12", at(2025, 1, 2, 12)));
    }

    #[test]
    fn test_garbage_dates_count_as_expired() {
        assert!(is_date_expired_at("", at(2024, 5, 20, 10)));
        assert!(is_date_expired_at("yesterday", at(2024, 5, 20, 10)));
        assert!(is_date_expired_at("31.02", at(2024, 5, 20, 10)));
        assert!(is_date_expired_at("20-05", at(2024, 5, 20, 10)));
    }
}
