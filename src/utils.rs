// Utility functions
use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, TimeZone, Utc};

/// Timestamp stamped on every outgoing message, in Korea Standard Time.
pub fn kst_timestamp(now: DateTime<Utc>) -> String {
    match FixedOffset::east_opt(9 * 3600) {
        Some(kst) => now.with_timezone(&kst).format("%Y-%m-%d %H:%M:%S KST").to_string(),
        None => now.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
    }
}

fn nth_sunday(year: i32, month: u32, n: u32) -> Option<NaiveDate> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let offset = (7 - first.weekday().num_days_from_sunday()) % 7;
    first.checked_add_days(chrono::Days::new((offset + 7 * (n - 1)) as u64))
}

/// Whether New York is on daylight saving time at `now`.
///
/// DST runs from 02:00 EST on the second Sunday of March to 02:00 EDT on the
/// first Sunday of November.
pub fn is_us_daylight_saving(now: DateTime<Utc>) -> bool {
    let year = now.year();
    let (Some(start), Some(end)) = (nth_sunday(year, 3, 2), nth_sunday(year, 11, 1)) else {
        return false;
    };
    let (Some(start), Some(end)) = (start.and_hms_opt(7, 0, 0), end.and_hms_opt(6, 0, 0)) else {
        return false;
    };
    let start = Utc.from_utc_datetime(&start);
    let end = Utc.from_utc_datetime(&end);
    now >= start && now < end
}

/// Formats with a fixed number of decimals and comma thousands separators.
pub fn format_number(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return "N/A".to_string();
    }
    let raw = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match raw.split_once('.') {
        Some((i, f)) => (i.to_string(), Some(f.to_string())),
        None => (raw.clone(), None),
    };
    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if value < 0.0 && raw.chars().any(|c| c.is_ascii_digit() && c != '0') {
        "-"
    } else {
        ""
    };
    match frac_part {
        Some(f) => format!("{sign}{grouped}.{f}"),
        None => format!("{sign}{grouped}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kst_is_nine_hours_ahead() {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 20, 30, 0).unwrap();
        assert_eq!(kst_timestamp(now), "2025-03-02 05:30:00 KST");
    }

    #[test]
    fn daylight_saving_boundaries() {
        // 2025: 9 March to 2 November
        assert!(!is_us_daylight_saving(Utc.with_ymd_and_hms(2025, 3, 9, 6, 59, 0).unwrap()));
        assert!(is_us_daylight_saving(Utc.with_ymd_and_hms(2025, 3, 9, 7, 0, 0).unwrap()));
        assert!(is_us_daylight_saving(Utc.with_ymd_and_hms(2025, 7, 4, 12, 0, 0).unwrap()));
        assert!(!is_us_daylight_saving(Utc.with_ymd_and_hms(2025, 11, 2, 6, 0, 0).unwrap()));
        assert!(!is_us_daylight_saving(Utc.with_ymd_and_hms(2025, 12, 25, 0, 0, 0).unwrap()));
    }

    #[test]
    fn numbers_get_grouped() {
        assert_eq!(format_number(1234567.891, 2), "1,234,567.89");
        assert_eq!(format_number(999.6, 0), "1,000");
        assert_eq!(format_number(-4321.0, 1), "-4,321.0");
        assert_eq!(format_number(-0.001, 2), "0.00");
        assert_eq!(format_number(f64::NAN, 2), "N/A");
    }
}
