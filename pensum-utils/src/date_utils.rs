/// A year is a leap year if constructing February 29th succeeds.
pub fn is_leap_year(year: i32) -> bool {
    time::Date::from_calendar_date(year, time::Month::February, 29).is_ok()
}

/// Number of days in the given calendar year, 365 or 366.
pub fn days_in_year(year: i32) -> u16 {
    if is_leap_year(year) {
        366
    } else {
        365
    }
}

/// Number of calendar days covered by the range, both endpoints included.
/// An inverted range counts as zero days.
pub fn inclusive_day_span(from: time::Date, to: time::Date) -> u32 {
    let days = (to - from).whole_days() + 1;
    if days < 0 {
        0
    } else {
        days as u32
    }
}

/// Parse an ISO calendar date (`YYYY-MM-DD`).
pub fn parse_iso_date(value: &str) -> Result<time::Date, time::error::Parse> {
    time::Date::parse(value, &time::format_description::well_known::Iso8601::DATE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn test_leap_years() {
        assert!(is_leap_year(2024));
        assert!(!is_leap_year(2023));
        assert!(is_leap_year(2000));
        assert!(!is_leap_year(1900));
    }

    #[test]
    fn test_days_in_year() {
        assert_eq!(days_in_year(2023), 365);
        assert_eq!(days_in_year(2024), 366);
    }

    #[test]
    fn test_inclusive_day_span_single_day() {
        let day = date!(2024 - 01 - 15);
        assert_eq!(inclusive_day_span(day, day), 1);
    }

    #[test]
    fn test_inclusive_day_span_full_month() {
        assert_eq!(
            inclusive_day_span(date!(2024 - 01 - 01), date!(2024 - 01 - 31)),
            31
        );
    }

    #[test]
    fn test_inclusive_day_span_across_years() {
        assert_eq!(
            inclusive_day_span(date!(2023 - 12 - 31), date!(2024 - 01 - 01)),
            2
        );
    }

    #[test]
    fn test_inclusive_day_span_inverted_range() {
        assert_eq!(
            inclusive_day_span(date!(2024 - 01 - 02), date!(2024 - 01 - 01)),
            0
        );
    }

    #[test]
    fn test_parse_iso_date() {
        assert_eq!(
            parse_iso_date("2024-02-29").unwrap(),
            date!(2024 - 02 - 29)
        );
        assert!(parse_iso_date("2023-02-29").is_err());
    }
}
