use time::{
    format_description::well_known::Rfc3339, macros::format_description, Date, OffsetDateTime,
};

pub fn now_rfc3339() -> String {
    format_rfc3339(OffsetDateTime::now_utc())
}

pub fn format_rfc3339(value: OffsetDateTime) -> String {
    value.format(&Rfc3339).unwrap_or_default()
}

pub fn today() -> Date {
    OffsetDateTime::now_utc().date()
}

/// Parse a calendar date in `YYYY-MM-DD` form.
pub fn parse_date(value: &str) -> Option<Date> {
    Date::parse(value.trim(), format_description!("[year]-[month]-[day]")).ok()
}

pub fn format_date(date: Date) -> String {
    date.format(format_description!("[year]-[month]-[day]"))
        .unwrap_or_default()
}

/// `YYYY-MM` bucket key used by monthly reports.
pub fn month_key(date: Date) -> String {
    format!("{:04}-{:02}", date.year(), u8::from(date.month()))
}

/// First day of the month `months_back` months before the month of `date`.
pub fn month_start_before(date: Date, months_back: u32) -> Date {
    let mut year = date.year();
    let mut month = u8::from(date.month()) as i32 - months_back as i32;
    while month < 1 {
        month += 12;
        year -= 1;
    }
    let month = time::Month::try_from(month as u8).unwrap_or(time::Month::January);
    Date::from_calendar_date(year, month, 1).unwrap_or(date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn test_parse_and_format_date() {
        let parsed = parse_date("2024-02-29").unwrap();
        assert_eq!(parsed, date!(2024 - 02 - 29));
        assert_eq!(format_date(parsed), "2024-02-29");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_date("2024-13-01").is_none());
        assert!(parse_date("29/02/2024").is_none());
        assert!(parse_date("").is_none());
    }

    #[test]
    fn test_month_start_before_wraps_year() {
        assert_eq!(month_start_before(date!(2024 - 03 - 15), 0), date!(2024 - 03 - 01));
        assert_eq!(month_start_before(date!(2024 - 03 - 15), 3), date!(2023 - 12 - 01));
        assert_eq!(month_start_before(date!(2024 - 01 - 31), 13), date!(2022 - 12 - 01));
    }

    #[test]
    fn test_month_key() {
        assert_eq!(month_key(date!(2023 - 07 - 04)), "2023-07");
    }
}
