use chrono::{Datelike, Local, Months, NaiveDate};

pub const MINOR_AGE: u32 = 18;
pub const MAX_AGE: u32 = 120;

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Parse a form date (`YYYY-MM-DD`, time part ignored).
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let day = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

/// Completed years between `dob` and `today`. Zero for future dates.
pub fn age_on(dob: NaiveDate, today: NaiveDate) -> u32 {
    if dob > today {
        return 0;
    }
    let mut years = (today.year() - dob.year()) as u32;
    if (today.month(), today.day()) < (dob.month(), dob.day()) {
        years -= 1;
    }
    years
}

/// A member is a minor until the day their 18th birthday is reached.
/// A 29 February birthday is reached on 28 February in common years.
pub fn is_minor(dob: NaiveDate, today: NaiveDate) -> bool {
    match dob.checked_add_months(Months::new(MINOR_AGE * 12)) {
        Some(adult_on) => today < adult_on,
        None => false,
    }
}

pub(crate) fn check_date_of_birth(raw: &str, today: NaiveDate) -> Result<(), &'static str> {
    let dob = parse_date(raw).ok_or("Enter a valid date")?;
    if dob > today {
        return Err("Date of birth cannot be in the future");
    }
    if age_on(dob, today) > MAX_AGE {
        return Err("Age cannot exceed 120 years");
    }
    Ok(())
}

pub(crate) fn check_past_date(raw: &str, today: NaiveDate) -> Result<(), &'static str> {
    let date = parse_date(raw).ok_or("Enter a valid date")?;
    if date > today {
        return Err("Date cannot be in the future");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_exactly_eighteen_is_adult() {
        let today = d(2026, 10, 16);
        assert!(!is_minor(d(2008, 10, 16), today));
        assert!(is_minor(d(2008, 10, 17), today));
        assert_eq!(age_on(d(2008, 10, 16), today), 18);
        assert_eq!(age_on(d(2008, 10, 17), today), 17);
    }

    #[test]
    fn test_leap_day_birthday() {
        let dob = d(2008, 2, 29);
        assert!(is_minor(dob, d(2026, 2, 27)));
        assert!(!is_minor(dob, d(2026, 2, 28)));
    }

    #[test]
    fn test_date_of_birth_rules() {
        let today = d(2026, 10, 16);
        assert!(check_date_of_birth("1990-04-07", today).is_ok());
        assert_eq!(
            check_date_of_birth("2026-10-17", today),
            Err("Date of birth cannot be in the future")
        );
        assert_eq!(check_date_of_birth("1900-01-01", today), Err("Age cannot exceed 120 years"));
        assert_eq!(check_date_of_birth("07/04/1990", today), Err("Enter a valid date"));
    }

    #[test]
    fn test_past_date() {
        let today = d(2026, 10, 16);
        assert!(check_past_date("2026-10-16", today).is_ok());
        assert!(check_past_date("2026-10-16T00:00:00Z", today).is_ok());
        assert!(check_past_date("2027-01-01", today).is_err());
    }
}
