use chrono::NaiveDate;

const DAYS_LEAP: [u32; 12] = [31, 29, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];
const DAYS_NON_LEAP: [u32; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// Number of days in `month` (1-12) of `year`.
///
/// A year is treated as a leap year when it is divisible by 4. Century years
/// are *not* excluded, so 1900 and 2100 get a 29-day February. Every year of
/// the GFAS record (2003 onwards) is unaffected; see [`DateRange::is_gregorian`]
/// for detecting the divergence.
///
/// Panics if `month` is outside 1-12; months are validated with the batch
/// configuration before they reach this function.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let table = if year % 4 == 0 { &DAYS_LEAP } else { &DAYS_NON_LEAP };
    table[(month - 1) as usize]
}

/// Whole-month date range, always starting on day 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub year: i32,
    pub month: u32,
    pub first_day: u32,
    pub last_day: u32,
}

impl DateRange {
    pub fn for_month(year: i32, month: u32) -> Self {
        Self {
            year,
            month,
            first_day: 1,
            last_day: days_in_month(year, month),
        }
    }

    pub fn start(&self) -> String {
        iso_date(self.year, self.month, self.first_day)
    }

    pub fn end(&self) -> String {
        iso_date(self.year, self.month, self.last_day)
    }

    /// `YYYY-MM-01<separator>YYYY-MM-DD`, the separator being archive syntax.
    pub fn to_archive_string(&self, separator: &str) -> String {
        format!("{}{separator}{}", self.start(), self.end())
    }

    /// False when `last_day` does not exist on the Gregorian calendar,
    /// i.e. February 29 of a century year not divisible by 400.
    pub fn is_gregorian(&self) -> bool {
        NaiveDate::from_ymd_opt(self.year, self.month, self.last_day).is_some()
    }
}

fn iso_date(year: i32, month: u32, day: u32) -> String {
    format!("{year:04}-{month:02}-{day:02}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn february_follows_divisible_by_four() {
        for year in 1890..2110 {
            let expected = if year % 4 == 0 { 29 } else { 28 };
            assert_eq!(days_in_month(year, 2), expected, "year {year}");
        }
        assert_eq!(days_in_month(1900, 2), 29);
        assert_eq!(days_in_month(2100, 2), 29);
    }

    #[test]
    fn other_months_constant() {
        let expected = [31, 0, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];
        for year in [1900, 2003, 2004, 2020, 2023] {
            for month in (1..=12).filter(|m| *m != 2) {
                assert_eq!(days_in_month(year, month), expected[(month - 1) as usize]);
            }
        }
    }

    #[test]
    fn archive_strings() {
        let r = DateRange::for_month(2003, 1);
        assert_eq!(r.to_archive_string("/"), "2003-01-01/2003-01-31");
        assert_eq!(r.to_archive_string("/to/"), "2003-01-01/to/2003-01-31");
        assert_eq!(DateRange::for_month(2004, 2).end(), "2004-02-29");
    }

    #[test]
    fn flags_century_years() {
        assert!(DateRange::for_month(2000, 2).is_gregorian());
        assert!(DateRange::for_month(2020, 2).is_gregorian());
        assert!(!DateRange::for_month(1900, 2).is_gregorian());
        assert!(DateRange::for_month(1900, 3).is_gregorian());
    }
}
