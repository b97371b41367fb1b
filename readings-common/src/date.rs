//! Date handling for sheet rows and query strings.
//!
//! Rows carry `DD/MM/YYYY`; queries use one external format fixed per
//! deployment. Everything is compared in the canonical `YYYY-MM-DD` form.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::LookupError;

const CANONICAL_FORMAT: &str = "%Y-%m-%d";
const DAY_FIRST_FORMAT: &str = "%d-%m-%Y";

/// External format accepted for the `date` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateFormat {
    /// `YYYY-MM-DD`
    #[default]
    Iso,
    /// `DD-MM-YYYY`
    DayFirst,
}

impl DateFormat {
    /// Human readable form shown to clients in error messages.
    pub fn hint(&self) -> &'static str {
        match self {
            DateFormat::Iso => "YYYY-MM-DD",
            DateFormat::DayFirst => "DD-MM-YYYY",
        }
    }

    /// Strictly parse a query date. No other format is tried and no
    /// whitespace is allowed.
    pub fn parse(&self, raw: &str) -> Result<NaiveDate, LookupError> {
        let date = match (self, split_date(raw, '-')) {
            (DateFormat::Iso, Some([year, month, day])) => build_date(year, month, day),
            (DateFormat::DayFirst, Some([day, month, year])) => build_date(year, month, day),
            (_, None) => None,
        };
        date.ok_or(LookupError::InvalidDateFormat { expected: *self })
    }
}

impl std::fmt::Display for DateFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.hint())
    }
}

impl std::str::FromStr for DateFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "iso" | "yyyy-mm-dd" => Ok(DateFormat::Iso),
            "day_first" | "dd-mm-yyyy" => Ok(DateFormat::DayFirst),
            _ => Err(format!("Unknown date format: {}", s)),
        }
    }
}

/// Split `a<sep>b<sep>c` into three non-empty runs of ASCII digits.
fn split_date(raw: &str, sep: char) -> Option<[&str; 3]> {
    let mut parts = raw.split(sep);
    let date = [parts.next()?, parts.next()?, parts.next()?];
    if parts.next().is_some() {
        return None;
    }
    date.iter()
        .all(|part| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit()))
        .then_some(date)
}

/// Year must be exactly four digits; day and month may be unpadded.
fn build_date(year: &str, month: &str, day: &str) -> Option<NaiveDate> {
    if year.len() != 4 || month.len() > 2 || day.len() > 2 {
        return None;
    }
    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)
}

/// Parse a row's `DD/MM/YYYY` date. `None` for anything else, including
/// two-digit years and impossible calendar dates.
pub fn parse_record_date(raw: &str) -> Option<NaiveDate> {
    let [day, month, year] = split_date(raw.trim(), '/')?;
    build_date(year, month, day)
}

pub fn canonical(date: NaiveDate) -> String {
    date.format(CANONICAL_FORMAT).to_string()
}

/// Format used for the placeholder when the caller gave no date.
pub fn display_day_first(date: NaiveDate) -> String {
    date.format(DAY_FIRST_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_record_date_padded_and_unpadded() {
        assert_eq!(parse_record_date("05/03/2024"), Some(ymd(2024, 3, 5)));
        assert_eq!(parse_record_date("5/3/2024"), Some(ymd(2024, 3, 5)));
        assert_eq!(parse_record_date(" 25/12/2023 "), Some(ymd(2023, 12, 25)));
    }

    #[test]
    fn test_parse_record_date_rejects_garbage() {
        assert_eq!(parse_record_date("31-02-2024"), None);
        assert_eq!(parse_record_date("31/02/2024"), None);
        assert_eq!(parse_record_date(""), None);
        assert_eq!(parse_record_date("2024/03/05"), None);
        assert_eq!(parse_record_date("tomorrow"), None);
        assert_eq!(parse_record_date("05/03/24"), None);
        assert_eq!(parse_record_date("05/03/+2024"), None);
        assert_eq!(parse_record_date("05/03/2024/1"), None);
        assert_eq!(parse_record_date("005/03/2024"), None);
    }

    #[test]
    fn test_canonical_is_zero_padded() {
        let date = parse_record_date("5/3/2024").unwrap();
        assert_eq!(canonical(date), "2024-03-05");
        assert_eq!(display_day_first(date), "05-03-2024");
    }

    #[test]
    fn test_query_formats_are_strict() {
        assert_eq!(DateFormat::Iso.parse("2024-03-05").unwrap(), ymd(2024, 3, 5));
        assert_eq!(DateFormat::DayFirst.parse("05-03-2024").unwrap(), ymd(2024, 3, 5));

        assert!(DateFormat::Iso.parse("2024/02/30").is_err());
        assert!(DateFormat::Iso.parse("05-03-2024").is_err());
        assert!(DateFormat::DayFirst.parse("2024-03-05").is_err());
        assert!(DateFormat::Iso.parse("2024-02-30").is_err());
    }

    #[test]
    fn test_query_year_must_have_four_digits() {
        for raw in ["24-03-05", "+2024-03-05", " 2024-03-05", "2024-03-05 ", "02024-03-05", "2024--03-05"] {
            assert!(DateFormat::Iso.parse(raw).is_err(), "accepted {:?}", raw);
        }
        for raw in ["05-03-24", "5-3-24", "05-03-+2024", " 05-03-2024"] {
            assert!(DateFormat::DayFirst.parse(raw).is_err(), "accepted {:?}", raw);
        }
        assert_eq!(DateFormat::Iso.parse("2024-3-5").unwrap(), ymd(2024, 3, 5));
        assert_eq!(DateFormat::DayFirst.parse("5-3-2024").unwrap(), ymd(2024, 3, 5));
    }

    #[test]
    fn test_invalid_date_message() {
        let err = DateFormat::DayFirst.parse("nope").unwrap_err();
        assert_eq!(err.to_string(), "Invalid date format. Use DD-MM-YYYY.");
    }

    #[test]
    fn test_date_format_from_str() {
        assert_eq!("iso".parse::<DateFormat>(), Ok(DateFormat::Iso));
        assert_eq!("DD-MM-YYYY".parse::<DateFormat>(), Ok(DateFormat::DayFirst));
        assert!("mm/dd".parse::<DateFormat>().is_err());
    }
}
