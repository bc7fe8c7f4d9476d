//! Search inputs: route plus travel date

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use std::fmt;

/// Textual format dates are accepted in
pub const DATE_FORMAT: &str = "%m/%d/%Y";

/// Departure date, with the per-site renderings the calendar widgets expect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TravelDate(NaiveDate);

/// Day / abbreviated month / year, as picked one at a time in a date picker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateParts {
    pub day: u32,
    pub month: String,
    pub year: String,
}

impl TravelDate {
    /// Parse "MM/DD/YYYY"
    pub fn parse(text: &str) -> Result<Self> {
        let date = NaiveDate::parse_from_str(text.trim(), DATE_FORMAT)
            .with_context(|| format!("Invalid travel date '{}': expected MM/DD/YYYY", text))?;
        Ok(Self(date))
    }

    pub fn parts(&self) -> DateParts {
        DateParts {
            day: self.0.day(),
            month: self.0.format("%b").to_string(),
            year: self.0.year().to_string(),
        }
    }

    /// "Sun Jul 13 2025"
    pub fn long_label(&self) -> String {
        self.0.format("%a %b %d %Y").to_string()
    }
}

impl fmt::Display for TravelDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DATE_FORMAT))
    }
}

/// One-way route and date to search on every site
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub origin: String,
    pub destination: String,
    pub date: TravelDate,
}

impl SearchQuery {
    pub fn new(origin: &str, destination: &str, date: &str) -> Result<Self> {
        let origin = origin.trim();
        let destination = destination.trim();
        if origin.is_empty() || destination.is_empty() {
            anyhow::bail!("Origin and destination codes must not be empty");
        }

        Ok(Self {
            origin: origin.to_uppercase(),
            destination: destination.to_uppercase(),
            date: TravelDate::parse(date)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_parts() {
        let date = TravelDate::parse("07/13/2025").unwrap();
        let parts = date.parts();
        assert_eq!(parts.day, 13);
        assert_eq!(parts.month, "Jul");
        assert_eq!(parts.year, "2025");
    }

    #[test]
    fn test_parts_day_has_no_padding() {
        let parts = TravelDate::parse("01/05/2026").unwrap().parts();
        assert_eq!(parts.day, 5);
        assert_eq!(parts.day.to_string(), "5");
        assert_eq!(parts.month, "Jan");
    }

    #[test]
    fn test_long_label() {
        let date = TravelDate::parse("07/13/2025").unwrap();
        assert_eq!(date.long_label(), "Sun Jul 13 2025");
        assert_eq!(
            TravelDate::parse("07/05/2025").unwrap().long_label(),
            "Sat Jul 05 2025"
        );
    }

    #[test]
    fn test_display_round_trips_input() {
        assert_eq!(TravelDate::parse("07/13/2025").unwrap().to_string(), "07/13/2025");
    }

    #[test]
    fn test_parse_rejects_other_formats() {
        assert!(TravelDate::parse("2025-07-13").is_err());
        assert!(TravelDate::parse("13/07/2025").is_err());
        assert!(TravelDate::parse("").is_err());
    }

    #[test]
    fn test_query_normalizes_codes() {
        let query = SearchQuery::new(" lhe ", "khi", "07/13/2025").unwrap();
        assert_eq!(query.origin, "LHE");
        assert_eq!(query.destination, "KHI");
        assert!(SearchQuery::new("", "KHI", "07/13/2025").is_err());
    }
}
