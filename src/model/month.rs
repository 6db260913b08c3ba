use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// A reporting month, keyed by the last day of the calendar month.
///
/// Every date in January 2025 falls into the bucket `2025-01-31`. Ordering is chronological.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(from = "NaiveDate", into = "NaiveDate")]
pub struct Month(NaiveDate);

impl Month {
    /// The bucket that `date` falls into.
    pub fn from_date(date: NaiveDate) -> Self {
        Self(end_of_month(date))
    }

    pub fn from_ymd(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(Self::from_date)
    }

    /// The month-end date of this bucket.
    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// The calendar month before this one, whether or not it has any data.
    pub fn previous(&self) -> Self {
        self.0
            .with_day(1)
            .and_then(|first| first.pred_opt())
            .map(Self)
            .unwrap_or(*self)
    }

    /// A short human label such as `Jan 2025`.
    pub fn label(&self) -> String {
        self.0.format("%b %Y").to_string()
    }
}

impl From<NaiveDate> for Month {
    fn from(date: NaiveDate) -> Self {
        Self::from_date(date)
    }
}

impl From<Month> for NaiveDate {
    fn from(month: Month) -> Self {
        month.0
    }
}

impl Display for Month {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

fn end_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1)
        .and_then(|first| first.checked_add_months(Months::new(1)))
        .and_then(|next| next.pred_opt())
        .unwrap_or(date)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_end_of_month() {
        assert_eq!(Month::from_date(date(2025, 1, 1)).date(), date(2025, 1, 31));
        assert_eq!(Month::from_date(date(2025, 1, 31)).date(), date(2025, 1, 31));
        assert_eq!(Month::from_date(date(2025, 4, 10)).date(), date(2025, 4, 30));
        assert_eq!(Month::from_date(date(2025, 12, 5)).date(), date(2025, 12, 31));
    }

    #[test]
    fn test_leap_february() {
        assert_eq!(Month::from_date(date(2024, 2, 3)).date(), date(2024, 2, 29));
        assert_eq!(Month::from_date(date(2025, 2, 3)).date(), date(2025, 2, 28));
    }

    #[test]
    fn test_same_month_same_bucket() {
        assert_eq!(
            Month::from_date(date(2025, 3, 1)),
            Month::from_date(date(2025, 3, 29))
        );
    }

    #[test]
    fn test_previous_is_calendar_month() {
        let march = Month::from_ymd(2025, 3).unwrap();
        assert_eq!(march.previous(), Month::from_ymd(2025, 2).unwrap());
        let january = Month::from_ymd(2025, 1).unwrap();
        assert_eq!(january.previous().date(), date(2024, 12, 31));
    }

    #[test]
    fn test_display_and_serde() {
        let m = Month::from_ymd(2025, 6).unwrap();
        assert_eq!(m.to_string(), "2025-06-30");
        assert_eq!(m.label(), "Jun 2025");
        assert_eq!(serde_json::to_string(&m).unwrap(), "\"2025-06-30\"");
        let back: Month = serde_json::from_str("\"2025-06-12\"").unwrap();
        assert_eq!(back, m);
    }
}
