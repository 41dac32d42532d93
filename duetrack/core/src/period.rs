use chrono::{Datelike, Days, NaiveDate};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The reporting windows offered by analytics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PeriodKind {
    Week,
    Month,
}

impl PeriodKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PeriodKind::Week => "week",
            PeriodKind::Month => "month",
        }
    }
}

impl fmt::Display for PeriodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PeriodError {
    #[error("Unknown period '{0}'")]
    UnknownKind(String),
    #[error("Date {0} is outside the supported calendar range")]
    OutOfRange(NaiveDate),
}

impl FromStr for PeriodKind {
    type Err = PeriodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "week" => Ok(PeriodKind::Week),
            "month" => Ok(PeriodKind::Month),
            _ => Err(PeriodError::UnknownKind(s.to_string())),
        }
    }
}

/// A contiguous, inclusive range of calendar days with a display label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Period {
    pub kind: PeriodKind,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub label: String,
}

impl Period {
    /// Resolves the period of the given kind that contains `today`.
    ///
    /// Weeks start on Monday. Months run from the first to the last calendar day.
    pub fn resolve(kind: PeriodKind, today: NaiveDate) -> Result<Self, PeriodError> {
        match kind {
            PeriodKind::Week => {
                let offset = u64::from(today.weekday().num_days_from_monday());
                let start = today
                    .checked_sub_days(Days::new(offset))
                    .ok_or(PeriodError::OutOfRange(today))?;
                let end = start
                    .checked_add_days(Days::new(6))
                    .ok_or(PeriodError::OutOfRange(today))?;
                let label = format!("Week: {} – {}", start.format("%d.%m"), end.format("%d.%m"));
                Ok(Period {
                    kind,
                    start,
                    end,
                    label,
                })
            }
            PeriodKind::Month => {
                let start = today.with_day(1).ok_or(PeriodError::OutOfRange(today))?;
                let next_month_start = if today.month() == 12 {
                    NaiveDate::from_ymd_opt(today.year() + 1, 1, 1)
                } else {
                    NaiveDate::from_ymd_opt(today.year(), today.month() + 1, 1)
                }
                .ok_or(PeriodError::OutOfRange(today))?;
                let end = next_month_start
                    .pred_opt()
                    .ok_or(PeriodError::OutOfRange(today))?;
                let label = format!("Month: {}", start.format("%B %Y"));
                Ok(Period {
                    kind,
                    start,
                    end,
                    label,
                })
            }
        }
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }

    /// Number of days in the period.
    pub fn len_days(&self) -> usize {
        ((self.end - self.start).num_days() + 1).max(0) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[rstest]
    #[case::monday(date(2024, 6, 10))]
    #[case::wednesday(date(2024, 6, 12))]
    #[case::sunday(date(2024, 6, 16))]
    fn can_resolve_week_starting_monday(#[case] today: NaiveDate) {
        let period = Period::resolve(PeriodKind::Week, today).unwrap();

        assert_eq!(period.start, date(2024, 6, 10));
        assert_eq!(period.end, date(2024, 6, 16));
        assert_eq!(period.label, "Week: 10.06 – 16.06");
        assert_eq!(period.len_days(), 7);
    }

    #[test]
    fn can_resolve_week_spanning_new_year() {
        let period = Period::resolve(PeriodKind::Week, date(2025, 1, 1)).unwrap();

        assert_eq!(period.start, date(2024, 12, 30));
        assert_eq!(period.end, date(2025, 1, 5));
    }

    #[rstest]
    #[case::june(date(2024, 6, 15), date(2024, 6, 1), date(2024, 6, 30))]
    #[case::december(date(2024, 12, 31), date(2024, 12, 1), date(2024, 12, 31))]
    #[case::leap_february(date(2024, 2, 10), date(2024, 2, 1), date(2024, 2, 29))]
    #[case::plain_february(date(2023, 2, 10), date(2023, 2, 1), date(2023, 2, 28))]
    fn can_resolve_calendar_month(
        #[case] today: NaiveDate,
        #[case] start: NaiveDate,
        #[case] end: NaiveDate,
    ) {
        let period = Period::resolve(PeriodKind::Month, today).unwrap();

        assert_eq!(period.start, start);
        assert_eq!(period.end, end);
        assert_eq!(period.len_days() as i64, (end - start).num_days() + 1);
    }

    #[test]
    fn can_label_month_period() {
        let period = Period::resolve(PeriodKind::Month, date(2024, 6, 15)).unwrap();

        assert_eq!(period.label, "Month: June 2024");
        assert!(period.contains(date(2024, 6, 30)));
        assert!(!period.contains(date(2024, 7, 1)));
    }

    #[test]
    fn can_parse_period_kind() {
        assert_eq!("week".parse::<PeriodKind>(), Ok(PeriodKind::Week));
        assert_eq!("MONTH".parse::<PeriodKind>(), Ok(PeriodKind::Month));
        assert_eq!(
            "year".parse::<PeriodKind>(),
            Err(PeriodError::UnknownKind("year".to_string()))
        );
    }
}
