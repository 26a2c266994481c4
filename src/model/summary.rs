use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::{AppError, FieldError};
use crate::model::attendance::AttendanceRecord;

pub const FIRST_SUPPORTED_YEAR: i32 = 2020;

/// Inclusive calendar-day bounds of one month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthWindow {
    month: u32,
    year: i32,
    first: NaiveDate,
    last: NaiveDate,
}

impl MonthWindow {
    pub fn new(month: u32, year: i32) -> Result<Self, AppError> {
        let mut errors = Vec::new();
        if !(1..=12).contains(&month) {
            errors.push(FieldError::new("month", "Month must be between 1 and 12"));
        }
        if year < FIRST_SUPPORTED_YEAR {
            errors.push(FieldError::new("year", "Year must be 2020 or later"));
        }
        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }

        let (next_year, next_month) = if month == 12 {
            (year + 1, 1)
        } else {
            (year, month + 1)
        };
        let first = NaiveDate::from_ymd_opt(year, month, 1);
        let last = NaiveDate::from_ymd_opt(next_year, next_month, 1).and_then(|d| d.pred_opt());

        match (first, last) {
            (Some(first), Some(last)) => Ok(Self {
                month,
                year,
                first,
                last,
            }),
            _ => Err(AppError::validation("year", "Year is out of range")),
        }
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first
    }

    pub fn last_day(&self) -> NaiveDate {
        self.last
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        day.year() == self.year && day.month() == self.month
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySummary {
    #[schema(example = 3)]
    pub month: u32,
    #[schema(example = 2024)]
    pub year: i32,
    #[schema(example = 2)]
    pub total_working_days: u32,
    #[schema(example = 1)]
    pub present_days: u32,
    #[schema(example = 1)]
    pub absent_days: u32,
    #[schema(example = 22)]
    pub total_bills: u64,
    #[schema(example = 500)]
    pub total_incentives: u64,
    #[schema(example = 1500)]
    pub total_salary: u64,
    #[schema(example = 22.0)]
    pub average_bills_per_day: f64,
}

impl MonthlySummary {
    /// Reduces the records falling inside `window`; an empty month yields an
    /// all-zero summary.
    pub fn summarize<'a, I>(window: &MonthWindow, records: I) -> Self
    where
        I: IntoIterator<Item = &'a AttendanceRecord>,
    {
        let mut summary = Self {
            month: window.month(),
            year: window.year(),
            total_working_days: 0,
            present_days: 0,
            absent_days: 0,
            total_bills: 0,
            total_incentives: 0,
            total_salary: 0,
            average_bills_per_day: 0.0,
        };

        for record in records.into_iter().filter(|r| window.contains(r.date)) {
            summary.total_working_days += 1;
            if record.is_present {
                summary.present_days += 1;
            } else {
                summary.absent_days += 1;
            }
            summary.total_bills += u64::from(record.bills_count);
            summary.total_incentives += u64::from(record.incentive);
            summary.total_salary += u64::from(record.total_salary);
        }

        if summary.present_days > 0 {
            summary.average_bills_per_day =
                summary.total_bills as f64 / f64::from(summary.present_days);
        }

        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::attendance::{AttendanceDraft, AttendanceEntry};
    use chrono::{TimeZone, Utc};
    use rstest::rstest;

    fn record(id: u64, day: u32, is_present: bool, bills_count: u32) -> AttendanceRecord {
        let date = NaiveDate::from_ymd_opt(2024, 3, day).unwrap();
        let (start_time, end_time) = if is_present {
            (
                Some(Utc.with_ymd_and_hms(2024, 3, day, 9, 0, 0).unwrap()),
                Some(Utc.with_ymd_and_hms(2024, 3, day, 17, 0, 0).unwrap()),
            )
        } else {
            (None, None)
        };
        let entry = AttendanceEntry {
            date,
            is_present,
            start_time,
            end_time,
            bills_count,
            remarks: None,
        };
        AttendanceDraft::new(7, entry)
            .unwrap()
            .to_record(id, Utc::now(), Utc::now())
    }

    #[rstest]
    #[case(2, 2024, 29)]
    #[case(2, 2023, 28)]
    #[case(4, 2024, 30)]
    #[case(12, 2024, 31)]
    fn window_ends_on_last_calendar_day(#[case] month: u32, #[case] year: i32, #[case] last: u32) {
        let window = MonthWindow::new(month, year).unwrap();

        assert_eq!(window.first_day(), NaiveDate::from_ymd_opt(year, month, 1).unwrap());
        assert_eq!(window.last_day(), NaiveDate::from_ymd_opt(year, month, last).unwrap());
    }

    #[rstest]
    #[case(0, 2024)]
    #[case(13, 2024)]
    #[case(3, 2019)]
    fn window_rejects_out_of_range_input(#[case] month: u32, #[case] year: i32) {
        assert!(matches!(
            MonthWindow::new(month, year),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn empty_month_is_all_zero() {
        let window = MonthWindow::new(3, 2024).unwrap();
        let none: Vec<AttendanceRecord> = Vec::new();
        let summary = MonthlySummary::summarize(&window, &none);

        assert_eq!(summary.total_working_days, 0);
        assert_eq!(summary.present_days, 0);
        assert_eq!(summary.absent_days, 0);
        assert_eq!(summary.total_bills, 0);
        assert_eq!(summary.total_incentives, 0);
        assert_eq!(summary.total_salary, 0);
        assert_eq!(summary.average_bills_per_day, 0.0);
    }

    #[test]
    fn march_scenario() {
        let window = MonthWindow::new(3, 2024).unwrap();
        let records = [record(1, 5, true, 22), record(2, 6, false, 7)];

        let summary = MonthlySummary::summarize(&window, &records);

        assert_eq!(summary.total_working_days, 2);
        assert_eq!(summary.present_days, 1);
        assert_eq!(summary.absent_days, 1);
        assert_eq!(summary.total_bills, 22);
        assert_eq!(summary.total_incentives, 500);
        assert_eq!(summary.total_salary, 1500);
        assert_eq!(summary.average_bills_per_day, 22.0);
    }

    #[test]
    fn average_is_over_present_days_only() {
        let window = MonthWindow::new(3, 2024).unwrap();
        let records = [
            record(1, 1, true, 10),
            record(2, 2, true, 25),
            record(3, 3, false, 0),
        ];

        let summary = MonthlySummary::summarize(&window, &records);

        assert_eq!(summary.total_bills, 35);
        assert_eq!(summary.average_bills_per_day, 17.5);
        assert_eq!(summary.total_salary, 3000);
    }

    #[test]
    fn records_outside_the_month_are_ignored() {
        let window = MonthWindow::new(4, 2024).unwrap();
        let summary = MonthlySummary::summarize(&window, &[record(1, 5, true, 22)]);

        assert_eq!(summary.total_working_days, 0);
    }
}
