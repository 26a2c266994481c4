use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::{AppError, FieldError};
use crate::model::payroll::Payroll;

pub const MAX_REMARKS_LEN: usize = 500;

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    #[schema(example = 42)]
    pub id: u64,

    #[schema(example = 7)]
    pub employee_id: u64,

    #[schema(example = "2024-03-05", value_type = String, format = "date")]
    pub date: NaiveDate,

    pub is_present: bool,

    #[schema(example = "2024-03-05T09:00:00Z", value_type = Option<String>, format = "date-time")]
    pub start_time: Option<DateTime<Utc>>,

    #[schema(example = "2024-03-05T17:30:00Z", value_type = Option<String>, format = "date-time")]
    pub end_time: Option<DateTime<Utc>>,

    #[schema(example = 22)]
    pub bills_count: u32,

    #[schema(example = "Covered the evening shift")]
    pub remarks: Option<String>,

    #[schema(example = 1000)]
    pub base_payment: u32,

    #[schema(example = 500)]
    pub incentive: u32,

    #[schema(example = 1500)]
    pub total_salary: u32,

    #[schema(value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,

    #[schema(value_type = String, format = "date-time")]
    pub updated_at: DateTime<Utc>,
}

/// The client-controlled part of an attendance day, already parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct AttendanceEntry {
    pub date: NaiveDate,
    pub is_present: bool,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub bills_count: u32,
    pub remarks: Option<String>,
}

impl AttendanceEntry {
    pub fn field_errors(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();

        if self.is_present && self.start_time.is_none() {
            errors.push(FieldError::new("startTime", "Start time is required when present"));
        }
        if self.is_present && self.end_time.is_none() {
            errors.push(FieldError::new("endTime", "End time is required when present"));
        }
        if let Some(remarks) = &self.remarks {
            if remarks.chars().count() > MAX_REMARKS_LEN {
                errors.push(FieldError::new(
                    "remarks",
                    "Remarks must be less than 500 characters",
                ));
            }
        }

        errors
    }

    pub fn validate(&self) -> Result<(), AppError> {
        let errors = self.field_errors();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(errors))
        }
    }
}

/// A validated entry bound to its owner, with payroll derived from the
/// entry's current values. Stores only ever persist drafts.
#[derive(Debug, Clone, PartialEq)]
pub struct AttendanceDraft {
    employee_id: u64,
    entry: AttendanceEntry,
    payroll: Payroll,
}

impl AttendanceDraft {
    pub fn new(employee_id: u64, entry: AttendanceEntry) -> Result<Self, AppError> {
        entry.validate()?;
        let payroll = Payroll::derive(entry.is_present, entry.bills_count);

        Ok(Self {
            employee_id,
            entry,
            payroll,
        })
    }

    pub fn employee_id(&self) -> u64 {
        self.employee_id
    }

    pub fn entry(&self) -> &AttendanceEntry {
        &self.entry
    }

    pub fn payroll(&self) -> Payroll {
        self.payroll
    }

    /// Materializes the draft as a stored row.
    pub fn to_record(
        &self,
        id: u64,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> AttendanceRecord {
        AttendanceRecord {
            id,
            employee_id: self.employee_id,
            date: self.entry.date,
            is_present: self.entry.is_present,
            start_time: self.entry.start_time,
            end_time: self.entry.end_time,
            bills_count: self.payroll.bills_count,
            remarks: self.entry.remarks.clone(),
            base_payment: self.payroll.base_payment,
            incentive: self.payroll.incentive,
            total_salary: self.payroll.total_salary,
            created_at,
            updated_at,
        }
    }
}

/// Accepts `YYYY-MM-DD` or a full ISO 8601 timestamp and keeps only the
/// calendar day as written, in the timestamp's own offset.
pub fn parse_day(input: &str) -> Option<NaiveDate> {
    let input = input.trim();
    if let Ok(day) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Some(day);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(input) {
        return Some(ts.date_naive());
    }
    parse_timestamp(input).map(|ts| ts.date_naive())
}

/// RFC 3339, or a zone-less ISO 8601 date-time read as UTC.
pub fn parse_timestamp(input: &str) -> Option<DateTime<Utc>> {
    let input = input.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(input) {
        return Some(ts.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
        .map(|naive| naive.and_utc())
}
