use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::instrument;
use utoipa::{IntoParams, ToSchema};

use crate::{
    auth::auth::AuthEmployee,
    error::{AppError, FieldError},
    model::{
        attendance::{AttendanceEntry, AttendanceRecord, parse_day, parse_timestamp},
        employee::EmployeeRef,
        summary::{MonthWindow, MonthlySummary},
    },
    service::attendance::UpsertOutcome,
    state::AppState,
};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRequest {
    /// Calendar day; a full timestamp is accepted and truncated to its date.
    #[schema(example = "2024-03-05")]
    pub date: Option<String>,

    #[schema(example = true)]
    pub is_present: bool,

    #[serde(default)]
    #[schema(example = 22)]
    pub bills_count: i64,

    #[schema(example = "2024-03-05T09:00:00Z")]
    pub start_time: Option<String>,

    #[schema(example = "2024-03-05T17:30:00Z")]
    pub end_time: Option<String>,

    #[schema(example = "Covered the evening shift")]
    pub remarks: Option<String>,
}

fn optional_timestamp(
    raw: Option<String>,
    field: &str,
    label: &str,
    errors: &mut Vec<FieldError>,
) -> Option<chrono::DateTime<chrono::Utc>> {
    let raw = raw.filter(|s| !s.trim().is_empty())?;
    let parsed = parse_timestamp(&raw);
    if parsed.is_none() {
        errors.push(FieldError::new(
            field,
            format!("{label} must be a valid ISO 8601 datetime"),
        ));
    }
    parsed
}

impl AttendanceRequest {
    /// Parses the wire form. Presence and remark rules are checked again when
    /// the entry becomes a draft.
    pub fn into_entry(self) -> Result<AttendanceEntry, AppError> {
        let mut errors = Vec::new();

        let date = match self.date.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
            None => {
                errors.push(FieldError::new("date", "Date is required"));
                None
            }
            Some(raw) => {
                let day = parse_day(raw);
                if day.is_none() {
                    errors.push(FieldError::new("date", "Date must be a valid ISO 8601 date"));
                }
                day
            }
        };

        let bills_count = u32::try_from(self.bills_count).ok();
        if bills_count.is_none() {
            errors.push(FieldError::new(
                "billsCount",
                "Bills count must be a non-negative integer",
            ));
        }

        let start_time = optional_timestamp(self.start_time, "startTime", "Start time", &mut errors);
        let end_time = optional_timestamp(self.end_time, "endTime", "End time", &mut errors);
        let remarks = self
            .remarks
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());

        match (date, bills_count) {
            (Some(date), Some(bills_count)) if errors.is_empty() => {
                let entry = AttendanceEntry {
                    date,
                    is_present: self.is_present,
                    start_time,
                    end_time,
                    bills_count,
                    remarks,
                };
                entry.validate()?;
                Ok(entry)
            }
            _ => Err(AppError::Validation(errors)),
        }
    }
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct MonthlyQuery {
    /// 1-12
    #[schema(example = 3)]
    pub month: u32,
    /// 2020 or later
    #[schema(example = 2024)]
    pub year: i32,
}

#[derive(Serialize, ToSchema)]
pub struct AttendanceResponse {
    pub success: bool,
    #[schema(example = "Attendance created successfully")]
    pub message: String,
    pub data: AttendanceRecord,
}

/// A record with its owner's name attached; `employee` is null if the
/// owner no longer exists.
#[derive(Serialize, ToSchema)]
pub struct ListedAttendance {
    #[serde(flatten)]
    pub record: AttendanceRecord,
    pub employee: Option<EmployeeRef>,
}

#[derive(Serialize, ToSchema)]
pub struct AttendanceListResponse {
    pub success: bool,
    pub data: Vec<ListedAttendance>,
}

#[derive(Serialize, ToSchema)]
pub struct MonthlyAttendanceResponse {
    pub success: bool,
    pub data: Vec<AttendanceRecord>,
    pub summary: MonthlySummary,
}

/// Create or overwrite the caller's attendance for one day
#[utoipa::path(
    post,
    path = "/api/attendance",
    request_body = AttendanceRequest,
    responses(
        (status = 201, description = "Attendance created", body = AttendanceResponse),
        (status = 200, description = "Existing day overwritten", body = AttendanceResponse),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "Attendance already exists for this date")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
#[instrument(
    name = "attendance_upsert",
    skip(auth, state, payload),
    fields(employee_id = auth.employee_id)
)]
pub async fn create_or_update_attendance(
    auth: AuthEmployee,
    state: web::Data<AppState>,
    payload: web::Json<AttendanceRequest>,
) -> Result<HttpResponse, AppError> {
    let entry = payload.into_inner().into_entry()?;
    let (record, outcome) = state.attendance.upsert(auth.employee_id, entry).await?;

    let response = match outcome {
        UpsertOutcome::Created => HttpResponse::Created().json(AttendanceResponse {
            success: true,
            message: "Attendance created successfully".to_string(),
            data: record,
        }),
        UpsertOutcome::Updated => HttpResponse::Ok().json(AttendanceResponse {
            success: true,
            message: "Attendance updated successfully".to_string(),
            data: record,
        }),
    };
    Ok(response)
}

/// All attendance of one employee, newest first
#[utoipa::path(
    get,
    path = "/api/attendance/{employee_id}",
    params(("employee_id", Path, description = "Employee ID")),
    responses(
        (status = 200, body = AttendanceListResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Access denied")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
#[instrument(name = "attendance_list", skip(auth, state), fields(actor = auth.employee_id))]
pub async fn list_attendance(
    auth: AuthEmployee,
    state: web::Data<AppState>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    let employee_id = path.into_inner();
    let records = state.attendance.list_for(&auth, employee_id).await?;
    let owner = state
        .directory
        .find_by_id(employee_id)
        .await?
        .as_ref()
        .map(EmployeeRef::from);

    let data = records
        .into_iter()
        .map(|record| ListedAttendance {
            record,
            employee: owner.clone(),
        })
        .collect();

    Ok(HttpResponse::Ok().json(AttendanceListResponse {
        success: true,
        data,
    }))
}

/// One month of attendance with its payroll summary
#[utoipa::path(
    get,
    path = "/api/attendance/{employee_id}/monthly",
    params(
        ("employee_id", Path, description = "Employee ID"),
        MonthlyQuery
    ),
    responses(
        (status = 200, body = MonthlyAttendanceResponse),
        (status = 400, description = "Month or year out of range"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Access denied")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
#[instrument(name = "attendance_monthly", skip(auth, state), fields(actor = auth.employee_id))]
pub async fn monthly_attendance(
    auth: AuthEmployee,
    state: web::Data<AppState>,
    path: web::Path<u64>,
    query: web::Query<MonthlyQuery>,
) -> Result<HttpResponse, AppError> {
    let window = MonthWindow::new(query.month, query.year)?;
    let (records, summary) = state
        .attendance
        .monthly(&auth, path.into_inner(), window)
        .await?;

    Ok(HttpResponse::Ok().json(MonthlyAttendanceResponse {
        success: true,
        data: records,
        summary,
    }))
}

/// Overwrite an attendance record by id
#[utoipa::path(
    put,
    path = "/api/attendance/{id}",
    params(("id", Path, description = "Attendance record ID")),
    request_body = AttendanceRequest,
    responses(
        (status = 200, body = AttendanceResponse),
        (status = 400, description = "Validation failed"),
        (status = 403, description = "Access denied"),
        (status = 404, description = "Attendance record not found"),
        (status = 409, description = "Attendance already exists for this date")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
#[instrument(name = "attendance_update", skip(auth, state, payload), fields(actor = auth.employee_id))]
pub async fn update_attendance(
    auth: AuthEmployee,
    state: web::Data<AppState>,
    path: web::Path<u64>,
    payload: web::Json<AttendanceRequest>,
) -> Result<HttpResponse, AppError> {
    let entry = payload.into_inner().into_entry()?;
    let record = state
        .attendance
        .update(&auth, path.into_inner(), entry)
        .await?;

    Ok(HttpResponse::Ok().json(AttendanceResponse {
        success: true,
        message: "Attendance updated successfully".to_string(),
        data: record,
    }))
}

/// Delete an attendance record by id
#[utoipa::path(
    delete,
    path = "/api/attendance/{id}",
    params(("id", Path, description = "Attendance record ID")),
    responses(
        (status = 200, description = "Deleted", body = Object, example = json!({
            "success": true,
            "message": "Attendance deleted successfully"
        })),
        (status = 403, description = "Access denied"),
        (status = 404, description = "Attendance record not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
#[instrument(name = "attendance_delete", skip(auth, state), fields(actor = auth.employee_id))]
pub async fn delete_attendance(
    auth: AuthEmployee,
    state: web::Data<AppState>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    state.attendance.delete(&auth, path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Attendance deleted successfully"
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn request(date: &str, is_present: bool, bills_count: i64) -> AttendanceRequest {
        AttendanceRequest {
            date: Some(date.to_string()),
            is_present,
            bills_count,
            start_time: Some("2024-03-05T09:00:00Z".into()),
            end_time: Some("2024-03-05T17:00:00Z".into()),
            remarks: Some("  ".into()),
        }
    }

    fn fields(err: AppError) -> Vec<String> {
        match err {
            AppError::Validation(errors) => errors.into_iter().map(|e| e.field).collect(),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn timestamp_date_is_truncated_and_blank_remarks_dropped() {
        let entry = request("2024-03-05T15:45:00Z", true, 3).into_entry().unwrap();

        assert_eq!(entry.date.to_string(), "2024-03-05");
        assert_eq!(entry.remarks, None);
    }

    #[rstest]
    #[case(request("", true, 1), "date")]
    #[case(request("next tuesday", true, 1), "date")]
    #[case(request("2024-03-05", true, -1), "billsCount")]
    fn malformed_input_names_the_field(#[case] req: AttendanceRequest, #[case] field: &str) {
        assert_eq!(fields(req.into_entry().unwrap_err()), [field]);
    }

    #[test]
    fn unparseable_times_are_reported() {
        let req = AttendanceRequest {
            start_time: Some("9am".into()),
            ..request("2024-03-05", true, 1)
        };

        assert_eq!(fields(req.into_entry().unwrap_err()), ["startTime"]);
    }

    #[test]
    fn present_without_end_time_is_rejected() {
        let req = AttendanceRequest {
            end_time: None,
            ..request("2024-03-05", true, 1)
        };

        assert_eq!(fields(req.into_entry().unwrap_err()), ["endTime"]);
    }

    #[test]
    fn json_uses_camel_case() {
        let req: AttendanceRequest = serde_json::from_value(json!({
            "date": "2024-03-06",
            "isPresent": false,
            "billsCount": 7
        }))
        .unwrap();

        let entry = req.into_entry().unwrap();
        assert!(!entry.is_present);
        assert_eq!(entry.bills_count, 7);
    }
}
