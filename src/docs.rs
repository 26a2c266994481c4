use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, openapi};

use crate::api::attendance::{
    AttendanceListResponse, AttendanceRequest, AttendanceResponse, ListedAttendance,
    MonthlyAttendanceResponse, MonthlyQuery,
};
use crate::error::FieldError;
use crate::model::{
    attendance::AttendanceRecord,
    employee::{EmployeeProfile, EmployeeRef},
    role::Role,
    summary::MonthlySummary,
};
use crate::models::{AuthResponse, LoginReqDto, RegisterReqDto, VerifyResponse};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Attendance & Salary API",
        version = "1.0.0",
        description = r#"
## Daily Attendance & Payroll

Employees record one attendance entry per day. Each entry carries the number of
bills the employee processed, and the server derives that day's pay from it.

### Pay rule
- Absent: no pay, bill count is stored as 0
- Present: base payment plus an incentive tier
  - base: **500** below 10 bills, **1000** from 10 bills
  - incentive: **500** from 20 bills, **1000** from 25 bills

### Security
All attendance endpoints require a **JWT Bearer** token from `/api/auth/login`
or `/api/auth/register`. Employees see only their own records; admins see all.

### Response Format
- JSON bodies with camelCase fields
- Errors carry `success: false`, a `message` and, for validation, `errors`
"#,
    ),
    paths(
        crate::auth::handlers::login,
        crate::auth::handlers::register,
        crate::auth::handlers::verify,

        crate::api::attendance::create_or_update_attendance,
        crate::api::attendance::list_attendance,
        crate::api::attendance::monthly_attendance,
        crate::api::attendance::update_attendance,
        crate::api::attendance::delete_attendance,

        crate::api::health::health
    ),
    components(
        schemas(
            LoginReqDto,
            RegisterReqDto,
            AuthResponse,
            VerifyResponse,
            EmployeeProfile,
            Role,
            AttendanceRequest,
            AttendanceRecord,
            AttendanceResponse,
            ListedAttendance,
            EmployeeRef,
            AttendanceListResponse,
            MonthlyAttendanceResponse,
            MonthlyQuery,
            MonthlySummary,
            FieldError
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Login, registration and token verification"),
        (name = "Attendance", description = "Daily attendance and derived pay"),
        (name = "Health", description = "Liveness"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_every_route_with_bearer_scheme() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&str> = doc.paths.paths.keys().map(String::as_str).collect();

        for path in [
            "/api/auth/login",
            "/api/auth/register",
            "/api/auth/verify",
            "/api/attendance",
            "/api/attendance/{employee_id}",
            "/api/attendance/{employee_id}/monthly",
            "/api/attendance/{id}",
            "/api/health",
        ] {
            assert!(paths.contains(&path), "{path} missing from OpenAPI document");
        }

        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
