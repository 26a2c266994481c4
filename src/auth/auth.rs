use actix_web::{
    FromRequest, HttpMessage, HttpRequest, dev::Payload, http::header::HeaderMap,
};
use futures::future::{Ready, ready};

use crate::{
    auth::jwt::verify_token, config::Config, error::AppError, model::employee::Employee,
    model::role::Role, service::directory::EmployeeDirectory,
};

/// The caller behind a verified bearer token, placed in request extensions
/// by [`crate::auth::middleware::auth_middleware`].
#[derive(Debug, Clone, PartialEq)]
pub struct AuthEmployee {
    pub employee_id: u64,
    pub username: String,
    pub role: Role,
}

impl From<&Employee> for AuthEmployee {
    fn from(employee: &Employee) -> Self {
        Self {
            employee_id: employee.id,
            username: employee.username.clone(),
            role: employee.role,
        }
    }
}

impl AuthEmployee {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl FromRequest for AuthEmployee {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        match req.extensions().get::<AuthEmployee>() {
            Some(auth) => ready(Ok(auth.clone())),
            None => ready(Err(AppError::Auth("No token provided".to_string()).into())),
        }
    }
}

pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let value = headers
        .get("Authorization")
        .ok_or_else(|| AppError::Auth("No token provided".to_string()))?
        .to_str()
        .map_err(|_| AppError::Auth("Invalid Authorization header encoding".to_string()))?;

    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::Auth("Authorization header must start with Bearer".to_string()))
}

/// Resolves the bearer token to a live, active employee.
pub async fn authenticate_request(
    headers: &HeaderMap,
    config: &Config,
    directory: &EmployeeDirectory,
) -> Result<Employee, AppError> {
    let token = bearer_token(headers)?;
    let claims = verify_token(token, &config.jwt_secret)?;

    match directory.find_by_id(claims.employee_id).await? {
        Some(employee) if employee.is_active => Ok(employee),
        _ => Err(AppError::Auth("Invalid token or inactive user".to_string())),
    }
}
