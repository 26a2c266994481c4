use actix_web::{HttpRequest, HttpResponse, web};
use tracing::{debug, info, instrument};

use crate::{
    auth::{auth::authenticate_request, jwt::generate_token},
    config::Config,
    error::AppError,
    model::{
        employee::{EmployeeProfile, NewEmployee, credential_errors},
        role::Role,
    },
    models::{AuthResponse, LoginReqDto, RegisterReqDto, VerifyResponse},
    state::AppState,
};

/// Login
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginReqDto,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "Auth"
)]
#[instrument(
    name = "auth_login",
    skip(state, config, user),
    fields(username = %user.username)
)]
pub async fn login(
    user: web::Json<LoginReqDto>,
    state: web::Data<AppState>,
    config: web::Data<Config>,
) -> Result<HttpResponse, AppError> {
    info!("Login request received");

    let errors = credential_errors(&user.username, &user.password);
    if !errors.is_empty() {
        debug!("Validation failed: malformed username or password");
        return Err(AppError::Validation(errors));
    }

    let employee = state
        .directory
        .authenticate(&user.username, &user.password)
        .await?;

    debug!(employee_id = employee.id, "Generating token");
    let token = generate_token(&employee, &config.jwt_secret, config.token_ttl)?;

    info!(employee_id = employee.id, "Login successful");

    Ok(HttpResponse::Ok().json(AuthResponse {
        success: true,
        message: "Login successful".to_string(),
        token,
        employee: EmployeeProfile::from(&employee),
    }))
}

/// Register a new employee account
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterReqDto,
    responses(
        (status = 201, description = "Registration successful", body = AuthResponse),
        (status = 400, description = "Validation failed"),
        (status = 409, description = "Username or email already exists")
    ),
    tag = "Auth"
)]
#[instrument(
    name = "auth_register",
    skip(state, config, user),
    fields(username = %user.username)
)]
pub async fn register(
    user: web::Json<RegisterReqDto>,
    state: web::Data<AppState>,
    config: web::Data<Config>,
) -> Result<HttpResponse, AppError> {
    let user = user.into_inner();

    let employee = state
        .directory
        .create(NewEmployee {
            username: user.username,
            password: user.password,
            name: user.name,
            email: user.email,
            phone: user.phone,
            role: Role::Employee,
        })
        .await?;

    let token = generate_token(&employee, &config.jwt_secret, config.token_ttl)?;

    Ok(HttpResponse::Created().json(AuthResponse {
        success: true,
        message: "Registration successful".to_string(),
        token,
        employee: EmployeeProfile::from(&employee),
    }))
}

/// Resolve a bearer token to the employee behind it
#[utoipa::path(
    get,
    path = "/api/auth/verify",
    responses(
        (status = 200, body = VerifyResponse),
        (status = 401, description = "Invalid token or inactive user")
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn verify(
    req: HttpRequest,
    state: web::Data<AppState>,
    config: web::Data<Config>,
) -> Result<HttpResponse, AppError> {
    let employee = authenticate_request(req.headers(), &config, &state.directory).await?;

    Ok(HttpResponse::Ok().json(VerifyResponse {
        success: true,
        employee: EmployeeProfile::from(&employee),
    }))
}
