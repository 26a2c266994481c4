use actix_web::{
    Error, HttpMessage, ResponseError,
    body::BoxBody,
    dev::{ServiceRequest, ServiceResponse},
    middleware::Next,
    web::Data,
};

use crate::{
    auth::auth::{AuthEmployee, authenticate_request},
    config::Config,
    error::AppError,
    state::AppState,
};

pub async fn auth_middleware(
    req: ServiceRequest,
    next: Next<BoxBody>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    let config = req
        .app_data::<Data<Config>>()
        .cloned()
        .ok_or_else(|| AppError::internal("App config missing"))?;
    let state = req
        .app_data::<Data<AppState>>()
        .cloned()
        .ok_or_else(|| AppError::internal("App state missing"))?;

    let outcome = authenticate_request(req.headers(), &config, &state.directory).await;
    let employee = match outcome {
        Ok(employee) => employee,
        Err(e) => {
            tracing::debug!(path = %req.path(), reason = %e, "Rejected unauthenticated request");
            let resp = e.error_response();
            return Ok(req.into_response(resp));
        }
    };

    req.extensions_mut().insert(AuthEmployee::from(&employee));

    next.call(req).await
}
